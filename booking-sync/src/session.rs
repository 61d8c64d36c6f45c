use shared::{PartyFilter, PartyRole};
use uuid::Uuid;

/// Who the synchronizer is running for. Passed in at construction and fixed
/// for the lifetime of the subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionContext {
    pub party_id: Uuid,
    pub role: PartyRole,
}

impl SessionContext {
    pub fn new(party_id: Uuid, role: PartyRole) -> Self {
        Self { party_id, role }
    }

    pub fn filter(&self) -> PartyFilter {
        PartyFilter::new(self.party_id, self.role)
    }
}
