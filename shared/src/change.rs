use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::booking::{Booking, PartyRole};
use crate::notification::Notification;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    Insert,
    Update,
    Delete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeTable {
    Bookings,
    Notifications,
}

impl ChangeTable {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeTable::Bookings => "bookings",
            ChangeTable::Notifications => "notifications",
        }
    }
}

/// One committed row change, as carried on the realtime feed.
///
/// The payload is only an identifier plus the columns subscribers filter on;
/// consumers refetch the record itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeEvent {
    pub kind: ChangeKind,
    pub table: ChangeTable,
    pub record_id: Uuid,
    #[serde(default)]
    pub customer_id: Option<Uuid>,
    #[serde(default)]
    pub provider_user_id: Option<Uuid>,
    #[serde(default)]
    pub user_id: Option<Uuid>,
    pub committed_at: DateTime<Utc>,
}

impl ChangeEvent {
    pub fn booking(kind: ChangeKind, booking: &Booking) -> Self {
        Self {
            kind,
            table: ChangeTable::Bookings,
            record_id: booking.id,
            customer_id: Some(booking.customer_id),
            provider_user_id: Some(booking.provider_user_id),
            user_id: None,
            committed_at: Utc::now(),
        }
    }

    pub fn notification(notification: &Notification) -> Self {
        Self {
            kind: ChangeKind::Insert,
            table: ChangeTable::Notifications,
            record_id: notification.id,
            customer_id: None,
            provider_user_id: None,
            user_id: Some(notification.user_id),
            committed_at: notification.created_at,
        }
    }
}

/// Subscription scope: `customer_id = me` or `provider_user_id = me`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PartyFilter {
    pub party_id: Uuid,
    pub role: PartyRole,
}

impl PartyFilter {
    pub fn new(party_id: Uuid, role: PartyRole) -> Self {
        Self { party_id, role }
    }

    pub fn matches(&self, event: &ChangeEvent) -> bool {
        let me = Some(self.party_id);
        match event.table {
            ChangeTable::Bookings => match self.role {
                PartyRole::Customer => event.customer_id == me,
                PartyRole::Provider => event.provider_user_id == me,
            },
            ChangeTable::Notifications => event.user_id == me,
        }
    }

    pub fn admits(&self, booking: &Booking) -> bool {
        booking.party(self.role) == self.party_id
    }
}
