use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use shared::*;

use super::{BookingPatch, BookingStore, PartyResolver, StoreError, UpdateOutcome};

#[derive(Default)]
struct State {
    bookings: HashMap<Uuid, BookingDetails>,
    notifications: Vec<Notification>,
    outbox: Vec<ChangeEvent>,
    sessions: HashMap<String, Uuid>,
    fail_updates: bool,
    fail_notifications: bool,
}

/// Process-local store with the same observable behavior as the Postgres one,
/// including change events for every committed write.
#[derive(Clone, Default)]
pub struct InMemoryBookingStore {
    state: Arc<RwLock<State>>,
}

impl InMemoryBookingStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stands in for the external booking-creation flow.
    pub async fn insert(&self, details: BookingDetails) {
        let mut state = self.state.write().await;
        state.outbox.push(ChangeEvent::booking(ChangeKind::Insert, &details.booking));
        state.bookings.insert(details.booking.id, details);
    }

    /// Stands in for an external delete; the lifecycle never removes bookings.
    pub async fn remove(&self, id: Uuid) -> Option<BookingDetails> {
        let mut state = self.state.write().await;
        let removed = state.bookings.remove(&id)?;
        state.outbox.push(ChangeEvent::booking(ChangeKind::Delete, &removed.booking));
        Some(removed)
    }

    pub async fn add_session(&self, token: impl Into<String>, party_id: Uuid) {
        self.state.write().await.sessions.insert(token.into(), party_id);
    }

    pub async fn booking(&self, id: Uuid) -> Option<Booking> {
        self.state.read().await.bookings.get(&id).map(|d| d.booking.clone())
    }

    pub async fn notifications(&self) -> Vec<Notification> {
        self.state.read().await.notifications.clone()
    }

    pub async fn outbox(&self) -> Vec<ChangeEvent> {
        self.state.read().await.outbox.clone()
    }

    pub async fn fail_updates(&self, fail: bool) {
        self.state.write().await.fail_updates = fail;
    }

    pub async fn fail_notifications(&self, fail: bool) {
        self.state.write().await.fail_notifications = fail;
    }
}

impl BookingStore for InMemoryBookingStore {
    async fn get(&self, id: Uuid) -> Result<Option<Booking>, StoreError> {
        Ok(self.booking(id).await)
    }

    async fn get_details(&self, id: Uuid) -> Result<Option<BookingDetails>, StoreError> {
        Ok(self.state.read().await.bookings.get(&id).cloned())
    }

    async fn list_for_party(&self, party_id: Uuid, role: PartyRole) -> Result<Vec<BookingDetails>, StoreError> {
        let state = self.state.read().await;
        let mut bookings: Vec<BookingDetails> = state
            .bookings
            .values()
            .filter(|d| d.booking.party(role) == party_id)
            .cloned()
            .collect();
        bookings.sort_by(|a, b| {
            (b.booking.scheduled_date, b.booking.scheduled_time)
                .cmp(&(a.booking.scheduled_date, a.booking.scheduled_time))
        });
        Ok(bookings)
    }

    async fn update(&self, id: Uuid, expected_version: i32, patch: BookingPatch) -> Result<UpdateOutcome, StoreError> {
        let mut state = self.state.write().await;
        if state.fail_updates {
            return Err(StoreError::Unavailable("updates disabled".to_string()));
        }

        let Some(details) = state.bookings.get_mut(&id) else {
            return Ok(UpdateOutcome::VersionMismatch);
        };
        if details.booking.version != expected_version {
            return Ok(UpdateOutcome::VersionMismatch);
        }

        patch.apply_to(&mut details.booking);
        let booking = details.booking.clone();
        state.outbox.push(ChangeEvent::booking(ChangeKind::Update, &booking));
        Ok(UpdateOutcome::Updated(booking))
    }

    async fn create_notification(&self, notification: NewNotification) -> Result<Notification, StoreError> {
        let mut state = self.state.write().await;
        if state.fail_notifications {
            return Err(StoreError::Unavailable("notifications disabled".to_string()));
        }

        let notification = notification.into_notification();
        state.outbox.push(ChangeEvent::notification(&notification));
        state.notifications.push(notification.clone());
        Ok(notification)
    }
}

impl PartyResolver for InMemoryBookingStore {
    async fn resolve_party(&self, token: &str) -> Result<Option<Uuid>, StoreError> {
        Ok(self.state.read().await.sessions.get(token).copied())
    }
}
