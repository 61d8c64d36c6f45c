use serde::Deserialize;
use shared::*;
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::BookingError;
use crate::store::{BookingPatch, BookingStore, UpdateOutcome};

/// Body of a transition request. Either field may be omitted, not both.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransitionRequest {
    #[serde(default)]
    pub status: Option<BookingStatus>,
    #[serde(default)]
    pub payment_intent_id: Option<String>,
}

impl TransitionRequest {
    pub fn to(status: BookingStatus) -> Self {
        Self {
            status: Some(status),
            payment_intent_id: None,
        }
    }

    pub fn with_payment_intent(mut self, payment_intent_id: impl Into<String>) -> Self {
        self.payment_intent_id = Some(payment_intent_id.into());
        self
    }
}

/// What became of the counter-party notification. It is written after the
/// status change and never rolls it back.
#[derive(Debug, Clone, PartialEq)]
pub enum NotificationDelivery {
    Sent(Notification),
    NotRequired,
    Failed(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct TransitionOutcome {
    pub booking: Booking,
    pub notification: NotificationDelivery,
}

pub struct BookingLifecycle<S> {
    store: S,
}

impl<S: BookingStore> BookingLifecycle<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Moves a booking to `request.status` on behalf of one of its parties.
    ///
    /// Existence, party membership and the transition table are all checked
    /// before anything is written. On success the counter-party is notified
    /// when the new status has notification copy.
    pub async fn request_transition(
        &self,
        booking_id: Uuid,
        party_id: Uuid,
        request: TransitionRequest,
    ) -> Result<TransitionOutcome, BookingError> {
        let booking = self
            .store
            .get(booking_id)
            .await?
            .ok_or(BookingError::NotFound(booking_id))?;

        let counter_party = booking.counter_party(party_id).ok_or_else(|| {
            warn!("Party {} is not on booking {}", party_id, booking_id);
            BookingError::Forbidden
        })?;

        let patch = BookingPatch {
            status: request.status,
            payment_intent_id: request.payment_intent_id,
        };
        if patch.is_empty() {
            return Err(BookingError::EmptyRequest);
        }

        if let Some(target) = patch.status {
            if !booking.status.can_transition_to(target) {
                return Err(BookingError::InvalidTransition {
                    from: booking.status,
                    to: target,
                });
            }
        }

        let updated = match self.store.update(booking_id, booking.version, patch.clone()).await? {
            UpdateOutcome::Updated(updated) => updated,
            UpdateOutcome::VersionMismatch => {
                warn!("Booking {} changed since version {}", booking_id, booking.version);
                return Err(BookingError::Conflict(booking_id));
            }
        };

        info!(
            "Booking {} moved {} -> {} by {}",
            booking_id, booking.status, updated.status, party_id
        );

        let notification = match patch.status {
            Some(_) => self.notify(&updated, counter_party).await,
            None => NotificationDelivery::NotRequired,
        };

        Ok(TransitionOutcome {
            booking: updated,
            notification,
        })
    }

    pub async fn get_booking(&self, booking_id: Uuid, party_id: Uuid) -> Result<BookingDetails, BookingError> {
        let details = self
            .store
            .get_details(booking_id)
            .await?
            .ok_or(BookingError::NotFound(booking_id))?;

        if !details.booking.is_party(party_id) {
            return Err(BookingError::Forbidden);
        }
        Ok(details)
    }

    pub async fn list_bookings(&self, party_id: Uuid, role: PartyRole) -> Result<Vec<BookingDetails>, BookingError> {
        Ok(self.store.list_for_party(party_id, role).await?)
    }

    async fn notify(&self, booking: &Booking, recipient: Uuid) -> NotificationDelivery {
        let Some(notification) = NewNotification::for_status_change(booking, recipient) else {
            return NotificationDelivery::NotRequired;
        };

        match self.store.create_notification(notification).await {
            Ok(sent) => {
                info!("Notified {} about booking {} ({})", recipient, booking.id, booking.status);
                NotificationDelivery::Sent(sent)
            }
            Err(e) => {
                warn!("Notification for booking {} to {} failed: {}", booking.id, recipient, e);
                NotificationDelivery::Failed(e.to_string())
            }
        }
    }
}
