//! Persistence seam for the booking lifecycle.
//!
//! [`BookingStore`] is what the lifecycle manager reads and writes through;
//! [`PartyResolver`] maps a session token to the caller's party identity.
//! `PgBookingStore` backs both with Postgres, `InMemoryBookingStore` with
//! process memory for tests and local runs.

mod memory;
mod postgres;

use chrono::Utc;
use diesel_async::pooled_connection::PoolError;
use shared::*;
use std::future::Future;
use thiserror::Error;
use uuid::Uuid;

pub use memory::InMemoryBookingStore;
pub use postgres::{DbPool, PgBookingStore};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] diesel::result::Error),

    #[error("connection pool error: {0}")]
    Pool(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("corrupt record: {0}")]
    Corrupt(String),

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

impl From<bb8::RunError<PoolError>> for StoreError {
    fn from(e: bb8::RunError<PoolError>) -> Self {
        StoreError::Pool(e.to_string())
    }
}

/// Fields the lifecycle manager is allowed to change on a booking.
///
/// A payment intent id always travels with `payment_status = paid`; both are
/// written in the same statement as the status.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BookingPatch {
    pub status: Option<BookingStatus>,
    pub payment_intent_id: Option<String>,
}

impl BookingPatch {
    pub fn is_empty(&self) -> bool {
        self.status.is_none() && self.payment_intent_id.is_none()
    }

    pub fn apply_to(&self, booking: &mut Booking) {
        if let Some(status) = self.status {
            booking.status = status;
        }
        if let Some(intent) = &self.payment_intent_id {
            booking.payment_intent_id = Some(intent.clone());
            booking.payment_status = PaymentStatus::Paid;
        }
        booking.version += 1;
        booking.updated_at = Utc::now();
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum UpdateOutcome {
    Updated(Booking),
    /// The row no longer carries the version the caller read.
    VersionMismatch,
}

pub trait BookingStore: Send + Sync + 'static {
    fn get(&self, id: Uuid) -> impl Future<Output = Result<Option<Booking>, StoreError>> + Send;

    fn get_details(
        &self,
        id: Uuid,
    ) -> impl Future<Output = Result<Option<BookingDetails>, StoreError>> + Send;

    /// Bookings where `party_id` holds `role`, latest appointment first.
    fn list_for_party(
        &self,
        party_id: Uuid,
        role: PartyRole,
    ) -> impl Future<Output = Result<Vec<BookingDetails>, StoreError>> + Send;

    /// Applies `patch` only if the stored version still equals `expected_version`,
    /// bumping the version and recording an update on the change feed.
    fn update(
        &self,
        id: Uuid,
        expected_version: i32,
        patch: BookingPatch,
    ) -> impl Future<Output = Result<UpdateOutcome, StoreError>> + Send;

    fn create_notification(
        &self,
        notification: NewNotification,
    ) -> impl Future<Output = Result<Notification, StoreError>> + Send;
}

pub trait PartyResolver: Send + Sync + 'static {
    /// `Ok(None)` when the token is unknown or expired.
    fn resolve_party(
        &self,
        token: &str,
    ) -> impl Future<Output = Result<Option<Uuid>, StoreError>> + Send;
}
