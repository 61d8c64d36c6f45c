use std::future::Future;

use reqwest::{Client, StatusCode};
use shared::{BookingDetails, PartyRole};
use uuid::Uuid;

use crate::error::SyncError;

/// Loads the denormalized form of a booking as the current session sees it.
pub trait BookingFetcher: Send + Sync + 'static {
    /// `Ok(None)` when the booking is gone or not visible to this session.
    fn fetch(&self, id: Uuid) -> impl Future<Output = Result<Option<BookingDetails>, SyncError>> + Send;
}

/// Reads through the booking service's HTTP API with the session's bearer token.
#[derive(Clone)]
pub struct HttpBookingFetcher {
    client: Client,
    base_url: String,
    token: String,
}

impl HttpBookingFetcher {
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: token.into(),
        }
    }

    /// Initial snapshot for the watcher.
    pub async fn list(&self, role: PartyRole) -> Result<Vec<BookingDetails>, SyncError> {
        let bookings = self
            .client
            .get(format!("{}/bookings", self.base_url))
            .query(&[("role", role.as_str())])
            .bearer_auth(&self.token)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(bookings)
    }
}

impl BookingFetcher for HttpBookingFetcher {
    async fn fetch(&self, id: Uuid) -> Result<Option<BookingDetails>, SyncError> {
        let response = self
            .client
            .get(format!("{}/bookings/{}", self.base_url, id))
            .bearer_auth(&self.token)
            .send()
            .await?;

        if matches!(response.status(), StatusCode::NOT_FOUND | StatusCode::FORBIDDEN) {
            return Ok(None);
        }

        let details = response.error_for_status()?.json().await?;
        Ok(Some(details))
    }
}
