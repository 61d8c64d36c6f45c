use std::sync::Arc;

use axum::{
    async_trait,
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        FromRequestParts, Path, Query, State,
    },
    http::{header::AUTHORIZATION, request::Parts},
    response::Json,
    routing::get,
    Router,
};
use serde::Deserialize;
use shared::*;
use uuid::Uuid;

use crate::error::BookingError;
use crate::lifecycle::{BookingLifecycle, NotificationDelivery, TransitionRequest};
use crate::store::{BookingStore, PartyResolver};

pub struct AppState<S> {
    pub lifecycle: Arc<BookingLifecycle<S>>,
}

impl<S> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            lifecycle: Arc::clone(&self.lifecycle),
        }
    }
}

impl<S: BookingStore> AppState<S> {
    pub fn new(store: S) -> Self {
        Self {
            lifecycle: Arc::new(BookingLifecycle::new(store)),
        }
    }
}

/// Party identity of the caller, resolved from `Authorization: Bearer <token>`.
#[derive(Debug, Clone, Copy)]
pub struct CurrentParty(pub Uuid);

#[async_trait]
impl<S> FromRequestParts<AppState<S>> for CurrentParty
where
    S: BookingStore + PartyResolver,
{
    type Rejection = BookingError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState<S>) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .ok_or(BookingError::Unauthenticated)?;

        let party_id = state
            .lifecycle
            .store()
            .resolve_party(token)
            .await?
            .ok_or(BookingError::Unauthenticated)?;

        Ok(Self(party_id))
    }
}

/// `GET /bookings?role=customer|provider`. The role is required since a
/// party may hold either side.
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub role: PartyRole,
}

pub fn create_router<S>(state: AppState<S>) -> Router
where
    S: BookingStore + PartyResolver,
{
    Router::new()
        .route("/bookings", get(list_bookings::<S>))
        .route("/bookings/:id", get(get_booking::<S>).patch(update_booking::<S>))
        .route("/health", get(health_check))
        .with_state(state)
        .layer(
            tower_http::cors::CorsLayer::new()
                .allow_origin(tower_http::cors::Any)
                .allow_methods(tower_http::cors::Any)
                .allow_headers(tower_http::cors::Any),
        )
}

pub async fn update_booking<S>(
    State(state): State<AppState<S>>,
    CurrentParty(party_id): CurrentParty,
    booking_id: Result<Path<Uuid>, PathRejection>,
    request: Result<Json<TransitionRequest>, JsonRejection>,
) -> Result<Json<Booking>, BookingError>
where
    S: BookingStore + PartyResolver,
{
    let Path(booking_id) = booking_id?;
    let Json(request) = request?;
    let outcome = state
        .lifecycle
        .request_transition(booking_id, party_id, request)
        .await?;

    if let NotificationDelivery::Failed(reason) = &outcome.notification {
        tracing::warn!("Booking {} updated without notification: {}", booking_id, reason);
    }

    Ok(Json(outcome.booking))
}

pub async fn get_booking<S>(
    State(state): State<AppState<S>>,
    CurrentParty(party_id): CurrentParty,
    booking_id: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<BookingDetails>, BookingError>
where
    S: BookingStore + PartyResolver,
{
    let Path(booking_id) = booking_id?;
    let details = state.lifecycle.get_booking(booking_id, party_id).await?;
    Ok(Json(details))
}

pub async fn list_bookings<S>(
    State(state): State<AppState<S>>,
    CurrentParty(party_id): CurrentParty,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> Result<Json<Vec<BookingDetails>>, BookingError>
where
    S: BookingStore + PartyResolver,
{
    let Query(query) = query?;
    let bookings = state.lifecycle.list_bookings(party_id, query.role).await?;
    Ok(Json(bookings))
}

pub async fn health_check() -> &'static str {
    "OK"
}
