mod common;

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use booking_service::api::{create_router, AppState};
use booking_service::store::InMemoryBookingStore;
use common::seeded;
use serde_json::{json, Value};
use shared::*;
use tower::ServiceExt;
use uuid::Uuid;

fn app(store: &InMemoryBookingStore) -> Router {
    create_router(AppState::new(store.clone()))
}

fn patch(id: Uuid, token: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(Method::PATCH)
        .uri(format!("/bookings/{id}"))
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn get(uri: &str, token: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap()
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn patch_returns_updated_booking() {
    let (store, _, id) = seeded(BookingStatus::Pending).await;

    let response = app(&store)
        .oneshot(patch(
            id,
            Some("provider-token"),
            json!({ "status": "confirmed", "paymentIntentId": "pi_123" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["id"], json!(id));
    assert_eq!(body["status"], "confirmed");
    assert_eq!(body["paymentStatus"], "paid");
    assert_eq!(body["paymentIntentId"], "pi_123");
    assert_eq!(store.notifications().await.len(), 1);
}

#[tokio::test]
async fn missing_token_is_unauthorized() {
    let (store, _, id) = seeded(BookingStatus::Pending).await;

    let response = app(&store)
        .oneshot(patch(id, None, json!({ "status": "confirmed" })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(json_body(response).await, json!({ "error": "Unauthorized" }));
}

#[tokio::test]
async fn unknown_token_is_unauthorized() {
    let (store, _, id) = seeded(BookingStatus::Pending).await;

    let response = app(&store)
        .oneshot(patch(id, Some("expired"), json!({ "status": "confirmed" })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(store.booking(id).await.unwrap().status, BookingStatus::Pending);
}

#[tokio::test]
async fn non_party_is_forbidden() {
    let (store, _, id) = seeded(BookingStatus::Pending).await;
    store.add_session("stranger-token", Uuid::new_v4()).await;

    let response = app(&store)
        .oneshot(patch(id, Some("stranger-token"), json!({ "status": "cancelled" })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(json_body(response).await["error"], "Forbidden");
}

#[tokio::test]
async fn unknown_booking_is_not_found() {
    let (store, _, _) = seeded(BookingStatus::Pending).await;

    let response = app(&store)
        .oneshot(patch(Uuid::new_v4(), Some("customer-token"), json!({ "status": "cancelled" })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(json_body(response).await["error"], "Booking not found");
}

#[tokio::test]
async fn illegal_transition_is_bad_request() {
    let (store, _, id) = seeded(BookingStatus::Confirmed).await;

    let response = app(&store)
        .oneshot(patch(id, Some("customer-token"), json!({ "status": "completed" })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        json_body(response).await,
        json!({ "error": "Cannot transition from confirmed to completed" })
    );
}

#[tokio::test]
async fn empty_body_is_bad_request() {
    let (store, _, id) = seeded(BookingStatus::Pending).await;

    let response = app(&store)
        .oneshot(patch(id, Some("customer-token"), json!({})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn store_failure_is_internal_error() {
    let (store, _, id) = seeded(BookingStatus::Pending).await;
    store.fail_updates(true).await;

    let response = app(&store)
        .oneshot(patch(id, Some("customer-token"), json!({ "status": "cancelled" })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json_body(response).await, json!({ "error": "Internal server error" }));
}

#[tokio::test]
async fn get_returns_details_to_parties_only() {
    let (store, _, id) = seeded(BookingStatus::Pending).await;
    store.add_session("stranger-token", Uuid::new_v4()).await;

    let response = app(&store)
        .oneshot(get(&format!("/bookings/{id}"), "customer-token"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["serviceName"], "Bridal makeup");
    assert_eq!(body["providerBusinessName"], "Glow Studio");
    assert_eq!(body["status"], "pending");

    let response = app(&store)
        .oneshot(get(&format!("/bookings/{id}"), "stranger-token"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn list_is_scoped_to_the_requested_role() {
    let (store, _, id) = seeded(BookingStatus::Pending).await;

    let response = app(&store)
        .oneshot(get("/bookings?role=customer", "customer-token"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["id"], json!(id));

    let response = app(&store)
        .oneshot(get("/bookings?role=provider", "customer-token"))
        .await
        .unwrap();
    assert_eq!(json_body(response).await, json!([]));

    let response = app(&store)
        .oneshot(get("/bookings?role=provider", "provider-token"))
        .await
        .unwrap();
    assert_eq!(json_body(response).await.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn list_without_role_is_bad_request() {
    let (store, _, _) = seeded(BookingStatus::Pending).await;

    let response = app(&store)
        .oneshot(get("/bookings", "provider-token"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(json_body(response).await["error"].is_string());
}

#[tokio::test]
async fn unknown_status_value_gets_json_error() {
    let (store, _, id) = seeded(BookingStatus::Pending).await;

    let response = app(&store)
        .oneshot(patch(id, Some("customer-token"), json!({ "status": "shipped" })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert!(body["error"].as_str().unwrap().starts_with("Invalid request"));
    assert_eq!(store.booking(id).await.unwrap().status, BookingStatus::Pending);
}

#[tokio::test]
async fn malformed_body_gets_json_error() {
    let (store, _, id) = seeded(BookingStatus::Pending).await;
    let request = Request::builder()
        .method(Method::PATCH)
        .uri(format!("/bookings/{id}"))
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::AUTHORIZATION, "Bearer customer-token")
        .body(Body::from("{\"status\":"))
        .unwrap();

    let response = app(&store).oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(json_body(response).await["error"].is_string());
}

#[tokio::test]
async fn non_uuid_id_gets_json_error() {
    let (store, _, _) = seeded(BookingStatus::Pending).await;

    let response = app(&store)
        .oneshot(get("/bookings/not-a-uuid", "customer-token"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(json_body(response).await["error"].is_string());

    let request = Request::builder()
        .method(Method::PATCH)
        .uri("/bookings/not-a-uuid")
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::AUTHORIZATION, "Bearer customer-token")
        .body(Body::from(json!({ "status": "cancelled" }).to_string()))
        .unwrap();
    let response = app(&store).oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(json_body(response).await["error"].is_string());
}

#[tokio::test]
async fn health_needs_no_session() {
    let store = InMemoryBookingStore::new();

    let response = app(&store)
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&bytes[..], b"OK");
}
