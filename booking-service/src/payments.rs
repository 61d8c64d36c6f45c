use std::sync::Arc;

use anyhow::Result;
use futures::StreamExt;
use rdkafka::consumer::{CommitMode, Consumer, StreamConsumer};
use rdkafka::Message;
use serde::{Deserialize, Serialize};
use shared::BookingStatus;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::error::BookingError;
use crate::lifecycle::{BookingLifecycle, TransitionOutcome, TransitionRequest};
use crate::store::BookingStore;

/// Messages bridged from the payment processor's webhooks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PaymentEvent {
    PaymentSucceeded {
        booking_id: Uuid,
        customer_id: Uuid,
        payment_intent_id: String,
    },
    PaymentFailed {
        booking_id: Uuid,
        payment_intent_id: String,
        #[serde(default)]
        reason: Option<String>,
    },
}

/// Confirms bookings whose payment went through, acting as the paying customer.
pub struct PaymentEventHandler<S> {
    lifecycle: Arc<BookingLifecycle<S>>,
}

impl<S: BookingStore> PaymentEventHandler<S> {
    pub fn new(lifecycle: Arc<BookingLifecycle<S>>) -> Self {
        Self { lifecycle }
    }

    pub async fn run(&self, consumer: StreamConsumer) {
        let mut message_stream = consumer.stream();

        while let Some(message) = message_stream.next().await {
            match message {
                Ok(m) => {
                    if let Some(payload) = m.payload_view::<str>() {
                        match payload {
                            Ok(json_str) => match serde_json::from_str::<PaymentEvent>(json_str) {
                                Ok(event) => {
                                    if let Err(e) = self.handle_event(event).await {
                                        error!("Error handling payment event: {}", e);
                                    }
                                }
                                Err(e) => warn!("Skipping malformed payment event: {}", e),
                            },
                            Err(e) => error!("Error parsing payload: {}", e),
                        }
                    }
                    if let Err(e) = consumer.commit_message(&m, CommitMode::Async) {
                        error!("Error committing message: {}", e);
                    }
                }
                Err(e) => error!("Error receiving message: {}", e),
            }
        }
    }

    /// Returns the transition outcome when the event moved a booking.
    pub async fn handle_event(&self, event: PaymentEvent) -> Result<Option<TransitionOutcome>> {
        match event {
            PaymentEvent::PaymentSucceeded {
                booking_id,
                customer_id,
                payment_intent_id,
            } => {
                let request = TransitionRequest::to(BookingStatus::Confirmed).with_payment_intent(payment_intent_id.clone());
                match self.lifecycle.request_transition(booking_id, customer_id, request).await {
                    Ok(outcome) => {
                        info!("Booking {} confirmed by payment", booking_id);
                        Ok(Some(outcome))
                    }
                    Err(BookingError::InvalidTransition { from, .. }) => {
                        self.link_late_payment(booking_id, customer_id, from, payment_intent_id)
                            .await
                    }
                    Err(e) => Err(e.into()),
                }
            }
            PaymentEvent::PaymentFailed {
                booking_id,
                payment_intent_id,
                reason,
            } => {
                warn!(
                    "Payment {} for booking {} failed: {}",
                    payment_intent_id,
                    booking_id,
                    reason.as_deref().unwrap_or("no reason given")
                );
                Ok(None)
            }
        }
    }

    /// The booking left `pending` before the webhook landed. The payment is
    /// still recorded unless this intent is already on the booking.
    async fn link_late_payment(
        &self,
        booking_id: Uuid,
        customer_id: Uuid,
        status: BookingStatus,
        payment_intent_id: String,
    ) -> Result<Option<TransitionOutcome>> {
        let details = self.lifecycle.get_booking(booking_id, customer_id).await?;
        if details.booking.payment_intent_id.as_deref() == Some(payment_intent_id.as_str()) {
            warn!("Ignoring replayed payment {} for booking {}", payment_intent_id, booking_id);
            return Ok(None);
        }

        let request = TransitionRequest {
            status: None,
            payment_intent_id: Some(payment_intent_id),
        };
        let outcome = self
            .lifecycle
            .request_transition(booking_id, customer_id, request)
            .await?;
        info!("Recorded payment for booking {} already {}", booking_id, status);
        Ok(Some(outcome))
    }
}
