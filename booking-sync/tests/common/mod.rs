#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use bigdecimal::BigDecimal;
use booking_sync::{BookingFetcher, ChangeFeed, ChangeStream, SyncError};
use chrono::{NaiveDate, NaiveTime, Utc};
use futures::stream::{self, StreamExt};
use shared::*;
use tokio::sync::mpsc;
use uuid::Uuid;

/// Delivers whatever the test sends, without any party filtering.
pub struct ChannelFeed {
    rx: Mutex<Option<mpsc::UnboundedReceiver<ChangeEvent>>>,
}

pub fn channel_feed() -> (mpsc::UnboundedSender<ChangeEvent>, ChannelFeed) {
    let (tx, rx) = mpsc::unbounded_channel();
    (tx, ChannelFeed { rx: Mutex::new(Some(rx)) })
}

impl ChangeFeed for ChannelFeed {
    fn subscribe(&self, _filter: PartyFilter) -> Result<ChangeStream, SyncError> {
        let rx = self.rx.lock().unwrap().take().expect("feed subscribed twice");
        let events = stream::unfold(rx, |mut rx| async move {
            let event = rx.recv().await?;
            Some((Ok(event), rx))
        });
        Ok(events.boxed())
    }
}

/// Serves bookings from a map the test controls.
#[derive(Clone, Default)]
pub struct MapFetcher {
    bookings: Arc<Mutex<HashMap<Uuid, BookingDetails>>>,
}

impl MapFetcher {
    pub fn put(&self, details: BookingDetails) {
        self.bookings.lock().unwrap().insert(details.id(), details);
    }
}

impl BookingFetcher for MapFetcher {
    async fn fetch(&self, id: Uuid) -> Result<Option<BookingDetails>, SyncError> {
        Ok(self.bookings.lock().unwrap().get(&id).cloned())
    }
}

pub fn booking(customer: Uuid, provider: Uuid, status: BookingStatus, date: NaiveDate) -> BookingDetails {
    BookingDetails {
        booking: Booking {
            id: Uuid::new_v4(),
            customer_id: customer,
            provider_id: Uuid::new_v4(),
            provider_user_id: provider,
            provider_service_id: Uuid::new_v4(),
            scheduled_date: date,
            scheduled_time: NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
            end_time: None,
            total_price: BigDecimal::from(60),
            travel_fee: BigDecimal::from(0),
            status,
            payment_intent_id: None,
            payment_status: PaymentStatus::Pending,
            notes: None,
            version: 0,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        },
        service_name: "Gel manicure".to_string(),
        service_duration_minutes: 45,
        customer_name: None,
        provider_business_name: "Nail Bar".to_string(),
    }
}

pub fn with_status(details: &BookingDetails, status: BookingStatus) -> BookingDetails {
    let mut next = details.clone();
    next.booking.status = status;
    next.booking.version += 1;
    next
}

pub fn event(kind: ChangeKind, details: &BookingDetails) -> ChangeEvent {
    ChangeEvent::booking(kind, &details.booking)
}

pub fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 11, d).unwrap()
}

/// Lets the driver task run until it has nothing left to do.
pub async fn settle() {
    for _ in 0..50 {
        tokio::task::yield_now().await;
    }
}
