#![allow(dead_code)]

use bigdecimal::BigDecimal;
use booking_service::store::InMemoryBookingStore;
use chrono::{NaiveDate, NaiveTime, Utc};
use shared::*;
use uuid::Uuid;

#[derive(Debug, Clone, Copy)]
pub struct Parties {
    pub customer: Uuid,
    pub provider: Uuid,
    pub provider_profile: Uuid,
}

impl Parties {
    pub fn new() -> Self {
        Self {
            customer: Uuid::new_v4(),
            provider: Uuid::new_v4(),
            provider_profile: Uuid::new_v4(),
        }
    }
}

pub fn details(parties: Parties, status: BookingStatus) -> BookingDetails {
    BookingDetails {
        booking: Booking {
            id: Uuid::new_v4(),
            customer_id: parties.customer,
            provider_id: parties.provider_profile,
            provider_user_id: parties.provider,
            provider_service_id: Uuid::new_v4(),
            scheduled_date: NaiveDate::from_ymd_opt(2026, 11, 20).unwrap(),
            scheduled_time: NaiveTime::from_hms_opt(15, 0, 0).unwrap(),
            end_time: NaiveTime::from_hms_opt(16, 30, 0),
            total_price: BigDecimal::from(95),
            travel_fee: BigDecimal::from(15),
            status,
            payment_intent_id: None,
            payment_status: PaymentStatus::Pending,
            notes: Some("Please bring hypoallergenic products".to_string()),
            version: 0,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        },
        service_name: "Bridal makeup".to_string(),
        service_duration_minutes: 90,
        customer_name: Some("Maya Ortiz".to_string()),
        provider_business_name: "Glow Studio".to_string(),
    }
}

/// A store holding one booking in `status`, plus sessions `customer-token` and `provider-token`.
pub async fn seeded(status: BookingStatus) -> (InMemoryBookingStore, Parties, Uuid) {
    let store = InMemoryBookingStore::new();
    let parties = Parties::new();
    let booking = details(parties, status);
    let id = booking.booking.id;
    store.insert(booking).await;
    store.add_session("customer-token", parties.customer).await;
    store.add_session("provider-token", parties.provider).await;
    (store, parties, id)
}
