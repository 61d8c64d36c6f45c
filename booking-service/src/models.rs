use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use shared::*;
use uuid::Uuid;

use crate::store::{BookingPatch, StoreError};

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = crate::schema::bookings)]
pub struct BookingRow {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub provider_id: Uuid,
    pub provider_service_id: Uuid,
    pub scheduled_date: NaiveDate,
    pub scheduled_time: NaiveTime,
    pub end_time: Option<NaiveTime>,
    pub total_price: bigdecimal::BigDecimal,
    pub travel_fee: bigdecimal::BigDecimal,
    pub status: String,
    pub payment_intent_id: Option<String>,
    pub payment_status: String,
    pub notes: Option<String>,
    pub version: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl BookingRow {
    pub fn into_booking(self, provider_user_id: Uuid) -> Result<Booking, StoreError> {
        let status = self
            .status
            .parse::<BookingStatus>()
            .map_err(|e| StoreError::Corrupt(format!("booking {}: {}", self.id, e)))?;
        let payment_status = self
            .payment_status
            .parse::<PaymentStatus>()
            .map_err(|e| StoreError::Corrupt(format!("booking {}: {}", self.id, e)))?;

        let booking = Booking {
            id: self.id,
            customer_id: self.customer_id,
            provider_id: self.provider_id,
            provider_user_id,
            provider_service_id: self.provider_service_id,
            scheduled_date: self.scheduled_date,
            scheduled_time: self.scheduled_time,
            end_time: self.end_time,
            total_price: self.total_price,
            travel_fee: self.travel_fee,
            status,
            payment_intent_id: self.payment_intent_id,
            payment_status,
            notes: self.notes,
            version: self.version,
            created_at: self.created_at,
            updated_at: self.updated_at,
        };

        if !booking.amounts_valid() {
            return Err(StoreError::Corrupt(format!("booking {} has a negative amount", booking.id)));
        }
        Ok(booking)
    }
}

/// Display columns joined onto a booking row.
pub type DetailsRow = (BookingRow, Uuid, String, String, i32, Option<String>);

pub fn details_from_row(row: DetailsRow) -> Result<BookingDetails, StoreError> {
    let (booking, provider_user_id, provider_business_name, service_name, service_duration_minutes, customer_name) =
        row;
    Ok(BookingDetails {
        booking: booking.into_booking(provider_user_id)?,
        service_name,
        service_duration_minutes,
        customer_name,
        provider_business_name,
    })
}

#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = crate::schema::bookings)]
pub struct BookingChangeset {
    pub status: Option<String>,
    pub payment_intent_id: Option<String>,
    pub payment_status: Option<String>,
    pub version: i32,
    pub updated_at: DateTime<Utc>,
}

impl BookingChangeset {
    pub fn new(patch: &BookingPatch, next_version: i32) -> Self {
        let paid = patch.payment_intent_id.is_some();
        Self {
            status: patch.status.map(|s| s.as_str().to_string()),
            payment_intent_id: patch.payment_intent_id.clone(),
            payment_status: paid.then(|| PaymentStatus::Paid.as_str().to_string()),
            version: next_version,
            updated_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Queryable, Insertable)]
#[diesel(table_name = crate::schema::notifications)]
pub struct NotificationRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub notification_type: String,
    pub title: String,
    pub message: String,
    pub data: serde_json::Value,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

impl From<Notification> for NotificationRow {
    fn from(n: Notification) -> Self {
        Self {
            id: n.id,
            user_id: n.user_id,
            notification_type: n.notification_type,
            title: n.title,
            message: n.message,
            data: n.data,
            is_read: n.is_read,
            created_at: n.created_at,
        }
    }
}

impl From<NotificationRow> for Notification {
    fn from(row: NotificationRow) -> Self {
        Self {
            id: row.id,
            user_id: row.user_id,
            notification_type: row.notification_type,
            title: row.title,
            message: row.message,
            data: row.data,
            is_read: row.is_read,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, Clone, Queryable, Serialize, Deserialize)]
pub struct DbOutboxEvent {
    pub id: Uuid,
    pub aggregate_id: Uuid,
    pub event_type: String,
    pub event_data: serde_json::Value,
    pub processed: Option<bool>,
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = crate::schema::outbox_events)]
pub struct NewOutboxEvent {
    pub id: Uuid,
    pub aggregate_id: Uuid,
    pub event_type: String,
    pub event_data: serde_json::Value,
}

impl NewOutboxEvent {
    pub fn change(event: &ChangeEvent) -> Result<Self, serde_json::Error> {
        Ok(Self {
            id: Uuid::new_v4(),
            aggregate_id: event.record_id,
            event_type: change_event_type(event),
            event_data: serde_json::to_value(event)?,
        })
    }
}

/// Outbox `event_type` label, e.g. `bookings.update`.
pub fn change_event_type(event: &ChangeEvent) -> String {
    let kind = match event.kind {
        ChangeKind::Insert => "insert",
        ChangeKind::Update => "update",
        ChangeKind::Delete => "delete",
    };
    format!("{}.{}", event.table.as_str(), kind)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bigdecimal::BigDecimal;

    fn row(status: &str) -> BookingRow {
        BookingRow {
            id: Uuid::new_v4(),
            customer_id: Uuid::new_v4(),
            provider_id: Uuid::new_v4(),
            provider_service_id: Uuid::new_v4(),
            scheduled_date: NaiveDate::from_ymd_opt(2026, 12, 1).unwrap(),
            scheduled_time: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            end_time: NaiveTime::from_hms_opt(10, 0, 0),
            total_price: BigDecimal::from(80),
            travel_fee: BigDecimal::from(10),
            status: status.to_string(),
            payment_intent_id: None,
            payment_status: "pending".to_string(),
            notes: Some("Ring twice".to_string()),
            version: 3,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn row_converts_with_resolved_provider_party() {
        let provider_user_id = Uuid::new_v4();
        let booking = row("in_progress").into_booking(provider_user_id).unwrap();
        assert_eq!(booking.status, BookingStatus::InProgress);
        assert_eq!(booking.provider_user_id, provider_user_id);
        assert_eq!(booking.version, 3);
    }

    #[test]
    fn unknown_status_is_reported_as_corrupt() {
        let err = row("archived").into_booking(Uuid::new_v4()).unwrap_err();
        assert!(matches!(err, StoreError::Corrupt(_)));
    }

    #[test]
    fn changeset_marks_paid_only_with_intent() {
        let with_intent = BookingChangeset::new(
            &BookingPatch {
                status: Some(BookingStatus::Confirmed),
                payment_intent_id: Some("pi_123".to_string()),
            },
            4,
        );
        assert_eq!(with_intent.payment_status.as_deref(), Some("paid"));
        assert_eq!(with_intent.status.as_deref(), Some("confirmed"));
        assert_eq!(with_intent.version, 4);

        let without = BookingChangeset::new(
            &BookingPatch {
                status: Some(BookingStatus::Cancelled),
                payment_intent_id: None,
            },
            4,
        );
        assert_eq!(without.payment_status, None);
        assert_eq!(without.payment_intent_id, None);
    }

    #[test]
    fn outbox_event_type_names_table_and_kind() {
        let booking = row("pending").into_booking(Uuid::new_v4()).unwrap();
        let event = ChangeEvent::booking(ChangeKind::Update, &booking);
        let outbox = NewOutboxEvent::change(&event).unwrap();
        assert_eq!(outbox.event_type, "bookings.update");
        assert_eq!(outbox.aggregate_id, booking.id);
    }
}
