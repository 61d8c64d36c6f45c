use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::booking::Booking;
use crate::status::BookingStatus;

/// Fixed copy shown to a party when a booking changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusNotice {
    pub notification_type: &'static str,
    pub title: &'static str,
    pub message: &'static str,
}

pub const NEW_BOOKING_NOTICE: StatusNotice = StatusNotice {
    notification_type: "booking_created",
    title: "New Booking",
    message: "You have a new booking request",
};

/// Copy for a status change. `Pending` has no entry, so nothing is announced for it.
pub fn status_notice(status: BookingStatus) -> Option<StatusNotice> {
    let notice = match status {
        BookingStatus::Confirmed => StatusNotice {
            notification_type: "booking_confirmed",
            title: "Booking Confirmed",
            message: "Your booking has been confirmed",
        },
        BookingStatus::Cancelled => StatusNotice {
            notification_type: "booking_cancelled",
            title: "Booking Cancelled",
            message: "Your booking has been cancelled",
        },
        BookingStatus::InProgress => StatusNotice {
            notification_type: "booking_in_progress",
            title: "Service Started",
            message: "Your service is now in progress",
        },
        BookingStatus::Completed => StatusNotice {
            notification_type: "booking_completed",
            title: "Service Completed",
            message: "Your service has been completed",
        },
        BookingStatus::Pending => return None,
    };
    Some(notice)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: Uuid,
    pub user_id: Uuid,
    pub notification_type: String,
    pub title: String,
    pub message: String,
    pub data: serde_json::Value,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewNotification {
    pub user_id: Uuid,
    pub notification_type: String,
    pub title: String,
    pub message: String,
    pub data: serde_json::Value,
}

impl NewNotification {
    /// Notification for `recipient` about `booking` having reached its current status.
    pub fn for_status_change(booking: &Booking, recipient: Uuid) -> Option<Self> {
        let notice = status_notice(booking.status)?;
        Some(Self {
            user_id: recipient,
            notification_type: notice.notification_type.to_string(),
            title: notice.title.to_string(),
            message: notice.message.to_string(),
            data: serde_json::json!({
                "booking_id": booking.id,
                "status": booking.status,
            }),
        })
    }

    pub fn into_notification(self) -> Notification {
        Notification {
            id: Uuid::new_v4(),
            user_id: self.user_id,
            notification_type: self.notification_type,
            title: self.title,
            message: self.message,
            data: self.data,
            is_read: false,
            created_at: Utc::now(),
        }
    }
}
