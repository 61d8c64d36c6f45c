mod booking;
mod change;
mod notification;
mod status;

pub use booking::{Booking, BookingDetails, PartyRole};
pub use change::{ChangeEvent, ChangeKind, ChangeTable, PartyFilter};
pub use notification::{status_notice, NewNotification, Notification, StatusNotice, NEW_BOOKING_NOTICE};
pub use status::{BookingStatus, PaymentStatus, UnknownStatus};

/// Topic the outbox publishes committed row changes to.
pub const CHANGE_TOPIC: &str = "booking-changes";

/// Topic the payment processor's webhook bridge publishes to.
pub const PAYMENT_TOPIC: &str = "payment-events";
