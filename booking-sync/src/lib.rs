pub mod error;
pub mod feed;
pub mod fetch;
pub mod session;
pub mod synchronizer;
pub mod toast;
pub mod views;

pub use error::SyncError;
pub use feed::{ChangeFeed, ChangeStream, KafkaChangeFeed};
pub use fetch::{BookingFetcher, HttpBookingFetcher};
pub use session::SessionContext;
pub use synchronizer::{Applied, SyncHandle, Synchronizer};
pub use toast::{Toast, ToastSlot, TOAST_TTL};
