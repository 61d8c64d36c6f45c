//! Keeps a party's booking list convergent with the change feed.
//!
//! A [`Synchronizer`] is seeded with a snapshot and applies change events one
//! at a time, in arrival order. [`Synchronizer::spawn`] moves it onto a driver
//! task and hands back a [`SyncHandle`] for reading the list and tearing the
//! subscription down.

use std::sync::Arc;

use chrono::NaiveDate;
use futures::StreamExt;
use shared::*;
use tokio::sync::{oneshot, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::SyncError;
use crate::feed::{ChangeFeed, ChangeStream};
use crate::fetch::BookingFetcher;
use crate::session::SessionContext;
use crate::toast::{Toast, ToastSlot};
use crate::views;

/// What applying one change event did to the list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    Inserted(Uuid),
    Replaced(Uuid),
    Removed(Uuid),
    /// The update was admitted but its booking is not in the list.
    Unlisted(Uuid),
    Dropped,
}

#[derive(Default)]
struct SyncState {
    bookings: Vec<BookingDetails>,
    toast: ToastSlot,
}

pub struct Synchronizer<F> {
    session: SessionContext,
    fetcher: F,
    state: Arc<Mutex<SyncState>>,
}

impl<F: BookingFetcher> Synchronizer<F> {
    pub fn new(session: SessionContext, snapshot: Vec<BookingDetails>, fetcher: F) -> Self {
        Self {
            session,
            fetcher,
            state: Arc::new(Mutex::new(SyncState {
                bookings: snapshot,
                toast: ToastSlot::new(),
            })),
        }
    }

    pub fn session(&self) -> SessionContext {
        self.session
    }

    pub async fn bookings(&self) -> Vec<BookingDetails> {
        self.state.lock().await.bookings.clone()
    }

    pub async fn current_toast(&self) -> Option<Toast> {
        self.state.lock().await.toast.current()
    }

    /// Reconciles the list with one committed change.
    pub async fn apply(&self, event: &ChangeEvent) -> Result<Applied, SyncError> {
        let filter = self.session.filter();
        if event.table != ChangeTable::Bookings || !filter.matches(event) {
            debug!("Dropping {} change for {}", event.table.as_str(), event.record_id);
            return Ok(Applied::Dropped);
        }

        let id = event.record_id;
        match event.kind {
            ChangeKind::Insert => {
                if self.contains(id).await {
                    return Ok(Applied::Dropped);
                }
                let Some(details) = self.fetch_admitted(id).await? else {
                    return Ok(Applied::Dropped);
                };

                let mut state = self.state.lock().await;
                // may have arrived while the fetch was in flight
                if state.bookings.iter().any(|d| d.id() == id) {
                    return Ok(Applied::Dropped);
                }
                state.bookings.insert(0, details);
                state.toast.show(NEW_BOOKING_NOTICE);
                info!("Booking {} added", id);
                Ok(Applied::Inserted(id))
            }
            ChangeKind::Update => {
                let Some(details) = self.fetch_admitted(id).await? else {
                    return Ok(Applied::Dropped);
                };
                let status = details.status();

                let mut state = self.state.lock().await;
                if let Some(notice) = status_notice(status) {
                    state.toast.show(notice);
                }
                match state.bookings.iter_mut().find(|d| d.id() == id) {
                    Some(entry) => {
                        *entry = details;
                        info!("Booking {} is now {}", id, status);
                        Ok(Applied::Replaced(id))
                    }
                    None => Ok(Applied::Unlisted(id)),
                }
            }
            ChangeKind::Delete => {
                let mut state = self.state.lock().await;
                match state.bookings.iter().position(|d| d.id() == id) {
                    Some(index) => {
                        state.bookings.remove(index);
                        info!("Booking {} removed", id);
                        Ok(Applied::Removed(id))
                    }
                    None => Ok(Applied::Dropped),
                }
            }
        }
    }

    /// Subscribes to `feed` and processes its events on a background task
    /// until the handle is closed or dropped.
    pub fn spawn(self, feed: &impl ChangeFeed) -> Result<SyncHandle, SyncError> {
        let events = feed.subscribe(self.session.filter())?;
        let state = Arc::clone(&self.state);
        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let task = tokio::spawn(self.drive(events, shutdown_rx));

        Ok(SyncHandle {
            state,
            shutdown: Some(shutdown_tx),
            task: Some(task),
        })
    }

    async fn drive(self, mut events: ChangeStream, mut shutdown: oneshot::Receiver<()>) {
        loop {
            let event = tokio::select! {
                biased;
                _ = &mut shutdown => break,
                next = events.next() => match next {
                    Some(Ok(event)) => event,
                    Some(Err(e)) => {
                        warn!("Change feed error: {}", e);
                        continue;
                    }
                    None => {
                        info!("Change feed ended");
                        break;
                    }
                },
            };

            tokio::select! {
                biased;
                _ = &mut shutdown => break,
                result = self.apply(&event) => {
                    if let Err(e) = result {
                        warn!("Failed to apply change to booking {}: {}", event.record_id, e);
                    }
                }
            }
        }
        debug!("Synchronizer for {} stopped", self.session.party_id);
    }

    async fn contains(&self, id: Uuid) -> bool {
        self.state.lock().await.bookings.iter().any(|d| d.id() == id)
    }

    async fn fetch_admitted(&self, id: Uuid) -> Result<Option<BookingDetails>, SyncError> {
        let Some(details) = self.fetcher.fetch(id).await? else {
            debug!("Booking {} no longer visible", id);
            return Ok(None);
        };
        if !self.session.filter().admits(&details.booking) {
            warn!("Fetched booking {} does not belong to {}", id, self.session.party_id);
            return Ok(None);
        }
        Ok(Some(details))
    }
}

/// Read side of a running synchronizer.
///
/// Dropping the handle stops the driver as well; [`SyncHandle::close`] also
/// waits for it to finish.
pub struct SyncHandle {
    state: Arc<Mutex<SyncState>>,
    shutdown: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<()>>,
}

impl SyncHandle {
    pub async fn snapshot(&self) -> Vec<BookingDetails> {
        self.state.lock().await.bookings.clone()
    }

    pub async fn upcoming(&self, today: NaiveDate) -> Vec<BookingDetails> {
        let state = self.state.lock().await;
        views::upcoming(&state.bookings, today).into_iter().cloned().collect()
    }

    pub async fn past(&self, today: NaiveDate) -> Vec<BookingDetails> {
        let state = self.state.lock().await;
        views::past(&state.bookings, today).into_iter().cloned().collect()
    }

    pub async fn current_toast(&self) -> Option<Toast> {
        self.state.lock().await.toast.current()
    }

    /// Merges a snapshot loaded after the subscription opened. Entries the
    /// feed has already delivered win; the rest keep snapshot order behind them.
    pub async fn seed(&self, snapshot: Vec<BookingDetails>) {
        let mut state = self.state.lock().await;
        for details in snapshot {
            if !state.bookings.iter().any(|d| d.id() == details.id()) {
                state.bookings.push(details);
            }
        }
    }

    pub async fn dismiss_toast(&self) {
        self.state.lock().await.toast.dismiss();
    }

    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }

    /// Releases the subscription. No event is applied once this returns.
    pub async fn close(mut self) -> Result<(), SyncError> {
        if let Some(shutdown) = self.shutdown.take() {
            // the driver may already have stopped on its own
            let _ = shutdown.send(());
        }
        match self.task.take() {
            Some(task) => task.await.map_err(|e| SyncError::Closed(e.to_string())),
            None => Ok(()),
        }
    }
}
