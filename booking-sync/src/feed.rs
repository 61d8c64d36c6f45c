use futures::stream::{self, BoxStream, StreamExt};
use rdkafka::config::ClientConfig;
use rdkafka::consumer::{Consumer, StreamConsumer};
use rdkafka::Message;
use shared::{ChangeEvent, PartyFilter};
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::SyncError;

pub type ChangeStream = BoxStream<'static, Result<ChangeEvent, SyncError>>;

/// Source of committed row changes. Dropping the returned stream ends the
/// subscription.
pub trait ChangeFeed {
    fn subscribe(&self, filter: PartyFilter) -> Result<ChangeStream, SyncError>;
}

/// Reads the change topic with a throwaway consumer group, so every
/// subscriber sees every change from the moment it subscribed.
pub struct KafkaChangeFeed {
    brokers: String,
    topic: String,
}

impl KafkaChangeFeed {
    pub fn new(brokers: impl Into<String>, topic: impl Into<String>) -> Self {
        Self {
            brokers: brokers.into(),
            topic: topic.into(),
        }
    }
}

impl ChangeFeed for KafkaChangeFeed {
    fn subscribe(&self, filter: PartyFilter) -> Result<ChangeStream, SyncError> {
        let group_id = format!("booking-sync-{}", Uuid::new_v4());
        let consumer: StreamConsumer = ClientConfig::new()
            .set("bootstrap.servers", &self.brokers)
            .set("group.id", &group_id)
            .set("auto.offset.reset", "latest")
            .set("enable.auto.commit", "false")
            .set("enable.partition.eof", "false")
            .set("session.timeout.ms", "6000")
            .create()?;
        consumer.subscribe(&[self.topic.as_str()])?;

        info!(
            "Subscribed to '{}' as {} for {} {}",
            self.topic, group_id, filter.role, filter.party_id
        );

        let events = stream::unfold(consumer, move |consumer| async move {
            loop {
                let event = match consumer.recv().await {
                    Ok(message) => match message.payload() {
                        Some(payload) => serde_json::from_slice::<ChangeEvent>(payload).map_err(SyncError::from),
                        None => continue,
                    },
                    Err(e) => Err(SyncError::from(e)),
                };

                match event {
                    Ok(event) if !filter.matches(&event) => continue,
                    Err(SyncError::Decode(e)) => {
                        warn!("Skipping undecodable change event: {}", e);
                        continue;
                    }
                    other => return Some((other, consumer)),
                }
            }
        });

        Ok(events.boxed())
    }
}
