use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use async_nats::jetstream;
use async_nats::jetstream::message::AckKind;
use bytes::Bytes;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::nats::client::{JetStreamConsumer, PullConsumer};

/// Owned copy of one message handed to a processor.
#[derive(Debug, Clone)]
pub struct ConsumedMessage {
    pub subject: String,
    pub payload: Bytes,
}

/// What to do with a message after processing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Disposition {
    /// Handled; acknowledge it.
    Ack,
    /// Handling failed in a way redelivery may fix; reject it.
    Nak(Option<String>),
}

/// Per-message processing function. Returning `Err` is fatal: the consumer
/// loop stops and takes the whole instance down with it, leaving the message
/// uncommitted for the restarted instance.
pub type MessageProcessor = Box<
    dyn Fn(ConsumedMessage) -> Pin<Box<dyn Future<Output = Result<Disposition>> + Send>>
        + Send
        + Sync,
>;

/// Durable pull consumer running one stream's messages through a processor,
/// strictly in order.
pub struct NatsConsumer {
    consumer: Box<dyn PullConsumer>,
    stream_name: String,
    consumer_name: String,
    batch_size: usize,
    max_wait: Duration,
    processor: MessageProcessor,
}

impl NatsConsumer {
    pub async fn new(
        jetstream: Arc<dyn JetStreamConsumer>,
        stream_name: &str,
        consumer_name: &str,
        subject_filter: &str,
        batch_size: usize,
        max_wait_secs: u64,
        processor: MessageProcessor,
    ) -> Result<Self> {
        debug!(
            stream = %stream_name,
            consumer = %consumer_name,
            filter_subject = %subject_filter,
            "creating consumer"
        );

        let config = jetstream::consumer::pull::Config {
            name: Some(consumer_name.to_owned()),
            durable_name: Some(consumer_name.to_owned()),
            filter_subject: subject_filter.to_owned(),
            ack_policy: jetstream::consumer::AckPolicy::Explicit,
            ..Default::default()
        };

        let consumer = jetstream
            .create_consumer(config, stream_name)
            .await
            .context("failed to create consumer")?;

        Ok(Self {
            consumer,
            stream_name: stream_name.to_owned(),
            consumer_name: consumer_name.to_owned(),
            batch_size,
            max_wait: Duration::from_secs(max_wait_secs),
            processor,
        })
    }

    /// Consumes until cancellation; a processor error aborts the loop.
    pub async fn run(self, ctx: CancellationToken) -> Result<()> {
        info!(
            stream = %self.stream_name,
            consumer = %self.consumer_name,
            "starting consumer"
        );

        loop {
            tokio::select! {
                _ = ctx.cancelled() => {
                    info!(
                        stream = %self.stream_name,
                        consumer = %self.consumer_name,
                        "received shutdown signal, stopping consumer"
                    );
                    break;
                }
                result = self.fetch_and_process() => {
                    result?;
                }
            }
        }

        Ok(())
    }

    async fn fetch_and_process(&self) -> Result<()> {
        let messages = match self
            .consumer
            .fetch_messages(self.batch_size, self.max_wait)
            .await
        {
            Ok(messages) => messages,
            Err(error) => {
                // Transient broker fault; keep polling.
                error!(
                    stream = %self.stream_name,
                    error = %error,
                    "failed to fetch messages"
                );
                tokio::time::sleep(Duration::from_secs(1)).await;
                return Ok(());
            }
        };

        if messages.is_empty() {
            return Ok(());
        }

        debug!(message_count = messages.len(), "received message batch");

        for message in &messages {
            let request = ConsumedMessage {
                subject: message.subject.to_string(),
                payload: message.payload.clone(),
            };

            match (self.processor)(request).await? {
                Disposition::Ack => {
                    if let Err(error) = message.ack().await {
                        warn!(error = %error, "failed to ack message");
                    }
                }
                Disposition::Nak(reason) => {
                    warn!(
                        subject = %message.subject,
                        reason = reason.as_deref().unwrap_or("unspecified"),
                        "rejecting message for redelivery"
                    );
                    if let Err(error) = message.ack_with(AckKind::Nak(None)).await {
                        warn!(error = %error, "failed to nak message");
                    }
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dispositions_compare_by_kind_and_reason() {
        assert_eq!(Disposition::Ack, Disposition::Ack);
        assert_eq!(
            Disposition::Nak(Some("store down".to_owned())),
            Disposition::Nak(Some("store down".to_owned()))
        );
        assert_ne!(Disposition::Ack, Disposition::Nak(None));
    }
}
