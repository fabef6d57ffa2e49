use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use async_nats::jetstream::{self, stream::Config as StreamConfig};
use async_trait::async_trait;
use bytes::Bytes;
use futures::StreamExt;
use tracing::{error, info, instrument};

/// Creates durable pull consumers on a stream.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait JetStreamConsumer: Send + Sync {
    async fn create_consumer(
        &self,
        config: jetstream::consumer::pull::Config,
        stream_name: &str,
    ) -> Result<Box<dyn PullConsumer>>;
}

/// Fetches message batches from a pull consumer.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PullConsumer: Send + Sync {
    async fn fetch_messages(
        &self,
        max_messages: usize,
        expires: Duration,
    ) -> Result<Vec<jetstream::Message>>;
}

/// Publishes a message and awaits the stream acknowledgment. The input
/// message is only acked after this returns, which is what makes delivery
/// at-least-once.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait JetStreamPublisher: Send + Sync {
    async fn publish(&self, subject: String, payload: Bytes) -> Result<()>;
}

pub struct NatsClient {
    jetstream: jetstream::Context,
}

impl NatsClient {
    pub async fn connect(url: &str, timeout: Duration) -> Result<Self> {
        info!(url = %url, timeout_ms = timeout.as_millis(), "connecting to NATS");

        let client = async_nats::ConnectOptions::new()
            .connection_timeout(timeout)
            .connect(url)
            .await
            .context("failed to connect to NATS")?;

        let jetstream = jetstream::new(client);

        info!("connected to NATS");
        Ok(Self { jetstream })
    }

    /// Creates the stream if it does not exist yet, with one subject token
    /// reserved for the device id.
    pub async fn ensure_stream(&self, stream_name: &str) -> Result<()> {
        if self.jetstream.get_stream(stream_name).await.is_ok() {
            info!(stream = %stream_name, "stream already exists");
            return Ok(());
        }

        let config = StreamConfig {
            name: stream_name.to_owned(),
            subjects: vec![format!("{stream_name}.*")],
            ..Default::default()
        };
        self.jetstream
            .create_stream(config)
            .await
            .context("failed to create stream")?;
        info!(stream = %stream_name, "created stream");
        Ok(())
    }

    pub fn create_consumer_client(&self) -> Arc<dyn JetStreamConsumer> {
        Arc::new(NatsJetStreamConsumer {
            context: self.jetstream.clone(),
        })
    }

    pub fn create_publisher_client(&self) -> Arc<dyn JetStreamPublisher> {
        Arc::new(NatsJetStreamPublisher {
            context: self.jetstream.clone(),
        })
    }

    pub async fn close(self) {
        info!("closing NATS connection");
        // The connection drains when the last context clone is dropped.
    }
}

struct NatsJetStreamConsumer {
    context: jetstream::Context,
}

#[async_trait]
impl JetStreamConsumer for NatsJetStreamConsumer {
    async fn create_consumer(
        &self,
        config: jetstream::consumer::pull::Config,
        stream_name: &str,
    ) -> Result<Box<dyn PullConsumer>> {
        let consumer = self
            .context
            .create_consumer_on_stream(config, stream_name)
            .await
            .context("failed to create consumer")?;

        Ok(Box::new(NatsPullConsumer { consumer }))
    }
}

struct NatsPullConsumer {
    consumer: jetstream::consumer::PullConsumer,
}

#[async_trait]
impl PullConsumer for NatsPullConsumer {
    async fn fetch_messages(
        &self,
        max_messages: usize,
        expires: Duration,
    ) -> Result<Vec<jetstream::Message>> {
        let mut batch = self
            .consumer
            .fetch()
            .max_messages(max_messages)
            .expires(expires)
            .messages()
            .await
            .context("failed to fetch messages")?;

        let mut messages = Vec::new();
        while let Some(message) = batch.next().await {
            match message {
                Ok(message) => messages.push(message),
                Err(error) => {
                    // Keep whatever arrived intact; the rest redelivers.
                    error!(error = %error, "error receiving message");
                }
            }
        }
        Ok(messages)
    }
}

struct NatsJetStreamPublisher {
    context: jetstream::Context,
}

#[async_trait]
impl JetStreamPublisher for NatsJetStreamPublisher {
    #[instrument(skip(self, payload), fields(subject = %subject, payload_size = payload.len()))]
    async fn publish(&self, subject: String, payload: Bytes) -> Result<()> {
        let ack = self
            .context
            .publish(subject, payload)
            .await
            .context("failed to publish message")?;

        ack.await
            .context("failed to receive stream acknowledgment")?;
        Ok(())
    }
}
