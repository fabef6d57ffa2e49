use std::sync::Arc;

use privacy_domain::{
    FenceUpdateService, InMemoryFenceStore, JsonCodec, StatusRedactionService,
    VehicleStatusRedactionService,
};
use privacy_runner::{boxed_process, AppProcess};
use tracing::info;

use crate::nats::{
    create_fence_processor, create_status_processor, create_vehicle_status_processor, NatsClient,
    NatsConsumer, NatsStatusProducer, NatsVehicleStatusProducer,
};

pub struct PrivacyWorkerConfig {
    pub status_stream: String,
    pub status_subject: String,
    pub status_consumer_name: String,
    pub status_output_stream: String,

    pub vehicle_status_stream: String,
    pub vehicle_status_subject: String,
    pub vehicle_status_consumer_name: String,
    pub vehicle_status_output_stream: String,

    pub fence_stream: String,
    pub fence_subject: String,
    pub fence_consumer_name: String,

    pub nats_batch_size: usize,
    pub nats_batch_wait_secs: u64,
}

/// One pipeline instance: both status generations joined against the same
/// fence table, each consuming and emitting on its own stream pair.
pub struct PrivacyWorker {
    fence_consumer: NatsConsumer,
    status_consumer: NatsConsumer,
    vehicle_status_consumer: NatsConsumer,
}

impl PrivacyWorker {
    pub async fn new(
        nats_client: Arc<NatsClient>,
        config: PrivacyWorkerConfig,
    ) -> anyhow::Result<Self> {
        info!("initializing privacy worker");

        let fence_store = Arc::new(InMemoryFenceStore::new());

        // Fence table materializer, the sole writer to the store.
        let fence_codec = Arc::new(JsonCodec::new());
        let fence_service = Arc::new(FenceUpdateService::new(fence_store.clone()));
        let fence_consumer = NatsConsumer::new(
            nats_client.create_consumer_client(),
            &config.fence_stream,
            &config.fence_consumer_name,
            &config.fence_subject,
            config.nats_batch_size,
            config.nats_batch_wait_secs,
            create_fence_processor(fence_codec, fence_service),
        )
        .await?;

        // Simple status pipeline.
        let status_codec = Arc::new(JsonCodec::new());
        let status_producer = Arc::new(NatsStatusProducer::new(
            nats_client.create_publisher_client(),
            status_codec.clone(),
            config.status_output_stream.clone(),
        ));
        let status_service = Arc::new(StatusRedactionService::new(
            fence_store.clone(),
            status_producer,
        ));
        let status_consumer = NatsConsumer::new(
            nats_client.create_consumer_client(),
            &config.status_stream,
            &config.status_consumer_name,
            &config.status_subject,
            config.nats_batch_size,
            config.nats_batch_wait_secs,
            create_status_processor(status_codec, status_service),
        )
        .await?;

        // Vehicle status pipeline.
        let vehicle_codec = Arc::new(JsonCodec::new());
        let vehicle_producer = Arc::new(NatsVehicleStatusProducer::new(
            nats_client.create_publisher_client(),
            vehicle_codec.clone(),
            config.vehicle_status_output_stream.clone(),
        ));
        let vehicle_service = Arc::new(VehicleStatusRedactionService::new(
            fence_store,
            vehicle_producer,
        ));
        let vehicle_status_consumer = NatsConsumer::new(
            nats_client.create_consumer_client(),
            &config.vehicle_status_stream,
            &config.vehicle_status_consumer_name,
            &config.vehicle_status_subject,
            config.nats_batch_size,
            config.nats_batch_wait_secs,
            create_vehicle_status_processor(vehicle_codec, vehicle_service),
        )
        .await?;

        info!(
            status_stream = %config.status_stream,
            vehicle_status_stream = %config.vehicle_status_stream,
            fence_stream = %config.fence_stream,
            "privacy worker initialized"
        );

        Ok(Self {
            fence_consumer,
            status_consumer,
            vehicle_status_consumer,
        })
    }

    pub fn into_runner_processes(self) -> Vec<(&'static str, AppProcess)> {
        let Self {
            fence_consumer,
            status_consumer,
            vehicle_status_consumer,
        } = self;

        vec![
            (
                "fence_consumer",
                boxed_process(move |ctx| fence_consumer.run(ctx)),
            ),
            (
                "status_consumer",
                boxed_process(move |ctx| status_consumer.run(ctx)),
            ),
            (
                "vehicle_status_consumer",
                boxed_process(move |ctx| vehicle_status_consumer.run(ctx)),
            ),
        ]
    }
}
