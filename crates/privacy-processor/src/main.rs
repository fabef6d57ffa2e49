mod config;
mod health;
mod telemetry;

use std::sync::Arc;
use std::time::Duration;

use config::ServiceConfig;
use privacy_runner::{boxed_process, Runner};
use privacy_worker::{NatsClient, PrivacyWorker, PrivacyWorkerConfig};
use tracing::{error, info};

#[tokio::main]
async fn main() {
    let config = match ServiceConfig::from_env() {
        Ok(config) => config,
        Err(error) => {
            eprintln!("failed to load configuration: {error}");
            std::process::exit(1);
        }
    };

    telemetry::init_telemetry(&config.log_level);

    info!("starting privacy processor");
    info!(
        input_stream = %config.status_stream,
        fence_stream = %config.fence_stream,
        output_stream = %config.status_output_stream,
        "status pipeline topology"
    );
    info!(
        input_stream = %config.vehicle_status_stream,
        fence_stream = %config.fence_stream,
        output_stream = %config.vehicle_status_output_stream,
        "vehicle status pipeline topology"
    );

    let nats_client = match initialize_nats(&config).await {
        Ok(client) => client,
        Err(error) => {
            error!(error = %format!("{error:#}"), "failed to initialize NATS");
            std::process::exit(1);
        }
    };

    let worker = match PrivacyWorker::new(nats_client.clone(), worker_config(&config)).await {
        Ok(worker) => worker,
        Err(error) => {
            error!(error = %format!("{error:#}"), "failed to initialize privacy worker");
            std::process::exit(1);
        }
    };

    let mut runner = Runner::new();

    for (name, process) in worker.into_runner_processes() {
        runner = runner.with_named_process(name, process);
    }

    let health_port = config.health_port;
    runner = runner.with_named_process(
        "health",
        boxed_process(move |ctx| health::serve_health(health_port, ctx)),
    );

    runner = runner
        .with_closer({
            let nats_for_close = Arc::clone(&nats_client);
            move || async move {
                if let Ok(client) = Arc::try_unwrap(nats_for_close) {
                    client.close().await;
                }
                Ok(())
            }
        })
        .with_closer_timeout(Duration::from_secs(10));

    runner.run().await;
}

async fn initialize_nats(config: &ServiceConfig) -> anyhow::Result<Arc<NatsClient>> {
    let client = Arc::new(
        NatsClient::connect(
            &config.nats_url,
            Duration::from_secs(config.startup_timeout_secs),
        )
        .await?,
    );

    client.ensure_stream(&config.status_stream).await?;
    client.ensure_stream(&config.status_output_stream).await?;
    client.ensure_stream(&config.vehicle_status_stream).await?;
    client
        .ensure_stream(&config.vehicle_status_output_stream)
        .await?;
    client.ensure_stream(&config.fence_stream).await?;

    Ok(client)
}

fn worker_config(config: &ServiceConfig) -> PrivacyWorkerConfig {
    PrivacyWorkerConfig {
        status_stream: config.status_stream.clone(),
        status_subject: config.status_subject.clone(),
        status_consumer_name: config.status_consumer_name.clone(),
        status_output_stream: config.status_output_stream.clone(),
        vehicle_status_stream: config.vehicle_status_stream.clone(),
        vehicle_status_subject: config.vehicle_status_subject.clone(),
        vehicle_status_consumer_name: config.vehicle_status_consumer_name.clone(),
        vehicle_status_output_stream: config.vehicle_status_output_stream.clone(),
        fence_stream: config.fence_stream.clone(),
        fence_subject: config.fence_subject.clone(),
        fence_consumer_name: config.fence_consumer_name.clone(),
        nats_batch_size: config.nats_batch_size,
        nats_batch_wait_secs: config.nats_batch_wait_secs,
    }
}
