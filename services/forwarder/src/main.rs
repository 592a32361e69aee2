use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use eventpipe_batch::{install_signal_handlers, BatchingHarness, BatchingHarnessConfig, ShutdownFlag};
use eventpipe_consumer::{SynchronizedConsumer, SynchronizedConsumerConfig};
use eventpipe_queue::{InProcessTaskQueue, POST_PROCESS_GROUP};
use forwarder::consumer_split::SharedConsumer;
use forwarder::{Args, Config, ForwarderError, ForwarderStrategy};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_new(&args.log_level).unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    if let Err(err) = run(args).await {
        tracing::error!(error = %err, "forwarder exited with a fatal error");
        std::process::exit(1);
    }
}

async fn run(args: Args) -> Result<(), ForwarderError> {
    let config = Config::load(Path::new(&args.config))?;

    let topic = args.resolved_topic();
    args.check_all_variant_precondition(&topic);

    tracing::info!(
        entity = %args.entity,
        topic = %topic,
        consumer_group = %args.consumer_group,
        "starting forwarder"
    );

    let consumer = SynchronizedConsumer::new(SynchronizedConsumerConfig {
        brokers: config.brokers,
        data_topic: topic,
        data_group: args.consumer_group,
        commit_log_topic: args.commit_log_topic,
        synchronize_commit_group: args.synchronize_commit_group,
        initial_offset_reset: args.initial_offset_reset.into(),
        backlog_capacity: config.backlog_capacity,
    })?;
    let (source, committer) = SharedConsumer::new(consumer);

    // `InProcessTaskQueue` is the reference task-system boundary
    // (SPEC_FULL.md §4.6.1); a worker pool draining it into the pipeline
    // is external wiring, out of scope for this binary per §1. This
    // drain logs what would otherwise be handed to a real broker.
    let (queue, mut receiver) = InProcessTaskQueue::new();
    tokio::spawn(async move {
        while let Some(task) = receiver.recv().await {
            tracing::debug!(
                name = %task.name,
                queue = %task.queue,
                canonical_name = POST_PROCESS_GROUP,
                "task enqueued"
            );
        }
    });

    let strategy = ForwarderStrategy::new(args.entity, Arc::new(queue), args.concurrency);

    let shutdown = ShutdownFlag::new();
    install_signal_handlers(shutdown.clone());

    let harness = BatchingHarness::new(
        source,
        committer,
        strategy,
        BatchingHarnessConfig {
            max_batch_size: args.commit_batch_size,
            max_batch_time: Duration::from_millis(args.commit_batch_timeout_ms),
            commit_on_shutdown: true,
        },
        shutdown,
    );

    harness.run().await?;
    tracing::info!("forwarder shut down cleanly");
    Ok(())
}
