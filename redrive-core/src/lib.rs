//! Drains an SQS dead-letter queue and redelivers every message to a
//! target SQS queue, SNS topic, or Kinesis stream.
//!
//! The drain runs a fixed pool of independent pollers, each looping
//! receive -> deliver -> delete against the shared source until it has
//! seen enough consecutive empty receives to call the queue drained.
//! Successfully forwarded messages are deleted from the source unless
//! the retention flag is set. Delivery is at-least-once: a crash
//! between a successful delivery and the matching delete leaves the
//! message re-deliverable.

use std::sync::Arc;

use tracing::info;

mod client;
pub mod config;
pub mod drain;
mod error;
pub mod message;
pub mod sink;
pub mod source;

pub use crate::error::{Error, Result};

use crate::config::{Settings, TargetKind};
use crate::sink::{KinesisSink, SinkWriter, SnsSink, SqsSink};
use crate::source::DlqSource;

/// Runs one full drain session described by `settings`: resolves the
/// source and target, constructs the sink adapter, and drives the
/// poller pool to completion.
pub async fn run(settings: &Settings) -> Result<()> {
    settings.validate()?;

    let source_config = client::sdk_config(&settings.source_context).await;
    let sqs = aws_sdk_sqs::Client::new(&source_config);

    info!(
        queue = settings.dlq_queue_name.as_str(),
        region = ?settings.source_context.region,
        "Finding the SQS DLQ"
    );
    let dlq_queue_url = source::resolve_queue_url(&sqs, &settings.dlq_queue_name).await?;
    let source = DlqSource::new(sqs, dlq_queue_url.clone(), settings.batch_size);

    let target_config = client::sdk_config(&settings.target_context()).await;
    let sink = match settings.target_kind {
        TargetKind::Queue => {
            info!(queue = settings.target_name.as_str(), "Finding the target queue");
            let client = aws_sdk_sqs::Client::new(&target_config);
            SinkWriter::Sqs(SqsSink::new(client, &settings.target_name).await?)
        }
        TargetKind::Topic => {
            info!(topic = settings.target_name.as_str(), "Finding the target topic");
            let client = aws_sdk_sns::Client::new(&target_config);
            SinkWriter::Sns(SnsSink::new(client, &settings.target_name).await?)
        }
        TargetKind::Stream => {
            let client = aws_sdk_kinesis::Client::new(&target_config);
            SinkWriter::Kinesis(KinesisSink::new(client, &settings.target_name))
        }
    };

    info!(
        source = dlq_queue_url.as_str(),
        destination = format!("{}:{}", settings.target_kind, settings.target_name),
        concurrency = settings.concurrency,
        keep = settings.keep,
        "Replaying events"
    );
    drain::run_drain(source, Arc::new(sink), settings).await?;

    info!("All done");
    Ok(())
}
