//! Sink adapters: a closed set of delivery backends behind one
//! `deliver` capability, selected once when the session starts.

use crate::Result;
use crate::message::Message;

pub mod kinesis;
pub mod sns;
pub mod sqs;

pub use kinesis::KinesisSink;
pub use sns::SnsSink;
pub use sqs::SqsSink;

/// The three delivery backends. One instance is shared across all
/// pollers; every variant's client is safe for concurrent `deliver`
/// calls.
pub enum SinkWriter {
    Sqs(SqsSink),
    Sns(SnsSink),
    Kinesis(KinesisSink),
}

impl SinkWriter {
    /// Delivers a full batch to the target. All-or-nothing: any entry
    /// failure fails the batch, and the caller must not acknowledge it.
    pub async fn deliver(&self, batch: &[Message]) -> Result<()> {
        match self {
            SinkWriter::Sqs(sink) => sink.deliver(batch).await,
            SinkWriter::Sns(sink) => sink.deliver(batch).await,
            SinkWriter::Kinesis(sink) => sink.deliver(batch).await,
        }
    }

    /// The resolved address messages are delivered to.
    pub fn destination(&self) -> &str {
        match self {
            SinkWriter::Sqs(sink) => sink.queue_url(),
            SinkWriter::Sns(sink) => sink.topic_arn(),
            SinkWriter::Kinesis(sink) => sink.stream_name(),
        }
    }
}
