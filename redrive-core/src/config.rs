use std::fmt;

use crate::{Error, Result};

pub const DEFAULT_BATCH_SIZE: i32 = 10;
pub const DEFAULT_CONCURRENCY: usize = 10;
pub const DEFAULT_MAX_EMPTY_RECEIVES: u32 = 10;

/// Which kind of sink the drained messages are forwarded to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetKind {
    Queue,
    Topic,
    Stream,
}

impl fmt::Display for TargetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TargetKind::Queue => write!(f, "SQS"),
            TargetKind::Topic => write!(f, "SNS"),
            TargetKind::Stream => write!(f, "Kinesis"),
        }
    }
}

/// Region/profile pair used to construct one AWS client.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AwsContext {
    pub region: Option<String>,
    pub profile: Option<String>,
}

/// Settings for one drain session. Built once by the caller and passed
/// by reference into the source, the sink, and the coordinator.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Name of the DLQ to drain.
    pub dlq_queue_name: String,
    /// Name of the target queue/topic/stream.
    pub target_name: String,
    pub target_kind: TargetKind,
    pub source_context: AwsContext,
    /// Target-side overrides; each falls back to the source context.
    pub target_region: Option<String>,
    pub target_profile: Option<String>,
    /// Number of concurrent pollers.
    pub concurrency: usize,
    /// Keep the forwarded messages in the DLQ instead of deleting them.
    pub keep: bool,
    /// Messages requested per receive; SQS caps this at 10.
    pub batch_size: i32,
    /// Consecutive empty receives before a poller assumes the queue is
    /// drained. A heuristic, not a guarantee: the source polls a subset
    /// of its internal shards per request and can report empty while
    /// messages remain.
    pub max_empty_receives: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            dlq_queue_name: "".to_string(),
            target_name: "".to_string(),
            target_kind: TargetKind::Queue,
            source_context: AwsContext::default(),
            target_region: None,
            target_profile: None,
            concurrency: DEFAULT_CONCURRENCY,
            keep: false,
            batch_size: DEFAULT_BATCH_SIZE,
            max_empty_receives: DEFAULT_MAX_EMPTY_RECEIVES,
        }
    }
}

impl Settings {
    /// The context the sink clients are built with: target overrides
    /// where given, the source context otherwise.
    pub fn target_context(&self) -> AwsContext {
        AwsContext {
            region: self
                .target_region
                .clone()
                .or_else(|| self.source_context.region.clone()),
            profile: self
                .target_profile
                .clone()
                .or_else(|| self.source_context.profile.clone()),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.dlq_queue_name.is_empty() {
            return Err(Error::Config("DLQ queue name must not be empty".to_string()));
        }
        if self.target_name.is_empty() {
            return Err(Error::Config("target name must not be empty".to_string()));
        }
        if self.concurrency == 0 {
            return Err(Error::Config("concurrency must be at least 1".to_string()));
        }
        if !(1..=10).contains(&self.batch_size) {
            return Err(Error::Config(
                "batch size must be between 1 and 10".to_string(),
            ));
        }
        if self.max_empty_receives == 0 {
            return Err(Error::Config(
                "max empty receives must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
