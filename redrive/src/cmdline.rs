use clap::{Parser, ValueEnum};
use redrive_core::config::{
    AwsContext, DEFAULT_BATCH_SIZE, DEFAULT_CONCURRENCY, DEFAULT_MAX_EMPTY_RECEIVES, Settings,
    TargetKind,
};

/// Replays the messages in an SQS DLQ to an SQS queue, SNS topic, or
/// Kinesis stream.
#[derive(Parser, Debug)]
#[command(name = "redrive", version)]
#[command(about = "Replays the messages in an SQS DLQ to an SQS queue, SNS topic, or Kinesis stream")]
pub struct Cli {
    /// Name of the SQS DLQ queue, e.g. task-queue-dlq-dev
    #[arg(short = 'd', long)]
    pub dlq_queue_name: String,

    /// Name of the target SQS queue/SNS topic/Kinesis stream, e.g. task-queue-dev
    #[arg(short = 'n', long)]
    pub target_name: String,

    /// Kind of target to deliver to
    #[arg(short = 't', long, value_enum, default_value = "sqs")]
    pub target_type: TargetType,

    /// AWS region of the DLQ, e.g. us-east-1
    #[arg(short = 'r', long)]
    pub region: String,

    /// AWS CLI profile name
    #[arg(short = 'p', long)]
    pub profile: Option<String>,

    /// AWS region for the target resource; defaults to --region
    #[arg(long)]
    pub target_region: Option<String>,

    /// AWS CLI profile name for the target account; defaults to --profile
    #[arg(long)]
    pub target_profile: Option<String>,

    /// How many concurrent pollers to run
    #[arg(short = 'c', long, default_value_t = DEFAULT_CONCURRENCY)]
    pub concurrency: usize,

    /// Keep the replayed messages in the DLQ instead of deleting them
    #[arg(short = 'k', long)]
    pub keep: bool,

    /// Consecutive empty receives before a poller assumes the queue is
    /// drained. A heuristic for SQS's distributed polling, not a
    /// drained guarantee; raise it for large, sparsely filled queues.
    #[arg(long, default_value_t = DEFAULT_MAX_EMPTY_RECEIVES)]
    pub max_empty_receives: u32,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetType {
    Sqs,
    Sns,
    Kinesis,
}

impl From<TargetType> for TargetKind {
    fn from(value: TargetType) -> Self {
        match value {
            TargetType::Sqs => TargetKind::Queue,
            TargetType::Sns => TargetKind::Topic,
            TargetType::Kinesis => TargetKind::Stream,
        }
    }
}

impl Cli {
    pub fn into_settings(self) -> Settings {
        Settings {
            dlq_queue_name: self.dlq_queue_name,
            target_name: self.target_name,
            target_kind: self.target_type.into(),
            source_context: AwsContext {
                region: Some(self.region),
                profile: self.profile,
            },
            target_region: self.target_region,
            target_profile: self.target_profile,
            concurrency: self.concurrency,
            keep: self.keep,
            batch_size: DEFAULT_BATCH_SIZE,
            max_empty_receives: self.max_empty_receives,
        }
    }
}
