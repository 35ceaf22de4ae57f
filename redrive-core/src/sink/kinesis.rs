use aws_sdk_kinesis::Client;
use aws_sdk_kinesis::primitives::Blob;
use aws_sdk_kinesis::types::PutRecordsRequestEntry;
use tracing::{debug, error};

use crate::message::Message;
use crate::{Error, Result};

/// Stream sink: one batched put per drained batch. The partition key is
/// the source message id, so redeliveries of the same message land in
/// the same shard-ordering lane.
#[derive(Clone)]
pub struct KinesisSink {
    client: Client,
    stream_name: String,
}

impl KinesisSink {
    /// Stream names need no resolution; the sink binds to the name as
    /// given.
    pub fn new(client: Client, stream_name: &str) -> Self {
        KinesisSink {
            client,
            stream_name: stream_name.to_string(),
        }
    }

    pub fn stream_name(&self) -> &str {
        &self.stream_name
    }

    pub async fn deliver(&self, batch: &[Message]) -> Result<()> {
        let mut records = Vec::with_capacity(batch.len());
        for msg in batch {
            let record = PutRecordsRequestEntry::builder()
                .data(Blob::new(msg.body.as_bytes().to_vec()))
                .partition_key(&msg.id)
                .build()
                .map_err(|e| Error::Delivery(format!("building stream record: {e}")))?;
            records.push(record);
        }

        let output = self
            .client
            .put_records()
            .stream_name(&self.stream_name)
            .set_records(Some(records))
            .send()
            .await
            .map_err(|err| {
                error!(
                    ?err,
                    stream_name = self.stream_name,
                    "Failed to put records to Kinesis"
                );
                Error::Delivery(format!(
                    "putting to [{}]: {}",
                    self.stream_name,
                    aws_sdk_kinesis::Error::from(err)
                ))
            })?;

        // put_records reports per-record failures without failing the
        // call; any failed record fails the whole batch.
        let failed = output.failed_record_count().unwrap_or_default();
        if failed > 0 {
            return Err(Error::Delivery(format!(
                "putting to [{}]: {failed} records failed",
                self.stream_name
            )));
        }

        debug!(
            count = batch.len(),
            stream_name = self.stream_name,
            "Delivered batch to stream"
        );
        Ok(())
    }
}
