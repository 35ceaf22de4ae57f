use aws_sdk_sqs::Client;
use aws_sdk_sqs::primitives::Blob;
use aws_sdk_sqs::types::{MessageAttributeValue, SendMessageBatchRequestEntry};
use tracing::{debug, error, info};

use crate::message::{Message, MessageAttribute};
use crate::source::resolve_queue_url;
use crate::{Error, Result};

/// Queue sink: one batched send per drained batch, carrying each
/// message's body and attribute map verbatim. The batch entry id is the
/// source message id.
#[derive(Clone)]
pub struct SqsSink {
    client: Client,
    queue_url: String,
}

impl SqsSink {
    /// Resolves the target queue's URL and binds the sink to it.
    pub async fn new(client: Client, queue_name: &str) -> Result<Self> {
        let queue_url = resolve_queue_url(&client, queue_name).await?;
        info!(queue_url = queue_url.as_str(), "Target queue URL found");
        Ok(SqsSink { client, queue_url })
    }

    pub fn queue_url(&self) -> &str {
        &self.queue_url
    }

    #[cfg(test)]
    pub(crate) fn for_tests(client: Client, queue_url: String) -> Self {
        SqsSink { client, queue_url }
    }

    pub async fn deliver(&self, batch: &[Message]) -> Result<()> {
        let mut entries = Vec::with_capacity(batch.len());
        for msg in batch {
            let mut entry = SendMessageBatchRequestEntry::builder()
                .id(&msg.id)
                .message_body(&msg.body);
            for (name, attr) in &msg.attributes {
                entry = entry.message_attributes(name.clone(), to_sqs_attribute(attr)?);
            }
            let entry = entry
                .build()
                .map_err(|e| Error::Delivery(format!("building send entry: {e}")))?;
            entries.push(entry);
        }

        let output = self
            .client
            .send_message_batch()
            .queue_url(&self.queue_url)
            .set_entries(Some(entries))
            .send()
            .await
            .map_err(|err| {
                error!(
                    ?err,
                    queue_url = self.queue_url,
                    "Failed to send message batch to SQS"
                );
                Error::Delivery(format!(
                    "sending to [{}]: {}",
                    self.queue_url,
                    aws_sdk_sqs::Error::from(err)
                ))
            })?;

        if let Some(failed) = output.failed.first() {
            return Err(Error::Delivery(format!(
                "sending to [{}]: entry {} failed with {}",
                self.queue_url, failed.id, failed.code
            )));
        }

        debug!(
            count = batch.len(),
            queue_url = self.queue_url,
            "Delivered batch to queue"
        );
        Ok(())
    }
}

fn to_sqs_attribute(attr: &MessageAttribute) -> Result<MessageAttributeValue> {
    let mut builder = MessageAttributeValue::builder().data_type(&attr.data_type);
    if let Some(value) = &attr.string_value {
        builder = builder.string_value(value);
    }
    if let Some(value) = &attr.binary_value {
        builder = builder.binary_value(Blob::new(value.to_vec()));
    }
    builder
        .build()
        .map_err(|e| Error::Delivery(format!("building message attribute: {e}")))
}
