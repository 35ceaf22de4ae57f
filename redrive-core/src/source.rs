use aws_sdk_sqs::Client;
use aws_sdk_sqs::types::DeleteMessageBatchRequestEntry;
use tracing::{debug, error};

use crate::message::Message;
use crate::{Error, Result};

/// Resolves a queue name to its URL. Raised as a `Resolution` error so
/// a bad name aborts the session before any poller starts.
pub async fn resolve_queue_url(client: &Client, queue_name: &str) -> Result<String> {
    let output = client
        .get_queue_url()
        .queue_name(queue_name)
        .send()
        .await
        .map_err(|err| {
            error!(?err, queue_name, "Error getting queue URL");
            Error::Resolution(format!(
                "queue [{queue_name}]: {}",
                aws_sdk_sqs::Error::from(err)
            ))
        })?;

    output
        .queue_url
        .ok_or_else(|| Error::Resolution(format!("queue [{queue_name}]: no URL in response")))
}

/// Handle to the source DLQ. Cloneable; the underlying SQS client is a
/// cheap handle that is safe for concurrent use across pollers.
#[derive(Clone)]
pub struct DlqSource {
    client: Client,
    queue_url: String,
    batch_size: i32,
}

impl DlqSource {
    pub fn new(client: Client, queue_url: String, batch_size: i32) -> Self {
        DlqSource {
            client,
            queue_url,
            batch_size,
        }
    }

    pub fn queue_url(&self) -> &str {
        &self.queue_url
    }

    /// Pulls up to one batch from the queue, requesting all message
    /// attributes so the sinks can forward them. An empty Vec means the
    /// queue reported nothing visible for this receive.
    pub async fn receive_batch(&self) -> Result<Vec<Message>> {
        let output = self
            .client
            .receive_message()
            .queue_url(&self.queue_url)
            .max_number_of_messages(self.batch_size)
            .message_attribute_names("All")
            .send()
            .await
            .map_err(|err| {
                error!(
                    ?err,
                    queue_url = self.queue_url,
                    "Failed to receive messages from SQS"
                );
                Error::Source(format!(
                    "receiving from [{}]: {}",
                    self.queue_url,
                    aws_sdk_sqs::Error::from(err)
                ))
            })?;

        let messages: Vec<Message> = output
            .messages
            .unwrap_or_default()
            .into_iter()
            .map(Message::from)
            .collect();

        debug!(
            count = messages.len(),
            queue_url = self.queue_url,
            "Received batch from DLQ"
        );
        Ok(messages)
    }

    /// Acknowledges a forwarded batch with one batched delete. Any
    /// entry-level failure fails the whole batch; the receipt handles
    /// are spent either way.
    pub async fn delete_batch(&self, batch: &[Message]) -> Result<()> {
        let mut entries = Vec::with_capacity(batch.len());
        for msg in batch {
            let entry = DeleteMessageBatchRequestEntry::builder()
                .id(&msg.id)
                .receipt_handle(&msg.receipt_handle)
                .build()
                .map_err(|e| Error::Delete(format!("building delete entry: {e}")))?;
            entries.push(entry);
        }

        let output = self
            .client
            .delete_message_batch()
            .queue_url(&self.queue_url)
            .set_entries(Some(entries))
            .send()
            .await
            .map_err(|err| {
                error!(
                    ?err,
                    queue_url = self.queue_url,
                    "Error while deleting messages from SQS"
                );
                Error::Delete(format!(
                    "deleting from [{}]: {}",
                    self.queue_url,
                    aws_sdk_sqs::Error::from(err)
                ))
            })?;

        if let Some(failed) = output.failed.first() {
            return Err(Error::Delete(format!(
                "deleting from [{}]: entry {} failed with {}",
                self.queue_url, failed.id, failed.code
            )));
        }

        debug!(
            count = batch.len(),
            queue_url = self.queue_url,
            "Deleted batch from DLQ"
        );
        Ok(())
    }
}
