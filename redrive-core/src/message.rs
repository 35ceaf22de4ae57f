use std::collections::HashMap;

use bytes::Bytes;

/// A message attribute as the source queue represents it: a type tag
/// ("String", "Number", "Binary", ...) plus the matching value slot.
#[derive(Debug, Clone, PartialEq)]
pub struct MessageAttribute {
    pub data_type: String,
    pub string_value: Option<String>,
    pub binary_value: Option<Bytes>,
}

impl MessageAttribute {
    /// The topic publish API only accepts String-typed attributes, so
    /// the SNS sink drops everything else.
    pub fn is_string(&self) -> bool {
        self.data_type == "String"
    }
}

/// A message pulled from the DLQ, mirroring the source queue's native
/// representation.
#[derive(Debug, Clone)]
pub struct Message {
    /// Unique within the source queue. Doubles as the batch entry id at
    /// the queue sink and the partition key at the stream sink.
    pub id: String,
    pub body: String,
    pub attributes: HashMap<String, MessageAttribute>,
    /// Handle required to delete the message from the source. Only
    /// valid within the source's visibility window.
    pub receipt_handle: String,
}

impl From<aws_sdk_sqs::types::Message> for Message {
    fn from(msg: aws_sdk_sqs::types::Message) -> Self {
        let attributes = msg
            .message_attributes
            .unwrap_or_default()
            .into_iter()
            .map(|(name, value)| {
                (
                    name,
                    MessageAttribute {
                        data_type: value.data_type,
                        string_value: value.string_value,
                        binary_value: value.binary_value.map(|b| Bytes::from(b.into_inner())),
                    },
                )
            })
            .collect();

        Message {
            id: msg.message_id.unwrap_or_default(),
            body: msg.body.unwrap_or_default(),
            attributes,
            receipt_handle: msg.receipt_handle.unwrap_or_default(),
        }
    }
}
