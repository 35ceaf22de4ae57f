use aws_sdk_sns::Client;
use aws_sdk_sns::types::MessageAttributeValue;
use futures::future::try_join_all;
use tracing::{debug, error, info};

use crate::message::Message;
use crate::{Error, Result};

/// Topic sink: one publish per message, all publishes within a batch
/// running concurrently. Only String-typed attributes survive; the
/// publish path drops the other attribute types it cannot carry.
#[derive(Clone)]
pub struct SnsSink {
    client: Client,
    topic_arn: String,
}

impl SnsSink {
    /// Resolves the target topic's ARN and binds the sink to it.
    pub async fn new(client: Client, topic_name: &str) -> Result<Self> {
        let topic_arn = resolve_topic_arn(&client, topic_name).await?;
        info!(topic_arn = topic_arn.as_str(), "Target topic found");
        Ok(SnsSink { client, topic_arn })
    }

    pub fn topic_arn(&self) -> &str {
        &self.topic_arn
    }

    #[cfg(test)]
    pub(crate) fn for_tests(client: Client, topic_arn: String) -> Self {
        SnsSink { client, topic_arn }
    }

    pub async fn deliver(&self, batch: &[Message]) -> Result<()> {
        try_join_all(batch.iter().map(|msg| self.publish(msg))).await?;
        debug!(
            count = batch.len(),
            topic_arn = self.topic_arn,
            "Delivered batch to topic"
        );
        Ok(())
    }

    async fn publish(&self, msg: &Message) -> Result<()> {
        let mut request = self
            .client
            .publish()
            .topic_arn(&self.topic_arn)
            .message(&msg.body);

        for (name, attr) in &msg.attributes {
            if !attr.is_string() {
                continue;
            }
            let value = MessageAttributeValue::builder()
                .data_type("String")
                .set_string_value(attr.string_value.clone())
                .build()
                .map_err(|e| Error::Delivery(format!("building message attribute: {e}")))?;
            request = request.message_attributes(name.clone(), value);
        }

        request.send().await.map_err(|err| {
            error!(
                ?err,
                topic_arn = self.topic_arn,
                message_id = msg.id.as_str(),
                "Failed to publish message to SNS"
            );
            Error::Delivery(format!(
                "publishing {} to [{}]: {}",
                msg.id,
                self.topic_arn,
                aws_sdk_sns::Error::from(err)
            ))
        })?;

        Ok(())
    }
}

/// Resolves a topic name to its ARN by paging through the account's
/// topics and matching on the ARN's trailing name segment.
pub async fn resolve_topic_arn(client: &Client, topic_name: &str) -> Result<String> {
    let mut next_token: Option<String> = None;
    loop {
        let output = client
            .list_topics()
            .set_next_token(next_token)
            .send()
            .await
            .map_err(|err| {
                error!(?err, topic_name, "Error listing topics");
                Error::Resolution(format!(
                    "topic [{topic_name}]: {}",
                    aws_sdk_sns::Error::from(err)
                ))
            })?;

        for topic in output.topics() {
            if let Some(arn) = topic.topic_arn() {
                if arn.rsplit(':').next() == Some(topic_name) {
                    return Ok(arn.to_string());
                }
            }
        }

        next_token = output.next_token().map(str::to_string);
        if next_token.is_none() {
            return Err(Error::Resolution(format!("topic [{topic_name}] not found")));
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use aws_sdk_sns::config::{BehaviorVersion, Credentials, Region};
    use aws_sdk_sns::types::Topic;
    use aws_smithy_mocks::{MockResponseInterceptor, Rule, RuleMode, create_mock_http_client, mock};
    use aws_smithy_types::error::ErrorMetadata;
    use bytes::Bytes;

    use super::*;
    use crate::message::MessageAttribute;

    const TOPIC_ARN: &str = "arn:aws:sns:us-east-1:926113353675:task-topic-dev";

    #[tokio::test]
    async fn test_resolve_topic_arn_pages_until_match() {
        let list_rule = mock!(aws_sdk_sns::Client::list_topics).then_output(|| {
            aws_sdk_sns::operation::list_topics::ListTopicsOutput::builder()
                .topics(
                    Topic::builder()
                        .topic_arn("arn:aws:sns:us-east-1:926113353675:other-topic")
                        .build(),
                )
                .topics(Topic::builder().topic_arn(TOPIC_ARN).build())
                .build()
        });

        let arn = resolve_topic_arn(&mock_client(&list_rule), "task-topic-dev")
            .await
            .unwrap();
        assert_eq!(arn, TOPIC_ARN);
    }

    #[tokio::test]
    async fn test_resolve_topic_arn_absent_topic() {
        let list_rule = mock!(aws_sdk_sns::Client::list_topics).then_output(|| {
            aws_sdk_sns::operation::list_topics::ListTopicsOutput::builder()
                .topics(
                    Topic::builder()
                        .topic_arn("arn:aws:sns:us-east-1:926113353675:other-topic")
                        .build(),
                )
                .build()
        });

        let err = resolve_topic_arn(&mock_client(&list_rule), "task-topic-dev")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Resolution(_)));
        assert!(err.to_string().contains("task-topic-dev"));
    }

    #[tokio::test]
    async fn test_publish_filters_non_string_attributes() {
        let publish_rule = mock!(aws_sdk_sns::Client::publish)
            .match_requests(|inp| {
                let attrs = inp.message_attributes().unwrap();
                inp.topic_arn() == Some(TOPIC_ARN)
                    && inp.message() == Some("hello")
                    && attrs.len() == 1
                    && attrs.get("trace-id").map(|a| a.data_type()) == Some("String")
                    && !attrs.contains_key("payload-digest")
            })
            .then_output(|| {
                aws_sdk_sns::operation::publish::PublishOutput::builder()
                    .message_id("published-1")
                    .build()
            });

        let sink = SnsSink {
            client: mock_client(&publish_rule),
            topic_arn: TOPIC_ARN.to_string(),
        };
        assert!(sink.deliver(&[test_message("msg-1", "hello")]).await.is_ok());
    }

    #[tokio::test]
    async fn test_deliver_fails_when_any_publish_fails() {
        let publish_rule = mock!(aws_sdk_sns::Client::publish).then_error(|| {
            aws_sdk_sns::operation::publish::PublishError::generic(
                ErrorMetadata::builder()
                    .code("AuthorizationError")
                    .message("not allowed")
                    .build(),
            )
        });

        let sink = SnsSink {
            client: mock_client(&publish_rule),
            topic_arn: TOPIC_ARN.to_string(),
        };
        let batch = vec![
            test_message("msg-1", "a"),
            test_message("msg-2", "b"),
            test_message("msg-3", "c"),
            test_message("msg-4", "d"),
        ];
        let err = sink.deliver(&batch).await.unwrap_err();
        assert!(matches!(err, Error::Delivery(_)));
        assert!(err.to_string().contains(TOPIC_ARN));
    }

    fn test_message(id: &str, body: &str) -> Message {
        let mut attributes = HashMap::new();
        attributes.insert(
            "trace-id".to_string(),
            MessageAttribute {
                data_type: "String".to_string(),
                string_value: Some("abc-123".to_string()),
                binary_value: None,
            },
        );
        attributes.insert(
            "payload-digest".to_string(),
            MessageAttribute {
                data_type: "Binary".to_string(),
                string_value: None,
                binary_value: Some(Bytes::from_static(&[0xde, 0xad])),
            },
        );
        Message {
            id: id.to_string(),
            body: body.to_string(),
            attributes,
            receipt_handle: format!("rh-{id}"),
        }
    }

    fn mock_client(rule: &Rule) -> Client {
        let interceptor = MockResponseInterceptor::new()
            .rule_mode(RuleMode::MatchAny)
            .with_rule(rule);
        Client::from_conf(
            aws_sdk_sns::Config::builder()
                .behavior_version(BehaviorVersion::latest())
                .credentials_provider(make_test_credentials())
                .region(Region::new("us-east-1"))
                .http_client(create_mock_http_client())
                .interceptor(interceptor)
                .build(),
        )
    }

    fn make_test_credentials() -> Credentials {
        Credentials::new(
            "ATESTCLIENT",
            "astestsecretkey",
            Some("atestsessiontoken".to_string()),
            None,
            "",
        )
    }
}
