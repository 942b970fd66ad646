use serde::{Deserialize, Serialize};

/// A batch of change-stream records.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StreamEvent {
  #[serde(rename = "Records", default)]
  pub records: Vec<StreamRecord>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StreamRecord {
  #[serde(rename = "eventID", default)]
  pub event_id: String,

  #[serde(rename = "eventName", default)]
  pub event_name: String,

  #[serde(default)]
  pub dynamodb: StreamChange,
}

impl StreamRecord {
  pub fn is_insert(&self) -> bool {
    self.event_name == "INSERT"
  }
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct StreamChange {
  #[serde(rename = "SequenceNumber", default)]
  pub sequence_number: String,

  /// Kept raw so that an image this crate cannot read only fails its own record.
  #[serde(rename = "NewImage")]
  pub new_image: Option<serde_json::Value>,
}

/// A batch of queue messages.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct QueueEvent {
  #[serde(rename = "Records", default)]
  pub records: Vec<QueueMessage>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct QueueMessage {
  #[serde(rename = "messageId")]
  pub message_id: String,

  #[serde(default)]
  pub body: String,
}

/// The partial batch failure response: the delivery identifiers the upstream system must redeliver.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BatchResponse {
  #[serde(rename = "BatchItemFailures", alias = "batchItemFailures")]
  pub batch_item_failures: Vec<BatchItemFailure>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BatchItemFailure {
  #[serde(rename = "ItemIdentifier", alias = "itemIdentifier")]
  pub item_identifier: String,
}

impl BatchItemFailure {
  pub fn new(item_identifier: impl Into<String>) -> Self {
    Self {
      item_identifier: item_identifier.into(),
    }
  }
}
