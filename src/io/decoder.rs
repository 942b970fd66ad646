use std::convert::TryFrom;

use thiserror::Error;

use super::event::{QueueMessage, StreamRecord};
use super::image::{parse_image, transaction_from_image};
use super::reply::parse_inbound_sms;
use crate::screening::{IncomingReply, Transaction, UnknownStatus};

/// The opaque token the messaging layer uses to decide which records to redeliver.
pub type DeliveryId = String;

/// One input record of a batch: its delivery identifier and either the decoded payload
/// or the reason it could not be decoded.
#[derive(Debug)]
pub struct DeliveryRecord<T> {
  pub identifier: DeliveryId,
  pub payload: Result<T, DecodeError>,
}

impl<T> DeliveryRecord<T> {
  pub fn new(identifier: impl Into<DeliveryId>, payload: Result<T, DecodeError>) -> Self {
    Self {
      identifier: identifier.into(),
      payload,
    }
  }
}

/// Errors while turning one raw record into a typed payload.
/// They only ever affect the record they come from.
#[derive(Debug, Error)]
pub enum DecodeError {
  #[error("Record carries no new image")]
  MissingImage,

  #[error("Malformed new image: {0}")]
  Image(#[source] serde_json::Error),

  #[error("Attribute {name} has type {found}, expected {expected}")]
  AttributeType {
    name: String,
    expected: &'static str,
    found: &'static str,
  },

  #[error("Attribute {name} is not a valid number: {value}")]
  InvalidNumber { name: String, value: String },

  #[error(transparent)]
  Status(#[from] UnknownStatus),

  #[error("Malformed message body: {0}")]
  Body(#[from] serde_json::Error),
}

/// Decodes the new image of a change-stream record.
/// Only inserts are screened; any other event yields `None` and is neither processed nor failed.
pub fn decode_stream_record(record: StreamRecord) -> Option<DeliveryRecord<Transaction>> {
  if !record.is_insert() {
    return None;
  }

  let change = record.dynamodb;
  let payload = change
    .new_image
    .ok_or(DecodeError::MissingImage)
    .and_then(parse_image)
    .and_then(|image| transaction_from_image(&image))
    .and_then(Transaction::try_from);

  Some(DeliveryRecord::new(change.sequence_number, payload))
}

/// Decodes a queue message whose body is a JSON-serialized transaction.
pub fn decode_transaction_message(message: QueueMessage) -> DeliveryRecord<Transaction> {
  let payload = serde_json::from_str::<super::transaction::Transaction>(&message.body)
    .map_err(DecodeError::from)
    .and_then(Transaction::try_from);

  DeliveryRecord::new(message.message_id, payload)
}

/// Decodes a queue message whose body is an inbound text message.
pub fn decode_reply_message(message: QueueMessage) -> DeliveryRecord<IncomingReply> {
  let payload = parse_inbound_sms(&message.body)
    .map(IncomingReply::from)
    .map_err(DecodeError::from);

  DeliveryRecord::new(message.message_id, payload)
}
