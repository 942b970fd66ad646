use std::collections::HashMap;
use std::str::FromStr;

use serde::Deserialize;

use super::decoder::DecodeError;
use super::transaction::Transaction;

/// The attributes of a stored item as carried by a change-stream record.
pub type Image = HashMap<String, AttributeValue>;

/// A typed attribute value, e.g. `{"S": "TX1"}` or `{"N": "14.09"}`.
/// Numbers travel as strings and are parsed into the type the field needs.
/// Binary values stay base64 encoded, nothing here reads them.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub enum AttributeValue {
  S(String),
  N(String),
  B(String),
  SS(Vec<String>),
  NS(Vec<String>),
  BS(Vec<String>),
  #[serde(rename = "BOOL")]
  Bool(bool),
  #[serde(rename = "NULL")]
  Null(bool),
  M(HashMap<String, AttributeValue>),
  L(Vec<AttributeValue>),
}

impl AttributeValue {
  fn type_name(&self) -> &'static str {
    match self {
      AttributeValue::S(_) => "S",
      AttributeValue::N(_) => "N",
      AttributeValue::B(_) => "B",
      AttributeValue::SS(_) => "SS",
      AttributeValue::NS(_) => "NS",
      AttributeValue::BS(_) => "BS",
      AttributeValue::Bool(_) => "BOOL",
      AttributeValue::Null(_) => "NULL",
      AttributeValue::M(_) => "M",
      AttributeValue::L(_) => "L",
    }
  }
}

/// Parses the raw new image of one record. A malformed image only fails that record.
pub fn parse_image(raw: serde_json::Value) -> Result<Image, DecodeError> {
  serde_json::from_value(raw).map_err(DecodeError::Image)
}

/// Reads a serializable transaction out of an image.
/// Absent attributes take their empty value; attributes of the wrong type are decode errors.
pub fn transaction_from_image(image: &Image) -> Result<Transaction, DecodeError> {
  let image = ImageReader(image);
  Ok(Transaction {
    transaction_id: image.string("TransactionID")?,
    account_id: image.string("AccountID")?,
    status: image.optional_string("TransactionStatus")?,
    amount: image.number("TransactionAmount")?,
    date: image.string("TransactionDate")?,
    kind: image.string("TransactionType")?,
    location: image.string("Location")?,
    device_id: image.string("DeviceID")?,
    ip_address: image.string("IPAddress")?,
    merchant_id: image.string("MerchantID")?,
    channel: image.string("Channel")?,
    customer_age: image.number("CustomerAge")?,
    customer_occupation: image.string("CustomerOccupation")?,
    duration_secs: image.number("TransactionDuration")?,
    login_attempts: image.number("LoginAttempts")?,
    account_balance: image.number("AccountBalance")?,
    previous_transaction_date: image.string("PreviousTransactionDate")?,
    phone: image.string("PhoneNumber")?,
    email: image.string("Email")?,
  })
}

struct ImageReader<'a>(&'a Image);

impl<'a> ImageReader<'a> {
  fn optional_string(&self, name: &str) -> Result<Option<String>, DecodeError> {
    match self.0.get(name) {
      None | Some(AttributeValue::Null(_)) => Ok(None),
      Some(AttributeValue::S(value)) => Ok(Some(value.clone())),
      Some(other) => Err(DecodeError::AttributeType {
        name: name.to_string(),
        expected: "S",
        found: other.type_name(),
      }),
    }
  }

  fn string(&self, name: &str) -> Result<String, DecodeError> {
    self
      .optional_string(name)
      .map(|value| value.unwrap_or_default())
  }

  fn number<T>(&self, name: &str) -> Result<T, DecodeError>
  where
    T: FromStr + Default,
  {
    match self.0.get(name) {
      None | Some(AttributeValue::Null(_)) => Ok(T::default()),
      Some(AttributeValue::N(value)) => value
        .trim()
        .parse()
        .map_err(|_| DecodeError::InvalidNumber {
          name: name.to_string(),
          value: value.clone(),
        }),
      Some(other) => Err(DecodeError::AttributeType {
        name: name.to_string(),
        expected: "N",
        found: other.type_name(),
      }),
    }
  }
}
