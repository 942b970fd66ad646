use std::convert::TryFrom;

use rust_decimal::Decimal;
use serde::Deserialize;

use super::decoder::DecodeError;
use crate::screening::{self, Status};

/// A deserializable transaction, shared by message bodies and change images.
/// Message bodies may use either the stored attribute names or the snake_case queue keys.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct Transaction {
  #[serde(rename = "TransactionID", alias = "transaction_id")]
  pub transaction_id: String,

  #[serde(rename = "AccountID", alias = "account_id")]
  pub account_id: String,

  #[serde(rename = "TransactionStatus", alias = "transaction_status", default)]
  pub status: Option<String>,

  #[serde(rename = "TransactionAmount", alias = "transaction_amount", default)]
  pub amount: Decimal,

  #[serde(rename = "TransactionDate", alias = "transaction_date", default)]
  pub date: String,

  #[serde(rename = "TransactionType", alias = "transaction_type", default)]
  pub kind: String,

  #[serde(rename = "Location", alias = "location", default)]
  pub location: String,

  #[serde(rename = "DeviceID", alias = "deviceId", default)]
  pub device_id: String,

  #[serde(rename = "IPAddress", alias = "IP Address", alias = "ip_address", default)]
  pub ip_address: String,

  #[serde(rename = "MerchantID", alias = "merchantId", default)]
  pub merchant_id: String,

  #[serde(rename = "Channel", alias = "channel", default)]
  pub channel: String,

  #[serde(rename = "CustomerAge", alias = "customerAge", default)]
  pub customer_age: u32,

  #[serde(rename = "CustomerOccupation", alias = "customerOccupation", default)]
  pub customer_occupation: String,

  #[serde(rename = "TransactionDuration", alias = "transaction_duration", default)]
  pub duration_secs: u32,

  #[serde(rename = "LoginAttempts", alias = "loginAttempts", default)]
  pub login_attempts: u32,

  #[serde(rename = "AccountBalance", alias = "account_balance", default)]
  pub account_balance: Decimal,

  #[serde(rename = "PreviousTransactionDate", alias = "previousTransactionDate", default)]
  pub previous_transaction_date: String,

  #[serde(rename = "PhoneNumber", alias = "phone_number", default)]
  pub phone: String,

  #[serde(rename = "Email", alias = "email", default)]
  pub email: String,
}

impl TryFrom<Transaction> for screening::Transaction {
  type Error = DecodeError;

  /// Conversion from a deserializable Transaction into one that can be used by the domain logic.
  /// A missing status means the transaction has not been screened yet.
  fn try_from(transaction: Transaction) -> Result<Self, Self::Error> {
    let status = match transaction.status.as_deref() {
      None | Some("") => Status::Pending,
      Some(status) => status.parse()?,
    };

    Ok(screening::Transaction {
      transaction_id: transaction.transaction_id,
      account_id: transaction.account_id,
      status,
      amount: transaction.amount,
      date: transaction.date,
      kind: transaction.kind,
      location: transaction.location,
      device_id: transaction.device_id,
      ip_address: transaction.ip_address,
      merchant_id: transaction.merchant_id,
      channel: transaction.channel,
      customer_age: transaction.customer_age,
      customer_occupation: transaction.customer_occupation,
      duration_secs: transaction.duration_secs,
      login_attempts: transaction.login_attempts,
      account_balance: transaction.account_balance,
      previous_transaction_date: transaction.previous_transaction_date,
      phone: transaction.phone,
      email: transaction.email,
    })
  }
}

#[cfg(test)]
mod tests {

  use indoc::indoc;
  use rust_decimal_macros::dec;

  use super::*;

  #[test]
  fn deserialize_message_body() {
    let body = indoc! { r#"
      {
        "TransactionID": "TX000002",
        "AccountID": "AC00455",
        "TransactionAmount": 376.24,
        "TransactionDate": "2023-06-27 16:44:19",
        "TransactionType": "Debit",
        "Location": "Houston",
        "DeviceID": "D000051",
        "IP Address": "13.149.61.4",
        "MerchantID": "M052",
        "Channel": "ATM",
        "CustomerAge": 68,
        "CustomerOccupation": "Doctor",
        "TransactionDuration": 141,
        "LoginAttempts": 1,
        "AccountBalance": "13758.91",
        "PhoneNumber": "+15555550123"
      }
    "# };

    let transaction: Transaction = serde_json::from_str(body).unwrap();
    let transaction = screening::Transaction::try_from(transaction).unwrap();

    assert_eq!(transaction.transaction_id, "TX000002");
    assert_eq!(transaction.account_id, "AC00455");
    assert_eq!(transaction.status, Status::Pending);
    assert_eq!(transaction.amount, dec!(376.24));
    assert_eq!(transaction.ip_address, "13.149.61.4");
    assert_eq!(transaction.customer_age, 68);
    assert_eq!(transaction.duration_secs, 141);
    assert_eq!(transaction.account_balance, dec!(13758.91));
    assert_eq!(transaction.email, "");
  }

  #[test]
  fn deserialize_snake_case_message_body() {
    let body = indoc! { r#"
      {
        "transaction_id": "TX000003",
        "account_id": "AC00019",
        "transaction_amount": 126.29,
        "transaction_date": "2023-07-10T18:16:08Z",
        "transaction_type": "Debit",
        "location": "Mesa",
        "deviceId": "D000235",
        "ip_address": "215.97.143.157",
        "merchantId": "M009",
        "channel": "Online",
        "customerAge": 19,
        "customerOccupation": "Student",
        "transaction_duration": 56,
        "loginAttempts": 1,
        "account_balance": 1122.35,
        "previousTransactionDate": "2024-11-04T08:09:35Z",
        "phone_number": "+15555550142",
        "email": "student@example.com",
        "transaction_status": "PENDING"
      }
    "# };

    let transaction: Transaction = serde_json::from_str(body).unwrap();
    let transaction = screening::Transaction::try_from(transaction).unwrap();

    assert_eq!(transaction.key(), screening::TransactionKey::new("AC00019", "TX000003"));
    assert_eq!(transaction.status, Status::Pending);
    assert_eq!(transaction.amount, dec!(126.29));
    assert_eq!(transaction.device_id, "D000235");
    assert_eq!(transaction.ip_address, "215.97.143.157");
    assert_eq!(transaction.merchant_id, "M009");
    assert_eq!(transaction.customer_age, 19);
    assert_eq!(transaction.duration_secs, 56);
    assert_eq!(transaction.account_balance, dec!(1122.35));
    assert_eq!(transaction.phone, "+15555550142");
    assert_eq!(transaction.email, "student@example.com");
  }

  #[test]
  fn try_from_with_status() {
    let cases = vec![
      (None, Ok(Status::Pending)),
      (Some(""), Ok(Status::Pending)),
      (Some("POTENTIAL_FRAUD"), Ok(Status::PotentialFraud)),
      (Some("APPROVED"), Ok(Status::Approved)),
      (
        Some("SETTLED"),
        Err("Unknown transaction status: SETTLED".to_string()),
      ),
    ];

    for (status, expected) in cases {
      let transaction = Transaction {
        transaction_id: "TX1".to_string(),
        account_id: "AC1".to_string(),
        status: status.map(str::to_string),
        ..Transaction::default()
      };

      let result = screening::Transaction::try_from(transaction)
        .map(|transaction| transaction.status)
        .map_err(|err| err.to_string());

      assert_eq!(result, expected);
    }
  }
}
