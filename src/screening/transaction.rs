use std::fmt;
use std::net::IpAddr;
use std::str::FromStr;

use rust_decimal::Decimal;
use thiserror::Error;

/// Alias for an account ID
pub type AccountId = String;

/// Alias for a transaction ID
pub type TransactionId = String;

const MINIMUM_CUSTOMER_AGE: u32 = 18;

/// The screening status of a transaction.
///
/// ```text
/// PENDING ──► POTENTIAL_FRAUD ──► FRAUD
///    │               │
///    └──────────► APPROVED ◄──┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Status {
  #[default]
  Pending,
  PotentialFraud,
  Approved,
  Fraud,
}

impl Status {
  pub fn as_str(&self) -> &'static str {
    match self {
      Status::Pending => "PENDING",
      Status::PotentialFraud => "POTENTIAL_FRAUD",
      Status::Approved => "APPROVED",
      Status::Fraud => "FRAUD",
    }
  }

  /// Once a transaction is approved or confirmed as fraud it is not expected to change again.
  pub fn is_terminal(&self) -> bool {
    matches!(self, Status::Approved | Status::Fraud)
  }

  pub fn can_transition_to(&self, next: Status) -> bool {
    matches!(
      (self, next),
      (Status::Pending, Status::PotentialFraud)
        | (Status::Pending, Status::Approved)
        | (Status::PotentialFraud, Status::Fraud)
        | (Status::PotentialFraud, Status::Approved)
    )
  }
}

impl fmt::Display for Status {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

#[derive(Debug, Clone, Error, PartialEq)]
#[error("Unknown transaction status: {0}")]
pub struct UnknownStatus(pub String);

impl FromStr for Status {
  type Err = UnknownStatus;

  fn from_str(value: &str) -> Result<Self, Self::Err> {
    match value {
      "PENDING" => Ok(Status::Pending),
      "POTENTIAL_FRAUD" => Ok(Status::PotentialFraud),
      "APPROVED" => Ok(Status::Approved),
      "FRAUD" => Ok(Status::Fraud),
      other => Err(UnknownStatus(other.to_string())),
    }
  }
}

/// The identity of a transaction: partition key is the account, sort key the transaction.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TransactionKey {
  pub account_id: AccountId,
  pub transaction_id: TransactionId,
}

impl TransactionKey {
  pub fn new(account_id: impl Into<AccountId>, transaction_id: impl Into<TransactionId>) -> Self {
    Self {
      account_id: account_id.into(),
      transaction_id: transaction_id.into(),
    }
  }
}

impl fmt::Display for TransactionKey {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}/{}", self.account_id, self.transaction_id)
  }
}

/// A financial event under screening.
///
/// Only `transaction_id` and `account_id` identify it, everything else is descriptive
/// and can only change through an allow-listed [`TransactionUpdate`](super::update::TransactionUpdate).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Transaction {
  pub transaction_id: TransactionId,
  pub account_id: AccountId,
  pub status: Status,
  pub amount: Decimal,
  pub date: String,
  pub kind: String,
  pub location: String,
  pub device_id: String,
  pub ip_address: String,
  pub merchant_id: String,
  pub channel: String,
  pub customer_age: u32,
  pub customer_occupation: String,
  pub duration_secs: u32,
  pub login_attempts: u32,
  pub account_balance: Decimal,
  pub previous_transaction_date: String,
  pub phone: String,
  pub email: String,
}

impl Transaction {
  pub fn key(&self) -> TransactionKey {
    TransactionKey::new(self.account_id.clone(), self.transaction_id.clone())
  }

  pub fn context(&self) -> TransactionContext {
    TransactionContext::from(self)
  }

  /// Business checks applied before a transaction is created.
  /// Decoding never runs these, so a well-typed transaction can still be rejected here.
  pub fn validate(&self) -> Result<(), ValidationError> {
    if self.transaction_id.trim().is_empty() {
      return Err(ValidationError::MissingField("TransactionID"));
    }
    if self.account_id.trim().is_empty() {
      return Err(ValidationError::MissingField("AccountID"));
    }
    if self.phone.trim().is_empty() {
      return Err(ValidationError::MissingField("PhoneNumber"));
    }
    if !is_valid_phone(&self.phone) {
      return Err(ValidationError::InvalidPhone(self.phone.clone()));
    }
    if self.email.trim().is_empty() {
      return Err(ValidationError::MissingField("Email"));
    }
    if !is_valid_email(&self.email) {
      return Err(ValidationError::InvalidEmail(self.email.clone()));
    }
    if !self.ip_address.is_empty() && self.ip_address.parse::<IpAddr>().is_err() {
      return Err(ValidationError::InvalidIpAddress(self.ip_address.clone()));
    }
    if self.customer_age < MINIMUM_CUSTOMER_AGE {
      return Err(ValidationError::Underage(self.customer_age));
    }
    if self.amount < Decimal::ZERO {
      return Err(ValidationError::NegativeAmount(self.amount));
    }
    Ok(())
  }
}

/// Phone numbers are expected in E.164 form: a leading `+` and 8 to 15 digits.
pub fn is_valid_phone(phone: &str) -> bool {
  match phone.strip_prefix('+') {
    Some(digits) => {
      (8..=15).contains(&digits.len())
        && digits.chars().all(|c| c.is_ascii_digit())
        && !digits.starts_with('0')
    }
    None => false,
  }
}

fn is_valid_email(email: &str) -> bool {
  match email.split_once('@') {
    Some((local, domain)) => {
      !local.is_empty() && domain.contains('.') && !domain.starts_with('.') && !domain.ends_with('.')
    }
    None => false,
  }
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum ValidationError {
  #[error("Missing required field {0}")]
  MissingField(&'static str),

  #[error("Invalid phone number: {0}")]
  InvalidPhone(String),

  #[error("Invalid email: {0}")]
  InvalidEmail(String),

  #[error("Invalid IP address: {0}")]
  InvalidIpAddress(String),

  #[error("Customer is under age: {0}")]
  Underage(u32),

  #[error("Invalid negative amount: {0}")]
  NegativeAmount(Decimal),

  #[error("Update carries no allowed, non-empty field")]
  EmptyUpdate,
}

/// The details needed to triage a failed transaction without fetching it again.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionContext {
  pub transaction_id: TransactionId,
  pub account_id: AccountId,
  pub amount: Decimal,
  pub phone: String,
  pub email: String,
}

impl From<&Transaction> for TransactionContext {
  fn from(transaction: &Transaction) -> Self {
    Self {
      transaction_id: transaction.transaction_id.clone(),
      account_id: transaction.account_id.clone(),
      amount: transaction.amount,
      phone: transaction.phone.clone(),
      email: transaction.email.clone(),
    }
  }
}

impl fmt::Display for TransactionContext {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(
      f,
      "transaction {} (account {}, amount {}, phone {}, email {})",
      self.transaction_id, self.account_id, self.amount, self.phone, self.email
    )
  }
}

#[cfg(test)]
pub(crate) fn test_transaction(account_id: &str, transaction_id: &str) -> Transaction {
  use rust_decimal_macros::dec;

  Transaction {
    transaction_id: transaction_id.to_string(),
    account_id: account_id.to_string(),
    status: Status::Pending,
    amount: dec!(14.09),
    date: "2023-04-11 16:29:14".to_string(),
    kind: "Debit".to_string(),
    location: "San Diego".to_string(),
    device_id: "D000380".to_string(),
    ip_address: "162.198.218.92".to_string(),
    merchant_id: "M015".to_string(),
    channel: "ATM".to_string(),
    customer_age: 70,
    customer_occupation: "Doctor".to_string(),
    duration_secs: 81,
    login_attempts: 1,
    account_balance: dec!(5112.21),
    previous_transaction_date: "2024-11-04 08:08:08".to_string(),
    phone: "+15555550100".to_string(),
    email: "customer@example.com".to_string(),
  }
}

#[cfg(test)]
mod tests {

  use rust_decimal_macros::dec;

  use super::*;

  #[test]
  fn status_transitions() {
    let allowed = vec![
      (Status::Pending, Status::PotentialFraud),
      (Status::Pending, Status::Approved),
      (Status::PotentialFraud, Status::Fraud),
      (Status::PotentialFraud, Status::Approved),
    ];
    let all = [
      Status::Pending,
      Status::PotentialFraud,
      Status::Approved,
      Status::Fraud,
    ];

    for from in all {
      for to in all {
        assert_eq!(
          from.can_transition_to(to),
          allowed.contains(&(from, to)),
          "{} -> {}",
          from,
          to
        );
      }
    }
  }

  #[test]
  fn status_terminal() {
    assert!(!Status::Pending.is_terminal());
    assert!(!Status::PotentialFraud.is_terminal());
    assert!(Status::Approved.is_terminal());
    assert!(Status::Fraud.is_terminal());
  }

  #[test]
  fn status_parse() {
    assert_eq!("POTENTIAL_FRAUD".parse(), Ok(Status::PotentialFraud));
    assert_eq!(
      "pending".parse::<Status>(),
      Err(UnknownStatus("pending".to_string()))
    );
    assert_eq!(Status::Fraud.to_string(), "FRAUD");
  }

  #[test]
  fn validate_successfully() {
    assert_eq!(test_transaction("AC1", "TX1").validate(), Ok(()));

    let without_ip = Transaction {
      ip_address: String::new(),
      ..test_transaction("AC1", "TX1")
    };
    assert_eq!(without_ip.validate(), Ok(()));

    let ipv6 = Transaction {
      ip_address: "2001:db8::1".to_string(),
      ..test_transaction("AC1", "TX1")
    };
    assert_eq!(ipv6.validate(), Ok(()));
  }

  #[test]
  fn validate_failures() {
    let base = test_transaction("AC1", "TX1");
    let cases = vec![
      (
        Transaction {
          transaction_id: " ".to_string(),
          ..base.clone()
        },
        ValidationError::MissingField("TransactionID"),
      ),
      (
        Transaction {
          account_id: String::new(),
          ..base.clone()
        },
        ValidationError::MissingField("AccountID"),
      ),
      (
        Transaction {
          phone: String::new(),
          ..base.clone()
        },
        ValidationError::MissingField("PhoneNumber"),
      ),
      (
        Transaction {
          phone: "555-0100".to_string(),
          ..base.clone()
        },
        ValidationError::InvalidPhone("555-0100".to_string()),
      ),
      (
        Transaction {
          email: "nobody".to_string(),
          ..base.clone()
        },
        ValidationError::InvalidEmail("nobody".to_string()),
      ),
      (
        Transaction {
          email: String::new(),
          ..base.clone()
        },
        ValidationError::MissingField("Email"),
      ),
      (
        Transaction {
          ip_address: "162.198.218".to_string(),
          ..base.clone()
        },
        ValidationError::InvalidIpAddress("162.198.218".to_string()),
      ),
      (
        Transaction {
          customer_age: 17,
          ..base.clone()
        },
        ValidationError::Underage(17),
      ),
      (
        Transaction {
          amount: dec!(-0.01),
          ..base.clone()
        },
        ValidationError::NegativeAmount(dec!(-0.01)),
      ),
    ];

    for (input, expected) in cases {
      assert_eq!(input.validate(), Err(expected));
    }
  }

  #[test]
  fn phone_format() {
    assert!(is_valid_phone("+15555550100"));
    assert!(is_valid_phone("+447700900123"));
    assert!(!is_valid_phone("15555550100"));
    assert!(!is_valid_phone("+1555"));
    assert!(!is_valid_phone("+0155555501"));
    assert!(!is_valid_phone("+1555555010a"));
  }

  #[test]
  fn context_display() {
    let context = test_transaction("AC1", "TX1").context();

    assert_eq!(
      context.to_string(),
      "transaction TX1 (account AC1, amount 14.09, phone +15555550100, email customer@example.com)"
    );
  }
}
