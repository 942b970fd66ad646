use std::collections::BTreeSet;
use std::str::FromStr;

use rust_decimal::Decimal;
use thiserror::Error;

use super::transaction::{Status, Transaction, ValidationError};

/// The fields of a [`Transaction`] that may ever be changed after it was created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum UpdatableField {
  Status,
  Amount,
  Date,
  Location,
  DeviceId,
  IpAddress,
  MerchantId,
  Channel,
  CustomerAge,
  CustomerOccupation,
  Duration,
  LoginAttempts,
  AccountBalance,
  PreviousTransactionDate,
  Phone,
  Email,
}

impl UpdatableField {
  pub const ALL: [UpdatableField; 16] = [
    UpdatableField::Status,
    UpdatableField::Amount,
    UpdatableField::Date,
    UpdatableField::Location,
    UpdatableField::DeviceId,
    UpdatableField::IpAddress,
    UpdatableField::MerchantId,
    UpdatableField::Channel,
    UpdatableField::CustomerAge,
    UpdatableField::CustomerOccupation,
    UpdatableField::Duration,
    UpdatableField::LoginAttempts,
    UpdatableField::AccountBalance,
    UpdatableField::PreviousTransactionDate,
    UpdatableField::Phone,
    UpdatableField::Email,
  ];

  /// The stored attribute name of the field.
  pub fn attribute_name(&self) -> &'static str {
    match self {
      UpdatableField::Status => "TransactionStatus",
      UpdatableField::Amount => "TransactionAmount",
      UpdatableField::Date => "TransactionDate",
      UpdatableField::Location => "Location",
      UpdatableField::DeviceId => "DeviceID",
      UpdatableField::IpAddress => "IPAddress",
      UpdatableField::MerchantId => "MerchantID",
      UpdatableField::Channel => "Channel",
      UpdatableField::CustomerAge => "CustomerAge",
      UpdatableField::CustomerOccupation => "CustomerOccupation",
      UpdatableField::Duration => "TransactionDuration",
      UpdatableField::LoginAttempts => "LoginAttempts",
      UpdatableField::AccountBalance => "AccountBalance",
      UpdatableField::PreviousTransactionDate => "PreviousTransactionDate",
      UpdatableField::Phone => "PhoneNumber",
      UpdatableField::Email => "Email",
    }
  }
}

#[derive(Debug, Clone, Error, PartialEq)]
#[error("Unknown updatable field: {0}")]
pub struct UnknownField(pub String);

impl FromStr for UpdatableField {
  type Err = UnknownField;

  fn from_str(name: &str) -> Result<Self, Self::Err> {
    UpdatableField::ALL
      .iter()
      .copied()
      .find(|field| field.attribute_name() == name)
      .ok_or_else(|| UnknownField(name.to_string()))
  }
}

/// The allow-list of fields that updates are restricted to.
#[derive(Debug, Clone, PartialEq)]
pub struct AllowedFields(BTreeSet<UpdatableField>);

impl AllowedFields {
  pub fn new<I>(fields: I) -> Self
  where
    I: IntoIterator<Item = UpdatableField>,
  {
    Self(fields.into_iter().collect())
  }

  /// Builds the allow-list from attribute names, failing on any name that is not updatable.
  pub fn from_names<I, S>(names: I) -> Result<Self, UnknownField>
  where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
  {
    names
      .into_iter()
      .map(|name| name.as_ref().parse::<UpdatableField>())
      .collect::<Result<BTreeSet<_>, _>>()
      .map(Self)
  }

  pub fn contains(&self, field: UpdatableField) -> bool {
    self.0.contains(&field)
  }
}

impl Default for AllowedFields {
  fn default() -> Self {
    Self::new(UpdatableField::ALL)
  }
}

/// One typed change to an updatable field.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldChange {
  Status(Status),
  Amount(Decimal),
  Date(String),
  Location(String),
  DeviceId(String),
  IpAddress(String),
  MerchantId(String),
  Channel(String),
  CustomerAge(u32),
  CustomerOccupation(String),
  Duration(u32),
  LoginAttempts(u32),
  AccountBalance(Decimal),
  PreviousTransactionDate(String),
  Phone(String),
  Email(String),
}

impl FieldChange {
  pub fn field(&self) -> UpdatableField {
    match self {
      FieldChange::Status(_) => UpdatableField::Status,
      FieldChange::Amount(_) => UpdatableField::Amount,
      FieldChange::Date(_) => UpdatableField::Date,
      FieldChange::Location(_) => UpdatableField::Location,
      FieldChange::DeviceId(_) => UpdatableField::DeviceId,
      FieldChange::IpAddress(_) => UpdatableField::IpAddress,
      FieldChange::MerchantId(_) => UpdatableField::MerchantId,
      FieldChange::Channel(_) => UpdatableField::Channel,
      FieldChange::CustomerAge(_) => UpdatableField::CustomerAge,
      FieldChange::CustomerOccupation(_) => UpdatableField::CustomerOccupation,
      FieldChange::Duration(_) => UpdatableField::Duration,
      FieldChange::LoginAttempts(_) => UpdatableField::LoginAttempts,
      FieldChange::AccountBalance(_) => UpdatableField::AccountBalance,
      FieldChange::PreviousTransactionDate(_) => UpdatableField::PreviousTransactionDate,
      FieldChange::Phone(_) => UpdatableField::Phone,
      FieldChange::Email(_) => UpdatableField::Email,
    }
  }

  pub fn apply(&self, transaction: &mut Transaction) {
    match self {
      FieldChange::Status(value) => transaction.status = *value,
      FieldChange::Amount(value) => transaction.amount = *value,
      FieldChange::Date(value) => transaction.date = value.clone(),
      FieldChange::Location(value) => transaction.location = value.clone(),
      FieldChange::DeviceId(value) => transaction.device_id = value.clone(),
      FieldChange::IpAddress(value) => transaction.ip_address = value.clone(),
      FieldChange::MerchantId(value) => transaction.merchant_id = value.clone(),
      FieldChange::Channel(value) => transaction.channel = value.clone(),
      FieldChange::CustomerAge(value) => transaction.customer_age = *value,
      FieldChange::CustomerOccupation(value) => transaction.customer_occupation = value.clone(),
      FieldChange::Duration(value) => transaction.duration_secs = *value,
      FieldChange::LoginAttempts(value) => transaction.login_attempts = *value,
      FieldChange::AccountBalance(value) => transaction.account_balance = *value,
      FieldChange::PreviousTransactionDate(value) => {
        transaction.previous_transaction_date = value.clone()
      }
      FieldChange::Phone(value) => transaction.phone = value.clone(),
      FieldChange::Email(value) => transaction.email = value.clone(),
    }
  }

  fn is_empty(&self) -> bool {
    match self {
      FieldChange::Date(value)
      | FieldChange::Location(value)
      | FieldChange::DeviceId(value)
      | FieldChange::IpAddress(value)
      | FieldChange::MerchantId(value)
      | FieldChange::Channel(value)
      | FieldChange::CustomerOccupation(value)
      | FieldChange::PreviousTransactionDate(value)
      | FieldChange::Phone(value)
      | FieldChange::Email(value) => value.trim().is_empty(),
      _ => false,
    }
  }
}

/// A non-empty set of allowed changes, ready to be handed to a store.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldChanges(Vec<FieldChange>);

impl FieldChanges {
  pub fn iter(&self) -> impl Iterator<Item = &FieldChange> {
    self.0.iter()
  }

  pub fn status(&self) -> Option<Status> {
    self.0.iter().find_map(|change| match change {
      FieldChange::Status(status) => Some(*status),
      _ => None,
    })
  }

  pub fn apply_to(&self, transaction: &mut Transaction) {
    for change in &self.0 {
      change.apply(transaction);
    }
  }
}

/// A partial update of a transaction. Fields left as `None` or empty strings are not changed.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TransactionUpdate {
  pub status: Option<Status>,
  pub amount: Option<Decimal>,
  pub date: Option<String>,
  pub location: Option<String>,
  pub device_id: Option<String>,
  pub ip_address: Option<String>,
  pub merchant_id: Option<String>,
  pub channel: Option<String>,
  pub customer_age: Option<u32>,
  pub customer_occupation: Option<String>,
  pub duration_secs: Option<u32>,
  pub login_attempts: Option<u32>,
  pub account_balance: Option<Decimal>,
  pub previous_transaction_date: Option<String>,
  pub phone: Option<String>,
  pub email: Option<String>,
}

impl TransactionUpdate {
  pub fn status(status: Status) -> Self {
    Self {
      status: Some(status),
      ..Self::default()
    }
  }

  /// Keeps only the allowed, non-empty changes. Disallowed fields are dropped silently,
  /// but an update left with nothing to change is rejected.
  pub fn restrict_to(self, allowed: &AllowedFields) -> Result<FieldChanges, ValidationError> {
    let changes: Vec<FieldChange> = self
      .into_changes()
      .into_iter()
      .filter(|change| allowed.contains(change.field()) && !change.is_empty())
      .collect();

    if changes.is_empty() {
      Err(ValidationError::EmptyUpdate)
    } else {
      Ok(FieldChanges(changes))
    }
  }

  fn into_changes(self) -> Vec<FieldChange> {
    [
      self.status.map(FieldChange::Status),
      self.amount.map(FieldChange::Amount),
      self.date.map(FieldChange::Date),
      self.location.map(FieldChange::Location),
      self.device_id.map(FieldChange::DeviceId),
      self.ip_address.map(FieldChange::IpAddress),
      self.merchant_id.map(FieldChange::MerchantId),
      self.channel.map(FieldChange::Channel),
      self.customer_age.map(FieldChange::CustomerAge),
      self.customer_occupation.map(FieldChange::CustomerOccupation),
      self.duration_secs.map(FieldChange::Duration),
      self.login_attempts.map(FieldChange::LoginAttempts),
      self.account_balance.map(FieldChange::AccountBalance),
      self
        .previous_transaction_date
        .map(FieldChange::PreviousTransactionDate),
      self.phone.map(FieldChange::Phone),
      self.email.map(FieldChange::Email),
    ]
    .into_iter()
    .flatten()
    .collect()
  }
}
