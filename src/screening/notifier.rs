use async_trait::async_trait;
use chrono::DateTime;
use thiserror::Error;
use tracing::info;

use super::transaction::{Transaction, TransactionKey};

#[derive(Debug, Clone, Error, PartialEq)]
pub enum NotifierError {
  #[error("No contact to notify for transaction {0}")]
  MissingContact(TransactionKey),

  #[error("Dispatch failed: {0}")]
  Dispatch(String),
}

/// Interface to the outbound notification transport.
#[async_trait]
pub trait Notifier: Send + Sync {
  /// Sends the fraud alert for a transaction to its contact.
  async fn dispatch_fraud_alert(&self, transaction: &Transaction) -> Result<(), NotifierError>;

  /// Sends the fraud alert for a transaction to its email address.
  async fn dispatch_fraud_email(&self, transaction: &Transaction) -> Result<(), NotifierError>;

  /// Sends a free-text status update to a phone number.
  async fn dispatch_status_update(&self, phone: &str, body: &str) -> Result<(), NotifierError>;
}

/// The text of the alert asking the customer to confirm a suspicious transaction.
pub fn fraud_alert_body(transaction: &Transaction) -> String {
  format!(
    "Suspicious transaction of {} at merchant {} on {}. Reply YES if you made this transaction or NO if you did not.",
    transaction.amount.round_dp(2),
    transaction.merchant_id,
    transaction.date
  )
}

pub const FRAUD_EMAIL_SUBJECT: &str = "Suspicious Activity on Your Card";

/// The body of the fraud alert email. RFC 3339 dates are shown as e.g. `Jul 10 at 6:16 PM`,
/// anything else is shown as received.
pub fn fraud_email_body(transaction: &Transaction) -> String {
  let date = DateTime::parse_from_rfc3339(&transaction.date)
    .map(|date| date.format("%b %-d at %-I:%M %p").to_string())
    .unwrap_or_else(|_| transaction.date.clone());

  format!(
    "We detected a suspicious transaction on your account ending in {} for ${:.2} at {} on {}. \
     If this was you, reply YES. If not, reply NO or call us immediately.",
    last_four(&transaction.account_id),
    transaction.amount.round_dp(2),
    transaction.merchant_id,
    date
  )
}

fn last_four(account_id: &str) -> String {
  let skip = account_id.chars().count().saturating_sub(4);
  account_id.chars().skip(skip).collect()
}

/// Implementation of the [`Notifier`] that emits every message as a structured log event
/// instead of handing it to an SMS provider.
#[derive(Debug, Clone)]
pub struct TracingNotifier {
  origination_number: String,
}

impl TracingNotifier {
  pub fn new(origination_number: impl Into<String>) -> Self {
    Self {
      origination_number: origination_number.into(),
    }
  }
}

#[async_trait]
impl Notifier for TracingNotifier {
  async fn dispatch_fraud_alert(&self, transaction: &Transaction) -> Result<(), NotifierError> {
    if transaction.phone.is_empty() {
      return Err(NotifierError::MissingContact(transaction.key()));
    }
    info!(
      from = %self.origination_number,
      to = %transaction.phone,
      transaction_id = %transaction.transaction_id,
      "{}",
      fraud_alert_body(transaction)
    );
    Ok(())
  }

  async fn dispatch_fraud_email(&self, transaction: &Transaction) -> Result<(), NotifierError> {
    if transaction.email.is_empty() {
      return Err(NotifierError::MissingContact(transaction.key()));
    }
    info!(
      to = %transaction.email,
      subject = FRAUD_EMAIL_SUBJECT,
      transaction_id = %transaction.transaction_id,
      "{}",
      fraud_email_body(transaction)
    );
    Ok(())
  }

  async fn dispatch_status_update(&self, phone: &str, body: &str) -> Result<(), NotifierError> {
    if phone.is_empty() {
      return Err(NotifierError::Dispatch("empty destination number".to_string()));
    }
    info!(from = %self.origination_number, to = %phone, "{}", body);
    Ok(())
  }
}
