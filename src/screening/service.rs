use thiserror::Error;
use tracing::{debug, info, warn};

use super::classifier::{ClassifierError, FraudClassifier};
use super::notifier::{Notifier, NotifierError};
use super::reply::{IncomingReply, CLARIFICATION_MESSAGE, UNEXPECTED_CONTACT_MESSAGE};
use super::store::{StoreError, TransactionStore};
use super::transaction::{Status, Transaction, TransactionKey, ValidationError};
use super::update::{AllowedFields, TransactionUpdate, UpdatableField};

pub type Result<T> = core::result::Result<T, ScreeningError>;

/// Everything that can go wrong while moving one transaction (or one reply) through the state machine.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ScreeningError {
  #[error("Validation failed: {0}")]
  Validation(#[from] ValidationError),

  #[error("Classification failed: {0}")]
  Classification(#[from] ClassifierError),

  #[error("Persistence failed: {0}")]
  Persistence(#[from] StoreError),

  #[error("Notification failed: {0}")]
  Notification(#[from] NotifierError),

  #[error("Transition from {from} to {to} is not allowed")]
  InvalidTransition { from: Status, to: Status },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ingestion {
  Created,
  /// The transaction was already stored by an earlier delivery and was left untouched.
  Duplicate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screening {
  Approved,
  PotentialFraud,
  AlreadyScreened(Status),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
  Transitioned { status: Status, count: usize },
  NoPendingTransaction,
  Clarified,
}

/// The transaction status state machine and the side effects each transition requires.
///
/// Every operation works on a single transaction (or a single phone number), so one instance
/// can be shared by all the concurrent workers of a batch.
pub struct ScreeningService<S, C, N> {
  store: S,
  classifier: C,
  notifier: N,
  allowed_fields: AllowedFields,
}

impl<S, C, N> ScreeningService<S, C, N>
where
  S: TransactionStore,
  C: FraudClassifier,
  N: Notifier,
{
  pub fn new(store: S, classifier: C, notifier: N, allowed_fields: AllowedFields) -> Self {
    Self {
      store,
      classifier,
      notifier,
      allowed_fields,
    }
  }

  pub fn store(&self) -> &S {
    &self.store
  }

  /// Creates the transaction as `PENDING`.
  ///
  /// A key that already exists is reported as [`Ingestion::Duplicate`] rather than an error,
  /// so a redelivered create message does not get retried forever.
  pub async fn ingest(&self, transaction: Transaction) -> Result<Ingestion> {
    let transaction = Transaction {
      status: Status::Pending,
      ..transaction
    };
    transaction.validate()?;

    match self.store.save_transaction(&transaction).await {
      Ok(()) => {
        debug!(key = %transaction.key(), "Transaction created");
        Ok(Ingestion::Created)
      }
      Err(StoreError::AlreadyExists(key)) => {
        warn!(%key, "Transaction already exists, skipping create");
        Ok(Ingestion::Duplicate)
      }
      Err(error) => Err(error.into()),
    }
  }

  /// Classifies a pending transaction and persists the outcome.
  ///
  /// Fraud alerts (the text, then the email when the transaction has one) are dispatched before
  /// the status is persisted. When an alert fails the transaction stays `PENDING`, so the whole
  /// unit can be retried. A transaction another worker already moved out of `PENDING` is reported
  /// as [`Screening::AlreadyScreened`].
  pub async fn screen(&self, transaction: &Transaction) -> Result<Screening> {
    if transaction.status != Status::Pending {
      info!(key = %transaction.key(), status = %transaction.status, "Transaction already screened");
      return Ok(Screening::AlreadyScreened(transaction.status));
    }

    let key = transaction.key();
    let (outcome, next) = if self.classifier.predict_fraud(transaction).await? {
      self.notifier.dispatch_fraud_alert(transaction).await?;
      if !transaction.email.is_empty() {
        self.notifier.dispatch_fraud_email(transaction).await?;
      }
      (Screening::PotentialFraud, Status::PotentialFraud)
    } else {
      (Screening::Approved, Status::Approved)
    };

    match self
      .update(&key, Status::Pending, TransactionUpdate::status(next))
      .await
    {
      Ok(()) => {
        info!(%key, status = %next, "Transaction screened");
        Ok(outcome)
      }
      Err(ScreeningError::Persistence(StoreError::ConditionFailed { actual, .. }))
        if actual != Status::Pending =>
      {
        warn!(%key, status = %actual, "Transaction was screened concurrently");
        Ok(Screening::AlreadyScreened(actual))
      }
      Err(error) => Err(error),
    }
  }

  /// Screens the stored state of a transaction, as opposed to a queued copy of it
  /// that may predate later transitions.
  pub async fn rescreen(&self, key: &TransactionKey) -> Result<Screening> {
    let stored = self.store.get_transaction(key).await?;
    self.screen(&stored).await
  }

  /// Applies the allowed part of a partial update while the transaction is still in `expected` status.
  /// Nothing reaches the store when no allowed, non-empty field is left.
  pub async fn update(
    &self,
    key: &TransactionKey,
    expected: Status,
    update: TransactionUpdate,
  ) -> Result<()> {
    if let Some(next) = update.status {
      if next != expected && !expected.can_transition_to(next) {
        return Err(ScreeningError::InvalidTransition {
          from: expected,
          to: next,
        });
      }
    }

    let changes = update.restrict_to(&self.allowed_fields)?;
    self.store.update_transaction(key, expected, &changes).await?;
    Ok(())
  }

  /// Resolves a customer reply into a bulk transition of the phone number's pending-fraud transactions.
  ///
  /// The transition is attempted before answering, and its match count decides whether the
  /// customer gets a confirmation or the unexpected-contact text.
  pub async fn resolve(&self, reply: &IncomingReply) -> Result<Resolution> {
    if reply.phone.trim().is_empty() {
      return Err(ValidationError::MissingField("PhoneNumber").into());
    }

    let intent = reply.intent();
    let Some(status) = intent.target_status() else {
      self
        .notifier
        .dispatch_status_update(&reply.phone, CLARIFICATION_MESSAGE)
        .await?;
      debug!(phone = %reply.phone, "Unrecognized reply");
      return Ok(Resolution::Clarified);
    };

    if !self.allowed_fields.contains(UpdatableField::Status) {
      return Err(ValidationError::EmptyUpdate.into());
    }

    let count = self
      .store
      .update_transactions_by_phone_and_status(&reply.phone, Status::PotentialFraud, status)
      .await?;

    if count == 0 {
      self
        .notifier
        .dispatch_status_update(&reply.phone, UNEXPECTED_CONTACT_MESSAGE)
        .await?;
      info!(phone = %reply.phone, "Reply without pending transactions");
      Ok(Resolution::NoPendingTransaction)
    } else {
      self
        .notifier
        .dispatch_status_update(&reply.phone, intent.confirmation())
        .await?;
      info!(phone = %reply.phone, %status, count, "Pending transactions resolved");
      Ok(Resolution::Transitioned { status, count })
    }
  }
}
