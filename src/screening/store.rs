use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use thiserror::Error;

use super::transaction::{Status, Transaction, TransactionKey};
use super::update::FieldChanges;

pub type Result<T> = core::result::Result<T, StoreError>;

/// Errors from the persistence of transactions.
/// The conditional write failures are the only concurrency control between workers.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum StoreError {
  #[error("Transaction already exists: {0}")]
  AlreadyExists(TransactionKey),

  #[error("Transaction not found: {0}")]
  NotFound(TransactionKey),

  #[error("Transaction {key} is {actual}, expected {expected}")]
  ConditionFailed {
    key: TransactionKey,
    expected: Status,
    actual: Status,
  },

  #[error("Store unavailable: {0}")]
  Unavailable(String),
}

/// Interface to the persistence of transactions.
///
/// The key schema is account as partition key and transaction as sort key,
/// with a secondary index on the phone number for reply resolution.
#[async_trait]
pub trait TransactionStore: Send + Sync {
  /// Creates the transaction, failing with [`StoreError::AlreadyExists`] if its key is taken.
  /// An existing transaction is never overwritten.
  async fn save_transaction(&self, transaction: &Transaction) -> Result<()>;

  /// Reads the current state of a transaction, failing with [`StoreError::NotFound`] if there is none.
  async fn get_transaction(&self, key: &TransactionKey) -> Result<Transaction>;

  /// Removes a transaction, failing with [`StoreError::NotFound`] if there is none.
  async fn delete_transaction(&self, key: &TransactionKey) -> Result<()>;

  /// Applies the changes only while the stored transaction is still in the `expected` status.
  async fn update_transaction(
    &self,
    key: &TransactionKey,
    expected: Status,
    changes: &FieldChanges,
  ) -> Result<()>;

  /// Moves every transaction of the phone number from one status to another,
  /// returning how many were actually transitioned.
  async fn update_transactions_by_phone_and_status(
    &self,
    phone: &str,
    from: Status,
    to: Status,
  ) -> Result<usize>;
}

/// Implementation of the [`TransactionStore`] that keeps transactions in memory.
#[derive(Debug, Default)]
pub struct InMemoryTransactionStore {
  transactions: DashMap<TransactionKey, Transaction>,
}

impl InMemoryTransactionStore {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn len(&self) -> usize {
    self.transactions.len()
  }

  #[cfg(test)]
  pub fn with_transactions<I>(transactions: I) -> Self
  where
    I: IntoIterator<Item = Transaction>,
  {
    Self {
      transactions: transactions
        .into_iter()
        .map(|transaction| (transaction.key(), transaction))
        .collect(),
    }
  }
}

#[async_trait]
impl TransactionStore for InMemoryTransactionStore {
  async fn save_transaction(&self, transaction: &Transaction) -> Result<()> {
    match self.transactions.entry(transaction.key()) {
      Entry::Occupied(entry) => Err(StoreError::AlreadyExists(entry.key().clone())),
      Entry::Vacant(entry) => {
        entry.insert(transaction.clone());
        Ok(())
      }
    }
  }

  async fn get_transaction(&self, key: &TransactionKey) -> Result<Transaction> {
    self
      .transactions
      .get(key)
      .map(|entry| entry.value().clone())
      .ok_or_else(|| StoreError::NotFound(key.clone()))
  }

  async fn delete_transaction(&self, key: &TransactionKey) -> Result<()> {
    self
      .transactions
      .remove(key)
      .map(|_| ())
      .ok_or_else(|| StoreError::NotFound(key.clone()))
  }

  async fn update_transaction(
    &self,
    key: &TransactionKey,
    expected: Status,
    changes: &FieldChanges,
  ) -> Result<()> {
    let mut stored = self
      .transactions
      .get_mut(key)
      .ok_or_else(|| StoreError::NotFound(key.clone()))?;

    if stored.status != expected {
      return Err(StoreError::ConditionFailed {
        key: key.clone(),
        expected,
        actual: stored.status,
      });
    }

    changes.apply_to(stored.value_mut());
    Ok(())
  }

  async fn update_transactions_by_phone_and_status(
    &self,
    phone: &str,
    from: Status,
    to: Status,
  ) -> Result<usize> {
    let mut updated = 0;
    for mut entry in self.transactions.iter_mut() {
      if entry.phone == phone && entry.status == from {
        entry.status = to;
        updated += 1;
      }
    }
    Ok(updated)
  }
}
