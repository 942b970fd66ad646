use std::collections::{HashMap, HashSet};
use std::fmt;

use thiserror::Error;

use crate::io::{BatchItemFailure, BatchResponse, DecodeError, DeliveryId};
use crate::screening::{IncomingReply, ScreeningError, Transaction, TransactionContext};

/// Why a single item of a batch failed. Every variant is caught at the worker boundary
/// and never affects the other items of the batch.
#[derive(Debug, Error)]
pub enum ItemError {
  #[error("Undecodable record: {0}")]
  Decode(#[from] DecodeError),

  #[error("{context}: {source}")]
  Transaction {
    context: TransactionContext,
    source: ScreeningError,
  },

  #[error("Reply from {phone}: {source}")]
  Reply { phone: String, source: ScreeningError },

  #[error("Deadline exceeded before the item completed")]
  DeadlineExceeded,

  #[error("Worker panicked: {0}")]
  Panicked(String),
}

impl ItemError {
  pub fn transaction(transaction: &Transaction, source: ScreeningError) -> Self {
    Self::Transaction {
      context: transaction.context(),
      source,
    }
  }

  pub fn reply(reply: &IncomingReply, source: ScreeningError) -> Self {
    Self::Reply {
      phone: reply.phone.clone(),
      source,
    }
  }
}

/// A failed item tied to the delivery identifier of the record it came from.
#[derive(Debug)]
pub struct ItemFailure {
  pub identifier: DeliveryId,
  pub error: ItemError,
}

impl fmt::Display for ItemFailure {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "[{}] {}", self.identifier, self.error)
  }
}

/// All the failures of one batch joined into a single error, one line per failure.
#[derive(Debug)]
pub struct BatchError {
  failures: Vec<ItemFailure>,
}

impl BatchError {
  pub fn failures(&self) -> &[ItemFailure] {
    &self.failures
  }
}

impl fmt::Display for BatchError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{} item(s) failed", self.failures.len())?;
    for failure in &self.failures {
      write!(f, "\n{}", failure)?;
    }
    Ok(())
  }
}

impl std::error::Error for BatchError {}

/// The result of processing one batch.
///
/// Every identifier of a failed record appears exactly once in the response and carries at least
/// one failure in the error, while identifiers of records that succeeded never appear.
#[derive(Debug)]
pub struct BatchOutcome {
  pub response: BatchResponse,
  pub error: Option<BatchError>,
}

impl BatchOutcome {
  pub fn is_success(&self) -> bool {
    self.error.is_none()
  }

  pub fn failed_identifiers(&self) -> Vec<&str> {
    self
      .response
      .batch_item_failures
      .iter()
      .map(|failure| failure.item_identifier.as_str())
      .collect()
  }
}

/// Collects item failures as they complete, in any order, and maps them back to
/// the input order of the records they belong to.
#[derive(Debug, Default)]
pub struct BatchResultBuilder {
  positions: HashMap<DeliveryId, usize>,
  failures: Vec<ItemFailure>,
}

impl BatchResultBuilder {
  pub fn new() -> Self {
    Self::default()
  }

  /// Registers an input record so its failures can be placed in input order.
  pub fn register(&mut self, identifier: &str) {
    let position = self.positions.len();
    self.positions.entry(identifier.to_string()).or_insert(position);
  }

  pub fn record_failure(&mut self, identifier: DeliveryId, error: ItemError) {
    self.failures.push(ItemFailure { identifier, error });
  }

  pub fn build(self) -> BatchOutcome {
    let positions = self.positions;
    let mut failures = self.failures;
    failures.sort_by_key(|failure| {
      positions
        .get(&failure.identifier)
        .copied()
        .unwrap_or(usize::MAX)
    });

    let batch_item_failures = {
      let mut seen = HashSet::new();
      let unique: Vec<BatchItemFailure> = failures
        .iter()
        .filter(|failure| seen.insert(failure.identifier.as_str()))
        .map(|failure| BatchItemFailure::new(failure.identifier.clone()))
        .collect();
      unique
    };

    let error = if failures.is_empty() {
      None
    } else {
      Some(BatchError { failures })
    };

    BatchOutcome {
      response: BatchResponse {
        batch_item_failures,
      },
      error,
    }
  }
}
