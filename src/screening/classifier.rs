use async_trait::async_trait;
use rust_decimal::Decimal;
use thiserror::Error;

use super::transaction::Transaction;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum ClassifierError {
  #[error("Classifier unavailable: {0}")]
  Unavailable(String),
}

/// Interface to the fraud-scoring capability.
/// A prediction covers a single transaction and its failure never affects other transactions.
#[async_trait]
pub trait FraudClassifier: Send + Sync {
  async fn predict_fraud(&self, transaction: &Transaction) -> Result<bool, ClassifierError>;
}

/// A local stand-in for the scoring endpoint that flags transactions
/// above an amount limit or with too many login attempts.
#[derive(Debug, Clone)]
pub struct ThresholdClassifier {
  amount_limit: Decimal,
  max_login_attempts: u32,
}

impl ThresholdClassifier {
  pub fn new(amount_limit: Decimal, max_login_attempts: u32) -> Self {
    Self {
      amount_limit,
      max_login_attempts,
    }
  }
}

#[async_trait]
impl FraudClassifier for ThresholdClassifier {
  async fn predict_fraud(&self, transaction: &Transaction) -> Result<bool, ClassifierError> {
    Ok(transaction.amount > self.amount_limit || transaction.login_attempts > self.max_login_attempts)
  }
}
