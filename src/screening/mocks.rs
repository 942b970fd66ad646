use async_trait::async_trait;

use super::classifier::{ClassifierError, FraudClassifier};
use super::notifier::{Notifier, NotifierError};
use super::store::{StoreError, TransactionStore};
use super::transaction::{Status, Transaction, TransactionKey};
use super::update::FieldChanges;

mockall::mock! {
  pub TestStore {}
  #[async_trait]
  impl TransactionStore for TestStore {
    async fn save_transaction(&self, transaction: &Transaction) -> Result<(), StoreError>;
    async fn get_transaction(&self, key: &TransactionKey) -> Result<Transaction, StoreError>;
    async fn delete_transaction(&self, key: &TransactionKey) -> Result<(), StoreError>;
    async fn update_transaction(
      &self,
      key: &TransactionKey,
      expected: Status,
      changes: &FieldChanges,
    ) -> Result<(), StoreError>;
    async fn update_transactions_by_phone_and_status(
      &self,
      phone: &str,
      from: Status,
      to: Status,
    ) -> Result<usize, StoreError>;
  }
}

mockall::mock! {
  pub TestClassifier {}
  #[async_trait]
  impl FraudClassifier for TestClassifier {
    async fn predict_fraud(&self, transaction: &Transaction) -> Result<bool, ClassifierError>;
  }
}

mockall::mock! {
  pub TestNotifier {}
  #[async_trait]
  impl Notifier for TestNotifier {
    async fn dispatch_fraud_alert(&self, transaction: &Transaction) -> Result<(), NotifierError>;
    async fn dispatch_fraud_email(&self, transaction: &Transaction) -> Result<(), NotifierError>;
    async fn dispatch_status_update(&self, phone: &str, body: &str) -> Result<(), NotifierError>;
  }
}
