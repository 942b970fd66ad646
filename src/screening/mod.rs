//! This module contains the domain logic to screen transactions for fraud
//!
//! The [`ScreeningService`] is the transaction status state machine. It depends only on the
//! capability ports [`TransactionStore`], [`FraudClassifier`] and [`Notifier`], whose local
//! implementations ([`InMemoryTransactionStore`], [`ThresholdClassifier`], [`TracingNotifier`])
//! are enough to run the pipelines without any external system.
//

mod classifier;
mod notifier;
mod reply;
mod service;
mod store;
mod transaction;
mod update;

#[cfg(test)]
pub(crate) mod mocks;

pub use classifier::{FraudClassifier, ThresholdClassifier};
pub use notifier::{Notifier, TracingNotifier};
pub use reply::IncomingReply;
pub use service::{ScreeningError, ScreeningService};
pub use store::{InMemoryTransactionStore, TransactionStore};
pub use transaction::{Status, Transaction, TransactionContext, UnknownStatus};
pub use update::{AllowedFields, UpdatableField};

#[cfg(test)]
pub(crate) use classifier::ClassifierError;
#[cfg(test)]
pub(crate) use notifier::NotifierError;
#[cfg(test)]
pub(crate) use reply::{CANCELLED_MESSAGE, UNEXPECTED_CONTACT_MESSAGE};
#[cfg(test)]
pub(crate) use store::StoreError;
#[cfg(test)]
pub(crate) use transaction::{test_transaction, TransactionKey};
