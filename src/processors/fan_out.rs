use std::future::Future;
use std::time::Duration;

use futures::future::join_all;
use tokio::task::JoinError;
use tokio::time::{timeout_at, Instant};
use tracing::{info_span, warn, Instrument};

use super::outcome::{BatchOutcome, BatchResultBuilder, ItemError};
use crate::io::DeliveryRecord;

/// Runs one unit of work per record of a batch, all of them concurrently, and waits for every one
/// of them before building the [`BatchOutcome`].
///
/// There is no bound on concurrency within a batch: the messaging layer caps batches to a handful
/// of records. A failure, a panic or a missed deadline only ever fails the record it happened in.
#[derive(Debug, Clone, Copy)]
pub struct FanOut {
  deadline: Option<Instant>,
}

impl FanOut {
  /// The deadline starts counting now, so one instance should cover a single batch.
  pub fn new(timeout: Option<Duration>) -> Self {
    Self {
      deadline: timeout.map(|timeout| Instant::now() + timeout),
    }
  }

  pub async fn run<T, F, Fut>(&self, records: Vec<DeliveryRecord<T>>, work: F) -> BatchOutcome
  where
    F: Fn(T) -> Fut,
    Fut: Future<Output = Result<(), ItemError>> + Send + 'static,
  {
    let mut builder = BatchResultBuilder::new();
    let mut identifiers = Vec::with_capacity(records.len());
    let mut workers = Vec::with_capacity(records.len());

    for record in records {
      builder.register(&record.identifier);
      match record.payload {
        Ok(item) => {
          let span = info_span!("item", id = %record.identifier);
          let unit = bounded(work(item), self.deadline).instrument(span);
          workers.push(tokio::spawn(unit));
          identifiers.push(record.identifier);
        }
        Err(error) => {
          warn!(id = %record.identifier, "Skipping undecodable record: {error}");
          builder.record_failure(record.identifier, ItemError::Decode(error));
        }
      }
    }

    let results = join_all(workers).await;

    for (identifier, result) in identifiers.into_iter().zip(results) {
      match result {
        Ok(Ok(())) => {}
        Ok(Err(error)) => builder.record_failure(identifier, error),
        Err(error) => builder.record_failure(identifier, ItemError::Panicked(panic_message(error))),
      }
    }

    builder.build()
  }
}

/// Dropping the unit once the deadline passes cancels whatever port call it is waiting on.
async fn bounded<Fut>(unit: Fut, deadline: Option<Instant>) -> Result<(), ItemError>
where
  Fut: Future<Output = Result<(), ItemError>>,
{
  match deadline {
    Some(deadline) => timeout_at(deadline, unit)
      .await
      .unwrap_or(Err(ItemError::DeadlineExceeded)),
    None => unit.await,
  }
}

fn panic_message(error: JoinError) -> String {
  match error.try_into_panic() {
    Ok(payload) => payload
      .downcast_ref::<&str>()
      .map(|message| message.to_string())
      .or_else(|| payload.downcast_ref::<String>().cloned())
      .unwrap_or_else(|| "unknown panic".to_string()),
    Err(error) => error.to_string(),
  }
}
