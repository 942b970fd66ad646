use std::sync::Arc;
use std::time::Duration;

use tracing::{error, info, info_span, Instrument};

use super::fan_out::FanOut;
use super::outcome::{BatchOutcome, ItemError};
use crate::io::{
  decode_reply_message, decode_stream_record, decode_transaction_message, DeliveryRecord,
  QueueEvent, StreamEvent,
};
use crate::screening::{
  FraudClassifier, IncomingReply, Notifier, ScreeningService, Transaction, TransactionStore,
};

/// This is the batch processor shared by all the pipelines. For every batch it
/// - decodes each record keeping its delivery identifier
/// - runs the state machine operation of the pipeline for every decoded record, all of them concurrently
/// - reports back the delivery identifiers of the records that failed, so only those are redelivered
///
/// None of the per-item errors abort the batch, they are joined in the [`BatchOutcome`] error.
pub struct BatchProcessor<S, C, N> {
  service: Arc<ScreeningService<S, C, N>>,
  timeout: Option<Duration>,
}

impl<S, C, N> BatchProcessor<S, C, N>
where
  S: TransactionStore + 'static,
  C: FraudClassifier + 'static,
  N: Notifier + 'static,
{
  /// `timeout` bounds every batch; `None` lets items run until they complete.
  pub fn new(service: Arc<ScreeningService<S, C, N>>, timeout: Option<Duration>) -> Self {
    Self { service, timeout }
  }

  /// Creates the transactions carried by the message bodies as `PENDING`.
  pub async fn ingest(&self, event: QueueEvent) -> BatchOutcome {
    let records = event
      .records
      .into_iter()
      .map(decode_transaction_message)
      .collect();

    let service = self.service.clone();
    self
      .run("ingest", records, move |transaction: Transaction| {
        let service = service.clone();
        async move {
          let context = transaction.clone();
          service
            .ingest(transaction)
            .await
            .map(|_| ())
            .map_err(|error| ItemError::transaction(&context, error))
        }
      })
      .await
  }

  /// Screens the transactions inserted in the change stream. Records of any other kind are ignored.
  pub async fn screen(&self, event: StreamEvent) -> BatchOutcome {
    let records = event
      .records
      .into_iter()
      .filter_map(decode_stream_record)
      .collect();

    let service = self.service.clone();
    self
      .run("screen", records, move |transaction: Transaction| {
        let service = service.clone();
        async move {
          service
            .screen(&transaction)
            .await
            .map(|_| ())
            .map_err(|error| ItemError::transaction(&transaction, error))
        }
      })
      .await
  }

  /// Screens again the transactions whose screening ended up in the dead-letter queue.
  /// The message bodies only identify the transactions, their stored state is what gets screened.
  pub async fn retry_dead_letters(&self, event: QueueEvent) -> BatchOutcome {
    let records = event
      .records
      .into_iter()
      .map(decode_transaction_message)
      .collect();

    let service = self.service.clone();
    self
      .run("retry", records, move |transaction: Transaction| {
        let service = service.clone();
        async move {
          service
            .rescreen(&transaction.key())
            .await
            .map(|_| ())
            .map_err(|error| ItemError::transaction(&transaction, error))
        }
      })
      .await
  }

  /// Resolves the customer replies to fraud alerts.
  pub async fn resolve_replies(&self, event: QueueEvent) -> BatchOutcome {
    let records = event
      .records
      .into_iter()
      .map(decode_reply_message)
      .collect();

    let service = self.service.clone();
    self
      .run("resolve", records, move |reply: IncomingReply| {
        let service = service.clone();
        async move {
          service
            .resolve(&reply)
            .await
            .map(|_| ())
            .map_err(|error| ItemError::reply(&reply, error))
        }
      })
      .await
  }

  async fn run<T, F, Fut>(
    &self,
    pipeline: &'static str,
    records: Vec<DeliveryRecord<T>>,
    work: F,
  ) -> BatchOutcome
  where
    F: Fn(T) -> Fut,
    Fut: std::future::Future<Output = Result<(), ItemError>> + Send + 'static,
  {
    let span = info_span!("batch", pipeline, size = records.len());
    async move {
      let outcome = FanOut::new(self.timeout).run(records, work).await;
      match &outcome.error {
        None => info!("Batch processed"),
        Some(batch_error) => error!(
          failed = outcome.response.batch_item_failures.len(),
          "Batch processed with failures: {batch_error}"
        ),
      }
      outcome
    }
    .instrument(span)
    .await
  }
}
