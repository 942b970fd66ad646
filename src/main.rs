mod config;
mod io;
mod logging;
mod processors;
mod screening;

use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

use anyhow::{anyhow, bail, Context, Result};
use serde::de::DeserializeOwned;
use tokio::io::AsyncReadExt;
use tracing::info;

use crate::config::{Config, CONFIG_PATH_ENV};
use crate::processors::{BatchOutcome, BatchProcessor};
use crate::screening::{InMemoryTransactionStore, ScreeningService, ThresholdClassifier, TracingNotifier};

type LocalProcessor = BatchProcessor<InMemoryTransactionStore, ThresholdClassifier, TracingNotifier>;

/// Runs every `<pipeline>:<event.json>` step given in the command line, in order,
/// against a single in-memory store, and prints the batch response of each one as a JSON line.
/// A `-` path reads the event from the stdin.
#[tokio::main]
async fn main() -> Result<()> {
  let steps = std::env::args()
    .skip(1)
    .map(|arg| arg.parse::<Step>())
    .collect::<Result<Vec<_>>>()?;

  if steps.is_empty() {
    bail!("Usage: fraud-screening <ingest|screen|retry|resolve>:<event.json|->...");
  }

  let config_path = std::env::var_os(CONFIG_PATH_ENV).map(PathBuf::from);
  let config = Config::load(config_path.as_deref()).await?;
  logging::init_logging(&config);

  let service = Arc::new(ScreeningService::new(
    InMemoryTransactionStore::new(),
    ThresholdClassifier::new(
      config.classifier.amount_limit,
      config.classifier.max_login_attempts,
    ),
    TracingNotifier::new(config.notifier.origination_number.clone()),
    config.allowed_fields()?,
  ));
  let processor = BatchProcessor::new(service.clone(), config.batch_timeout());

  for step in steps {
    let event = read_event(&step.source).await?;
    let outcome = run_step(&processor, step.pipeline, &event).await?;
    println!("{}", serde_json::to_string(&outcome.response)?);
  }

  info!(transactions = service.store().len(), "All steps processed");
  Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Pipeline {
  Ingest,
  Screen,
  Retry,
  Resolve,
}

impl FromStr for Pipeline {
  type Err = anyhow::Error;

  fn from_str(name: &str) -> Result<Self> {
    match name {
      "ingest" => Ok(Pipeline::Ingest),
      "screen" => Ok(Pipeline::Screen),
      "retry" => Ok(Pipeline::Retry),
      "resolve" => Ok(Pipeline::Resolve),
      _ => Err(anyhow!("Unknown pipeline: {}", name)),
    }
  }
}

#[derive(Debug, Clone, PartialEq)]
struct Step {
  pipeline: Pipeline,
  source: String,
}

impl FromStr for Step {
  type Err = anyhow::Error;

  fn from_str(arg: &str) -> Result<Self> {
    let (pipeline, source) = arg
      .split_once(':')
      .ok_or_else(|| anyhow!("Expected <pipeline>:<path>, got {}", arg))?;
    Ok(Step {
      pipeline: pipeline.parse()?,
      source: source.to_string(),
    })
  }
}

/// Reads one batch event from a path, or from stdin when the path is `-`.
async fn read_event(source: &str) -> Result<String> {
  match source {
    "-" => {
      let mut event = String::new();
      tokio::io::stdin().read_to_string(&mut event).await?;
      Ok(event)
    }
    path => tokio::fs::read_to_string(path)
      .await
      .with_context(|| format!("Failed to read event file: {}", path)),
  }
}

/// A batch whose envelope cannot be decoded has no delivery identifiers to report and fails the whole step.
async fn run_step(processor: &LocalProcessor, pipeline: Pipeline, event: &str) -> Result<BatchOutcome> {
  info!(?pipeline, "Running batch");
  let outcome = match pipeline {
    Pipeline::Ingest => processor.ingest(parse_event(event)?).await,
    Pipeline::Screen => processor.screen(parse_event(event)?).await,
    Pipeline::Retry => processor.retry_dead_letters(parse_event(event)?).await,
    Pipeline::Resolve => processor.resolve_replies(parse_event(event)?).await,
  };
  Ok(outcome)
}

fn parse_event<E: DeserializeOwned>(event: &str) -> Result<E> {
  serde_json::from_str(event).context("Malformed batch event")
}

#[cfg(test)]
mod tests {

  use super::*;

  #[test]
  fn parse_steps() {
    assert_eq!(
      "screen:events/stream.json".parse::<Step>().unwrap(),
      Step {
        pipeline: Pipeline::Screen,
        source: "events/stream.json".to_string(),
      }
    );
    assert_eq!(
      "resolve:-".parse::<Step>().unwrap(),
      Step {
        pipeline: Pipeline::Resolve,
        source: "-".to_string(),
      }
    );
    assert!("screen".parse::<Step>().is_err());
    assert!("refund:event.json".parse::<Step>().is_err());
  }

  #[tokio::test]
  async fn read_event_from_missing_file() {
    let error = read_event("/nonexistent/stream.json").await.unwrap_err();

    assert_eq!(
      error.to_string(),
      "Failed to read event file: /nonexistent/stream.json"
    );
  }
}
