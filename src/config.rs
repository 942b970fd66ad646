use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::screening::{AllowedFields, UpdatableField};

/// Environment variable holding the path of the YAML configuration file.
pub const CONFIG_PATH_ENV: &str = "FRAUD_SCREENING_CONFIG";

/// Settings of the whole binary. Every field has a default, so the file can be partial or missing.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
  pub log_level: String,
  pub log_json: bool,
  /// Deadline of every batch in milliseconds, `0` disables it.
  pub batch_timeout_ms: u64,
  /// Attribute names of the fields that can be changed once a transaction is created.
  pub updatable_fields: Vec<String>,
  pub classifier: ClassifierConfig,
  pub notifier: NotifierConfig,
}

impl Default for Config {
  fn default() -> Self {
    Self {
      log_level: "info".to_string(),
      log_json: false,
      batch_timeout_ms: 25_000,
      updatable_fields: UpdatableField::ALL
        .iter()
        .map(|field| field.attribute_name().to_string())
        .collect(),
      classifier: ClassifierConfig::default(),
      notifier: NotifierConfig::default(),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
  pub amount_limit: Decimal,
  pub max_login_attempts: u32,
}

impl Default for ClassifierConfig {
  fn default() -> Self {
    Self {
      amount_limit: Decimal::from(10_000),
      max_login_attempts: 3,
    }
  }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct NotifierConfig {
  pub origination_number: String,
}

impl Default for NotifierConfig {
  fn default() -> Self {
    Self {
      origination_number: "+15555550000".to_string(),
    }
  }
}

impl Config {
  /// Loads the configuration from a YAML file, or the defaults when there is no file.
  pub async fn load(path: Option<&Path>) -> Result<Self> {
    match path {
      Some(path) => {
        let content = tokio::fs::read_to_string(path)
          .await
          .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::from_yaml(&content)
          .with_context(|| format!("Failed to parse config file: {}", path.display()))
      }
      None => Ok(Self::default()),
    }
  }

  pub fn from_yaml(content: &str) -> Result<Self> {
    let config: Self = serde_yaml::from_str(content)?;
    config.allowed_fields()?;
    Ok(config)
  }

  pub fn allowed_fields(&self) -> Result<AllowedFields> {
    AllowedFields::from_names(&self.updatable_fields).map_err(anyhow::Error::from)
  }

  pub fn batch_timeout(&self) -> Option<Duration> {
    match self.batch_timeout_ms {
      0 => None,
      millis => Some(Duration::from_millis(millis)),
    }
  }
}

#[cfg(test)]
mod tests {

  use indoc::indoc;
  use rust_decimal_macros::dec;

  use super::*;

  #[test]
  fn defaults_allow_every_updatable_field() {
    let config = Config::default();

    assert_eq!(config.allowed_fields().unwrap(), AllowedFields::default());
    assert_eq!(config.batch_timeout(), Some(Duration::from_millis(25_000)));
  }

  #[test]
  fn from_yaml_partial_file() {
    let config = Config::from_yaml(indoc! { r#"
      log_json: true
      batch_timeout_ms: 0
      updatable_fields: [TransactionStatus, PhoneNumber]
      classifier:
        amount_limit: 2500.50
    "# })
    .unwrap();

    assert!(config.log_json);
    assert_eq!(config.log_level, "info");
    assert_eq!(config.batch_timeout(), None);
    assert_eq!(config.classifier.amount_limit, dec!(2500.50));
    assert_eq!(config.classifier.max_login_attempts, 3);
    assert_eq!(config.notifier, NotifierConfig::default());

    let allowed = config.allowed_fields().unwrap();
    assert!(allowed.contains(UpdatableField::Status));
    assert!(allowed.contains(UpdatableField::Phone));
    assert!(!allowed.contains(UpdatableField::Amount));
  }

  #[test]
  fn from_yaml_rejects_unknown_fields() {
    let result = Config::from_yaml("updatable_fields: [TransactionStatus, TransactionID]");

    assert!(result.is_err());
  }

  #[tokio::test]
  async fn load_without_path() {
    assert_eq!(Config::load(None).await.unwrap(), Config::default());
  }

  #[tokio::test]
  async fn load_missing_file() {
    let result = Config::load(Some(Path::new("/nonexistent/fraud-screening.yaml"))).await;

    assert!(result.is_err());
  }
}
