use serde::de::Deserialize;

use clap::ArgMatches;
use config::{Config, ConfigError, Value, File, Environment};

use crate::error::*;

#[derive(Debug, Clone, Default)]
pub struct AppConfig {
  pub conf: Config
}

impl AppConfig {
  pub fn new_clap(cli: &ArgMatches) -> Result<Self> {
    let mut conf = Config::default();
    // Load defaults
    conf.merge(File::with_name("conf/default"))?;

    if let Some(ref config_file) = cli.value_of("config") {
      conf.merge(File::with_name(config_file))?;
    } else {
      // Get RUN_MODE from environment
      let env = std::env::var("RUN_MODE").unwrap_or("development".into());
      conf.merge(File::with_name(&format!("conf/{}", env)).required(false))?;

      // Allow overrides from environment
      conf.merge(Environment::with_prefix("app").separator("_"))?;
    }

    Ok(AppConfig {
      conf,
    })
  }

  /// Override a single key.
  pub fn set<T: Into<Value>>(&mut self, key: &str, value: T) -> Result<()> {
    self.conf.set(key, value)?;
    Ok(())
  }

  pub fn get<'de, T: Deserialize<'de>>(&self, key: &str) -> Result<Option<T>> {
    Ok(self.conf.get(key).or_else(|e| {
      match e {
        ConfigError::NotFound(_) => Ok(None),
        err => Err(err),
      }
    })?)
  }

  pub fn get_str(&self, key: &str) -> Result<Option<String>> {
    let val = if let Some(val) = self.get(key)? {
      Some(Value::into_str(val)?)
    } else {
      None
    };
    Ok(val)
  }

  pub fn get_int(&self, key: &str) -> Result<Option<i64>> {
    let val = if let Some(val) = self.get(key)? {
      Some(Value::into_int(val)?)
    } else {
      None
    };
    Ok(val)
  }

  pub fn get_bool(&self, key: &str) -> Result<Option<bool>> {
    let val = if let Some(val) = self.get(key)? {
      Some(Value::into_bool(val)?)
    } else {
      None
    };
    Ok(val)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn missing_keys_are_none() {
    let config = AppConfig::default();
    assert_eq!(config.get_int("catalog.page_size").ok(), Some(None));
    assert_eq!(config.get_str("catalog.source").ok(), Some(None));
  }

  #[test]
  fn typed_getters() {
    let mut config = AppConfig::default();
    config.set("catalog.page_size", 4i64).expect("set");
    config.set("output.pretty", true).expect("set");
    config.set("catalog.source", "mock").expect("set");
    assert_eq!(config.get_int("catalog.page_size").ok(), Some(Some(4)));
    assert_eq!(config.get_bool("output.pretty").ok(), Some(Some(true)));
    assert_eq!(config.get_str("catalog.source").ok(), Some(Some("mock".to_string())));
  }
}
