//! Layered runtime settings: an optional TOML file, then `LAUNCHDECK_*`
//! environment variables. Nested keys use `__`, e.g.
//! `LAUNCHDECK_SPACEX__CACHE_TIME=60`.

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use config::{Config, ConfigBuilder, Environment, File, builder::DefaultState};
use launchdeck_sync::UpstreamConfig;
use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
  pub server: ServerSettings,
  pub spacex: UpstreamConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
  pub host:       String,
  pub port:       u16,
  pub store_path: PathBuf,
}

impl Default for ServerSettings {
  fn default() -> Self {
    Self {
      host:       "127.0.0.1".to_owned(),
      port:       8080,
      store_path: PathBuf::from("launchdeck.db"),
    }
  }
}

impl ServerSettings {
  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }
}

impl Settings {
  /// Read `path` if it exists, then overlay the environment.
  pub fn load(path: &Path) -> anyhow::Result<Self> {
    Self::from_builder(
      Config::builder()
        .add_source(File::from(path).required(false))
        .add_source(environment()),
    )
  }

  fn from_builder(builder: ConfigBuilder<DefaultState>) -> anyhow::Result<Self> {
    builder
      .build()
      .context("failed to read configuration")?
      .try_deserialize()
      .context("failed to deserialise settings")
  }
}

fn environment() -> Environment {
  Environment::with_prefix("LAUNCHDECK")
    .prefix_separator("_")
    .separator("__")
    .try_parsing(true)
}

/// Expand a leading `~` to the user's home directory.
pub fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}

#[cfg(test)]
mod tests {
  use config::FileFormat;

  use super::*;

  fn from_toml(toml: &str) -> Settings {
    Settings::from_builder(Config::builder().add_source(File::from_str(toml, FileFormat::Toml)))
      .unwrap()
  }

  #[test]
  fn empty_file_yields_defaults() {
    let s = from_toml("");
    assert_eq!(s.server.address(), "127.0.0.1:8080");
    assert_eq!(s.server.store_path, PathBuf::from("launchdeck.db"));
    assert_eq!(s.spacex, UpstreamConfig::default());
  }

  #[test]
  fn file_overrides_nested_keys() {
    let s = from_toml(
      r#"
      [server]
      port = 9000

      [spacex]
      api_base_url = "http://localhost:4000"
      cache_time = 60

      [spacex.sync]
      delay_between_requests = 0
      "#,
    );
    assert_eq!(s.server.port, 9000);
    assert_eq!(s.server.host, "127.0.0.1");
    assert_eq!(s.spacex.api_base_url, "http://localhost:4000");
    assert_eq!(s.spacex.cache_time, 60);
    assert_eq!(s.spacex.timeout, 30);
    assert_eq!(s.spacex.sync.delay_between_requests, 0);
    assert_eq!(s.spacex.sync.batch_size, 100);
  }

  #[test]
  fn environment_overrides_file() {
    let env = environment().source(Some(
      [("LAUNCHDECK_SPACEX__CACHE_TIME".to_owned(), "5".to_owned())].into_iter().collect(),
    ));
    let s = Settings::from_builder(
      Config::builder()
        .add_source(File::from_str("[spacex]\ncache_time = 60", FileFormat::Toml))
        .add_source(env),
    )
    .unwrap();
    assert_eq!(s.spacex.cache_time, 5);
  }

  #[test]
  fn tilde_expands_to_home() {
    let Ok(home) = std::env::var("HOME") else { return };
    assert_eq!(expand_tilde(Path::new("~/x.db")), PathBuf::from(home).join("x.db"));
    assert_eq!(expand_tilde(Path::new("/tmp/x.db")), PathBuf::from("/tmp/x.db"));
  }
}
