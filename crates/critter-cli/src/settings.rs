//! Layered configuration: optional TOML file, then `CRITTER_*` environment
//! variables. Command-line flags are applied on top in `main`.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use config::{Config, Environment, File, FileFormat};
use serde::Deserialize;

pub const DEFAULT_URL: &str = "http://localhost:8000/api";

#[derive(Debug, Default, Deserialize)]
pub struct Settings {
  /// Base URL of the critter API.
  #[serde(default)]
  pub url:        String,
  /// Bearer token for the session.
  #[serde(default)]
  pub token:      String,
  /// Where to write logs. The terminal UI logs nowhere without one.
  #[serde(default)]
  pub log_file:   Option<PathBuf>,
  /// `EnvFilter` directives used when `RUST_LOG` is unset.
  #[serde(default)]
  pub log_filter: Option<String>,
}

impl Settings {
  pub fn load(path: Option<&Path>) -> Result<Self> {
    let mut builder = Config::builder();
    if let Some(path) = path {
      builder =
        builder.add_source(File::from(path).format(FileFormat::Toml).required(true));
    }
    builder
      .add_source(Environment::with_prefix("CRITTER"))
      .build()
      .context("reading configuration")?
      .try_deserialize()
      .context("parsing configuration")
  }
}

#[cfg(test)]
mod tests {
  use std::io::Write;

  use super::*;

  #[test]
  fn reads_toml_file() {
    let path = std::env::temp_dir()
      .join(format!("critter-settings-{}.toml", std::process::id()));
    let mut file = std::fs::File::create(&path).unwrap();
    writeln!(file, "url = \"http://pets.local/api\"").unwrap();
    writeln!(file, "token = \"abc\"").unwrap();
    drop(file);

    let settings = Settings::load(Some(&path)).unwrap();
    std::fs::remove_file(&path).ok();

    assert_eq!(settings.url, "http://pets.local/api");
    assert_eq!(settings.token, "abc");
    assert_eq!(settings.log_file, None);
  }

  #[test]
  fn missing_file_is_an_error() {
    let path = Path::new("/nonexistent/critter.toml");
    assert!(Settings::load(Some(path)).is_err());
  }
}
