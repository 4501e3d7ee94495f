//! Engine settings: TOML file, then `LOOM_*` environment, then flags.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use config::{Config, Environment, File, FileFormat};
use loom_core::EngineConfig;

const DEFAULT_PATHS: [&str; 2] = ["loom.toml", "config/loom.toml"];

/// Command-line values that beat file and environment.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub default_max_retry: Option<u32>,
    pub tick_interval_ms: Option<u64>,
    pub executor_timeout_ms: Option<u64>,
}

pub fn load(path: Option<&Path>, overrides: &Overrides) -> Result<EngineConfig> {
    let mut builder = Config::builder();

    match path {
        Some(path) => {
            if !path.exists() {
                bail!("config file not found: {}", path.display());
            }
            builder = builder.add_source(File::from(path).format(FileFormat::Toml));
        }
        None => {
            if let Some(found) = DEFAULT_PATHS.iter().map(PathBuf::from).find(|p| p.exists()) {
                builder = builder.add_source(File::from(found.as_path()).format(FileFormat::Toml));
            }
        }
    }

    builder = builder.add_source(Environment::with_prefix("LOOM").try_parsing(true));

    let mut config: EngineConfig = builder
        .build()
        .context("failed to build config")?
        .try_deserialize()
        .context("failed to deserialize config")?;

    apply(&mut config, overrides);
    Ok(config)
}

fn apply(config: &mut EngineConfig, overrides: &Overrides) {
    if let Some(v) = overrides.default_max_retry {
        config.default_max_retry = v;
    }
    if let Some(v) = overrides.tick_interval_ms {
        config.tick_interval_ms = v;
    }
    if let Some(v) = overrides.executor_timeout_ms {
        config.executor_timeout_ms = Some(v);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_temp(name: &str, body: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("loom-{}-{name}.toml", std::process::id()));
        std::fs::write(&path, body).unwrap();
        path
    }

    #[test]
    fn file_values_are_read_and_missing_keys_default() {
        let path = write_temp("partial", "tick_interval_ms = 500\n");
        let config = load(Some(&path), &Overrides::default()).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(config.tick_interval_ms, 500);
        assert_eq!(config.default_max_retry, 5);
        assert_eq!(config.executor_timeout_ms, None);
    }

    #[test]
    fn overrides_beat_the_file() {
        let path = write_temp(
            "override",
            "default_max_retry = 2\ntick_interval_ms = 500\n",
        );
        let overrides = Overrides {
            default_max_retry: Some(7),
            executor_timeout_ms: Some(1000),
            ..Overrides::default()
        };
        let config = load(Some(&path), &overrides).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(config.default_max_retry, 7);
        assert_eq!(config.tick_interval_ms, 500);
        assert_eq!(config.executor_timeout_ms, Some(1000));
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let err = load(Some(Path::new("/nonexistent/loom.toml")), &Overrides::default())
            .unwrap_err();
        assert!(err.to_string().contains("config file not found"));
    }
}
