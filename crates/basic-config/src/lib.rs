//! Interpreter-host configuration (SPEC_FULL.md §2.4) — `basic.toml`,
//! loaded the way the teacher's `core-config` loads `oxidized.toml`:
//! `serde`-derived structs with `#[serde(default)]`, tolerant of unknown
//! keys, with `dirs` used for platform discovery when no explicit path is
//! given.
//!
//! None of this is a BASIC-language feature — it only shapes how the host
//! starts the interpreter (default screen mode, cooperative chunk size,
//! deterministic `RANDOMIZE`, log level). A running program's own `SCREEN`/
//! `RANDOMIZE` statements always take precedence at runtime.

use anyhow::Result;
use serde::Deserialize;
use std::path::PathBuf;
use tracing::info;

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct RuntimeConfig {
    /// Screen mode the host sets before loading a program with no explicit
    /// `SCREEN` statement of its own.
    #[serde(default = "RuntimeConfig::default_screen_mode")]
    pub default_screen_mode: u32,
    /// Statements per `ExecuteChunk`/`RunAsync` yield (spec.md §5).
    #[serde(default = "RuntimeConfig::default_chunk_size")]
    pub chunk_size: u32,
    /// When set, a bare `RANDOMIZE` (no seed) reseeds from a fixed value
    /// instead of the clock — useful for the test harness and for
    /// reproducible screenshots; spec.md §3's `Randomize timer` explicitly
    /// always reseeds from the clock regardless of this flag.
    #[serde(default)]
    pub deterministic_randomize: bool,
}

impl RuntimeConfig {
    const fn default_screen_mode() -> u32 {
        0
    }

    const fn default_chunk_size() -> u32 {
        2000
    }
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            default_screen_mode: Self::default_screen_mode(),
            chunk_size: Self::default_chunk_size(),
            deterministic_randomize: false,
        }
    }
}

#[derive(Debug, Deserialize, Clone, Default, PartialEq)]
pub struct LoggingConfig {
    /// `tracing-subscriber` `EnvFilter` directive, e.g. `"info"` or
    /// `"basic_eval=debug"`. Empty means "use `RUST_LOG`/its default".
    #[serde(default)]
    pub level: String,
}

#[derive(Debug, Deserialize, Clone, Default, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub runtime: RuntimeConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Best-effort config path: a local `basic.toml` first, then the platform
/// config directory, matching `core-config::discover`.
pub fn discover() -> PathBuf {
    let local = PathBuf::from("basic.toml");
    if local.exists() {
        return local;
    }
    if let Some(dir) = dirs::config_dir() {
        return dir.join("basic").join("basic.toml");
    }
    PathBuf::from("basic.toml")
}

/// Loads `path` (or the discovered default), falling back to
/// `Config::default()` when the file is absent or fails to parse — a
/// missing/broken host config must never prevent a program from running.
pub fn load_from(path: Option<PathBuf>) -> Result<Config> {
    let path = path.unwrap_or_else(discover);
    match std::fs::read_to_string(&path) {
        Ok(content) => match toml::from_str::<Config>(&content) {
            Ok(cfg) => {
                info!(path = %path.display(), "basic_config_loaded");
                Ok(cfg)
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "basic_config_parse_failed");
                Ok(Config::default())
            }
        },
        Err(_) => Ok(Config::default()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn default_config_when_missing_file() {
        let cfg = load_from(Some(PathBuf::from("__basic_config_missing__.toml"))).unwrap();
        assert_eq!(cfg, Config::default());
        assert_eq!(cfg.runtime.chunk_size, 2000);
        assert_eq!(cfg.runtime.default_screen_mode, 0);
        assert!(!cfg.runtime.deterministic_randomize);
    }

    #[test]
    fn parses_runtime_fields() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(
            tmp.path(),
            "[runtime]\ndefault_screen_mode = 13\nchunk_size = 500\ndeterministic_randomize = true\n",
        )
        .unwrap();
        let cfg = load_from(Some(tmp.path().to_path_buf())).unwrap();
        assert_eq!(cfg.runtime.default_screen_mode, 13);
        assert_eq!(cfg.runtime.chunk_size, 500);
        assert!(cfg.runtime.deterministic_randomize);
    }

    #[test]
    fn unknown_keys_are_tolerated() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(tmp.path(), "[future]\nsomething = 1\n").unwrap();
        let cfg = load_from(Some(tmp.path().to_path_buf())).unwrap();
        assert_eq!(cfg, Config::default());
    }

    #[test]
    fn malformed_toml_falls_back_to_defaults() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(tmp.path(), "not valid [[[ toml").unwrap();
        let cfg = load_from(Some(tmp.path().to_path_buf())).unwrap();
        assert_eq!(cfg, Config::default());
    }

    #[test]
    fn parses_logging_level() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(tmp.path(), "[logging]\nlevel = \"debug\"\n").unwrap();
        let cfg = load_from(Some(tmp.path().to_path_buf())).unwrap();
        assert_eq!(cfg.logging.level, "debug");
    }
}
