use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::{env_subst::substitute_env, schema::PalaverConfig};

/// Standard config file names, checked in order.
const CONFIG_FILENAMES: &[&str] = &[
    "palaver.toml",
    "palaver.yaml",
    "palaver.yml",
    "palaver.json",
];

/// Load config from the given path (any supported format).
pub fn load_config(path: &Path) -> anyhow::Result<PalaverConfig> {
    let value = load_config_value(path)?;
    Ok(serde_json::from_value(value)?)
}

/// Load the config file as a format-neutral JSON tree, after env substitution.
pub fn load_config_value(path: &Path) -> anyhow::Result<serde_json::Value> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("failed to read {}: {e}", path.display()))?;
    let raw = substitute_env(&raw);
    parse_config_value(&raw, path)
}

/// Load an explicit config file, or fall back to discovery when `path` is `None`.
///
/// Unlike [`discover_and_load`], a file the caller named explicitly must
/// load cleanly.
pub fn load_or_discover(path: Option<&Path>) -> anyhow::Result<PalaverConfig> {
    match path {
        Some(p) => load_config(p),
        None => Ok(discover_and_load()),
    }
}

/// Discover and load config from standard locations.
///
/// Search order:
/// 1. `./palaver.{toml,yaml,yml,json}` (project-local)
/// 2. `~/.config/palaver/palaver.{toml,yaml,yml,json}` (user-global)
///
/// Returns `PalaverConfig::default()` if no config file is found or it fails to load.
pub fn discover_and_load() -> PalaverConfig {
    if let Some(path) = find_config_file() {
        debug!(path = %path.display(), "loading config");
        match load_config(&path) {
            Ok(cfg) => return cfg,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "failed to load config, using defaults");
            },
        }
    } else {
        debug!("no config file found, using defaults");
    }
    PalaverConfig::default()
}

/// Find the first config file in standard locations.
pub fn find_config_file() -> Option<PathBuf> {
    for name in CONFIG_FILENAMES {
        let p = PathBuf::from(name);
        if p.exists() {
            return Some(p);
        }
    }

    let dir = config_dir()?;
    CONFIG_FILENAMES
        .iter()
        .map(|name| dir.join(name))
        .find(|p| p.exists())
}

/// Returns the user-global config directory (`~/.config/palaver/`).
pub fn config_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "palaver").map(|d| d.config_dir().to_path_buf())
}

fn parse_config_value(raw: &str, path: &Path) -> anyhow::Result<serde_json::Value> {
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("toml");

    match ext {
        "toml" => {
            let v: toml::Value = toml::from_str(raw)?;
            Ok(serde_json::to_value(v)?)
        },
        "yaml" | "yml" => {
            let v: serde_yaml::Value = serde_yaml::from_str(raw)?;
            Ok(serde_json::to_value(v)?)
        },
        "json" => Ok(serde_json::from_str(raw)?),
        _ => anyhow::bail!("unsupported config format: .{ext}"),
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {super::*, crate::schema::StoreBackend};

    #[test]
    fn loads_toml_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("palaver.toml");
        std::fs::write(
            &path,
            "[bot]\nuser_id = \"UBOT\"\n\n[routing]\nliteral_case_sensitive = true\n",
        )
        .unwrap();

        let cfg = load_config(&path).unwrap();
        assert_eq!(cfg.bot.user_id.as_deref(), Some("UBOT"));
        assert!(cfg.routing.literal_case_sensitive);
    }

    #[test]
    fn loads_yaml_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("palaver.yaml");
        std::fs::write(&path, "store:\n  backend: sqlite\n  sweep_interval_secs: 0\n").unwrap();

        let cfg = load_config(&path).unwrap();
        assert_eq!(cfg.store.backend, StoreBackend::Sqlite);
        assert!(cfg.store.sweep_interval().is_none());
    }

    #[test]
    fn loads_json_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("palaver.json");
        std::fs::write(&path, r#"{"ambient": {"reply_probability": 1.0}}"#).unwrap();

        let cfg = load_config(&path).unwrap();
        assert!((cfg.ambient.reply_probability - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn rejects_unknown_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("palaver.ini");
        std::fs::write(&path, "x=1").unwrap();
        assert!(load_config(&path).is_err());
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope.toml");
        assert!(load_or_discover(Some(&path)).is_err());
    }
}
