use std::path::{Path, PathBuf};

use crate::error::ConfigError;

use super::types::AppConfig;

pub const CONFIG_FILE_NAME: &str = "tlcrun.toml";

/// Loads `tlcrun.toml` from the working directory, then the user config dir,
/// falling back to defaults. Environment overrides are applied last.
pub fn load_default() -> Result<AppConfig, ConfigError> {
    let candidates = [
        Some(PathBuf::from(CONFIG_FILE_NAME)),
        dirs::config_dir().map(|d| d.join("tlcrun").join("config.toml")),
    ];

    let found = candidates.into_iter().flatten().find(|p| p.exists());
    let mut cfg = match found {
        Some(path) => read_config(&path)?,
        None => AppConfig::default(),
    };

    apply_env_overrides(&mut cfg, |key| std::env::var(key).ok());
    Ok(cfg)
}

pub fn load_from(path: &Path) -> Result<AppConfig, ConfigError> {
    let mut cfg = read_config(path)?;
    apply_env_overrides(&mut cfg, |key| std::env::var(key).ok());
    Ok(cfg)
}

fn read_config(path: &Path) -> Result<AppConfig, ConfigError> {
    let s = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.display().to_string(),
        source,
    })?;
    let cfg = toml::from_str::<AppConfig>(&s).map_err(|source| ConfigError::Parse {
        path: path.display().to_string(),
        source,
    })?;
    tracing::debug!(target: "tlcrun.config", path = %path.display(), "config loaded");
    Ok(cfg)
}

pub(crate) fn apply_env_overrides<F>(cfg: &mut AppConfig, var: F)
where
    F: Fn(&str) -> Option<String>,
{
    let non_empty = |key: &str| var(key).filter(|v| !v.trim().is_empty());

    if let Some(v) = non_empty("TLCRUN_JAVA_HOME").or_else(|| {
        if cfg.java.home.is_none() {
            non_empty("JAVA_HOME")
        } else {
            None
        }
    }) {
        cfg.java.home = Some(PathBuf::from(v));
    }

    if let Some(v) = non_empty("TLCRUN_TLA2TOOLS_JAR") {
        cfg.tools.tla2tools_jar = PathBuf::from(v);
    }

    if let Some(v) = non_empty("TLCRUN_DIAGNOSTICS_PATH") {
        cfg.diagnostics.path = v;
    }
}
