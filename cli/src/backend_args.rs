//! Connection flags shared by every subcommand.

use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use homeinspect_core::InspectConfig;

#[derive(Debug, Default, Clone, Args)]
pub struct BackendArgs {
    /// Config file (default: ~/.config/homeinspect/config.toml).
    #[arg(long = "config", short = 'c', global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// API root, e.g. http://host/api.
    #[arg(long = "base-url", global = true, value_name = "URL")]
    pub base_url: Option<String>,

    #[arg(long = "username", short = 'u', global = true)]
    pub username: Option<String>,

    #[arg(long = "password", global = true)]
    pub password: Option<String>,

    /// Give up waiting for the hierarchy after this many seconds.
    #[arg(long = "bootstrap-timeout", global = true, value_name = "SECS")]
    pub bootstrap_timeout_secs: Option<u64>,
}

impl BackendArgs {
    /// Resolve the effective config: file, then environment, then flags.
    pub fn load_config(&self) -> anyhow::Result<InspectConfig> {
        let mut cfg = match &self.config {
            Some(path) => {
                let mut cfg = InspectConfig::load_from_path(path)
                    .with_context(|| format!("loading {}", path.display()))?;
                cfg.apply_env(|key| std::env::var(key).ok());
                cfg
            }
            None => InspectConfig::load()?,
        };
        self.apply(&mut cfg);
        cfg.validate()?;
        Ok(cfg)
    }

    fn apply(&self, cfg: &mut InspectConfig) {
        if let Some(url) = &self.base_url {
            cfg.base_url = url.clone();
        }
        if let Some(user) = &self.username {
            cfg.username = user.clone();
        }
        if let Some(pass) = &self.password {
            cfg.password = pass.clone();
        }
        if let Some(secs) = self.bootstrap_timeout_secs {
            cfg.bootstrap_timeout_secs = secs;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn flags_override_config_values() {
        let args = BackendArgs {
            base_url: Some("http://flag/api".to_string()),
            username: Some("flag-user".to_string()),
            bootstrap_timeout_secs: Some(3),
            ..BackendArgs::default()
        };
        let mut cfg = InspectConfig {
            username: "file-user".to_string(),
            password: "file-pass".to_string(),
            ..InspectConfig::default()
        };
        args.apply(&mut cfg);

        assert_eq!(cfg.base_url, "http://flag/api");
        assert_eq!(cfg.username, "flag-user");
        assert_eq!(cfg.password, "file-pass");
        assert_eq!(cfg.bootstrap_timeout_secs, 3);
    }

    #[test]
    fn zero_timeout_flag_fails_validation() {
        let dir = tempfile::TempDir::new().unwrap_or_else(|e| panic!("tempdir: {e}"));
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "").unwrap_or_else(|e| panic!("write: {e}"));

        let args = BackendArgs {
            config: Some(path),
            bootstrap_timeout_secs: Some(0),
            ..BackendArgs::default()
        };
        assert!(args.load_config().is_err());
    }
}
