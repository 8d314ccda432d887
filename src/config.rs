use std::{collections::HashMap, path::PathBuf};

use config::{Config, ConfigError, Environment};
use serde::Deserialize;

/// Environment-driven defaults for the orchestrator.
pub struct GitstepsConfig {
    pub default_branch: Option<String>,
    pub git_command: Option<PathBuf>,
}

impl GitstepsConfig {
    pub fn load() -> anyhow::Result<Self> {
        let raw_config = RawConfig::load(None)?;

        Ok(Self {
            default_branch: raw_config.checkout.branch,
            git_command: raw_config.git.command,
        })
    }
}

#[derive(Default, Debug, Deserialize, PartialEq, Eq)]
struct RawConfig {
    #[serde(default)]
    checkout: CheckoutConfig,
    #[serde(default)]
    git: GitConfig,
}

#[derive(Default, Debug, Deserialize, PartialEq, Eq)]
struct CheckoutConfig {
    branch: Option<String>,
}

#[derive(Default, Debug, Deserialize, PartialEq, Eq)]
struct GitConfig {
    command: Option<PathBuf>,
}

impl RawConfig {
    fn load(env: Option<HashMap<String, String>>) -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(
                Environment::with_prefix("GITSTEPS")
                    .separator("_")
                    .source(env),
            )
            .build()?
            .try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;

    #[test]
    fn load_empty() {
        let env = HashMap::from([]);
        let config = RawConfig::load(Some(env)).unwrap();
        assert_eq!(
            config,
            RawConfig {
                checkout: CheckoutConfig { branch: None },
                git: GitConfig { command: None }
            }
        )
    }

    #[test]
    fn load_environment() {
        let env = HashMap::from([
            ("GITSTEPS_CHECKOUT_BRANCH".to_owned(), "main".to_owned()),
            ("GITSTEPS_GIT_COMMAND".to_owned(), "/opt/git/bin/git".to_owned()),
        ]);
        let config = RawConfig::load(Some(env)).unwrap();
        assert_eq!(
            config,
            RawConfig {
                checkout: CheckoutConfig {
                    branch: Some("main".to_owned()),
                },
                git: GitConfig {
                    command: Some("/opt/git/bin/git".into())
                }
            }
        )
    }
}
