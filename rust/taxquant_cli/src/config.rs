use serde::{
    Deserialize,
    Serialize,
};
use std::path::Path;
use std::time::Duration;
use taxquant::remote::Backoff;
use taxquant::{
    DispatchOptions,
    HttpTaxonomyService,
    ResolveOptions,
    RetryPolicy,
};

use crate::cli::Pept2LcaArgs;
use crate::error::CliError;

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
#[serde(default)]
pub struct Config {
    pub remote: RemoteConfig,
    pub retry: RetryConfig,
    pub dispatch: DispatchConfig,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct RemoteConfig {
    pub lineage_url: String,
    pub taxa_url: String,
    pub timeout_seconds: u64,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            lineage_url: HttpTaxonomyService::DEFAULT_LINEAGE_URL.to_string(),
            taxa_url: HttpTaxonomyService::DEFAULT_TAXA_URL.to_string(),
            timeout_seconds: 120,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct RetryConfig {
    pub base_delay_ms: u64,
    /// `null` keeps retrying until the service answers.
    pub max_attempts: Option<u32>,
    pub backoff: Backoff,
    pub max_delay_ms: Option<u64>,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            base_delay_ms: 3000,
            max_attempts: None,
            backoff: Backoff::Linear,
            max_delay_ms: None,
        }
    }
}

impl RetryConfig {
    pub fn policy(&self) -> RetryPolicy {
        RetryPolicy {
            base_delay: Duration::from_millis(self.base_delay_ms),
            max_attempts: self.max_attempts,
            backoff: self.backoff,
            max_delay: self.max_delay_ms.map(Duration::from_millis),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct DispatchConfig {
    pub batch_size: usize,
    pub pause_every: usize,
    pub pause_ms: u64,
    pub equate_il: bool,
    pub missed_cleavage: bool,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        let options = DispatchOptions::default();
        Self {
            batch_size: options.batch_size,
            pause_every: options.pause_every,
            pause_ms: options.pause.as_millis() as u64,
            equate_il: options.resolve.equate_il,
            missed_cleavage: options.resolve.missed_cleavage,
        }
    }
}

impl DispatchConfig {
    pub fn options(&self) -> DispatchOptions {
        DispatchOptions {
            batch_size: self.batch_size,
            pause_every: self.pause_every,
            pause: Duration::from_millis(self.pause_ms),
            resolve: ResolveOptions {
                equate_il: self.equate_il,
                missed_cleavage: self.missed_cleavage,
            },
        }
    }
}

impl Config {
    pub fn from_path(path: &Path) -> Result<Self, CliError> {
        let config: Config = serde_json::from_str(&std::fs::read_to_string(path)?)?;
        config.validate()?;
        Ok(config)
    }

    /// Command line values win over the ones in the file.
    pub fn with_cli_args(mut self, args: &Pept2LcaArgs) -> Result<Self, CliError> {
        if let Some(equate_il) = args.equate_il {
            self.dispatch.equate_il = equate_il;
        }
        if let Some(missed_cleavage) = args.missed_cleavage {
            self.dispatch.missed_cleavage = missed_cleavage;
        }
        if let Some(batch_size) = args.batch_size {
            self.dispatch.batch_size = batch_size;
        }
        self.validate()?;
        Ok(self)
    }

    fn validate(&self) -> Result<(), CliError> {
        if self.dispatch.batch_size == 0 {
            return Err(CliError::Config("batch_size must be at least 1".to_string()));
        }
        if self.retry.max_attempts == Some(0) {
            return Err(CliError::Config(
                "max_attempts must be at least 1, use null for no limit".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn args() -> Pept2LcaArgs {
        Pept2LcaArgs {
            input: PathBuf::from("peptides.tsv"),
            output: PathBuf::from("lca.tsv"),
            config: None,
            equate_il: None,
            missed_cleavage: None,
            batch_size: None,
            skip_distribution: false,
        }
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: Config =
            serde_json::from_str(r#"{"retry": {"max_attempts": 5, "backoff": "exponential"}}"#)
                .unwrap();
        assert_eq!(config.remote, RemoteConfig::default());
        assert_eq!(config.dispatch, DispatchConfig::default());

        let policy = config.retry.policy();
        assert_eq!(policy.max_attempts, Some(5));
        assert_eq!(policy.backoff, Backoff::Exponential);
        assert_eq!(policy.base_delay, Duration::from_secs(3));
    }

    #[test]
    fn test_defaults_match_library() {
        let config = Config::default();
        assert_eq!(config.dispatch.options(), DispatchOptions::default());
        assert_eq!(config.retry.policy(), RetryPolicy::default());
    }

    #[test]
    fn test_cli_overrides() {
        let mut args = args();
        args.equate_il = Some(false);
        args.batch_size = Some(50);
        let config = Config::default().with_cli_args(&args).unwrap();
        assert!(!config.dispatch.equate_il);
        assert_eq!(config.dispatch.batch_size, 50);
        assert!(!config.dispatch.missed_cleavage);

        args.batch_size = Some(0);
        assert!(Config::default().with_cli_args(&args).is_err());
    }

    #[test]
    fn test_template_round_trips() {
        let template = serde_json::to_string_pretty(&Config::default()).unwrap();
        let parsed: Config = serde_json::from_str(&template).unwrap();
        assert_eq!(parsed, Config::default());
    }
}
