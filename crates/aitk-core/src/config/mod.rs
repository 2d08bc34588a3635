//! Job configuration for aitk.
//!
//! A job is described by a TOML file with one table per concern (`[save]`,
//! `[logging]`, `[sample]`, ...). Missing tables and keys take defaults;
//! unknown keys are rejected.

mod types;
mod validate;

pub use types::*;

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Root configuration structure for a job.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct JobConfig {
    /// Checkpoint saving
    pub save: SaveConfig,

    /// Training logs
    pub logging: LogConfig,

    /// Sample images during training
    pub sample: SampleConfig,

    /// Adapter network
    pub network: NetworkConfig,

    /// Training loop
    pub train: TrainConfig,

    /// Base model; required by jobs that load one
    pub model: Option<ModelConfig>,

    /// Slider training
    pub slider: Option<SliderConfig>,
}

impl JobConfig {
    /// Load configuration from the default location.
    ///
    /// Returns default configuration if the file doesn't exist.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific file path (with ~ expansion).
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let path = expand_path(path);
        tracing::debug!(path = %path.display(), "Loading job config");
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml(&content)
    }

    /// Parse and validate configuration from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: JobConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default config file path.
    ///
    /// Uses platform-appropriate directories:
    /// - macOS: ~/Library/Application Support/com.aitk.aitk/config.toml
    /// - Linux: ~/.config/aitk/config.toml
    /// - Windows: C:\Users\<User>\AppData\Roaming\aitk\config\config.toml
    ///
    /// Falls back to ~/.aitk/config.toml if directory detection fails.
    pub fn default_path() -> PathBuf {
        directories::ProjectDirs::from("com", "aitk", "aitk")
            .map(|dirs| dirs.config_dir().to_path_buf().join("config.toml"))
            .unwrap_or_else(|| {
                let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
                PathBuf::from(home).join(".aitk").join("config.toml")
            })
    }

    /// Serialize the config to a pretty TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::ValidationError(e.to_string()))
    }
}

fn expand_path(path: &Path) -> PathBuf {
    let path_str = path.to_string_lossy();
    PathBuf::from(shellexpand::tilde(&path_str).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = JobConfig::default();
        assert_eq!(config.save.save_every, 1000);
        assert_eq!(config.save.dtype, "float16");
        assert_eq!(config.save.max_step_saves_to_keep, 5);
        assert_eq!(config.logging.log_every, 100);
        assert!(!config.logging.use_wandb);
        assert_eq!(config.sample.width, 512);
        assert!(config.sample.prompts.is_empty());
        assert_eq!(config.network.network_type, "lora");
        assert_eq!(config.network.alpha, 1.0);
        assert_eq!(config.train.steps, 1000);
        assert_eq!(config.train.optimizer, "adamw");
        assert!(config.model.is_none());
    }

    #[test]
    fn test_config_to_toml() {
        let config = JobConfig::default();
        let toml = config.to_toml().unwrap();
        assert!(toml.contains("[save]"));
        assert!(toml.contains("save_dtype"));
        assert!(toml.contains("[train]"));
    }

    #[test]
    fn test_default_config_round_trips() {
        let toml = JobConfig::default().to_toml().unwrap();
        let parsed = JobConfig::from_toml(&toml).unwrap();
        assert_eq!(parsed.train.lr, 1e-6);
        assert_eq!(parsed.network.linear_alpha, 1.0);
    }

    #[test]
    fn test_parse_job_file() {
        let toml = r#"
            [save]
            save_every = 250
            save_dtype = "bf16"

            [sample]
            prompts = ["a cat --w 768", "a dog --seed 3"]
            walk_seed = true

            [train]
            lr = 1e-4
            optimizer_params = { weight_decay = 0.01 }

            [model]
            name_or_path = "runwayml/stable-diffusion-v1-5"
            is_v2 = true

            [slider]
            resolutions = [[512, 512], [768, 768]]

            [[slider.targets]]
            positive = "smiling"
            negative = "frowning"
        "#;
        let config = JobConfig::from_toml(toml).unwrap();
        assert_eq!(config.save.save_every, 250);
        assert_eq!(config.save.dtype, "bf16");
        assert_eq!(config.sample.prompts.len(), 2);
        assert!(config.train.optimizer_params.contains_key("weight_decay"));
        let model = config.model.unwrap();
        assert!(model.is_v2);
        assert_eq!(model.dtype, "float16");
        let slider = config.slider.unwrap();
        assert_eq!(slider.resolutions, vec![[512, 512], [768, 768]]);
        assert_eq!(slider.targets[0].weight, 1.0);
        assert!(slider.batch_full_slide);
    }

    #[test]
    fn test_unknown_keys_rejected() {
        let err = JobConfig::from_toml("[train]\nstesp = 10\n").unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
        assert!(JobConfig::from_toml("[bogus]\nx = 1\n").is_err());
        assert!(JobConfig::from_toml("[network]\nrnak = 4\n").is_err());
    }

    #[test]
    fn test_network_rank_aliases_linear() {
        let config = JobConfig::from_toml("[network]\nrank = 16\n").unwrap();
        assert_eq!(config.network.linear, Some(16));
        assert_eq!(config.network.rank(), Some(16));

        let config = JobConfig::from_toml("[network]\nlinear = 8\n").unwrap();
        assert_eq!(config.network.rank(), Some(8));

        let config = JobConfig::from_toml("[network]\nrank = 4\nlinear = 32\n").unwrap();
        assert_eq!(config.network.linear, Some(4));
    }

    #[test]
    fn test_network_derived_alphas() {
        let config = JobConfig::from_toml("[network]\nalpha = 4.0\nconv = 8\n").unwrap();
        assert_eq!(config.network.linear_alpha, 4.0);
        assert_eq!(config.network.conv_alpha, Some(8.0));

        let config =
            JobConfig::from_toml("[network]\nalpha = 4.0\nlinear_alpha = 2.0\n").unwrap();
        assert_eq!(config.network.linear_alpha, 2.0);
        assert_eq!(config.network.conv_alpha, None);
    }

    #[test]
    fn test_model_requires_name() {
        let err = JobConfig::from_toml("[model]\nis_xl = true\n").unwrap_err();
        assert!(matches!(err, ConfigError::MissingField(_)));
        assert!(err.to_string().contains("name_or_path"));
        assert!(ModelConfig::new("").is_err());
        assert!(ModelConfig::new("sd-xl").is_ok());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("job.toml");
        std::fs::write(&path, "[logging]\nverbose = true\n").unwrap();
        let config = JobConfig::load_from(&path).unwrap();
        assert!(config.logging.verbose);
    }

    #[test]
    fn test_load_from_missing_file() {
        let err = JobConfig::load_from(Path::new("/nonexistent/aitk/job.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::ReadError(_)));
    }

    #[test]
    fn test_sample_generate_configs() {
        let config = JobConfig::from_toml(
            "[sample]\nprompts = [\"a cat --w 768\", \"a dog\"]\nseed = 10\nwalk_seed = true\nneg = \"blurry\"\n",
        )
        .unwrap();
        let configs = config
            .sample
            .generate_configs(Path::new("/samples"))
            .unwrap();
        assert_eq!(configs.len(), 2);
        assert_eq!(configs[0].prompt(), "a cat");
        assert_eq!(configs[0].width(), 768);
        assert_eq!(configs[0].seed(), 10);
        assert_eq!(configs[1].seed(), 11);
        assert_eq!(configs[1].negative_prompt_2(), "blurry");
        assert_eq!(configs[1].num_inference_steps(), 20);
        assert!(configs[1].add_prompt_file());
        assert_eq!(configs[1].output_folder(), Path::new("/samples"));
    }

    #[test]
    fn test_sample_walk_seed_overflow_is_error() {
        let sample = SampleConfig {
            prompts: vec!["a".into(), "b".into()],
            seed: i64::MAX,
            walk_seed: true,
            ..SampleConfig::default()
        };
        let err = sample.generate_configs(Path::new("/s")).unwrap_err();
        assert!(matches!(
            err,
            crate::error::ToolkitError::Config(ConfigError::ValidationError(_))
        ));
        assert!(err.to_string().contains("sample.seed"));
    }

    #[test]
    fn test_sample_fixed_seed() {
        let sample = SampleConfig {
            prompts: vec!["a".into(), "b".into()],
            seed: 5,
            ..SampleConfig::default()
        };
        let configs = sample.generate_configs(Path::new("/s")).unwrap();
        assert!(configs.iter().all(|c| c.seed() == 5));
    }
}
