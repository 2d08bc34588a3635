//! Option bags for a training job. Every option is enumerated with its
//! default; unknown keys are rejected so typos surface at load time.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::error::{ConfigError, Result};
use crate::generate::{GenerateImageConfig, GenerateImageOptions};

/// Checkpoint saving settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SaveConfig {
    /// Save a checkpoint every N steps
    pub save_every: u32,

    /// Checkpoint dtype
    #[serde(rename = "save_dtype")]
    pub dtype: String,

    /// Oldest step checkpoints beyond this count are removed
    pub max_step_saves_to_keep: u32,
}

impl Default for SaveConfig {
    fn default() -> Self {
        Self {
            save_every: 1000,
            dtype: "float16".to_string(),
            max_step_saves_to_keep: 5,
        }
    }
}

/// Training log settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LogConfig {
    /// Log every N steps
    pub log_every: u32,

    /// Enables debug-level logging
    pub verbose: bool,

    /// Report to Weights & Biases
    pub use_wandb: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            log_every: 100,
            verbose: false,
            use_wandb: false,
        }
    }
}

/// Sample image settings used while training.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SampleConfig {
    /// Generate samples every N steps
    pub sample_every: u32,

    pub width: u32,
    pub height: u32,

    /// Sample prompts; each may carry its own `--flag value` directives
    pub prompts: Vec<String>,

    /// Negative prompt applied to every sample
    pub neg: String,

    pub seed: i64,

    /// Use `seed + index` for the index-th prompt
    pub walk_seed: bool,

    pub guidance_scale: f64,
    pub sample_steps: u32,
    pub network_multiplier: f64,
    pub guidance_rescale: f64,
}

impl Default for SampleConfig {
    fn default() -> Self {
        Self {
            sample_every: 100,
            width: 512,
            height: 512,
            prompts: Vec::new(),
            neg: String::new(),
            seed: 0,
            walk_seed: false,
            guidance_scale: 7.0,
            sample_steps: 20,
            network_multiplier: 1.0,
            guidance_rescale: 0.0,
        }
    }
}

impl SampleConfig {
    /// Build one generation config per prompt, saving into `output_folder`
    /// with a prompt file next to each image.
    pub fn generate_configs(&self, output_folder: &Path) -> Result<Vec<GenerateImageConfig>> {
        self.prompts
            .iter()
            .enumerate()
            .map(|(i, prompt)| {
                let seed = if self.walk_seed {
                    self.seed.checked_add(i as i64).ok_or_else(|| {
                        ConfigError::ValidationError(format!(
                            "sample.seed {} overflows when walked to prompt {i}",
                            self.seed
                        ))
                    })?
                } else {
                    self.seed
                };
                let options = GenerateImageOptions {
                    prompt: prompt.clone(),
                    width: self.width,
                    height: self.height,
                    num_inference_steps: self.sample_steps,
                    guidance_scale: self.guidance_scale,
                    negative_prompt: self.neg.clone(),
                    seed,
                    network_multiplier: self.network_multiplier,
                    guidance_rescale: self.guidance_rescale,
                    output_folder: Some(output_folder.to_path_buf()),
                    add_prompt_file: true,
                    ..GenerateImageOptions::default()
                };
                GenerateImageConfig::new(options)
            })
            .collect()
    }
}

/// Adapter network settings.
///
/// `rank` is accepted as a legacy spelling of `linear`; when both are set,
/// `rank` wins.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "NetworkConfigFile")]
pub struct NetworkConfig {
    /// Network type, e.g. "lora"
    #[serde(rename = "type")]
    pub network_type: String,

    /// Linear layer rank
    pub linear: Option<u32>,

    /// Conv layer rank
    pub conv: Option<u32>,

    pub alpha: f64,

    /// Defaults to `alpha`
    pub linear_alpha: f64,

    /// Defaults to `conv`
    pub conv_alpha: Option<f64>,
}

impl NetworkConfig {
    /// Alias of [`Self::linear`].
    pub fn rank(&self) -> Option<u32> {
        self.linear
    }
}

impl Default for NetworkConfig {
    fn default() -> Self {
        NetworkConfigFile::default().into()
    }
}

/// On-disk form of [`NetworkConfig`] before aliasing and derived defaults.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct NetworkConfigFile {
    #[serde(rename = "type")]
    network_type: String,
    rank: Option<u32>,
    linear: Option<u32>,
    conv: Option<u32>,
    alpha: f64,
    linear_alpha: Option<f64>,
    conv_alpha: Option<f64>,
}

impl Default for NetworkConfigFile {
    fn default() -> Self {
        Self {
            network_type: "lora".to_string(),
            rank: None,
            linear: None,
            conv: None,
            alpha: 1.0,
            linear_alpha: None,
            conv_alpha: None,
        }
    }
}

impl From<NetworkConfigFile> for NetworkConfig {
    fn from(file: NetworkConfigFile) -> Self {
        Self {
            network_type: file.network_type,
            linear: file.rank.or(file.linear),
            conv: file.conv,
            alpha: file.alpha,
            linear_alpha: file.linear_alpha.unwrap_or(file.alpha),
            conv_alpha: file.conv_alpha.or(file.conv.map(f64::from)),
        }
    }
}

/// Training loop settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TrainConfig {
    pub noise_scheduler: String,
    pub steps: u32,
    pub lr: f64,
    pub optimizer: String,
    pub lr_scheduler: String,
    pub max_denoising_steps: u32,
    pub batch_size: u32,
    pub dtype: String,
    pub xformers: bool,
    pub train_unet: bool,
    pub train_text_encoder: bool,
    pub noise_offset: f64,

    /// Passed through to the optimizer untouched
    pub optimizer_params: BTreeMap<String, toml::Value>,

    pub skip_first_sample: bool,
    pub gradient_checkpointing: bool,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            noise_scheduler: "ddpm".to_string(),
            steps: 1000,
            lr: 1e-6,
            optimizer: "adamw".to_string(),
            lr_scheduler: "constant".to_string(),
            max_denoising_steps: 50,
            batch_size: 1,
            dtype: "fp32".to_string(),
            xformers: false,
            train_unet: true,
            train_text_encoder: true,
            noise_offset: 0.0,
            optimizer_params: BTreeMap::new(),
            skip_first_sample: false,
            gradient_checkpointing: true,
        }
    }
}

/// Base model settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ModelConfig {
    /// Hub id or local path of the base model (required)
    pub name_or_path: String,
    pub is_v2: bool,
    pub is_xl: bool,
    pub is_v_pred: bool,
    pub dtype: String,
    pub vae_path: Option<PathBuf>,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            name_or_path: String::new(),
            is_v2: false,
            is_xl: false,
            is_v_pred: false,
            dtype: "float16".to_string(),
            vae_path: None,
        }
    }
}

impl ModelConfig {
    /// Create a model config for `name_or_path`, which must not be empty.
    pub fn new(name_or_path: impl Into<String>) -> std::result::Result<Self, ConfigError> {
        let config = Self {
            name_or_path: name_or_path.into(),
            ..Self::default()
        };
        config.check_name()?;
        Ok(config)
    }

    pub(crate) fn check_name(&self) -> std::result::Result<(), ConfigError> {
        if self.name_or_path.trim().is_empty() {
            return Err(ConfigError::MissingField("model.name_or_path".into()));
        }
        Ok(())
    }
}

/// A concept pair the slider pushes between.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SliderTargetConfig {
    pub target_class: String,
    pub positive: String,
    pub negative: String,
    pub multiplier: f64,
    pub weight: f64,
}

impl Default for SliderTargetConfig {
    fn default() -> Self {
        Self {
            target_class: String::new(),
            positive: String::new(),
            negative: String::new(),
            multiplier: 1.0,
            weight: 1.0,
        }
    }
}

/// A prompt the slider should leave unchanged.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SliderAnchorConfig {
    pub prompt: String,
    pub neg_prompt: String,
    pub multiplier: f64,
}

impl Default for SliderAnchorConfig {
    fn default() -> Self {
        Self {
            prompt: String::new(),
            neg_prompt: String::new(),
            multiplier: 1.0,
        }
    }
}

/// Slider training settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SliderConfig {
    pub targets: Vec<SliderTargetConfig>,
    pub anchors: Vec<SliderAnchorConfig>,

    /// `[width, height]` pairs to train at
    pub resolutions: Vec<[u32; 2]>,

    pub prompt_file: Option<PathBuf>,
    pub prompt_tensors: Option<PathBuf>,
    pub batch_full_slide: bool,
}

impl Default for SliderConfig {
    fn default() -> Self {
        Self {
            targets: Vec::new(),
            anchors: Vec::new(),
            resolutions: vec![[512, 512]],
            prompt_file: None,
            prompt_tensors: None,
            batch_full_slide: true,
        }
    }
}
