//! Job configuration validation with range checks.

use crate::error::ConfigError;

use super::JobConfig;

impl JobConfig {
    /// Validate required fields and that values are within acceptable ranges.
    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if let Some(model) = &self.model {
            model.check_name()?;
        }
        if self.save.save_every == 0 {
            return Err(ConfigError::ValidationError(
                "save.save_every must be > 0".into(),
            ));
        }
        if self.logging.log_every == 0 {
            return Err(ConfigError::ValidationError(
                "logging.log_every must be > 0".into(),
            ));
        }
        if self.sample.sample_every == 0 {
            return Err(ConfigError::ValidationError(
                "sample.sample_every must be > 0".into(),
            ));
        }
        if self.sample.sample_steps == 0 {
            return Err(ConfigError::ValidationError(
                "sample.sample_steps must be > 0".into(),
            ));
        }
        if self.train.steps == 0 {
            return Err(ConfigError::ValidationError(
                "train.steps must be > 0".into(),
            ));
        }
        if self.train.batch_size == 0 {
            return Err(ConfigError::ValidationError(
                "train.batch_size must be > 0".into(),
            ));
        }
        if self.train.lr.is_nan() || self.train.lr <= 0.0 {
            return Err(ConfigError::ValidationError(
                "train.lr must be > 0".into(),
            ));
        }
        if self.network.linear == Some(0) {
            return Err(ConfigError::ValidationError(
                "network.linear (rank) must be > 0".into(),
            ));
        }
        if let Some(slider) = &self.slider {
            if slider.resolutions.iter().any(|[w, h]| *w == 0 || *h == 0) {
                return Err(ConfigError::ValidationError(
                    "slider.resolutions entries must be non-zero".into(),
                ));
            }
        }
        Ok(())
    }
}
