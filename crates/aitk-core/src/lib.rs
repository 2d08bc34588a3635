//! aitk Core - configuration layer for image generation and fine-tuning jobs.
//!
//! The centerpiece is [`GenerateImageConfig`], which turns a prompt with
//! inline directives into fully resolved generation settings and
//! deterministic output paths:
//!
//! ```text
//! "a cat --w 768 --seed 42"  →  prompt "a cat", width 768, seed 42
//! "[time]_[count]"           →  out/1700000000000_007.png
//! ```
//!
//! Job-level option bags (save, logging, sample, network, train, model,
//! slider) live in [`config`] and load from TOML.
//!
//! # Usage
//!
//! ```rust,ignore
//! use aitk_core::{GenerateImageConfig, GenerateImageOptions};
//!
//! fn main() -> aitk_core::Result<()> {
//!     let options = GenerateImageOptions::new("a lighthouse --w 768 --n fog")
//!         .with_output_folder("./samples")
//!         .with_prompt_file(true);
//!     let mut config = GenerateImageConfig::new(options)?;
//!
//!     let image = image::RgbImage::new(config.width(), config.height());
//!     let path = config.save_image(&image, 0, 1)?;
//!     println!("saved {}", path.display());
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod generate;

pub use config::JobConfig;
pub use error::{ConfigError, DirectiveError, Result, ToolkitError};
pub use generate::{
    GenerateImageConfig, GenerateImageOptions, OutputPathResolver, PromptDirectiveParser,
    SaveImage,
};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
