//! The `aitk resolve` command: one prompt in, resolved config and paths out.

use aitk_core::{GenerateImageConfig, GenerateImageOptions};
use clap::Args;
use serde::Serialize;
use std::path::PathBuf;

use super::output::{write_items, OutputFormat};

/// Arguments for the `resolve` command.
#[derive(Args, Debug)]
pub struct ResolveArgs {
    /// Prompt text, optionally with directives (e.g. "a cat --w 768 --seed 42")
    #[arg(required = true, allow_hyphen_values = true)]
    pub prompt: String,

    /// Folder for [time]_[count] named images
    #[arg(long, required_unless_present = "output_path")]
    pub output_folder: Option<PathBuf>,

    /// Explicit image path (takes precedence over --output-folder)
    #[arg(long)]
    pub output_path: Option<PathBuf>,

    /// Image extension in folder mode
    #[arg(long, default_value = "png")]
    pub ext: String,

    /// Suffix appended to templated filenames
    #[arg(long, default_value = "")]
    pub tail: String,

    /// Number of images in the batch
    #[arg(short = 'n', long, default_value = "1")]
    pub count: u64,

    /// Seed (-1 for random)
    #[arg(long, default_value = "-1", allow_negative_numbers = true)]
    pub seed: i64,

    #[arg(long, default_value = "512")]
    pub width: u32,

    #[arg(long, default_value = "512")]
    pub height: u32,

    /// Number of inference steps
    #[arg(long, default_value = "50")]
    pub steps: u32,

    /// Guidance (CFG) scale
    #[arg(long, default_value = "7.5")]
    pub cfg: f64,

    /// Negative prompt
    #[arg(long, default_value = "")]
    pub negative: String,

    /// Prompt for the second text encoder
    #[arg(long)]
    pub prompt_2: Option<String>,

    /// Report prompt file paths alongside image paths
    #[arg(long)]
    pub prompt_file: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    pub format: OutputFormat,
}

impl ResolveArgs {
    fn to_options(&self) -> GenerateImageOptions {
        GenerateImageOptions {
            prompt: self.prompt.clone(),
            prompt_2: self.prompt_2.clone(),
            width: self.width,
            height: self.height,
            num_inference_steps: self.steps,
            guidance_scale: self.cfg,
            negative_prompt: self.negative.clone(),
            seed: self.seed,
            output_path: self.output_path.clone(),
            output_folder: self.output_folder.clone(),
            output_ext: self.ext.clone(),
            output_tail: self.tail.clone(),
            add_prompt_file: self.prompt_file,
            ..GenerateImageOptions::default()
        }
    }
}

/// Paths one image of a batch would be written to.
#[derive(Debug, Serialize)]
pub struct ResolvedImage {
    pub count: u64,
    pub image_path: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompt_path: Option<PathBuf>,
}

/// A resolved config together with the files it would produce.
#[derive(Debug, Serialize)]
pub struct ResolvedRecord<'a> {
    pub config: &'a GenerateImageConfig,
    pub directives: String,
    pub images: Vec<ResolvedImage>,
}

impl<'a> ResolvedRecord<'a> {
    /// Resolve paths for each of `counts` within a batch of `max_count`.
    pub fn new(
        config: &'a GenerateImageConfig,
        counts: impl IntoIterator<Item = u64>,
        max_count: u64,
    ) -> Self {
        let images = counts
            .into_iter()
            .map(|count| ResolvedImage {
                count,
                image_path: config.get_image_path(count, max_count),
                prompt_path: config
                    .add_prompt_file()
                    .then(|| config.get_prompt_path(count, max_count)),
            })
            .collect();
        Self {
            config,
            directives: config.directive_string(),
            images,
        }
    }
}

/// Execute the resolve command.
pub fn execute(args: ResolveArgs) -> anyhow::Result<()> {
    let config = GenerateImageConfig::new(args.to_options())?;
    tracing::info!(
        prompt = %config.prompt(),
        seed = config.seed(),
        "Resolved {}x{} generation config",
        config.width(),
        config.height()
    );

    let record = ResolvedRecord::new(&config, 0..args.count, args.count);
    write_items(std::io::stdout().lock(), &[record], args.format)?;
    Ok(())
}
