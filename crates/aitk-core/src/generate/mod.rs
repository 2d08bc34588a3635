//! Per-request image generation settings.
//!
//! [`GenerateImageConfig`] is built once per generation request from
//! [`GenerateImageOptions`]. Construction runs a fixed sequence of steps:
//!
//! 1. prompt directives (`--w 768 --seed 42`) override the options
//! 2. the `-1` seed sentinel is replaced with a random 32-bit seed; this
//!    covers a `--seed -1` directive as well as the option value
//! 3. unset second-encoder prompts fall back to the primary ones
//! 4. the output addressing mode (explicit path or folder + template) is fixed
//! 5. width and height are floored to 64 and rounded down to a multiple of 8
//!
//! After that the config only changes when [`GenerateImageConfig::save_image`]
//! refreshes its timestamp.

pub mod directive;
pub mod image;
pub mod path;

pub use directive::{
    Directive, DirectiveTarget, DirectiveValue, ParsedPrompt, PromptDirectiveParser,
};
pub use image::SaveImage;
pub use path::{OutputPathResolver, DEFAULT_STEM_TEMPLATE, PROMPT_FILE_EXT};

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::error::{ConfigError, DirectiveError, Result};

/// Seed value that requests a random seed.
pub const RANDOM_SEED: i64 = -1;

/// Smallest width/height a config will hold.
pub const MIN_DIMENSION: u32 = 64;

/// Width and height are rounded down to a multiple of this.
pub const DIMENSION_MULTIPLE: u32 = 8;

/// Constructor inputs for [`GenerateImageConfig`].
///
/// `None` for `prompt_2`/`negative_prompt_2` means "not supplied", which is
/// different from an intentionally empty string.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GenerateImageOptions {
    /// Prompt text, optionally followed by `--flag value` directives
    pub prompt: String,

    /// Prompt for the second text encoder
    pub prompt_2: Option<String>,

    pub width: u32,
    pub height: u32,
    pub num_inference_steps: u32,
    pub guidance_scale: f64,
    pub negative_prompt: String,

    /// Negative prompt for the second text encoder
    pub negative_prompt_2: Option<String>,

    /// `-1` draws a random seed
    pub seed: i64,

    pub network_multiplier: f64,
    pub guidance_rescale: f64,

    /// Full image path; takes precedence over `output_folder`
    pub output_path: Option<PathBuf>,

    /// Folder for `[time]_[count]` named images
    pub output_folder: Option<PathBuf>,

    /// Image extension when saving into `output_folder`
    pub output_ext: String,

    /// Suffix appended to templated filenames as `_<tail>`
    pub output_tail: String,

    /// Write a `.txt` prompt file next to each image
    pub add_prompt_file: bool,
}

impl Default for GenerateImageOptions {
    fn default() -> Self {
        Self {
            prompt: String::new(),
            prompt_2: None,
            width: 512,
            height: 512,
            num_inference_steps: 50,
            guidance_scale: 7.5,
            negative_prompt: String::new(),
            negative_prompt_2: None,
            seed: RANDOM_SEED,
            network_multiplier: 1.0,
            guidance_rescale: 0.0,
            output_path: None,
            output_folder: None,
            output_ext: "png".to_string(),
            output_tail: String::new(),
            add_prompt_file: false,
        }
    }
}

impl GenerateImageOptions {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            ..Default::default()
        }
    }

    pub fn with_output_folder(mut self, folder: impl Into<PathBuf>) -> Self {
        self.output_folder = Some(folder.into());
        self
    }

    pub fn with_output_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_path = Some(path.into());
        self
    }

    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn with_seed(mut self, seed: i64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_negative_prompt(mut self, negative_prompt: impl Into<String>) -> Self {
        self.negative_prompt = negative_prompt.into();
        self
    }

    pub fn with_output_tail(mut self, tail: impl Into<String>) -> Self {
        self.output_tail = tail.into();
        self
    }

    pub fn with_prompt_file(mut self, enabled: bool) -> Self {
        self.add_prompt_file = enabled;
        self
    }
}

/// Resolved settings for one generation request.
#[derive(Debug, Clone, Serialize)]
pub struct GenerateImageConfig {
    prompt: String,
    prompt_2: String,
    negative_prompt: String,
    negative_prompt_2: String,
    width: u32,
    height: u32,
    num_inference_steps: u32,
    guidance_scale: f64,
    guidance_rescale: f64,
    network_multiplier: f64,
    seed: i64,
    output_path: PathBuf,
    output_folder: PathBuf,
    output_ext: String,
    output_filename_no_ext: String,
    output_tail: String,
    add_prompt_file: bool,
    gen_time: u64,
}

impl GenerateImageConfig {
    /// Build a config, drawing a random seed from the thread RNG if needed.
    pub fn new(options: GenerateImageOptions) -> Result<Self> {
        Self::with_rng(options, &mut rand::thread_rng())
    }

    /// Build a config using `rng` to resolve the random seed sentinel.
    pub fn with_rng<R: Rng + ?Sized>(options: GenerateImageOptions, rng: &mut R) -> Result<Self> {
        let mut draft = Draft::from_options(&options);
        draft.apply_directives()?;
        draft.resolve_seed(rng);
        draft.default_dual_prompts();
        let output = OutputTarget::resolve(&options)?;

        let config = Self {
            prompt: draft.prompt,
            prompt_2: draft.prompt_2.unwrap_or_default(),
            negative_prompt: draft.negative_prompt,
            negative_prompt_2: draft.negative_prompt_2.unwrap_or_default(),
            width: normalize_dimension(draft.width),
            height: normalize_dimension(draft.height),
            num_inference_steps: draft.num_inference_steps,
            guidance_scale: draft.guidance_scale,
            guidance_rescale: draft.guidance_rescale,
            network_multiplier: draft.network_multiplier,
            seed: draft.seed,
            output_path: output.path,
            output_folder: output.folder,
            output_ext: output.ext,
            output_filename_no_ext: output.stem_template,
            output_tail: options.output_tail,
            add_prompt_file: options.add_prompt_file,
            gen_time: now_millis(),
        };
        tracing::debug!(
            prompt = %config.prompt,
            width = config.width,
            height = config.height,
            seed = config.seed,
            output = %config.output_path.display(),
            "Resolved generation config"
        );
        Ok(config)
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn prompt_2(&self) -> &str {
        &self.prompt_2
    }

    pub fn negative_prompt(&self) -> &str {
        &self.negative_prompt
    }

    pub fn negative_prompt_2(&self) -> &str {
        &self.negative_prompt_2
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn num_inference_steps(&self) -> u32 {
        self.num_inference_steps
    }

    pub fn guidance_scale(&self) -> f64 {
        self.guidance_scale
    }

    pub fn guidance_rescale(&self) -> f64 {
        self.guidance_rescale
    }

    pub fn network_multiplier(&self) -> f64 {
        self.network_multiplier
    }

    pub fn seed(&self) -> i64 {
        self.seed
    }

    /// Full output path. In folder mode this still contains the template tokens.
    pub fn output_path(&self) -> &Path {
        &self.output_path
    }

    pub fn output_folder(&self) -> &Path {
        &self.output_folder
    }

    pub fn output_ext(&self) -> &str {
        &self.output_ext
    }

    /// Stem template, e.g. `[time]_[count]_tail` or a literal stem.
    pub fn output_filename_no_ext(&self) -> &str {
        &self.output_filename_no_ext
    }

    pub fn output_tail(&self) -> &str {
        &self.output_tail
    }

    pub fn add_prompt_file(&self) -> bool {
        self.add_prompt_file
    }

    /// Milliseconds since epoch used for `[time]`.
    pub fn gen_time(&self) -> u64 {
        self.gen_time
    }

    /// Set the `[time]` value. `None` uses the current instant.
    pub fn set_gen_time(&mut self, gen_time: Option<u64>) {
        self.gen_time = gen_time.unwrap_or_else(now_millis);
    }

    fn resolver(&self) -> OutputPathResolver {
        OutputPathResolver::new(
            self.output_folder.clone(),
            self.output_filename_no_ext.clone(),
        )
    }

    /// Image path for the `count`-th image of a batch of `max_count`.
    pub fn get_image_path(&self, count: u64, max_count: u64) -> PathBuf {
        self.resolver()
            .resolve(self.gen_time, count, max_count, &self.output_ext)
    }

    /// Sidecar prompt file path for the `count`-th image.
    pub fn get_prompt_path(&self, count: u64, max_count: u64) -> PathBuf {
        self.resolver()
            .resolve(self.gen_time, count, max_count, PROMPT_FILE_EXT)
    }

    /// Save `image`, plus the prompt file when enabled.
    ///
    /// Creates the output folder and refreshes `gen_time` first, so the image
    /// and its prompt file share a timestamp. Returns the image path.
    pub fn save_image<I: SaveImage + ?Sized>(
        &mut self,
        image: &I,
        count: u64,
        max_count: u64,
    ) -> Result<PathBuf> {
        std::fs::create_dir_all(&self.output_folder)?;
        self.set_gen_time(None);

        let path = self.get_image_path(count, max_count);
        image.save_to(&path)?;
        tracing::info!(path = %path.display(), seed = self.seed, "Saved image");

        if self.add_prompt_file {
            self.save_prompt_file(count, max_count)?;
        }
        Ok(path)
    }

    /// Write the prompt file for the `count`-th image and return its path.
    ///
    /// Only the base prompt is written; see [`Self::directive_string`] for the
    /// full parameter line.
    pub fn save_prompt_file(&self, count: u64, max_count: u64) -> Result<PathBuf> {
        let path = self.get_prompt_path(count, max_count);
        tracing::debug!(
            path = %path.display(),
            params = %self.directive_string(),
            "Writing prompt file"
        );
        std::fs::write(&path, &self.prompt)?;
        Ok(path)
    }

    /// Prompt followed by every generation parameter as a directive.
    ///
    /// Parsing the result reproduces this config's generation parameters.
    pub fn directive_string(&self) -> String {
        format!(
            "{} --p2 {} --n {} --n2 {} --w {} --h {} --seed {} --cfg {:?} --steps {} --m {:?} --gr {:?}",
            self.prompt,
            self.prompt_2,
            self.negative_prompt,
            self.negative_prompt_2,
            self.width,
            self.height,
            self.seed,
            self.guidance_scale,
            self.num_inference_steps,
            self.network_multiplier,
            self.guidance_rescale,
        )
    }
}

/// Mutable state while construction steps run. Dimensions stay signed until
/// normalization so directives like `--w -5` clamp instead of failing.
struct Draft {
    prompt: String,
    prompt_2: Option<String>,
    negative_prompt: String,
    negative_prompt_2: Option<String>,
    width: i64,
    height: i64,
    num_inference_steps: u32,
    guidance_scale: f64,
    guidance_rescale: f64,
    network_multiplier: f64,
    seed: i64,
}

impl Draft {
    fn from_options(options: &GenerateImageOptions) -> Self {
        Self {
            prompt: options.prompt.clone(),
            prompt_2: options.prompt_2.clone(),
            negative_prompt: options.negative_prompt.clone(),
            negative_prompt_2: options.negative_prompt_2.clone(),
            width: i64::from(options.width),
            height: i64::from(options.height),
            num_inference_steps: options.num_inference_steps,
            guidance_scale: options.guidance_scale,
            guidance_rescale: options.guidance_rescale,
            network_multiplier: options.network_multiplier,
            seed: options.seed,
        }
    }

    /// Strip directives from the prompt and apply them left to right.
    fn apply_directives(&mut self) -> std::result::Result<(), DirectiveError> {
        let parsed = PromptDirectiveParser::parse(&self.prompt)?;
        self.prompt = parsed.prompt;
        for directive in &parsed.directives {
            self.apply(directive)?;
        }
        Ok(())
    }

    fn apply(&mut self, directive: &Directive) -> std::result::Result<(), DirectiveError> {
        use DirectiveTarget as T;
        use DirectiveValue as V;

        match (directive.target, &directive.value) {
            (T::Prompt2, V::Text(text)) => self.prompt_2 = Some(text.clone()),
            (T::NegativePrompt, V::Text(text)) => self.negative_prompt = text.clone(),
            (T::NegativePrompt2, V::Text(text)) => self.negative_prompt_2 = Some(text.clone()),
            (T::Width, V::Integer(value)) => self.width = *value,
            (T::Height, V::Integer(value)) => self.height = *value,
            (T::Seed, V::Integer(value)) => self.seed = *value,
            (T::NumInferenceSteps, V::Integer(value)) => {
                self.num_inference_steps = u32::try_from(*value)
                    .map_err(|_| directive.out_of_range("a non-negative integer"))?;
            }
            (T::GuidanceScale, V::Float(value)) => self.guidance_scale = *value,
            (T::NetworkMultiplier, V::Float(value)) => self.network_multiplier = *value,
            (T::GuidanceRescale, V::Float(value)) => self.guidance_rescale = *value,
            _ => return Err(directive.out_of_range("a value of the flag's type")),
        }
        Ok(())
    }

    fn resolve_seed<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        if self.seed == RANDOM_SEED {
            self.seed = i64::from(rng.gen::<u32>());
        }
    }

    fn default_dual_prompts(&mut self) {
        if self.prompt_2.is_none() {
            self.prompt_2 = Some(self.prompt.clone());
        }
        if self.negative_prompt_2.is_none() {
            self.negative_prompt_2 = Some(self.negative_prompt.clone());
        }
    }
}

/// The addressing mode chosen at construction.
struct OutputTarget {
    path: PathBuf,
    folder: PathBuf,
    ext: String,
    stem_template: String,
}

impl OutputTarget {
    fn resolve(options: &GenerateImageOptions) -> std::result::Result<Self, ConfigError> {
        let explicit = non_empty(options.output_path.as_deref());
        let folder = non_empty(options.output_folder.as_deref());

        match (explicit, folder) {
            (Some(path), folder) => {
                if folder.is_some() {
                    tracing::warn!(
                        output_path = %path.display(),
                        "Both output_path and output_folder set; using output_path"
                    );
                }
                Self::from_path(&expand(path))
            }
            (None, Some(folder)) => Ok(Self::from_folder(
                expand(folder),
                &options.output_ext,
                &options.output_tail,
            )),
            (None, None) => Err(ConfigError::MissingOutput),
        }
    }

    /// Split an explicit image path. A path ending in a separator names a
    /// directory, not an image, and is rejected.
    fn from_path(path: &Path) -> std::result::Result<Self, ConfigError> {
        let names_dir = path
            .to_string_lossy()
            .ends_with(std::path::is_separator);
        if names_dir || path.file_name().is_none() {
            return Err(ConfigError::ValidationError(format!(
                "output_path {} must name a file",
                path.display()
            )));
        }
        let lossy = |s: Option<&std::ffi::OsStr>| {
            s.map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default()
        };
        Ok(Self {
            path: path.to_path_buf(),
            folder: path.parent().map(Path::to_path_buf).unwrap_or_default(),
            ext: lossy(path.extension()),
            stem_template: lossy(path.file_stem()),
        })
    }

    fn from_folder(folder: PathBuf, ext: &str, tail: &str) -> Self {
        let mut stem_template = DEFAULT_STEM_TEMPLATE.to_string();
        if !tail.is_empty() {
            stem_template.push('_');
            stem_template.push_str(tail);
        }
        Self {
            path: folder.join(path::file_name(&stem_template, ext)),
            folder,
            ext: ext.to_string(),
            stem_template,
        }
    }
}

fn non_empty(path: Option<&Path>) -> Option<&Path> {
    path.filter(|p| !p.as_os_str().is_empty())
}

/// Expand a leading `~` to the home directory.
fn expand(path: &Path) -> PathBuf {
    let path_str = path.to_string_lossy();
    PathBuf::from(shellexpand::tilde(&path_str).into_owned())
}

/// Floor to [`MIN_DIMENSION`], then round down to a multiple of
/// [`DIMENSION_MULTIPLE`].
fn normalize_dimension(value: i64) -> u32 {
    let clamped = value.clamp(i64::from(MIN_DIMENSION), i64::from(u32::MAX));
    let clamped = clamped as u32;
    clamped - clamped % DIMENSION_MULTIPLE
}

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ToolkitError;
    use ::image::RgbImage;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn folder_options(prompt: &str) -> GenerateImageOptions {
        GenerateImageOptions::new(prompt).with_output_folder("/out")
    }

    fn build(options: GenerateImageOptions) -> GenerateImageConfig {
        GenerateImageConfig::with_rng(options, &mut StdRng::seed_from_u64(7)).unwrap()
    }

    #[test]
    fn test_dimensions_normalized() {
        let cases = [(500, 496), (60, 64), (0, 64), (512, 512), (71, 64), (1023, 1016)];
        for (input, expected) in cases {
            let config = build(folder_options("x").with_size(input, input));
            assert_eq!(config.width(), expected, "width {input}");
            assert_eq!(config.height(), expected, "height {input}");
        }
    }

    #[test]
    fn test_dimension_invariant_holds_for_range() {
        for value in (0..2000).step_by(13) {
            let config = build(folder_options("x").with_size(value, value + 3));
            assert_eq!(config.width() % 8, 0);
            assert!(config.width() >= 64);
            assert_eq!(config.height() % 8, 0);
            assert!(config.height() >= 64);
        }
    }

    #[test]
    fn test_negative_directive_dimension_floors() {
        let config = build(folder_options("x --w -5 --h 4294967295"));
        assert_eq!(config.width(), 64);
        assert_eq!(config.height(), u32::MAX - u32::MAX % 8);
    }

    #[test]
    fn test_random_seed_resolved() {
        for n in 0..20 {
            let config = GenerateImageConfig::with_rng(
                folder_options("x"),
                &mut StdRng::seed_from_u64(n),
            )
            .unwrap();
            assert!((0..=i64::from(u32::MAX)).contains(&config.seed()));
        }
    }

    #[test]
    fn test_explicit_seed_passes_through() {
        assert_eq!(build(folder_options("x").with_seed(0)).seed(), 0);
        assert_eq!(build(folder_options("x").with_seed(-5)).seed(), -5);
        assert_eq!(build(folder_options("x").with_seed(1 << 40)).seed(), 1 << 40);
    }

    #[test]
    fn test_directive_seed_sentinel_is_random() {
        let config = build(folder_options("x --seed -1").with_seed(3));
        assert_ne!(config.seed(), RANDOM_SEED);
        assert!(config.seed() >= 0);
    }

    #[test]
    fn test_directive_overrides() {
        let config = build(folder_options("cat --w 256 --h 256 --seed 7"));
        assert_eq!(config.prompt(), "cat");
        assert_eq!(config.width(), 256);
        assert_eq!(config.height(), 256);
        assert_eq!(config.seed(), 7);
    }

    #[test]
    fn test_later_directive_wins() {
        let config = build(folder_options("cat --w 256 --w 512 --d 1 --seed 2"));
        assert_eq!(config.width(), 512);
        assert_eq!(config.seed(), 2);
    }

    #[test]
    fn test_all_numeric_directives() {
        let config = build(folder_options(
            "cat --l 3.5 --s 30 --m 0.8 --gr 0.7",
        ));
        assert_eq!(config.guidance_scale(), 3.5);
        assert_eq!(config.num_inference_steps(), 30);
        assert_eq!(config.network_multiplier(), 0.8);
        assert_eq!(config.guidance_rescale(), 0.7);
    }

    #[test]
    fn test_malformed_directive_fails_construction() {
        let err = GenerateImageConfig::new(folder_options("cat --w wide")).unwrap_err();
        match err {
            ToolkitError::Directive(DirectiveError::Malformed { flag, content, .. }) => {
                assert_eq!(flag, "w");
                assert_eq!(content, "wide");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_negative_steps_rejected() {
        let err = GenerateImageConfig::new(folder_options("cat --steps -3")).unwrap_err();
        assert!(err.to_string().contains("--steps"));
    }

    #[test]
    fn test_unknown_directive_only_stripped() {
        let plain = build(folder_options("dog").with_seed(9));
        let with_unknown = build(folder_options("dog --zzz foo").with_seed(9));
        assert_eq!(with_unknown.prompt(), "dog");
        assert_eq!(with_unknown.width(), plain.width());
        assert_eq!(with_unknown.height(), plain.height());
        assert_eq!(with_unknown.seed(), plain.seed());
        assert_eq!(with_unknown.guidance_scale(), plain.guidance_scale());
        assert_eq!(with_unknown.negative_prompt(), plain.negative_prompt());
    }

    #[test]
    fn test_dual_prompts_default_to_final_values() {
        let config = build(folder_options("cat --n blurry").with_negative_prompt("ignored"));
        assert_eq!(config.prompt_2(), "cat");
        assert_eq!(config.negative_prompt(), "blurry");
        assert_eq!(config.negative_prompt_2(), "blurry");
    }

    #[test]
    fn test_dual_prompt_directives_take_precedence() {
        let config = build(folder_options("cat --p2 feline --n2 noisy"));
        assert_eq!(config.prompt_2(), "feline");
        assert_eq!(config.negative_prompt_2(), "noisy");
    }

    #[test]
    fn test_explicit_empty_second_prompt_kept() {
        let mut options = folder_options("cat");
        options.prompt_2 = Some(String::new());
        assert_eq!(build(options).prompt_2(), "");
    }

    #[test]
    fn test_folder_mode_path() {
        let mut config = build(folder_options("x"));
        assert_eq!(config.output_filename_no_ext(), "[time]_[count]");
        assert_eq!(config.output_path(), Path::new("/out/[time]_[count].png"));
        config.set_gen_time(Some(1000));
        assert_eq!(
            config.get_image_path(3, 150),
            PathBuf::from("/out/1000_003.png")
        );
        assert_eq!(
            config.get_prompt_path(3, 150),
            PathBuf::from("/out/1000_003.txt")
        );
    }

    #[test]
    fn test_folder_mode_tail() {
        let config = build(folder_options("x").with_output_tail("lora"));
        assert_eq!(config.output_filename_no_ext(), "[time]_[count]_lora");
    }

    #[test]
    fn test_explicit_path_mode() {
        let config = build(GenerateImageOptions::new("x").with_output_path("/a/b/img.jpg"));
        assert_eq!(config.output_folder(), Path::new("/a/b"));
        assert_eq!(config.output_ext(), "jpg");
        assert_eq!(config.output_filename_no_ext(), "img");
        assert_eq!(config.get_image_path(4, 10), PathBuf::from("/a/b/img.jpg"));
    }

    #[test]
    fn test_explicit_path_wins_over_folder() {
        let options = GenerateImageOptions::new("x")
            .with_output_path("/a/img.webp")
            .with_output_folder("/elsewhere");
        let config = build(options);
        assert_eq!(config.output_folder(), Path::new("/a"));
        assert_eq!(config.output_ext(), "webp");
    }

    #[test]
    fn test_missing_output_is_config_error() {
        let err = GenerateImageConfig::new(GenerateImageOptions::new("x")).unwrap_err();
        assert!(matches!(
            err,
            ToolkitError::Config(ConfigError::MissingOutput)
        ));

        let empty = GenerateImageOptions::new("x").with_output_folder("");
        assert!(GenerateImageConfig::new(empty).is_err());
    }

    #[test]
    fn test_directive_string_round_trip() {
        let original = build(folder_options(
            "cat --n dog --w 640 --h 384 --seed 11 --cfg 4.5 --steps 12 --m 0.5 --gr 0.2",
        ));
        let line = original.directive_string();
        let reparsed = build(folder_options(&line));
        assert_eq!(reparsed.prompt(), "cat");
        assert_eq!(reparsed.negative_prompt(), "dog");
        assert_eq!(reparsed.width(), 640);
        assert_eq!(reparsed.height(), 384);
        assert_eq!(reparsed.seed(), 11);
        assert_eq!(reparsed.guidance_scale(), 4.5);
        assert_eq!(reparsed.num_inference_steps(), 12);
        assert_eq!(reparsed.network_multiplier(), 0.5);
        assert_eq!(reparsed.guidance_rescale(), 0.2);
    }

    #[test]
    fn test_save_image_writes_image_and_prompt_file() {
        let dir = tempfile::tempdir().unwrap();
        let folder = dir.path().join("nested").join("samples");
        let options = GenerateImageOptions::new("a lighthouse --w 64 --h 64")
            .with_output_folder(&folder)
            .with_prompt_file(true);
        let mut config = build(options);
        config.set_gen_time(Some(0));

        let image_path = config.save_image(&RgbImage::new(64, 64), 2, 10).unwrap();
        assert!(config.gen_time() > 0);
        assert!(image_path.exists());

        let stem = format!("{}_02", config.gen_time());
        assert_eq!(image_path, folder.join(format!("{stem}.png")));

        let prompt_path = folder.join(format!("{stem}.txt"));
        assert_eq!(std::fs::read_to_string(prompt_path).unwrap(), "a lighthouse");
    }

    #[test]
    fn test_save_image_without_prompt_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = build(folder_options("x").with_output_folder(dir.path()));
        let image_path = config.save_image(&RgbImage::new(8, 8), 0, 0).unwrap();
        assert!(image_path.exists());
        assert!(!config.get_prompt_path(0, 0).exists());
    }

    #[test]
    fn test_save_image_folder_create_failure_propagates() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("not_a_dir");
        std::fs::write(&blocker, b"file").unwrap();

        let mut config = build(folder_options("x").with_output_folder(blocker.join("out")));
        let err = config.save_image(&RgbImage::new(8, 8), 0, 0).unwrap_err();
        assert!(matches!(err, ToolkitError::Io(_)));
    }

    #[test]
    fn test_save_image_prompt_file_failure_propagates() {
        let dir = tempfile::tempdir().unwrap();
        let options = GenerateImageOptions::new("x")
            .with_output_path(dir.path().join("fixed.png"))
            .with_prompt_file(true);
        let mut config = build(options);
        std::fs::create_dir(dir.path().join("fixed.txt")).unwrap();

        let err = config.save_image(&RgbImage::new(8, 8), 0, 0).unwrap_err();
        assert!(matches!(err, ToolkitError::Io(_)));
        assert!(dir.path().join("fixed.png").exists());
    }

    #[test]
    fn test_output_path_naming_directory_rejected() {
        for path in ["/a/b/", "/"] {
            let err =
                GenerateImageConfig::new(GenerateImageOptions::new("x").with_output_path(path))
                    .unwrap_err();
            assert!(
                matches!(err, ToolkitError::Config(ConfigError::ValidationError(_))),
                "{path}"
            );
        }
    }

    #[test]
    fn test_options_reject_unknown_keys() {
        let err = toml::from_str::<GenerateImageOptions>("prompt = \"x\"\nwidht = 5\n");
        assert!(err.is_err());
        let ok: GenerateImageOptions = toml::from_str("prompt = \"x\"\nwidth = 640\n").unwrap();
        assert_eq!(ok.width, 640);
        assert_eq!(ok.seed, RANDOM_SEED);
    }
}
