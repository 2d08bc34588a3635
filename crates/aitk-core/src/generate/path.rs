//! Output path templating for generated images and their sidecar files.
//!
//! A stem template such as `[time]_[count]_sample` is resolved against a
//! millisecond timestamp and a `(count, max_count)` pair. The count is
//! zero-padded to the digit width of `max_count`, so filenames within a batch
//! of known size sort lexicographically.

use std::path::{Path, PathBuf};

/// Placeholder replaced with the generation timestamp (ms since epoch).
pub const TIME_TOKEN: &str = "[time]";

/// Placeholder replaced with the zero-padded image ordinal.
pub const COUNT_TOKEN: &str = "[count]";

/// Stem template used when only an output folder is configured.
pub const DEFAULT_STEM_TEMPLATE: &str = "[time]_[count]";

/// Extension of the sidecar prompt file.
pub const PROMPT_FILE_EXT: &str = "txt";

/// Resolves concrete file paths from a folder and a stem template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputPathResolver {
    folder: PathBuf,
    stem_template: String,
}

impl OutputPathResolver {
    /// Create a resolver for `folder` using `stem_template`.
    pub fn new(folder: impl Into<PathBuf>, stem_template: impl Into<String>) -> Self {
        Self {
            folder: folder.into(),
            stem_template: stem_template.into(),
        }
    }

    /// Folder every resolved path is joined onto.
    pub fn folder(&self) -> &Path {
        &self.folder
    }

    /// The unresolved stem template.
    pub fn stem_template(&self) -> &str {
        &self.stem_template
    }

    /// Resolve the stem: `[time]` first, then `[count]`.
    ///
    /// A template without tokens is returned unchanged.
    pub fn stem(&self, gen_time: u64, count: u64, max_count: u64) -> String {
        self.stem_template
            .replace(TIME_TOKEN, &gen_time.to_string())
            .replace(COUNT_TOKEN, &pad_count(count, max_count))
    }

    /// Resolve a full path with the given extension (without the dot).
    pub fn resolve(&self, gen_time: u64, count: u64, max_count: u64, ext: &str) -> PathBuf {
        let stem = self.stem(gen_time, count, max_count);
        self.folder.join(file_name(&stem, ext))
    }
}

/// Join a stem and an extension. An empty extension adds no dot.
pub(crate) fn file_name(stem: &str, ext: &str) -> String {
    if ext.is_empty() {
        stem.to_string()
    } else {
        format!("{stem}.{ext}")
    }
}

/// Zero-pad `count` to the number of decimal digits in `max_count`.
///
/// `max_count == 0` gives width 1. Counts wider than the padding are not
/// truncated.
pub fn pad_count(count: u64, max_count: u64) -> String {
    let width = max_count.to_string().len();
    format!("{count:0width$}")
}
