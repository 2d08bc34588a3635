//! Inline prompt directives.
//!
//! A prompt may carry overrides after its base text:
//!
//! ```text
//! a photo of a cat --n blurry, lowres --w 768 --h 512 --seed 42 --cfg 6.5
//! ```
//!
//! Everything before the first `--` is the base prompt. Each following
//! segment starts with a flag name (any length) and its content runs up to
//! the next `--`. The flag set is a superset of sd-scripts' sample prompt
//! options, so unknown flags are skipped rather than rejected.

use crate::error::DirectiveError;

/// Marker that starts a directive.
pub const DIRECTIVE_MARKER: &str = "--";

/// Field a directive writes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectiveTarget {
    Prompt2,
    NegativePrompt,
    NegativePrompt2,
    Width,
    Height,
    Seed,
    GuidanceScale,
    NumInferenceSteps,
    NetworkMultiplier,
    GuidanceRescale,
}

/// How directive content is coerced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Text,
    Integer,
    Float,
}

/// Flag aliases. Several flags may map to the same target.
const FLAGS: &[(&str, DirectiveTarget)] = &[
    ("p2", DirectiveTarget::Prompt2),
    ("n", DirectiveTarget::NegativePrompt),
    ("n2", DirectiveTarget::NegativePrompt2),
    ("w", DirectiveTarget::Width),
    ("h", DirectiveTarget::Height),
    ("d", DirectiveTarget::Seed),
    ("seed", DirectiveTarget::Seed),
    ("l", DirectiveTarget::GuidanceScale),
    ("cfg", DirectiveTarget::GuidanceScale),
    ("s", DirectiveTarget::NumInferenceSteps),
    ("steps", DirectiveTarget::NumInferenceSteps),
    ("m", DirectiveTarget::NetworkMultiplier),
    ("network_multiplier", DirectiveTarget::NetworkMultiplier),
    ("gr", DirectiveTarget::GuidanceRescale),
];

impl DirectiveTarget {
    /// Look up the target for a flag name, if it is recognized.
    pub fn from_flag(flag: &str) -> Option<Self> {
        FLAGS
            .iter()
            .find(|(name, _)| *name == flag)
            .map(|(_, target)| *target)
    }

    /// The coercion applied to content for this target.
    pub fn kind(self) -> ValueKind {
        match self {
            Self::Prompt2 | Self::NegativePrompt | Self::NegativePrompt2 => ValueKind::Text,
            Self::Width | Self::Height | Self::Seed | Self::NumInferenceSteps => {
                ValueKind::Integer
            }
            Self::GuidanceScale | Self::NetworkMultiplier | Self::GuidanceRescale => {
                ValueKind::Float
            }
        }
    }
}

/// A coerced directive value.
#[derive(Debug, Clone, PartialEq)]
pub enum DirectiveValue {
    Text(String),
    Integer(i64),
    Float(f64),
}

/// One recognized directive, in the order it appeared in the prompt.
#[derive(Debug, Clone, PartialEq)]
pub struct Directive {
    /// Flag exactly as written (e.g. `cfg` or `l`)
    pub flag: String,
    pub target: DirectiveTarget,
    pub value: DirectiveValue,
}

impl Directive {
    /// Error for a value that parsed but does not fit the target field.
    pub(crate) fn out_of_range(&self, expected: &'static str) -> DirectiveError {
        let content = match &self.value {
            DirectiveValue::Text(s) => s.clone(),
            DirectiveValue::Integer(i) => i.to_string(),
            DirectiveValue::Float(f) => f.to_string(),
        };
        DirectiveError::Malformed {
            flag: self.flag.clone(),
            content,
            expected,
        }
    }
}

/// Result of splitting a prompt into base text and directives.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedPrompt {
    /// Base prompt with all directive segments removed, trimmed
    pub prompt: String,

    /// Recognized directives in source order
    pub directives: Vec<Directive>,

    /// Flags that were present but not recognized
    pub unknown_flags: Vec<String>,
}

/// Splits prompt text into a base prompt and typed overrides.
pub struct PromptDirectiveParser;

impl PromptDirectiveParser {
    /// Parse `raw` into a [`ParsedPrompt`].
    ///
    /// Fails on the first directive whose content cannot be coerced to the
    /// target's type.
    pub fn parse(raw: &str) -> Result<ParsedPrompt, DirectiveError> {
        let trimmed = raw.trim();
        let mut segments = trimmed.split(DIRECTIVE_MARKER);
        let mut parsed = ParsedPrompt {
            prompt: segments.next().unwrap_or_default().trim().to_string(),
            ..ParsedPrompt::default()
        };

        for segment in segments {
            let flag = segment.split(char::is_whitespace).next().unwrap_or_default();
            let content = segment[flag.len()..].trim();

            let Some(target) = DirectiveTarget::from_flag(flag) else {
                tracing::debug!(flag, "Ignoring unknown prompt directive");
                parsed.unknown_flags.push(flag.to_string());
                continue;
            };

            let value = coerce(flag, target.kind(), content)?;
            parsed.directives.push(Directive {
                flag: flag.to_string(),
                target,
                value,
            });
        }

        Ok(parsed)
    }
}

fn coerce(flag: &str, kind: ValueKind, content: &str) -> Result<DirectiveValue, DirectiveError> {
    let malformed = |expected| DirectiveError::Malformed {
        flag: flag.to_string(),
        content: content.to_string(),
        expected,
    };
    match kind {
        ValueKind::Text => Ok(DirectiveValue::Text(content.to_string())),
        ValueKind::Integer => content
            .parse::<i64>()
            .map(DirectiveValue::Integer)
            .map_err(|_| malformed("an integer")),
        ValueKind::Float => content
            .parse::<f64>()
            .map(DirectiveValue::Float)
            .map_err(|_| malformed("a number")),
    }
}
