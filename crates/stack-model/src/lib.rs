//! # Stack Model
//!
//! Data model shared between a crash-report parser and the source augmenter.
//!
//! A crash report is a list of [`Goroutine`]s, each holding the frames of one
//! captured stack. Every [`Call`] carries the raw argument words printed by the
//! runtime in [`Args::values`]; augmentation fills [`Args::processed`] with the
//! typed rendering of those words.

use serde::{Deserialize, Serialize};

/// One captured stack, outermost call last.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Goroutine {
    /// Goroutine id as printed in the report (0 when unknown)
    #[serde(default)]
    pub id: u64,

    /// Frames, innermost first
    pub stack: Vec<Call>,
}

impl Goroutine {
    #[must_use]
    pub const fn new(id: u64, stack: Vec<Call>) -> Self {
        Self { id, stack }
    }
}

/// One stack frame
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Call {
    /// Source file path as printed in the report
    pub source_path: String,

    /// Line in `source_path` (1-indexed)
    pub line: usize,

    /// Fully-qualified function name, e.g. `main.bar` or `pkg.(*T).Method`
    pub func: String,

    /// Raw and decoded arguments
    #[serde(default)]
    pub args: Args,
}

impl Call {
    /// Create a call from raw argument words
    pub fn new(
        source_path: impl Into<String>,
        line: usize,
        func: impl Into<String>,
        words: &[u64],
    ) -> Self {
        Self {
            source_path: source_path.into(),
            line,
            func: func.into(),
            args: Args::from_words(words),
        }
    }

    /// Unqualified function name: the part after the last `.`
    ///
    /// `main.bar` gives `bar`, `pkg.(*T).Method` gives `Method`.
    #[must_use]
    pub fn function_name(&self) -> &str {
        self.func.rsplit('.').next().unwrap_or(&self.func)
    }
}

/// Arguments of a call
///
/// `processed` may be shorter than `values`: some logical arguments (strings)
/// span two consecutive raw words.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Args {
    /// Raw words as printed in the report
    #[serde(default)]
    pub values: Vec<Arg>,

    /// Typed rendering, one entry per logical argument
    #[serde(default)]
    pub processed: Vec<String>,
}

impl Args {
    #[must_use]
    pub fn from_words(words: &[u64]) -> Self {
        Self {
            values: words.iter().copied().map(Arg::new).collect(),
            processed: Vec::new(),
        }
    }

    /// Raw word at `index`, if present
    #[must_use]
    pub fn word(&self, index: usize) -> Option<u64> {
        self.values.get(index).map(|a| a.value)
    }
}

/// A raw argument word
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Arg {
    pub value: u64,

    #[serde(default)]
    pub name: String,
}

impl Arg {
    #[must_use]
    pub const fn new(value: u64) -> Self {
        Self {
            value,
            name: String::new(),
        }
    }
}
