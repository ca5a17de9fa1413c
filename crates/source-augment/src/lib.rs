//! # Source Augment
//!
//! Typed rendering of Go crash-report arguments, recovered from the source.
//!
//! A Go traceback prints each frame's arguments as raw machine words:
//! `main.foo(0x43080, 0x3)`. Given the source file the frame points at, the
//! augmenter finds the call on that line, resolves the declared types of the
//! values passed, and renders the words accordingly: `string(0x43080, 3)`.
//!
//! ## Architecture
//!
//! ```text
//! Goroutine[] ──> Augmenter (one per run)
//!                    │
//!                    ├──> SourceCache: read + tree-sitter parse, once per path
//!                    │      └─> LineOffsetIndex: line → byte offset
//!                    │
//!                    ├──> locate(): first node at or after the line
//!                    │
//!                    └──> ArgumentDecoder
//!                           ├─> resolve(): identifier → declaration
//!                           ├─> base_name(): *pkg.T → T
//!                           └─> TypeRule: raw words → text
//! ```
//!
//! Failures never abort a run. Unusable files and undecodable calls are
//! reported to a [`DiagnosticSink`] and leave `processed` empty or partial.
//!
//! ## Example
//!
//! ```rust
//! use source_augment::{AugmentConfig, Augmenter};
//! use stack_model::{Call, Goroutine};
//!
//! let augmenter = Augmenter::new(AugmentConfig::default()).unwrap();
//! augmenter.cache().insert_source(
//!     "/root/main.go",
//!     "package main\n\nfunc foo(s string) {\n\tpanic(s)\n}\n",
//! );
//!
//! let mut goroutines = vec![Goroutine::new(
//!     1,
//!     vec![Call::new("/root/main.go", 4, "main.foo", &[0x43080, 0x3])],
//! )];
//! augmenter.augment(&mut goroutines);
//!
//! assert_eq!(goroutines[0].stack[0].args.processed, vec!["string(0x43080, 3)"]);
//! ```

mod augmenter;
mod cache;
mod config;
mod decoder;
mod diagnostics;
mod error;
mod language;
mod line_index;
mod locator;
mod resolve;
mod rules;
mod type_name;

pub use augmenter::{AugmentStatus, AugmentSummary, Augmenter};
pub use cache::{CacheStats, ParsedSource, SourceCache};
pub use config::AugmentConfig;
pub use decoder::{ArgumentDecoder, DecodeOutcome, UNCLASSIFIABLE_MARKER};
pub use diagnostics::{CollectingSink, Diagnostic, DiagnosticSink, LogSink, NullSink};
pub use error::{AugmentError, Result};
pub use line_index::LineOffsetIndex;
pub use locator::locate;
pub use rules::TypeRule;
pub use type_name::base_name;
