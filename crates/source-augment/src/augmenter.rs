use crate::cache::SourceCache;
use crate::config::AugmentConfig;
use crate::decoder::{ArgumentDecoder, DecodeOutcome};
use crate::diagnostics::{Diagnostic, DiagnosticSink, LogSink};
use crate::error::{AugmentError, Result};
use crate::locator::locate;
use stack_model::{Call, Goroutine};
use std::path::Path;
use std::sync::Arc;

/// What happened to one call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AugmentStatus {
    /// Every argument decoded (possibly none)
    Decoded,
    /// Decoding stopped early; `processed` holds what came before
    Partial,
    /// Not a Go source path; never read
    Foreign,
    /// Source unreadable, unparseable or too large
    Unavailable,
    /// No syntax node at the call's line
    NotLocated,
    /// Located node has an unhandled shape
    Skipped,
}

/// Per-status counts for one [`Augmenter::augment`] run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AugmentSummary {
    pub calls: usize,
    pub decoded: usize,
    pub partial: usize,
    pub foreign: usize,
    pub unavailable: usize,
    pub not_located: usize,
    pub skipped: usize,
}

impl AugmentSummary {
    fn count(&mut self, status: AugmentStatus) {
        self.calls += 1;
        let slot = match status {
            AugmentStatus::Decoded => &mut self.decoded,
            AugmentStatus::Partial => &mut self.partial,
            AugmentStatus::Foreign => &mut self.foreign,
            AugmentStatus::Unavailable => &mut self.unavailable,
            AugmentStatus::NotLocated => &mut self.not_located,
            AugmentStatus::Skipped => &mut self.skipped,
        };
        *slot += 1;
    }
}

/// Augments crash-report calls with typed argument values
///
/// Owns the source cache for one run; drop it to release every cached file.
/// `Augmenter` is `Sync`, so several workers may share one instance.
pub struct Augmenter {
    config: AugmentConfig,
    cache: SourceCache,
    sink: Arc<dyn DiagnosticSink>,
}

impl Augmenter {
    /// Create an augmenter reporting diagnostics through `log`
    pub fn new(config: AugmentConfig) -> Result<Self> {
        Self::with_sink(config, Arc::new(LogSink))
    }

    /// Create an augmenter reporting diagnostics to `sink`
    pub fn with_sink(config: AugmentConfig, sink: Arc<dyn DiagnosticSink>) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            cache: SourceCache::new(config.clone()),
            config,
            sink,
        })
    }

    #[must_use]
    pub const fn cache(&self) -> &SourceCache {
        &self.cache
    }

    #[must_use]
    pub const fn config(&self) -> &AugmentConfig {
        &self.config
    }

    /// Augment every call of every goroutine, in order
    pub fn augment(&self, goroutines: &mut [Goroutine]) -> AugmentSummary {
        let mut summary = AugmentSummary::default();
        for goroutine in goroutines.iter_mut() {
            for call in &mut goroutine.stack {
                summary.count(self.augment_call(call));
            }
        }

        log::info!(
            "Augmented {} calls: {} decoded, {} partial, {} unavailable",
            summary.calls,
            summary.decoded,
            summary.partial,
            summary.unavailable
        );
        summary
    }

    /// Augment one call in place
    ///
    /// `call.args.processed` is replaced, so running twice gives the same
    /// result. Calls that cannot be decoded keep an empty list.
    pub fn augment_call(&self, call: &mut Call) -> AugmentStatus {
        let path = Path::new(&call.source_path);
        if !self.config.is_source_path(path) {
            return AugmentStatus::Foreign;
        }

        let Some(file) = self.cache.load(path, self.sink.as_ref()) else {
            return AugmentStatus::Unavailable;
        };

        let Some(offset) = file.lines().offset(call.line) else {
            self.report(
                call,
                AugmentError::LineOutOfRange {
                    line: call.line,
                    lines: file.lines().line_count(),
                },
            );
            return AugmentStatus::NotLocated;
        };

        let Some(node) = locate(file.tree(), offset) else {
            self.report(call, AugmentError::NotLocatable { line: call.line });
            return AugmentStatus::NotLocated;
        };
        log::debug!(
            "{}:{} located {} for {}",
            call.source_path,
            call.line,
            node.kind(),
            call.func
        );

        let decoder = ArgumentDecoder::new(&file, self.config.signature_completion);
        match decoder.decode(node, call) {
            DecodeOutcome::Decoded(values) => {
                call.args.processed = values;
                AugmentStatus::Decoded
            }
            DecodeOutcome::Skipped(error) => {
                call.args.processed.clear();
                self.report(call, error);
                AugmentStatus::Skipped
            }
            DecodeOutcome::Failed { partial, error } => {
                call.args.processed = partial;
                self.report(call, error);
                AugmentStatus::Partial
            }
        }
    }

    fn report(&self, call: &Call, error: AugmentError) {
        self.sink
            .record(Diagnostic::for_call(&call.source_path, call.line, error));
    }
}
