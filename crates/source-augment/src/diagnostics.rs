use crate::error::AugmentError;
use std::path::PathBuf;
use std::sync::Mutex;

/// Non-fatal problem found while augmenting a call
///
/// Diagnostics are for operator visibility. Augmentation has already
/// recovered by the time one is recorded.
#[derive(Debug)]
pub struct Diagnostic {
    /// Source file involved
    pub path: PathBuf,

    /// Line of the call, when the problem is call-specific
    pub line: Option<usize>,

    pub error: AugmentError,
}

impl Diagnostic {
    pub fn for_file(path: impl Into<PathBuf>, error: AugmentError) -> Self {
        Self {
            path: path.into(),
            line: None,
            error,
        }
    }

    pub fn for_call(path: impl Into<PathBuf>, line: usize, error: AugmentError) -> Self {
        Self {
            path: path.into(),
            line: Some(line),
            error,
        }
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.line {
            Some(line) => write!(f, "{}:{line}: {}", self.path.display(), self.error),
            None => write!(f, "{}: {}", self.path.display(), self.error),
        }
    }
}

/// Receiver for diagnostics
pub trait DiagnosticSink: Send + Sync {
    fn record(&self, diagnostic: Diagnostic);
}

/// Forwards diagnostics to the `log` facade
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl DiagnosticSink for LogSink {
    fn record(&self, diagnostic: Diagnostic) {
        log::warn!("{diagnostic}");
    }
}

/// Drops every diagnostic
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl DiagnosticSink for NullSink {
    fn record(&self, _diagnostic: Diagnostic) {}
}

/// Keeps diagnostics in memory
#[derive(Debug, Default)]
pub struct CollectingSink {
    diagnostics: Mutex<Vec<Diagnostic>>,
}

impl CollectingSink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Take every diagnostic recorded so far
    pub fn take(&self) -> Vec<Diagnostic> {
        match self.diagnostics.lock() {
            Ok(mut guard) => std::mem::take(&mut *guard),
            Err(poisoned) => std::mem::take(&mut *poisoned.into_inner()),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.diagnostics.lock().map_or(0, |guard| guard.len())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl DiagnosticSink for CollectingSink {
    fn record(&self, diagnostic: Diagnostic) {
        match self.diagnostics.lock() {
            Ok(mut guard) => guard.push(diagnostic),
            Err(poisoned) => poisoned.into_inner().push(diagnostic),
        }
    }
}

impl<T: DiagnosticSink + ?Sized> DiagnosticSink for std::sync::Arc<T> {
    fn record(&self, diagnostic: Diagnostic) {
        (**self).record(diagnostic);
    }
}
