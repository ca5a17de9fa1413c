use crate::config::AugmentConfig;
use crate::diagnostics::{Diagnostic, DiagnosticSink};
use crate::error::{AugmentError, Result};
use crate::language::go_parser;
use crate::line_index::LineOffsetIndex;
use once_cell::sync::OnceCell;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use tree_sitter::Tree;

/// A source file that was read and parsed successfully
#[derive(Debug)]
pub struct ParsedSource {
    path: PathBuf,
    source: Vec<u8>,
    lines: LineOffsetIndex,
    tree: Tree,
}

impl ParsedSource {
    /// Parse Go source held in memory
    ///
    /// A tree containing syntax errors counts as a parse failure.
    pub fn parse(path: impl Into<PathBuf>, source: Vec<u8>) -> Result<Self> {
        let path = path.into();
        let mut parser = go_parser()?;
        let tree = parser
            .parse(&source, None)
            .ok_or_else(|| AugmentError::parse(&path, "parser produced no tree"))?;

        let root = tree.root_node();
        if root.has_error() {
            let position = first_error_position(root)
                .map(|p| format!("syntax error at {}:{}", p.row + 1, p.column + 1))
                .unwrap_or_else(|| "syntax error".to_string());
            return Err(AugmentError::parse(&path, position));
        }

        let lines = LineOffsetIndex::new(&source);
        Ok(Self {
            path,
            source,
            lines,
            tree,
        })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    pub fn source(&self) -> &[u8] {
        &self.source
    }

    #[must_use]
    pub const fn lines(&self) -> &LineOffsetIndex {
        &self.lines
    }

    #[must_use]
    pub const fn tree(&self) -> &Tree {
        &self.tree
    }
}

fn first_error_position(node: tree_sitter::Node) -> Option<tree_sitter::Point> {
    if node.is_error() || node.is_missing() {
        return Some(node.start_position());
    }
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if child.has_error() {
            if let Some(point) = first_error_position(child) {
                return Some(point);
            }
        }
    }
    None
}

#[derive(Debug)]
enum SourceEntry {
    Parsed(Arc<ParsedSource>),
    /// Read or parse failed; never retried
    Unusable,
}

/// Counters describing cache activity
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Filesystem read attempts
    pub reads: usize,
    /// Parse attempts
    pub parses: usize,
    /// Entries holding a parsed file
    pub parsed_files: usize,
    /// Entries marked unusable
    pub unusable_files: usize,
}

/// Cache of parsed Go sources, keyed by path
///
/// Each path is loaded at most once. Population of one path is serialized by
/// its own cell; populated entries are shared without further locking.
#[derive(Debug)]
pub struct SourceCache {
    config: AugmentConfig,
    entries: Mutex<HashMap<PathBuf, Arc<OnceCell<SourceEntry>>>>,
    seeded: Mutex<HashMap<PathBuf, Vec<u8>>>,
    reads: AtomicUsize,
    parses: AtomicUsize,
}

impl SourceCache {
    #[must_use]
    pub fn new(config: AugmentConfig) -> Self {
        Self {
            config,
            entries: Mutex::new(HashMap::new()),
            seeded: Mutex::new(HashMap::new()),
            reads: AtomicUsize::new(0),
            parses: AtomicUsize::new(0),
        }
    }

    /// Provide the content of `path` instead of reading it from disk
    ///
    /// Only takes effect if loading of `path` has not started yet; returns
    /// whether the content was accepted.
    pub fn insert_source(&self, path: impl Into<PathBuf>, source: impl Into<Vec<u8>>) -> bool {
        let path = path.into();
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        if entries.contains_key(&path) {
            log::debug!("Ignoring source for already loaded {}", path.display());
            return false;
        }
        self.seeded
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(path, source.into());
        true
    }

    /// Get the parsed file for `path`, loading it on first use
    ///
    /// Returns `None` for non-Go paths (never read) and for files that are
    /// unreadable or unparseable. The failure is reported to `sink` once;
    /// later requests return `None` without touching the filesystem.
    pub fn load(&self, path: &Path, sink: &dyn DiagnosticSink) -> Option<Arc<ParsedSource>> {
        if !self.config.is_source_path(path) {
            return None;
        }

        let cell = {
            let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
            Arc::clone(entries.entry(path.to_path_buf()).or_default())
        };

        let entry = cell.get_or_init(|| match self.populate(path) {
            Ok(parsed) => SourceEntry::Parsed(Arc::new(parsed)),
            Err(err) => {
                sink.record(Diagnostic::for_file(path, err));
                SourceEntry::Unusable
            }
        });

        match entry {
            SourceEntry::Parsed(parsed) => Some(Arc::clone(parsed)),
            SourceEntry::Unusable => None,
        }
    }

    /// Whether `path` was loaded and found unusable
    pub fn is_unusable(&self, path: &Path) -> bool {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries
            .get(path)
            .and_then(|cell| cell.get())
            .is_some_and(|entry| matches!(entry, SourceEntry::Unusable))
    }

    pub fn stats(&self) -> CacheStats {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        let mut stats = CacheStats {
            reads: self.reads.load(Ordering::Relaxed),
            parses: self.parses.load(Ordering::Relaxed),
            ..CacheStats::default()
        };
        for entry in entries.values().filter_map(|cell| cell.get()) {
            match entry {
                SourceEntry::Parsed(_) => stats.parsed_files += 1,
                SourceEntry::Unusable => stats.unusable_files += 1,
            }
        }
        stats
    }

    fn populate(&self, path: &Path) -> Result<ParsedSource> {
        let seeded = self
            .seeded
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(path);

        let source = match seeded {
            Some(source) => source,
            None => self.read(path)?,
        };

        let size = source.len() as u64;
        if size > self.config.max_file_bytes {
            return Err(AugmentError::FileTooLarge {
                path: path.to_path_buf(),
                size,
                limit: self.config.max_file_bytes,
            });
        }
        if source.is_empty() {
            return Err(AugmentError::EmptyFile {
                path: path.to_path_buf(),
            });
        }

        self.parses.fetch_add(1, Ordering::Relaxed);
        log::debug!("Parsing {} ({size} bytes)", path.display());
        ParsedSource::parse(path, source)
    }

    fn read(&self, path: &Path) -> Result<Vec<u8>> {
        self.reads.fetch_add(1, Ordering::Relaxed);
        let read_err = |source| AugmentError::Read {
            path: path.to_path_buf(),
            source,
        };

        let size = std::fs::metadata(path).map_err(read_err)?.len();
        if size > self.config.max_file_bytes {
            return Err(AugmentError::FileTooLarge {
                path: path.to_path_buf(),
                size,
                limit: self.config.max_file_bytes,
            });
        }
        std::fs::read(path).map_err(read_err)
    }
}
