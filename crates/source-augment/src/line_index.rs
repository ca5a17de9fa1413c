/// Line number to byte offset mapping for one source file
///
/// Index `L` holds the byte offset of the first byte of line `L`. Lines are
/// 1-indexed, so index 0 is a sentinel equal to the first line's offset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineOffsetIndex {
    offsets: Vec<usize>,
}

impl LineOffsetIndex {
    /// Build the index with a single scan for `\n`
    #[must_use]
    pub fn new(source: &[u8]) -> Self {
        let mut offsets = vec![0, 0];
        offsets.extend(
            source
                .iter()
                .enumerate()
                .filter(|&(_, &b)| b == b'\n')
                .map(|(i, _)| i + 1),
        );
        Self { offsets }
    }

    /// Byte offset of the first byte of `line`
    #[must_use]
    pub fn offset(&self, line: usize) -> Option<usize> {
        if line == 0 {
            return None;
        }
        self.offsets.get(line).copied()
    }

    /// Number of addressable lines
    #[must_use]
    pub fn line_count(&self) -> usize {
        self.offsets.len() - 1
    }
}
