use serde::Serialize;

/// Outcome of an indexing run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IndexReport {
    pub documents: usize,
    pub chunks: usize,
    pub skipped_blank: usize,
    pub upserted: usize,
    /// Earlier vectors of the indexed pages removed before writing
    pub replaced: usize,
}

impl IndexReport {
    pub fn is_complete(&self) -> bool {
        self.upserted == self.chunks
    }
}
