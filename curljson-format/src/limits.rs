//! Security limits and configuration

/// Limits applied to key paths and fetched documents
#[derive(Debug, Clone)]
pub struct Limits {
    /// Maximum segments in a key path (default: 64, hard: 1,024)
    pub max_path_segments: usize,
    /// Maximum key path text length in bytes (default: 4,096, hard: 65,536)
    pub max_path_length: usize,
    /// Maximum document size in bytes (default: 64 MiB, hard: 1 GiB)
    pub max_document_bytes: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_path_segments: 64,
            max_path_length: 4_096,
            max_document_bytes: 64 * 1024 * 1024,
        }
    }
}

impl Limits {
    /// Hard maximum limits that cannot be exceeded
    pub fn hard_maximums() -> Self {
        Self {
            max_path_segments: 1_024,
            max_path_length: 65_536,
            max_document_bytes: 1024 * 1024 * 1024,
        }
    }

    /// Clamp every field to its hard maximum
    pub fn clamped(&self) -> Self {
        let hard = Self::hard_maximums();
        Self {
            max_path_segments: self.max_path_segments.min(hard.max_path_segments),
            max_path_length: self.max_path_length.min(hard.max_path_length),
            max_document_bytes: self.max_document_bytes.min(hard.max_document_bytes),
        }
    }
}
