use thiserror::Error;

/// Failures of book store operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BookError {
    #[error("missing name")]
    MissingName,

    #[error("readPage ({read_page}) exceeds pageCount ({page_count})")]
    ReadPageExceedsPageCount { read_page: u32, page_count: u32 },

    #[error("book '{id}' not found")]
    NotFound { id: String },

    /// The post-insert presence check did not find the new record.
    #[error("book '{id}' missing from the store right after insertion")]
    NotPersisted { id: String },
}

impl BookError {
    pub(crate) fn not_found(id: &str) -> Self {
        Self::NotFound { id: id.to_string() }
    }
}
