use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use super::error::BookError;

// UTC with exactly three fractional digits, e.g. `2024-01-01T08:00:00.120Z`.
time::serde::format_description!(
    iso_millis,
    OffsetDateTime,
    "[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond digits:3]Z"
);

/// A book on the shelf.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    /// Opaque id assigned at creation; never changes
    pub id: String,
    pub name: String,
    pub year: i32,
    pub author: String,
    pub summary: String,
    pub publisher: String,
    pub page_count: u32,
    pub read_page: u32,
    /// Always `read_page == page_count`
    pub finished: bool,
    pub reading: bool,
    #[serde(with = "iso_millis")]
    pub inserted_at: OffsetDateTime,
    #[serde(with = "iso_millis")]
    pub updated_at: OffsetDateTime,
}

impl Book {
    /// Replace every client-supplied field, keeping `id` and `inserted_at`.
    pub(crate) fn apply(&mut self, changes: NewBook, now: OffsetDateTime) {
        self.finished = changes.is_finished();
        self.name = changes.name;
        self.year = changes.year;
        self.author = changes.author;
        self.summary = changes.summary;
        self.publisher = changes.publisher;
        self.page_count = changes.page_count;
        self.read_page = changes.read_page;
        self.reading = changes.reading;
        self.updated_at = now;
    }
}

/// Request body for creating or replacing a book.
///
/// Only `name` is required; everything else defaults when omitted.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookPayload {
    pub name: Option<String>,
    #[serde(default)]
    pub year: i32,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub publisher: String,
    #[serde(default)]
    pub page_count: u32,
    #[serde(default)]
    pub read_page: u32,
    #[serde(default)]
    pub reading: bool,
}

impl BookPayload {
    /// Check the payload, name first, then the page counts.
    pub fn validate(self) -> Result<NewBook, BookError> {
        let name = match self.name {
            Some(name) if !name.is_empty() => name,
            _ => return Err(BookError::MissingName),
        };

        if self.read_page > self.page_count {
            return Err(BookError::ReadPageExceedsPageCount {
                read_page: self.read_page,
                page_count: self.page_count,
            });
        }

        Ok(NewBook {
            name,
            year: self.year,
            author: self.author,
            summary: self.summary,
            publisher: self.publisher,
            page_count: self.page_count,
            read_page: self.read_page,
            reading: self.reading,
        })
    }
}

/// A validated payload: the name is non-empty and `read_page <= page_count`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBook {
    pub name: String,
    pub year: i32,
    pub author: String,
    pub summary: String,
    pub publisher: String,
    pub page_count: u32,
    pub read_page: u32,
    pub reading: bool,
}

impl NewBook {
    pub fn is_finished(&self) -> bool {
        self.read_page == self.page_count
    }

    pub(crate) fn into_book(self, id: String, now: OffsetDateTime) -> Book {
        Book {
            id,
            finished: self.is_finished(),
            name: self.name,
            year: self.year,
            author: self.author,
            summary: self.summary,
            publisher: self.publisher,
            page_count: self.page_count,
            read_page: self.read_page,
            reading: self.reading,
            inserted_at: now,
            updated_at: now,
        }
    }
}

/// Projection returned by the list endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BookSummary {
    pub id: String,
    pub name: String,
    pub publisher: String,
}

impl From<&Book> for BookSummary {
    fn from(book: &Book) -> Self {
        Self {
            id: book.id.clone(),
            name: book.name.clone(),
            publisher: book.publisher.clone(),
        }
    }
}

/// Query-string filters for listing books. All supplied filters must match.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BookFilter {
    /// Case-insensitive substring of the name
    pub name: Option<String>,
    /// Any value, `false` and `0` included, keeps only books being read
    pub reading: Option<String>,
    /// `"1"` keeps finished books, any other value keeps unfinished ones
    pub finished: Option<String>,
}

impl BookFilter {
    pub fn matches(&self, book: &Book) -> bool {
        if let Some(name) = &self.name {
            if !book.name.to_lowercase().contains(&name.to_lowercase()) {
                return false;
            }
        }

        if self.reading.is_some() && !book.reading {
            return false;
        }

        if let Some(finished) = &self.finished {
            if book.finished != (finished == "1") {
                return false;
            }
        }

        true
    }
}

/// `data` of a successful create.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedBook {
    pub book_id: String,
}

/// `data` of a successful list.
#[derive(Debug, Serialize)]
pub struct BookList {
    pub books: Vec<BookSummary>,
}

/// `data` of a successful detail lookup.
#[derive(Debug, Serialize)]
pub struct BookDetail {
    pub book: Book,
}
