//! In-memory book collection.

use crate::utils::{Clock, IdGenerator};

use super::error::BookError;
use super::models::{Book, BookFilter, BookPayload, BookSummary};

/// Ordered collection of books. Records keep their insertion position for
/// their whole lifetime; lookups are linear scans.
pub struct BookStore {
    books: Vec<Book>,
    ids: Box<dyn IdGenerator>,
    clock: Box<dyn Clock>,
}

impl BookStore {
    pub fn new(ids: impl IdGenerator + 'static, clock: impl Clock + 'static) -> Self {
        Self {
            books: Vec::new(),
            ids: Box::new(ids),
            clock: Box::new(clock),
        }
    }

    /// Validate `payload` and append it as a new book, returning its id.
    pub fn create(&mut self, payload: BookPayload) -> Result<String, BookError> {
        let new_book = payload.validate()?;
        let id = self.ids.generate();
        let now = self.clock.now();

        self.books.push(new_book.into_book(id.clone(), now));

        if self.position(&id).is_none() {
            return Err(BookError::NotPersisted { id });
        }

        Ok(id)
    }

    /// Summaries of the books matching every filter, in collection order.
    pub fn list(&self, filter: &BookFilter) -> Vec<BookSummary> {
        self.books
            .iter()
            .filter(|book| filter.matches(book))
            .map(BookSummary::from)
            .collect()
    }

    pub fn get(&self, id: &str) -> Result<&Book, BookError> {
        self.books
            .iter()
            .find(|book| book.id == id)
            .ok_or_else(|| BookError::not_found(id))
    }

    /// Replace every field of book `id` except its id and insertion time.
    ///
    /// The payload is validated before the lookup, so an invalid payload for
    /// an unknown id reports the validation failure.
    pub fn update(&mut self, id: &str, payload: BookPayload) -> Result<&Book, BookError> {
        let changes = payload.validate()?;
        let now = self.clock.now();

        let book = self
            .books
            .iter_mut()
            .find(|book| book.id == id)
            .ok_or_else(|| BookError::not_found(id))?;
        book.apply(changes, now);

        Ok(book)
    }

    /// Remove book `id`, keeping the order of the others.
    pub fn delete(&mut self, id: &str) -> Result<Book, BookError> {
        let index = self.position(id).ok_or_else(|| BookError::not_found(id))?;
        Ok(self.books.remove(index))
    }

    pub fn len(&self) -> usize {
        self.books.len()
    }

    pub fn is_empty(&self) -> bool {
        self.books.is_empty()
    }

    /// Drop every book, returning how many there were.
    pub fn clear(&mut self) -> usize {
        let count = self.books.len();
        self.books.clear();
        count
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.books.iter().position(|book| book.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::ManualClock;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use time::{macros::datetime, Duration};

    /// Ids `book-1`, `book-2`, ...
    #[derive(Default)]
    struct SequentialIds(AtomicUsize);

    impl IdGenerator for SequentialIds {
        fn generate(&self) -> String {
            format!("book-{}", self.0.fetch_add(1, Ordering::SeqCst) + 1)
        }
    }

    /// Always hands out the same id.
    struct FixedId;

    impl IdGenerator for FixedId {
        fn generate(&self) -> String {
            "dup".to_string()
        }
    }

    fn store() -> (BookStore, ManualClock) {
        let clock = ManualClock::new(datetime!(2024-03-01 8:00 UTC));
        (BookStore::new(SequentialIds::default(), clock.clone()), clock)
    }

    fn payload(name: &str, page_count: u32, read_page: u32) -> BookPayload {
        BookPayload {
            name: Some(name.to_string()),
            page_count,
            read_page,
            ..BookPayload::default()
        }
    }

    fn full_payload() -> BookPayload {
        BookPayload {
            name: Some("Buku A".to_string()),
            year: 2010,
            author: "John Doe".to_string(),
            summary: "Lorem ipsum dolor sit amet".to_string(),
            publisher: "Dicoding Indonesia".to_string(),
            page_count: 100,
            read_page: 25,
            reading: true,
        }
    }

    #[test]
    fn create_then_get_returns_input_plus_derived_fields() {
        let (mut store, _) = store();

        let id = store.create(full_payload()).unwrap();
        let book = store.get(&id).unwrap();

        assert_eq!(id, "book-1");
        assert_eq!(book.id, id);
        assert_eq!(book.name, "Buku A");
        assert_eq!(book.year, 2010);
        assert_eq!(book.author, "John Doe");
        assert_eq!(book.summary, "Lorem ipsum dolor sit amet");
        assert_eq!(book.publisher, "Dicoding Indonesia");
        assert_eq!(book.page_count, 100);
        assert_eq!(book.read_page, 25);
        assert!(book.reading);
        assert!(!book.finished);
        assert_eq!(book.inserted_at, datetime!(2024-03-01 8:00 UTC));
        assert_eq!(book.updated_at, book.inserted_at);
    }

    #[test]
    fn create_marks_fully_read_books_finished() {
        let (mut store, _) = store();
        let id = store.create(payload("Rust", 100, 100)).unwrap();
        assert!(store.get(&id).unwrap().finished);
    }

    #[test]
    fn invalid_create_leaves_store_untouched() {
        let (mut store, _) = store();

        assert_eq!(
            store.create(payload("", 10, 5)).unwrap_err(),
            BookError::MissingName
        );
        assert_eq!(
            store.create(payload("X", 10, 20)).unwrap_err(),
            BookError::ReadPageExceedsPageCount {
                read_page: 20,
                page_count: 10
            }
        );
        assert!(store.is_empty());
    }

    #[test]
    fn create_appends_in_insertion_order() {
        let (mut store, _) = store();
        for name in ["A", "B", "C"] {
            store.create(payload(name, 1, 0)).unwrap();
        }

        let names: Vec<_> = store
            .list(&BookFilter::default())
            .into_iter()
            .map(|summary| summary.name)
            .collect();
        assert_eq!(names, ["A", "B", "C"]);
    }

    #[test]
    fn duplicate_ids_are_not_retried() {
        let mut store = BookStore::new(FixedId, ManualClock::new(datetime!(2024-01-01 0:00 UTC)));
        store.create(payload("A", 1, 1)).unwrap();
        store.create(payload("B", 1, 1)).unwrap();

        assert_eq!(store.len(), 2);
        assert_eq!(store.get("dup").unwrap().name, "A");
    }

    #[test]
    fn list_returns_summaries_matching_all_filters() {
        let (mut store, _) = store();
        let mut reading = payload("Perang Dunia", 10, 10);
        reading.reading = true;
        reading.publisher = "Gramedia".to_string();
        store.create(reading).unwrap();
        store.create(payload("Star Wars", 10, 10)).unwrap();
        let mut unfinished = payload("Warkop", 10, 2);
        unfinished.reading = true;
        store.create(unfinished).unwrap();

        let filter = BookFilter {
            name: Some("PERANG".to_string()),
            reading: Some("0".to_string()),
            finished: Some("1".to_string()),
        };
        assert_eq!(
            store.list(&filter),
            vec![BookSummary {
                id: "book-1".to_string(),
                name: "Perang Dunia".to_string(),
                publisher: "Gramedia".to_string(),
            }]
        );

        let war = BookFilter {
            name: Some("war".to_string()),
            ..BookFilter::default()
        };
        let ids: Vec<_> = store.list(&war).into_iter().map(|s| s.id).collect();
        assert_eq!(ids, ["book-2", "book-3"]);
    }

    #[test]
    fn list_on_empty_store_is_empty() {
        let (store, _) = store();
        assert!(store.list(&BookFilter::default()).is_empty());
    }

    #[test]
    fn get_unknown_id_is_not_found() {
        let (store, _) = store();
        assert_eq!(
            store.get("missing").unwrap_err(),
            BookError::NotFound {
                id: "missing".to_string()
            }
        );
    }

    #[test]
    fn update_replaces_fields_and_keeps_identity() {
        let (mut store, clock) = store();
        store.create(payload("First", 1, 0)).unwrap();
        let id = store.create(full_payload()).unwrap();
        store.create(payload("Last", 1, 0)).unwrap();

        clock.advance(Duration::minutes(5));
        let mut changes = payload("Buku B", 50, 50);
        changes.reading = false;
        let book = store.update(&id, changes).unwrap().clone();

        assert_eq!(book.id, id);
        assert_eq!(book.name, "Buku B");
        assert_eq!(book.author, "");
        assert_eq!(book.page_count, 50);
        assert!(book.finished);
        assert!(!book.reading);
        assert_eq!(book.inserted_at, datetime!(2024-03-01 8:00 UTC));
        assert_eq!(book.updated_at, datetime!(2024-03-01 8:05 UTC));

        let names: Vec<_> = store
            .list(&BookFilter::default())
            .into_iter()
            .map(|summary| summary.name)
            .collect();
        assert_eq!(names, ["First", "Buku B", "Last"]);
    }

    #[test]
    fn update_recomputes_finished_both_ways() {
        let (mut store, _) = store();
        let id = store.create(payload("A", 10, 10)).unwrap();

        assert!(!store.update(&id, payload("A", 10, 9)).unwrap().finished);
        assert!(store.update(&id, payload("A", 9, 9)).unwrap().finished);
    }

    #[test]
    fn update_validates_before_lookup() {
        let (mut store, _) = store();

        assert_eq!(
            store.update("missing", payload("", 1, 1)).unwrap_err(),
            BookError::MissingName
        );
        assert_eq!(
            store.update("missing", payload("Y", 1, 2)).unwrap_err(),
            BookError::ReadPageExceedsPageCount {
                read_page: 2,
                page_count: 1
            }
        );
        assert_eq!(
            store.update("missing", payload("Y", 1, 1)).unwrap_err(),
            BookError::not_found("missing")
        );
    }

    #[test]
    fn rejected_update_changes_nothing() {
        let (mut store, clock) = store();
        let id = store.create(full_payload()).unwrap();
        let before = store.get(&id).unwrap().clone();

        clock.advance(Duration::seconds(1));
        assert!(store.update(&id, payload("Z", 1, 2)).is_err());

        assert_eq!(store.get(&id).unwrap(), &before);
    }

    #[test]
    fn delete_removes_and_preserves_order() {
        let (mut store, _) = store();
        let a = store.create(payload("A", 1, 0)).unwrap();
        let b = store.create(payload("B", 1, 0)).unwrap();
        let c = store.create(payload("C", 1, 0)).unwrap();

        let removed = store.delete(&b).unwrap();

        assert_eq!(removed.name, "B");
        assert_eq!(store.get(&b).unwrap_err(), BookError::not_found(&b));
        let ids: Vec<_> = store
            .list(&BookFilter::default())
            .into_iter()
            .map(|s| s.id)
            .collect();
        assert_eq!(ids, [a, c]);
    }

    #[test]
    fn delete_unknown_id_is_not_found() {
        let (mut store, _) = store();
        store.create(payload("A", 1, 0)).unwrap();

        assert_eq!(
            store.delete("missing").unwrap_err(),
            BookError::not_found("missing")
        );
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn clear_reports_removed_count() {
        let (mut store, _) = store();
        store.create(payload("A", 1, 0)).unwrap();
        store.create(payload("B", 1, 0)).unwrap();

        assert_eq!(store.clear(), 2);
        assert!(store.is_empty());
    }
}
