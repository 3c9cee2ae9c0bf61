//! In-memory book catalog.
//!
//! Records live behind a reader/writer lock. `create` holds the write lock
//! across id assignment and the append, so concurrent creates never share an
//! id and readers never see a half-inserted book.

use std::collections::HashSet;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use thiserror::Error;

use super::models::{Book, BookInput, Violation};

/// Failures reported by catalog operations.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("book {id} not found")]
    NotFound { id: i64 },

    #[error(
        "book failed validation: {}",
        .0.iter().map(ToString::to_string).collect::<Vec<_>>().join(", ")
    )]
    ValidationFailed(Vec<Violation>),

    #[error("duplicate book id {id}")]
    DuplicateId { id: i64 },

    #[error("no book ids left to assign")]
    IdSpaceExhausted,
}

/// The catalog of books, in insertion order.
#[derive(Debug, Default)]
pub struct BookCatalog {
    books: RwLock<Vec<Book>>,
}

impl BookCatalog {
    /// An empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// A catalog holding the fixed startup records.
    pub fn seeded() -> Self {
        Self {
            books: RwLock::new(seed_books()),
        }
    }

    /// Build a catalog from existing records, keeping their ids and order.
    ///
    /// Every record must pass field validation and ids must be unique.
    pub fn from_books(books: Vec<Book>) -> Result<Self, CatalogError> {
        let mut seen = HashSet::with_capacity(books.len());
        for book in &books {
            book.validate().map_err(CatalogError::ValidationFailed)?;
            if !seen.insert(book.id) {
                return Err(CatalogError::DuplicateId { id: book.id });
            }
        }

        Ok(Self {
            books: RwLock::new(books),
        })
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// Every book, in insertion order.
    pub fn list_all(&self) -> Vec<Book> {
        self.read().clone()
    }

    /// The book with the given id.
    pub fn get_by_id(&self, id: i64) -> Result<Book, CatalogError> {
        self.read()
            .iter()
            .find(|book| book.id == id)
            .cloned()
            .ok_or(CatalogError::NotFound { id })
    }

    /// Books whose rating equals `rating`. Out-of-range values simply match nothing.
    pub fn list_by_rating(&self, rating: i64) -> Vec<Book> {
        self.filter(|book| book.rating == rating)
    }

    /// Books published in `year`. Out-of-range values simply match nothing.
    pub fn list_by_published_date(&self, year: i64) -> Vec<Book> {
        self.filter(|book| book.published_date == year)
    }

    /// Validate `candidate`, assign it the next id and append it.
    ///
    /// The next id is one past the current maximum (1 for an empty catalog).
    /// On any error the catalog is left untouched.
    pub fn create(&self, candidate: BookInput) -> Result<Book, CatalogError> {
        if let Err(violations) = candidate.validate() {
            tracing::warn!(
                violations = violations.len(),
                fields = ?violations.iter().map(|v| v.field).collect::<Vec<_>>(),
                "rejected book"
            );
            return Err(CatalogError::ValidationFailed(violations));
        }

        let mut books = self.write();
        let id = match books.iter().map(|book| book.id).max() {
            Some(max) => max.checked_add(1).ok_or(CatalogError::IdSpaceExhausted)?,
            None => 1,
        };

        let book = candidate.into_book(id);
        books.push(book.clone());
        drop(books);

        tracing::info!(id = book.id, title = %book.title, "book created");
        Ok(book)
    }

    fn filter(&self, predicate: impl Fn(&Book) -> bool) -> Vec<Book> {
        self.read()
            .iter()
            .filter(|book| predicate(book))
            .cloned()
            .collect()
    }

    // A panic while holding the lock cannot leave the Vec half-written, so a
    // poisoned lock is still safe to use.
    fn read(&self) -> RwLockReadGuard<'_, Vec<Book>> {
        self.books.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Vec<Book>> {
        self.books.write().unwrap_or_else(PoisonError::into_inner)
    }
}

fn seed_books() -> Vec<Book> {
    [
        (1, "Computer Science Pro", "Ada Sterling", "A very nice book!", 5, 2030),
        (2, "Be Fast with Async", "Ada Sterling", "A great book!", 5, 2030),
        (3, "Master Endpoints", "Ada Sterling", "An awesome book!", 5, 2029),
        (4, "Ownership Explained", "Lin Okafor", "Book Description", 2, 2028),
        (5, "Borrowing in Practice", "Mara Quist", "Book Description", 3, 2027),
        (6, "Lifetimes Untangled", "Theo Brandt", "Book Description", 1, 2026),
    ]
    .into_iter()
    .map(
        |(id, title, author, description, rating, published_date)| Book {
            id,
            title: title.to_string(),
            author: author.to_string(),
            description: description.to_string(),
            rating,
            published_date,
        },
    )
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn input(title: &str, rating: i64, published_date: i64) -> BookInput {
        BookInput {
            title: title.to_string(),
            author: "Test Author".to_string(),
            description: "Test Description".to_string(),
            rating,
            published_date,
        }
    }

    fn ids(books: &[Book]) -> Vec<i64> {
        books.iter().map(|book| book.id).collect()
    }

    #[test]
    fn seed_data_satisfies_every_invariant() {
        let catalog = BookCatalog::from_books(seed_books()).unwrap();
        assert!(!catalog.is_empty());
        assert_eq!(ids(&catalog.list_all()), vec![1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn get_by_id_finds_seeded_book() {
        let catalog = BookCatalog::seeded();
        let book = catalog.get_by_id(1).unwrap();
        assert_eq!(book.id, 1);
        assert_eq!(book.title, "Computer Science Pro");
    }

    #[test]
    fn get_by_id_reports_missing_book() {
        let catalog = BookCatalog::seeded();
        match catalog.get_by_id(999) {
            Err(CatalogError::NotFound { id }) => assert_eq!(id, 999),
            other => panic!("expected NotFound, got {:?}", other),
        }
    }

    #[test]
    fn list_by_rating_returns_exactly_matching_books() {
        let catalog = BookCatalog::seeded();
        let books = catalog.list_by_rating(5);
        assert_eq!(ids(&books), vec![1, 2, 3]);
        assert!(books.iter().all(|book| book.rating == 5));

        let expected: Vec<i64> = catalog
            .list_all()
            .iter()
            .filter(|book| book.rating == 5)
            .map(|book| book.id)
            .collect();
        assert_eq!(ids(&books), expected);
    }

    #[test]
    fn filters_accept_out_of_range_values() {
        let catalog = BookCatalog::seeded();
        assert!(catalog.list_by_rating(42).is_empty());
        assert!(catalog.list_by_rating(-1).is_empty());
        assert!(catalog.list_by_published_date(1066).is_empty());
    }

    #[test]
    fn list_by_published_date_returns_exactly_matching_books() {
        let catalog = BookCatalog::seeded();
        assert_eq!(ids(&catalog.list_by_published_date(2030)), vec![1, 2]);
        assert_eq!(ids(&catalog.list_by_published_date(2026)), vec![6]);
    }

    #[test]
    fn reads_are_idempotent() {
        let catalog = BookCatalog::seeded();
        assert_eq!(catalog.list_all(), catalog.list_all());
    }

    #[test]
    fn create_assigns_next_id_and_appends() {
        let catalog = BookCatalog::seeded();
        let before = catalog.len();

        let book = catalog.create(input("Test Book", 4, 2024)).unwrap();
        assert_eq!(book.id, 7);
        assert_eq!(book.validate(), Ok(()));
        assert_eq!(catalog.len(), before + 1);
        assert_eq!(catalog.list_all().last(), Some(&book));
        assert_eq!(catalog.get_by_id(7).unwrap(), book);
    }

    #[test]
    fn create_uses_max_id_not_length() {
        let mut sparse = seed_books();
        sparse.retain(|book| book.id == 2 || book.id == 5);
        let catalog = BookCatalog::from_books(sparse).unwrap();

        let book = catalog.create(input("Test Book", 4, 2024)).unwrap();
        assert_eq!(book.id, 6);
    }

    #[test]
    fn create_in_empty_catalog_starts_at_one() {
        let catalog = BookCatalog::new();
        assert!(catalog.is_empty());
        assert_eq!(catalog.create(input("First", 3, 2010)).unwrap().id, 1);
        assert_eq!(catalog.create(input("Second", 3, 2010)).unwrap().id, 2);
    }

    #[test]
    fn rejected_create_leaves_catalog_unchanged() {
        let catalog = BookCatalog::seeded();
        let before = catalog.list_all();

        let candidate = BookInput {
            title: "AB".to_string(),
            author: String::new(),
            description: "Test".to_string(),
            rating: 6,
            published_date: 1999,
        };
        match catalog.create(candidate) {
            Err(CatalogError::ValidationFailed(violations)) => {
                let fields: Vec<_> = violations.iter().map(|v| v.field).collect();
                assert_eq!(fields, vec!["title", "author", "rating", "published_date"]);
            }
            other => panic!("expected ValidationFailed, got {:?}", other),
        }

        assert_eq!(catalog.list_all(), before);
    }

    #[test]
    fn from_books_rejects_duplicate_ids() {
        let mut books = seed_books();
        books[1].id = 1;
        match BookCatalog::from_books(books) {
            Err(CatalogError::DuplicateId { id }) => assert_eq!(id, 1),
            other => panic!("expected DuplicateId, got {:?}", other),
        }
    }

    #[test]
    fn from_books_rejects_invalid_records() {
        let mut books = seed_books();
        books[0].rating = 9;
        assert!(matches!(
            BookCatalog::from_books(books),
            Err(CatalogError::ValidationFailed(_))
        ));
    }

    #[test]
    fn create_reports_exhausted_id_space() {
        let mut books = seed_books();
        books.truncate(1);
        books[0].id = i64::MAX;
        let catalog = BookCatalog::from_books(books).unwrap();

        assert!(matches!(
            catalog.create(input("Test Book", 4, 2024)),
            Err(CatalogError::IdSpaceExhausted)
        ));
        assert_eq!(catalog.len(), 1);
    }

    #[test]
    fn validation_error_message_lists_violations() {
        let catalog = BookCatalog::new();
        let err = catalog.create(input("AB", 4, 2024)).unwrap_err();
        assert_eq!(
            err.to_string(),
            "book failed validation: title must be at least 3 characters"
        );
    }

    #[test]
    fn concurrent_creates_get_unique_ids() {
        let catalog = Arc::new(BookCatalog::seeded());

        std::thread::scope(|scope| {
            for worker in 0..8 {
                let catalog = &catalog;
                scope.spawn(move || {
                    for n in 0..25 {
                        catalog
                            .create(input(&format!("Book {worker}-{n}"), 3, 2020))
                            .unwrap();
                    }
                });
            }
        });

        let all = catalog.list_all();
        assert_eq!(all.len(), 6 + 8 * 25);
        let unique: HashSet<i64> = all.iter().map(|book| book.id).collect();
        assert_eq!(unique.len(), all.len());
        assert_eq!(unique.iter().max(), Some(&(all.len() as i64)));
    }
}
