//! Catalog store: books and their shelf stock

use indexmap::IndexMap;
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::book::{Book, BookQuery, CreateBook, StockInput, UpdateBook, DEFAULT_CATEGORY},
};

#[derive(Debug, Default)]
pub struct BooksRepository {
    books: IndexMap<String, Book>,
    next_id: u64,
}

impl BooksRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate and register a new book
    pub fn create(&mut self, book: CreateBook) -> AppResult<Book> {
        let book = book.normalized();
        book.validate()?;
        let stock = book.stock.parse()?;

        self.next_id += 1;
        let book = Book {
            id: format!("B{}", self.next_id),
            title: book.title,
            author: book.author,
            category: book.category.unwrap_or_else(|| DEFAULT_CATEGORY.to_string()),
            isbn: book.isbn,
            description: book.description,
            stock,
        };
        self.books.insert(book.id.clone(), book.clone());
        Ok(book)
    }

    /// Edit a book's details or shelf stock. The whole edit is validated
    /// before the stored book changes.
    pub fn update(&mut self, id: &str, update: UpdateBook) -> AppResult<Book> {
        let update = update.normalized();
        update.validate()?;
        let stock = update.stock.as_ref().map(StockInput::parse).transpose()?;

        let book = self
            .books
            .get_mut(id)
            .ok_or_else(|| AppError::NotFound(format!("Book {} not found", id)))?;
        if let Some(title) = update.title {
            book.title = title;
        }
        if let Some(author) = update.author {
            book.author = author;
        }
        if let Some(category) = update.category {
            book.category = category;
        }
        if let Some(isbn) = update.isbn {
            book.isbn = Some(isbn).filter(|v| !v.is_empty());
        }
        if let Some(description) = update.description {
            book.description = Some(description).filter(|v| !v.is_empty());
        }
        if let Some(stock) = stock {
            book.stock = stock;
        }
        Ok(book.clone())
    }

    pub fn get(&self, id: &str) -> Option<&Book> {
        self.books.get(id)
    }

    /// Get book by ID
    pub fn get_by_id(&self, id: &str) -> AppResult<&Book> {
        self.books
            .get(id)
            .ok_or_else(|| AppError::NotFound(format!("Book {} not found", id)))
    }

    /// Take one copy off the shelf, returning the remaining stock
    pub fn decrement_stock(&mut self, id: &str) -> AppResult<u32> {
        let book = self
            .books
            .get_mut(id)
            .ok_or_else(|| AppError::NotFound(format!("Book {} not found", id)))?;
        if book.stock == 0 {
            return Err(AppError::OutOfStock(format!("No copies of {} left", book.id)));
        }
        book.stock -= 1;
        Ok(book.stock)
    }

    /// Put one copy back on the shelf, returning the new stock
    pub fn increment_stock(&mut self, id: &str) -> AppResult<u32> {
        let book = self
            .books
            .get_mut(id)
            .ok_or_else(|| AppError::NotFound(format!("Book {} not found", id)))?;
        book.stock = book
            .stock
            .checked_add(1)
            .ok_or_else(|| AppError::Internal(format!("Stock overflow for {}", id)))?;
        Ok(book.stock)
    }

    /// Books matching `query`, in insertion order
    pub fn search<'a>(&'a self, query: &'a BookQuery) -> impl Iterator<Item = &'a Book> + 'a {
        self.books.values().filter(move |book| book.matches(query))
    }

    /// Sum of shelf stock across the catalog
    pub fn total_stock(&self) -> u64 {
        self.books.values().map(|b| u64::from(b.stock)).sum()
    }

    pub fn len(&self) -> usize {
        self.books.len()
    }

    pub fn is_empty(&self) -> bool {
        self.books.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_assigns_ids_and_defaults() {
        let mut repo = BooksRepository::new();
        let first = repo.create(CreateBook::new("Dune", "Frank Herbert", "Fiction", 2)).unwrap();
        let second = repo.create(CreateBook::new(" SICP ", " Abelson ", "  ", 1)).unwrap();
        assert_eq!(first.id, "B1");
        assert_eq!(second.id, "B2");
        assert_eq!(second.title, "SICP");
        assert_eq!(second.category, DEFAULT_CATEGORY);
        assert_eq!(repo.total_stock(), 3);
    }

    #[test]
    fn test_create_rejects_blank_fields() {
        let mut repo = BooksRepository::new();
        let err = repo.create(CreateBook::new("   ", "Someone", "x", 1)).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        let err = repo.create(CreateBook::new("Title", "", "x", 1)).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert!(repo.is_empty());
    }

    #[test]
    fn test_create_rejects_bad_stock() {
        let mut repo = BooksRepository::new();
        let mut book = CreateBook::new("Title", "Author", "x", 0);
        book.stock = StockInput::Count(-2);
        assert!(matches!(repo.create(book.clone()), Err(AppError::Validation(_))));
        book.stock = StockInput::Text("many".into());
        assert!(matches!(repo.create(book), Err(AppError::Validation(_))));
        assert!(repo.is_empty());
    }

    #[test]
    fn test_stock_moves() {
        let mut repo = BooksRepository::new();
        let book = repo.create(CreateBook::new("Dune", "Frank Herbert", "Fiction", 1)).unwrap();

        assert_eq!(repo.decrement_stock(&book.id), Ok(0));
        assert!(matches!(repo.decrement_stock(&book.id), Err(AppError::OutOfStock(_))));
        assert_eq!(repo.get(&book.id).unwrap().stock, 0);
        assert_eq!(repo.increment_stock(&book.id), Ok(1));

        assert!(matches!(repo.decrement_stock("B99"), Err(AppError::NotFound(_))));
        assert!(matches!(repo.increment_stock("B99"), Err(AppError::NotFound(_))));
    }

    #[test]
    fn test_update_details_and_restock() {
        let mut repo = BooksRepository::new();
        let book = repo.create(CreateBook::new("Dune", "Frank Herbert", "Fiction", 0)).unwrap();

        let updated = repo
            .update(
                &book.id,
                UpdateBook {
                    title: Some(" Dune Messiah ".into()),
                    stock: Some(StockInput::Text("4".into())),
                    description: Some("Sequel".into()),
                    ..UpdateBook::default()
                },
            )
            .unwrap();
        assert_eq!(updated.title, "Dune Messiah");
        assert_eq!(updated.author, "Frank Herbert");
        assert_eq!(updated.stock, 4);
        assert_eq!(updated.description.as_deref(), Some("Sequel"));

        let cleared = repo
            .update(&book.id, UpdateBook { description: Some("  ".into()), ..UpdateBook::default() })
            .unwrap();
        assert_eq!(cleared.description, None);
        assert_eq!(repo.get(&book.id), Some(&cleared));
    }

    #[test]
    fn test_update_is_validated_before_applying() {
        let mut repo = BooksRepository::new();
        let book = repo.create(CreateBook::new("Dune", "Frank Herbert", "Fiction", 2)).unwrap();

        let invalid = [
            UpdateBook { title: Some("  ".into()), stock: Some(StockInput::Count(5)), ..UpdateBook::default() },
            UpdateBook { author: Some(String::new()), ..UpdateBook::default() },
            UpdateBook { title: Some("New".into()), stock: Some(StockInput::Count(-1)), ..UpdateBook::default() },
            UpdateBook { stock: Some(StockInput::Invalid(serde_json::Value::Bool(true))), ..UpdateBook::default() },
        ];
        for update in invalid {
            assert!(matches!(repo.update(&book.id, update), Err(AppError::Validation(_))));
        }
        assert_eq!(repo.get(&book.id), Some(&book));

        assert!(matches!(
            repo.update("B99", UpdateBook::default()),
            Err(AppError::NotFound(_))
        ));
    }
}
