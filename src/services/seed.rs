//! Demo catalog loaded when `circulation.seed_demo_data` is set

use crate::{error::AppResult, models::book::CreateBook, services::circulation::CirculationDesk};

const DEMO_BOOKS: &[(&str, &str, &str, u32, &str)] = &[
    ("Clean Code", "Robert C. Martin", "Programming", 5, "978-0132350884"),
    ("The Pragmatic Programmer", "Andrew Hunt", "Programming", 3, "978-0135957059"),
    ("Introduction to Algorithms", "Thomas H. Cormen", "Computer Science", 4, "978-0262033848"),
    ("Design Patterns", "Erich Gamma", "Software Engineering", 3, "978-0201633610"),
    ("Python Crash Course", "Eric Matthes", "Programming", 6, "978-1593279288"),
    ("Database System Concepts", "Abraham Silberschatz", "Database", 4, "978-0078022159"),
    ("Computer Networks", "Andrew S. Tanenbaum", "Networking", 3, "978-0132126953"),
    ("Artificial Intelligence: A Modern Approach", "Stuart Russell", "Artificial Intelligence", 5, "978-0134610993"),
];

/// Add the demo books to the desk, returning how many were added
pub fn seed_demo_catalog(desk: &mut CirculationDesk) -> AppResult<usize> {
    for (title, author, category, stock, isbn) in DEMO_BOOKS {
        let mut book = CreateBook::new(title, author, category, *stock);
        book.isbn = Some(isbn.to_string());
        desk.add_book(book)?;
    }
    tracing::info!("Seeded {} demo books", DEMO_BOOKS.len());
    Ok(DEMO_BOOKS.len())
}
