//! Book (catalog entry) model and related types

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::error::{AppError, AppResult};

/// Category assigned when a book is created without one
pub const DEFAULT_CATEGORY: &str = "General";

/// Book held by the catalog. `stock` counts copies not currently on loan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    pub id: String,
    pub title: String,
    pub author: String,
    pub category: String,
    pub isbn: Option<String>,
    pub description: Option<String>,
    pub stock: u32,
}

impl Book {
    pub fn is_available(&self) -> bool {
        self.stock > 0
    }

    pub fn stock_level(&self) -> StockLevel {
        StockLevel::from_stock(self.stock)
    }

    /// Case-insensitive substring match on id, title, author and category.
    /// `needle` must already be lowercase.
    fn matches_text(&self, needle: &str) -> bool {
        [&self.id, &self.title, &self.author, &self.category]
            .iter()
            .any(|field| field.to_lowercase().contains(needle))
    }

    pub fn matches(&self, query: &BookQuery) -> bool {
        if let Some(ref category) = query.category {
            if !self.category.eq_ignore_ascii_case(category.trim()) {
                return false;
            }
        }
        if query.available == Some(true) && !self.is_available() {
            return false;
        }
        match query.q.as_deref().map(str::trim) {
            Some(q) if !q.is_empty() => self.matches_text(&q.to_lowercase()),
            _ => true,
        }
    }
}

/// Coarse availability label shown on inventory cards
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum StockLevel {
    /// More than two copies on the shelf
    Available,
    /// One or two copies left
    Low,
    Out,
}

impl StockLevel {
    pub fn from_stock(stock: u32) -> Self {
        match stock {
            0 => StockLevel::Out,
            1 | 2 => StockLevel::Low,
            _ => StockLevel::Available,
        }
    }
}

/// Book as returned to clients
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BookView {
    pub id: String,
    pub title: String,
    pub author: String,
    pub category: String,
    pub isbn: Option<String>,
    pub description: Option<String>,
    /// Copies available for loan
    pub stock: u32,
    pub is_available: bool,
    pub stock_level: StockLevel,
}

impl From<&Book> for BookView {
    fn from(book: &Book) -> Self {
        Self {
            id: book.id.clone(),
            title: book.title.clone(),
            author: book.author.clone(),
            category: book.category.clone(),
            isbn: book.isbn.clone(),
            description: book.description.clone(),
            stock: book.stock,
            is_available: book.is_available(),
            stock_level: book.stock_level(),
        }
    }
}

/// Stock as submitted by a form: a JSON number, text, or anything else,
/// which is rejected when parsed.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum StockInput {
    Count(i64),
    Fraction(f64),
    Text(String),
    Invalid(serde_json::Value),
}

impl Default for StockInput {
    /// Missing field
    fn default() -> Self {
        StockInput::Invalid(serde_json::Value::Null)
    }
}

impl StockInput {
    /// Parse into a copy count, rejecting negative, fractional and non-numeric values
    pub fn parse(&self) -> AppResult<u32> {
        let count = match self {
            StockInput::Count(n) => *n,
            StockInput::Fraction(_) => {
                return Err(AppError::Validation("Stock must be a whole number".to_string()))
            }
            StockInput::Text(text) => text.trim().parse::<i64>().map_err(|_| {
                AppError::Validation(format!("Stock must be a number, got '{}'", text))
            })?,
            StockInput::Invalid(serde_json::Value::Null) => {
                return Err(AppError::Validation("Stock is required".to_string()))
            }
            StockInput::Invalid(other) => {
                return Err(AppError::Validation(format!("Stock must be a number, got {}", other)))
            }
        };
        if count < 0 {
            return Err(AppError::Validation("Stock must be >= 0".to_string()));
        }
        u32::try_from(count).map_err(|_| AppError::Validation("Stock is too large".to_string()))
    }
}

impl From<u32> for StockInput {
    fn from(count: u32) -> Self {
        StockInput::Count(i64::from(count))
    }
}

/// Create book request
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateBook {
    #[serde(default)]
    #[validate(length(min = 1, max = 200, message = "Title is required"))]
    pub title: String,
    #[serde(default)]
    #[validate(length(min = 1, max = 100, message = "Author is required"))]
    pub author: String,
    #[serde(default)]
    pub category: Option<String>,
    /// Initial number of copies (number or numeric string)
    #[serde(default)]
    #[schema(value_type = i64)]
    pub stock: StockInput,
    #[serde(default)]
    pub isbn: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

impl CreateBook {
    pub fn new(title: &str, author: &str, category: &str, stock: u32) -> Self {
        Self {
            title: title.to_string(),
            author: author.to_string(),
            category: Some(category.to_string()),
            stock: StockInput::from(stock),
            isbn: None,
            description: None,
        }
    }

    /// Trim text fields and drop blank optional ones
    pub fn normalized(self) -> Self {
        let non_blank = |value: Option<String>| {
            value
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        Self {
            title: self.title.trim().to_string(),
            author: self.author.trim().to_string(),
            category: non_blank(self.category),
            stock: self.stock,
            isbn: non_blank(self.isbn),
            description: non_blank(self.description),
        }
    }
}

/// Update book request. Absent fields are left unchanged; a blank isbn or
/// description clears it.
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateBook {
    #[validate(length(min = 1, max = 200, message = "Title must not be blank"))]
    pub title: Option<String>,
    #[validate(length(min = 1, max = 100, message = "Author must not be blank"))]
    pub author: Option<String>,
    #[validate(length(min = 1, max = 100, message = "Category must not be blank"))]
    pub category: Option<String>,
    /// Copies on the shelf (number or numeric string)
    #[schema(value_type = Option<i64>)]
    pub stock: Option<StockInput>,
    pub isbn: Option<String>,
    pub description: Option<String>,
}

impl UpdateBook {
    /// Trim text fields
    pub fn normalized(self) -> Self {
        let trimmed = |value: Option<String>| value.map(|v| v.trim().to_string());
        Self {
            title: trimmed(self.title),
            author: trimmed(self.author),
            category: trimmed(self.category),
            stock: self.stock,
            isbn: trimmed(self.isbn),
            description: trimmed(self.description),
        }
    }
}

/// Catalog listing filters
#[derive(Debug, Default, Clone, Deserialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct BookQuery {
    /// Free-text search over id, title, author and category
    pub q: Option<String>,
    /// Exact category (case-insensitive)
    pub category: Option<String>,
    /// Only books with at least one copy on the shelf
    pub available: Option<bool>,
}
