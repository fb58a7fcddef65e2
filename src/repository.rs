//! Persistence of [`Book`]s in a SQLite `books` table.

use std::str::FromStr;

use serde::Deserialize;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};

use crate::types::book::{Book, BookUpdate, NewBook};

pub type RepositoryResult<T> = Result<T, RepositoryError>;

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    /// No row matches the isbn.
    #[error("book not found: {isbn}")]
    NotFound { isbn: String },
    /// A row with the isbn already exists.
    #[error("book already exists: {isbn}")]
    AlreadyExists { isbn: String },
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// SQLite connection URL, e.g. `sqlite://books.db` or `sqlite::memory:`.
    pub url: String,
    #[serde(default = "DatabaseConfig::default_max_connections")]
    pub max_connections: u32,
}

impl DatabaseConfig {
    pub fn new(url: String, max_connections: u32) -> Self {
        Self {
            url,
            max_connections,
        }
    }

    /// A private in-memory database. Lives as long as the pool.
    pub fn in_memory() -> Self {
        Self::new(String::from("sqlite::memory:"), 1)
    }

    fn default_max_connections() -> u32 {
        5
    }

    fn is_in_memory(&self) -> bool {
        self.url.contains(":memory:") || self.url.contains("mode=memory")
    }
}

const CREATE_BOOKS_TABLE: &str = "CREATE TABLE IF NOT EXISTS books (
    isbn TEXT PRIMARY KEY,
    amazon_url TEXT NOT NULL,
    author TEXT NOT NULL,
    language TEXT NOT NULL,
    pages INTEGER NOT NULL,
    publisher TEXT NOT NULL,
    title TEXT NOT NULL,
    year INTEGER NOT NULL
)";

const BOOK_COLUMNS: &str = "isbn, amazon_url, author, language, pages, publisher, title, year";

#[derive(Debug, Clone)]
pub struct BookRepository {
    pool: SqlitePool,
}

impl BookRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Opens the pool described by `config` and makes sure the `books` table exists.
    pub async fn connect(config: &DatabaseConfig) -> RepositoryResult<Self> {
        tracing::info!(url = %config.url, "Connecting to database");

        let options = SqliteConnectOptions::from_str(&config.url)?.create_if_missing(true);

        let mut pool_options = SqlitePoolOptions::new().max_connections(config.max_connections);

        // Every connection to `:memory:` opens its own database.
        if config.is_in_memory() {
            pool_options = pool_options
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None);
        }

        let pool = pool_options.connect_with(options).await?;

        let repository = Self::new(pool);
        repository.init_schema().await?;

        tracing::info!("Connected to database");

        Ok(repository)
    }

    async fn init_schema(&self) -> RepositoryResult<()> {
        sqlx::query(CREATE_BOOKS_TABLE).execute(&self.pool).await?;

        Ok(())
    }

    #[tracing::instrument(skip(self))]
    pub async fn list_books(&self) -> RepositoryResult<Vec<Book>> {
        let books = sqlx::query_as::<_, Book>(&format!(
            "SELECT {BOOK_COLUMNS} FROM books ORDER BY title, isbn"
        ))
        .fetch_all(&self.pool)
        .await?;

        tracing::debug!(count = books.len(), "Listed books");

        Ok(books)
    }

    #[tracing::instrument(skip(self))]
    pub async fn get_book(&self, isbn: &str) -> RepositoryResult<Book> {
        let book = sqlx::query_as::<_, Book>(&format!(
            "SELECT {BOOK_COLUMNS} FROM books WHERE isbn = ?1"
        ))
        .bind(isbn)
        .fetch_optional(&self.pool)
        .await?;

        book.ok_or_else(|| RepositoryError::NotFound {
            isbn: isbn.to_owned(),
        })
    }

    #[tracing::instrument(skip_all, fields(isbn = %book.isbn))]
    pub async fn create_book(&self, book: &NewBook) -> RepositoryResult<Book> {
        let created = sqlx::query_as::<_, Book>(&format!(
            "INSERT INTO books ({BOOK_COLUMNS})
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
             RETURNING {BOOK_COLUMNS}"
        ))
        .bind(&book.isbn)
        .bind(&book.amazon_url)
        .bind(&book.author)
        .bind(&book.language)
        .bind(book.pages)
        .bind(&book.publisher)
        .bind(&book.title)
        .bind(book.year)
        .fetch_one(&self.pool)
        .await
        .map_err(|err| match err {
            sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
                RepositoryError::AlreadyExists {
                    isbn: book.isbn.clone(),
                }
            }
            err => RepositoryError::Database(err),
        })?;

        tracing::debug!("Created book");

        Ok(created)
    }

    #[tracing::instrument(skip(self, book))]
    pub async fn update_book(&self, isbn: &str, book: &BookUpdate) -> RepositoryResult<Book> {
        let updated = sqlx::query_as::<_, Book>(&format!(
            "UPDATE books
             SET amazon_url = ?1, author = ?2, language = ?3, pages = ?4,
                 publisher = ?5, title = ?6, year = ?7
             WHERE isbn = ?8
             RETURNING {BOOK_COLUMNS}"
        ))
        .bind(&book.amazon_url)
        .bind(&book.author)
        .bind(&book.language)
        .bind(book.pages)
        .bind(&book.publisher)
        .bind(&book.title)
        .bind(book.year)
        .bind(isbn)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| RepositoryError::NotFound {
            isbn: isbn.to_owned(),
        })?;

        tracing::debug!("Updated book");

        Ok(updated)
    }

    #[tracing::instrument(skip(self))]
    pub async fn delete_book(&self, isbn: &str) -> RepositoryResult<()> {
        let result = sqlx::query("DELETE FROM books WHERE isbn = ?1")
            .bind(isbn)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound {
                isbn: isbn.to_owned(),
            });
        }

        tracing::debug!("Deleted book");

        Ok(())
    }
}
