use crate::domain::{Book, value_objects::BookId};
use crate::ports::catalog_service::{CatalogService as CatalogServiceTrait, Result};
use async_trait::async_trait;
use sqlx::{PgPool, Row};

/// CatalogServiceのPostgreSQL実装
///
/// `books` テーブルを読み取るだけで、書き込みは行わない。
pub struct CatalogService {
    pool: PgPool,
}

impl CatalogService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CatalogServiceTrait for CatalogService {
    async fn get_book(&self, book_id: BookId) -> Result<Option<Book>> {
        let row = sqlx::query(
            r#"
            SELECT book_id, title, author, publisher, publication_year
            FROM books
            WHERE book_id = $1
            "#,
        )
        .bind(book_id.value())
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        Ok(Some(Book {
            book_id: BookId::from_uuid(row.try_get("book_id")?),
            title: row.try_get("title")?,
            author: row.try_get("author")?,
            publisher: row.try_get("publisher")?,
            publication_year: row.try_get("publication_year")?,
        }))
    }
}
