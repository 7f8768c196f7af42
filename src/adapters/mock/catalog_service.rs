use crate::domain::{Book, value_objects::BookId};
use crate::ports::catalog_service::{CatalogService as CatalogServiceTrait, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

/// CatalogServiceのモック実装
///
/// 登録された書籍のみ存在するものとして扱う。
pub struct CatalogService {
    books: Mutex<HashMap<BookId, Book>>,
}

impl CatalogService {
    pub fn new() -> Self {
        Self {
            books: Mutex::new(HashMap::new()),
        }
    }

    /// テスト用に書籍を登録
    pub fn add_book(&self, book: Book) {
        self.books
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(book.book_id, book);
    }

    /// タイトルだけを指定して書籍を登録し、IDを返す
    pub fn add_book_titled(&self, title: &str) -> BookId {
        let book_id = BookId::new();
        self.add_book(Book {
            book_id,
            title: title.to_string(),
            author: None,
            publisher: None,
            publication_year: None,
        });
        book_id
    }
}

impl Default for CatalogService {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CatalogServiceTrait for CatalogService {
    async fn get_book(&self, book_id: BookId) -> Result<Option<Book>> {
        Ok(self
            .books
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(&book_id)
            .cloned())
    }
}
