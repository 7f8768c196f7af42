use serde::{Deserialize, Serialize};

use super::BookId;

/// 書籍 - カタログから読み取る表示用の情報
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    pub book_id: BookId,
    pub title: String,
    pub author: Option<String>,
    pub publisher: Option<String>,
    pub publication_year: Option<i32>,
}
