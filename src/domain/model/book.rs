use serde::{Deserialize, Serialize};

use crate::domain::validation::{check_price, check_year, require_text, Field, ValidationError};

/// カタログ上の1冊。生成時と読み込み時に不変条件を検証する。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "BookRecord")]
pub struct Book {
    title: String,
    author: String,
    price: f64,
    year: i32,
}

/// 永続化フォーマット上のレコード（未検証）
#[derive(Deserialize)]
struct BookRecord {
    title: String,
    author: String,
    price: f64,
    year: i32,
}

impl TryFrom<BookRecord> for Book {
    type Error = ValidationError;

    fn try_from(record: BookRecord) -> Result<Self, Self::Error> {
        Book::new(&record.title, &record.author, record.price, record.year)
    }
}

impl Book {
    pub fn new(title: &str, author: &str, price: f64, year: i32) -> Result<Self, ValidationError> {
        Ok(Self {
            title: require_text(Field::Title, title)?,
            author: require_text(Field::Author, author)?,
            price: check_price(price)?,
            year: check_year(year)?,
        })
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn author(&self) -> &str {
        &self.author
    }

    pub fn price(&self) -> f64 {
        self.price
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    // --- 内部操作（Catalog経由でのみ呼ばれる） ---

    pub(crate) fn set_title(&mut self, title: String) {
        self.title = title;
    }

    pub(crate) fn set_author(&mut self, author: String) {
        self.author = author;
    }

    pub(crate) fn set_price(&mut self, price: f64) {
        self.price = price;
    }

    pub(crate) fn set_year(&mut self, year: i32) {
        self.year = year;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_keeps_text_as_entered() {
        let book = Book::new("  Ficciones ", "Borges", 12.0, 1944).unwrap();
        assert_eq!(book.title(), "  Ficciones ");
        assert_eq!(book.author(), "Borges");
    }

    #[test]
    fn new_rejects_invalid_values() {
        assert_eq!(
            Book::new("", "A", 1.0, 1).unwrap_err(),
            ValidationError::Empty(Field::Title)
        );
        assert_eq!(Book::new("T", "A", 0.0, 1).unwrap_err().field(), Field::Price);
        assert_eq!(Book::new("T", "A", f64::NAN, 1).unwrap_err().field(), Field::Price);
        assert_eq!(Book::new("T", "A", 1.0, -3).unwrap_err().field(), Field::Year);
    }

    #[test]
    fn serializes_exactly_four_fields() {
        let book = Book::new("Emma", "Jane Austen", 9.5, 1815).unwrap();
        let value = serde_json::to_value(&book).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "title": "Emma",
                "author": "Jane Austen",
                "price": 9.5,
                "year": 1815
            })
        );
    }

    #[test]
    fn deserialize_rejects_invariant_violations() {
        let bad = r#"{"title": "Emma", "author": "Jane Austen", "price": -1, "year": 1815}"#;
        assert!(serde_json::from_str::<Book>(bad).is_err());

        let missing = r#"{"title": "Emma", "author": "Jane Austen", "price": 3}"#;
        assert!(serde_json::from_str::<Book>(missing).is_err());
    }
}
