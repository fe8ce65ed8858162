use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::book::Book;
use crate::domain::error::DomainError;
use crate::domain::validation::{parse_price, parse_year, require_text, Field, ValidationError};

/// 編集リクエスト。各フィールドは入力されたままの文字列で、
/// Noneと空文字だけが「変更しない」を意味する。それ以外は検証される。
#[derive(Debug, Clone, Default)]
pub struct BookPatch {
    pub title: Option<String>,
    pub author: Option<String>,
    pub price: Option<String>,
    pub year: Option<String>,
}

/// 編集結果。拒否されたフィールドは元の値のまま残る。
#[derive(Debug, Clone, PartialEq)]
pub struct EditOutcome {
    pub book: Book,
    pub rejected: Vec<ValidationError>,
}

/// 並び替えモード
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    PriceAscending,
    PriceDescending,
    YearAscending,
}

impl SortKey {
    pub const ALL: [SortKey; 3] = [
        SortKey::PriceAscending,
        SortKey::PriceDescending,
        SortKey::YearAscending,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            SortKey::PriceAscending => "price (ascending)",
            SortKey::PriceDescending => "price (descending)",
            SortKey::YearAscending => "publication year",
        }
    }
}

impl FromStr for SortKey {
    type Err = DomainError;

    /// メニュー番号（1-3）または名前を受け付ける。
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "1" | "price_asc" => Ok(SortKey::PriceAscending),
            "2" | "price_desc" => Ok(SortKey::PriceDescending),
            "3" | "year_asc" => Ok(SortKey::YearAscending),
            _ => Err(DomainError::InvalidSortSelection(s.trim().to_string())),
        }
    }
}

/// 集計結果
#[derive(Debug, Clone, PartialEq)]
pub struct Statistics {
    pub count: usize,
    pub mean_price: f64,
    pub oldest: Book,
    pub most_expensive: Book,
}

/// Catalog — 集約ルート。挿入順を保持し、タイトルの重複を許す。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Catalog {
    books: Vec<Book>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_books(books: Vec<Book>) -> Self {
        Self { books }
    }

    pub fn books(&self) -> &[Book] {
        &self.books
    }

    pub fn len(&self) -> usize {
        self.books.len()
    }

    pub fn is_empty(&self) -> bool {
        self.books.is_empty()
    }

    /// 末尾に追加する。
    pub fn add(&mut self, book: Book) -> &Book {
        self.books.push(book);
        &self.books[self.books.len() - 1]
    }

    /// タイトル部分一致（大文字小文字無視）で最初の1冊を返す。
    pub fn find_by_title(&self, query: &str) -> Option<&Book> {
        let query = query.to_lowercase();
        self.books
            .iter()
            .find(|book| book.title().to_lowercase().contains(&query))
    }

    /// タイトル完全一致（大文字小文字無視）の最初の1冊。
    pub fn find_exact(&self, query: &str) -> Option<&Book> {
        self.position_exact(query).map(|index| &self.books[index])
    }

    /// タイトル完全一致（大文字小文字無視）の最初の1冊を削除する。
    pub fn remove_by_title(&mut self, query: &str) -> Option<Book> {
        let index = self.position_exact(query)?;
        Some(self.books.remove(index))
    }

    /// タイトル完全一致の最初の1冊を編集する。見つからなければNone。
    pub fn edit_by_title(&mut self, query: &str, patch: BookPatch) -> Option<EditOutcome> {
        let index = self.position_exact(query)?;
        let book = &mut self.books[index];
        let mut rejected = Vec::new();

        if let Some(title) = present(patch.title) {
            match require_text(Field::Title, &title) {
                Ok(value) => book.set_title(value),
                Err(e) => rejected.push(e),
            }
        }
        if let Some(author) = present(patch.author) {
            match require_text(Field::Author, &author) {
                Ok(value) => book.set_author(value),
                Err(e) => rejected.push(e),
            }
        }
        if let Some(price) = present(patch.price) {
            match parse_price(&price) {
                Ok(value) => book.set_price(value),
                Err(e) => rejected.push(e),
            }
        }
        if let Some(year) = present(patch.year) {
            match parse_year(&year) {
                Ok(value) => book.set_year(value),
                Err(e) => rejected.push(e),
            }
        }

        Some(EditOutcome {
            book: book.clone(),
            rejected,
        })
    }

    /// 著者部分一致（大文字小文字無視）の全件を元の順序で返す。
    pub fn filter_by_author(&self, query: &str) -> Vec<&Book> {
        let query = query.to_lowercase();
        self.books
            .iter()
            .filter(|book| book.author().to_lowercase().contains(&query))
            .collect()
    }

    /// 安定ソートで並び替える。
    pub fn sort(&mut self, key: SortKey) {
        match key {
            SortKey::PriceAscending => self.books.sort_by(|a, b| a.price().total_cmp(&b.price())),
            SortKey::PriceDescending => self.books.sort_by(|a, b| b.price().total_cmp(&a.price())),
            SortKey::YearAscending => self.books.sort_by_key(|book| book.year()),
        }
    }

    /// 空ならNone。同値の場合は先に現れた方を採用する。
    pub fn statistics(&self) -> Option<Statistics> {
        let first = self.books.first()?;
        let mut oldest = first;
        let mut most_expensive = first;
        let mut total = 0.0;

        for book in &self.books {
            total += book.price();
            if book.year() < oldest.year() {
                oldest = book;
            }
            if book.price() > most_expensive.price() {
                most_expensive = book;
            }
        }

        Some(Statistics {
            count: self.books.len(),
            mean_price: total / self.books.len() as f64,
            oldest: oldest.clone(),
            most_expensive: most_expensive.clone(),
        })
    }

    // --- Private helpers ---

    fn position_exact(&self, query: &str) -> Option<usize> {
        let query = query.to_lowercase();
        self.books
            .iter()
            .position(|book| book.title().to_lowercase() == query)
    }
}

fn present(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}
