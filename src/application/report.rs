use crate::domain::model::book::Book;
use crate::domain::model::catalog::{EditOutcome, Statistics};

pub const EMPTY_CATALOG: &str = "No books in the catalog.";
pub const BOOK_NOT_FOUND: &str = "Book not found.";
pub const AUTHOR_NOT_FOUND: &str = "No books found for that author.";
pub const NO_STATISTICS: &str = "No books in the catalog to compute statistics.";

/// Catalog → 表示用テキストへの変換。シェルとMCPの双方が使う。
pub struct ReportService;

impl ReportService {
    /// 1冊分の詳細（番号なし）。
    pub fn render_book(book: &Book) -> String {
        let mut buf = String::new();
        Self::push_fields(book, true, &mut buf);
        finish(buf)
    }

    /// 全件を "Book #n" ブロックで並べる。空なら専用メッセージ。
    pub fn render_catalog(books: &[Book]) -> String {
        if books.is_empty() {
            return EMPTY_CATALOG.to_string();
        }
        let mut buf = String::new();
        for (index, book) in books.iter().enumerate() {
            Self::push_block(index, book, true, &mut buf);
        }
        finish(buf)
    }

    /// 著者で絞り込んだ結果。著者名は見出しに出すので各ブロックでは省く。
    pub fn render_author_listing(query: &str, books: &[&Book]) -> String {
        if books.is_empty() {
            return AUTHOR_NOT_FOUND.to_string();
        }
        let mut buf = format!("Books by {query}:\n\n");
        for (index, book) in books.iter().enumerate() {
            Self::push_block(index, book, false, &mut buf);
        }
        finish(buf)
    }

    pub fn render_statistics(stats: Option<&Statistics>) -> String {
        let Some(stats) = stats else {
            return NO_STATISTICS.to_string();
        };
        let mut buf = String::new();
        buf.push_str(&format!("Total books: {}\n", stats.count));
        buf.push_str(&format!("Average price: {}\n", money(stats.mean_price)));
        buf.push_str(&format!(
            "Oldest book: \"{}\" ({})\n",
            stats.oldest.title(),
            stats.oldest.year()
        ));
        buf.push_str(&format!(
            "Most expensive book: \"{}\" ({})\n",
            stats.most_expensive.title(),
            money(stats.most_expensive.price())
        ));
        finish(buf)
    }

    /// 編集結果。拒否されたフィールドを1行ずつ報告する。
    pub fn render_edit(outcome: &EditOutcome) -> String {
        let mut buf = String::new();
        for rejected in &outcome.rejected {
            buf.push_str(&format!(
                "Invalid {}, keeping current value ({rejected}).\n",
                rejected.field()
            ));
        }
        buf.push_str("Book edited successfully.\n");
        Self::push_fields(&outcome.book, true, &mut buf);
        finish(buf)
    }

    // --- Private helpers ---

    fn push_block(index: usize, book: &Book, include_author: bool, buf: &mut String) {
        buf.push_str(&format!("Book #{}\n", index + 1));
        Self::push_fields(book, include_author, buf);
        buf.push('\n');
    }

    fn push_fields(book: &Book, include_author: bool, buf: &mut String) {
        buf.push_str(&format!("Title: {}\n", book.title()));
        if include_author {
            buf.push_str(&format!("Author: {}\n", book.author()));
        }
        buf.push_str(&format!("Price: {}\n", money(book.price())));
        buf.push_str(&format!("Year: {}\n", book.year()));
    }
}

/// 表示用の金額。丸めは表示時のみ行う。
pub fn money(value: f64) -> String {
    format!("${value:.2}")
}

fn finish(mut buf: String) -> String {
    buf.truncate(buf.trim_end().len());
    buf
}
