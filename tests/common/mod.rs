//! Shared test harness for integration tests.

#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::io;

use book_catalog::application::service::CatalogStore;
use book_catalog::domain::model::book::Book;
use book_catalog::domain::model::catalog::Catalog;
use book_catalog::domain::repository::CatalogRepository;
use book_catalog::interface::shell::Prompt;

// =============================================================================
// InMemoryRepo — テスト用リポジトリ
// =============================================================================

#[derive(Debug, thiserror::Error)]
#[error("in-memory store error")]
pub struct InMemoryError;

/// ファイルI/O不要のインメモリリポジトリ。保存回数も数える。
pub struct InMemoryRepo {
    store: RefCell<Option<String>>,
    saves: Cell<usize>,
    fail_writes: bool,
}

impl InMemoryRepo {
    pub fn new() -> Self {
        Self {
            store: RefCell::new(None),
            saves: Cell::new(0),
            fail_writes: false,
        }
    }

    /// 生のJSON文字列を持つリポジトリ（壊れた内容の再現用）。
    pub fn with_raw(content: &str) -> Self {
        let repo = Self::new();
        *repo.store.borrow_mut() = Some(content.to_string());
        repo
    }

    pub fn with_catalog(catalog: &Catalog) -> Self {
        Self::with_raw(&serde_json::to_string(catalog).unwrap())
    }

    /// 書き込みが常に失敗するリポジトリ。
    pub fn failing(catalog: &Catalog) -> Self {
        Self {
            fail_writes: true,
            ..Self::with_catalog(catalog)
        }
    }

    pub fn save_count(&self) -> usize {
        self.saves.get()
    }

    /// 最後に保存された内容を読み戻す。
    pub fn stored(&self) -> Option<Catalog> {
        self.store
            .borrow()
            .as_ref()
            .map(|json| serde_json::from_str(json).unwrap())
    }
}

impl CatalogRepository for InMemoryRepo {
    type Error = InMemoryError;

    fn load(&self) -> Result<Option<Catalog>, Self::Error> {
        match self.store.borrow().as_ref() {
            Some(json) => serde_json::from_str(json).map(Some).map_err(|_| InMemoryError),
            None => Ok(None),
        }
    }

    fn save(&self, catalog: &Catalog) -> Result<(), Self::Error> {
        if self.fail_writes {
            return Err(InMemoryError);
        }
        let json = serde_json::to_string(catalog).unwrap();
        *self.store.borrow_mut() = Some(json);
        self.saves.set(self.saves.get() + 1);
        Ok(())
    }
}

// =============================================================================
// Fixtures
// =============================================================================

pub fn book(title: &str, author: &str, price: f64, year: i32) -> Book {
    Book::new(title, author, price, year).unwrap()
}

/// 標準的なテスト用カタログ:
/// ```text
/// 1. Emma          Jane Austen     12.00  1815
/// 2. Dune          Frank Herbert   25.00  1965
/// 3. Persuasion    Jane Austen      9.00  1817
/// 4. Emma          Emma Donoghue   30.00  2010
/// ```
pub fn sample_catalog() -> Catalog {
    Catalog::from_books(vec![
        book("Emma", "Jane Austen", 12.0, 1815),
        book("Dune", "Frank Herbert", 25.0, 1965),
        book("Persuasion", "Jane Austen", 9.0, 1817),
        book("Emma", "Emma Donoghue", 30.0, 2010),
    ])
}

pub fn store_with(catalog: &Catalog) -> CatalogStore<InMemoryRepo> {
    CatalogStore::load(InMemoryRepo::with_catalog(catalog))
}

pub fn titles(books: &[Book]) -> Vec<&str> {
    books.iter().map(|b| b.title()).collect()
}

// =============================================================================
// ScriptedPrompt — 決められた入力を順に返す
// =============================================================================

pub struct ScriptedPrompt {
    lines: VecDeque<String>,
}

impl ScriptedPrompt {
    pub fn new(lines: &[&str]) -> Self {
        Self {
            lines: lines.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl Prompt for ScriptedPrompt {
    fn read_line(&mut self, _prompt: &str) -> io::Result<Option<String>> {
        Ok(self.lines.pop_front())
    }
}
