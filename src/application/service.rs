use crate::domain::model::book::Book;
use crate::domain::model::catalog::{BookPatch, Catalog, EditOutcome, SortKey, Statistics};
use crate::domain::repository::CatalogRepository;

use super::error::AppError;

/// カタログに対するユースケース。
/// 起動時に一度だけ読み込み、以降はメモリ上のCatalogを操作する。
/// 変更系の操作は呼び出し元へ戻る前に全体を書き出す（flush）。
/// 書き出しに失敗した操作はメモリ上でも取り消される。
pub struct CatalogStore<R: CatalogRepository> {
    repo: R,
    catalog: Catalog,
}

impl<R: CatalogRepository> CatalogStore<R> {
    /// 保存済みカタログを読み込む。存在しない・壊れている場合は空から始める。
    pub fn load(repo: R) -> Self {
        let catalog = match repo.load() {
            Ok(Some(catalog)) => {
                tracing::info!(books = catalog.len(), "catalog loaded");
                catalog
            }
            Ok(None) => {
                tracing::info!("no existing catalog, starting empty");
                Catalog::new()
            }
            Err(e) => {
                tracing::warn!(error = %e, "catalog unreadable, starting empty");
                Catalog::new()
            }
        };
        Self { repo, catalog }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// 保存先の参照。保存内容や書き込み回数の確認に使う。
    pub fn repository(&self) -> &R {
        &self.repo
    }

    /// 表示順の全件。
    pub fn list(&self) -> &[Book] {
        self.catalog.books()
    }

    /// 検証した上で末尾に追加し、永続化する。
    pub fn add(
        &mut self,
        title: &str,
        author: &str,
        price: f64,
        year: i32,
    ) -> Result<&Book, AppError> {
        let book = Book::new(title, author, price, year)?;
        let previous = self.catalog.clone();
        self.catalog.add(book);
        self.commit(previous)?;
        let added = &self.catalog.books()[self.catalog.len() - 1];
        tracing::info!(title = added.title(), "book added");
        Ok(added)
    }

    pub fn find_by_title(&self, query: &str) -> Option<&Book> {
        self.catalog.find_by_title(query)
    }

    pub fn find_exact(&self, query: &str) -> Option<&Book> {
        self.catalog.find_exact(query)
    }

    /// 削除できた場合のみ永続化する。
    pub fn delete_by_title(&mut self, query: &str) -> Result<Option<Book>, AppError> {
        let previous = self.catalog.clone();
        let Some(removed) = self.catalog.remove_by_title(query) else {
            return Ok(None);
        };
        self.commit(previous)?;
        tracing::info!(title = removed.title(), "book deleted");
        Ok(Some(removed))
    }

    /// 対象が見つかれば、一部フィールドが拒否されても永続化する。
    pub fn edit_by_title(
        &mut self,
        query: &str,
        patch: BookPatch,
    ) -> Result<Option<EditOutcome>, AppError> {
        let previous = self.catalog.clone();
        let Some(outcome) = self.catalog.edit_by_title(query, patch) else {
            return Ok(None);
        };
        self.commit(previous)?;
        tracing::info!(
            title = outcome.book.title(),
            rejected = outcome.rejected.len(),
            "book edited"
        );
        Ok(Some(outcome))
    }

    pub fn filter_by_author(&self, query: &str) -> Vec<&Book> {
        self.catalog.filter_by_author(query)
    }

    /// 並び替えのみ。永続化は次の変更操作で行われる。
    pub fn sort(&mut self, key: SortKey) {
        self.catalog.sort(key);
        tracing::debug!(key = key.label(), "catalog sorted");
    }

    pub fn statistics(&self) -> Option<Statistics> {
        self.catalog.statistics()
    }

    // --- private ---

    /// 全体を書き出す。失敗したらメモリ上の状態を変更前に戻す。
    fn commit(&mut self, previous: Catalog) -> Result<(), AppError> {
        if let Err(e) = self.repo.save(&self.catalog) {
            self.catalog = previous;
            return Err(AppError::Storage(Box::new(e)));
        }
        Ok(())
    }
}
