use super::model::catalog::Catalog;

/// 永続化の抽象。Infra層が実装する。
pub trait CatalogRepository {
    type Error: std::error::Error + Send + Sync + 'static;

    /// 保存先が存在しなければ `Ok(None)`。
    fn load(&self) -> Result<Option<Catalog>, Self::Error>;
    /// カタログ全体を上書き保存する。
    fn save(&self, catalog: &Catalog) -> Result<(), Self::Error>;
}
