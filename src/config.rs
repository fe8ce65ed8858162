use std::path::PathBuf;

pub const DEFAULT_CATALOG_FILE: &str = "catalog.json";

/// 起動設定。フラグは持たず、第1引数で保存先を指定する。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub catalog_path: PathBuf,
}

impl AppConfig {
    /// プログラム名を除いた引数列から組み立てる。
    pub fn from_args<I>(args: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        let catalog_path = args
            .into_iter()
            .next()
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CATALOG_FILE));
        Self { catalog_path }
    }

    pub fn from_env() -> Self {
        Self::from_args(std::env::args().skip(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_catalog_json() {
        let config = AppConfig::from_args(Vec::new());
        assert_eq!(config.catalog_path, PathBuf::from("catalog.json"));
    }

    #[test]
    fn first_argument_is_the_path() {
        let config = AppConfig::from_args(vec!["/tmp/books.json".to_string(), "extra".to_string()]);
        assert_eq!(config.catalog_path, PathBuf::from("/tmp/books.json"));
    }
}
