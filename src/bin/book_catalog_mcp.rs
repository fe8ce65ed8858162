use book_catalog::config::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    book_catalog::logging::init();
    let config = AppConfig::from_env();

    book_catalog::interface::mcp::run(config.catalog_path).await
}
