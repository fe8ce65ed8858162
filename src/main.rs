use book_catalog::config::AppConfig;
use book_catalog::interface::shell::{Shell, TerminalPrompt};

fn main() -> anyhow::Result<()> {
    book_catalog::logging::init();
    let config = AppConfig::from_env();

    let stdout = std::io::stdout();
    let mut shell = Shell::open(&config.catalog_path, TerminalPrompt::detect(), stdout.lock());
    shell.run()
}
