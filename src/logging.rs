use tracing_subscriber::EnvFilter;

/// tracingを初期化する。出力は必ずstderr（stdoutはメニューとMCPプロトコルが使う）。
/// `RUST_LOG` が未設定なら warn 以上のみ。
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
