use rusty_catalog::adapters::json_store;
use rusty_catalog::application::catalog::Catalog;
use rusty_catalog::cli;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "rusty_catalog=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // 起動時に既定のデータファイルからの読み込みを試みる。
    // 失敗しても空のカタログで開始するだけで、致命的ではない。
    println!("Trying to load data from {}...", cli::DEFAULT_DATA_FILE);
    let mut catalog = match json_store::load_from_file(cli::DEFAULT_DATA_FILE) {
        Ok(catalog) => catalog,
        Err(err) => {
            tracing::warn!(%err, "could not load data file, starting with an empty catalog");
            Catalog::default()
        }
    };

    cli::run(&mut catalog);
}
