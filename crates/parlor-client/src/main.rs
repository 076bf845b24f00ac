//! parlor client binary.
//!
//! Glue only: logging setup, config load, session bootstrap. Everything
//! interesting lives in the library modules.

use tracing_subscriber::{fmt, EnvFilter};

use parlor_client::{config, session::Session};

#[tokio::main]
async fn main() {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "parlor.yaml".into());
    let cfg = config::load_from_file(&path).expect("config load failed");

    let session = Session::connect(&cfg).await.expect("connect failed");
    tracing::info!(room = %cfg.room, nick = %cfg.nick, "session established");

    if let Err(err) = session.run().await {
        tracing::error!(%err, "session terminated");
        std::process::exit(1);
    }
}
