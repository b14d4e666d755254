mod telemetry;

use anyhow::Context;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env is fine; the process environment may carry everything.
    let dotenv = dotenvy::dotenv().ok();

    telemetry::init().context("installing tracing subscriber")?;

    if let Some(path) = dotenv {
        info!(path = %path.display(), "loaded environment file");
    }

    api::start().await.context("webhook server terminated")?;

    Ok(())
}
