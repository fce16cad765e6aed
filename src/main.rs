use anyhow::Result;
use std::path::Path;

use feedart::config::Config;
use feedart::images::OpenAiImages;
use feedart::run;

#[tokio::main]
async fn main() -> Result<()> {
    // Step lines go to stdout; diagnostics go to stderr so the two streams
    // stay separable in CI logs.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("feedart=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    // Load saved keys from .env (real env vars take precedence)
    Config::load_env_file();

    let config = Config::load_or_default(Path::new("config.toml"))?;

    // Pre-flight: the key must be present before any network I/O happens.
    let api_key = Config::openai_api_key()?;
    let backend = OpenAiImages::new(api_key, &config.generation);

    let summary = run::run(&config, &backend).await?;
    println!(
        "Done: {} generated, {} skipped.",
        summary.generated, summary.skipped
    );
    Ok(())
}
