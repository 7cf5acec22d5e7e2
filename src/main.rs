mod cli;

use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let (cli, config) = match cli::startup(std::env::args_os(), |key| std::env::var(key).ok()) {
        Ok(parsed) => parsed,
        Err(err) => match err.downcast::<clap::Error>() {
            Ok(usage) => usage.exit(),
            Err(err) => return Err(err),
        },
    };

    // stdout carries command output; logs go to stderr.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config.default_log_filter())),
        )
        .with_writer(std::io::stderr)
        .init();

    tracing::debug!(mock = config.use_mock_data, scheme = %config.auth_scheme, "Starting pinman");

    cli::run(cli, &config).await
}
