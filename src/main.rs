use anyhow::Result;

// ─── Entry ───────────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "github_app_token=warn".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let mut stdin = tokio::io::stdin();
    let mut stdout = tokio::io::stdout();
    github_app_token::run(std::env::args_os(), &mut stdin, &mut stdout).await?;
    Ok(())
}
