//! Exchange a GitHub App private key for an installation access token.
//!
//! The whole run is one sequential pass: parse arguments, load the key,
//! sign an assertion, look up the installation unless `--inst-id` was
//! given, request the token, and write it out.

pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod key;
pub mod types;

use std::ffi::OsString;

use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};
use tracing::{debug, info};

pub use client::ApiClient;
pub use config::{Access, Config, Invocation, KeySource, Permissions};
pub use error::{Error, Result};

/// Run the command line `args` (program name first), reading a key from
/// `stdin` when asked to and writing the token, or help text, to `stdout`.
pub async fn run<I, T, R, W>(args: I, stdin: &mut R, stdout: &mut W) -> Result<()>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let config = match Config::parse_from(args)? {
        Invocation::Run(config) => config,
        Invocation::Info(text) => return write_out(stdout, &text).await,
    };
    run_with(&config, None, stdin, stdout).await
}

/// Run a parsed configuration, optionally against an API root other than
/// `https://api.github.com`.
pub async fn run_with<R, W>(
    config: &Config,
    api_base: Option<&str>,
    stdin: &mut R,
    stdout: &mut W,
) -> Result<()>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let private_key = key::load_private_key(&config.key_source, stdin).await?;
    let token = fetch_token(config, api_base, &private_key).await?;
    write_out(stdout, &token).await
}

/// Sign an assertion and trade it for an installation token.
pub async fn fetch_token(
    config: &Config,
    api_base: Option<&str>,
    private_key: &str,
) -> Result<String> {
    let assertion = auth::generate_assertion(config.app_id, private_key)?;
    debug!(app_id = config.app_id, "signed assertion");

    let user_agent = config.user_agent.as_deref();
    let client = match api_base {
        Some(base) => ApiClient::with_base_url(base, &assertion, user_agent)?,
        None => ApiClient::new(&assertion, user_agent)?,
    };

    // A discovered access_tokens_url wins; an explicit --inst-id always
    // uses the default endpoint.
    let url = match config.installation_id {
        Some(id) => client.access_tokens_url(id),
        None => {
            let install = client
                .find_installation(config.app_id, config.account.as_deref())
                .await?;
            info!(
                installation_id = install.id,
                account = ?install.account_login(),
                "found installation"
            );
            match install.access_tokens_url.as_deref() {
                Some(url) if !url.is_empty() => url.to_string(),
                _ => client.access_tokens_url(install.id),
            }
        }
    };

    let token = client.create_access_token(&url, &config.permissions).await?;
    Ok(token.token)
}

async fn write_out<W: AsyncWrite + Unpin>(out: &mut W, text: &str) -> Result<()> {
    out.write_all(text.as_bytes()).await.map_err(Error::Output)?;
    out.flush().await.map_err(Error::Output)
}
