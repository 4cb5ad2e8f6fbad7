//! Private key loading.

use std::path::{Path, PathBuf};

use tokio::io::{AsyncRead, AsyncReadExt};
use tracing::debug;

use crate::config::KeySource;
use crate::error::{Error, Result};

/// Read the PEM text from a file (with `~` expanded) or from `stdin`
/// until it closes.
pub async fn load_private_key<R>(source: &KeySource, stdin: &mut R) -> Result<String>
where
    R: AsyncRead + Unpin,
{
    match source {
        KeySource::File(path) => read_key_file(path),
        KeySource::Stdin => {
            debug!("reading private key from stdin");
            let mut pem = String::new();
            stdin
                .read_to_string(&mut pem)
                .await
                .map_err(|source| Error::Io {
                    path: PathBuf::from("<stdin>"),
                    source,
                })?;
            Ok(pem)
        }
    }
}

fn read_key_file(path: &Path) -> Result<String> {
    let expanded = shellexpand::tilde(&path.to_string_lossy()).into_owned();
    let path = PathBuf::from(expanded);
    debug!(path = %path.display(), "reading private key file");
    std::fs::read_to_string(&path).map_err(|source| Error::Io { path, source })
}
