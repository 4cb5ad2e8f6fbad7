//! Command line parsing into a run configuration.
//!
//! Every flag takes exactly one value and may be given at most once;
//! `--org`/`--user` and `--perm`/`--scope` are aliases of one another.

use std::collections::BTreeMap;
use std::ffi::OsString;
use std::path::PathBuf;

use clap::builder::NonEmptyStringValueParser;
use clap::{ArgAction, Parser};
use serde::Serialize;

use crate::error::{Error, Result};

/// `--pk` value that reads the key from standard input.
pub const STDIN_SENTINEL: &str = "stdin";

#[derive(Parser, Debug)]
#[command(
    name = "github-app-token",
    version,
    about = "Exchange a GitHub App private key for an installation access token",
    disable_help_flag = true,
    disable_version_flag = true
)]
struct Cli {
    /// Private key file, or `stdin` to read the key from standard input.
    #[arg(long = "pk", value_name = "FILE|stdin", value_parser = parse_key_source,
          allow_hyphen_values = true)]
    key_source: KeySource,

    /// GitHub App ID.
    #[arg(long = "app-id", value_parser = clap::value_parser!(u64).range(1..))]
    app_id: u64,

    /// Installation ID. Skips the installation lookup when given.
    #[arg(long = "inst-id", value_parser = clap::value_parser!(u64).range(1..))]
    installation_id: Option<u64>,

    /// Only consider installations on this organization or user account.
    #[arg(long = "org", visible_alias = "user", value_name = "LOGIN",
          value_parser = NonEmptyStringValueParser::new(), allow_hyphen_values = true)]
    account: Option<String>,

    /// Comma-separated permissions, e.g. `read:issues,write:pull_requests`.
    #[arg(long = "perm", visible_alias = "scope", value_name = "LIST",
          value_parser = parse_permissions)]
    permissions: Permissions,

    /// User-Agent header sent to the API.
    #[arg(long = "ua", value_name = "USER_AGENT",
          value_parser = NonEmptyStringValueParser::new(), allow_hyphen_values = true)]
    user_agent: Option<String>,

    /// Print help.
    #[arg(long, action = ArgAction::Help)]
    help: Option<bool>,

    /// Print version.
    #[arg(long, action = ArgAction::Version)]
    version: Option<bool>,
}

/// Where the private key comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeySource {
    File(PathBuf),
    Stdin,
}

/// Access level granted for a single permission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Access {
    Read,
    Write,
    Admin,
}

/// Permission name to access level, serialized as a JSON object.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Permissions(BTreeMap<String, Access>);

impl Permissions {
    pub fn get(&self, name: &str) -> Option<Access> {
        self.0.get(name).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Access)> {
        self.0.iter().map(|(name, access)| (name.as_str(), *access))
    }
}

impl std::str::FromStr for Permissions {
    type Err = String;

    /// Parse `[read:|write:|admin:]name,...`. Unprefixed names are `read`;
    /// a name repeated later in the list overrides the earlier level.
    fn from_str(list: &str) -> std::result::Result<Self, Self::Err> {
        let mut map = BTreeMap::new();
        for item in list.split(',') {
            let (access, name) = if let Some(name) = item.strip_prefix("read:") {
                (Access::Read, name)
            } else if let Some(name) = item.strip_prefix("write:") {
                (Access::Write, name)
            } else if let Some(name) = item.strip_prefix("admin:") {
                (Access::Admin, name)
            } else {
                (Access::Read, item)
            };
            if !is_permission_name(name) {
                return Err(format!("invalid permission name `{name}`"));
            }
            map.insert(name.to_string(), access);
        }
        Ok(Permissions(map))
    }
}

/// Lowercase letters and dashes, plus the underscores GitHub uses in
/// names like `pull_requests`.
fn is_permission_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .bytes()
            .all(|b| b.is_ascii_lowercase() || b == b'-' || b == b'_')
}

fn parse_permissions(value: &str) -> std::result::Result<Permissions, String> {
    value.parse()
}

fn parse_key_source(value: &str) -> std::result::Result<KeySource, String> {
    match value {
        "" => Err("a key file path or `stdin` is required".into()),
        STDIN_SENTINEL => Ok(KeySource::Stdin),
        path => Ok(KeySource::File(PathBuf::from(path))),
    }
}

/// Validated run configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub key_source: KeySource,
    pub app_id: u64,
    pub installation_id: Option<u64>,
    pub account: Option<String>,
    pub permissions: Permissions,
    pub user_agent: Option<String>,
}

/// What the command line asked for.
#[derive(Debug)]
pub enum Invocation {
    Run(Config),
    /// `--help` or `--version`: print the text and stop.
    Info(String),
}

impl Config {
    /// Parse a full argument vector (program name first).
    pub fn parse_from<I, T>(args: I) -> Result<Invocation>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let cli = match Cli::try_parse_from(args) {
            Ok(cli) => cli,
            Err(e) => {
                return match e.kind() {
                    clap::error::ErrorKind::DisplayHelp
                    | clap::error::ErrorKind::DisplayVersion => {
                        Ok(Invocation::Info(e.render().to_string()))
                    }
                    _ => Err(Error::Configuration(clap_message(&e))),
                };
            }
        };

        Ok(Invocation::Run(Config {
            key_source: cli.key_source,
            app_id: cli.app_id,
            installation_id: cli.installation_id,
            account: cli.account,
            permissions: cli.permissions,
            user_agent: cli.user_agent,
        }))
    }
}

/// clap's rendered error without the leading `error: ` and trailing usage.
fn clap_message(e: &clap::Error) -> String {
    let rendered = e.render().to_string();
    let first = rendered.trim().trim_start_matches("error: ");
    first
        .split("\n\nUsage:")
        .next()
        .unwrap_or(first)
        .trim()
        .to_string()
}
