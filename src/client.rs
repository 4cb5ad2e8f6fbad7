//! HTTP client for the GitHub App installation endpoints.

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, USER_AGENT};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use tracing::{debug, info};

use crate::config::Permissions;
use crate::error::{Error, Result};
use crate::types::*;

const BASE: &str = "https://api.github.com";

pub const DEFAULT_USER_AGENT: &str = "GitHubAppToken-Retriever/1.0";
const API_VERSION: &str = "2022-11-28";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

const LOOKUP: &str = "installation lookup";
const EXCHANGE: &str = "access token request";

pub struct ApiClient {
    http: reqwest::Client,
    base: String,
}

impl ApiClient {
    /// Client for `https://api.github.com` authenticating with `assertion`.
    pub fn new(assertion: &str, user_agent: Option<&str>) -> Result<Self> {
        Self::with_base_url(BASE, assertion, user_agent)
    }

    /// Same as [`ApiClient::new`] against another API root.
    pub fn with_base_url(base: &str, assertion: &str, user_agent: Option<&str>) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/vnd.github+json"),
        );
        headers.insert(
            "X-GitHub-Api-Version",
            HeaderValue::from_static(API_VERSION),
        );
        let mut bearer = header_value("assertion", &format!("Bearer {assertion}"))?;
        bearer.set_sensitive(true);
        headers.insert(AUTHORIZATION, bearer);
        headers.insert(
            USER_AGENT,
            header_value("user agent", user_agent.unwrap_or(DEFAULT_USER_AGENT))?,
        );

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(REQUEST_TIMEOUT)
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .map_err(|source| Error::Network {
                operation: "client setup",
                source,
            })?;
        Ok(Self {
            http,
            base: base.trim_end_matches('/').to_string(),
        })
    }

    /// Default token endpoint for an installation.
    pub fn access_tokens_url(&self, installation_id: u64) -> String {
        format!("{}/app/installations/{installation_id}/access_tokens", self.base)
    }

    // ─── Installations ──────────────────────────────────────────────────

    /// First installation of `app_id`, optionally restricted to the
    /// account with login `account`.
    pub async fn find_installation(
        &self,
        app_id: u64,
        account: Option<&str>,
    ) -> Result<Installation> {
        let url = format!("{}/app/installations", self.base);
        debug!(url, "GET");
        let resp = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|source| Error::Network {
                operation: LOOKUP,
                source,
            })?;

        let installs: Vec<Installation> = read_json(resp, StatusCode::OK, LOOKUP).await?;
        debug!(count = installs.len(), "listed installations");

        select_installation(installs, app_id, account).ok_or_else(|| Error::NotFound {
            app_id,
            account: account.map(str::to_string),
        })
    }

    // ─── Access tokens ──────────────────────────────────────────────────

    /// Exchange the assertion for an installation token at `url`.
    pub async fn create_access_token(
        &self,
        url: &str,
        permissions: &Permissions,
    ) -> Result<AccessToken> {
        debug!(url, permissions = permissions.iter().count(), "POST");
        let resp = self
            .http
            .post(url)
            .json(&AccessTokenRequest { permissions })
            .send()
            .await
            .map_err(|source| Error::Network {
                operation: EXCHANGE,
                source,
            })?;

        let token: AccessToken = read_json(resp, StatusCode::CREATED, EXCHANGE).await?;
        if let Some(expires_at) = token.expires_at {
            info!(%expires_at, "issued installation token");
        }
        Ok(token)
    }
}

fn header_value(what: &str, value: &str) -> Result<HeaderValue> {
    HeaderValue::from_str(value)
        .map_err(|_| Error::Configuration(format!("{what} is not a valid HTTP header value")))
}

/// Check the status, then decode the body as `T`.
async fn read_json<T: DeserializeOwned>(
    resp: reqwest::Response,
    expected: StatusCode,
    operation: &'static str,
) -> Result<T> {
    let status = resp.status();
    let body = resp
        .text()
        .await
        .map_err(|source| Error::Network { operation, source })?;

    if status != expected {
        return Err(Error::Api {
            operation,
            status: status.as_u16(),
            body,
        });
    }
    serde_json::from_str(&body).map_err(|source| Error::MalformedResponse { operation, source })
}

fn select_installation(
    installs: Vec<Installation>,
    app_id: u64,
    account: Option<&str>,
) -> Option<Installation> {
    installs.into_iter().find(|inst| {
        if let Some(login) = account {
            if inst.account_login() != Some(login) {
                return false;
            }
        }
        inst.app_id == app_id
    })
}
