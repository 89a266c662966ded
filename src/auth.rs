use std::io::{self, BufRead, Write, stdin, stdout};

use chrono::{Duration, Utc};
use reqwest::{Client, Url};
use serde::Deserialize;
use tracing::{debug, info};
use uuid::Uuid;

use crate::client::DEFAULT_DOMAIN;
use crate::error::{DbxError, Result};
use crate::token::{Token, TokenStore};

/// Authorization and token-exchange URLs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OAuthEndpoint {
    pub auth_url: String,
    pub token_url: String,
}

impl OAuthEndpoint {
    pub fn for_domain(domain: &str) -> Self {
        let auth_url = if domain == DEFAULT_DOMAIN {
            "https://www.dropbox.com/oauth2/authorize".to_string()
        } else {
            format!("https://meta{domain}/oauth2/authorize")
        };
        Self {
            auth_url,
            token_url: format!("https://api{domain}/oauth2/token"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct OAuthConfig {
    pub client_id: String,
    pub client_secret: String,
    pub endpoint: OAuthEndpoint,
}

#[derive(Deserialize, Debug)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    token_type: Option<String>,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    expires_in: Option<i64>,
}

#[derive(Deserialize, Debug)]
struct TokenErrorResponse {
    error: String,
    #[serde(default)]
    error_description: Option<String>,
}

impl OAuthConfig {
    pub fn new(client_id: &str, client_secret: &str, endpoint: OAuthEndpoint) -> Result<Self> {
        if client_id.is_empty() {
            return Err(DbxError::Auth("Dropbox API key is missing".to_string()));
        }
        if client_secret.is_empty() {
            return Err(DbxError::Auth("Dropbox API secret is missing".to_string()));
        }
        Ok(Self {
            client_id: client_id.to_string(),
            client_secret: client_secret.to_string(),
            endpoint,
        })
    }

    pub fn authorize_url(&self, state: &str) -> Result<String> {
        let url = Url::parse_with_params(
            &self.endpoint.auth_url,
            &[
                ("client_id", self.client_id.as_str()),
                ("response_type", "code"),
                ("state", state),
            ],
        )
        .map_err(|e| DbxError::Auth(format!("invalid authorize URL: {e}")))?;
        Ok(url.into())
    }

    /// Trades an authorization code for a token.
    pub async fn exchange(&self, http: &Client, code: &str) -> Result<Token> {
        let resp = http
            .post(&self.endpoint.token_url)
            .form(&[
                ("grant_type", "authorization_code"),
                ("code", code),
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
            ])
            .send()
            .await
            .map_err(|e| DbxError::Auth(format!("unable for token exchange: {e}")))?;
        let status = resp.status();
        let body = resp
            .text()
            .await
            .map_err(|e| DbxError::Auth(format!("unable for token exchange: {e}")))?;

        if !status.is_success() {
            let reason = match serde_json::from_str::<TokenErrorResponse>(&body) {
                Ok(err) => match err.error_description {
                    Some(desc) => format!("{}: {desc}", err.error),
                    None => err.error,
                },
                Err(_) => body,
            };
            return Err(DbxError::Auth(format!(
                "token exchange failed: {status}: {reason}"
            )));
        }

        let tok: TokenResponse = serde_json::from_str(&body)
            .map_err(|e| DbxError::Auth(format!("unable to parse token response: {e}")))?;
        let now = Utc::now();
        Ok(Token {
            access_token: tok.access_token,
            token_type: tok.token_type.unwrap_or_else(|| "bearer".to_string()),
            refresh_token: tok.refresh_token,
            expiry: tok.expires_in.map(|secs| now + Duration::seconds(secs)),
            issued_at: Some(now),
        })
    }
}

/// Returns the cached token. Without one, prints the authorize URL, trades
/// the code from `read_code` for a token and caches it.
pub async fn get_access_token<F>(
    oauth: &OAuthConfig,
    store: &TokenStore,
    http: &Client,
    read_code: F,
) -> Result<Token>
where
    F: FnOnce() -> io::Result<String>,
{
    if let Some(token) = store.load()? {
        debug!(path = %store.path().display(), "using cached token");
        return Ok(token);
    }

    let state = Uuid::new_v4().to_string();
    println!("Visit this URL: {}", oauth.authorize_url(&state)?);
    let code = read_code().map_err(|e| DbxError::Auth(format!("unable to scan code: {e}")))?;
    let code = code.trim();
    if code.is_empty() {
        return Err(DbxError::Auth("no access code entered".to_string()));
    }

    let token = oauth.exchange(http, code).await?;
    store.save(&token)?;
    info!(path = %store.path().display(), "saved token");
    Ok(token)
}

/// Reads one line from stdin after printing `msg`.
pub fn prompt(msg: &str) -> io::Result<String> {
    print!("{msg}");
    stdout().flush()?;
    let mut buf = String::new();
    stdin().lock().read_line(&mut buf)?;
    Ok(buf.trim().to_string())
}
