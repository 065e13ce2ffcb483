//! Spotify track provider
//!
//! Drives the host's Spotify playback via the Web API. Operators supply a
//! client id/secret and a refresh token; access tokens are refreshed on
//! demand and once more when a request comes back 401.

use anyhow::{anyhow, bail, Context, Result};
use async_trait::async_trait;
use reqwest::{Client, Method, StatusCode};
use serde::Deserialize;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::provider::TrackProvider;
use crate::round::Track;

const TOKEN_URL: &str = "https://accounts.spotify.com/api/token";
const API_BASE: &str = "https://api.spotify.com/v1";

/// A hanging provider must surface an error, not stall the round forever
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

pub struct SpotifyProvider {
    client: Client,
    client_id: String,
    client_secret: String,
    refresh_token: String,
    access_token: RwLock<Option<String>>,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct CurrentlyPlaying {
    item: Option<TrackItem>,
}

#[derive(Debug, Deserialize)]
struct TrackItem {
    name: String,
    #[serde(default)]
    artists: Vec<ArtistItem>,
}

#[derive(Debug, Deserialize)]
struct ArtistItem {
    name: String,
}

impl SpotifyProvider {
    pub fn new(config: &Config) -> Result<Self> {
        if config.spotify_client_id.is_empty()
            || config.spotify_client_secret.is_empty()
            || config.spotify_refresh_token.is_empty()
        {
            bail!(
                "Spotify credentials missing; set spotify_client_id, \
                 spotify_client_secret and spotify_refresh_token in the \
                 config file or environment"
            );
        }

        Ok(Self {
            client: Client::builder().timeout(REQUEST_TIMEOUT).build()?,
            client_id: config.spotify_client_id.clone(),
            client_secret: config.spotify_client_secret.clone(),
            refresh_token: config.spotify_refresh_token.clone(),
            access_token: RwLock::new(None),
        })
    }

    /// Obtain a fresh access token. Called at startup so bad credentials
    /// fail fast instead of surfacing mid-round.
    pub async fn ensure_token(&self) -> Result<()> {
        if self.access_token.read().await.is_some() {
            return Ok(());
        }
        self.refresh_access_token().await
    }

    async fn refresh_access_token(&self) -> Result<()> {
        debug!("Refreshing Spotify access token");
        let response = self
            .client
            .post(TOKEN_URL)
            .basic_auth(&self.client_id, Some(&self.client_secret))
            .form(&[
                ("grant_type", "refresh_token"),
                ("refresh_token", self.refresh_token.as_str()),
            ])
            .send()
            .await
            .context("Could not reach the Spotify accounts service")?;

        if !response.status().is_success() {
            bail!("Spotify token refresh failed: HTTP {}", response.status());
        }

        let token: TokenResponse = response.json().await?;
        *self.access_token.write().await = Some(token.access_token);
        info!("🔑 Spotify access token refreshed");
        Ok(())
    }

    async fn bearer(&self) -> Result<String> {
        if let Some(token) = self.access_token.read().await.clone() {
            return Ok(token);
        }
        self.refresh_access_token().await?;
        self.access_token
            .read()
            .await
            .clone()
            .ok_or_else(|| anyhow!("no access token after refresh"))
    }

    /// Send a player request, refreshing the token once on 401 and
    /// retrying once on connection errors.
    async fn send(&self, method: Method, path: &str) -> Result<reqwest::Response> {
        let max_attempts = 2;
        for attempt in 0..max_attempts {
            let token = self.bearer().await?;
            let result = self
                .client
                .request(method.clone(), format!("{}{}", API_BASE, path))
                .bearer_auth(&token)
                .send()
                .await;

            match result {
                Ok(resp) if resp.status() == StatusCode::UNAUTHORIZED && attempt == 0 => {
                    warn!("⚠️ Spotify token expired, refreshing");
                    *self.access_token.write().await = None;
                }
                Ok(resp) if resp.status().is_client_error() || resp.status().is_server_error() => {
                    bail!("Spotify API error: HTTP {} on {}", resp.status(), path);
                }
                Ok(resp) => return Ok(resp),
                Err(e) if e.is_connect() && attempt < max_attempts - 1 => {
                    debug!("📡 Connection to Spotify refused, retrying");
                    tokio::time::sleep(Duration::from_secs(1)).await;
                }
                Err(e) => {
                    return Err(anyhow!(e).context(format!("Spotify request failed: {}", path)))
                }
            }
        }
        bail!("Spotify request failed after {} attempts: {}", max_attempts, path)
    }
}

#[async_trait]
impl TrackProvider for SpotifyProvider {
    async fn skip_to_next(&self) -> Result<()> {
        self.send(Method::POST, "/me/player/next").await?;
        Ok(())
    }

    async fn current_track(&self) -> Result<Option<Track>> {
        let response = self.send(Method::GET, "/me/player/currently-playing").await?;
        // 204: nothing is playing
        if response.status() == StatusCode::NO_CONTENT {
            return Ok(None);
        }

        let playing: CurrentlyPlaying = response.json().await?;
        Ok(playing.item.map(|item| Track {
            title: item.name,
            artists: item.artists.into_iter().map(|a| a.name).collect(),
        }))
    }
}
