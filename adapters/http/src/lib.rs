#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Blocking HTTP/JSON implementation of the game server contract.

use std::time::Duration;

use reqwest::blocking::{Client, RequestBuilder};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tower_gym_core::{GameCommand, GameInfo, GameServer, GameState, Position, ServerError};
use tracing::{debug, trace};

/// Address used when no base URL is configured.
pub const DEFAULT_BASE_URL: &str = "http://localhost:3000/";

/// Connection settings of [`HttpGameServer`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Root URL the endpoint names are appended to.
    pub base_url: String,
    /// Per-request timeout in milliseconds; requests wait indefinitely when absent.
    pub timeout_ms: Option<u64>,
}

impl HttpConfig {
    /// Per-request timeout, if any.
    #[must_use]
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_owned(),
            timeout_ms: None,
        }
    }
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

/// Game server reached over HTTP; every call performs one blocking request.
#[derive(Clone, Debug)]
pub struct HttpGameServer {
    base_url: String,
    http: Client,
}

impl HttpGameServer {
    /// Builds a client for the configured server.
    pub fn new(config: &HttpConfig) -> Result<Self, ServerError> {
        let http = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|error| ServerError::Transport(error.to_string()))?;
        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_owned(),
            http,
        })
    }

    fn endpoint(&self, name: &str) -> String {
        format!("{}/{}", self.base_url, name)
    }

    fn send(&self, name: &str, request: RequestBuilder) -> Result<Vec<u8>, ServerError> {
        let response = request
            .send()
            .map_err(|error| ServerError::Transport(error.to_string()))?;
        let status = response.status();
        let body = response
            .bytes()
            .map_err(|error| ServerError::Transport(error.to_string()))?;
        trace!(endpoint = name, status = status.as_u16(), len = body.len(), "reply");

        if !status.is_success() {
            let message = rejection_message(&body);
            debug!(endpoint = name, status = status.as_u16(), %message, "request rejected");
            return Err(ServerError::Rejected {
                status: status.as_u16(),
                message,
            });
        }
        Ok(body.to_vec())
    }

    fn get_json<T: DeserializeOwned>(&self, name: &str) -> Result<T, ServerError> {
        let body = self.send(name, self.http.get(self.endpoint(name)))?;
        decode(&body)
    }

    fn post_json<B, T>(&self, name: &str, payload: Option<&B>) -> Result<T, ServerError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let mut request = self.http.post(self.endpoint(name));
        if let Some(payload) = payload {
            request = request.json(payload);
        }
        let body = self.send(name, request)?;
        decode(&body)
    }
}

impl GameServer for HttpGameServer {
    fn info(&mut self) -> Result<GameInfo, ServerError> {
        self.get_json("info")
    }

    fn reset(&mut self) -> Result<GameState, ServerError> {
        self.post_json::<(), _>("reset", None)
    }

    fn step(&mut self, command: &GameCommand) -> Result<GameState, ServerError> {
        self.post_json("step", Some(command))
    }

    fn render(&mut self) -> Result<Vec<u8>, ServerError> {
        self.send("render", self.http.get(self.endpoint("render")))
    }

    fn set_map(&mut self, waypoints: &[Position]) -> Result<(), ServerError> {
        let _ = self.send(
            "set-map",
            self.http.post(self.endpoint("set-map")).json(waypoints),
        )?;
        Ok(())
    }
}

fn decode<T: DeserializeOwned>(body: &[u8]) -> Result<T, ServerError> {
    serde_json::from_slice(body).map_err(|error| ServerError::Decode(error.to_string()))
}

/// Human-readable reason of a rejection: the JSON `message` field, else the raw body.
fn rejection_message(body: &[u8]) -> String {
    match serde_json::from_slice::<ErrorBody>(body) {
        Ok(parsed) => parsed.message,
        Err(_) => String::from_utf8_lossy(body).trim().to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::{rejection_message, HttpConfig, HttpGameServer, DEFAULT_BASE_URL};
    use std::time::Duration;

    #[test]
    fn default_config_targets_local_server_without_timeout() {
        let config = HttpConfig::default();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.timeout(), None);
    }

    #[test]
    fn endpoints_join_with_single_slash() {
        for base_url in ["http://example:3000", "http://example:3000/", "http://example:3000//"] {
            let server = HttpGameServer::new(&HttpConfig {
                base_url: base_url.to_owned(),
                timeout_ms: Some(250),
            })
            .expect("client builds");
            assert_eq!(server.endpoint("set-map"), "http://example:3000/set-map");
        }
    }

    #[test]
    fn timeout_is_expressed_in_milliseconds() {
        let config = HttpConfig {
            timeout_ms: Some(1_500),
            ..HttpConfig::default()
        };
        assert_eq!(config.timeout(), Some(Duration::from_millis(1_500)));
    }

    #[test]
    fn rejection_prefers_message_field() {
        assert_eq!(
            rejection_message(br#"{"message":"cell occupied"}"#),
            "cell occupied"
        );
        assert_eq!(rejection_message(b"  Bad Gateway \n"), "Bad Gateway");
    }
}
