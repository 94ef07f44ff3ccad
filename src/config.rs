use std::{env, str::FromStr, time::Duration};

use derive_builder::Builder;
use tracing::warn;
use url::Url;

pub const DEFAULT_BASE_URL: &str = "https://690dc4e6bd0fefc30a0241c0.mockapi.io/api/v1";

#[derive(Builder, Debug, Clone)]
pub struct Config {
    /// Root of the remote restaurant API, without a trailing slash.
    #[builder(setter(into), default = "DEFAULT_BASE_URL.to_string()")]
    pub base_url: String,
    #[builder(default = "Duration::from_millis(10_000)")]
    pub timeout: Duration,
    #[builder(setter(into), default = "\"127.0.0.1\".to_string()")]
    pub bind_addr: String,
    #[builder(default = "8080")]
    pub port: u16,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_millis(10_000),
            bind_addr: "127.0.0.1".to_string(),
            port: 8080,
        }
    }
}

impl Config {
    /// Read the configuration from the process environment.
    ///
    /// `.env` files are not loaded here, call `dotenvy::dotenv()` first if you need them.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let base_url = env::var("RESTAURANT_API_URL")
            .ok()
            .filter(|url| !url.trim().is_empty())
            .unwrap_or(defaults.base_url);

        Self {
            base_url: base_url.trim().trim_end_matches('/').to_string(),
            timeout: parse_var("RESTAURANT_API_TIMEOUT_MS")
                .map(Duration::from_millis)
                .unwrap_or(defaults.timeout),
            bind_addr: env::var("API_SERVER_ADDR").unwrap_or(defaults.bind_addr),
            port: parse_var("API_SERVER_PORT").unwrap_or(defaults.port),
        }
    }

    /// Absolute url for the resource below the API root named by `segments`,
    /// e.g. `["restaurants", id]`. Each segment is percent-encoded on its own.
    pub fn endpoint(&self, segments: &[&str]) -> Result<Url, url::ParseError> {
        let mut url = Url::parse(&self.base_url)?;
        url.path_segments_mut()
            .map_err(|()| url::ParseError::RelativeUrlWithCannotBeABaseBase)?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }
}

fn parse_var<T: FromStr>(key: &str) -> Option<T>
where
    T::Err: std::fmt::Display,
{
    let raw = env::var(key).ok()?;
    raw.trim()
        .parse()
        .map_err(|e| warn!("invalid {key} value {raw:?}: {e}, using default"))
        .ok()
}
