use thiserror::Error;

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("request to {url} failed: {message}")]
    Transport { url: String, message: String },

    #[error("{url} responded with status {status}: {message}")]
    Status {
        url: String,
        status: u16,
        message: String,
    },

    #[error("malformed response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("restaurant {id} not found")]
    NotFound { id: String },
}

impl FetchError {
    /// Build a `Status` error, preferring the `message` field of a JSON error body.
    pub fn status(url: impl Into<String>, status: u16, body: &str) -> Self {
        let message = serde_json::from_str::<serde_json::Value>(body)
            .ok()
            .and_then(|v| v.get("message")?.as_str().map(str::to_string))
            .unwrap_or_else(|| body.trim().to_string());

        Self::Status {
            url: url.into(),
            status,
            message,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// The upstream provider ran out of API credits.
    pub fn is_credits_exhausted(&self) -> bool {
        match self {
            Self::Status { message, .. } | Self::Transport { message, .. } => {
                message.contains("API credits")
            }
            _ => false,
        }
    }

    /// Short user facing title for this failure.
    pub fn headline(&self) -> &'static str {
        if self.is_credits_exhausted() {
            "Service credits exhausted"
        } else if self.is_not_found() {
            "Restaurant not found"
        } else {
            "Error loading restaurants"
        }
    }
}
