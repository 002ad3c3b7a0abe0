use thiserror::Error;

/// Why a reachability probe judged a URL broken.
///
/// Every variant maps to a "broken" verdict, never to a system fault; the
/// audit records the link and moves on. Transient failures (timeouts, DNS
/// hiccups) self-correct on the next run if the target recovers.
#[derive(Error, Debug)]
pub enum ProbeError {
    #[error("empty url")]
    EmptyUrl,

    #[error("invalid url: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("dns or connection failure: {0}")]
    Dns(String),

    #[error("connect timeout")]
    ConnectTimeout,

    #[error("request timeout")]
    RequestTimeout,

    #[error("too many redirects")]
    RedirectLoop,

    #[error("http status {status}")]
    Http { status: reqwest::StatusCode },

    #[error("io error: {0}")]
    Io(String),

    #[error("unknown: {0}")]
    Unknown(String),
}

impl ProbeError {
    /// True when the failure happened below HTTP (the request never got a
    /// status line back).
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            Self::Dns(_)
                | Self::ConnectTimeout
                | Self::RequestTimeout
                | Self::RedirectLoop
                | Self::Io(_)
                | Self::Unknown(_)
        )
    }

    pub fn from_reqwest_error(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            if err.is_connect() {
                Self::ConnectTimeout
            } else {
                Self::RequestTimeout
            }
        } else if err.is_redirect() {
            Self::RedirectLoop
        } else if let Some(status) = err.status() {
            Self::Http { status }
        } else if err.is_connect() || err.is_request() {
            // DNS resolution and connection-refused failures
            Self::Dns(err.to_string())
        } else if err.is_body() || err.is_decode() {
            Self::Io(err.to_string())
        } else {
            Self::Unknown(err.to_string())
        }
    }
}
