use crate::probe::errors::ProbeError;
use reqwest::{Client, ClientBuilder, redirect};
use std::time::Duration;
use tracing::instrument;

const USER_AGENT: &str = "LinkMenderBot/0.1 (+https://linkmender.example.com)";
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Extensions treated as binary assets (images and PDFs). Classification is
/// kept separate from validation so asset policy can diverge later; today
/// both classes get the same GET probe.
const ASSET_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "bmp", "webp", "pdf"];

/// Coarse classification of a candidate URL by path suffix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkClass {
    /// Binary resource: image or PDF.
    Asset,
    /// Anything else.
    Generic,
}

/// Classify a URL by the file extension of its path, ignoring any query
/// string or fragment.
pub fn classify(url: &str) -> LinkClass {
    let path = url
        .split(['?', '#'])
        .next()
        .unwrap_or(url)
        .trim_end_matches('/');
    let suffix = path.rsplit('/').next().and_then(|name| {
        let (_, ext) = name.rsplit_once('.')?;
        Some(ext.to_ascii_lowercase())
    });
    match suffix {
        Some(ext) if ASSET_EXTENSIONS.contains(&ext.as_str()) => LinkClass::Asset,
        _ => LinkClass::Generic,
    }
}

/// Reachability prober with a bounded per-request timeout.
///
/// Probes are plain GETs. HEAD is deliberately not used: some asset servers
/// reject it, and a false "broken" verdict is worse than the extra bytes.
#[derive(Clone)]
pub struct Prober {
    client: Client,
}

impl Prober {
    pub fn new(timeout: Duration) -> Self {
        let client = ClientBuilder::new()
            .connect_timeout(CONNECT_TIMEOUT.min(timeout))
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .redirect(redirect::Policy::limited(10))
            .build()
            .expect("failed to build HTTP client");
        Self { client }
    }

    /// Probe a single URL. `Ok(())` means reachable; any `Err` is a broken
    /// verdict carrying the failure reason. No retries here; a transient
    /// failure is recorded for this run and rechecked on the next one.
    #[instrument(skip(self), fields(class = ?classify(url)))]
    pub async fn check(&self, url: &str) -> Result<(), ProbeError> {
        if url.is_empty() {
            return Err(ProbeError::EmptyUrl);
        }
        let parsed = url::Url::parse(url)?;

        let response = self
            .client
            .get(parsed)
            .send()
            .await
            .map_err(ProbeError::from_reqwest_error)?;

        let status = response.status();
        if status.as_u16() >= 400 {
            return Err(ProbeError::Http { status });
        }
        // Response body is dropped unread; only the status matters and the
        // connection goes back to the pool.
        Ok(())
    }

    /// Pass/fail convenience wrapper over [`Prober::check`].
    pub async fn is_valid(&self, url: &str) -> bool {
        self.check(url).await.is_ok()
    }
}

impl Default for Prober {
    fn default() -> Self {
        Self::new(Duration::from_secs(10))
    }
}
