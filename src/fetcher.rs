use std::time::Duration;

use log::{error, info, warn};
use rand::Rng;
use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT_LANGUAGE, USER_AGENT};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::config::{self, Config};
use crate::delay_manager::{Pacer, PauseKind};
use crate::error::{LookupError, Result};
use crate::extractor::Extractor;
use crate::input_loader::Identifier;
use crate::result_writer::FailureSink;

/// Insurance details for one registration number. Serialized field order is
/// `identifier`, `expiryDate`, `insuranceCompany`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsuranceRecord {
    pub identifier: Identifier,
    pub expiry_date: String,
    pub insurance_company: String,
}

/// Something that can hand back the lookup page for an identifier.
pub trait PageSource {
    fn fetch_page(&self, id: &Identifier) -> Result<String>;
}

impl<F> PageSource for F
where
    F: Fn(&Identifier) -> Result<String>,
{
    fn fetch_page(&self, id: &Identifier) -> Result<String> {
        self(id)
    }
}

const USER_AGENTS: [&str; 4] = [
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:121.0) Gecko/20100101 Firefox/121.0",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10.15; rv:121.0) Gecko/20100101 Firefox/121.0",
];

fn random_user_agent() -> &'static str {
    let mut rng = rand::thread_rng();
    USER_AGENTS[rng.gen_range(0..USER_AGENTS.len())]
}

/// Fetches `<lookup base>/<identifier>` over HTTPS.
pub struct HttpPageSource {
    client: Client,
    base: Url,
}

impl HttpPageSource {
    pub fn new(lookup_base: &str, timeout: Duration) -> Result<Self> {
        let base = config::parse_lookup_base(lookup_base)?;

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));

        let client = Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .cookie_store(true)
            .build()
            .map_err(|e| LookupError::Config(format!("failed to build HTTP client: {}", e)))?;

        Ok(HttpPageSource { client, base })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(&config.lookup_base, config.request_timeout)
    }

    /// The identifier becomes a single, percent-encoded path segment.
    pub fn lookup_url(&self, id: &Identifier) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push(id.as_str());
        }
        url
    }
}

impl PageSource for HttpPageSource {
    fn fetch_page(&self, id: &Identifier) -> Result<String> {
        let url = self.lookup_url(id);
        let resp = self.client.get(url.as_str())
            .header(USER_AGENT, random_user_agent())
            .send()?;

        let status = resp.status();
        if !status.is_success() {
            if status.as_u16() == 403 || status.as_u16() == 429 {
                warn!("Blocked at {}: {}", url, status);
            }
            return Err(LookupError::Status(status.as_u16()));
        }
        Ok(resp.text()?)
    }
}

/// Bounded retry with a fixed pause between attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub delay: Duration,
}

impl RetryPolicy {
    pub fn from_config(config: &Config) -> Self {
        RetryPolicy {
            max_retries: config.max_retries,
            delay: config.retry_delay,
        }
    }

    pub fn total_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

/// Looks up a single identifier. Lookup errors never leave this type: an
/// identifier that cannot be fetched is handed to the failure sink and yields
/// `Ok(None)`. The only error returned is the sink failing to record it.
pub struct Fetcher<'a> {
    source: &'a dyn PageSource,
    extractor: &'a Extractor,
    failures: &'a dyn FailureSink,
    pacer: &'a dyn Pacer,
    policy: RetryPolicy,
}

impl<'a> Fetcher<'a> {
    pub fn new(
        source: &'a dyn PageSource,
        extractor: &'a Extractor,
        failures: &'a dyn FailureSink,
        pacer: &'a dyn Pacer,
        policy: RetryPolicy,
    ) -> Self {
        Fetcher { source, extractor, failures, pacer, policy }
    }

    pub fn fetch_one(&self, id: &Identifier) -> Result<Option<InsuranceRecord>> {
        let attempts = self.policy.total_attempts();

        for attempt in 1..=attempts {
            match self.try_fetch(id) {
                Ok(record) => return Ok(Some(record)),
                Err(e) if attempt < attempts => {
                    info!("Retrying for {}... (attempt {} of {}): {}", id, attempt, self.policy.max_retries, e);
                    self.pacer.pause(self.policy.delay, PauseKind::RetryBackoff);
                }
                Err(e) => error!("Error fetching details for {}: {}", id, e),
            }
        }

        self.failures.record_failure(id)?;
        Ok(None)
    }

    fn try_fetch(&self, id: &Identifier) -> Result<InsuranceRecord> {
        let markup = self.source.fetch_page(id)?;
        let fields = self.extractor.extract(&markup);
        Ok(InsuranceRecord {
            identifier: id.clone(),
            expiry_date: fields.expiry_date,
            insurance_company: fields.insurance_company,
        })
    }
}
