//! Static credential headers

use async_trait::async_trait;
use recordfetch_core::HeaderSource;
use recordfetch_domain::{RecordFetchError, RequestHeaders, Result};

const DEVELOPER_KEY_VAR: &str = "RECORDFETCH_DEVELOPER_KEY";
const CUSTOMER_KEY_VAR: &str = "RECORDFETCH_CUSTOMER_KEY";

/// Header source that hands out the same headers for every run.
#[derive(Debug, Clone, Default)]
pub struct StaticHeaderSource {
    headers: RequestHeaders,
}

impl StaticHeaderSource {
    /// Attach `headers` to every request
    pub fn new(headers: RequestHeaders) -> Self {
        Self { headers }
    }

    /// `Authorization: ODFHIR {developer_key}/{customer_key}`
    pub fn odfhir(developer_key: &str, customer_key: &str) -> Self {
        let mut headers = RequestHeaders::new();
        headers.insert("Authorization", format!("ODFHIR {developer_key}/{customer_key}"));
        Self { headers }
    }

    /// Build the ODFHIR header from `RECORDFETCH_DEVELOPER_KEY` and
    /// `RECORDFETCH_CUSTOMER_KEY`.
    ///
    /// # Errors
    /// Returns `RecordFetchError::Config` if either key is missing or blank.
    pub fn from_env() -> Result<Self> {
        let developer_key = required_key(DEVELOPER_KEY_VAR)?;
        let customer_key = required_key(CUSTOMER_KEY_VAR)?;
        Ok(Self::odfhir(&developer_key, &customer_key))
    }

    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name, value);
        self
    }
}

#[async_trait]
impl HeaderSource for StaticHeaderSource {
    async fn headers(&self) -> RequestHeaders {
        self.headers.clone()
    }
}

fn required_key(key: &str) -> Result<String> {
    std::env::var(key)
        .ok()
        .filter(|value| !value.trim().is_empty())
        .ok_or_else(|| RecordFetchError::Config(format!("{key} is not set")))
}
