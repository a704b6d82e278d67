use eyre::Result;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};

/// Header carrying the Crunchbase user key
pub const API_KEY_HEADER: &str = "X-cb-user-key";

/// Credential attached to every API request
#[derive(Clone)]
pub enum Auth {
    /// Crunchbase user key sent via the `X-cb-user-key` header
    Apikey(String),
}

impl Auth {
    /// Append the credential header to `headers`
    pub fn apply(&self, headers: &mut HeaderMap) -> Result<()> {
        match self {
            Self::Apikey(key) => {
                let mut value = HeaderValue::from_str(key)?;
                value.set_sensitive(true);
                headers.append(HeaderName::from_static("x-cb-user-key"), value);
            }
        }
        Ok(())
    }
}

impl std::fmt::Display for Auth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Apikey(_) => write!(f, "Apikey"),
        }
    }
}

// Keep the key out of debug output
impl std::fmt::Debug for Auth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Display::fmt(self, f)
    }
}
