use std::fmt;
use std::path::Path;

use serde::Deserialize;

use crate::errors::{IndexerError, Result};

const ENV_ACCOUNT_ID: &str = "VIDEO_INDEXER_ACCOUNT_ID";
const ENV_LOCATION: &str = "VIDEO_INDEXER_LOCATION";
const ENV_API_KEY: &str = "VIDEO_INDEXER_API_KEY";

/// Account credentials for the Video Indexer API.
///
/// The on-disk form is a JSON document:
///
/// ```json
/// { "AccountId": "00000000-0000-0000-0000-000000000000", "location": "trial", "API_KEY": "..." }
/// ```
#[derive(Clone)]
pub struct Credentials {
    account_id: String,
    /// Region, e.g. "trial" or "westus2".
    location: String,
    subscription_key: String,
}

/// On-disk shape of [`Credentials`]; only reachable through validation.
#[derive(Deserialize)]
struct CredentialsFile {
    #[serde(rename = "AccountId")]
    account_id: String,
    location: String,
    #[serde(rename = "API_KEY")]
    subscription_key: String,
}

impl Credentials {
    /// Build credentials from their parts. Fails if any part is blank.
    pub fn new(
        account_id: impl Into<String>,
        location: impl Into<String>,
        subscription_key: impl Into<String>,
    ) -> Result<Self> {
        let creds = Self {
            account_id: account_id.into(),
            location: location.into(),
            subscription_key: subscription_key.into(),
        };
        creds.validate()?;
        Ok(creds)
    }

    /// Read credentials from a JSON configuration file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| IndexerError::Config {
            message: format!("cannot read {}: {e}", path.display()),
        })?;
        Self::from_json(&text).map_err(|e| match e {
            IndexerError::Config { message } => IndexerError::Config {
                message: format!("{}: {message}", path.display()),
            },
            other => other,
        })
    }

    /// Parse credentials from a JSON configuration document.
    pub fn from_json(text: &str) -> Result<Self> {
        let file: CredentialsFile =
            serde_json::from_str(text).map_err(|e| IndexerError::Config {
                message: format!("invalid configuration: {e}"),
            })?;
        Self::new(file.account_id, file.location, file.subscription_key)
    }

    /// Read credentials from `VIDEO_INDEXER_ACCOUNT_ID`, `VIDEO_INDEXER_LOCATION`
    /// and `VIDEO_INDEXER_API_KEY`.
    pub fn from_env() -> Result<Self> {
        let var = |name: &str| {
            std::env::var(name).map_err(|_| IndexerError::Config {
                message: format!("environment variable {name} is not set"),
            })
        };
        Self::new(var(ENV_ACCOUNT_ID)?, var(ENV_LOCATION)?, var(ENV_API_KEY)?)
    }

    /// Account GUID, as shown in the Video Indexer portal.
    pub fn account_id(&self) -> &str {
        &self.account_id
    }

    /// Region the account lives in.
    pub fn location(&self) -> &str {
        &self.location
    }

    /// API Management subscription key used to request access tokens.
    pub fn subscription_key(&self) -> &str {
        &self.subscription_key
    }

    fn validate(&self) -> Result<()> {
        for (field, value) in [
            ("AccountId", &self.account_id),
            ("location", &self.location),
            ("API_KEY", &self.subscription_key),
        ] {
            if value.trim().is_empty() {
                return Err(IndexerError::Config {
                    message: format!("field {field} must not be empty"),
                });
            }
        }
        Ok(())
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("account_id", &self.account_id)
            .field("location", &self.location)
            .field("subscription_key", &"<redacted>")
            .finish()
    }
}
