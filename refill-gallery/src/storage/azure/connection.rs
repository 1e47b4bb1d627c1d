//! Azure Storage connection string parsing
//!
//! Connection strings are `;`-separated `Key=Value` pairs. Values may contain
//! `=` (account keys are base64), so each pair is split at its first `=`.
//!
//! ```text
//! DefaultEndpointsProtocol=https;AccountName=acct;AccountKey=bXlrZXk=;EndpointSuffix=core.windows.net
//! BlobEndpoint=https://acct.blob.core.windows.net;SharedAccessSignature=sv=2022-11-02&sig=...
//! UseDevelopmentStorage=true
//! ```
//!
//! A parsed [`ConnectionString`] is turned into an `object_store` builder by
//! [`ConnectionString::builder`].

use base64::{engine::general_purpose::STANDARD as BASE64_STANDARD, Engine};
use object_store::azure::{AzureConfigKey, MicrosoftAzureBuilder};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use url::{Host, Url};

/// Well-known account name of the Azurite emulator
pub const DEV_ACCOUNT_NAME: &str = "devstoreaccount1";

/// Well-known account key of the Azurite emulator
pub const DEV_ACCOUNT_KEY: &str =
    "Eby8vdM02xNOcqFlqUwJPLlmEtlCDXJ1OUzFT50uSRZ6IFsuFq2UVErCz4I6tq/K1SZFPTOtr/KBHBeksoGMGw==";

/// Blob endpoint of a locally running Azurite emulator
pub const DEV_BLOB_ENDPOINT: &str = "http://127.0.0.1:10000/devstoreaccount1";

/// Errors produced while parsing a connection string
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConnectionStringError {
    /// A segment had no `=`
    #[error("malformed connection string segment: {0}")]
    Malformed(String),

    /// A required setting is absent
    #[error("connection string is missing {0}")]
    Missing(&'static str),

    /// `AccountKey` is not valid base64
    #[error("AccountKey is not valid base64")]
    InvalidAccountKey,

    /// `BlobEndpoint` is not an absolute URL
    #[error("BlobEndpoint is not a valid URL: {0}")]
    InvalidEndpoint(String),
}

/// How requests to the account are authorized
#[derive(Clone, PartialEq, Eq)]
pub enum Credential {
    /// Shared Key authorization with the base64 account key
    AccountKey(String),

    /// Shared access signature, without a leading `?`
    Sas(String),
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AccountKey(_) => f.write_str("AccountKey(<redacted>)"),
            Self::Sas(_) => f.write_str("Sas(<redacted>)"),
        }
    }
}

/// Parsed connection string
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionString {
    /// Storage account name
    pub account_name: String,

    /// Base URL of the blob service, without trailing slash
    pub blob_endpoint: String,

    /// Request authorization
    pub credential: Credential,
}

impl ConnectionString {
    /// Connection settings for a local Azurite emulator
    #[must_use]
    pub fn development() -> Self {
        Self {
            account_name: DEV_ACCOUNT_NAME.to_string(),
            blob_endpoint: DEV_BLOB_ENDPOINT.to_string(),
            credential: Credential::AccountKey(DEV_ACCOUNT_KEY.to_string()),
        }
    }

    /// Builder for an `object_store` client of `container` on this account
    ///
    /// Plain `http` endpoints (Azurite) are allowed only when the endpoint
    /// itself is `http`.
    #[must_use]
    pub fn builder(&self, container: &str) -> MicrosoftAzureBuilder {
        let builder = MicrosoftAzureBuilder::new()
            .with_account(self.account_name.clone())
            .with_container_name(container.to_string())
            .with_endpoint(self.blob_endpoint.clone())
            .with_allow_http(self.blob_endpoint.starts_with("http://"));

        match &self.credential {
            Credential::AccountKey(key) => builder.with_access_key(key.clone()),
            Credential::Sas(token) => builder.with_config(AzureConfigKey::SasKey, token.clone()),
        }
    }
}

/// Account name implied by a blob endpoint
///
/// `https://acct.blob.core.windows.net` names it in the first host label;
/// emulator-style endpoints (`http://127.0.0.1:10000/acct`) in the first
/// path segment.
fn account_from_endpoint(endpoint: &Url) -> Option<String> {
    let from_path = || {
        endpoint
            .path_segments()
            .and_then(|mut segments| segments.next())
            .filter(|segment| !segment.is_empty())
            .map(str::to_string)
    };

    match endpoint.host()? {
        Host::Domain("localhost") | Host::Ipv4(_) | Host::Ipv6(_) => from_path(),
        Host::Domain(domain) => domain
            .split('.')
            .next()
            .filter(|label| !label.is_empty())
            .map(str::to_string),
    }
}

impl FromStr for ConnectionString {
    type Err = ConnectionStringError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut settings = HashMap::new();
        for segment in s.split(';').map(str::trim).filter(|seg| !seg.is_empty()) {
            let (key, value) = segment
                .split_once('=')
                .ok_or_else(|| ConnectionStringError::Malformed(segment.to_string()))?;
            settings.insert(key.trim().to_ascii_lowercase(), value.trim().to_string());
        }

        if settings
            .get("usedevelopmentstorage")
            .is_some_and(|v| v.eq_ignore_ascii_case("true"))
        {
            return Ok(Self::development());
        }

        let (blob_endpoint, account_name) = match settings.get("blobendpoint") {
            Some(endpoint) => {
                let endpoint = endpoint.trim_end_matches('/').to_string();
                let url = Url::parse(&endpoint)
                    .map_err(|e| ConnectionStringError::InvalidEndpoint(e.to_string()))?;
                let account_name = settings
                    .get("accountname")
                    .cloned()
                    .or_else(|| account_from_endpoint(&url))
                    .ok_or(ConnectionStringError::Missing("AccountName"))?;
                (endpoint, account_name)
            }
            None => {
                let account_name = settings
                    .get("accountname")
                    .cloned()
                    .ok_or(ConnectionStringError::Missing("AccountName or BlobEndpoint"))?;
                let protocol = settings
                    .get("defaultendpointsprotocol")
                    .map_or("https", String::as_str);
                let suffix = settings
                    .get("endpointsuffix")
                    .map_or("core.windows.net", String::as_str);
                (format!("{protocol}://{account_name}.blob.{suffix}"), account_name)
            }
        };

        let credential = if let Some(sas) = settings.get("sharedaccesssignature") {
            Credential::Sas(sas.trim_start_matches('?').to_string())
        } else {
            let key = settings
                .get("accountkey")
                .ok_or(ConnectionStringError::Missing("AccountKey or SharedAccessSignature"))?;
            BASE64_STANDARD
                .decode(key)
                .map_err(|_| ConnectionStringError::InvalidAccountKey)?;
            Credential::AccountKey(key.clone())
        };

        Ok(Self {
            account_name,
            blob_endpoint,
            credential,
        })
    }
}
