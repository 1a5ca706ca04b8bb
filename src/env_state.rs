//! # Astris environment state
//!
//! This module defines [`AstrisEnv`], the **shared environment object** used to reach the
//! two static input files of the catalog, and [`DataSource`], the descriptor telling where a
//! file lives.
//!
//! ## Overview
//!
//! The main responsibilities of `AstrisEnv` are:
//!
//! 1. Own a single [`reqwest::Client`] (feature `remote`) with the configured timeout, so
//!    every fetch reuses the same connection pool.
//! 2. Read a [`DataSource`] fully into memory, whether it is a remote URL or a local file.
//!    Remote bodies are streamed chunk by chunk into one buffer; the catalog formats are
//!    decoded from a single blob afterwards.
//!
//! ## Structure
//!
//! ```text
//! AstrisEnv
//! └── http_client  (reqwest::Client, feature "remote")
//! ```
//!
//! ## Data source descriptors
//!
//! | descriptor                        | resolved as                       |
//! |-----------------------------------|-----------------------------------|
//! | `https://host/waypoints.csv`      | [`DataSource::Remote`]            |
//! | `file:///data/stars.pb`           | [`DataSource::Local`]             |
//! | `public/waypoints.csv`            | [`DataSource::Local`]             |
//!
//! ## Usage
//!
//! ```rust,no_run
//! use astris::env_state::{AstrisEnv, DataSource};
//!
//! # async fn run() -> Result<(), astris::astris_errors::AstrisError> {
//! let env = AstrisEnv::new(std::time::Duration::from_secs(30))?;
//! let source = DataSource::try_from("public/waypoints.csv")?;
//! let bytes = env.fetch_bytes(&source).await?;
//! # Ok(()) }
//! ```
use std::{fmt, time::Duration};

use camino::Utf8PathBuf;
use serde::Deserialize;
use tracing::{debug, info};

use crate::astris_errors::AstrisError;

/// Where one of the catalog input files can be read from.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub enum DataSource {
    /// An `http://` or `https://` URL
    Remote(String),
    /// A path on the local filesystem
    Local(Utf8PathBuf),
}

impl TryFrom<&str> for DataSource {
    type Error = AstrisError;

    fn try_from(descriptor: &str) -> Result<Self, Self::Error> {
        let descriptor = descriptor.trim();
        if descriptor.is_empty() {
            return Err(AstrisError::InvalidDataSource(descriptor.to_string()));
        }

        if descriptor.starts_with("http://") || descriptor.starts_with("https://") {
            return Ok(DataSource::Remote(descriptor.to_string()));
        }

        if let Some(path) = descriptor.strip_prefix("file://") {
            if path.is_empty() {
                return Err(AstrisError::InvalidDataSource(descriptor.to_string()));
            }
            return Ok(DataSource::Local(Utf8PathBuf::from(path)));
        }

        if descriptor.contains("://") {
            return Err(AstrisError::InvalidDataSource(descriptor.to_string()));
        }

        Ok(DataSource::Local(Utf8PathBuf::from(descriptor)))
    }
}

impl TryFrom<String> for DataSource {
    type Error = AstrisError;

    fn try_from(descriptor: String) -> Result<Self, Self::Error> {
        DataSource::try_from(descriptor.as_str())
    }
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataSource::Remote(url) => write!(f, "{url}"),
            DataSource::Local(path) => write!(f, "{path}"),
        }
    }
}

/// Environment shared by the loaders.
///
/// Cheap to clone: the HTTP client is reference counted internally.
#[derive(Debug, Clone)]
pub struct AstrisEnv {
    #[cfg(feature = "remote")]
    http_client: reqwest::Client,
}

impl AstrisEnv {
    /// Create a new environment.
    ///
    /// Arguments
    /// ---------
    /// * `timeout`: global timeout applied to each remote request
    ///
    /// Return
    /// ------
    /// * A new environment, or an error if the HTTP client cannot be built
    pub fn new(timeout: Duration) -> Result<Self, AstrisError> {
        #[cfg(feature = "remote")]
        {
            let http_client = reqwest::Client::builder().timeout(timeout).build()?;
            Ok(AstrisEnv { http_client })
        }

        #[cfg(not(feature = "remote"))]
        {
            let _ = timeout;
            Ok(AstrisEnv {})
        }
    }

    /// Read a whole data source into memory.
    ///
    /// Arguments
    /// ---------
    /// * `source`: the file or URL to read
    ///
    /// Return
    /// ------
    /// * The raw bytes of the source
    /// * An error if the file is missing, the request fails or returns a non-success status
    pub async fn fetch_bytes(&self, source: &DataSource) -> Result<Vec<u8>, AstrisError> {
        let bytes = match source {
            DataSource::Local(path) => tokio::fs::read(path).await?,
            DataSource::Remote(url) => self.download(url).await?,
        };
        debug!(%source, bytes = bytes.len(), "fetched data source");
        Ok(bytes)
    }

    #[cfg(feature = "remote")]
    async fn download(&self, url: &str) -> Result<Vec<u8>, AstrisError> {
        use tokio_stream::StreamExt;

        info!("Downloading {}...", url);
        let response = self.http_client.get(url).send().await?.error_for_status()?;

        let mut body = Vec::with_capacity(response.content_length().unwrap_or(0) as usize);
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            body.extend_from_slice(&chunk?);
        }

        info!("Downloaded {} ({} bytes)", url, body.len());
        Ok(body)
    }

    #[cfg(not(feature = "remote"))]
    async fn download(&self, url: &str) -> Result<Vec<u8>, AstrisError> {
        info!("Refusing to download {} without the remote feature", url);
        Err(AstrisError::RemoteDisabled(url.to_string()))
    }
}
