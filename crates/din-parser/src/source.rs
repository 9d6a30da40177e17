//! Ontology source resolution and loading

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;

use oxrdfio::RdfFormat;
use reqwest::{Client, Url};

use din_core::{ExtractConfig, Result, TaxonomyError};

/// Where an ontology is read from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OwlSource {
    /// HTTP or HTTPS location
    Url(Url),
    /// Local file
    File(PathBuf),
}

impl OwlSource {
    /// Classify a `--source` argument. Only `http` and `https` URLs are
    /// fetched; everything else is a file path.
    pub fn parse(value: &str) -> Self {
        match Url::parse(value) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => Self::Url(url),
            _ => Self::File(PathBuf::from(value)),
        }
    }

    /// Human-readable location for messages
    pub fn location(&self) -> String {
        self.to_string()
    }

    /// Base IRI for resolving relative IRIs in the document. Files resolve
    /// against their absolute `file://` URL.
    pub fn base_iri(&self) -> Option<String> {
        match self {
            Self::Url(url) => Some(url.to_string()),
            Self::File(path) => {
                let absolute = path
                    .canonicalize()
                    .or_else(|_| std::env::current_dir().map(|dir| dir.join(path)))
                    .ok()?;
                Url::from_file_path(absolute).ok().map(String::from)
            }
        }
    }

    /// Guess the RDF serialization from the extension
    pub fn format(&self) -> RdfFormat {
        let extension = match self {
            Self::Url(url) => Path::new(url.path())
                .extension()
                .and_then(|e| e.to_str())
                .map(str::to_lowercase),
            Self::File(path) => path
                .extension()
                .and_then(|e| e.to_str())
                .map(str::to_lowercase),
        };

        extension
            .as_deref()
            .and_then(RdfFormat::from_extension)
            .unwrap_or(RdfFormat::RdfXml)
    }
}

impl std::fmt::Display for OwlSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Url(url) => write!(f, "{url}"),
            Self::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Reads the raw bytes of an ontology source
#[derive(Debug, Clone)]
pub struct SourceLoader {
    timeout: Duration,
    insecure_tls_fallback: bool,
    user_agent: String,
}

impl SourceLoader {
    /// Create a loader from the extraction settings
    pub fn new(config: &ExtractConfig) -> Self {
        Self {
            timeout: Duration::from_secs(config.http_timeout_secs),
            insecure_tls_fallback: config.insecure_tls_fallback,
            user_agent: config.user_agent.clone(),
        }
    }

    /// Read the full source into memory
    pub async fn load(&self, source: &OwlSource) -> Result<Vec<u8>> {
        let content = match source {
            OwlSource::Url(url) => self.fetch(url).await?,
            OwlSource::File(path) => read_file(path).await?,
        };

        tracing::info!(source = %source, bytes = content.len(), "loaded ontology source");
        Ok(content)
    }

    async fn fetch(&self, url: &Url) -> Result<Vec<u8>> {
        tracing::debug!(%url, timeout_secs = self.timeout.as_secs(), "fetching ontology");

        match self.fetch_with(url, false).await {
            Ok(content) => Ok(content),
            Err(e) if self.insecure_tls_fallback && url.scheme() == "https" && e.is_connect() => {
                tracing::warn!(
                    %url,
                    error = %e,
                    "connection failed, retrying without TLS certificate verification"
                );
                self.fetch_with(url, true).await.map_err(|e| {
                    TaxonomyError::source_unavailable(
                        url.as_str(),
                        format!("{} (after insecure TLS retry)", error_chain(e)),
                    )
                })
            }
            Err(e) => Err(TaxonomyError::source_unavailable(
                url.as_str(),
                error_chain(e),
            )),
        }
    }

    async fn fetch_with(&self, url: &Url, insecure: bool) -> reqwest::Result<Vec<u8>> {
        let client = Client::builder()
            .timeout(self.timeout)
            .user_agent(self.user_agent.as_str())
            .danger_accept_invalid_certs(insecure)
            .build()?;

        let response = client.get(url.clone()).send().await?.error_for_status()?;
        Ok(response.bytes().await?.to_vec())
    }
}

async fn read_file(path: &Path) -> Result<Vec<u8>> {
    tokio::fs::read(path).await.map_err(|e| {
        let reason = if e.kind() == ErrorKind::NotFound {
            "file does not exist".to_string()
        } else {
            e.to_string()
        };
        TaxonomyError::source_unavailable(path.display().to_string(), reason)
    })
}

fn error_chain(e: reqwest::Error) -> String {
    format!("{:#}", anyhow::Error::new(e))
}
