//! Page fetching with scheme, size and content-type guards

use std::time::Duration;

use mart_common::ImportConfig;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::redirect::Policy;
use tracing::{debug, info, instrument};
use url::Url;

use crate::analyze::{analyze, PageAnalysis};
use crate::error::ImportError;

const MAX_REDIRECTS: usize = 5;

/// A downloaded HTML page and the URL it was finally served from
#[derive(Debug, Clone)]
pub struct FetchedPage {
    pub url: Url,
    pub html: String,
}

#[derive(Debug, Clone)]
pub struct ListingImporter {
    client: reqwest::Client,
    config: ImportConfig,
}

impl ListingImporter {
    pub fn new(config: ImportConfig) -> Result<Self, ImportError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.clone())
            .redirect(Policy::limited(MAX_REDIRECTS))
            .build()?;

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &ImportConfig {
        &self.config
    }

    /// Validate `raw` as an absolute http(s) URL
    pub fn parse_url(raw: &str) -> Result<Url, ImportError> {
        let url = Url::parse(raw.trim()).map_err(|e| ImportError::InvalidUrl(e.to_string()))?;
        match url.scheme() {
            "http" | "https" => Ok(url),
            _ => Err(ImportError::UnsupportedScheme),
        }
    }

    #[instrument(skip(self))]
    pub async fn fetch(&self, raw_url: &str) -> Result<FetchedPage, ImportError> {
        let url = Self::parse_url(raw_url)?;

        let mut response = self
            .client
            .get(url)
            .header(ACCEPT, "text/html,application/xhtml+xml;q=0.9,*/*;q=0.5")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ImportError::Status(status.as_u16()));
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_ascii_lowercase();
        if !is_html(&content_type) {
            return Err(ImportError::NotHtml(content_type));
        }

        let limit = self.config.max_body_bytes;
        if response
            .content_length()
            .is_some_and(|len| len > limit as u64)
        {
            return Err(ImportError::TooLarge(limit));
        }

        let final_url = response.url().clone();
        let mut body: Vec<u8> = Vec::new();
        while let Some(chunk) = response.chunk().await? {
            if body.len() + chunk.len() > limit {
                return Err(ImportError::TooLarge(limit));
            }
            body.extend_from_slice(&chunk);
        }

        debug!(url = %final_url, bytes = body.len(), "Fetched import page");
        Ok(FetchedPage {
            url: final_url,
            html: String::from_utf8_lossy(&body).into_owned(),
        })
    }

    /// Fetch and analyze in one step
    #[instrument(skip(self))]
    pub async fn inspect(&self, raw_url: &str) -> Result<PageAnalysis, ImportError> {
        let page = self.fetch(raw_url).await?;
        let analysis = analyze(&page.html, &page.url, self.config.max_items);
        info!(
            url = %page.url,
            kind = ?analysis.kind,
            candidates = analysis.candidates.len(),
            "Analyzed import page"
        );
        Ok(analysis)
    }
}

fn is_html(content_type: &str) -> bool {
    content_type.contains("text/html") || content_type.contains("application/xhtml")
}
