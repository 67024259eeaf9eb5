use reqwest::Client as HttpClient;
use tracing::debug;

use crate::error::{KursError, Result};

/// Fetches the exchange office's rates page
pub struct KursClient {
    http_client: HttpClient,
    url: String,
}

impl KursClient {
    pub const DEFAULT_URL: &'static str = "http://kurs.kharkov.com";

    pub fn new(url: &str) -> Self {
        Self {
            http_client: HttpClient::new(),
            url: url.to_string(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// GET the rates page and return its HTML
    pub async fn fetch_page(&self) -> Result<String> {
        let response = self.http_client.get(&self.url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(KursError::Page(format!(
                "{} answered with HTTP {}",
                self.url,
                status.as_u16()
            )));
        }

        let body = response.text().await?;
        debug!("Downloaded {} bytes from {}", body.len(), self.url);
        Ok(body)
    }
}

impl Default for KursClient {
    fn default() -> Self {
        Self::new(Self::DEFAULT_URL)
    }
}
