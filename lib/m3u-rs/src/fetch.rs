use crate::UrlAddress;
use std::future::Future;

/// A transport error
pub type FetchError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Something that can download manifests and media segments.
///
/// Implementors should be stateless between calls,
/// as one fetcher is shared for every request in a download.
pub trait Fetch {
    /// Download the url as text.
    fn fetch_text(
        &self,
        url: &UrlAddress,
    ) -> impl Future<Output = Result<String, FetchError>> + Send;

    /// Download the url as bytes.
    fn fetch_bytes(
        &self,
        url: &UrlAddress,
    ) -> impl Future<Output = Result<Vec<u8>, FetchError>> + Send;
}

#[cfg(feature = "reqwest")]
impl Fetch for reqwest::Client {
    async fn fetch_text(&self, url: &UrlAddress) -> Result<String, FetchError> {
        let text = self
            .get(url.as_str())
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        Ok(text)
    }

    async fn fetch_bytes(&self, url: &UrlAddress) -> Result<Vec<u8>, FetchError> {
        let bytes = self
            .get(url.as_str())
            .send()
            .await?
            .error_for_status()?
            .bytes()
            .await?;
        Ok(bytes.to_vec())
    }
}
