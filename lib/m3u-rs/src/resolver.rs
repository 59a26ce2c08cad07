use crate::parse_lines;
use crate::Error;
use crate::Fetch;
use crate::Playlist;
use crate::Resource;
use crate::ResourceKind;
use crate::Stream;
use crate::UrlAddress;
use tracing::info;

/// Turns a manifest url into a playlist or stream.
#[derive(Debug, Clone)]
pub struct ContentResolver<F> {
    fetcher: F,
}

impl<F> ContentResolver<F>
where
    F: Fetch,
{
    /// Make a new resolver that downloads with the given fetcher.
    pub fn new(fetcher: F) -> Self {
        Self { fetcher }
    }

    /// Get the inner fetcher.
    ///
    /// Use this to reload and download the resolved resource.
    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    /// Download the manifest at the url and parse it as a playlist or stream.
    ///
    /// This is never retried.
    pub async fn resolve(&self, url: &UrlAddress) -> Result<Resource, Error> {
        let content = self
            .fetcher
            .fetch_text(url)
            .await
            .map_err(|error| Error::FetchFailed {
                url: url.as_str().into(),
                error,
            })?;

        let lines = parse_lines(&content)?;
        let kind = ResourceKind::sniff(&lines);
        let resource = match kind {
            ResourceKind::Stream => Stream::from_content(url.clone(), &content)?.into(),
            ResourceKind::Playlist | ResourceKind::Segment => {
                Playlist::from_content(url.clone(), &content)?.into()
            }
        };

        info!("resolved \"{url}\" as a {}", kind.as_str());

        Ok(resource)
    }
}
