use crate::Error;
use crate::Fetch;
use crate::UrlAddress;
use tokio::io::AsyncWrite;
use tokio::io::AsyncWriteExt;
use tracing::debug;

/// A media segment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    url: UrlAddress,
}

impl Segment {
    /// Make a new segment for an already resolved url.
    pub fn new(url: UrlAddress) -> Self {
        Self { url }
    }

    /// The url of this segment
    pub fn url(&self) -> &UrlAddress {
        &self.url
    }

    /// Download this segment and append it to the sink.
    ///
    /// Returns the number of bytes written.
    pub async fn download<F, W>(&self, fetcher: &F, sink: &mut W) -> Result<usize, Error>
    where
        F: Fetch,
        W: AsyncWrite + Unpin,
    {
        debug!("fetching segment \"{}\"", self.url);
        let bytes = fetcher
            .fetch_bytes(&self.url)
            .await
            .map_err(|error| Error::FetchFailed {
                url: self.url.as_str().into(),
                error,
            })?;

        sink.write_all(&bytes).await.map_err(Error::Write)?;

        Ok(bytes.len())
    }
}
