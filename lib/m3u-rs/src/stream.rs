use crate::tag::parse_tags;
use crate::tag::Tag;
use crate::CancellationToken;
use crate::DownloadMessage;
use crate::DownloadOutcome;
use crate::Error;
use crate::Fetch;
use crate::Segment;
use crate::UrlAddress;
use crate::DEFAULT_TARGET_DURATION;
use std::time::Duration;
use tokio::io::AsyncWrite;
use tokio::io::AsyncWriteExt;
use tracing::info;

/// A media stream.
///
/// This is a single rendition, made of media segments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stream {
    url: UrlAddress,
    target_duration: Duration,
    resolution: u64,
    is_complete: bool,
    segments: Vec<Segment>,
}

impl Stream {
    /// Make a new, empty stream for the given url.
    pub fn new(url: UrlAddress) -> Self {
        Self::with_resolution(url, 0)
    }

    /// Make a new, empty stream with a resolution taken from a playlist.
    pub(crate) fn with_resolution(url: UrlAddress, resolution: u64) -> Self {
        Self {
            url,
            target_duration: DEFAULT_TARGET_DURATION,
            resolution,
            is_complete: false,
            segments: Vec::new(),
        }
    }

    /// Make a stream from already downloaded manifest content.
    pub fn from_content(url: UrlAddress, content: &str) -> Result<Self, Error> {
        let mut stream = Self::new(url);
        stream.parse(content)?;
        Ok(stream)
    }

    /// The url of this stream's manifest
    pub fn url(&self) -> &UrlAddress {
        &self.url
    }

    /// The target duration
    pub fn target_duration(&self) -> Duration {
        self.target_duration
    }

    /// The resolution, or 0 if unknown
    pub fn resolution(&self) -> u64 {
        self.resolution
    }

    /// Whether the manifest contained the end list tag
    pub fn is_complete(&self) -> bool {
        self.is_complete
    }

    /// The media segments, in download order
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Parse manifest content into this stream.
    ///
    /// Segments are appended to any existing ones.
    /// On error, this stream is left unchanged.
    pub fn parse(&mut self, content: &str) -> Result<(), Error> {
        let tags = parse_tags(content)?;

        let mut target_duration = self.target_duration;
        let mut is_complete = self.is_complete;
        let mut segments = Vec::with_capacity(tags.len());
        for tag_line in tags.iter() {
            match &tag_line.tag {
                Tag::ExtXTargetDuration { duration } => {
                    target_duration = *duration;
                }
                Tag::ExtXEndList => {
                    is_complete = true;
                }
                Tag::ExtInf => {
                    let url = tag_line.resolve_uri(&self.url)?;
                    segments.push(Segment::new(url));
                }
                Tag::ExtXAllowCache
                | Tag::ExtXVersion
                | Tag::ExtXMediaSequence
                | Tag::ExtXStreamInf { .. }
                | Tag::Unknown => {}
            }
        }

        self.target_duration = target_duration;
        self.is_complete = is_complete;
        self.segments.extend(segments);

        Ok(())
    }

    /// Download this stream's manifest again and replace the parsed state.
    ///
    /// The resolution is kept, as it comes from the parent playlist.
    pub async fn reload<F>(&mut self, fetcher: &F) -> Result<(), Error>
    where
        F: Fetch,
    {
        let content = fetcher
            .fetch_text(&self.url)
            .await
            .map_err(|error| Error::FetchFailed {
                url: self.url.as_str().into(),
                error,
            })?;

        let mut stream = Self::with_resolution(self.url.clone(), self.resolution);
        stream.parse(&content)?;
        *self = stream;

        info!(
            "reloaded stream \"{}\" with {} segments",
            self.url,
            self.segments.len()
        );

        Ok(())
    }

    /// Download every segment, in order, into the sink.
    ///
    /// A progress message is sent after each segment is written.
    /// The cancellation token is checked after each progress message.
    /// Once the loop stops, a single complete message is sent.
    pub async fn download<F, W, C>(
        &self,
        fetcher: &F,
        sink: &mut W,
        cancellation_token: &CancellationToken,
        mut on_message: C,
    ) -> Result<DownloadOutcome, Error>
    where
        F: Fetch,
        W: AsyncWrite + Unpin,
        C: FnMut(DownloadMessage),
    {
        let total = self.segments.len();
        info!("downloading {total} segments from \"{}\"", self.url);

        let mut outcome = DownloadOutcome::Completed;
        for (index, segment) in self.segments.iter().enumerate() {
            segment.download(fetcher, sink).await?;

            on_message(DownloadMessage::Progress {
                index: index + 1,
                total,
                url: segment.url().clone(),
            });

            if cancellation_token.is_cancelled() {
                info!("download canceled after {}/{total} segments", index + 1);
                outcome = DownloadOutcome::Canceled;
                break;
            }
        }

        sink.flush().await.map_err(Error::Write)?;

        if outcome == DownloadOutcome::Completed {
            info!("downloaded {total} segments from \"{}\"", self.url);
        }
        on_message(DownloadMessage::Complete { outcome });

        Ok(outcome)
    }
}
