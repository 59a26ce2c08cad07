use crate::tag::parse_tags;
use crate::tag::Tag;
use crate::CancellationToken;
use crate::DownloadMessage;
use crate::DownloadOutcome;
use crate::Error;
use crate::Fetch;
use crate::Stream;
use crate::UrlAddress;
use crate::DEFAULT_TARGET_DURATION;
use std::time::Duration;
use tokio::io::AsyncWrite;
use tracing::info;

/// A variant playlist.
///
/// This lists the same content at different qualities.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Playlist {
    url: UrlAddress,
    target_duration: Duration,
    streams: Vec<Stream>,
}

impl Playlist {
    /// Make a new, empty playlist for the given url.
    pub fn new(url: UrlAddress) -> Self {
        Self {
            url,
            target_duration: DEFAULT_TARGET_DURATION,
            streams: Vec::new(),
        }
    }

    /// Make a playlist from already downloaded manifest content.
    pub fn from_content(url: UrlAddress, content: &str) -> Result<Self, Error> {
        let mut playlist = Self::new(url);
        playlist.parse(content)?;
        Ok(playlist)
    }

    /// The url of this playlist
    pub fn url(&self) -> &UrlAddress {
        &self.url
    }

    /// The target duration
    pub fn target_duration(&self) -> Duration {
        self.target_duration
    }

    /// The variant streams, in manifest order.
    ///
    /// These have not been downloaded yet, so they have no segments.
    pub fn streams(&self) -> &[Stream] {
        &self.streams
    }

    /// Get a mutable ref to the variant streams.
    pub fn streams_mut(&mut self) -> &mut [Stream] {
        &mut self.streams
    }

    /// Consume this playlist, returning its streams.
    pub fn into_streams(self) -> Vec<Stream> {
        self.streams
    }

    /// Parse manifest content into this playlist.
    ///
    /// Streams are appended to any existing ones.
    /// On error, this playlist is left unchanged.
    pub fn parse(&mut self, content: &str) -> Result<(), Error> {
        let tags = parse_tags(content)?;

        let mut target_duration = self.target_duration;
        let mut streams = Vec::with_capacity(4);
        for tag_line in tags.iter() {
            match &tag_line.tag {
                Tag::ExtXTargetDuration { duration } => {
                    target_duration = *duration;
                }
                Tag::ExtXStreamInf { resolution } => {
                    let url = tag_line.resolve_uri(&self.url)?;
                    streams.push(Stream::with_resolution(url, *resolution));
                }
                Tag::ExtXAllowCache
                | Tag::ExtXVersion
                | Tag::ExtXMediaSequence
                | Tag::ExtXEndList
                | Tag::ExtInf
                | Tag::Unknown => {}
            }
        }

        self.target_duration = target_duration;
        self.streams.extend(streams);

        Ok(())
    }

    /// Download this playlist's manifest again and replace the parsed state.
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

        *self = Self::from_content(self.url.clone(), &content)?;

        info!(
            "reloaded playlist \"{}\" with {} streams",
            self.url,
            self.streams.len()
        );

        Ok(())
    }

    /// Get the index of the stream with the highest resolution.
    ///
    /// If multiple streams share the highest resolution, the first is picked.
    pub fn best_stream_index(&self) -> Option<usize> {
        self.streams
            .iter()
            .enumerate()
            .fold(None, |best, (index, stream)| match best {
                Some((_, resolution)) if resolution >= stream.resolution() => best,
                _ => Some((index, stream.resolution())),
            })
            .map(|(index, _)| index)
    }

    /// Get the stream with the highest resolution.
    ///
    /// If multiple streams share the highest resolution, the first is picked.
    pub fn select_best_stream(&self) -> Option<&Stream> {
        self.best_stream_index().map(|index| &self.streams[index])
    }

    /// Download the best stream into the sink.
    ///
    /// The best stream is reloaded first if it has no segments.
    /// This cannot be canceled.
    pub async fn download<F, W, C>(
        &mut self,
        fetcher: &F,
        sink: &mut W,
        on_message: C,
    ) -> Result<DownloadOutcome, Error>
    where
        F: Fetch,
        W: AsyncWrite + Unpin,
        C: FnMut(DownloadMessage),
    {
        let index = self.best_stream_index().ok_or(Error::NoValidStream)?;
        let stream = &mut self.streams[index];
        if stream.segments().is_empty() {
            stream.reload(fetcher).await?;
        }

        stream
            .download(fetcher, sink, &CancellationToken::new(), on_message)
            .await
    }
}
