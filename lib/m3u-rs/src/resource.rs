use crate::CancellationToken;
use crate::DownloadMessage;
use crate::DownloadOutcome;
use crate::Error;
use crate::Fetch;
use crate::Playlist;
use crate::Segment;
use crate::Stream;
use crate::UrlAddress;
use tokio::io::AsyncWrite;

/// The kind of a resource
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    /// A variant playlist
    Playlist,

    /// A media stream
    Stream,

    /// A single media segment
    Segment,
}

impl ResourceKind {
    /// Guess the kind of some manifest content.
    ///
    /// Content with any media segment is a stream, anything else is a playlist.
    pub fn sniff(lines: &[&str]) -> Self {
        if lines.iter().any(|line| line.starts_with("#EXTINF:")) {
            Self::Stream
        } else {
            Self::Playlist
        }
    }

    /// Get this as a str
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Playlist => "playlist",
            Self::Stream => "stream",
            Self::Segment => "segment",
        }
    }
}

/// Something that can be downloaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resource {
    /// A variant playlist
    Playlist(Playlist),

    /// A media stream
    Stream(Stream),

    /// A single media segment
    Segment(Segment),
}

impl Resource {
    /// The kind of this resource
    pub fn kind(&self) -> ResourceKind {
        match self {
            Self::Playlist(_) => ResourceKind::Playlist,
            Self::Stream(_) => ResourceKind::Stream,
            Self::Segment(_) => ResourceKind::Segment,
        }
    }

    /// The url of this resource
    pub fn url(&self) -> &UrlAddress {
        match self {
            Self::Playlist(playlist) => playlist.url(),
            Self::Stream(stream) => stream.url(),
            Self::Segment(segment) => segment.url(),
        }
    }

    /// Download this resource into the sink, without cancellation.
    ///
    /// Playlists download their best stream.
    /// Segments send a single progress message.
    pub async fn download<F, W, C>(
        &mut self,
        fetcher: &F,
        sink: &mut W,
        mut on_message: C,
    ) -> Result<DownloadOutcome, Error>
    where
        F: Fetch,
        W: AsyncWrite + Unpin,
        C: FnMut(DownloadMessage),
    {
        match self {
            Self::Playlist(playlist) => playlist.download(fetcher, sink, on_message).await,
            Self::Stream(stream) => {
                stream
                    .download(fetcher, sink, &CancellationToken::new(), on_message)
                    .await
            }
            Self::Segment(segment) => {
                segment.download(fetcher, sink).await?;
                on_message(DownloadMessage::Progress {
                    index: 1,
                    total: 1,
                    url: segment.url().clone(),
                });
                let outcome = DownloadOutcome::Completed;
                on_message(DownloadMessage::Complete { outcome });
                Ok(outcome)
            }
        }
    }
}

impl From<Playlist> for Resource {
    fn from(playlist: Playlist) -> Self {
        Self::Playlist(playlist)
    }
}

impl From<Stream> for Resource {
    fn from(stream: Stream) -> Self {
        Self::Stream(stream)
    }
}

impl From<Segment> for Resource {
    fn from(segment: Segment) -> Self {
        Self::Segment(segment)
    }
}
