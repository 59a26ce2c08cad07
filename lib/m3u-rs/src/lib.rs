//! Resolve and download HLS manifests.
//!
//! https://datatracker.ietf.org/doc/html/rfc8216

mod download;
mod fetch;
mod playlist;
mod resolver;
mod resource;
mod segment;
mod stream;
mod tag;
mod url_address;

pub use self::download::DownloadMessage;
pub use self::download::DownloadOutcome;
pub use self::fetch::Fetch;
pub use self::fetch::FetchError;
pub use self::playlist::Playlist;
pub use self::resolver::ContentResolver;
pub use self::resource::Resource;
pub use self::resource::ResourceKind;
pub use self::segment::Segment;
pub use self::stream::Stream;
pub use self::tag::parse_lines;
pub use self::url_address::UrlAddress;
pub use tokio_util::sync::CancellationToken;

const EXT_M3U_TAG: &str = "#EXTM3U";
const EXT_X_TARGET_DURATION_TAG: &str = "EXT-X-TARGETDURATION";
const EXT_X_ALLOW_CACHE_TAG: &str = "EXT-X-ALLOW-CACHE";
const EXT_X_VERSION_TAG: &str = "EXT-X-VERSION";
const EXT_X_MEDIA_SEQUENCE_TAG: &str = "EXT-X-MEDIA-SEQUENCE";
const EXT_X_END_LIST_TAG: &str = "EXT-X-ENDLIST";
const EXT_INF_TAG: &str = "EXTINF";
const EXT_X_STREAM_INF_TAG: &str = "EXT-X-STREAM-INF";

/// The target duration used until a manifest sets one
const DEFAULT_TARGET_DURATION: std::time::Duration = std::time::Duration::from_secs(100);

/// The library error type
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A url was empty
    #[error("the url is empty")]
    InvalidUrl,

    /// The manifest had no content
    #[error("the manifest is empty")]
    EmptyContent,

    /// The manifest is structurally invalid
    #[error("the manifest is malformed")]
    MalformedManifest(#[from] MalformedManifestError),

    /// The target duration was not an integer
    #[error("invalid target duration \"{value}\"")]
    InvalidDuration {
        /// The raw value
        value: Box<str>,

        /// The inner error
        #[source]
        error: std::num::ParseIntError,
    },

    /// A network request failed
    #[error("failed to fetch \"{url}\"")]
    FetchFailed {
        /// The url that was requested
        url: Box<str>,

        /// The transport error
        #[source]
        error: FetchError,
    },

    /// A playlist had no streams to pick from
    #[error("the playlist has no streams")]
    NoValidStream,

    /// Failed to write to the output
    #[error("failed to write to the output")]
    Write(#[source] std::io::Error),
}

/// The ways a manifest may be malformed
#[derive(Debug, thiserror::Error)]
pub enum MalformedManifestError {
    /// The first line was not the `#EXTM3U` header
    #[error("invalid start line \"{line}\"")]
    InvalidHeader {
        /// The first line, trimmed
        line: Box<str>,
    },

    /// A tag that must be followed by a uri was not
    #[error("tag \"{tag}\" is not followed by a uri")]
    MissingUri {
        /// The tag name
        tag: Box<str>,
    },
}

#[cfg(test)]
pub(crate) mod test_util {
    use crate::Fetch;
    use crate::FetchError;
    use crate::UrlAddress;
    use std::collections::HashMap;
    use std::sync::Mutex;

    pub(crate) const SIMPLE_STREAM: &str = include_str!(concat!(
        env!("CARGO_MANIFEST_DIR"),
        "/test_data/simple-stream.m3u8"
    ));

    pub(crate) const MASTER_PLAYLIST: &str = include_str!(concat!(
        env!("CARGO_MANIFEST_DIR"),
        "/test_data/master-playlist.m3u8"
    ));

    pub(crate) const RELATIVE_STREAM: &str = include_str!(concat!(
        env!("CARGO_MANIFEST_DIR"),
        "/test_data/relative-stream.m3u8"
    ));

    /// An in-memory fetcher that records every request.
    #[derive(Debug, Default)]
    pub(crate) struct MockFetcher {
        texts: HashMap<String, String>,
        bytes: HashMap<String, Vec<u8>>,
        requests: Mutex<Vec<String>>,
    }

    impl MockFetcher {
        pub(crate) fn new() -> Self {
            Self::default()
        }

        pub(crate) fn with_text(mut self, url: &str, text: &str) -> Self {
            self.texts.insert(url.into(), text.into());
            self
        }

        pub(crate) fn with_bytes(mut self, url: &str, bytes: &[u8]) -> Self {
            self.bytes.insert(url.into(), bytes.into());
            self
        }

        pub(crate) fn requests(&self) -> Vec<String> {
            self.requests.lock().expect("poisoned").clone()
        }

        fn record(&self, url: &UrlAddress) {
            self.requests
                .lock()
                .expect("poisoned")
                .push(url.as_str().into());
        }
    }

    impl Fetch for MockFetcher {
        async fn fetch_text(&self, url: &UrlAddress) -> Result<String, FetchError> {
            self.record(url);
            self.texts
                .get(url.as_str())
                .cloned()
                .ok_or_else(|| format!("404 not found: {url}").into())
        }

        async fn fetch_bytes(&self, url: &UrlAddress) -> Result<Vec<u8>, FetchError> {
            self.record(url);
            self.bytes
                .get(url.as_str())
                .cloned()
                .ok_or_else(|| format!("404 not found: {url}").into())
        }
    }
}
