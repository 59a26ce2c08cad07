use crate::UrlAddress;

/// A message about the state of a stream download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadMessage {
    /// A media segment was written to the output.
    Progress {
        /// The 1-based index of the segment
        index: usize,

        /// The total number of segments
        total: usize,

        /// The url of the segment
        url: UrlAddress,
    },

    /// The download stopped.
    ///
    /// This is sent exactly once, after all progress messages.
    /// It is not sent if the download failed with an error.
    Complete {
        /// How the download ended
        outcome: DownloadOutcome,
    },
}

/// How a download ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DownloadOutcome {
    /// Every segment was written
    Completed,

    /// The download was canceled at a segment boundary.
    ///
    /// The output holds every segment before the cancellation.
    Canceled,
}

impl DownloadOutcome {
    /// A human readable message for this outcome
    pub fn message(self) -> &'static str {
        match self {
            Self::Completed => "Downloading complete!",
            Self::Canceled => "Downloading canceled by user!",
        }
    }
}

impl std::fmt::Display for DownloadOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.message())
    }
}
