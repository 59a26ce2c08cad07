use crate::Error;
use crate::MalformedManifestError;
use crate::UrlAddress;
use crate::EXT_INF_TAG;
use crate::EXT_M3U_TAG;
use crate::EXT_X_ALLOW_CACHE_TAG;
use crate::EXT_X_END_LIST_TAG;
use crate::EXT_X_MEDIA_SEQUENCE_TAG;
use crate::EXT_X_STREAM_INF_TAG;
use crate::EXT_X_TARGET_DURATION_TAG;
use crate::EXT_X_VERSION_TAG;
use once_cell::sync::Lazy;
use regex::Regex;
use std::time::Duration;
use tracing::warn;

static RESOLUTION_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"RESOLUTION=(\d+)").expect("invalid resolution regex"));

/// Split manifest content into raw lines and validate the header.
///
/// The returned lines are untrimmed and include the header line.
pub fn parse_lines(content: &str) -> Result<Vec<&str>, Error> {
    if content.trim().is_empty() {
        return Err(Error::EmptyContent);
    }

    let lines: Vec<&str> = content.split('\n').collect();
    let header = lines.first().copied().unwrap_or_default().trim();
    if header != EXT_M3U_TAG {
        return Err(Error::MalformedManifest(
            MalformedManifestError::InvalidHeader {
                line: header.into(),
            },
        ));
    }

    Ok(lines)
}

/// Parse every tag line after the header, in order.
pub(crate) fn parse_tags(content: &str) -> Result<Vec<TagLine<'_>>, Error> {
    let lines = parse_lines(content)?;

    let mut tags = Vec::with_capacity(lines.len() / 2);
    for (index, &line) in lines.iter().enumerate().skip(1) {
        let line = line.trim();
        let Some(line) = line.strip_prefix('#') else {
            continue;
        };

        let (name, value) = line.split_once(':').unwrap_or((line, ""));
        let tag = Tag::from_parts(name, value)?;

        tags.push(TagLine {
            tag,
            name,
            next_line: lines.get(index + 1).copied(),
        });
    }

    Ok(tags)
}

/// A known tag
#[allow(clippy::enum_variant_names)]
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Tag {
    /// The EXT-X-TARGETDURATION tag
    ExtXTargetDuration {
        /// The max length of each media segment
        duration: Duration,
    },

    /// The EXT-X-ALLOW-CACHE tag
    ExtXAllowCache,

    /// The EXT-X-VERSION tag
    ExtXVersion,

    /// The EXT-X-MEDIA-SEQUENCE tag
    ExtXMediaSequence,

    /// The EXT-X-ENDLIST tag
    ExtXEndList,

    /// The EXTINF tag.
    ///
    /// The next line is a media segment uri.
    ExtInf,

    /// The EXT-X-STREAM-INF tag.
    ///
    /// The next line is a variant stream uri.
    ExtXStreamInf {
        /// The horizontal resolution, or 0 if it is missing.
        resolution: u64,
    },

    /// Anything else
    Unknown,
}

impl Tag {
    fn from_parts(name: &str, value: &str) -> Result<Self, Error> {
        match name {
            EXT_X_TARGET_DURATION_TAG => {
                let value = value.trim();
                let duration = value
                    .parse()
                    .map(Duration::from_secs)
                    .map_err(|error| Error::InvalidDuration {
                        value: value.into(),
                        error,
                    })?;
                Ok(Self::ExtXTargetDuration { duration })
            }
            EXT_X_ALLOW_CACHE_TAG => Ok(Self::ExtXAllowCache),
            EXT_X_VERSION_TAG => Ok(Self::ExtXVersion),
            EXT_X_MEDIA_SEQUENCE_TAG => Ok(Self::ExtXMediaSequence),
            EXT_X_END_LIST_TAG => Ok(Self::ExtXEndList),
            EXT_INF_TAG => Ok(Self::ExtInf),
            EXT_X_STREAM_INF_TAG => Ok(Self::ExtXStreamInf {
                resolution: parse_resolution(value),
            }),
            _ => Ok(Self::Unknown),
        }
    }
}

/// A parsed tag line, along with the raw line that follows it.
#[derive(Debug)]
pub(crate) struct TagLine<'a> {
    pub tag: Tag,
    pub name: &'a str,
    next_line: Option<&'a str>,
}

impl TagLine<'_> {
    /// Resolve the uri on the line after this tag against the given base.
    pub fn resolve_uri(&self, base: &UrlAddress) -> Result<UrlAddress, Error> {
        let line = self
            .next_line
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .ok_or_else(|| {
                Error::MalformedManifest(MalformedManifestError::MissingUri {
                    tag: self.name.into(),
                })
            })?;

        Ok(base.join(line))
    }
}

fn parse_resolution(value: &str) -> u64 {
    let Some(captures) = RESOLUTION_REGEX.captures(value) else {
        return 0;
    };

    match captures[1].parse() {
        Ok(resolution) => resolution,
        Err(error) => {
            warn!("ignoring invalid resolution \"{}\": {error}", &captures[1]);
            0
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn parse_lines_rejects_empty() {
        assert!(matches!(parse_lines(""), Err(Error::EmptyContent)));
        assert!(matches!(parse_lines(" \n\t\r\n"), Err(Error::EmptyContent)));
    }

    #[test]
    fn parse_lines_rejects_bad_header() {
        let content = "#EXT-X-TARGETDURATION:10\n#EXTINF:10,\nseg1.ts\n#EXT-X-ENDLIST\n";
        let error = parse_lines(content).expect_err("parsed without a header");
        assert!(matches!(
            error,
            Error::MalformedManifest(MalformedManifestError::InvalidHeader { .. })
        ));

        let content = "\n#EXTM3U\n";
        assert!(matches!(
            parse_lines(content),
            Err(Error::MalformedManifest(_))
        ));
    }

    #[test]
    fn parse_lines_accepts_padded_header() {
        let lines = parse_lines("  #EXTM3U\r\n#EXT-X-VERSION:3\r\n").expect("failed to parse");
        assert!(lines.len() == 3);
    }

    #[test]
    fn parse_tags_splits_name_and_value() {
        let content = "#EXTM3U\n#EXT-X-TARGETDURATION: 7 \n#EXT-X-ENDLIST\n# a comment\n";
        let tags = parse_tags(content).expect("failed to parse");
        assert!(tags.len() == 3);
        assert!(
            tags[0].tag
                == Tag::ExtXTargetDuration {
                    duration: Duration::from_secs(7)
                }
        );
        assert!(tags[1].tag == Tag::ExtXEndList);
        assert!(tags[2].tag == Tag::Unknown);
        assert!(tags[2].name == " a comment");
    }

    #[test]
    fn parse_tags_rejects_bad_duration() {
        let error = parse_tags("#EXTM3U\n#EXT-X-TARGETDURATION:ten\n").expect_err("parsed");
        assert!(matches!(error, Error::InvalidDuration { .. }));

        let error = parse_tags("#EXTM3U\n#EXT-X-TARGETDURATION:9.5\n").expect_err("parsed");
        assert!(matches!(error, Error::InvalidDuration { .. }));
    }

    #[test]
    fn stream_inf_resolution() {
        assert!(parse_resolution("BANDWIDTH=1280000,RESOLUTION=1280x720") == 1280);
        assert!(parse_resolution("RESOLUTION=640x360,CODECS=\"avc1\"") == 640);
        assert!(parse_resolution("BANDWIDTH=65000") == 0);
        assert!(parse_resolution("RESOLUTION=99999999999999999999999x1") == 0);
    }

    #[test]
    fn resolve_uri_requires_next_line() {
        let base = UrlAddress::new("http://host/path/index.m3u8").expect("invalid url");

        let tags = parse_tags("#EXTM3U\n#EXTINF:10,\n seg1.ts \n").expect("failed to parse");
        let uri = tags[0].resolve_uri(&base).expect("missing uri");
        assert!(uri.as_str() == "http://host/path/seg1.ts");

        let tags = parse_tags("#EXTM3U\n#EXTINF:10,").expect("failed to parse");
        let error = tags[0].resolve_uri(&base).expect_err("resolved a missing uri");
        assert!(matches!(
            error,
            Error::MalformedManifest(MalformedManifestError::MissingUri { .. })
        ));

        let tags = parse_tags("#EXTM3U\n#EXTINF:10,\n").expect("failed to parse");
        assert!(tags[0].resolve_uri(&base).is_err());
    }
}
