use crate::Error;

const HTTP_SCHEME: &str = "http://";
const HTTPS_SCHEME: &str = "https://";

/// A url, as it appears in a manifest.
///
/// This is intentionally not a full url parser.
/// Manifests in the wild are sloppy, so joining is done on the raw string.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UrlAddress {
    url: Box<str>,
}

impl UrlAddress {
    /// Make a new url address.
    ///
    /// Surrounding whitespace is removed.
    /// If the url has no `http://` or `https://` scheme, `http://` is added.
    pub fn new(raw: &str) -> Result<Self, Error> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(Error::InvalidUrl);
        }

        Ok(Self::from_joined(raw))
    }

    /// Normalize a non-empty, already trimmed string.
    fn from_joined(url: &str) -> Self {
        let url: Box<str> = if has_scheme(url) {
            url.into()
        } else {
            format!("{HTTP_SCHEME}{url}").into()
        };

        Self { url }
    }

    /// Get this url as a str.
    pub fn as_str(&self) -> &str {
        &self.url
    }

    /// Resolve a path relative to this url.
    ///
    /// Absolute paths replace this url entirely.
    /// Relative paths replace the last segment of this url.
    /// Each leading `../` removes one more segment,
    /// while each leading `/` is dropped without removing a segment.
    pub fn join(&self, path: &str) -> Self {
        if path.trim().is_empty() {
            return self.clone();
        }

        if has_scheme(path) {
            return Self::from_joined(path.trim());
        }

        let mut base = base_of(&self.url);
        let mut path = path;
        loop {
            if let Some(rest) = path.strip_prefix("../") {
                base = base_of(parent_of(&base));
                path = rest;
            } else if let Some(rest) = path.strip_prefix('/') {
                path = rest;
            } else {
                break;
            }
        }

        base.push_str(path);
        Self::from_joined(&base)
    }

    /// Get the directory of this url.
    ///
    /// This always ends with a `/`.
    pub fn base_address(&self) -> Self {
        Self::from_joined(&base_of(&self.url))
    }

    /// Get this url with its last segment removed.
    ///
    /// The result has no trailing `/`.
    /// If there is no `/` at all, the url is its own parent.
    pub fn parent_address(&self) -> Self {
        Self::from_joined(parent_of(&self.url))
    }
}

impl std::fmt::Display for UrlAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.url)
    }
}

impl std::str::FromStr for UrlAddress {
    type Err = Error;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        Self::new(input)
    }
}

impl AsRef<str> for UrlAddress {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

fn has_scheme(url: &str) -> bool {
    url.starts_with(HTTP_SCHEME) || url.starts_with(HTTPS_SCHEME)
}

fn parent_of(url: &str) -> &str {
    match url.rfind('/') {
        Some(index) => &url[..index],
        None => url,
    }
}

fn base_of(url: &str) -> String {
    format!("{}/", parent_of(url))
}

#[cfg(test)]
mod test {
    use super::*;

    fn url(raw: &str) -> UrlAddress {
        UrlAddress::new(raw).expect("invalid url")
    }

    #[test]
    fn new_trims_and_adds_scheme() {
        assert!(url("  http://host/a.m3u8 \n").as_str() == "http://host/a.m3u8");
        assert!(url("host/a.m3u8").as_str() == "http://host/a.m3u8");
        assert!(url("https://host/a.m3u8").as_str() == "https://host/a.m3u8");
    }

    #[test]
    fn new_rejects_empty() {
        assert!(matches!(UrlAddress::new(""), Err(Error::InvalidUrl)));
        assert!(matches!(UrlAddress::new(" \t\r\n"), Err(Error::InvalidUrl)));
        assert!(matches!("".parse::<UrlAddress>(), Err(Error::InvalidUrl)));
    }

    #[test]
    fn base_and_parent() {
        let address = url("http://host/path/index.m3u8");
        assert!(address.base_address().as_str() == "http://host/path/");
        assert!(address.parent_address().as_str() == "http://host/path");

        let dir = url("http://host/path/");
        assert!(dir.base_address().as_str() == "http://host/path/");
        assert!(dir.parent_address().as_str() == "http://host/path");
    }

    #[test]
    fn join_empty_is_identity() {
        let address = url("http://host/path/index.m3u8");
        assert!(address.join("") == address);
        assert!(address.join("   ") == address);
    }

    #[test]
    fn join_absolute_overrides() {
        let address = url("http://host/path/index.m3u8");
        assert!(address.join("http://x/y") == url("http://x/y"));
        assert!(address.join("https://cdn/seg.ts").as_str() == "https://cdn/seg.ts");
    }

    #[test]
    fn join_relative() {
        let address = url("http://host/path/index.m3u8");
        assert!(address.join("seg1.ts").as_str() == "http://host/path/seg1.ts");
        assert!(address.join("low/index.m3u8").as_str() == "http://host/path/low/index.m3u8");
    }

    #[test]
    fn join_parent_traversal() {
        let address = url("http://host/a/b/c/index.m3u8");
        assert!(address.join("../x.ts").as_str() == "http://host/a/b/x.ts");
        assert!(address.join("../../x.ts").as_str() == "http://host/a/x.ts");
        assert!(address.join("../../../alt/stream.m3u8").as_str() == "http://host/alt/stream.m3u8");
    }

    #[test]
    fn join_leading_slash_does_not_pop() {
        let address = url("http://host/a/b/index.m3u8");
        assert!(address.join("/abs/path.ts").as_str() == "http://host/a/b/abs/path.ts");
        assert!(address.join("//x.ts").as_str() == "http://host/a/b/x.ts");
        assert!(address.join("/../x.ts").as_str() == "http://host/a/x.ts");
    }

    #[test]
    fn join_does_not_mutate() {
        let address = url("http://host/a/b/index.m3u8");
        let _ = address.join("../../x.ts");
        assert!(address.as_str() == "http://host/a/b/index.m3u8");
    }

    #[test]
    fn parent_without_slash_is_self() {
        assert!(parent_of("index.m3u8") == "index.m3u8");
        assert!(base_of("index.m3u8") == "index.m3u8/");
    }
}
