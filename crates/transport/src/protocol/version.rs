//! HTTP protocol version as it appears on the wire.
//!
//! The parser accepts any `HTTP/<digits>.<digits>` token, so the version is kept as a
//! plain major/minor pair instead of the closed set offered by [`http::Version`].

use std::fmt;

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct HttpVersion {
    major: u16,
    minor: u16,
}

impl HttpVersion {
    pub const HTTP_10: HttpVersion = HttpVersion::new(1, 0);
    pub const HTTP_11: HttpVersion = HttpVersion::new(1, 1);

    pub const fn new(major: u16, minor: u16) -> Self {
        Self { major, minor }
    }

    #[inline]
    pub fn major(&self) -> u16 {
        self.major
    }

    #[inline]
    pub fn minor(&self) -> u16 {
        self.minor
    }

    /// Chunked transfer coding and persistent connections by default arrived with 1.1.
    #[inline]
    pub fn is_at_least_11(&self) -> bool {
        *self >= Self::HTTP_11
    }
}

impl Default for HttpVersion {
    fn default() -> Self {
        Self::HTTP_11
    }
}

impl fmt::Display for HttpVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HTTP/{}.{}", self.major, self.minor)
    }
}

impl From<http::Version> for HttpVersion {
    fn from(value: http::Version) -> Self {
        match value {
            http::Version::HTTP_09 => HttpVersion::new(0, 9),
            http::Version::HTTP_10 => HttpVersion::HTTP_10,
            http::Version::HTTP_2 => HttpVersion::new(2, 0),
            http::Version::HTTP_3 => HttpVersion::new(3, 0),
            _ => HttpVersion::HTTP_11,
        }
    }
}
