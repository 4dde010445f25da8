//! Public board URL validation.
//!
//! Only `https://easyretro.io/publicboard/<anything>/<uuid>` is accepted.
//! Validation happens before any page is acquired.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use url::Url;
use uuid::Uuid;

use crate::error::{Error, Result};

/// Shape of a public board link; group 2 is the board UUID.
static BOARD_URL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^https://easyretro\.io/publicboard/(.*/)([0-9A-Fa-f]{8}-[0-9A-Fa-f]{4}-[0-9A-Fa-f]{4}-[0-9A-Fa-f]{4}-[0-9A-Fa-f]{12})$",
    )
    .expect("Invalid board URL regex")
});

/// A validated public board URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardUrl {
    url: Url,
    board_id: Uuid,
}

impl BoardUrl {
    /// Validates `raw` as a public board link.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidUrl`] for any other shape.
    pub fn parse(raw: &str) -> Result<Self> {
        let captures = BOARD_URL_REGEX
            .captures(raw)
            .ok_or_else(|| Error::invalid_url(raw))?;

        let board_id = captures
            .get(2)
            .and_then(|m| Uuid::parse_str(m.as_str()).ok())
            .ok_or_else(|| Error::invalid_url(raw))?;

        let url = Url::parse(raw).map_err(|_| Error::invalid_url(raw))?;

        Ok(Self { url, board_id })
    }

    /// Returns the URL text.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.url.as_str()
    }

    /// Returns the parsed URL.
    #[inline]
    #[must_use]
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Returns the board UUID from the last path segment.
    #[inline]
    #[must_use]
    pub fn board_id(&self) -> Uuid {
        self.board_id
    }
}

impl FromStr for BoardUrl {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for BoardUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
