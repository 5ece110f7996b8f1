use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::num::ParseIntError;
use std::{fmt, str::FromStr};
use thiserror::Error;

/// Selector literal for whole-file snapshots.
pub const FULL_FILE: &str = "full";
/// Depth tag literal for snapshots fetched without a depth ceiling.
pub const UNBOUNDED: &str = "default";

/// Which part of a file a snapshot was fetched for.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub enum Selector {
    /// The whole document.
    File,
    /// Specific node ids, in request order.
    Nodes(Vec<String>),
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File => f.write_str(FULL_FILE),
            Self::Nodes(ids) => f.write_str(&ids.join(",")),
        }
    }
}

/// Depth ceiling a snapshot was fetched with.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Default)]
pub enum DepthTag {
    /// No ceiling was requested.
    #[default]
    Unbounded,
    /// Fetched with `depth=N`.
    Limited(u32),
}

impl DepthTag {
    /// Finite ceiling, if any.
    #[must_use]
    pub const fn ceiling(self) -> Option<u32> {
        match self {
            Self::Unbounded => None,
            Self::Limited(depth) => Some(depth),
        }
    }
}

impl From<Option<u32>> for DepthTag {
    fn from(depth: Option<u32>) -> Self {
        depth.map_or(Self::Unbounded, Self::Limited)
    }
}

impl fmt::Display for DepthTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unbounded => f.write_str(UNBOUNDED),
            Self::Limited(depth) => write!(f, "{depth}"),
        }
    }
}

/// Identity of one cached snapshot: `<fileKey>:<selector>:<depthTag>`.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct CacheKey {
    /// Source document.
    pub file_key: String,
    /// Whole file or node ids.
    pub selector: Selector,
    /// Depth ceiling of the fetch.
    pub depth: DepthTag,
}

impl CacheKey {
    /// Key for a whole-file snapshot.
    #[must_use]
    pub fn file(file_key: impl Into<String>, depth: Option<u32>) -> Self {
        Self {
            file_key: file_key.into(),
            selector: Selector::File,
            depth: depth.into(),
        }
    }

    /// Key for a snapshot of specific nodes.
    #[must_use]
    pub fn nodes<I, S>(file_key: impl Into<String>, node_ids: I, depth: Option<u32>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            file_key: file_key.into(),
            selector: Selector::Nodes(node_ids.into_iter().map(Into::into).collect()),
            depth: depth.into(),
        }
    }

    /// String prefix shared by every key of `file_key`.
    #[must_use]
    pub fn file_prefix(file_key: &str) -> String {
        format!("{file_key}:")
    }

    /// True when this key belongs to `file_key`.
    #[must_use]
    pub fn is_for_file(&self, file_key: &str) -> bool {
        self.file_key == file_key
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.file_key, self.selector, self.depth)
    }
}

/// Failure to parse a cache key string.
#[derive(Debug, Error)]
pub enum CacheKeyError {
    /// Fewer than two `:` separators.
    #[error("cache key is missing a ':' separator: {0}")]
    MissingSeparator(String),

    /// Nothing before the first `:`.
    #[error("cache key has an empty file key: {0}")]
    EmptyFileKey(String),

    /// Nothing between the file key and the depth tag.
    #[error("cache key has an empty selector: {0}")]
    EmptySelector(String),

    /// Depth tag is neither `default` nor a base-10 integer.
    #[error("invalid depth tag '{raw}': {source}")]
    InvalidDepth {
        /// Offending tag.
        raw: String,
        /// Integer parse failure.
        source: ParseIntError,
    },
}

impl FromStr for DepthTag {
    type Err = CacheKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == UNBOUNDED {
            return Ok(Self::Unbounded);
        }
        s.parse()
            .map(Self::Limited)
            .map_err(|source| CacheKeyError::InvalidDepth {
                raw: s.to_owned(),
                source,
            })
    }
}

impl FromStr for CacheKey {
    type Err = CacheKeyError;

    // Node ids contain ':' themselves, so only the first and last separators count.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (file_key, rest) = s
            .split_once(':')
            .ok_or_else(|| CacheKeyError::MissingSeparator(s.to_owned()))?;
        let (selector, depth) = rest
            .rsplit_once(':')
            .ok_or_else(|| CacheKeyError::MissingSeparator(s.to_owned()))?;
        if file_key.is_empty() {
            return Err(CacheKeyError::EmptyFileKey(s.to_owned()));
        }
        let selector = match selector {
            "" => return Err(CacheKeyError::EmptySelector(s.to_owned())),
            FULL_FILE => Selector::File,
            ids => Selector::Nodes(ids.split(',').map(str::to_owned).collect()),
        };
        Ok(Self {
            file_key: file_key.to_owned(),
            selector,
            depth: depth.parse()?,
        })
    }
}

impl Serialize for CacheKey {
    fn serialize<S>(&self, s: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        s.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for CacheKey {
    fn deserialize<D>(d: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(d)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
