//! Cross-content-type item references.

use crate::{ContentTypeId, Error, ItemId, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A reference to an item, possibly of another content type.
///
/// Encoded as `"<contentTypeId> <itemId>"`. This string form is what existing
/// stored relation values contain, so `Display` and `FromStr` must stay
/// bit-exact.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ItemRef {
    content_type: ContentTypeId,
    item: ItemId,
}

impl ItemRef {
    #[must_use]
    pub fn new(content_type: ContentTypeId, item: ItemId) -> Self {
        Self { content_type, item }
    }

    /// Parses the compound encoding. The content type ends at the first space;
    /// everything after it is the item id.
    pub fn parse(s: &str) -> Result<Self> {
        let (ct, item) = s
            .split_once(' ')
            .ok_or_else(|| Error::InvalidReference(s.to_string()))?;
        let content_type =
            ContentTypeId::parse(ct).map_err(|_| Error::InvalidReference(s.to_string()))?;
        let item = ItemId::parse(item).map_err(|_| Error::InvalidReference(s.to_string()))?;
        Ok(Self { content_type, item })
    }

    /// The content type that owns the referenced item.
    #[must_use]
    pub fn content_type(&self) -> &ContentTypeId {
        &self.content_type
    }

    #[must_use]
    pub fn item(&self) -> &ItemId {
        &self.item
    }
}

impl fmt::Display for ItemRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.content_type, self.item)
    }
}

impl FromStr for ItemRef {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for ItemRef {
    type Error = Error;

    fn try_from(s: String) -> Result<Self> {
        Self::parse(&s)
    }
}

impl From<ItemRef> for String {
    fn from(r: ItemRef) -> Self {
        r.to_string()
    }
}
