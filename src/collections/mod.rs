//! # Curated collections
//!
//! Canonical in-memory model for best-bet collections, pinned collections and
//! pinned items. Wire representations differ (see [`crate::normalize`]); these
//! types are what callers always see.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Only this many items per collection are consumed by the search layer.
pub const MAX_RANKED_ITEMS: usize = 5;

/// Priority a new item starts with in the editor.
pub const DEFAULT_ITEM_PRIORITY: u32 = 1;

/// A named, togglable grouping of curated search-result rules.
///
/// Best-bet collections use `keywords` and `urls`; pinned collections leave
/// them empty and hold their rules as separate [`PinnedItem`]s.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Collection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub urls: Vec<String>,
    #[serde(default = "default_active")]
    pub is_active: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
    /// Upstream fields this model does not know about, passed through as-is.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn default_active() -> bool {
    true
}

impl Collection {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            description: String::new(),
            keywords: Vec::new(),
            urls: Vec::new(),
            is_active: true,
            created_at: None,
            updated_at: None,
            extra: Map::new(),
        }
    }

    /// Adds a trimmed keyword. Blank and already-present keywords are ignored.
    pub fn add_keyword(&mut self, keyword: &str) -> bool {
        push_unique(&mut self.keywords, keyword)
    }

    pub fn remove_keyword(&mut self, keyword: &str) -> bool {
        remove_value(&mut self.keywords, keyword)
    }

    /// Adds a trimmed URL. Blank and already-present URLs are ignored.
    pub fn add_url(&mut self, url: &str) -> bool {
        push_unique(&mut self.urls, url)
    }

    pub fn remove_url(&mut self, url: &str) -> bool {
        remove_value(&mut self.urls, url)
    }
}

/// Partial update of a collection. Only the fields that are set go on the wire.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CollectionPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub keywords: Option<Vec<String>>,
    pub urls: Option<Vec<String>>,
    pub is_active: Option<bool>,
}

impl CollectionPatch {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

/// A phrase-set-to-target-content rule inside a pinned collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PinnedItem {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub phrases: Vec<String>,
    /// Content GUID the phrases pin to.
    pub target_key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    /// Lower wins.
    pub priority: u32,
    pub is_active: bool,
}

impl PinnedItem {
    pub fn new(target_key: impl Into<String>) -> Self {
        Self {
            id: None,
            phrases: Vec::new(),
            target_key: target_key.into(),
            language: None,
            priority: DEFAULT_ITEM_PRIORITY,
            is_active: true,
        }
    }

    /// Adds a trimmed phrase. Blank phrases are ignored; duplicates are kept.
    pub fn add_phrase(&mut self, phrase: &str) -> bool {
        let phrase = phrase.trim();
        if phrase.is_empty() {
            return false;
        }
        self.phrases.push(phrase.to_string());
        true
    }

    pub fn remove_phrase(&mut self, index: usize) -> Option<String> {
        (index < self.phrases.len()).then(|| self.phrases.remove(index))
    }
}

/// Active items in precedence order, capped at [`MAX_RANKED_ITEMS`].
/// Ties keep their original order.
pub fn top_ranked(items: &[PinnedItem]) -> Vec<&PinnedItem> {
    let mut active: Vec<&PinnedItem> = items.iter().filter(|item| item.is_active).collect();
    active.sort_by_key(|item| item.priority);
    active.truncate(MAX_RANKED_ITEMS);
    active
}

fn push_unique(values: &mut Vec<String>, candidate: &str) -> bool {
    let candidate = candidate.trim();
    if candidate.is_empty() || values.iter().any(|existing| existing == candidate) {
        return false;
    }
    values.push(candidate.to_string());
    true
}

fn remove_value(values: &mut Vec<String>, target: &str) -> bool {
    let before = values.len();
    values.retain(|existing| existing != target);
    values.len() != before
}
