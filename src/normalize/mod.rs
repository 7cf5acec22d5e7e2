//! Maps the upstream service's inconsistent JSON into the canonical model.
//!
//! Nothing here fails. A missing or mistyped field falls back to its default,
//! and a listing in an unknown wrapper becomes an empty list plus an
//! [`DiagnosticEvent::UnexpectedShape`].

use serde_json::{Map, Value, json};

use crate::collections::{Collection, CollectionPatch, PinnedItem};
use crate::diagnostics::{DiagnosticEvent, DiagnosticSink, TracingSink};

pub const UNTITLED: &str = "Untitled";

/// Priority sent when an item has none set.
pub const WIRE_DEFAULT_PRIORITY: u32 = 1000;

const PHRASE_SEPARATOR: char = ',';

const KNOWN_COLLECTION_FIELDS: [&str; 11] = [
    "id",
    "_id",
    "uuid",
    "title",
    "name",
    "description",
    "keywords",
    "urls",
    "isActive",
    "createdAt",
    "updatedAt",
];

/// The listing wrappers the upstream service has been seen to use, in the
/// order they are checked.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ResponseShape<'a> {
    Array(&'a [Value]),
    Collections(&'a [Value]),
    Data(&'a [Value]),
    Items(&'a [Value]),
    Unknown,
}

impl<'a> ResponseShape<'a> {
    pub fn classify(raw: &'a Value) -> Self {
        if let Value::Array(elements) = raw {
            return ResponseShape::Array(elements);
        }
        if let Some(elements) = raw.get("collections").and_then(Value::as_array) {
            return ResponseShape::Collections(elements);
        }
        if let Some(elements) = raw.get("data").and_then(Value::as_array) {
            return ResponseShape::Data(elements);
        }
        if let Some(elements) = raw.get("items").and_then(Value::as_array) {
            return ResponseShape::Items(elements);
        }
        ResponseShape::Unknown
    }

    pub fn elements(&self) -> &'a [Value] {
        match *self {
            ResponseShape::Array(elements)
            | ResponseShape::Collections(elements)
            | ResponseShape::Data(elements)
            | ResponseShape::Items(elements) => elements,
            ResponseShape::Unknown => &[],
        }
    }
}

fn listing<'a>(raw: &'a Value, context: &str, sink: &dyn DiagnosticSink) -> &'a [Value] {
    let shape = ResponseShape::classify(raw);
    if shape == ResponseShape::Unknown {
        sink.emit(DiagnosticEvent::UnexpectedShape {
            context: context.to_string(),
        });
    }
    shape.elements()
}

pub fn normalize_collections_response(raw: &Value) -> Vec<Collection> {
    normalize_collections_response_with(raw, &TracingSink)
}

pub fn normalize_collections_response_with(
    raw: &Value,
    sink: &dyn DiagnosticSink,
) -> Vec<Collection> {
    listing(raw, "collections", sink)
        .iter()
        .map(from_wire_payload)
        .collect()
}

pub fn normalize_items_response(raw: &Value) -> Vec<PinnedItem> {
    normalize_items_response_with(raw, &TracingSink)
}

pub fn normalize_items_response_with(raw: &Value, sink: &dyn DiagnosticSink) -> Vec<PinnedItem> {
    listing(raw, "items", sink)
        .iter()
        .map(item_from_wire)
        .collect()
}

/// Upstream `total` when present, otherwise `fallback`.
pub fn total_from_response(raw: &Value, fallback: usize) -> usize {
    raw.get("total")
        .and_then(Value::as_u64)
        .and_then(|total| usize::try_from(total).ok())
        .unwrap_or(fallback)
}

/// Builds a canonical collection from one wire element (`title` → `name`).
pub fn from_wire_payload(element: &Value) -> Collection {
    let extra: Map<String, Value> = element
        .as_object()
        .map(|fields| {
            fields
                .iter()
                .filter(|(key, _)| !KNOWN_COLLECTION_FIELDS.contains(&key.as_str()))
                .map(|(key, value)| (key.clone(), value.clone()))
                .collect()
        })
        .unwrap_or_default();

    Collection {
        id: coalesce_id(element),
        name: string_field(element, "title")
            .or_else(|| string_field(element, "name"))
            .unwrap_or(UNTITLED)
            .to_string(),
        description: string_field(element, "description")
            .unwrap_or_default()
            .to_string(),
        keywords: string_list(element.get("keywords")),
        urls: string_list(element.get("urls")),
        is_active: element
            .get("isActive")
            .and_then(Value::as_bool)
            .unwrap_or(true),
        created_at: string_field(element, "createdAt").map(str::to_string),
        updated_at: string_field(element, "updatedAt").map(str::to_string),
        extra,
    }
}

/// Wire form of a collection: `name` travels as `title`, everything else
/// passes through.
pub fn to_wire_payload(collection: &Collection) -> Value {
    let mut payload = collection.extra.clone();
    payload.insert("title".into(), Value::String(collection.name.clone()));
    payload.insert(
        "description".into(),
        Value::String(collection.description.clone()),
    );
    payload.insert("keywords".into(), json!(collection.keywords));
    payload.insert("urls".into(), json!(collection.urls));
    payload.insert("isActive".into(), Value::Bool(collection.is_active));
    if let Some(id) = &collection.id {
        payload.insert("id".into(), Value::String(id.clone()));
    }
    if let Some(created_at) = &collection.created_at {
        payload.insert("createdAt".into(), Value::String(created_at.clone()));
    }
    if let Some(updated_at) = &collection.updated_at {
        payload.insert("updatedAt".into(), Value::String(updated_at.clone()));
    }
    Value::Object(payload)
}

pub fn patch_to_wire_payload(patch: &CollectionPatch) -> Value {
    let mut payload = Map::new();
    if let Some(name) = &patch.name {
        payload.insert("title".into(), Value::String(name.clone()));
    }
    if let Some(description) = &patch.description {
        payload.insert("description".into(), Value::String(description.clone()));
    }
    if let Some(keywords) = &patch.keywords {
        payload.insert("keywords".into(), json!(keywords));
    }
    if let Some(urls) = &patch.urls {
        payload.insert("urls".into(), json!(urls));
    }
    if let Some(is_active) = patch.is_active {
        payload.insert("isActive".into(), Value::Bool(is_active));
    }
    Value::Object(payload)
}

pub fn item_phrases_to_wire(phrases: &[String]) -> String {
    phrases.join(",")
}

/// Splits a comma-joined phrase string. A value that is already a list is
/// taken as-is; anything else yields no phrases.
pub fn item_phrases_from_wire(value: &Value) -> Vec<String> {
    match value {
        Value::String(joined) => joined
            .split(PHRASE_SEPARATOR)
            .map(str::trim)
            .filter(|phrase| !phrase.is_empty())
            .map(str::to_string)
            .collect(),
        Value::Array(_) => string_list(Some(value)),
        _ => Vec::new(),
    }
}

pub fn item_from_wire(element: &Value) -> PinnedItem {
    let priority = element
        .get("priority")
        .and_then(|value| match value {
            Value::String(text) => text.trim().parse::<u64>().ok(),
            other => other.as_u64(),
        })
        .filter(|priority| *priority > 0)
        .map_or(WIRE_DEFAULT_PRIORITY, |priority| {
            u32::try_from(priority).unwrap_or(u32::MAX)
        });

    PinnedItem {
        id: coalesce_id(element),
        phrases: element
            .get("phrases")
            .map(item_phrases_from_wire)
            .unwrap_or_default(),
        target_key: string_field(element, "targetKey")
            .unwrap_or_default()
            .to_string(),
        language: string_field(element, "language")
            .filter(|language| !language.trim().is_empty())
            .map(str::to_string),
        priority,
        is_active: element
            .get("isActive")
            .and_then(Value::as_bool)
            .unwrap_or(true),
    }
}

pub fn item_to_wire_payload(item: &PinnedItem) -> Value {
    let priority = if item.priority == 0 {
        WIRE_DEFAULT_PRIORITY
    } else {
        item.priority
    };
    let language = item
        .language
        .as_deref()
        .filter(|language| !language.trim().is_empty());

    json!({
        "phrases": item_phrases_to_wire(&item.phrases),
        "targetKey": item.target_key,
        "language": language,
        "priority": priority,
        "isActive": item.is_active,
    })
}

fn string_field<'a>(element: &'a Value, key: &str) -> Option<&'a str> {
    element.get(key).and_then(Value::as_str)
}

/// `id`, then `_id`, then `uuid`. Numeric ids are stringified; empty ones skipped.
fn coalesce_id(element: &Value) -> Option<String> {
    ["id", "_id", "uuid"].iter().find_map(|key| {
        match element.get(*key) {
            Some(Value::String(id)) if !id.is_empty() => Some(id.clone()),
            Some(Value::Number(id)) => Some(id.to_string()),
            _ => None,
        }
    })
}

fn string_list(value: Option<&Value>) -> Vec<String> {
    value
        .and_then(Value::as_array)
        .map(|entries| {
            entries
                .iter()
                .filter_map(Value::as_str)
                .map(str::trim)
                .filter(|entry| !entry.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}
