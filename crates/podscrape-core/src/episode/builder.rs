//! Fluent accumulation of scraped attributes for one episode.

use scraper::ElementRef;
use std::collections::BTreeMap;

/// Strategy for reading a named attribute off a DOM element.
pub trait AttributeReader {
    fn read(&self, element: &ElementRef<'_>, key: &str) -> Option<String>;
}

/// Reads the attribute named `key` as is.
#[derive(Debug, Clone, Copy, Default)]
pub struct PropertyAttribute;

impl AttributeReader for PropertyAttribute {
    fn read(&self, element: &ElementRef<'_>, key: &str) -> Option<String> {
        element.value().attr(key).map(str::to_string)
    }
}

/// Reads `data-<key>`, trimmed.
#[derive(Debug, Clone, Copy, Default)]
pub struct DataAttribute;

impl AttributeReader for DataAttribute {
    fn read(&self, element: &ElementRef<'_>, key: &str) -> Option<String> {
        element
            .value()
            .attr(&format!("data-{key}"))
            .map(|v| v.trim().to_string())
    }
}

/// A typed attribute value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttributeValue {
    Text(String),
    Integer(i64),
}

/// Transform for `extract_with`: parses the attribute as a signed integer.
/// Unparseable input becomes `None` like a missing attribute.
pub fn integer(raw: Option<String>) -> Option<AttributeValue> {
    raw.and_then(|s| s.parse::<i64>().ok())
        .map(AttributeValue::Integer)
}

/// Accumulated attributes of one scraped episode. Absent attributes are kept
/// as `None` entries so callers can tell "read but missing" from "never read".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EpisodeEntry {
    values: BTreeMap<String, Option<AttributeValue>>,
}

impl EpisodeEntry {
    pub fn get(&self, key: &str) -> Option<&AttributeValue> {
        self.values.get(key).and_then(Option::as_ref)
    }

    pub fn text(&self, key: &str) -> Option<&str> {
        match self.get(key)? {
            AttributeValue::Text(s) => Some(s.as_str()),
            AttributeValue::Integer(_) => None,
        }
    }

    pub fn integer(&self, key: &str) -> Option<i64> {
        match self.get(key)? {
            AttributeValue::Integer(n) => Some(*n),
            AttributeValue::Text(_) => None,
        }
    }

    /// Overwrites or inserts `key`.
    pub fn insert(&mut self, key: &str, value: Option<AttributeValue>) {
        self.values.insert(key.to_string(), value);
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Builder reading attributes from one source element through an
/// `AttributeReader`. Every step returns the builder; `build` is terminal.
pub struct DownloadEntryBuilder<'a, R> {
    element: ElementRef<'a>,
    reader: R,
    entry: EpisodeEntry,
}

impl<'a> DownloadEntryBuilder<'a, PropertyAttribute> {
    /// Builder reading plain attributes.
    pub fn with_properties(element: ElementRef<'a>) -> Self {
        Self::new(element, PropertyAttribute)
    }
}

impl<'a, R: AttributeReader> DownloadEntryBuilder<'a, R> {
    pub fn new(element: ElementRef<'a>, reader: R) -> Self {
        Self {
            element,
            reader,
            entry: EpisodeEntry::default(),
        }
    }

    /// Stores `value` under `key`, replacing any previous value.
    pub fn append(mut self, key: &str, value: Option<AttributeValue>) -> Self {
        self.entry.insert(key, value);
        self
    }

    /// Reads `key` from the source element and stores it as text.
    pub fn extract(self, key: &str) -> Self {
        self.extract_with(key, |raw| raw.map(AttributeValue::Text))
    }

    /// Reads `key` from the source element, applies `transform`, stores the result.
    pub fn extract_with<F>(mut self, key: &str, transform: F) -> Self
    where
        F: FnOnce(Option<String>) -> Option<AttributeValue>,
    {
        let raw = self.reader.read(&self.element, key);
        self.entry.insert(key, transform(raw));
        self
    }

    pub fn build(self) -> EpisodeEntry {
        self.entry
    }
}
