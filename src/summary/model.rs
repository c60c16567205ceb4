//! Lenient records for the metadata endpoints.
//!
//! Every field is optional: a missing field removes a line from the summary
//! document, it never fails the lookup.

use serde::Deserialize;
use serde_json::Value;

/// Product summary record.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProductSummary {
    /// Product title.
    pub title: Option<String>,
    /// One-line pitch.
    pub one_liner: Option<String>,
    /// Long description.
    pub about: Option<String>,
    /// "What you will learn" text.
    pub learn: Option<String>,
    /// Key features text.
    pub features: Option<String>,
    /// Author identifiers (strings or numbers).
    pub authors: Vec<Value>,
    /// Publication date as provided.
    pub publication_date: Option<String>,
    /// Page count.
    pub pages: Option<u32>,
    /// ISBN-13.
    pub isbn13: Option<String>,
    /// Category label.
    pub category: Option<String>,
}

impl ProductSummary {
    /// Author identifiers normalized to strings.
    #[must_use]
    pub fn author_ids(&self) -> Vec<String> {
        self.authors
            .iter()
            .filter_map(|value| match value {
                Value::String(id) if !id.is_empty() => Some(id.clone()),
                Value::Number(id) => Some(id.to_string()),
                _ => None,
            })
            .collect()
    }
}

/// Table of contents.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TableOfContents {
    /// Chapters in reading order.
    pub chapters: Vec<Chapter>,
}

/// One chapter entry.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Chapter {
    /// Chapter title.
    pub title: Option<String>,
    /// Sections in reading order.
    pub sections: Vec<Section>,
}

/// One section entry.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Section {
    /// Section title.
    pub title: Option<String>,
}

/// Aggregate rating.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Rating {
    /// Mean rating out of five.
    #[serde(alias = "average")]
    pub rating: Option<f64>,
    /// Number of reviews.
    pub count: Option<u64>,
}

/// Author record.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Author {
    /// Display name.
    pub name: Option<String>,
    /// Biography.
    pub description: Option<String>,
}
