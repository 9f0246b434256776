use crate::key::PolicyKey;
use crate::types::{Dimension, Phase};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A single policy initiative.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyRecord {
    pub title: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub examples: Option<String>,
    /// Ordered, not de-duplicated. Matching is case-insensitive.
    #[serde(default)]
    pub keywords: Vec<String>,
}

impl PolicyRecord {
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            examples: None,
            keywords: Vec::new(),
        }
    }

    #[must_use]
    pub fn examples(mut self, examples: impl Into<String>) -> Self {
        self.examples = Some(examples.into());
        self
    }

    #[must_use]
    pub fn keywords<I, S>(mut self, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.keywords = keywords.into_iter().map(Into::into).collect();
        self
    }

    /// Lower-cased "title description examples", the free-text search haystack.
    pub fn search_text(&self) -> String {
        format!(
            "{} {} {}",
            self.title,
            self.description,
            self.examples.as_deref().unwrap_or_default()
        )
        .to_lowercase()
    }

    pub fn lowercase_keywords(&self) -> Vec<String> {
        self.keywords.iter().map(|k| k.to_lowercase()).collect()
    }
}

/// A policy together with its catalog coordinates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PolicyEntry {
    pub key: PolicyKey,
    #[serde(flatten)]
    pub record: PolicyRecord,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpertRecord {
    pub name: String,
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub linkedin: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default)]
    pub languages: Vec<String>,
    #[serde(default)]
    pub regions: Vec<String>,
    #[serde(default)]
    pub keywords: Vec<String>,
}

impl ExpertRecord {
    pub fn new(name: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            title: title.into(),
            profile_url: None,
            linkedin: None,
            image_url: None,
            languages: Vec::new(),
            regions: Vec::new(),
            keywords: Vec::new(),
        }
    }

    #[must_use]
    pub fn keywords<I, S>(mut self, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.keywords = keywords.into_iter().map(Into::into).collect();
        self
    }

    /// Preferred outbound link: explicit profile page, then LinkedIn.
    pub fn profile_link(&self) -> Option<&str> {
        self.profile_url.as_deref().or(self.linkedin.as_deref())
    }

    /// Up to two upper-cased initials, used when no image is available.
    pub fn initials(&self) -> String {
        self.name
            .split_whitespace()
            .filter_map(|word| word.chars().next())
            .flat_map(char::to_uppercase)
            .take(2)
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsiderationItem {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(alias = "title")]
    pub name: String,
    #[serde(default)]
    pub description: String,
}

/// A titled group of consideration items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConsiderationGroup {
    pub id: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    pub items: Vec<ConsiderationItem>,
}

/// Category identifiers attached to one (dimension, phase) cell.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhaseMapping {
    #[serde(default)]
    pub universal: Vec<String>,
    #[serde(default)]
    pub context_dependent: Vec<String>,
    #[serde(default)]
    pub sector_specific: Vec<String>,
}

/// Special-considerations tables, keyed by table key in document order.
#[derive(Debug, Clone, Default)]
pub struct SpecialConsiderations {
    pub universal: Vec<(String, ConsiderationGroup)>,
    pub context_dependent: Vec<(String, ConsiderationGroup)>,
    pub sector_specific: Vec<(String, ConsiderationGroup)>,
    pub mapping: HashMap<(Dimension, Phase), PhaseMapping>,
}

impl SpecialConsiderations {
    pub fn is_empty(&self) -> bool {
        self.universal.is_empty()
            && self.context_dependent.is_empty()
            && self.sector_specific.is_empty()
            && self.mapping.is_empty()
    }

    pub fn mapping_for(&self, dimension: Dimension, phase: Phase) -> Option<&PhaseMapping> {
        self.mapping.get(&(dimension, phase))
    }
}
