//! On-disk document shapes and their normalisation into the catalog model.
//!
//! Two historical policy catalog layouts exist and both are resolved here,
//! once, at load time:
//!
//! ```text
//! legacy:   { dimension: { phase: { policyId: { policy, details, examples, keywords } } } }
//! wrapper:  { policyAreas?: { dimension: { phases: { phase: { policies: [ { id, title, description, ... } ] } } } } }
//! ```

use crate::error::{CatalogError, Result};
use crate::key::PolicyKey;
use crate::model::{
    ConsiderationGroup, ConsiderationItem, ExpertRecord, PhaseMapping, PolicyEntry, PolicyRecord,
    SpecialConsiderations,
};
use crate::types::{Dimension, Phase};
use serde::de::{Deserializer, MapAccess, Visitor};
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::marker::PhantomData;

/// JSON object read as a list of entries in document order.
#[derive(Debug)]
pub(crate) struct OrderedEntries<V>(pub Vec<(String, V)>);

impl<V> Default for OrderedEntries<V> {
    fn default() -> Self {
        Self(Vec::new())
    }
}

impl<'de, V: Deserialize<'de>> Deserialize<'de> for OrderedEntries<V> {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct EntriesVisitor<V>(PhantomData<V>);

        impl<'de, V: Deserialize<'de>> Visitor<'de> for EntriesVisitor<V> {
            type Value = OrderedEntries<V>;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a JSON object")
            }

            fn visit_map<A>(self, mut map: A) -> std::result::Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some((key, value)) = map.next_entry::<String, V>()? {
                    entries.push((key, value));
                }
                Ok(OrderedEntries(entries))
            }
        }

        deserializer.deserialize_map(EntriesVisitor(PhantomData))
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawPolicyDocument {
    Wrapped {
        #[serde(rename = "policyAreas")]
        policy_areas: OrderedEntries<RawArea>,
    },
    Bare(OrderedEntries<RawArea>),
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawArea {
    PhasesWrapper { phases: OrderedEntries<RawPhase> },
    Legacy(OrderedEntries<RawPhase>),
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawPhase {
    Listed { policies: Vec<Value> },
    Keyed(OrderedEntries<Value>),
}

/// One policy object, read field by field so that a wrongly typed field is
/// repaired or dropped instead of failing the whole document.
#[derive(Debug, Default)]
struct RawPolicy {
    id: Option<String>,
    title: Option<String>,
    policy: Option<String>,
    description: Option<String>,
    details: Option<String>,
    examples: Option<String>,
    keywords: Option<Vec<String>>,
}

impl RawPolicy {
    /// `location` names the policy in warnings, e.g. `'P2' in Design`.
    fn from_value(value: Value, location: &str) -> Option<Self> {
        let mut fields = match value {
            Value::Object(fields) => fields,
            other => {
                log::warn!(
                    "Skipping policy {location}: expected an object, found {}",
                    json_kind(&other)
                );
                return None;
            }
        };
        let mut text = |name: &str| lenient_text(fields.remove(name), name, location);
        let id = text("id");
        let title = text("title");
        let policy = text("policy");
        let description = text("description");
        let details = text("details");
        let examples = text("examples");
        Some(Self {
            id,
            title,
            policy,
            description,
            details,
            examples,
            keywords: lenient_keywords(fields.remove("keywords"), location),
        })
    }

    fn into_record(self) -> PolicyRecord {
        PolicyRecord {
            title: self.title.or(self.policy).unwrap_or_default(),
            description: self.description.or(self.details).unwrap_or_default(),
            examples: self.examples.filter(|e| !e.trim().is_empty()),
            keywords: self.keywords.unwrap_or_default(),
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Strings pass through, scalars are stringified, anything else is dropped.
fn lenient_text(value: Option<Value>, field: &str, location: &str) -> Option<String> {
    match value? {
        Value::Null => None,
        Value::String(text) => Some(text),
        scalar @ (Value::Number(_) | Value::Bool(_)) => {
            log::warn!(
                "Policy {location}: field '{field}' is {}, using it as text",
                json_kind(&scalar)
            );
            Some(scalar.to_string())
        }
        other => {
            log::warn!(
                "Policy {location}: ignoring field '{field}', expected text, found {}",
                json_kind(&other)
            );
            None
        }
    }
}

/// A bare string becomes a one-keyword list; non-text list items are dropped.
fn lenient_keywords(value: Option<Value>, location: &str) -> Option<Vec<String>> {
    match value? {
        Value::Null => None,
        Value::Array(items) => Some(
            items
                .into_iter()
                .filter_map(|item| lenient_text(Some(item), "keywords", location))
                .collect(),
        ),
        Value::String(keyword) => {
            log::warn!("Policy {location}: 'keywords' is a single string, reading it as one keyword");
            Some(if keyword.trim().is_empty() {
                Vec::new()
            } else {
                vec![keyword]
            })
        }
        other => {
            log::warn!(
                "Policy {location}: ignoring 'keywords', expected a list, found {}",
                json_kind(&other)
            );
            None
        }
    }
}

/// Best-effort label for a listed policy before its id has been validated.
fn listed_label(value: &Value, position: usize) -> String {
    match value.get("id") {
        Some(Value::String(id)) => format!("'{id}'"),
        Some(Value::Number(id)) => format!("'{id}'"),
        _ => format!("#{}", position + 1),
    }
}

/// Canonical policy table: entries in catalog iteration order plus a key index.
#[derive(Debug, Clone, Default)]
pub struct PolicyTable {
    entries: Vec<PolicyEntry>,
    index: HashMap<PolicyKey, usize>,
}

impl PolicyTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json_str(raw: &str) -> Result<Self> {
        let document: RawPolicyDocument =
            serde_json::from_str(raw).map_err(|source| CatalogError::Parse {
                document: "policy",
                source,
            })?;
        Ok(Self::from_document(document))
    }

    fn from_document(document: RawPolicyDocument) -> Self {
        let areas = match document {
            RawPolicyDocument::Wrapped { policy_areas } => policy_areas,
            RawPolicyDocument::Bare(areas) => areas,
        };

        let mut table = Self::new();
        for (area_name, area) in areas.0 {
            let Ok(dimension) = area_name.parse::<Dimension>() else {
                log::warn!("Skipping unknown policy dimension '{area_name}'");
                continue;
            };
            let phases = match area {
                RawArea::PhasesWrapper { phases } => phases,
                RawArea::Legacy(phases) => phases,
            };
            for (phase_name, phase_data) in phases.0 {
                let Ok(phase) = phase_name.parse::<Phase>() else {
                    log::warn!("Skipping unknown phase '{phase_name}' under '{area_name}'");
                    continue;
                };
                table.insert_phase(dimension, phase, phase_data);
            }
        }
        table
    }

    fn insert_phase(&mut self, dimension: Dimension, phase: Phase, data: RawPhase) {
        match data {
            RawPhase::Listed { policies } => {
                for (position, value) in policies.into_iter().enumerate() {
                    let location = format!(
                        "{} in {dimension} / {phase}",
                        listed_label(&value, position)
                    );
                    let Some(policy) = RawPolicy::from_value(value, &location) else {
                        continue;
                    };
                    let Some(id) = policy.id.clone().filter(|id| !id.trim().is_empty()) else {
                        log::debug!("Dropping policy without id in {dimension} / {phase}");
                        continue;
                    };
                    self.insert(PolicyKey::new(dimension, phase, id), policy.into_record());
                }
            }
            RawPhase::Keyed(policies) => {
                for (id, value) in policies.0 {
                    let location = format!("'{id}' in {dimension} / {phase}");
                    let Some(policy) = RawPolicy::from_value(value, &location) else {
                        continue;
                    };
                    self.insert(PolicyKey::new(dimension, phase, id), policy.into_record());
                }
            }
        }
    }

    /// Inserts a policy. A repeated key replaces the record but keeps its position.
    pub fn insert(&mut self, key: PolicyKey, record: PolicyRecord) {
        if let Some(&idx) = self.index.get(&key) {
            log::warn!("Duplicate policy key '{key}', keeping the last definition");
            self.entries[idx].record = record;
            return;
        }
        self.index.insert(key.clone(), self.entries.len());
        self.entries.push(PolicyEntry { key, record });
    }

    pub fn entries(&self) -> &[PolicyEntry] {
        &self.entries
    }

    pub fn get(&self, key: &PolicyKey) -> Option<&PolicyEntry> {
        self.index.get(key).map(|&idx| &self.entries[idx])
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(PolicyKey, PolicyRecord)> for PolicyTable {
    fn from_iter<T: IntoIterator<Item = (PolicyKey, PolicyRecord)>>(iter: T) -> Self {
        let mut table = Self::new();
        for (key, record) in iter {
            table.insert(key, record);
        }
        table
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawExpertsDocument {
    Wrapped { experts: Vec<ExpertRecord> },
    Bare(Vec<ExpertRecord>),
}

pub fn parse_experts(raw: &str) -> Result<Vec<ExpertRecord>> {
    let document: RawExpertsDocument =
        serde_json::from_str(raw).map_err(|source| CatalogError::Parse {
            document: "experts",
            source,
        })?;
    Ok(match document {
        RawExpertsDocument::Wrapped { experts } => experts,
        RawExpertsDocument::Bare(experts) => experts,
    })
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawConsiderationsDocument {
    Wrapped {
        #[serde(rename = "specialConsiderations")]
        inner: RawConsiderations,
    },
    Bare(RawConsiderations),
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawConsiderations {
    #[serde(default)]
    universal: OrderedEntries<RawGroup>,
    #[serde(default)]
    context_dependent: OrderedEntries<RawGroup>,
    #[serde(default)]
    sector_specific: OrderedEntries<RawGroup>,
    #[serde(default)]
    dimension_phase_mapping: OrderedEntries<OrderedEntries<PhaseMapping>>,
}

#[derive(Debug, Deserialize)]
struct RawGroup {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    title: String,
    #[serde(default)]
    icon: Option<String>,
    #[serde(default)]
    items: Vec<ConsiderationItem>,
}

fn groups(raw: OrderedEntries<RawGroup>) -> Vec<(String, ConsiderationGroup)> {
    raw.0
        .into_iter()
        .map(|(key, group)| {
            let group = ConsiderationGroup {
                id: group.id.unwrap_or_else(|| key.clone()),
                title: group.title,
                icon: group.icon,
                items: group.items,
            };
            (key, group)
        })
        .collect()
}

impl SpecialConsiderations {
    pub fn from_json_str(raw: &str) -> Result<Self> {
        let document: RawConsiderationsDocument =
            serde_json::from_str(raw).map_err(|source| CatalogError::Parse {
                document: "special considerations",
                source,
            })?;
        let raw = match document {
            RawConsiderationsDocument::Wrapped { inner } => inner,
            RawConsiderationsDocument::Bare(inner) => inner,
        };

        let mut mapping = HashMap::new();
        for (dimension_name, phases) in raw.dimension_phase_mapping.0 {
            let Ok(dimension) = dimension_name.parse::<Dimension>() else {
                log::warn!("Skipping considerations mapping for unknown dimension '{dimension_name}'");
                continue;
            };
            for (phase_name, cell) in phases.0 {
                let Ok(phase) = phase_name.parse::<Phase>() else {
                    log::warn!("Skipping considerations mapping for unknown phase '{phase_name}'");
                    continue;
                };
                mapping.insert((dimension, phase), cell);
            }
        }

        Ok(Self {
            universal: groups(raw.universal),
            context_dependent: groups(raw.context_dependent),
            sector_specific: groups(raw.sector_specific),
            mapping,
        })
    }
}
