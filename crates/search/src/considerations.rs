use policy_catalog::{
    ConsiderationGroup, ConsiderationItem, Dimension, Phase, SpecialConsiderations,
};
use serde::Serialize;

/// A universal item lifted out of its category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategorisedItem<'a> {
    pub category_id: &'a str,
    pub category_title: &'a str,
    #[serde(flatten)]
    pub item: &'a ConsiderationItem,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ConsiderationsView<'a> {
    pub universal: Vec<CategorisedItem<'a>>,
    pub context_dependent: Vec<&'a ConsiderationGroup>,
    pub sector_specific: Vec<&'a ConsiderationGroup>,
}

impl ConsiderationsView<'_> {
    pub fn is_empty(&self) -> bool {
        self.universal.is_empty()
            && self.context_dependent.is_empty()
            && self.sector_specific.is_empty()
    }
}

/// Resolves the (dimension, phase) mapping into the three category tables.
///
/// Universal identifiers match a category's `id`; context and sector
/// identifiers match the table key. Unknown identifiers are skipped.
pub fn considerations_for(
    considerations: &SpecialConsiderations,
    dimension: Dimension,
    phase: Phase,
) -> ConsiderationsView<'_> {
    let Some(mapping) = considerations.mapping_for(dimension, phase) else {
        return ConsiderationsView::default();
    };

    let universal = mapping
        .universal
        .iter()
        .filter_map(|id| {
            considerations
                .universal
                .iter()
                .map(|(_, group)| group)
                .find(|group| &group.id == id)
        })
        .flat_map(|group| {
            group.items.iter().map(move |item| CategorisedItem {
                category_id: &group.id,
                category_title: &group.title,
                item,
            })
        })
        .collect();

    ConsiderationsView {
        universal,
        context_dependent: by_key(&considerations.context_dependent, &mapping.context_dependent),
        sector_specific: by_key(&considerations.sector_specific, &mapping.sector_specific),
    }
}

fn by_key<'a>(table: &'a [(String, ConsiderationGroup)], keys: &[String]) -> Vec<&'a ConsiderationGroup> {
    keys.iter()
        .filter_map(|wanted| {
            let found = table.iter().find(|(key, _)| key == wanted).map(|(_, g)| g);
            if found.is_none() {
                log::debug!("consideration group '{wanted}' not found");
            }
            found
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const DOCUMENT: &str = r#"{
        "specialConsiderations": {
            "universal": {
                "ethics": { "id": "ethics-cat", "title": "Ethics", "items": [
                    { "name": "Bias", "description": "Audit models" },
                    { "name": "Consent", "description": "Ask first" }
                ] },
                "safety": { "title": "Safety", "items": [ { "name": "Red teaming" } ] }
            },
            "contextDependent": {
                "low-resource": { "title": "Low resource", "icon": "globe", "items": [ { "name": "Offline" } ] }
            },
            "sectorSpecific": {
                "health": { "title": "Health", "items": [ { "name": "Patient data" } ] }
            },
            "dimensionPhaseMapping": {
                "Enabling Infrastructure": {
                    "Design": {
                        "universal": ["ethics-cat", "missing"],
                        "contextDependent": ["low-resource"],
                        "sectorSpecific": ["health"]
                    }
                }
            }
        }
    }"#;

    #[test]
    fn resolves_all_three_tables() {
        let considerations = SpecialConsiderations::from_json_str(DOCUMENT).unwrap();
        let view =
            considerations_for(&considerations, Dimension::EnablingInfrastructure, Phase::Design);

        let names: Vec<&str> = view.universal.iter().map(|i| i.item.name.as_str()).collect();
        assert_eq!(names, vec!["Bias", "Consent"]);
        assert_eq!(view.universal[0].category_title, "Ethics");
        assert_eq!(view.context_dependent.len(), 1);
        assert_eq!(view.context_dependent[0].icon.as_deref(), Some("globe"));
        assert_eq!(view.sector_specific[0].title, "Health");
    }

    #[test]
    fn universal_ids_match_category_id_not_table_key() {
        let considerations = SpecialConsiderations::from_json_str(
            r#"{
                "universal": { "ethics": { "id": "ethics-cat", "title": "Ethics", "items": [ { "name": "Bias" } ] } },
                "dimensionPhaseMapping": { "Research & Education": { "Analysis": { "universal": ["ethics"] } } }
            }"#,
        )
        .unwrap();
        let view = considerations_for(&considerations, Dimension::ResearchEducation, Phase::Analysis);
        assert!(view.universal.is_empty());
    }

    #[test]
    fn missing_mapping_gives_empty_lists() {
        let considerations = SpecialConsiderations::from_json_str(DOCUMENT).unwrap();
        let view = considerations_for(&considerations, Dimension::EconomyInnovation, Phase::Analysis);
        assert!(view.is_empty());
    }
}
