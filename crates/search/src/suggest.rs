//! Plan suggestions: keyword-triggered templates and coverage gap rules.

use crate::experts::plan_keywords;
use crate::matching::keywords_match;
use crate::matrix::PlanCoverage;
use policy_catalog::{Catalog, Dimension, Phase, PolicyKey};
use serde::Serialize;
use std::collections::BTreeSet;

/// A curated bundle of policies offered when the plan touches its themes.
#[derive(Debug, Clone, Copy)]
pub struct SmartTemplate {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub strategic_context: &'static str,
    pub triggers: &'static [&'static str],
    pub policies: &'static [&'static str],
}

pub const SMART_TEMPLATES: [SmartTemplate; 4] = [
    SmartTemplate {
        id: "privacy-first",
        name: "Privacy-First Approach",
        description: "Comprehensive data protection and privacy framework",
        strategic_context: "This approach prioritizes individual rights and data protection as the foundation for AI governance.",
        triggers: &["privacy", "data protection", "rights", "gdpr", "personal data"],
        policies: &["P25", "P29", "P51", "P52", "P62", "P41", "P43"],
    },
    SmartTemplate {
        id: "innovation-focused",
        name: "Innovation-First Strategy",
        description: "Promotes AI innovation through incentives and regulatory flexibility",
        strategic_context: "This strategy balances oversight with economic growth, using sandboxes and incentives to drive innovation.",
        triggers: &["innovation", "startup", "sandbox", "research", "economic", "funding"],
        policies: &["P9", "P15", "P16", "P40", "P69", "P70", "P89", "P94"],
    },
    SmartTemplate {
        id: "comprehensive-governance",
        name: "Comprehensive AI Governance",
        description: "Full-spectrum AI governance covering all implementation phases",
        strategic_context: "This framework ensures systematic governance from analysis through monitoring and evaluation.",
        triggers: &["governance", "regulation", "compliance", "oversight", "framework"],
        policies: &["P1", "P25", "P31", "P36", "P39", "P22", "P41", "P73", "P76", "P82"],
    },
    SmartTemplate {
        id: "infrastructure-foundation",
        name: "AI Infrastructure Foundation",
        description: "Essential infrastructure for AI development and deployment",
        strategic_context: "Strong infrastructure is the foundation that enables all other AI governance initiatives.",
        triggers: &["infrastructure", "computing", "data centers", "cloud", "networks"],
        policies: &["P1", "P4", "P5", "P8", "P10", "P17", "P18", "P22"],
    },
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    High,
    Medium,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum GapKind {
    MissingImplementation,
    NoMonitoring,
    SingleDimension,
    InfrastructureGap,
}

struct GapRule {
    kind: GapKind,
    priority: Priority,
    message: &'static str,
    recommendation: &'static str,
    policies: &'static [&'static str],
    detect: fn(&PlanCoverage) -> bool,
}

const GAP_RULES: [GapRule; 4] = [
    GapRule {
        kind: GapKind::MissingImplementation,
        priority: Priority::High,
        message: "Strong planning foundation detected",
        recommendation: "Consider adding implementation policies to operationalize your framework",
        policies: &["P17", "P36", "P73", "P94"],
        detect: |c| {
            c.phase(Phase::Analysis) + c.phase(Phase::Design) >= 3
                && c.phase(Phase::Implementation) == 0
        },
    },
    GapRule {
        kind: GapKind::NoMonitoring,
        priority: Priority::Medium,
        message: "Comprehensive policy selection in progress",
        recommendation: "Add monitoring policies to measure effectiveness and ensure continuous improvement",
        policies: &["P22", "P41", "P82", "P96"],
        detect: |c| c.phase(Phase::MonitoringEvaluation) == 0 && c.total >= 4,
    },
    GapRule {
        kind: GapKind::SingleDimension,
        priority: Priority::Medium,
        message: "Deep focus in one policy area established",
        recommendation: "Consider policies from other dimensions for comprehensive coverage and cross-sector synergies",
        policies: &[],
        detect: |c| c.used_dimensions().len() == 1 && c.total >= 3,
    },
    GapRule {
        kind: GapKind::InfrastructureGap,
        priority: Priority::High,
        message: "Regulatory framework development in progress",
        recommendation: "Infrastructure policies will help ensure your regulations can be effectively implemented",
        policies: &["P1", "P8", "P17", "P22"],
        detect: |c| {
            c.dimension(Dimension::LegislationPolicy) >= 2
                && c.dimension(Dimension::EnablingInfrastructure) == 0
        },
    },
];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TemplateSuggestion {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub strategic_context: &'static str,
    /// Plan keywords that fired the template.
    pub matched_keywords: Vec<String>,
    pub policies: Vec<PolicyKey>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GapSuggestion {
    pub kind: GapKind,
    pub priority: Priority,
    pub message: &'static str,
    pub recommendation: &'static str,
    pub policies: Vec<PolicyKey>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub dimensions: Vec<Dimension>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlanSuggestions {
    pub templates: Vec<TemplateSuggestion>,
    pub gaps: Vec<GapSuggestion>,
}

impl PlanSuggestions {
    pub fn is_empty(&self) -> bool {
        self.templates.is_empty() && self.gaps.is_empty()
    }
}

/// Resolves bare ids through the catalog, dropping unknown and planned ones.
fn resolve(catalog: &Catalog, plan: &BTreeSet<PolicyKey>, ids: &[&str]) -> Vec<PolicyKey> {
    ids.iter()
        .filter_map(|id| catalog.locate(id))
        .filter(|key| !plan.contains(*key))
        .cloned()
        .collect()
}

pub fn suggest(catalog: &Catalog, plan: &BTreeSet<PolicyKey>) -> PlanSuggestions {
    let keywords = plan_keywords(catalog, plan);
    let templates = SMART_TEMPLATES
        .iter()
        .filter_map(|template| {
            let matched: Vec<String> = keywords
                .iter()
                .filter(|keyword| template.triggers.iter().any(|t| keywords_match(t, keyword)))
                .cloned()
                .collect();
            if matched.is_empty() {
                return None;
            }
            let policies = resolve(catalog, plan, template.policies);
            if policies.is_empty() {
                log::debug!("template {} fully covered or unresolved", template.id);
                return None;
            }
            Some(TemplateSuggestion {
                id: template.id,
                name: template.name,
                description: template.description,
                strategic_context: template.strategic_context,
                matched_keywords: matched,
                policies,
            })
        })
        .collect();

    let coverage = PlanCoverage::from_plan(plan);
    let gaps = GAP_RULES
        .iter()
        .filter(|rule| (rule.detect)(&coverage))
        .map(|rule| GapSuggestion {
            kind: rule.kind,
            priority: rule.priority,
            message: rule.message,
            recommendation: rule.recommendation,
            policies: resolve(catalog, plan, rule.policies),
            dimensions: if rule.kind == GapKind::SingleDimension {
                coverage.unused_dimensions()
            } else {
                Vec::new()
            },
        })
        .collect();

    PlanSuggestions { templates, gaps }
}
