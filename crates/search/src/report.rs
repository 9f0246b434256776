use crate::experts::{match_experts, plan_keywords};
use policy_catalog::{Catalog, Dimension, Phase, PolicyKey};
use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportItem {
    pub key: PolicyKey,
    pub id: String,
    pub phase: Phase,
    pub title: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub examples: Option<String>,
    pub keywords: Vec<String>,
    pub experts: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportSection {
    pub dimension: Dimension,
    pub color: &'static str,
    pub phases_covered: usize,
    pub policies: Vec<ReportItem>,
}

/// Content of the exported implementation plan.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlanReport {
    pub total_policies: usize,
    pub dimension_count: usize,
    pub sections: Vec<ReportSection>,
    /// Experts matched against the whole plan.
    pub experts: Vec<String>,
    /// Plan keys with no catalog entry.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub missing: Vec<PolicyKey>,
}

/// Groups the plan by dimension in dimension order.
///
/// Expert names are only attached when the catalog carries experts;
/// `expert_limit` applies per policy and to the plan-wide list.
pub fn plan_report(catalog: &Catalog, plan: &BTreeSet<PolicyKey>, expert_limit: usize) -> PlanReport {
    let with_experts = !catalog.experts().is_empty();
    let expert_names = |keywords: &[String]| -> Vec<String> {
        if !with_experts || keywords.is_empty() {
            return Vec::new();
        }
        match_experts(catalog.experts(), keywords, expert_limit)
            .into_iter()
            .map(|m| m.expert.name.clone())
            .collect()
    };

    let mut missing = Vec::new();
    let mut sections = Vec::new();
    for dimension in Dimension::ALL {
        let mut policies = Vec::new();
        for key in plan.iter().filter(|key| key.dimension == dimension) {
            let Some(entry) = catalog.policy(key) else {
                missing.push(key.clone());
                continue;
            };
            let record = &entry.record;
            policies.push(ReportItem {
                key: key.clone(),
                id: key.policy_id.clone(),
                phase: key.phase,
                title: record.title.clone(),
                description: record.description.clone(),
                examples: record.examples.clone().filter(|e| !e.trim().is_empty()),
                keywords: record.keywords.clone(),
                experts: expert_names(&record.keywords),
            });
        }
        if policies.is_empty() {
            continue;
        }
        let phases_covered = policies
            .iter()
            .map(|item| item.phase)
            .collect::<BTreeSet<_>>()
            .len();
        sections.push(ReportSection {
            dimension,
            color: dimension.color(),
            phases_covered,
            policies,
        });
    }

    if !missing.is_empty() {
        log::warn!("{} plan policies missing from catalog", missing.len());
    }

    PlanReport {
        total_policies: sections.iter().map(|s| s.policies.len()).sum(),
        dimension_count: sections.len(),
        experts: expert_names(&plan_keywords(catalog, plan)),
        sections,
        missing,
    }
}

impl PlanReport {
    pub fn to_markdown(&self) -> String {
        self.to_string()
    }

    fn write_markdown(&self, out: &mut impl fmt::Write) -> fmt::Result {
        writeln!(out, "# Implementation Plan: Selected Policy Initiatives")?;
        writeln!(out)?;
        if self.sections.is_empty() {
            writeln!(out, "No policies selected.")?;
            return Ok(());
        }
        writeln!(
            out,
            "This implementation plan outlines {} selected AI policy initiatives across {} key policy areas.",
            self.total_policies, self.dimension_count
        )?;
        writeln!(out)?;
        for section in &self.sections {
            writeln!(
                out,
                "- **{}**: {} policy options selected, covering {} implementation phases",
                section.dimension,
                section.policies.len(),
                section.phases_covered
            )?;
        }
        if !self.experts.is_empty() {
            writeln!(out)?;
            writeln!(
                out,
                "Relevant experts working in similar policy areas: {}",
                self.experts.join(", ")
            )?;
        }

        for section in &self.sections {
            writeln!(out)?;
            writeln!(out, "## {}", section.dimension)?;
            for (idx, item) in section.policies.iter().enumerate() {
                writeln!(out)?;
                writeln!(out, "### {}. {}: {}", idx + 1, item.id, item.title)?;
                writeln!(out)?;
                writeln!(out, "*Implementation Phase:* {}", item.phase.short_name())?;
                if !item.description.is_empty() {
                    writeln!(out)?;
                    writeln!(out, "{}", item.description)?;
                }
                if let Some(examples) = &item.examples {
                    writeln!(out)?;
                    writeln!(out, "*Implementation Examples:* {examples}")?;
                }
                if !item.keywords.is_empty() {
                    writeln!(out)?;
                    writeln!(out, "*Keywords:* {}", item.keywords.join(", "))?;
                }
                if !item.experts.is_empty() {
                    writeln!(out)?;
                    writeln!(out, "*Relevant experts:* {}", item.experts.join(", "))?;
                }
            }
        }
        Ok(())
    }
}

/// Renders the report as Markdown.
impl fmt::Display for PlanReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_markdown(f)
    }
}
