//! Dimension × phase grid summarising the plan and the current relations.

use crate::profile::MatrixGeometry;
use policy_catalog::{Dimension, Phase, PolicyKey};
use policy_state::SelectionState;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BarKind {
    Selected,
    Related,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatrixBar {
    pub key: PolicyKey,
    pub kind: BarKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatrixCell {
    pub dimension: Dimension,
    pub phase: Phase,
    /// The cell matches the selected dimension and phase.
    pub is_current: bool,
    /// Selected bars first, then related ones.
    pub bars: Vec<MatrixBar>,
    pub bar_height: u32,
}

impl MatrixCell {
    pub fn count(&self, kind: BarKind) -> usize {
        self.bars.iter().filter(|bar| bar.kind == kind).count()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectionMatrix {
    pub geometry: MatrixGeometry,
    /// Twenty cells, dimension-major.
    pub cells: Vec<MatrixCell>,
}

impl SelectionMatrix {
    pub fn cell(&self, dimension: Dimension, phase: Phase) -> Option<&MatrixCell> {
        self.cells
            .iter()
            .find(|cell| cell.dimension == dimension && cell.phase == phase)
    }
}

/// Height of each bar when `count` bars share one cell.
///
/// Bars shrink as the cell fills so the whole stack stays inside
/// `max_cell_height`, but never below `min_bar_height`.
pub fn bar_height(geometry: &MatrixGeometry, count: usize) -> u32 {
    let Ok(count) = u32::try_from(count) else {
        return geometry.min_bar_height;
    };
    if count == 0 {
        return geometry.min_bar_height;
    }
    let gaps = (count - 1).saturating_mul(geometry.gap_height);
    let fitted = geometry.max_cell_height.saturating_sub(gaps) / count;
    fitted
        .min(geometry.max_bar_height)
        .max(geometry.min_bar_height)
}

/// Builds the grid from the plan and the related set.
///
/// A key present in both sets is drawn once, as a selected bar.
pub fn selection_matrix(state: &SelectionState, geometry: &MatrixGeometry) -> SelectionMatrix {
    let selected = state.selected_policies();
    let related = state.related_policies();
    let current = (state.selected_dimension(), state.selected_phase());

    let cells = Dimension::ALL
        .iter()
        .flat_map(|&dimension| Phase::ALL.iter().map(move |&phase| (dimension, phase)))
        .map(|(dimension, phase)| {
            let in_cell = |key: &&PolicyKey| key.in_cell(dimension, phase);
            let mut bars: Vec<MatrixBar> = selected
                .iter()
                .filter(in_cell)
                .map(|key| MatrixBar {
                    key: key.clone(),
                    kind: BarKind::Selected,
                })
                .collect();
            bars.extend(
                related
                    .iter()
                    .filter(in_cell)
                    .filter(|key| !selected.contains(*key))
                    .map(|key| MatrixBar {
                        key: key.clone(),
                        kind: BarKind::Related,
                    }),
            );
            MatrixCell {
                dimension,
                phase,
                is_current: current == (Some(dimension), Some(phase)),
                bar_height: bar_height(geometry, bars.len()),
                bars,
            }
        })
        .collect();

    SelectionMatrix {
        geometry: *geometry,
        cells,
    }
}

/// Plan counts per phase and per dimension. Every phase and dimension is present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlanCoverage {
    pub by_phase: BTreeMap<Phase, usize>,
    pub by_dimension: BTreeMap<Dimension, usize>,
    pub total: usize,
}

impl PlanCoverage {
    pub fn from_plan<'k>(plan: impl IntoIterator<Item = &'k PolicyKey>) -> Self {
        let mut by_phase: BTreeMap<Phase, usize> = Phase::ALL.iter().map(|&p| (p, 0)).collect();
        let mut by_dimension: BTreeMap<Dimension, usize> =
            Dimension::ALL.iter().map(|&d| (d, 0)).collect();
        let mut total = 0;
        for key in plan {
            *by_phase.entry(key.phase).or_default() += 1;
            *by_dimension.entry(key.dimension).or_default() += 1;
            total += 1;
        }
        Self {
            by_phase,
            by_dimension,
            total,
        }
    }

    pub fn phase(&self, phase: Phase) -> usize {
        self.by_phase.get(&phase).copied().unwrap_or(0)
    }

    pub fn dimension(&self, dimension: Dimension) -> usize {
        self.by_dimension.get(&dimension).copied().unwrap_or(0)
    }

    pub fn used_dimensions(&self) -> Vec<Dimension> {
        self.by_dimension
            .iter()
            .filter(|(_, &count)| count > 0)
            .map(|(&d, _)| d)
            .collect()
    }

    pub fn unused_dimensions(&self) -> Vec<Dimension> {
        self.by_dimension
            .iter()
            .filter(|(_, &count)| count == 0)
            .map(|(&d, _)| d)
            .collect()
    }
}

pub fn plan_coverage(plan: &BTreeSet<PolicyKey>) -> PlanCoverage {
    PlanCoverage::from_plan(plan)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn key(dimension: Dimension, phase: Phase, id: &str) -> PolicyKey {
        PolicyKey::new(dimension, phase, id)
    }

    #[test]
    fn bar_height_shrinks_within_bounds() {
        let geometry = MatrixGeometry::default();
        assert_eq!(bar_height(&geometry, 1), 16);
        assert_eq!(bar_height(&geometry, 3), 16);
        // (52 - 3) / 4 = 12
        assert_eq!(bar_height(&geometry, 4), 12);
        // (52 - 9) / 10 = 4
        assert_eq!(bar_height(&geometry, 10), 4);
        assert_eq!(bar_height(&geometry, 60), 4);
        assert_eq!(bar_height(&geometry, 0), 4);
    }

    #[test]
    fn matrix_has_twenty_cells_dimension_major() {
        let matrix = selection_matrix(&SelectionState::new(), &MatrixGeometry::default());
        assert_eq!(matrix.cells.len(), 20);
        assert_eq!(matrix.cells[0].dimension, Dimension::EnablingInfrastructure);
        assert_eq!(matrix.cells[0].phase, Phase::Analysis);
        assert_eq!(matrix.cells[4].dimension, Dimension::LegislationPolicy);
        assert!(matrix.cells.iter().all(|c| c.bars.is_empty()));
    }

    #[test]
    fn selected_bars_precede_related_and_dedupe() {
        let mut state = SelectionState::new();
        state.set_dimension(Dimension::EnablingInfrastructure);
        state.set_phase(Phase::Design);
        let both = key(Dimension::EnablingInfrastructure, Phase::Design, "P2");
        let related_only = key(Dimension::EnablingInfrastructure, Phase::Design, "P1");
        let elsewhere = key(Dimension::LegislationPolicy, Phase::Analysis, "P7");
        state.add_to_plan(both.clone());
        state.set_related_policies([related_only.clone(), both.clone(), elsewhere.clone()]);

        let matrix = selection_matrix(&state, &MatrixGeometry::default());
        let cell = matrix
            .cell(Dimension::EnablingInfrastructure, Phase::Design)
            .unwrap();
        assert!(cell.is_current);
        assert_eq!(
            cell.bars,
            vec![
                MatrixBar { key: both, kind: BarKind::Selected },
                MatrixBar { key: related_only, kind: BarKind::Related },
            ]
        );
        let other = matrix
            .cell(Dimension::LegislationPolicy, Phase::Analysis)
            .unwrap();
        assert!(!other.is_current);
        assert_eq!(other.count(BarKind::Related), 1);
    }

    #[test]
    fn coverage_counts_every_axis() {
        let plan: BTreeSet<PolicyKey> = [
            key(Dimension::LegislationPolicy, Phase::Analysis, "A"),
            key(Dimension::LegislationPolicy, Phase::Design, "B"),
            key(Dimension::ResearchEducation, Phase::Design, "C"),
        ]
        .into_iter()
        .collect();
        let coverage = plan_coverage(&plan);
        assert_eq!(coverage.total, 3);
        assert_eq!(coverage.phase(Phase::Design), 2);
        assert_eq!(coverage.phase(Phase::Implementation), 0);
        assert_eq!(coverage.dimension(Dimension::LegislationPolicy), 2);
        assert_eq!(
            coverage.used_dimensions(),
            vec![Dimension::LegislationPolicy, Dimension::ResearchEducation]
        );
        assert_eq!(coverage.unused_dimensions().len(), 3);
    }
}
