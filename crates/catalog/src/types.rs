use crate::error::KeyError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Top-level policy category (one matrix row).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Dimension {
    EnablingInfrastructure,
    LegislationPolicy,
    SustainabilitySociety,
    EconomyInnovation,
    ResearchEducation,
}

impl Dimension {
    pub const ALL: [Dimension; 5] = [
        Dimension::EnablingInfrastructure,
        Dimension::LegislationPolicy,
        Dimension::SustainabilitySociety,
        Dimension::EconomyInnovation,
        Dimension::ResearchEducation,
    ];

    /// Canonical id, as used in data files and composite keys.
    pub const fn id(self) -> &'static str {
        match self {
            Dimension::EnablingInfrastructure => "Enabling Infrastructure",
            Dimension::LegislationPolicy => "Legislation & Policy",
            Dimension::SustainabilitySociety => "Sustainability & Society",
            Dimension::EconomyInnovation => "Economy & Innovation",
            Dimension::ResearchEducation => "Research & Education",
        }
    }

    pub const fn short_name(self) -> &'static str {
        match self {
            Dimension::EnablingInfrastructure => "Enabling Infrastructure",
            Dimension::LegislationPolicy => "Legislation & Policy",
            Dimension::SustainabilitySociety => "Sustainability & Society",
            Dimension::EconomyInnovation => "Economic Measures and Innovation",
            Dimension::ResearchEducation => "Research, Education & Capacity Building",
        }
    }

    pub const fn slug(self) -> &'static str {
        match self {
            Dimension::EnablingInfrastructure => "infrastructure",
            Dimension::LegislationPolicy => "legislation",
            Dimension::SustainabilitySociety => "sustainability",
            Dimension::EconomyInnovation => "economic",
            Dimension::ResearchEducation => "research",
        }
    }

    pub const fn initial(self) -> char {
        match self {
            Dimension::EnablingInfrastructure => 'I',
            Dimension::LegislationPolicy => 'L',
            Dimension::SustainabilitySociety => 'S',
            Dimension::EconomyInnovation => 'E',
            Dimension::ResearchEducation => 'R',
        }
    }

    pub const fn color(self) -> &'static str {
        match self {
            Dimension::EnablingInfrastructure => "rgb(22, 102, 106)",
            Dimension::LegislationPolicy => "#cb9b3d",
            Dimension::SustainabilitySociety => "#5f0085",
            Dimension::EconomyInnovation => "#8b2f30",
            Dimension::ResearchEducation => "#005b3a",
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for Dimension {
    type Err = KeyError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let needle = raw.trim();
        Dimension::ALL
            .into_iter()
            .find(|d| {
                needle.eq_ignore_ascii_case(d.id())
                    || needle.eq_ignore_ascii_case(d.short_name())
                    || needle.eq_ignore_ascii_case(d.slug())
            })
            .ok_or_else(|| KeyError::UnknownDimension(raw.to_string()))
    }
}

impl TryFrom<String> for Dimension {
    type Error = KeyError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Dimension> for String {
    fn from(value: Dimension) -> Self {
        value.id().to_string()
    }
}

/// Implementation stage (one matrix column).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Phase {
    Analysis,
    Design,
    Implementation,
    MonitoringEvaluation,
}

impl Phase {
    pub const ALL: [Phase; 4] = [
        Phase::Analysis,
        Phase::Design,
        Phase::Implementation,
        Phase::MonitoringEvaluation,
    ];

    pub const fn id(self) -> &'static str {
        match self {
            Phase::Analysis => "Analysis",
            Phase::Design => "Design",
            Phase::Implementation => "Implementation",
            Phase::MonitoringEvaluation => "Monitoring and Evaluation",
        }
    }

    pub const fn short_name(self) -> &'static str {
        match self {
            Phase::MonitoringEvaluation => "Monitoring & Evaluation",
            other => other.id(),
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for Phase {
    type Err = KeyError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let needle = raw.trim();
        if needle.eq_ignore_ascii_case("monitoring") {
            return Ok(Phase::MonitoringEvaluation);
        }
        Phase::ALL
            .into_iter()
            .find(|p| needle.eq_ignore_ascii_case(p.id()) || needle.eq_ignore_ascii_case(p.short_name()))
            .ok_or_else(|| KeyError::UnknownPhase(raw.to_string()))
    }
}

impl TryFrom<String> for Phase {
    type Error = KeyError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Phase> for String {
    fn from(value: Phase) -> Self {
        value.id().to_string()
    }
}
