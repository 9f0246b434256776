use crate::catalog::Catalog;
use crate::error::{CatalogError, Result};
use crate::model::{ExpertRecord, SpecialConsiderations};
use crate::raw::{parse_experts, PolicyTable};
use policy_protocol::SourceStatus;
use std::path::{Path, PathBuf};

pub const DEFAULT_POLICY_FILE: &str = "policy-data.json";
pub const DEFAULT_EXPERTS_FILE: &str = "expert-data.json";
pub const DEFAULT_CONSIDERATIONS_FILE: &str = "special-considerations.json";

/// Locations of the three datasets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataSources {
    pub policies: PathBuf,
    pub experts: PathBuf,
    pub considerations: PathBuf,
}

impl Default for DataSources {
    fn default() -> Self {
        Self {
            policies: PathBuf::from(DEFAULT_POLICY_FILE),
            experts: PathBuf::from(DEFAULT_EXPERTS_FILE),
            considerations: PathBuf::from(DEFAULT_CONSIDERATIONS_FILE),
        }
    }
}

impl DataSources {
    /// Default file names inside `dir`.
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        Self::default().rebased(dir)
    }

    /// Resolves relative paths against `dir`; absolute paths are kept.
    #[must_use]
    pub fn rebased(self, dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        let rebase = |path: PathBuf| {
            if path.is_absolute() {
                path
            } else {
                dir.join(path)
            }
        };
        Self {
            policies: rebase(self.policies),
            experts: rebase(self.experts),
            considerations: rebase(self.considerations),
        }
    }
}

#[derive(Debug)]
pub struct LoadReport {
    pub catalog: Catalog,
    pub status: SourceStatus,
}

async fn read_document(path: &Path) -> Result<String> {
    tokio::fs::read_to_string(path)
        .await
        .map_err(|source| CatalogError::Io {
            path: path.to_path_buf(),
            source,
        })
}

pub async fn load_policies(path: &Path) -> Result<PolicyTable> {
    let raw = read_document(path).await?;
    PolicyTable::from_json_str(&raw)
}

pub async fn load_experts(path: &Path) -> Result<Vec<ExpertRecord>> {
    let raw = read_document(path).await?;
    parse_experts(&raw)
}

pub async fn load_considerations(path: &Path) -> Result<SpecialConsiderations> {
    let raw = read_document(path).await?;
    SpecialConsiderations::from_json_str(&raw)
}

/// Loads all datasets concurrently.
///
/// The policy dataset is mandatory; experts and considerations degrade to
/// empty tables with a warning.
pub async fn load_all(sources: &DataSources) -> Result<LoadReport> {
    let (policies, experts, considerations) = tokio::join!(
        load_policies(&sources.policies),
        load_experts(&sources.experts),
        load_considerations(&sources.considerations),
    );

    let policies = match policies {
        Ok(table) => table,
        Err(err) => {
            log::error!("Error loading policy data: {err}");
            return Err(CatalogError::PolicyDataUnavailable(err.to_string()));
        }
    };
    if policies.is_empty() {
        log::warn!(
            "Policy data at {} contains no policies",
            sources.policies.display()
        );
    } else {
        log::info!("Policy data loaded ({} policies)", policies.len());
    }

    let mut status = SourceStatus {
        policies: true,
        ..SourceStatus::default()
    };

    let experts = match experts {
        Ok(experts) => {
            status.experts = true;
            log::info!("Experts data loaded ({} experts)", experts.len());
            experts
        }
        Err(err) => {
            log::warn!("Experts data unavailable, expert matching disabled: {err}");
            Vec::new()
        }
    };

    let considerations = match considerations {
        Ok(considerations) => {
            status.considerations = true;
            log::info!("Special considerations loaded");
            considerations
        }
        Err(err) => {
            log::warn!("Special considerations unavailable: {err}");
            SpecialConsiderations::default()
        }
    };

    Ok(LoadReport {
        catalog: Catalog::new(policies, experts, considerations),
        status,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    const POLICIES: &str = r#"{ "Enabling Infrastructure": { "Design": { "P1": { "policy": "Grid", "details": "Power" } } } }"#;

    #[tokio::test]
    async fn loads_all_sources_from_directory() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join(DEFAULT_POLICY_FILE), POLICIES).unwrap();
        fs::write(dir.path().join(DEFAULT_EXPERTS_FILE), r#"[{"name":"A"}]"#).unwrap();
        fs::write(dir.path().join(DEFAULT_CONSIDERATIONS_FILE), "{}").unwrap();

        let report = load_all(&DataSources::in_dir(dir.path())).await.unwrap();
        assert!(report.status.all_loaded());
        assert_eq!(report.catalog.policies().len(), 1);
        assert_eq!(report.catalog.experts().len(), 1);
    }

    #[tokio::test]
    async fn optional_sources_degrade() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join(DEFAULT_POLICY_FILE), POLICIES).unwrap();
        fs::write(dir.path().join(DEFAULT_EXPERTS_FILE), "not json").unwrap();

        let report = load_all(&DataSources::in_dir(dir.path())).await.unwrap();
        assert!(report.status.policies);
        assert!(!report.status.experts);
        assert!(!report.status.considerations);
        assert!(report.catalog.experts().is_empty());
        assert!(report.catalog.considerations().is_empty());
    }

    #[tokio::test]
    async fn missing_policy_data_is_fatal() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join(DEFAULT_EXPERTS_FILE), "[]").unwrap();

        let err = load_all(&DataSources::in_dir(dir.path())).await.unwrap_err();
        assert!(matches!(err, CatalogError::PolicyDataUnavailable(_)));
    }

    #[test]
    fn rebase_keeps_absolute_paths() {
        let absolute = std::env::temp_dir().join("p.json");
        let sources = DataSources {
            policies: absolute.clone(),
            ..DataSources::default()
        }
        .rebased("/data");
        assert_eq!(sources.policies, absolute);
        assert_eq!(sources.experts, Path::new("/data").join(DEFAULT_EXPERTS_FILE));
    }
}
