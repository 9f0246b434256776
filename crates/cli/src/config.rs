use anyhow::{Context, Result};
use policy_catalog::DataSources;
use policy_search::EngineProfile;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

pub const DATA_DIR_ENV: &str = "POLICY_TOOL_DATA_DIR";
pub const CONFIG_ENV: &str = "POLICY_TOOL_CONFIG";

/// Values given on the command line. `None` defers to env, file, default.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub config: Option<PathBuf>,
    pub data_dir: Option<PathBuf>,
    pub policies: Option<PathBuf>,
    pub experts: Option<PathBuf>,
    pub considerations: Option<PathBuf>,
}

/// `[data]` table of the config file. Engine sections live beside it.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct DataTable {
    dir: Option<PathBuf>,
    policies: Option<PathBuf>,
    experts: Option<PathBuf>,
    considerations: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
struct FileConfig {
    #[serde(default)]
    data: DataTable,
}

#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub sources: DataSources,
    pub profile: EngineProfile,
    pub config_path: Option<PathBuf>,
}

impl ResolvedConfig {
    /// Flag > env > file > default.
    pub fn resolve(overrides: &ConfigOverrides) -> Result<Self> {
        Self::resolve_with_env(overrides, |name| std::env::var_os(name).map(PathBuf::from))
    }

    pub fn resolve_with_env(
        overrides: &ConfigOverrides,
        env: impl Fn(&str) -> Option<PathBuf>,
    ) -> Result<Self> {
        let config_path = overrides.config.clone().or_else(|| env(CONFIG_ENV));
        let (file, profile) = match &config_path {
            Some(path) => read_config_file(path)?,
            None => (FileConfig::default(), EngineProfile::default()),
        };
        let config_dir = config_path
            .as_deref()
            .and_then(Path::parent)
            .map(Path::to_path_buf)
            .unwrap_or_default();

        // Paths from the file are relative to the file itself.
        let from_file = |path: Option<PathBuf>| path.map(|p| config_dir.join(p));
        let data_dir = overrides
            .data_dir
            .clone()
            .or_else(|| env(DATA_DIR_ENV))
            .or_else(|| from_file(file.data.dir.clone()));

        let defaults = DataSources::default();
        let pick = |flag: &Option<PathBuf>, from: Option<PathBuf>, default: PathBuf| {
            flag.clone().or_else(|| from_file(from)).unwrap_or(default)
        };
        let sources = DataSources {
            policies: pick(&overrides.policies, file.data.policies, defaults.policies),
            experts: pick(&overrides.experts, file.data.experts, defaults.experts),
            considerations: pick(
                &overrides.considerations,
                file.data.considerations,
                defaults.considerations,
            ),
        };
        let sources = match data_dir {
            Some(dir) => sources.rebased(dir),
            None => sources,
        };

        log::debug!(
            "data sources: policies={} experts={} considerations={}",
            sources.policies.display(),
            sources.experts.display(),
            sources.considerations.display()
        );
        Ok(Self {
            sources,
            profile,
            config_path,
        })
    }
}

fn read_config_file(path: &Path) -> Result<(FileConfig, EngineProfile)> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {}", path.display()))?;
    let file: FileConfig = toml::from_str(&raw)
        .with_context(|| format!("Invalid [data] table in {}", path.display()))?;
    let profile = EngineProfile::from_toml_str(&raw)
        .with_context(|| format!("Invalid engine profile in {}", path.display()))?;
    log::info!("Loaded config {}", path.display());
    Ok((file, profile))
}
