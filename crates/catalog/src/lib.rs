//! # Policy Catalog
//!
//! Read-only data model behind the policy explorer: policy initiatives laid
//! out on a dimension × phase grid, expert profiles, and the special
//! considerations attached to each grid cell.
//!
//! ```text
//! policy-data.json ─────────┐
//! expert-data.json ─────────┼──> loader (concurrent reads, joint await)
//! special-considerations ───┘        │
//!                                    ├─ raw shapes → normalisation
//!                                    └─ Catalog { policies, experts, considerations }
//! ```

mod catalog;
mod error;
mod key;
mod loader;
mod model;
mod raw;
mod types;

pub use catalog::{Catalog, CatalogStatistics};
pub use error::{CatalogError, KeyError, Result};
pub use key::PolicyKey;
pub use loader::{
    load_all, load_considerations, load_experts, load_policies, DataSources, LoadReport,
    DEFAULT_CONSIDERATIONS_FILE, DEFAULT_EXPERTS_FILE, DEFAULT_POLICY_FILE,
};
pub use model::{
    ConsiderationGroup, ConsiderationItem, ExpertRecord, PhaseMapping, PolicyEntry, PolicyRecord,
    SpecialConsiderations,
};
pub use raw::{parse_experts, PolicyTable};
pub use types::{Dimension, Phase};
