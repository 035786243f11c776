//! Configuration system for arbore.
//!
//! Uses `figment` for layered configuration: defaults -> config file -> environment -> CLI args.
//! Configuration is loaded from `~/.config/arbore/config.toml` and/or `.arbore/config.toml`
//! in the workspace directory.

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::ArboreError;

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ArboreConfig {
    #[serde(default)]
    pub generator: GeneratorConfig,
    #[serde(default)]
    pub warehouse: WarehouseConfig,
    #[serde(default)]
    pub staging: StagingConfig,
}

/// Output encoding for the order and claim files.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    /// A single pretty-printed JSON array.
    #[default]
    Json,
    /// One JSON object per line.
    Ndjson,
}

/// Dirty-data generator settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratorConfig {
    /// Number of orders before the duplicate tail is appended.
    #[serde(default = "default_orders")]
    pub orders: usize,
    /// Number of warranty claims.
    #[serde(default = "default_claims")]
    pub claims: usize,
    /// Number of supplier wood spec rows.
    #[serde(default = "default_suppliers")]
    pub suppliers: usize,
    /// Size of the product id pool (`W001`..).
    #[serde(default = "default_product_count")]
    pub product_count: usize,
    /// Size of the customer id pool.
    #[serde(default = "default_customer_count")]
    pub customer_count: usize,
    /// Fixed seed. When absent a fresh one is drawn and logged.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    #[serde(default)]
    pub format: OutputFormat,
    #[serde(default)]
    pub rates: FaultRates,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            orders: default_orders(),
            claims: default_claims(),
            suppliers: default_suppliers(),
            product_count: default_product_count(),
            customer_count: default_customer_count(),
            seed: None,
            output_dir: default_output_dir(),
            format: OutputFormat::default(),
            rates: FaultRates::default(),
        }
    }
}

fn default_orders() -> usize {
    10_000
}
fn default_claims() -> usize {
    300
}
fn default_suppliers() -> usize {
    20
}
fn default_product_count() -> usize {
    50
}
fn default_customer_count() -> usize {
    200
}
fn default_output_dir() -> PathBuf {
    PathBuf::from("data_out")
}

/// Probability of every intentional fault the generator injects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FaultRates {
    pub order_prefix_missing: f64,
    pub quantity_spelled: f64,
    pub customer_null: f64,
    pub product_case: f64,
    pub notes_null: f64,
    /// Fraction of orders appended again as exact copies.
    pub order_duplicates: f64,
    pub claim_product_case: f64,
    pub return_before_order: f64,
    /// Fraction of claims whose id is copied onto another claim.
    pub claim_id_duplicates: f64,
    pub vocabulary_typo: f64,
    pub density_unknown: f64,
    pub hardness_absent: f64,
    pub carbon_sign_flip: f64,
    pub recyclability_out_of_range: f64,
    pub certification_typo: f64,
    pub origin_blank: f64,
}

impl Default for FaultRates {
    fn default() -> Self {
        Self {
            order_prefix_missing: 0.05,
            quantity_spelled: 0.10,
            customer_null: 0.05,
            product_case: 0.30,
            notes_null: 0.20,
            order_duplicates: 0.02,
            claim_product_case: 0.50,
            return_before_order: 0.05,
            claim_id_duplicates: 0.01,
            vocabulary_typo: 0.10,
            density_unknown: 0.10,
            hardness_absent: 0.05,
            carbon_sign_flip: 0.05,
            recyclability_out_of_range: 0.10,
            certification_typo: 0.10,
            origin_blank: 0.20,
        }
    }
}

impl FaultRates {
    /// Every rate paired with its config key.
    pub fn entries(&self) -> [(&'static str, f64); 16] {
        [
            ("order_prefix_missing", self.order_prefix_missing),
            ("quantity_spelled", self.quantity_spelled),
            ("customer_null", self.customer_null),
            ("product_case", self.product_case),
            ("notes_null", self.notes_null),
            ("order_duplicates", self.order_duplicates),
            ("claim_product_case", self.claim_product_case),
            ("return_before_order", self.return_before_order),
            ("claim_id_duplicates", self.claim_id_duplicates),
            ("vocabulary_typo", self.vocabulary_typo),
            ("density_unknown", self.density_unknown),
            ("hardness_absent", self.hardness_absent),
            ("carbon_sign_flip", self.carbon_sign_flip),
            ("recyclability_out_of_range", self.recyclability_out_of_range),
            ("certification_typo", self.certification_typo),
            ("origin_blank", self.origin_blank),
        ]
    }

    /// A rate set that injects no faults at all.
    pub fn clean() -> Self {
        Self {
            order_prefix_missing: 0.0,
            quantity_spelled: 0.0,
            customer_null: 0.0,
            product_case: 0.0,
            notes_null: 0.0,
            order_duplicates: 0.0,
            claim_product_case: 0.0,
            return_before_order: 0.0,
            claim_id_duplicates: 0.0,
            vocabulary_typo: 0.0,
            density_unknown: 0.0,
            hardness_absent: 0.0,
            carbon_sign_flip: 0.0,
            recyclability_out_of_range: 0.0,
            certification_typo: 0.0,
            origin_blank: 0.0,
        }
    }
}

/// Local warehouse settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WarehouseConfig {
    /// SQLite database standing in for the cloud warehouse.
    #[serde(default = "default_database")]
    pub database: PathBuf,
    /// Tag attached to every session in the log.
    #[serde(default = "default_query_tag")]
    pub query_tag: String,
}

impl Default for WarehouseConfig {
    fn default() -> Self {
        Self {
            database: default_database(),
            query_tag: default_query_tag(),
        }
    }
}

fn default_database() -> PathBuf {
    PathBuf::from(".arbore/warehouse.db")
}
fn default_query_tag() -> String {
    "arbore-json-insert".to_string()
}

/// Staged micro-batch ingestion settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StagingConfig {
    /// Root of the table stages (`<root>/<TABLE>/<file>`).
    #[serde(default = "default_stage_root")]
    pub stage_root: PathBuf,
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    #[serde(default = "default_orders_pipe")]
    pub orders_pipe: String,
    #[serde(default = "default_claims_pipe")]
    pub claims_pipe: String,
}

impl Default for StagingConfig {
    fn default() -> Self {
        Self {
            stage_root: default_stage_root(),
            batch_size: default_batch_size(),
            orders_pipe: default_orders_pipe(),
            claims_pipe: default_claims_pipe(),
        }
    }
}

fn default_stage_root() -> PathBuf {
    PathBuf::from(".arbore/stage")
}
fn default_batch_size() -> usize {
    1000
}
fn default_orders_pipe() -> String {
    "INGEST.INGEST.ARBORE_ORDERS_PIPE".to_string()
}
fn default_claims_pipe() -> String {
    "INGEST.INGEST.ARBORE_WARRANTY_CLAIMS_PIPE".to_string()
}

impl ArboreConfig {
    /// Reject settings the generators and loaders cannot run with.
    pub fn validate(&self) -> Result<(), ArboreError> {
        for (name, rate) in self.generator.rates.entries() {
            if !(0.0..=1.0).contains(&rate) {
                return Err(ArboreError::config(format!(
                    "generator.rates.{name} must be within [0, 1], got {rate}"
                )));
            }
        }
        if self.generator.product_count == 0 {
            return Err(ArboreError::config("generator.product_count must be >= 1"));
        }
        if self.generator.customer_count == 0 {
            return Err(ArboreError::config("generator.customer_count must be >= 1"));
        }
        if self.staging.batch_size == 0 {
            return Err(ArboreError::config("staging.batch_size must be >= 1"));
        }
        Ok(())
    }

    /// Resolve relative paths against the workspace directory.
    pub fn resolve_paths(&mut self, workspace: &Path) {
        for path in [
            &mut self.generator.output_dir,
            &mut self.warehouse.database,
            &mut self.staging.stage_root,
        ] {
            if path.is_relative() {
                *path = workspace.join(&*path);
            }
        }
    }
}

/// Load configuration from layered sources.
///
/// Priority (highest to lowest):
/// 1. Environment variables (prefixed with `ARBORE_`)
/// 2. Explicit config file, else workspace-local config (`.arbore/config.toml`)
/// 3. User config (`~/.config/arbore/config.toml`)
/// 4. Built-in defaults
///
/// Command-line flags are applied by the caller on the extracted value.
pub fn load_config(
    workspace: Option<&Path>,
    config_file: Option<&Path>,
) -> Result<ArboreConfig, Box<figment::Error>> {
    let mut figment = Figment::from(Serialized::defaults(ArboreConfig::default()));

    if let Some(config_dir) = directories::ProjectDirs::from("dev", "arbore", "arbore") {
        let user_config = config_dir.config_dir().join("config.toml");
        if user_config.exists() {
            tracing::debug!(path = %user_config.display(), "merging user config");
            figment = figment.merge(Toml::file(&user_config));
        }
    }

    if let Some(file) = config_file {
        tracing::debug!(path = %file.display(), "merging config file");
        figment = figment.merge(Toml::file(file));
    } else if let Some(ws) = workspace {
        let ws_config = workspace_config_path(ws);
        if ws_config.exists() {
            tracing::debug!(path = %ws_config.display(), "merging workspace config");
            figment = figment.merge(Toml::file(&ws_config));
        }
    }

    // ARBORE_GENERATOR__SEED, ARBORE_STAGING__BATCH_SIZE, etc.
    figment = figment.merge(Env::prefixed("ARBORE_").split("__"));

    figment.extract().map_err(Box::new)
}

/// Workspace-local config file path.
pub fn workspace_config_path(workspace: &Path) -> PathBuf {
    workspace.join(".arbore").join("config.toml")
}
