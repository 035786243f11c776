//! Whole-run orchestration: build every dataset from one random state, write
//! the files, and record what was written in a manifest.

use chrono::NaiveDate;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::path::Path;

use arbore_core::persistence::atomic_write_json;
use arbore_core::{ArboreError, GeneratorConfig, OutputFormat};

use crate::catalog::{build_products, clean_wood_specs};
use crate::claims::{ClaimBatch, generate_claims};
use crate::model::{Order, SupplierWoodSpec, WatchProduct};
use crate::orders::generate_orders;
use crate::output::{encode_json, hash_bytes, to_csv, write_bytes};
use crate::supplier::generate_suppliers;
use crate::vocab::{customer_ids, product_ids, region_woods, wood_species};

pub const ORDERS_FILE: &str = "orders/orders.json";
pub const CLAIMS_FILE: &str = "claims/warranty_claims.json";
pub const SUPPLIERS_FILE: &str = "supplier/wood_specs.csv";
pub const CLEAN_SUPPLIERS_FILE: &str = "supplier/wood_specs_clean.csv";
pub const PRODUCTS_FILE: &str = "dims/d_watch_product.csv";
pub const MANIFEST_FILE: &str = "manifest.json";

/// Everything one `generate` run produces.
#[derive(Debug, Clone)]
pub struct Dataset {
    pub orders: Vec<Order>,
    pub claims: ClaimBatch,
    pub suppliers: Vec<SupplierWoodSpec>,
}

/// Build orders, claims and supplier specs.
///
/// The random state is consumed in a fixed order (id pools, vocabularies,
/// orders, claims, suppliers), so one seed always yields the same dataset.
pub fn generate_dataset<R: Rng + ?Sized>(
    rng: &mut R,
    config: &GeneratorConfig,
    fallback_day: NaiveDate,
) -> Result<Dataset, ArboreError> {
    let rates = &config.rates;
    let products = product_ids(config.product_count);
    let customers = customer_ids(rng, config.customer_count);
    let regions = region_woods(rng, rates.vocabulary_typo);
    let species = wood_species();

    tracing::info!(count = config.orders, "generating orders");
    let orders = generate_orders(rng, config.orders, &products, &customers, rates)?;

    tracing::info!(count = config.claims, "generating warranty claims");
    let claims = generate_claims(rng, config.claims, &orders, fallback_day, rates)?;

    tracing::info!(count = config.suppliers, "generating supplier wood specs");
    let suppliers = generate_suppliers(rng, config.suppliers, &regions, &species, rates)?;

    Ok(Dataset {
        orders,
        claims,
        suppliers,
    })
}

/// One file written by a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestEntry {
    /// Path relative to the output directory, `/`-separated.
    pub path: String,
    pub records: usize,
    pub sha256: String,
}

/// Replay information for a `generate` run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    pub seed: u64,
    pub format: OutputFormat,
    pub files: Vec<ManifestEntry>,
}

fn write_entry(out_dir: &Path, relative: &str, records: usize, bytes: &[u8]) -> Result<ManifestEntry, ArboreError> {
    write_bytes(&out_dir.join(relative), bytes)?;
    Ok(ManifestEntry {
        path: relative.to_string(),
        records,
        sha256: hash_bytes(bytes),
    })
}

/// Write the dataset under `out_dir`, fully replacing earlier runs' files,
/// then write `manifest.json`.
pub fn write_dataset(
    dataset: &Dataset,
    out_dir: &Path,
    format: OutputFormat,
    seed: u64,
) -> Result<Manifest, ArboreError> {
    let files = vec![
        write_entry(
            out_dir,
            ORDERS_FILE,
            dataset.orders.len(),
            &encode_json(&dataset.orders, format)?,
        )?,
        write_entry(
            out_dir,
            CLAIMS_FILE,
            dataset.claims.claims.len(),
            &encode_json(&dataset.claims.claims, format)?,
        )?,
        write_entry(
            out_dir,
            SUPPLIERS_FILE,
            dataset.suppliers.len(),
            &to_csv(&dataset.suppliers)?,
        )?,
    ];

    let manifest = Manifest {
        seed,
        format,
        files,
    };
    atomic_write_json(&out_dir.join(MANIFEST_FILE), &manifest)?;
    Ok(manifest)
}

/// The clean reference files.
#[derive(Debug, Clone)]
pub struct Catalog {
    pub woods: Vec<SupplierWoodSpec>,
    pub products: Vec<WatchProduct>,
}

pub fn generate_catalog<R: Rng + ?Sized>(
    rng: &mut R,
    product_count: usize,
    today: NaiveDate,
) -> Result<Catalog, ArboreError> {
    let woods = clean_wood_specs(rng, today)?;
    let products = build_products(&product_ids(product_count), &woods);
    Ok(Catalog { woods, products })
}

pub fn write_catalog(catalog: &Catalog, out_dir: &Path) -> Result<Vec<ManifestEntry>, ArboreError> {
    Ok(vec![
        write_entry(
            out_dir,
            CLEAN_SUPPLIERS_FILE,
            catalog.woods.len(),
            &to_csv(&catalog.woods)?,
        )?,
        write_entry(
            out_dir,
            PRODUCTS_FILE,
            catalog.products.len(),
            &to_csv(&catalog.products)?,
        )?,
    ])
}
