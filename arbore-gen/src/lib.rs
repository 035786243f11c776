//! # arbore-gen — dirty test data for the Arboré ETL pipeline
//!
//! Generates orders, warranty claims and supplier wood specs with realistic
//! defects (typos, null markers, mixed casing, rotating date formats, duplicate
//! keys, out-of-domain values) so downstream cleaning logic has something to
//! chew on. Every generator takes the random state as an explicit `&mut R`
//! argument, so a seeded `StdRng` reproduces a run byte for byte.
//!
//! Also provides the clean reference catalog (wood species and the watch
//! product dimension) used to check cleaned tables against.

// Primitives
pub mod corrupt;
pub mod dates;
pub mod vocab;

// Entities
pub mod claims;
pub mod model;
pub mod orders;
pub mod supplier;

// Reference data
pub mod catalog;

// Files
pub mod output;
pub mod pipeline;

pub use claims::{ClaimBatch, generate_claims};
pub use corrupt::{maybe_case, maybe_null, strip_accents, typo};
pub use dates::{DateFormat, ParsedDate, format_date, parse_order_date};
pub use model::{
    Density, MaybeNull, Order, Quantity, Severity, SeverityLevel, SupplierWoodSpec, WarrantyClaim,
    WarrantyFlag, WatchProduct,
};
pub use orders::generate_orders;
pub use pipeline::{
    Catalog, Dataset, Manifest, ManifestEntry, generate_catalog, generate_dataset, write_catalog,
    write_dataset,
};
pub use supplier::generate_suppliers;
