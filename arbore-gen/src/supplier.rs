//! Supplier wood specification generation.

use rand::Rng;
use rand::seq::SliceRandom;

use arbore_core::{ArboreError, FaultRates};

use crate::corrupt::typo;
use crate::dates::{format_date, random_date};
use crate::model::{Density, SupplierWoodSpec};
use crate::orders::order_window;
use crate::vocab::ORIGINS;

pub const CERTIFICATION: &str = "FSC";

/// Round to two decimals.
pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Generate `count` supplier specs, drawing region and species from the
/// (already corrupted) vocabulary pools.
pub fn generate_suppliers<R: Rng + ?Sized>(
    rng: &mut R,
    count: usize,
    region_woods: &[String],
    wood_species: &[String],
    rates: &FaultRates,
) -> Result<Vec<SupplierWoodSpec>, ArboreError> {
    if region_woods.is_empty() || wood_species.is_empty() {
        return Err(ArboreError::invalid_input(
            "region and species vocabularies must not be empty",
        ));
    }
    let (start, end) = order_window();
    let mut suppliers = Vec::with_capacity(count);

    for _ in 0..count {
        let region_wood = region_woods.choose(rng).cloned().unwrap_or_default();

        let density = if rng.gen_bool(rates.density_unknown) {
            Density::Unknown
        } else {
            Density::Measured(rng.gen_range(300..=1200))
        };

        let hardness_n = if rng.gen_bool(rates.hardness_absent) {
            None
        } else {
            Some(rng.gen_range(1000..=5000))
        };

        let mut carbon = round2(rng.gen_range(0.5..=3.0));
        if rng.gen_bool(rates.carbon_sign_flip) {
            carbon = -carbon;
        }

        let recyclability = if rng.gen_bool(rates.recyclability_out_of_range) {
            rng.gen_range(101..=120)
        } else {
            rng.gen_range(30..=100)
        };

        let certification = if rng.gen_bool(rates.certification_typo) {
            typo(rng, CERTIFICATION, 1.0)
        } else {
            CERTIFICATION.to_string()
        };

        let origin = if rng.gen_bool(rates.origin_blank) {
            String::new()
        } else {
            ORIGINS.choose(rng).map(|o| o.to_string()).unwrap_or_default()
        };

        let updated = random_date(rng, start, end);

        suppliers.push(SupplierWoodSpec {
            region_wood,
            wood_species: wood_species.choose(rng).cloned().unwrap_or_default(),
            density_kg_m3: density,
            hardness_n,
            carbon_storage_kg_co2e_per_kg: carbon,
            recyclability_rate_pct: recyclability,
            certification,
            origin,
            updated_at: format_date(rng, updated),
        });
    }

    tracing::debug!(suppliers = suppliers.len(), "supplier specs generated");
    Ok(suppliers)
}
