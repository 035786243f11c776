//! Domain vocabularies, expanded with intentionally corrupted variants.
//!
//! Each builder returns the whole pool at once. Pools are a fixed multiple of
//! their canonical vocabulary, and callers sample uniformly from them, so a
//! corrupted variant is as likely to be drawn as a clean one.

use rand::Rng;

use crate::corrupt::{capitalize, has_accents, strip_accents, typo};
use crate::model::{Severity, SeverityLevel};

pub const REGIONS: [&str; 10] = [
    "Bretagne",
    "Normandie",
    "Alsace",
    "Provence",
    "Aquitaine",
    "Bourgogne",
    "Corse",
    "Lorraine",
    "Picardie",
    "Auvergne",
];

pub const WOOD_SPECIES: [&str; 10] = [
    "oak", "maple", "walnut", "cherry", "pine", "mahogany", "teak", "ebony", "ash", "birch",
];

pub const RETURN_REASONS: [&str; 6] = ["battery", "movement", "strap", "glass", "finish", "defect"];

pub const NUMBER_WORDS: [&str; 5] = ["one", "two", "three", "four", "five"];

pub const ORIGINS: [&str; 5] = ["France", "Germany", "Italy", "Spain", "Sweden"];

/// Pool multiplier for [`region_woods`].
pub const REGION_VARIANTS: usize = 3;
/// Pool multiplier for [`wood_species`].
pub const SPECIES_VARIANTS: usize = 3;
/// Pool multiplier for [`return_reasons`].
pub const REASON_VARIANTS: usize = 3;
/// Pool multiplier for [`severity_levels`].
pub const SEVERITY_VARIANTS: usize = 4;

/// Regions: the name, its accent-stripped form (or a typo when it has no
/// accents), and a typo.
pub fn region_woods<R: Rng + ?Sized>(rng: &mut R, typo_rate: f64) -> Vec<String> {
    expand_regions(rng, &REGIONS, typo_rate)
}

/// Same expansion as [`region_woods`] over an arbitrary vocabulary.
pub fn expand_regions<R: Rng + ?Sized>(rng: &mut R, regions: &[&str], typo_rate: f64) -> Vec<String> {
    let mut pool = Vec::with_capacity(regions.len() * REGION_VARIANTS);
    for region in regions {
        pool.push(region.to_string());
        if has_accents(region) {
            pool.push(strip_accents(region));
        } else {
            pool.push(typo(rng, region, typo_rate));
        }
        pool.push(typo(rng, region, typo_rate));
    }
    pool
}

/// Species: the name, upper-cased and capitalized.
pub fn wood_species() -> Vec<String> {
    let mut pool = Vec::with_capacity(WOOD_SPECIES.len() * SPECIES_VARIANTS);
    for species in WOOD_SPECIES {
        pool.push(species.to_string());
        pool.push(species.to_uppercase());
        pool.push(capitalize(species));
    }
    pool
}

/// Return reasons: the reason plus two independent typo draws.
pub fn return_reasons<R: Rng + ?Sized>(rng: &mut R, typo_rate: f64) -> Vec<String> {
    let mut pool = Vec::with_capacity(RETURN_REASONS.len() * REASON_VARIANTS);
    for reason in RETURN_REASONS {
        pool.push(reason.to_string());
        pool.push(typo(rng, reason, typo_rate));
        pool.push(typo(rng, reason, typo_rate));
    }
    pool
}

/// Severities: canonical, padded with spaces, lower-cased and capitalized.
pub fn severity_levels() -> Vec<Severity> {
    let mut pool = Vec::with_capacity(SeverityLevel::ALL.len() * SEVERITY_VARIANTS);
    for level in SeverityLevel::ALL {
        let canonical = level.as_str();
        for raw in [
            canonical.to_string(),
            format!(" {canonical} "),
            canonical.to_lowercase(),
            capitalize(canonical),
        ] {
            pool.push(Severity { level, raw });
        }
    }
    pool
}

/// `W001`, `W002`, ... `W{count}`.
pub fn product_ids(count: usize) -> Vec<String> {
    (1..=count).map(|i| format!("W{i:03}")).collect()
}

/// `count` random customer ids in `C1000..=C9999`; repeats are allowed.
pub fn customer_ids<R: Rng + ?Sized>(rng: &mut R, count: usize) -> Vec<String> {
    (0..count)
        .map(|_| format!("C{}", rng.gen_range(1000..=9999)))
        .collect()
}
