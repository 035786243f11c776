//! Clean reference data: the wood species catalog and the watch product
//! dimension built on top of it.
//!
//! Unlike the dirty generators, nothing here is corrupted. These files are
//! the reference the cleaned warehouse tables are checked against.

use chrono::NaiveDate;
use rand::Rng;
use rand::distributions::{Distribution, WeightedIndex};
use rand::seq::SliceRandom;

use arbore_core::ArboreError;

use crate::dates::DateFormat;
use crate::model::{Density, SupplierWoodSpec, WatchProduct};
use crate::supplier::round2;

/// One species in the reference catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WoodSpecies {
    pub name: &'static str,
    /// Market region, e.g. "Europe".
    pub region: &'static str,
    pub countries: &'static [&'static str],
    /// Inclusive density range in kg/m³.
    pub density: (u32, u32),
}

const fn species(
    name: &'static str,
    region: &'static str,
    countries: &'static [&'static str],
    density: (u32, u32),
) -> WoodSpecies {
    WoodSpecies {
        name,
        region,
        countries,
        density,
    }
}

pub const WOOD_CATALOG: [WoodSpecies; 25] = [
    species("Oak", "Europe", &["France", "Germany", "UK", "Balkans"], (600, 800)),
    species("Beech", "Europe", &["Germany", "Austria", "Switzerland"], (600, 750)),
    species("Chestnut", "Europe", &["France", "Italy", "Spain"], (550, 700)),
    species("Ash", "Europe", &["Sweden", "Norway", "Finland", "Germany"], (600, 750)),
    species("Olive", "Europe", &["Italy", "Greece", "Spain"], (700, 850)),
    species("Birch", "Europe", &["Sweden", "Finland", "Russia"], (550, 700)),
    species("Maple", "North America", &["Canada", "USA"], (550, 700)),
    species("Walnut", "North America", &["USA"], (600, 750)),
    species("Cherry", "North America", &["USA"], (550, 650)),
    species("Redwood", "North America", &["USA"], (450, 550)),
    species("Hickory", "North America", &["USA"], (700, 850)),
    species("Mahogany", "South America", &["Brazil", "Peru"], (550, 700)),
    species("Rosewood", "South America", &["Brazil"], (800, 950)),
    species("Ipe", "South America", &["Brazil"], (850, 1000)),
    species("Pau Ferro", "South America", &["Brazil"], (800, 950)),
    species("Ebony", "Africa", &["Cameroon", "Congo", "Gabon"], (850, 1000)),
    species("African Mahogany", "Africa", &["Ghana", "Ivory Coast", "Nigeria"], (550, 700)),
    species("Bubinga", "Africa", &["Cameroon", "Gabon"], (750, 900)),
    species("Wenge", "Africa", &["Congo"], (800, 950)),
    species("Teak", "Asia", &["Myanmar", "Indonesia", "India"], (600, 750)),
    species("Bamboo", "Asia", &["China", "Vietnam", "Thailand"], (400, 600)),
    species("Mango", "Asia", &["India", "Thailand"], (550, 700)),
    species("Sandalwood", "Asia", &["India"], (750, 900)),
    species("Padauk", "Asia", &["Myanmar", "Laos"], (700, 850)),
    species("Jarrah", "Oceania", &["Australia"], (800, 950)),
];

pub const CERTIFICATIONS: [(&str, f64); 3] = [("FSC", 0.5), ("PEFC", 0.3), ("None", 0.2)];

/// Exotic or dense woods that carry a price premium.
pub const PREMIUM_WOODS: [&str; 11] = [
    "Teak",
    "Ebony",
    "Rosewood",
    "Jarrah",
    "Wenge",
    "Mahogany",
    "African Mahogany",
    "Bubinga",
    "Ipe",
    "Pau Ferro",
    "Padauk",
];

pub const PREMIUM_MULTIPLIER: f64 = 1.15;

/// Watch collection tier with its inclusive EUR price range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Category {
    pub name: &'static str,
    pub min_price: u32,
    pub max_price: u32,
}

pub const CATEGORIES: [Category; 4] = [
    Category {
        name: "Arboré Héritage",
        min_price: 700,
        max_price: 1200,
    },
    Category {
        name: "Arboré Voyage",
        min_price: 400,
        max_price: 800,
    },
    Category {
        name: "Arboré Élégance",
        min_price: 250,
        max_price: 500,
    },
    Category {
        name: "Arboré Essentiel",
        min_price: 120,
        max_price: 250,
    },
];

fn base_hardness(density: u32) -> u32 {
    match density {
        d if d < 600 => 3000,
        d if d < 800 => 5000,
        _ => 7000,
    }
}

/// One clean spec per catalog species, stamped with `today`.
pub fn clean_wood_specs<R: Rng + ?Sized>(
    rng: &mut R,
    today: NaiveDate,
) -> Result<Vec<SupplierWoodSpec>, ArboreError> {
    let weights = WeightedIndex::new(CERTIFICATIONS.iter().map(|(_, w)| *w))
        .map_err(|e| ArboreError::generation(format!("certification weights: {e}")))?;
    let updated_at = DateFormat::Iso.render(today);

    let specs = WOOD_CATALOG
        .iter()
        .map(|wood| {
            let origin = wood.countries.choose(rng).copied().unwrap_or(wood.region);
            let density = rng.gen_range(wood.density.0..=wood.density.1);
            let base = base_hardness(density);
            SupplierWoodSpec {
                region_wood: origin.to_string(),
                wood_species: wood.name.to_string(),
                density_kg_m3: Density::Measured(density),
                hardness_n: Some(rng.gen_range(base..=base + 5000)),
                carbon_storage_kg_co2e_per_kg: round2(rng.gen_range(1.5..=3.0)),
                recyclability_rate_pct: rng.gen_range(60..=100),
                certification: CERTIFICATIONS[weights.sample(rng)].0.to_string(),
                origin: origin.to_string(),
                updated_at: updated_at.clone(),
            }
        })
        .collect();
    Ok(specs)
}

/// Price of a watch in `category` made of `wood_species`.
pub fn price_eur(category: &Category, wood_species: &str) -> u32 {
    let mut base = f64::from(category.min_price + category.max_price) / 2.0;
    if PREMIUM_WOODS.contains(&wood_species) {
        base *= PREMIUM_MULTIPLIER;
    }
    let variation = (wood_species.chars().count() % 10) as f64 - 5.0;
    let price = (base + variation * 10.0).trunc() as i64;
    price.clamp(i64::from(category.min_price), i64::from(category.max_price)) as u32
}

/// Pair every wood with every category, assigning product ids in order.
///
/// When `product_ids` is too short it is extended with `P0001`, `P0002`, ...
pub fn build_products(product_ids: &[String], woods: &[SupplierWoodSpec]) -> Vec<WatchProduct> {
    let needed = woods.len() * CATEGORIES.len();
    let mut ids = product_ids.to_vec();
    if ids.len() < needed {
        tracing::warn!(
            needed,
            supplied = ids.len(),
            "not enough product ids; extending with generated P-ids"
        );
        ids.extend((1..=needed - ids.len()).map(|i| format!("P{i:04}")));
    }

    let pairs = woods
        .iter()
        .flat_map(|wood| CATEGORIES.iter().map(move |category| (wood, category)));
    ids.into_iter()
        .zip(pairs)
        .map(|(product_id, (wood, category))| WatchProduct {
            product_id,
            product_name: format!("{} {}", category.name, wood.wood_species),
            wood_species: wood.wood_species.clone(),
            region_wood: wood.region_wood.clone(),
            category: category.name.to_string(),
            price_eur: price_eur(category, &wood.wood_species),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vocab::product_ids;
    use pretty_assertions::assert_eq;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
    }

    #[test]
    fn test_clean_specs_follow_catalog() {
        let mut rng = StdRng::seed_from_u64(51);
        let specs = clean_wood_specs(&mut rng, today()).unwrap();
        assert_eq!(specs.len(), 25);
        for (spec, wood) in specs.iter().zip(WOOD_CATALOG.iter()) {
            assert_eq!(spec.wood_species, wood.name);
            assert!(wood.countries.contains(&spec.origin.as_str()));
            assert_eq!(spec.region_wood, spec.origin);
            let Density::Measured(d) = spec.density_kg_m3 else {
                panic!("clean density must be measured");
            };
            assert!((wood.density.0..=wood.density.1).contains(&d));
            let base = base_hardness(d);
            let h = spec.hardness_n.unwrap();
            assert!((base..=base + 5000).contains(&h));
            assert!((1.5..=3.0).contains(&spec.carbon_storage_kg_co2e_per_kg));
            assert!((60..=100).contains(&spec.recyclability_rate_pct));
            assert!(["FSC", "PEFC", "None"].contains(&spec.certification.as_str()));
            assert_eq!(spec.updated_at, "2026-10-19");
        }
    }

    #[test]
    fn test_price_rule() {
        let heritage = &CATEGORIES[0];
        // 950 - 2 * 10
        assert_eq!(price_eur(heritage, "Oak"), 930);
        // 950 * 1.15 - 1 * 10 = 1082.5
        assert_eq!(price_eur(heritage, "Teak"), 1082);
        let essentiel = &CATEGORIES[3];
        // 185 * 1.15 + 3 * 10 = 242.75
        assert_eq!(price_eur(essentiel, "Rosewood"), 242);
        // 185 * 1.15 + 1 * 10 = 222.75 ("African Mahogany" has 16 chars)
        assert_eq!(price_eur(essentiel, "African Mahogany"), 222);
    }

    #[test]
    fn test_price_is_clamped() {
        let tiny = Category {
            name: "tiny",
            min_price: 100,
            max_price: 101,
        };
        assert_eq!(price_eur(&tiny, "Oak"), 100);
        assert_eq!(price_eur(&tiny, "Rosewood"), 101);
    }

    #[test]
    fn test_products_extend_ids() {
        let mut rng = StdRng::seed_from_u64(52);
        let specs = clean_wood_specs(&mut rng, today()).unwrap();
        let products = build_products(&product_ids(50), &specs);
        assert_eq!(products.len(), 100);
        assert_eq!(products[0].product_id, "W001");
        assert_eq!(products[49].product_id, "W050");
        assert_eq!(products[50].product_id, "P0001");
        assert_eq!(products[99].product_id, "P0050");
        assert_eq!(products[0].product_name, "Arboré Héritage Oak");
        assert_eq!(products[3].category, "Arboré Essentiel");
        assert_eq!(products[4].wood_species, "Beech");
    }

    #[test]
    fn test_products_with_spare_ids() {
        let mut rng = StdRng::seed_from_u64(53);
        let specs = clean_wood_specs(&mut rng, today()).unwrap();
        let products = build_products(&product_ids(200), &specs[..2]);
        assert_eq!(products.len(), 8);
        assert_eq!(products[7].product_id, "W008");
    }
}
