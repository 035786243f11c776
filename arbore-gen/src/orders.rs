//! Order generation.

use chrono::NaiveDate;
use rand::Rng;
use rand::seq::SliceRandom;

use arbore_core::{ArboreError, FaultRates};

use crate::corrupt::{maybe_case, maybe_null};
use crate::dates::{format_date, random_date};
use crate::model::{Order, Quantity};
use crate::vocab::NUMBER_WORDS;

/// First sequence number used for order ids.
pub const ORDER_ID_BASE: usize = 100_001;

pub const ORDER_NOTE: &str = "Standard delivery";

/// Inclusive start and exclusive end of the order date window.
pub fn order_window() -> (NaiveDate, NaiveDate) {
    (
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap_or(NaiveDate::MIN),
        NaiveDate::from_ymd_opt(2025, 12, 31).unwrap_or(NaiveDate::MIN),
    )
}

/// Number of exact copies appended after `count` generated orders.
pub fn duplicate_count(count: usize, rate: f64) -> usize {
    (count as f64 * rate).floor() as usize
}

/// Generate `count` orders followed by a tail of exact duplicates.
///
/// The result holds `count + floor(count * rates.order_duplicates)` records.
pub fn generate_orders<R: Rng + ?Sized>(
    rng: &mut R,
    count: usize,
    product_ids: &[String],
    customer_ids: &[String],
    rates: &FaultRates,
) -> Result<Vec<Order>, ArboreError> {
    if product_ids.is_empty() {
        return Err(ArboreError::invalid_input("product id pool is empty"));
    }
    if customer_ids.is_empty() {
        return Err(ArboreError::invalid_input("customer id pool is empty"));
    }

    let (start, end) = order_window();
    let dup_count = duplicate_count(count, rates.order_duplicates);
    let mut orders = Vec::with_capacity(count + dup_count);

    for i in 0..count {
        let order_date = random_date(rng, start, end);

        let seq = i + ORDER_ID_BASE;
        let order_id = if rng.gen_bool(rates.order_prefix_missing) {
            format!("{seq:06}")
        } else {
            format!("O{seq:06}")
        };

        let quantity = draw_quantity(rng, rates.quantity_spelled);

        let customer = customer_ids.choose(rng).cloned().unwrap_or_default();
        let product = product_ids.choose(rng).cloned().unwrap_or_default();

        orders.push(Order {
            order_id,
            customer_id: maybe_null(rng, customer, rates.customer_null),
            product_id: maybe_case(rng, &product, rates.product_case),
            quantity,
            order_date: format_date(rng, order_date),
            order_notes: maybe_null(rng, ORDER_NOTE.to_string(), rates.notes_null),
        });
    }

    if !orders.is_empty() {
        for _ in 0..dup_count {
            let idx = rng.gen_range(0..orders.len());
            let copy = orders[idx].clone();
            orders.push(copy);
        }
    }

    tracing::debug!(
        generated = count,
        duplicates = dup_count,
        total = orders.len(),
        "orders generated"
    );
    Ok(orders)
}

/// A quantity of 1-5, replaced by a random number word with probability `p`.
///
/// The word is drawn independently of the number, so it need not match it.
fn draw_quantity<R: Rng + ?Sized>(rng: &mut R, p: f64) -> Quantity {
    let n: u8 = rng.gen_range(1..=5);
    if rng.gen_bool(p) {
        let word = NUMBER_WORDS.choose(rng).copied().unwrap_or("one");
        Quantity::Spelled(word.to_string())
    } else {
        Quantity::Numeric(n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::MaybeNull;
    use crate::vocab::{customer_ids, product_ids};
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn pools(rng: &mut StdRng) -> (Vec<String>, Vec<String>) {
        (product_ids(50), customer_ids(rng, 200))
    }

    #[test]
    fn test_duplicate_tail_length() {
        let mut rng = StdRng::seed_from_u64(21);
        let (products, customers) = pools(&mut rng);
        for n in [0, 1, 49, 50, 99, 100, 1234] {
            let orders =
                generate_orders(&mut rng, n, &products, &customers, &FaultRates::default()).unwrap();
            assert_eq!(orders.len(), n + n * 2 / 100, "n = {n}");
        }
    }

    #[test]
    fn test_duplicates_are_exact_copies() {
        let mut rng = StdRng::seed_from_u64(22);
        let (products, customers) = pools(&mut rng);
        let orders =
            generate_orders(&mut rng, 500, &products, &customers, &FaultRates::default()).unwrap();
        let (head, tail) = orders.split_at(500);
        assert_eq!(tail.len(), 10);
        for dup in tail {
            assert!(head.contains(dup));
        }
    }

    #[test]
    fn test_clean_rates_produce_clean_orders() {
        let mut rng = StdRng::seed_from_u64(23);
        let (products, customers) = pools(&mut rng);
        let orders =
            generate_orders(&mut rng, 200, &products, &customers, &FaultRates::clean()).unwrap();
        assert_eq!(orders.len(), 200);
        for (i, order) in orders.iter().enumerate() {
            assert_eq!(order.order_id, format!("O{}", i + ORDER_ID_BASE));
            assert!(matches!(order.quantity, Quantity::Numeric(1..=5)));
            assert!(order.customer_id.is_value());
            assert!(products.contains(&order.product_id));
            assert_eq!(
                order.order_notes,
                MaybeNull::Value(ORDER_NOTE.to_string())
            );
        }
    }

    #[test]
    fn test_faults_appear_at_high_rates() {
        let mut rng = StdRng::seed_from_u64(24);
        let (products, customers) = pools(&mut rng);
        let rates = FaultRates {
            order_prefix_missing: 1.0,
            quantity_spelled: 1.0,
            customer_null: 1.0,
            ..FaultRates::default()
        };
        let orders = generate_orders(&mut rng, 50, &products, &customers, &rates).unwrap();
        for order in &orders {
            assert!(order.order_id.chars().all(|c| c.is_ascii_digit()));
            assert_eq!(order.order_id.len(), 6);
            match &order.quantity {
                Quantity::Spelled(w) => assert!(NUMBER_WORDS.contains(&w.as_str())),
                Quantity::Numeric(_) => panic!("expected spelled quantity"),
            }
            assert!(!order.customer_id.is_value());
        }
    }

    #[test]
    fn test_empty_pools_rejected() {
        let mut rng = StdRng::seed_from_u64(25);
        let err = generate_orders(&mut rng, 5, &[], &["C1".to_string()], &FaultRates::default());
        assert!(err.is_err());
        let err = generate_orders(&mut rng, 5, &["W001".to_string()], &[], &FaultRates::default());
        assert!(err.is_err());
    }
}
