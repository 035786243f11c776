//! Warranty claim generation.
//!
//! Every claim points at an order that was actually generated. Dates are
//! recovered from the order's serialized date text, so the lenient parser's
//! fallback leaks into the output exactly as it would for real input.

use chrono::{Duration, NaiveDate};
use rand::Rng;
use rand::seq::SliceRandom;
use std::collections::HashMap;

use arbore_core::{ArboreError, FaultRates};

use crate::corrupt::maybe_case;
use crate::dates::{format_date, parse_order_date};
use crate::model::{Order, WarrantyClaim, WarrantyFlag};
use crate::orders::duplicate_count;
use crate::vocab::{return_reasons, severity_levels};

/// First sequence number used for claim ids.
pub const CLAIM_ID_BASE: usize = 200_001;

/// Generated claims plus what the generator had to improvise.
#[derive(Debug, Clone, Default)]
pub struct ClaimBatch {
    pub claims: Vec<WarrantyClaim>,
    /// Indexes of claims whose order date could not be parsed and was
    /// replaced by the fallback day.
    pub date_fallbacks: Vec<usize>,
    /// How many claims had their id overwritten by another claim's id.
    pub reassigned_ids: usize,
}

/// Generate `count` claims against `orders`.
///
/// `fallback_day` stands in for any order date that cannot be read back;
/// production callers pass today's date. No claims are produced when
/// `orders` is empty.
pub fn generate_claims<R: Rng + ?Sized>(
    rng: &mut R,
    count: usize,
    orders: &[Order],
    fallback_day: NaiveDate,
    rates: &FaultRates,
) -> Result<ClaimBatch, ArboreError> {
    let mut batch = ClaimBatch::default();
    if orders.is_empty() {
        tracing::warn!("no orders to attach claims to; skipping claim generation");
        return Ok(batch);
    }

    let reasons = return_reasons(rng, rates.vocabulary_typo);
    let severities = severity_levels();

    for i in 0..count {
        let order = orders
            .choose(rng)
            .ok_or_else(|| ArboreError::generation("order pool exhausted"))?;

        let parsed = parse_order_date(&order.order_date, fallback_day);
        if parsed.is_fallback() {
            batch.date_fallbacks.push(i);
        }
        let order_date = parsed.date();

        let return_date = if rng.gen_bool(rates.return_before_order) {
            order_date - Duration::days(rng.gen_range(1..=30))
        } else {
            order_date + Duration::days(rng.gen_range(1..=365))
        };

        let product_id = maybe_case(rng, &order.product_id, rates.claim_product_case);
        let order_date_text = format_date(rng, order_date);
        let return_date_text = format_date(rng, return_date);
        let return_reason = reasons.choose(rng).cloned().unwrap_or_default();
        let severity = severities
            .choose(rng)
            .cloned()
            .ok_or_else(|| ArboreError::generation("severity pool is empty"))?;
        let under_warranty = WarrantyFlag::ALL
            .choose(rng)
            .copied()
            .unwrap_or(WarrantyFlag::N);

        batch.claims.push(WarrantyClaim {
            claim_id: format!("R{:06}", i + CLAIM_ID_BASE),
            order_id: order.order_id.clone(),
            product_id,
            order_date: order_date_text,
            return_date: return_date_text,
            return_reason,
            severity,
            under_warranty,
        });
    }

    let passes = duplicate_count(count, rates.claim_id_duplicates);
    batch.reassigned_ids = reassign_claim_ids(rng, &mut batch.claims, passes);

    if !batch.date_fallbacks.is_empty() {
        tracing::warn!(
            count = batch.date_fallbacks.len(),
            %fallback_day,
            "order dates could not be parsed; fallback day used"
        );
    }
    tracing::debug!(
        claims = batch.claims.len(),
        reassigned_ids = batch.reassigned_ids,
        "claims generated"
    );
    Ok(batch)
}

/// Copy a random claim's id onto a different claim, `passes` times.
///
/// The target is always a claim whose id is still unique and differs from the
/// copied id, so each pass removes exactly one distinct id while the rest of
/// the row stays untouched. Returns the number of ids overwritten.
pub fn reassign_claim_ids<R: Rng + ?Sized>(
    rng: &mut R,
    claims: &mut [WarrantyClaim],
    passes: usize,
) -> usize {
    if passes == 0 || claims.len() < 2 {
        return 0;
    }

    let mut counts: HashMap<String, usize> = HashMap::new();
    for claim in claims.iter() {
        *counts.entry(claim.claim_id.clone()).or_default() += 1;
    }
    let mut unique = UniqueIds::new(claims.len());
    for (i, claim) in claims.iter().enumerate() {
        if counts.get(&claim.claim_id) == Some(&1) {
            unique.insert(i);
        }
    }

    let mut reassigned = 0;
    for _ in 0..passes {
        let Some(target) = unique.choose(rng) else {
            break;
        };
        // Any other claim will do: the target's id is held by the target alone.
        let mut source = rng.gen_range(0..claims.len() - 1);
        if source >= target {
            source += 1;
        }
        let id = claims[source].claim_id.clone();
        tracing::trace!(from = source, to = target, claim_id = %id, "claim id duplicated");

        let old = std::mem::replace(&mut claims[target].claim_id, id.clone());
        counts.remove(&old);
        unique.remove(target);
        let held = counts.entry(id).or_default();
        *held += 1;
        if *held == 2 {
            unique.remove(source);
        }
        reassigned += 1;
    }
    reassigned
}

/// Indices of claims whose id occurs exactly once, with O(1) insert, removal
/// and uniform draws.
struct UniqueIds {
    members: Vec<usize>,
    /// Position of each claim index in `members`.
    slots: Vec<Option<usize>>,
}

impl UniqueIds {
    fn new(len: usize) -> Self {
        Self {
            members: Vec::new(),
            slots: vec![None; len],
        }
    }

    fn insert(&mut self, index: usize) {
        if self.slots[index].is_none() {
            self.slots[index] = Some(self.members.len());
            self.members.push(index);
        }
    }

    fn remove(&mut self, index: usize) {
        let Some(slot) = self.slots[index].take() else {
            return;
        };
        self.members.swap_remove(slot);
        if let Some(&moved) = self.members.get(slot) {
            self.slots[moved] = Some(slot);
        }
    }

    fn choose<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<usize> {
        self.members.choose(rng).copied()
    }
}
