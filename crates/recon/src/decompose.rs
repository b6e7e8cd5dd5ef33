use std::collections::{BTreeMap, HashSet};

use crate::model::{Cause, CauseBucket, CollectionEntry, RevenueEntry};

/// Totals, the three cause buckets, and whatever is left over.
#[derive(Debug, Clone, PartialEq)]
pub struct Decomposition {
    pub total_settled: f64,
    pub total_billed: f64,
    pub total_difference: f64,
    pub prior_month_refunds: CauseBucket<CollectionEntry>,
    pub prior_month_payments: CauseBucket<CollectionEntry>,
    pub unsettled_billing: CauseBucket<RevenueEntry>,
    pub prepay_by_name: BTreeMap<String, f64>,
    pub residual: f64,
}

/// Attribute `settled - billed` for month `target` (`YYYY-MM`) to the three
/// timing causes.
pub fn decompose(
    collections: &[CollectionEntry],
    revenue: &[RevenueEntry],
    target: &str,
) -> Decomposition {
    let total_settled = sum(collections.iter().map(|e| e.settled_amount));
    let total_billed = sum(revenue.iter().map(|e| e.billed_amount));
    let total_difference = total_settled - total_billed;

    let refunds = prior_month_refunds(collections, target);
    let payments = prior_month_payments(collections, target);
    let unsettled = unsettled_billing(collections, revenue, target);

    let unsettled_billed = sum(unsettled.iter().map(|e| e.billed_amount));
    let refunds_total = sum(refunds.iter().map(|e| e.settled_amount));
    let payments_total = sum(payments.iter().map(|e| e.settled_amount));
    let residual = total_difference - (refunds_total + payments_total - unsettled_billed);

    log::debug!(
        "causes for {target}: A={} rows, B={} rows, C={} rows, residual {residual}",
        refunds.len(),
        payments.len(),
        unsettled.len(),
    );

    Decomposition {
        total_settled,
        total_billed,
        total_difference,
        prior_month_refunds: CauseBucket {
            cause: Cause::PriorMonthRefund,
            entries: refunds,
            total: refunds_total,
        },
        prior_month_payments: CauseBucket {
            cause: Cause::PriorMonthPayment,
            entries: payments,
            total: payments_total,
        },
        unsettled_billing: CauseBucket {
            cause: Cause::UnsettledBilling,
            entries: unsettled,
            // Billed but never collected: lowers the collections side.
            total: 0.0 - unsettled_billed,
        },
        prepay_by_name: prepay_by_name(collections),
        residual,
    }
}

/// A: paid outside the target month, refunded inside it, net negative.
pub fn prior_month_refunds(collections: &[CollectionEntry], target: &str) -> Vec<CollectionEntry> {
    collections
        .iter()
        .filter(|e| {
            !e.payment_date.starts_with(target)
                && e.refund_date.starts_with(target)
                && e.settled_amount < 0.0
        })
        .cloned()
        .collect()
}

/// B: paid inside the target month for a treatment dated outside it.
pub fn prior_month_payments(collections: &[CollectionEntry], target: &str) -> Vec<CollectionEntry> {
    collections
        .iter()
        .filter(|e| {
            e.payment_date.starts_with(target)
                && !e.treatment_date.is_empty()
                && !e.treatment_date.starts_with(target)
                && e.settled_amount > 0.0
        })
        .cloned()
        .collect()
}

/// C: billed for a target-month treatment with no target-month payment,
/// matched by identifier and by `name_treatmentdate`.
pub fn unsettled_billing(
    collections: &[CollectionEntry],
    revenue: &[RevenueEntry],
    target: &str,
) -> Vec<RevenueEntry> {
    let mut settled_keys: HashSet<String> = HashSet::new();
    for e in collections.iter().filter(|e| e.payment_date.starts_with(target)) {
        if let Some(id) = &e.id {
            settled_keys.insert(id.clone());
        }
        settled_keys.insert(e.match_key());
    }

    revenue
        .iter()
        .filter(|e| e.treatment_date.starts_with(target) && e.billed_amount > 0.0)
        .filter(|e| !e.id.as_ref().is_some_and(|id| settled_keys.contains(id)))
        .filter(|e| !settled_keys.contains(&e.match_key()))
        .cloned()
        .collect()
}

/// Positive prepay-ledger movement per patient, across all collections rows.
pub fn prepay_by_name(collections: &[CollectionEntry]) -> BTreeMap<String, f64> {
    let mut map: BTreeMap<String, f64> = BTreeMap::new();
    for e in collections.iter().filter(|e| e.prepay_amount > 0.0) {
        *map.entry(e.name.clone()).or_insert(0.0) += e.prepay_amount;
    }
    map
}

fn sum(values: impl Iterator<Item = f64>) -> f64 {
    values.fold(0.0, |acc, v| acc + v)
}
