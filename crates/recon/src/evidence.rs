use std::collections::BTreeMap;

use serde::Serialize;

use crate::model::{Cause, PrepayNote, ReconciliationReport};

/// One display row of a cause bucket: who, when, how much.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CauseLine {
    pub cause: Cause,
    pub name: String,
    /// Refund date for A, payment date for B, treatment date for C.
    pub date: String,
    /// Signed contribution to the settled-minus-billed difference.
    pub amount: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<PrepayNote>,
}

/// Rows for one cause, in bucket order. Amounts sum to the bucket total.
pub fn cause_lines(report: &ReconciliationReport, cause: Cause) -> Vec<CauseLine> {
    match cause {
        Cause::PriorMonthRefund => report
            .prior_month_refunds
            .entries
            .iter()
            .map(|e| CauseLine {
                cause,
                name: e.name.clone(),
                date: e.refund_date.clone(),
                amount: e.settled_amount,
                note: None,
            })
            .collect(),
        Cause::PriorMonthPayment => report
            .prior_month_payments
            .entries
            .iter()
            .map(|e| CauseLine {
                cause,
                name: e.name.clone(),
                date: e.payment_date.clone(),
                amount: e.settled_amount,
                note: None,
            })
            .collect(),
        Cause::UnsettledBilling => report
            .unsettled_billing
            .entries
            .iter()
            .map(|e| CauseLine {
                cause,
                name: e.name.clone(),
                date: e.treatment_date.clone(),
                amount: 0.0 - e.billed_amount,
                note: Some(report.prepay_note(&e.name)),
            })
            .collect(),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReconSummary {
    pub target_month: String,
    pub collection_rows: usize,
    pub revenue_rows: usize,
    pub cause_counts: BTreeMap<String, usize>,
    pub explained: f64,
    pub residual: f64,
    pub fully_explained: bool,
}

/// Compute summary statistics for a finished report.
pub fn compute_summary(report: &ReconciliationReport, tolerance: f64) -> ReconSummary {
    let cause_counts = Cause::ALL
        .iter()
        .map(|c| (c.to_string(), report.cause_count(*c)))
        .collect();

    ReconSummary {
        target_month: report.target_month.clone(),
        collection_rows: report.collection_rows,
        revenue_rows: report.revenue_rows,
        cause_counts,
        explained: report.explained(),
        residual: report.residual,
        fully_explained: report.is_explained(tolerance),
    }
}
