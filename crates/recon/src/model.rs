use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

// ---------------------------------------------------------------------------
// Raw input
// ---------------------------------------------------------------------------

/// One cell of an untyped source row.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum RawCell {
    Empty,
    Text(String),
    Number(f64),
}

impl RawCell {
    /// Empty cells, empty text, and numeric zero/NaN carry no value.
    pub fn is_falsy(&self) -> bool {
        match self {
            Self::Empty => true,
            Self::Text(s) => s.is_empty(),
            Self::Number(n) => *n == 0.0 || n.is_nan(),
        }
    }

    /// String form of the cell, without trimming.
    pub fn to_text(&self) -> String {
        match self {
            Self::Empty => String::new(),
            Self::Text(s) => s.clone(),
            Self::Number(n) => n.to_string(),
        }
    }
}

impl From<&str> for RawCell {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for RawCell {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<f64> for RawCell {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

/// A source row: column label → cell, in header order.
///
/// Labels are whatever the exporting program wrote; nothing past the
/// normalizer looks at them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawRecord {
    fields: Vec<(String, RawCell)>,
}

impl RawRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a column, or overwrite the cell if the exact label already exists.
    pub fn insert(&mut self, label: impl Into<String>, cell: impl Into<RawCell>) {
        let label = label.into();
        let cell = cell.into();
        match self.fields.iter_mut().find(|(l, _)| *l == label) {
            Some((_, existing)) => *existing = cell,
            None => self.fields.push((label, cell)),
        }
    }

    pub fn get(&self, label: &str) -> Option<&RawCell> {
        self.fields.iter().find(|(l, _)| l == label).map(|(_, c)| c)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &RawCell)> {
        self.fields.iter().map(|(l, c)| (l.as_str(), c))
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(l, _)| l.as_str())
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<L, C> FromIterator<(L, C)> for RawRecord
where
    L: Into<String>,
    C: Into<RawCell>,
{
    fn from_iter<I: IntoIterator<Item = (L, C)>>(iter: I) -> Self {
        let mut record = RawRecord::new();
        for (label, cell) in iter {
            record.insert(label, cell);
        }
        record
    }
}

// ---------------------------------------------------------------------------
// Classification
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LedgerKind {
    Revenue,
    Collections,
}

impl fmt::Display for LedgerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Revenue => write!(f, "revenue"),
            Self::Collections => write!(f, "collections"),
        }
    }
}

/// Argument position of a dataset handed to the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InputSide {
    First,
    Second,
}

impl InputSide {
    pub fn other(self) -> Self {
        match self {
            Self::First => Self::Second,
            Self::Second => Self::First,
        }
    }
}

/// Which rule of the classifier made the call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassifyRule {
    /// Exactly one dataset carried a revenue-total column.
    RevenueMarker,
    /// Ambiguous, but the first dataset carried a payment-date column.
    CollectionsMarker,
    /// Ambiguous; fell back to argument order.
    InputOrder,
}

impl fmt::Display for ClassifyRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RevenueMarker => write!(f, "revenue_marker"),
            Self::CollectionsMarker => write!(f, "collections_marker"),
            Self::InputOrder => write!(f, "input_order"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Classification {
    pub revenue: InputSide,
    pub rule: ClassifyRule,
}

impl Classification {
    pub fn collections(&self) -> InputSide {
        self.revenue.other()
    }
}

// ---------------------------------------------------------------------------
// Canonical entries
// ---------------------------------------------------------------------------

/// Per-method components of one collections row. Refunds come through as
/// negative components.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct PaymentMethods {
    pub card: f64,
    pub cash_counter: f64,
    pub cash_transfer: f64,
    pub app_pay: f64,
    pub platform: f64,
    pub other: f64,
    pub prepay: f64,
}

impl PaymentMethods {
    pub fn total(&self) -> f64 {
        self.card
            + self.cash_counter
            + self.cash_transfer
            + self.app_pay
            + self.platform
            + self.other
            + self.prepay
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CollectionEntry {
    pub name: String,
    pub id: Option<String>,
    pub payment_date: String,
    pub treatment_date: String,
    pub refund_date: String,
    pub methods: PaymentMethods,
    pub settled_amount: f64,
    pub prepay_amount: f64,
}

impl CollectionEntry {
    /// `settled_amount` and `prepay_amount` are always derived from `methods`.
    pub fn new(
        name: String,
        id: Option<String>,
        payment_date: String,
        treatment_date: String,
        refund_date: String,
        methods: PaymentMethods,
    ) -> Self {
        Self {
            name,
            id,
            payment_date,
            treatment_date,
            refund_date,
            settled_amount: methods.total(),
            prepay_amount: methods.prepay,
            methods,
        }
    }

    pub fn match_key(&self) -> String {
        composite_key(&self.name, &self.treatment_date)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RevenueEntry {
    pub name: String,
    pub id: Option<String>,
    pub treatment_date: String,
    pub billed_amount: f64,
}

impl RevenueEntry {
    pub fn match_key(&self) -> String {
        composite_key(&self.name, &self.treatment_date)
    }
}

/// Fallback identity when a row has no usable identifier: `name_date`.
pub fn composite_key(name: &str, treatment_date: &str) -> String {
    format!("{name}_{treatment_date}")
}

// ---------------------------------------------------------------------------
// Causes
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Cause {
    /// A: paid before the target month, refunded during it.
    PriorMonthRefund,
    /// B: treated before the target month, paid during it.
    PriorMonthPayment,
    /// C: treated and billed during the target month, no payment recorded.
    UnsettledBilling,
}

impl Cause {
    pub const ALL: [Cause; 3] = [
        Cause::PriorMonthRefund,
        Cause::PriorMonthPayment,
        Cause::UnsettledBilling,
    ];

    pub fn tag(&self) -> &'static str {
        match self {
            Self::PriorMonthRefund => "A",
            Self::PriorMonthPayment => "B",
            Self::UnsettledBilling => "C",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Self::PriorMonthRefund => "prior-month treatment refunded this month",
            Self::PriorMonthPayment => "prior-month treatment paid this month",
            Self::UnsettledBilling => "this-month treatment unsettled (prepaid or outstanding)",
        }
    }
}

impl fmt::Display for Cause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PriorMonthRefund => write!(f, "prior_month_refund"),
            Self::PriorMonthPayment => write!(f, "prior_month_payment"),
            Self::UnsettledBilling => write!(f, "unsettled_billing"),
        }
    }
}

/// Entries attributed to one cause, in source order, with their signed
/// contribution to the settled-minus-billed difference.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CauseBucket<T> {
    pub cause: Cause,
    pub entries: Vec<T>,
    pub total: f64,
}

impl<T> CauseBucket<T> {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Annotation for unsettled-billing rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PrepayNote {
    PrepayUsed,
    Outstanding,
}

impl fmt::Display for PrepayNote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PrepayUsed => write!(f, "prepay used"),
            Self::Outstanding => write!(f, "outstanding"),
        }
    }
}

// ---------------------------------------------------------------------------
// Report
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthCount {
    pub month: String,
    pub rows: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReconciliationReport {
    pub target_month: String,
    pub month_counts: Vec<MonthCount>,
    pub classification: Classification,
    pub collection_rows: usize,
    pub revenue_rows: usize,
    pub total_settled: f64,
    pub total_billed: f64,
    pub total_difference: f64,
    pub prior_month_refunds: CauseBucket<CollectionEntry>,
    pub prior_month_payments: CauseBucket<CollectionEntry>,
    pub unsettled_billing: CauseBucket<RevenueEntry>,
    pub prepay_by_name: BTreeMap<String, f64>,
    pub residual: f64,
}

impl ReconciliationReport {
    /// Sum of the three signed bucket totals.
    pub fn explained(&self) -> f64 {
        self.prior_month_refunds.total
            + self.prior_month_payments.total
            + self.unsettled_billing.total
    }

    pub fn is_explained(&self, tolerance: f64) -> bool {
        self.residual.abs() <= tolerance
    }

    pub fn has_causes(&self) -> bool {
        !(self.prior_month_refunds.is_empty()
            && self.prior_month_payments.is_empty()
            && self.unsettled_billing.is_empty())
    }

    pub fn cause_total(&self, cause: Cause) -> f64 {
        match cause {
            Cause::PriorMonthRefund => self.prior_month_refunds.total,
            Cause::PriorMonthPayment => self.prior_month_payments.total,
            Cause::UnsettledBilling => self.unsettled_billing.total,
        }
    }

    pub fn cause_count(&self, cause: Cause) -> usize {
        match cause {
            Cause::PriorMonthRefund => self.prior_month_refunds.len(),
            Cause::PriorMonthPayment => self.prior_month_payments.len(),
            Cause::UnsettledBilling => self.unsettled_billing.len(),
        }
    }

    pub fn prepay_note(&self, name: &str) -> PrepayNote {
        match self.prepay_by_name.get(name) {
            Some(total) if *total > 0.0 => PrepayNote::PrepayUsed,
            _ => PrepayNote::Outstanding,
        }
    }
}
