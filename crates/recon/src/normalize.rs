use crate::config::FieldKeywords;
use crate::model::{CollectionEntry, PaymentMethods, RawRecord, RevenueEntry};
use crate::resolve::{cell_text, clean_identifier, to_number, FieldLookup};

/// Map collections rows to canonical entries, one per row.
pub fn normalize_collections<L: FieldLookup + ?Sized>(
    rows: &[RawRecord],
    keywords: &FieldKeywords,
    lookup: &L,
) -> Vec<CollectionEntry> {
    rows.iter()
        .map(|row| collection_entry(row, keywords, lookup))
        .collect()
}

/// Map revenue rows to canonical entries, one per row.
pub fn normalize_revenue<L: FieldLookup + ?Sized>(
    rows: &[RawRecord],
    keywords: &FieldKeywords,
    lookup: &L,
) -> Vec<RevenueEntry> {
    rows.iter()
        .map(|row| revenue_entry(row, keywords, lookup))
        .collect()
}

fn collection_entry<L: FieldLookup + ?Sized>(
    row: &RawRecord,
    kw: &FieldKeywords,
    lookup: &L,
) -> CollectionEntry {
    let amount = |keywords: &[String]| to_number(lookup.lookup(row, keywords));

    let methods = PaymentMethods {
        card: amount(&kw.card),
        cash_counter: amount(&kw.cash_counter),
        cash_transfer: amount(&kw.cash_transfer),
        app_pay: amount(&kw.app_pay),
        platform: amount(&kw.platform),
        other: amount(&kw.other),
        prepay: amount(&kw.prepay),
    };

    CollectionEntry::new(
        cell_text(lookup.lookup(row, &kw.patient_name)),
        clean_identifier(lookup.lookup(row, &kw.identifier)),
        cell_text(lookup.lookup(row, &kw.payment_date)),
        cell_text(lookup.lookup(row, &kw.treatment_date)),
        cell_text(lookup.lookup(row, &kw.refund_date)),
        methods,
    )
}

fn revenue_entry<L: FieldLookup + ?Sized>(
    row: &RawRecord,
    kw: &FieldKeywords,
    lookup: &L,
) -> RevenueEntry {
    RevenueEntry {
        name: cell_text(lookup.lookup(row, &kw.patient_name)),
        id: clean_identifier(lookup.lookup(row, &kw.identifier)),
        treatment_date: cell_text(lookup.lookup(row, &kw.treatment_date)),
        billed_amount: to_number(lookup.lookup(row, &kw.billed_amount)),
    }
}
