use crate::config::ClassifyConfig;
use crate::model::{Classification, ClassifyRule, InputSide, RawRecord};
use crate::resolve::has_column;

/// The two inputs, assigned to their ledger roles.
#[derive(Debug, Clone, Copy)]
pub struct ClassifiedInputs<'a> {
    pub revenue: &'a [RawRecord],
    pub collections: &'a [RawRecord],
    pub classification: Classification,
}

/// A dataset looks like revenue when its first row has a revenue-total column.
/// Empty datasets never do.
pub fn is_revenue_like(dataset: &[RawRecord], config: &ClassifyConfig) -> bool {
    dataset.first().is_some_and(|row| {
        config
            .revenue_markers
            .iter()
            .any(|marker| has_column(row, marker))
    })
}

/// Decide which input is the revenue ledger.
///
/// - Exactly one input has a revenue marker → that one is revenue.
/// - Otherwise, if `first` has the collections marker → `first` is collections.
/// - Otherwise argument order: `first` is revenue.
///
/// Only first rows are inspected. The ambiguous branch only ever looks at
/// `first`, so it is not symmetric under swapping the arguments.
pub fn classify<'a>(
    first: &'a [RawRecord],
    second: &'a [RawRecord],
    config: &ClassifyConfig,
) -> ClassifiedInputs<'a> {
    let first_is_revenue = is_revenue_like(first, config);
    let second_is_revenue = is_revenue_like(second, config);

    let classification = match (first_is_revenue, second_is_revenue) {
        (true, false) => Classification {
            revenue: InputSide::First,
            rule: ClassifyRule::RevenueMarker,
        },
        (false, true) => Classification {
            revenue: InputSide::Second,
            rule: ClassifyRule::RevenueMarker,
        },
        _ => {
            let first_is_collections = first
                .first()
                .is_some_and(|row| has_column(row, &config.collections_marker));
            if first_is_collections {
                Classification {
                    revenue: InputSide::Second,
                    rule: ClassifyRule::CollectionsMarker,
                }
            } else {
                Classification {
                    revenue: InputSide::First,
                    rule: ClassifyRule::InputOrder,
                }
            }
        }
    };

    let (revenue, collections) = match classification.revenue {
        InputSide::First => (first, second),
        InputSide::Second => (second, first),
    };

    log::info!(
        "classified {} input as revenue ({} rows), {} as collections ({} rows) by {}",
        side_name(classification.revenue),
        revenue.len(),
        side_name(classification.collections()),
        collections.len(),
        classification.rule,
    );

    ClassifiedInputs {
        revenue,
        collections,
        classification,
    }
}

fn side_name(side: InputSide) -> &'static str {
    match side {
        InputSide::First => "first",
        InputSide::Second => "second",
    }
}
