use std::collections::BTreeMap;

use crate::{data::Value, reconstruct::SaleEvent};

/// One aggregate group: the populated subset of {date, type} plus sums.
/// Null keys form their own group rather than being dropped.
#[derive(Debug, Clone, PartialEq)]
pub struct SaleBucket {
    pub date: Option<String>,
    pub kind: Option<String>,
    pub amount: f64,
    pub count: u64,
}

/// Groups events by (date, type) and reduces to summed amount and count.
/// Output order is deterministic: null keys first, then lexicographic.
pub fn aggregate(events: &[SaleEvent]) -> Vec<SaleBucket> {
    let mut groups: BTreeMap<(Option<String>, Option<String>), (f64, u64)> = BTreeMap::new();
    for event in events {
        let key = (event.date.as_ref().map(Value::as_display), event.kind.clone());
        let entry = groups.entry(key).or_insert((0.0, 0));
        entry.0 += event.amount;
        entry.1 += event.count;
    }
    groups
        .into_iter()
        .map(|((date, kind), (amount, count))| SaleBucket {
            date,
            kind,
            amount,
            count,
        })
        .collect()
}
