use proptest::prelude::*;

use tillroll::data::Value;
use tillroll::normalize::{self, FieldKind, FieldSpec};
use tillroll::table::Table;

const FIELDS: &[FieldSpec] = &[
    FieldSpec::new("Line", FieldKind::Text),
    FieldSpec::new("Price", FieldKind::Number),
    FieldSpec::new("Descript", FieldKind::Text),
    FieldSpec::new("Date", FieldKind::Date),
];

// Digit-heavy text exercises every coercion path: numbers, several date
// shapes, and strings that parse as neither.
fn cell() -> impl Strategy<Value = Option<Value>> {
    prop_oneof![
        2 => Just(None),
        4 => "[0-9 ./-]{0,10}".prop_map(|s| Some(Value::Text(s))),
        1 => Just(Some(Value::Text("2024-01-05".to_string()))),
        1 => Just(Some(Value::Text("950".to_string()))),
    ]
}

proptest! {
    #[test]
    fn normalization_is_idempotent(
        rows in prop::collection::vec(prop::collection::vec(cell(), 4), 0..16)
    ) {
        let table = Table {
            columns: vec!["LINE".into(), "price".into(), "DESCRIPT".into(), "Date".into()],
            rows,
        };
        let (once, _) = normalize::normalize(&table, FIELDS);
        let (twice, fallbacks) = normalize::normalize(&once, FIELDS);
        prop_assert_eq!(&once, &twice);
        prop_assert!(fallbacks.is_empty());
    }

    #[test]
    fn normalized_tables_always_expose_canonical_columns(
        rows in prop::collection::vec(prop::collection::vec(cell(), 2), 0..8)
    ) {
        let table = Table {
            columns: vec!["noise".into(), "LINE".into()],
            rows,
        };
        let (normalized, fallbacks) = normalize::normalize(&table, FIELDS);
        for spec in FIELDS {
            prop_assert!(normalized.column_index(spec.name).is_some());
        }
        prop_assert!(fallbacks.contains("Price"));
        prop_assert!(!fallbacks.contains("Line"));
    }
}
