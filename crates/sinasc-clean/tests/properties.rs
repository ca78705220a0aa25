use std::collections::BTreeMap;

use polars::prelude::{Column, DataFrame, NamedFrom};
use proptest::prelude::*;
use sinasc_clean::{ErrorPolicy, filter_by_zscore, filter_rows};
use sinasc_common::ScalarValue;

fn frame(a: &[Option<i64>], b: &[Option<i64>]) -> DataFrame {
    DataFrame::new(vec![
        Column::new("A".into(), a.to_vec()),
        Column::new("B".into(), b.to_vec()),
    ])
    .unwrap()
}

fn allowed(values: &[i64]) -> Vec<ScalarValue> {
    values.iter().map(|v| ScalarValue::Int(*v)).collect()
}

proptest! {
    #[test]
    fn filter_rows_is_idempotent(
        rows in prop::collection::vec(
            (prop::option::of(0i64..6), prop::option::of(0i64..6)),
            0..40,
        ),
        allowed_a in prop::collection::vec(0i64..6, 0..4),
        allowed_b in prop::collection::vec(0i64..6, 0..4),
    ) {
        let (a, b): (Vec<_>, Vec<_>) = rows.into_iter().unzip();
        let df = frame(&a, &b);
        let restrictions = BTreeMap::from([
            ("A".to_string(), allowed(&allowed_a)),
            ("B".to_string(), allowed(&allowed_b)),
        ]);

        let once = filter_rows(&df, &restrictions, ErrorPolicy::Strict).unwrap();
        let twice = filter_rows(&once, &restrictions, ErrorPolicy::Strict).unwrap();
        prop_assert!(once.equals_missing(&twice));
    }

    #[test]
    fn restriction_order_does_not_matter(
        rows in prop::collection::vec((0i64..6, 0i64..6), 0..40),
        allowed_a in prop::collection::vec(0i64..6, 0..4),
        allowed_b in prop::collection::vec(0i64..6, 0..4),
    ) {
        let (a, b): (Vec<_>, Vec<_>) =
            rows.into_iter().map(|(a, b)| (Some(a), Some(b))).unzip();
        let df = frame(&a, &b);
        let only_a = BTreeMap::from([("A".to_string(), allowed(&allowed_a))]);
        let only_b = BTreeMap::from([("B".to_string(), allowed(&allowed_b))]);
        let both = BTreeMap::from([
            ("A".to_string(), allowed(&allowed_a)),
            ("B".to_string(), allowed(&allowed_b)),
        ]);

        let a_then_b = filter_rows(
            &filter_rows(&df, &only_a, ErrorPolicy::Strict).unwrap(),
            &only_b,
            ErrorPolicy::Strict,
        )
        .unwrap();
        let b_then_a = filter_rows(
            &filter_rows(&df, &only_b, ErrorPolicy::Strict).unwrap(),
            &only_a,
            ErrorPolicy::Strict,
        )
        .unwrap();
        let combined = filter_rows(&df, &both, ErrorPolicy::Strict).unwrap();
        prop_assert!(a_then_b.equals(&b_then_a));
        prop_assert!(a_then_b.equals(&combined));
    }

    #[test]
    fn huge_limit_keeps_every_row(
        rows in prop::collection::vec(
            (prop::option::of(-1000.0f64..1000.0), prop::option::of(-50i64..50)),
            0..60,
        ),
    ) {
        let (x, y): (Vec<_>, Vec<_>) = rows.into_iter().unzip();
        let df = DataFrame::new(vec![
            Column::new("X".into(), x),
            Column::new("Y".into(), y),
        ])
        .unwrap();
        let columns = vec!["X".to_string(), "Y".to_string()];

        let filtered = filter_by_zscore(&df, &columns, 1e6, ErrorPolicy::Strict).unwrap();
        prop_assert!(filtered.equals_missing(&df));
    }
}
