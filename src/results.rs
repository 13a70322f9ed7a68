//! Ground-truth election results.
//!
//! Results come in with one share column per main party plus several
//! minor-party columns; the minor shares are summed into the `Other` share so
//! truth lines up with the four modeled outcomes.

use anyhow::{Context, Result, ensure};
use polars::prelude::*;

use crate::types::Party;

/// Minor-party share columns folded into `oth_true` when present.
const MINOR_SHARE_COLS: [&str; 5] = [
    "ukip_share",
    "green_share",
    "snp_share",
    "pc_share",
    "other_share",
];

/// Normalize a raw results table to `const_code` plus one truth column per
/// party, in percentage points.
pub fn load_results(raw: &DataFrame) -> Result<DataFrame> {
    for required in ["const_code", "con_share", "lab_share", "ld_share"] {
        ensure!(
            raw.get_column_names().iter().any(|name| name.as_str() == required),
            "[results] results table is missing column {required:?}"
        );
    }

    let minors = MINOR_SHARE_COLS.iter()
        .filter(|name| raw.get_column_names().iter().any(|n| n.as_str() == **name))
        .map(|name| col(*name).fill_null(lit(0.0)))
        .reduce(|a, b| a + b);
    ensure!(minors.is_some(), "[results] results table has no minor-party share columns");

    raw.clone().lazy()
        .select([
            col("const_code"),
            col("con_share").alias(Party::Conservative.true_col()),
            col("lab_share").alias(Party::Labour.true_col()),
            col("ld_share").alias(Party::LiberalDemocrat.true_col()),
            minors.unwrap().alias(Party::Other.true_col()),
        ])
        .collect()
        .context("[results] failed to normalize results table")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sums_minor_parties_into_other() {
        let raw = df![
            "const_code" => ["E1", "E2"],
            "const_name" => ["Ashford", "Bath"],
            "con_share" => [44.0f64, 20.0],
            "lab_share" => [27.0f64, 54.0],
            "ld_share" => [22.0f64, 12.0],
            "ukip_share" => [4.0f64, 8.0],
            "green_share" => [2.0f64, 4.0],
            "other_share" => [1.0f64, 2.0],
        ].unwrap();

        let truth = load_results(&raw).unwrap();
        assert_eq!(truth.width(), 5);
        let other = truth.column("oth_true").unwrap().f64().unwrap().clone();
        assert!((other.get(0).unwrap() - 7.0).abs() < 1e-12);
        assert!((other.get(1).unwrap() - 14.0).abs() < 1e-12);
    }

    #[test]
    fn null_minor_share_counts_as_zero() {
        let raw = df![
            "const_code" => ["E1"],
            "con_share" => [44.0f64],
            "lab_share" => [27.0f64],
            "ld_share" => [22.0f64],
            "ukip_share" => [Some(4.0f64)],
            "green_share" => [None::<f64>],
        ].unwrap();

        let truth = load_results(&raw).unwrap();
        let other = truth.column("oth_true").unwrap().f64().unwrap().clone();
        assert!((other.get(0).unwrap() - 4.0).abs() < 1e-12);
    }

    #[test]
    fn missing_major_column_is_an_error() {
        let raw = df![
            "const_code" => ["E1"],
            "con_share" => [44.0f64],
            "ld_share" => [22.0f64],
            "ukip_share" => [4.0f64],
        ].unwrap();
        assert!(load_results(&raw).is_err());
    }
}
