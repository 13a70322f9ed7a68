//! Cell weighting and constituency aggregation.
//!
//! A cell's weighted contribution to its constituency's vote share is
//! `pred x perc x turnout`: `perc` is in percentage points (0-100), the two
//! probabilities are fractions, so constituency sums land on the same scale
//! as published vote shares.

use anyhow::{Context, Result};
use polars::prelude::*;

use crate::model::TURNOUT_PROB;
use crate::types::Party;

/// Append one weighted-contribution column per party.
pub fn with_cell_weights(frame: DataFrame) -> Result<DataFrame> {
    let weights = Party::ALL.iter()
        .map(|party| {
            (col(party.pred_col()) * col("perc") * col(TURNOUT_PROB)).alias(party.weighted_col())
        })
        .collect::<Vec<_>>();

    frame.lazy()
        .with_columns(weights)
        .collect()
        .context("[estimate::aggregate] failed to compute cell weights")
}

/// Sum weighted cells within each constituency, one estimate column per
/// party, sorted by constituency code.
///
/// Every cell is treated as present; a null prediction (none are produced
/// upstream) would be skipped by the sum, contributing zero rather than
/// poisoning the constituency total.
pub fn constituency_estimates(frame: &DataFrame) -> Result<DataFrame> {
    let sums = Party::ALL.iter()
        .map(|party| col(party.weighted_col()).sum().alias(party.est_col()))
        .collect::<Vec<_>>();

    frame.clone().lazy()
        .group_by([col("const_code")])
        .agg(sums)
        .sort(["const_code"], Default::default())
        .collect()
        .context("[estimate::aggregate] failed to aggregate constituencies")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn weighted_frame() -> DataFrame {
        df![
            "const_code" => ["E1", "E1", "E2", "E2"],
            "perc" => [60.0f64, 40.0, 25.0, 75.0],
            TURNOUT_PROB => [0.5f64, 0.8, 0.6, 0.7],
            "con_pred" => [0.4f64, 0.5, 0.3, 0.2],
            "lab_pred" => [0.3f64, 0.2, 0.4, 0.5],
            "ld_pred" => [0.2f64, 0.2, 0.2, 0.2],
            "oth_pred" => [0.1f64, 0.1, 0.1, 0.1],
        ].unwrap()
    }

    #[test]
    fn weight_is_pred_times_perc_times_turnout() {
        let out = with_cell_weights(weighted_frame()).unwrap();
        let con = out.column("con_wt").unwrap().f64().unwrap().clone();
        assert!((con.get(0).unwrap() - 0.4 * 60.0 * 0.5).abs() < 1e-12);
        assert!((con.get(1).unwrap() - 0.5 * 40.0 * 0.8).abs() < 1e-12);
    }

    #[test]
    fn estimates_sum_cells_within_constituency() {
        let out = with_cell_weights(weighted_frame()).unwrap();
        let estimates = constituency_estimates(&out).unwrap();
        assert_eq!(estimates.height(), 2);

        let codes = estimates.column("const_code").unwrap().str().unwrap().clone();
        assert_eq!(codes.get(0), Some("E1"));
        let con = estimates.column("con_est").unwrap().f64().unwrap().clone();
        let expected = 0.4 * 60.0 * 0.5 + 0.5 * 40.0 * 0.8;
        assert!((con.get(0).unwrap() - expected).abs() < 1e-12);
    }

    #[test]
    fn aggregation_is_order_independent() {
        let frame = with_cell_weights(weighted_frame()).unwrap();
        let reversed = frame.reverse();

        let a = constituency_estimates(&frame).unwrap();
        let b = constituency_estimates(&reversed).unwrap();

        for party in Party::ALL {
            let ca = a.column(party.est_col()).unwrap().f64().unwrap().clone();
            let cb = b.column(party.est_col()).unwrap().f64().unwrap().clone();
            for i in 0..a.height() {
                assert!((ca.get(i).unwrap() - cb.get(i).unwrap()).abs() < 1e-9);
            }
        }
    }
}
