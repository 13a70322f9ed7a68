//! Ground-truth scaling.
//!
//! Estimated constituency shares are compared with true results; the ratio
//! becomes a per-(constituency, party) scale factor applied back to every
//! cell. A missing factor (zero or missing operand) stays missing all the way
//! into the output: missingness marks the unscaled constituencies.

use anyhow::{Context, Result};
use polars::prelude::*;

use crate::types::Party;

/// Join estimates with true results and compute scale factors.
///
/// Left join on `const_code`: constituencies missing from the results keep
/// null truth, and their factors are null. A zero estimated share also yields
/// a null factor (never an infinity). Output: one row per constituency with
/// estimate, truth and factor columns per party.
pub fn scale_table(estimates: &DataFrame, truth: &DataFrame) -> Result<DataFrame> {
    let factors = Party::ALL.iter()
        .map(|party| {
            when(col(party.est_col()).gt(lit(0.0)))
                .then(col(party.true_col()) / col(party.est_col()))
                .otherwise(lit(NULL))
                .alias(party.scale_col())
        })
        .collect::<Vec<_>>();

    estimates.clone().lazy()
        .join(
            truth.clone().lazy(),
            [col("const_code")],
            [col("const_code")],
            JoinArgs::new(JoinType::Left),
        )
        .with_columns(factors)
        .sort(["const_code"], Default::default())
        .collect()
        .context("[estimate::scale] failed to compute scale factors")
}

/// Apply each constituency's factors to its cells' weighted predictions.
///
/// Every cell in a constituency shares that constituency's single factor per
/// party; null factors propagate into null scaled values.
pub fn with_scaled(cells: DataFrame, scales: &DataFrame) -> Result<DataFrame> {
    let mut keep = vec![col("const_code")];
    keep.extend(Party::ALL.iter().map(|party| col(party.scale_col())));

    let scaled = Party::ALL.iter()
        .map(|party| {
            (col(party.weighted_col()) * col(party.scale_col())).alias(party.scaled_col())
        })
        .collect::<Vec<_>>();

    let mut out = cells.lazy()
        .join(
            scales.clone().lazy().select(keep),
            [col("const_code")],
            [col("const_code")],
            JoinArgs::new(JoinType::Left),
        )
        .with_columns(scaled)
        .collect()
        .context("[estimate::scale] failed to apply scale factors")?;

    // The factor columns belong to the constituency table, not the cell table.
    for party in Party::ALL {
        out = out.drop(party.scale_col())?;
    }
    Ok(out)
}
