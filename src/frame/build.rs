//! Post-stratification frame construction.
//!
//! The frame has one row per surviving (constituency x age band x education x
//! sex) cell, with the cell's population `count` and `perc`, the cell's share
//! of its constituency's voting-age population in percentage points.

use std::collections::HashMap;

use anyhow::{Context, Result, anyhow, bail, ensure};
use polars::{df, frame::DataFrame, prelude::DataType};

use crate::types::{AgeBand, ConstCode, Education, Sex};

/// What the builder kept and dropped, for the caller's diagnostics.
/// `vanished` lists constituencies present in the raw census that lost every
/// row to filtering; downstream prediction tolerates the gap, so this is a
/// warning, not an error.
#[derive(Debug, Clone, Default)]
pub struct FrameReport {
    pub input_rows: usize,
    pub kept_rows: usize,
    pub dropped_under_16: usize,
    pub kept_constituencies: usize,
    pub vanished: Vec<ConstCode>,
}

/// Build the post-stratification frame from raw census rows.
///
/// Expects columns: `const_code`, `const_name`, `age_band`, `education_code`,
/// `sex`, `count`. Rows in the under-16 band are dropped; education codes are
/// recoded to the five named levels plus `other`; `perc` is the row's count as
/// a percentage of its constituency total.
pub fn build_frame(census: &DataFrame) -> Result<(DataFrame, FrameReport)> {
    let codes = census.column("const_code")?.str()?.clone();
    let names = census.column("const_name")?.str()?.clone();
    let bands = census.column("age_band")?.str()?.clone();
    let edu_codes = census.column("education_code")?.cast(&DataType::Int64)?;
    let edu_codes = edu_codes.i64()?;
    let sexes = census.column("sex")?.str()?.clone();
    let counts = census.column("count")?.cast(&DataType::Float64)?;
    let counts = counts.f64()?;

    let mut report = FrameReport { input_rows: census.height(), ..Default::default() };

    let mut out_code = Vec::new();
    let mut out_name = Vec::new();
    let mut out_age = Vec::new();
    let mut out_edu = Vec::new();
    let mut out_female = Vec::new();
    let mut out_count = Vec::new();

    // Constituency totals over kept rows only; raw codes tracked separately
    // so vanished constituencies can be reported.
    let mut totals: HashMap<ConstCode, f64> = HashMap::new();
    let mut raw_codes: Vec<ConstCode> = Vec::new();

    for i in 0..census.height() {
        let code = codes.get(i).ok_or_else(|| anyhow!("[frame::build] missing const_code at row {i}"))?;
        let code = ConstCode::new(code);
        if !raw_codes.contains(&code) {
            raw_codes.push(code.clone());
        }

        let band = bands.get(i).ok_or_else(|| anyhow!("[frame::build] missing age_band at row {i}"))?;
        let band = AgeBand::from_label(band)
            .ok_or_else(|| anyhow!("[frame::build] unknown age_band {band:?} at row {i}"))?;
        if !band.voting_age() {
            report.dropped_under_16 += 1;
            continue;
        }

        let sex = sexes.get(i).ok_or_else(|| anyhow!("[frame::build] missing sex at row {i}"))?;
        let Some(sex) = Sex::from_label(sex) else {
            bail!("[frame::build] unknown sex label {sex:?} at row {i}");
        };

        let education = Education::from_census_code(
            edu_codes.get(i).ok_or_else(|| anyhow!("[frame::build] missing education_code at row {i}"))?,
        );
        let count = counts.get(i).ok_or_else(|| anyhow!("[frame::build] missing count at row {i}"))?;
        ensure!(count >= 0.0, "[frame::build] negative count at row {i}");

        *totals.entry(code.clone()).or_default() += count;

        out_name.push(names.get(i).unwrap_or("").to_string());
        out_age.push(band.to_str());
        out_edu.push(education.to_str());
        out_female.push(sex.female_flag());
        out_count.push(count);
        out_code.push(code);
    }

    ensure!(!out_code.is_empty(), "[frame::build] no census rows survived filtering");

    let perc = out_code.iter().zip(&out_count)
        .map(|(code, count)| {
            let total = totals[code];
            if total > 0.0 { count / total * 100.0 } else { 0.0 }
        })
        .collect::<Vec<f64>>();

    report.kept_rows = out_code.len();
    report.kept_constituencies = totals.len();
    report.vanished = raw_codes.into_iter().filter(|c| !totals.contains_key(c)).collect();

    let frame = df![
        "const_code" => out_code.iter().map(|c| c.as_str().to_string()).collect::<Vec<_>>(),
        "const_name" => out_name,
        "age" => out_age,
        "education" => out_edu,
        "female" => out_female,
        "count" => out_count,
        "perc" => perc,
    ].context("[frame::build] failed to assemble frame")?;

    Ok((frame, report))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn census() -> DataFrame {
        df![
            "const_code" => ["E1", "E1", "E1", "E2", "E2", "E3"],
            "const_name" => ["Ashford", "Ashford", "Ashford", "Bath", "Bath", "Corby"],
            "age_band" => ["16-24", "65+", "0-15", "16-24", "25-34", "0-15"],
            "education_code" => [0i64, 4, 2, 9, 1, 3],
            "sex" => ["Female", "Male", "Female", "Male", "Female", "Male"],
            "count" => [300i64, 100, 50, 120, 80, 40],
        ].unwrap()
    }

    #[test]
    fn drops_under_16_and_reports() {
        let (frame, report) = build_frame(&census()).unwrap();
        assert_eq!(frame.height(), 4);
        assert_eq!(report.input_rows, 6);
        assert_eq!(report.kept_rows, 4);
        assert_eq!(report.dropped_under_16, 2);
        assert_eq!(report.kept_constituencies, 2);
    }

    #[test]
    fn constituency_with_only_under_16_rows_vanishes() {
        let (_, report) = build_frame(&census()).unwrap();
        assert_eq!(report.vanished, vec![ConstCode::new("E3")]);
    }

    #[test]
    fn perc_sums_to_100_per_constituency() {
        let (frame, _) = build_frame(&census()).unwrap();
        let codes = frame.column("const_code").unwrap().str().unwrap().clone();
        let perc = frame.column("perc").unwrap().f64().unwrap().clone();

        let mut sums: HashMap<String, f64> = HashMap::new();
        for i in 0..frame.height() {
            *sums.entry(codes.get(i).unwrap().to_string()).or_default() += perc.get(i).unwrap();
        }
        assert_eq!(sums.len(), 2);
        for (code, sum) in sums {
            assert!((sum - 100.0).abs() < 1e-9, "{code} perc sums to {sum}");
        }
    }

    #[test]
    fn recodes_unknown_education_to_other() {
        let (frame, _) = build_frame(&census()).unwrap();
        let edu = frame.column("education").unwrap().str().unwrap().clone();
        // Row with education_code 9 (E2 / 16-24).
        assert_eq!(edu.get(2), Some("other"));
    }

    #[test]
    fn unknown_age_band_is_fatal() {
        let bad = df![
            "const_code" => ["E1"],
            "const_name" => ["Ashford"],
            "age_band" => ["18-30"],
            "education_code" => [0i64],
            "sex" => ["Female"],
            "count" => [10i64],
        ].unwrap();
        assert!(build_frame(&bad).is_err());
    }
}
