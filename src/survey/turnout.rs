use anyhow::Result;
use polars::{frame::DataFrame, prelude::DataType};

use crate::survey::{RecodeReport, TurnoutObs};
use crate::types::{AgeBand, ConstCode, ConstituencyIndex, Education, Sex};

/// Recode the post-election turnout survey.
///
/// Expects columns: `const_code`, `voted`, `education_code`, `age`,
/// `sex_code`. The `voted` field uses negative codes for missing and 1 for
/// "voted"; other non-negative codes mean "did not vote". Negative education
/// codes are missing. Only sex codes 1 (male) and 2 (female) are kept.
pub fn recode_turnout_survey(
    survey: &DataFrame,
    known: &ConstituencyIndex,
) -> Result<(Vec<TurnoutObs>, RecodeReport)> {
    let codes = survey.column("const_code")?.str()?.clone();
    let voted = survey.column("voted")?.cast(&DataType::Int64)?;
    let voted = voted.i64()?;
    let educations = survey.column("education_code")?.cast(&DataType::Int64)?;
    let educations = educations.i64()?;
    let ages = survey.column("age")?.cast(&DataType::Int64)?;
    let ages = ages.i64()?;
    let sexes = survey.column("sex_code")?.cast(&DataType::Int64)?;
    let sexes = sexes.i64()?;

    let mut observations = Vec::with_capacity(survey.height());
    let mut report = RecodeReport::default();

    for i in 0..survey.height() {
        let code = match codes.get(i).map(ConstCode::new) {
            Some(code) if known.contains(&code) => code,
            _ => { report.dropped_constituency += 1; continue }
        };
        let voted = match voted.get(i) {
            Some(code) if code >= 0 => code == 1,
            _ => { report.dropped_outcome += 1; continue }
        };
        let Some(education) = educations.get(i).and_then(Education::from_turnout_survey_code) else {
            report.dropped_education += 1;
            continue;
        };
        let Some(sex) = sexes.get(i).and_then(Sex::from_survey_code) else {
            report.dropped_sex += 1;
            continue;
        };
        let age = match ages.get(i).map(AgeBand::from_years) {
            Some(band) if band.voting_age() => band,
            _ => { report.dropped_age += 1; continue }
        };

        report.kept += 1;
        observations.push(TurnoutObs {
            code,
            age,
            education,
            female: sex == Sex::Female,
            voted,
        });
    }

    Ok((observations, report))
}
