use anyhow::Result;
use polars::{frame::DataFrame, prelude::DataType};

use crate::survey::{RecodeReport, VoteObs};
use crate::types::{AgeBand, ConstCode, ConstituencyIndex, Education, Party, Sex};

/// Recode the pre-election vote-intention panel.
///
/// Expects columns: `const_code`, `intention`, `education_code`, `age`,
/// `sex_code`. Respondents are dropped (never imputed) when the constituency
/// is not in the frame, the intention code is unmappable, the education code
/// is unmappable, the sex code is not 1/2, or the age is missing or under 16.
pub fn recode_vote_survey(
    survey: &DataFrame,
    known: &ConstituencyIndex,
) -> Result<(Vec<VoteObs>, RecodeReport)> {
    let codes = survey.column("const_code")?.str()?.clone();
    let intentions = survey.column("intention")?.cast(&DataType::Int64)?;
    let intentions = intentions.i64()?;
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
        let Some(party) = intentions.get(i).and_then(Party::from_intention_code) else {
            report.dropped_outcome += 1;
            continue;
        };
        let Some(education) = educations.get(i).and_then(Education::from_vote_survey_code) else {
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
        observations.push(VoteObs {
            code,
            age,
            education,
            female: sex == Sex::Female,
            party,
        });
    }

    Ok((observations, report))
}
