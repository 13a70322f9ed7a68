use anyhow::{Context, Result, anyhow};
use polars::{frame::DataFrame, prelude::{DataType, NamedFrom, Series}};

use crate::model::ModelSet;
use crate::types::{AgeBand, ConstCode, Education, Party};

/// Column holding the per-cell turnout probability.
pub const TURNOUT_PROB: &str = "turnout_prob";

/// Apply all five models to every frame cell, appending one probability
/// column per model.
///
/// Cells in constituencies absent from a model's training data get the
/// fixed-effects-only prediction (zero random effect), so every cell always
/// receives a probability.
pub fn with_predictions(frame: DataFrame, models: &ModelSet) -> Result<DataFrame> {
    let codes = frame.column("const_code")?.str()?.clone();
    let ages = frame.column("age")?.str()?.clone();
    let educations = frame.column("education")?.str()?.clone();
    let females = frame.column("female")?.cast(&DataType::Float64)?;
    let females = females.f64()?;

    let height = frame.height();
    let mut turnout = Vec::with_capacity(height);
    let mut votes: [Vec<f64>; 4] = std::array::from_fn(|_| Vec::with_capacity(height));

    for i in 0..height {
        let code = codes.get(i).ok_or_else(|| anyhow!("[model::predict] missing const_code at row {i}"))?;
        let code = ConstCode::new(code);

        let age = ages.get(i)
            .and_then(AgeBand::from_label)
            .ok_or_else(|| anyhow!("[model::predict] bad age label at row {i}"))?;
        let education = educations.get(i)
            .and_then(Education::from_label)
            .ok_or_else(|| anyhow!("[model::predict] bad education label at row {i}"))?;
        let female = females.get(i)
            .ok_or_else(|| anyhow!("[model::predict] missing female flag at row {i}"))?
            > 0.5;

        turnout.push(models.turnout.predict(female, age, education, &code));
        for (k, party) in Party::ALL.iter().enumerate() {
            votes[k].push(models.vote(*party).predict(female, age, education, &code));
        }
    }

    let mut frame = frame;
    frame.replace_or_add(TURNOUT_PROB.into(), Series::new(TURNOUT_PROB.into(), turnout))
        .context("[model::predict] failed to append turnout column")?;
    for (k, party) in Party::ALL.iter().enumerate() {
        let name = party.pred_col();
        frame.replace_or_add(name.into(), Series::new(name.into(), std::mem::take(&mut votes[k])))
            .with_context(|| format!("[model::predict] failed to append {name}"))?;
    }
    Ok(frame)
}

#[cfg(test)]
mod tests {
    use polars::df;

    use crate::model::{FitConfig, ModelSet};
    use crate::survey::{TurnoutObs, VoteObs};

    use super::*;

    fn observations() -> (Vec<VoteObs>, Vec<TurnoutObs>) {
        let mut vote = Vec::new();
        let mut turnout = Vec::new();
        for i in 0..40 {
            let code = ConstCode::new(if i % 2 == 0 { "E1" } else { "E2" });
            vote.push(VoteObs {
                code: code.clone(),
                age: if i % 4 < 2 { AgeBand::A25To34 } else { AgeBand::A65Plus },
                education: Education::Level2,
                female: i % 2 == 0,
                party: Party::ALL[i % 4],
            });
            // Turnout survey deliberately covers only E1.
            turnout.push(TurnoutObs {
                code: ConstCode::new("E1"),
                age: if i % 4 < 2 { AgeBand::A25To34 } else { AgeBand::A65Plus },
                education: Education::Level2,
                female: i % 2 == 0,
                voted: i % 3 != 0,
            });
        }
        (vote, turnout)
    }

    fn frame() -> DataFrame {
        df![
            "const_code" => ["E1", "E1", "E2", "E2"],
            "const_name" => ["Ashford", "Ashford", "Bath", "Bath"],
            "age" => ["25-34", "65+", "25-34", "65+"],
            "education" => ["level_2", "level_2", "level_2", "level_2"],
            "female" => [1.0f64, 0.0, 1.0, 0.0],
            "count" => [100.0f64, 50.0, 80.0, 120.0],
            "perc" => [66.67f64, 33.33, 40.0, 60.0],
        ].unwrap()
    }

    #[test]
    fn appends_probability_columns_in_unit_interval() {
        let (vote, turnout) = observations();
        let models = ModelSet::fit_all(&vote, &turnout, &FitConfig::default()).unwrap();
        let out = with_predictions(frame(), &models).unwrap();

        assert_eq!(out.height(), 4);
        for name in [TURNOUT_PROB, "con_pred", "lab_pred", "ld_pred", "oth_pred"] {
            let column = out.column(name).unwrap().f64().unwrap().clone();
            for i in 0..out.height() {
                let p = column.get(i).unwrap();
                assert!((0.0..=1.0).contains(&p), "{name}[{i}] = {p}");
            }
        }
    }

    #[test]
    fn turnout_falls_back_for_untrained_constituency() {
        let (vote, turnout) = observations();
        let models = ModelSet::fit_all(&vote, &turnout, &FitConfig::default()).unwrap();
        let out = with_predictions(frame(), &models).unwrap();

        // E2 is absent from the turnout survey: its prediction must exist and
        // equal the fixed-effects-only value.
        assert_eq!(models.turnout.random_effect(&ConstCode::new("E2")), None);
        let turnout_col = out.column(TURNOUT_PROB).unwrap().f64().unwrap().clone();
        let expected = models.turnout.predict(
            true, AgeBand::A25To34, Education::Level2, &ConstCode::new("E2"),
        );
        assert_eq!(turnout_col.get(2), Some(expected));
    }
}
