//! Multilevel (mixed-effects) binomial logistic models.
//!
//! Five independent models share one fixed-effect structure (sex, age band,
//! education) and a per-constituency random intercept: one turnout model fit
//! on the turnout survey and one vote model per party fit on the vote panel.

mod design;
mod glmm;
mod predict;

pub use design::{N_FIXED, design_row, fixed_effect_names};
pub use glmm::{FitConfig, FitDiagnostics, FittedModel, TrainRow, fit};
pub use predict::{TURNOUT_PROB, with_predictions};

use anyhow::Result;
use rayon::prelude::*;

use crate::survey::{TurnoutObs, VoteObs};
use crate::types::{ConstCode, Party};

/// The five fitted models of one pipeline run.
#[derive(Debug)]
pub struct ModelSet {
    pub turnout: FittedModel,
    pub conservative: FittedModel,
    pub labour: FittedModel,
    pub liberal_democrat: FittedModel,
    pub other: FittedModel,
}

impl ModelSet {
    /// Fit all five models. The fits share no state and run in parallel.
    pub fn fit_all(
        vote_obs: &[VoteObs],
        turnout_obs: &[TurnoutObs],
        config: &FitConfig,
    ) -> Result<ModelSet> {
        let (turnout, votes) = rayon::join(
            || {
                let (rows, groups) = turnout_training(turnout_obs);
                fit("turnout", &rows, &groups, config)
            },
            || {
                Party::ALL
                    .into_par_iter()
                    .map(|party| {
                        let (rows, groups) = vote_training(vote_obs, party);
                        fit(party.key(), &rows, &groups, config)
                    })
                    .collect::<Result<Vec<_>>>()
            },
        );

        let mut votes = votes?.into_iter();
        Ok(ModelSet {
            turnout: turnout?,
            conservative: votes.next().unwrap(),
            labour: votes.next().unwrap(),
            liberal_democrat: votes.next().unwrap(),
            other: votes.next().unwrap(),
        })
    }

    pub fn vote(&self, party: Party) -> &FittedModel {
        match party {
            Party::Conservative => &self.conservative,
            Party::Labour => &self.labour,
            Party::LiberalDemocrat => &self.liberal_democrat,
            Party::Other => &self.other,
        }
    }

    pub fn diagnostics(&self) -> Vec<FitDiagnostics> {
        let mut all = vec![self.turnout.diagnostics.clone()];
        all.extend(Party::ALL.iter().map(|p| self.vote(*p).diagnostics.clone()));
        all
    }
}

/// Training rows for one party's vote model: the outcome is the one-hot
/// dummy for that party against every other recoded intention.
pub fn vote_training(observations: &[VoteObs], party: Party) -> (Vec<TrainRow>, Vec<ConstCode>) {
    let mut groups = GroupIndex::default();
    let rows = observations.iter()
        .map(|obs| TrainRow {
            x: design_row(obs.female, obs.age, obs.education),
            group: groups.intern(&obs.code),
            y: if obs.party == party { 1.0 } else { 0.0 },
        })
        .collect();
    (rows, groups.codes)
}

/// Training rows for the turnout model.
pub fn turnout_training(observations: &[TurnoutObs]) -> (Vec<TrainRow>, Vec<ConstCode>) {
    let mut groups = GroupIndex::default();
    let rows = observations.iter()
        .map(|obs| TrainRow {
            x: design_row(obs.female, obs.age, obs.education),
            group: groups.intern(&obs.code),
            y: if obs.voted { 1.0 } else { 0.0 },
        })
        .collect();
    (rows, groups.codes)
}

#[derive(Default)]
struct GroupIndex {
    index: std::collections::HashMap<ConstCode, usize>,
    codes: Vec<ConstCode>,
}

impl GroupIndex {
    fn intern(&mut self, code: &ConstCode) -> usize {
        if let Some(&g) = self.index.get(code) {
            return g;
        }
        let g = self.codes.len();
        self.index.insert(code.clone(), g);
        self.codes.push(code.clone());
        g
    }
}
