//! The estimation pipeline.
//!
//! A strictly sequential chain of pure table-to-table stages; the only
//! parallelism is the fan-out over the five independent model fits.

use anyhow::Result;
use polars::frame::DataFrame;

use crate::estimate::{constituency_estimates, scale_table, with_cell_weights, with_scaled};
use crate::frame::{FrameReport, build_frame};
use crate::model::{FitConfig, FitDiagnostics, ModelSet, with_predictions};
use crate::results::load_results;
use crate::survey::{RecodeReport, recode_turnout_survey, recode_vote_survey};
use crate::types::ConstituencyIndex;

/// Everything a run produces.
///
/// `cells` is the published artifact: the post-stratification frame plus, per
/// party, raw predicted probability, weighted prediction and scaled
/// prediction, along with the turnout probability. `constituencies` is the
/// true-vs-estimated comparison table with the scale factors.
#[derive(Debug)]
pub struct PipelineOutput {
    pub cells: DataFrame,
    pub constituencies: DataFrame,
    pub frame_report: FrameReport,
    pub vote_report: RecodeReport,
    pub turnout_report: RecodeReport,
    pub diagnostics: Vec<FitDiagnostics>,
}

/// Run the whole pipeline on raw input tables.
pub fn run(
    census: &DataFrame,
    vote_survey: &DataFrame,
    turnout_survey: &DataFrame,
    results: &DataFrame,
) -> Result<PipelineOutput> {
    run_with_config(census, vote_survey, turnout_survey, results, &FitConfig::default())
}

pub fn run_with_config(
    census: &DataFrame,
    vote_survey: &DataFrame,
    turnout_survey: &DataFrame,
    results: &DataFrame,
    config: &FitConfig,
) -> Result<PipelineOutput> {
    let (frame, frame_report) = build_frame(census)?;
    let known = ConstituencyIndex::from_frame(&frame)?;

    let (vote_obs, vote_report) = recode_vote_survey(vote_survey, &known)?;
    let (turnout_obs, turnout_report) = recode_turnout_survey(turnout_survey, &known)?;

    let models = ModelSet::fit_all(&vote_obs, &turnout_obs, config)?;
    let diagnostics = models.diagnostics();

    let frame = with_predictions(frame, &models)?;
    let frame = with_cell_weights(frame)?;

    let estimates = constituency_estimates(&frame)?;
    let truth = load_results(results)?;
    let constituencies = scale_table(&estimates, &truth)?;
    let cells = with_scaled(frame, &constituencies)?;

    Ok(PipelineOutput {
        cells,
        constituencies,
        frame_report,
        vote_report,
        turnout_report,
        diagnostics,
    })
}
