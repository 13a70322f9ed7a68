#![doc = "Stratcast public API"]
mod common;
mod estimate;
mod frame;
mod manifest;
mod model;
mod pipeline;
mod results;
mod survey;
mod types;

#[doc(inline)]
pub use types::{AgeBand, ConstCode, Constituency, ConstituencyIndex, Education, Party, Sex};

#[doc(inline)]
pub use frame::{FrameReport, build_frame};

#[doc(inline)]
pub use survey::{RecodeReport, TurnoutObs, VoteObs, recode_turnout_survey, recode_vote_survey};

#[doc(inline)]
pub use model::{FitConfig, FitDiagnostics, FittedModel, ModelSet, TURNOUT_PROB, with_predictions};

#[doc(inline)]
pub use estimate::{constituency_estimates, scale_table, with_cell_weights, with_scaled};

#[doc(inline)]
pub use results::load_results;

#[doc(inline)]
pub use pipeline::{PipelineOutput, run, run_with_config};

#[doc(inline)]
pub use manifest::RunManifest;

#[doc(inline)]
pub use common::data::{read_from_csv, read_from_csv_with_codes, write_to_csv};
