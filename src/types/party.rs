/// Party outcomes modeled by the pipeline.
/// Minor parties are folded into `Other` at recode time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Party {
    Conservative,
    Labour,
    LiberalDemocrat,
    Other,
}

impl Party {
    pub const ALL: [Party; 4] = [
        Party::Conservative,
        Party::Labour,
        Party::LiberalDemocrat,
        Party::Other,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            Party::Conservative => "con",
            Party::Labour => "lab",
            Party::LiberalDemocrat => "ld",
            Party::Other => "oth",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Party::Conservative => "Conservative",
            Party::Labour => "Labour",
            Party::LiberalDemocrat => "Liberal Democrat",
            Party::Other => "Other",
        }
    }

    /// Vote-intention code from the pre-election panel:
    /// 1-3 are the main parties, 4-13 the minor ones, anything else missing.
    pub fn from_intention_code(code: i64) -> Option<Party> {
        match code {
            1 => Some(Party::Conservative),
            2 => Some(Party::Labour),
            3 => Some(Party::LiberalDemocrat),
            4..=13 => Some(Party::Other),
            _ => None,
        }
    }

    // Each party owns a fixed set of columns across the pipeline tables;
    // names are static so no stage builds column names from strings.

    /// Per-cell predicted vote probability.
    pub fn pred_col(&self) -> &'static str {
        match self {
            Party::Conservative => "con_pred",
            Party::Labour => "lab_pred",
            Party::LiberalDemocrat => "ld_pred",
            Party::Other => "oth_pred",
        }
    }

    /// Per-cell weighted contribution (pred x perc x turnout).
    pub fn weighted_col(&self) -> &'static str {
        match self {
            Party::Conservative => "con_wt",
            Party::Labour => "lab_wt",
            Party::LiberalDemocrat => "ld_wt",
            Party::Other => "oth_wt",
        }
    }

    /// Per-cell weighted contribution after ground-truth scaling.
    pub fn scaled_col(&self) -> &'static str {
        match self {
            Party::Conservative => "con_scaled",
            Party::Labour => "lab_scaled",
            Party::LiberalDemocrat => "ld_scaled",
            Party::Other => "oth_scaled",
        }
    }

    /// Per-constituency estimated share (sum of weighted cells).
    pub fn est_col(&self) -> &'static str {
        match self {
            Party::Conservative => "con_est",
            Party::Labour => "lab_est",
            Party::LiberalDemocrat => "ld_est",
            Party::Other => "oth_est",
        }
    }

    /// Per-constituency ground-truth share.
    pub fn true_col(&self) -> &'static str {
        match self {
            Party::Conservative => "con_true",
            Party::Labour => "lab_true",
            Party::LiberalDemocrat => "ld_true",
            Party::Other => "oth_true",
        }
    }

    /// Per-constituency scale factor (true / estimated).
    pub fn scale_col(&self) -> &'static str {
        match self {
            Party::Conservative => "con_scale",
            Party::Labour => "lab_scale",
            Party::LiberalDemocrat => "ld_scale",
            Party::Other => "oth_scale",
        }
    }
}
