use crate::types::{AgeBand, Education};

/// Number of fixed-effect columns: intercept, female, four age dummies
/// (reference 16-24) and five education dummies (reference no qualifications).
pub const N_FIXED: usize = 11;

/// Column labels matching `design_row`, for diagnostics output.
pub fn fixed_effect_names() -> [&'static str; N_FIXED] {
    [
        "intercept",
        "female",
        "age_25_34",
        "age_35_49",
        "age_50_64",
        "age_65_plus",
        "edu_level_1",
        "edu_level_2",
        "edu_level_3",
        "edu_level_4",
        "edu_other",
    ]
}

/// Fixed-effect design row for one respondent or frame cell.
pub fn design_row(female: bool, age: AgeBand, education: Education) -> [f64; N_FIXED] {
    debug_assert!(age.voting_age(), "under-16 rows never reach the models");

    let mut x = [0.0; N_FIXED];
    x[0] = 1.0;
    x[1] = if female { 1.0 } else { 0.0 };
    match age {
        AgeBand::Under16 | AgeBand::A16To24 => {}
        AgeBand::A25To34 => x[2] = 1.0,
        AgeBand::A35To49 => x[3] = 1.0,
        AgeBand::A50To64 => x[4] = 1.0,
        AgeBand::A65Plus => x[5] = 1.0,
    }
    match education {
        Education::NoQualifications => {}
        Education::Level1 => x[6] = 1.0,
        Education::Level2 => x[7] = 1.0,
        Education::Level3 => x[8] = 1.0,
        Education::Level4 => x[9] = 1.0,
        Education::Other => x[10] = 1.0,
    }
    x
}
