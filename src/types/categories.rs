/// Age band used by the census frame and both surveys.
/// Bands are ordered; `Under16` exists only in raw census input and is
/// filtered out before modeling (below voting age).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AgeBand {
    Under16,
    A16To24,
    A25To34,
    A35To49,
    A50To64,
    A65Plus,
}

impl AgeBand {
    /// Canonical ordering, youngest first. `A16To24` is the model reference level.
    pub fn order() -> [AgeBand; 6] {
        [
            AgeBand::Under16,
            AgeBand::A16To24,
            AgeBand::A25To34,
            AgeBand::A35To49,
            AgeBand::A50To64,
            AgeBand::A65Plus,
        ]
    }

    /// Bucket a numeric age in years.
    pub fn from_years(years: i64) -> AgeBand {
        match years {
            i64::MIN..=15 => AgeBand::Under16,
            16..=24 => AgeBand::A16To24,
            25..=34 => AgeBand::A25To34,
            35..=49 => AgeBand::A35To49,
            50..=64 => AgeBand::A50To64,
            _ => AgeBand::A65Plus,
        }
    }

    pub fn to_str(&self) -> &'static str {
        match self {
            AgeBand::Under16 => "0-15",
            AgeBand::A16To24 => "16-24",
            AgeBand::A25To34 => "25-34",
            AgeBand::A35To49 => "35-49",
            AgeBand::A50To64 => "50-64",
            AgeBand::A65Plus => "65+",
        }
    }

    /// Parse a census band label. Returns `None` for labels outside the scheme.
    pub fn from_label(label: &str) -> Option<AgeBand> {
        Self::order().into_iter().find(|band| band.to_str() == label)
    }

    #[inline] pub fn voting_age(&self) -> bool { !matches!(self, AgeBand::Under16) }
}

/// Highest-qualification level, shared by the frame and both surveys.
/// Census codes 0-4 map onto the five named levels; anything else is `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Education {
    NoQualifications,
    Level1,
    Level2,
    Level3,
    Level4,
    Other,
}

impl Education {
    /// Canonical ordering. `NoQualifications` is the model reference level.
    pub fn order() -> [Education; 6] {
        [
            Education::NoQualifications,
            Education::Level1,
            Education::Level2,
            Education::Level3,
            Education::Level4,
            Education::Other,
        ]
    }

    /// Census highest-qualification code. Total, not partial: unknown codes are `Other`.
    pub fn from_census_code(code: i64) -> Education {
        match code {
            0 => Education::NoQualifications,
            1 => Education::Level1,
            2 => Education::Level2,
            3 => Education::Level3,
            4 => Education::Level4,
            _ => Education::Other,
        }
    }

    /// Vote-intention panel qualification code (panel-specific scheme).
    /// Unmappable codes drop the respondent.
    pub fn from_vote_survey_code(code: i64) -> Option<Education> {
        match code {
            1 => Some(Education::NoQualifications),
            2 => Some(Education::Level1),
            3 => Some(Education::Level2),
            4 => Some(Education::Level3),
            5 | 6 => Some(Education::Level4), // degree and postgraduate
            7 => Some(Education::Other),
            _ => None,
        }
    }

    /// Turnout survey qualification code (negative = missing).
    pub fn from_turnout_survey_code(code: i64) -> Option<Education> {
        match code {
            0 => Some(Education::NoQualifications),
            1 => Some(Education::Level1),
            2 => Some(Education::Level2),
            3 => Some(Education::Level3),
            4 => Some(Education::Level4),
            5 => Some(Education::Other),
            _ => None,
        }
    }

    pub fn to_str(&self) -> &'static str {
        match self {
            Education::NoQualifications => "no_qualifications",
            Education::Level1 => "level_1",
            Education::Level2 => "level_2",
            Education::Level3 => "level_3",
            Education::Level4 => "level_4",
            Education::Other => "other",
        }
    }

    pub fn from_label(label: &str) -> Option<Education> {
        Self::order().into_iter().find(|level| level.to_str() == label)
    }
}

/// Binary sex indicator; the frame carries it as a 0/1 `female` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Sex {
    Male,
    Female,
}

impl Sex {
    pub fn from_label(label: &str) -> Option<Sex> {
        if label.eq_ignore_ascii_case("male") {
            Some(Sex::Male)
        } else if label.eq_ignore_ascii_case("female") {
            Some(Sex::Female)
        } else {
            None
        }
    }

    /// Survey sex code: 1 = male, 2 = female, anything else excluded.
    pub fn from_survey_code(code: i64) -> Option<Sex> {
        match code {
            1 => Some(Sex::Male),
            2 => Some(Sex::Female),
            _ => None,
        }
    }

    #[inline] pub fn female_flag(&self) -> f64 {
        match self { Sex::Male => 0.0, Sex::Female => 1.0 }
    }
}
