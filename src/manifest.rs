use std::{collections::BTreeMap, fs, path::Path};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::model::FitDiagnostics;
use crate::pipeline::PipelineOutput;

/// Summary of one pipeline run, written next to the output tables.
#[derive(Debug, Serialize, Deserialize)]
pub struct RunManifest {
    version: String,
    tables: BTreeMap<String, usize>,
    drops: BTreeMap<String, usize>,
    models: Vec<FitDiagnostics>,
}

impl RunManifest {
    pub fn new(output: &PipelineOutput) -> Self {
        let mut tables = BTreeMap::new();
        tables.insert("cells".to_string(), output.cells.height());
        tables.insert("constituencies".to_string(), output.constituencies.height());

        let mut drops = BTreeMap::new();
        drops.insert("census_under_16".into(), output.frame_report.dropped_under_16);
        drops.insert("vote_constituency".into(), output.vote_report.dropped_constituency);
        drops.insert("vote_intention".into(), output.vote_report.dropped_outcome);
        drops.insert("vote_education".into(), output.vote_report.dropped_education);
        drops.insert("vote_sex".into(), output.vote_report.dropped_sex);
        drops.insert("vote_age".into(), output.vote_report.dropped_age);
        drops.insert("turnout_constituency".into(), output.turnout_report.dropped_constituency);
        drops.insert("turnout_voted".into(), output.turnout_report.dropped_outcome);
        drops.insert("turnout_education".into(), output.turnout_report.dropped_education);
        drops.insert("turnout_sex".into(), output.turnout_report.dropped_sex);
        drops.insert("turnout_age".into(), output.turnout_report.dropped_age);

        Self {
            version: "1".into(),
            tables,
            drops,
            models: output.diagnostics.clone(),
        }
    }

    pub fn write(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)
            .context("[manifest] failed to serialize run manifest")?;
        fs::write(path, json)
            .with_context(|| format!("[manifest] failed to write {}", path.display()))?;
        Ok(())
    }

    pub fn models(&self) -> &[FitDiagnostics] {
        &self.models
    }
}
