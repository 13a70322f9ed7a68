use std::fs;

use anyhow::{Context, Result, bail};
use stratcast::{RunManifest, read_from_csv_with_codes, write_to_csv};

pub fn run(cli: &crate::cli::Cli, args: &crate::cli::EstimateArgs) -> Result<()> {
    let out_dir = &args.out;
    if out_dir.exists() && !args.force {
        bail!("output directory {} already exists (use --force to overwrite)", out_dir.display());
    }
    fs::create_dir_all(out_dir.join("meta"))
        .with_context(|| format!("failed to create {}", out_dir.display()))?;

    println!("[estimate] loading census from {}", args.census.display());
    let census = read_from_csv_with_codes(&args.census, &["const_code"])?;
    println!("[estimate] loading vote survey from {}", args.vote_survey.display());
    let vote_survey = read_from_csv_with_codes(&args.vote_survey, &["const_code"])?;
    println!("[estimate] loading turnout survey from {}", args.turnout_survey.display());
    let turnout_survey = read_from_csv_with_codes(&args.turnout_survey, &["const_code"])?;
    println!("[estimate] loading results from {}", args.results.display());
    let results = read_from_csv_with_codes(&args.results, &["const_code"])?;

    println!("[estimate] fitting models and post-stratifying");
    let output = stratcast::run(&census, &vote_survey, &turnout_survey, &results)?;

    for code in &output.frame_report.vanished {
        eprintln!("[estimate] warning: constituency {code} lost every census row to filtering");
    }
    for diag in &output.diagnostics {
        if !diag.converged {
            eprintln!(
                "[estimate] warning: {} model did not converge in {} iterations",
                diag.outcome, diag.iterations,
            );
        }
    }

    if cli.verbose > 0 {
        eprintln!(
            "[estimate] vote survey: kept={} dropped={}",
            output.vote_report.kept, output.vote_report.dropped(),
        );
        eprintln!(
            "[estimate] turnout survey: kept={} dropped={}",
            output.turnout_report.kept, output.turnout_report.dropped(),
        );
    }
    if cli.verbose > 1 {
        for diag in &output.diagnostics {
            eprintln!(
                "[estimate] model {}: sigma2={:.4} deviance={:.1} obs={} groups={}",
                diag.outcome, diag.sigma2, diag.deviance, diag.n_obs, diag.n_groups,
            );
        }
    }

    let manifest = RunManifest::new(&output);

    println!("[estimate] writing cell table to {}", out_dir.join("cells.csv").display());
    write_to_csv(output.cells, &out_dir.join("cells.csv"))?;
    println!("[estimate] writing comparison table to {}", out_dir.join("constituencies.csv").display());
    write_to_csv(output.constituencies, &out_dir.join("constituencies.csv"))?;
    manifest.write(&out_dir.join("meta/manifest.json"))?;

    Ok(())
}
