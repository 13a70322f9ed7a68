use anyhow::Result;
use stratcast::{build_frame, read_from_csv_with_codes, write_to_csv};

pub fn run(cli: &crate::cli::Cli, args: &crate::cli::FrameArgs) -> Result<()> {
    let out_path = &args.output.clone().unwrap_or("./frame.csv".into());

    println!("[frame] loading census from {}", args.census.display());
    let census = read_from_csv_with_codes(&args.census, &["const_code"])?;

    let (frame, report) = build_frame(&census)?;
    println!(
        "[frame] built {} cells across {} constituencies ({} under-16 rows dropped)",
        report.kept_rows, report.kept_constituencies, report.dropped_under_16,
    );
    for code in &report.vanished {
        eprintln!("[frame] warning: constituency {code} lost every row to filtering");
    }

    if cli.verbose > 0 {
        eprintln!("[frame] input rows={} kept rows={}", report.input_rows, report.kept_rows);
    }

    println!("[frame] writing frame to {}", out_path.display());
    write_to_csv(frame, out_path)?;

    Ok(())
}
