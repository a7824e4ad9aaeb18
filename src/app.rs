//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - loads `.env` and parses CLI arguments
//! - initializes logging
//! - runs the trend pipeline
//! - prints reports/plots
//! - writes optional exports

use chrono::{Days, Local};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::cli::{Command, PlotArgs, ProcessArgs, SampleArgs};
use crate::data::{SampleConfig, generate_sample, write_sample_csv};
use crate::domain::RunConfig;
use crate::error::AppError;

pub mod pipeline;

/// Entry point for the `bct` binary.
pub fn run() -> Result<(), AppError> {
    // Missing `.env` is normal; variables already in the environment win.
    let _ = dotenvy::dotenv();

    // We want `bct` and `bct -f data.csv` to behave like `bct tui ...`.
    //
    // Clap requires a subcommand name, so we do a small, explicit rewrite of the
    // argv list before parsing. This preserves a clean clap structure while
    // retaining the requested UX.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);
    init_logging(cli.verbose);

    match cli.command {
        Command::Process(args) => handle_process(args),
        Command::Plot(args) => handle_plot(args),
        Command::Tui(args) => handle_tui(args),
        Command::Sample(args) => handle_sample(args),
    }
}

/// Install the stderr subscriber. `RUST_LOG` takes precedence over `-v`.
fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn handle_process(args: ProcessArgs) -> Result<(), AppError> {
    let config = run_config_from_args(&args)?;
    let run = pipeline::run_pipeline(&config)?;
    let visible = crate::report::apply_selection(&run.records, &config.range)?;

    println!(
        "{}",
        crate::report::format_run_summary(&run.ingest, &run.analysis, visible, &config.trend)
    );
    println!("{}", crate::report::format_recent_table(visible, 7));

    if config.plot {
        let plot = crate::plot::render_ascii_plot(
            visible,
            config.mode,
            config.extras,
            config.plot_width,
            config.plot_height,
        );
        println!("{plot}");
    }

    // Exports always carry the full series; the range only affects the display.
    if let Some(path) = &config.export_csv {
        crate::io::export::write_records_csv(path, &run.records)?;
        println!("Exported CSV: {}", path.display());
    }
    if let Some(path) = &config.export_series {
        crate::io::series::write_series_json(path, &run.records, &config.trend)?;
        println!("Exported series JSON: {}", path.display());
    }
    if config.debug_bundle {
        let path = crate::debug::write_debug_bundle(&run.analysis, &config.trend, &config.input)?;
        println!("Debug bundle: {}", path.display());
    }

    Ok(())
}

fn handle_tui(args: ProcessArgs) -> Result<(), AppError> {
    crate::tui::run(args)
}

fn handle_plot(args: PlotArgs) -> Result<(), AppError> {
    let series = crate::io::series::read_series_json(&args.series)?;
    let plot = crate::plot::render_ascii_plot_from_series(&series, args.mode, args.extras(), args.width, args.height);

    println!("{plot}");
    Ok(())
}

fn handle_sample(args: SampleArgs) -> Result<(), AppError> {
    let start = match args.start {
        Some(start) => start,
        None => Local::now()
            .date_naive()
            .checked_sub_days(Days::new(args.days as u64))
            .ok_or_else(|| AppError::invalid_input("Sample start date out of range."))?,
    };
    let observations = generate_sample(&SampleConfig::new(args.days, args.seed, start))?;
    write_sample_csv(&args.out, &observations)?;
    println!(
        "Wrote {} measurement(s) over {} day(s) to {}",
        observations.len(),
        args.days,
        args.out.display()
    );
    Ok(())
}

/// Build the run configuration, prompting for a CSV when `-f` is missing.
pub fn run_config_from_args(args: &ProcessArgs) -> Result<RunConfig, AppError> {
    let input = match &args.file {
        Some(path) => crate::cli::picker::validate_csv_path(path)?,
        None => crate::cli::picker::prompt_for_csv_path()?,
    };
    Ok(run_config_with_input(args, input))
}

pub fn run_config_with_input(args: &ProcessArgs, input: std::path::PathBuf) -> RunConfig {
    RunConfig {
        input,
        trend: args.trend.to_config(),
        range: args.range_selection(),
        mode: args.mode,
        extras: args.extras(),
        plot: !args.no_plot,
        plot_width: args.width,
        plot_height: args.height,
        export_csv: args.export.clone(),
        export_series: args.export_series.clone(),
        debug_bundle: args.debug_bundle,
    }
}

/// Rewrite argv so `bct` defaults to `bct tui`.
///
/// Rules:
/// - `bct`                         -> `bct tui`
/// - `bct -f data.csv ...`         -> `bct tui -f data.csv ...`
/// - `bct data.csv ...`            -> `bct process -f data.csv ...`
/// - `bct --help/--version/-h`     -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("tui".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(arg1.as_str(), "-h" | "--help" | "-V" | "--version" | "help");
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(arg1.as_str(), "process" | "plot" | "tui" | "sample");
    if is_subcommand {
        return argv;
    }

    // A leading verbosity flag stays global; look past it for a subcommand.
    if is_verbosity_flag(&arg1) {
        // The flag takes the program-name slot in the recursive call.
        let mut out = vec![argv[0].clone()];
        out.extend(rewrite_args(argv[1..].to_vec()));
        return out;
    }

    // If the first token is a flag, treat it as "tui flags".
    if arg1.starts_with('-') {
        argv.insert(1, "tui".to_string());
        return argv;
    }

    // A bare path runs `process` on that file.
    let rest = argv.split_off(2);
    argv.truncate(1);
    argv.extend(["process".to_string(), "-f".to_string(), arg1]);
    argv.extend(rest);
    argv
}

fn is_verbosity_flag(arg: &str) -> bool {
    arg == "--verbose" || (arg.len() > 1 && arg.starts_with('-') && arg[1..].chars().all(|c| c == 'v'))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argv(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn bare_invocation_runs_tui() {
        assert_eq!(rewrite_args(argv(&["bct"])), argv(&["bct", "tui"]));
        assert_eq!(
            rewrite_args(argv(&["bct", "-f", "a.csv"])),
            argv(&["bct", "tui", "-f", "a.csv"])
        );
    }

    #[test]
    fn subcommands_and_help_are_untouched() {
        for args in [&["bct", "process", "-f", "a.csv"][..], &["bct", "--help"], &["bct", "sample"]] {
            assert_eq!(rewrite_args(argv(args)), argv(args));
        }
    }

    #[test]
    fn bare_path_runs_process() {
        assert_eq!(
            rewrite_args(argv(&["bct", "a.csv", "--range", "month"])),
            argv(&["bct", "process", "-f", "a.csv", "--range", "month"])
        );
    }

    #[test]
    fn verbosity_flag_is_kept_in_front() {
        assert_eq!(
            rewrite_args(argv(&["bct", "-v", "process"])),
            argv(&["bct", "-v", "process"])
        );
        assert_eq!(rewrite_args(argv(&["bct", "-vv"])), argv(&["bct", "-vv", "tui"]));
        assert_eq!(
            rewrite_args(argv(&["bct", "-v", "-f", "a.csv"])),
            argv(&["bct", "-v", "tui", "-f", "a.csv"])
        );
    }
}
