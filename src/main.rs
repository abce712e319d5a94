use autotclog::cli::Args;
use autotclog::metadata::format_rates;
use autotclog::paths::{self, PathConfig};
use autotclog::{FfProbe, LogRequest, ReportSummary, Settings};

use clap::Parser;
use log::{debug, info, warn};
use std::path::PathBuf;

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    let args = Args::parse();

    // Create path configuration from CLI args and environment
    let path_config = PathConfig::from_env_and_cli(args.config_dir.clone());

    init_logging(&args, &path_config);
    debug!("Command-line args: {:?}", args);

    let settings_path = paths::config_file(paths::SETTINGS_FILE, &path_config);
    info!("Settings path: {}", settings_path.display());
    let settings = merge_settings(Settings::load(&settings_path), &args);

    if args.save_settings {
        if let Err(e) = paths::ensure_dirs(&path_config) {
            warn!("Failed to create application directories: {:#}", e);
        }
        settings.save(&settings_path)?;
        println!("Settings saved to {}", settings_path.display());
    }

    let request = LogRequest {
        folder: args.folder.clone(),
        start_timecode: Some(settings.start_timecode.clone()),
        output_dir: args.output_dir.clone(),
        output_name: Some(settings.output_name.clone()),
        extensions: settings.extensions.clone(),
    };

    let probe = FfProbe::new(&settings.ffprobe, settings.probe_timeout());
    let sink = settings.format.sink();

    println!("Scanning folder, please wait...");
    let summary = autotclog::run(&request, &probe, sink.as_ref())?;
    print_summary(&summary);

    Ok(())
}

/// CLI flags override the settings file
fn merge_settings(mut settings: Settings, args: &Args) -> Settings {
    if let Some(ffprobe) = &args.ffprobe {
        settings.ffprobe = ffprobe.to_string_lossy().into_owned();
    }
    if let Some(secs) = args.timeout {
        settings.probe_timeout_secs = secs;
    }
    if let Some(name) = &args.output_name {
        settings.output_name = name.clone();
    }
    if let Some(format) = args.format {
        settings.format = format;
    }
    if let Some(tc) = &args.start_timecode {
        settings.start_timecode = tc.clone();
    }
    settings.add_extensions(&args.extensions);
    settings
}

fn init_logging(args: &Args, path_config: &PathConfig) {
    if let Some(log_file_opt) = &args.log_file {
        // File logging (debug by default)
        let log_path = log_file_opt
            .clone()
            .unwrap_or_else(|| paths::data_file(paths::LOG_FILE, path_config));

        if log_file_opt.is_none() {
            if let Err(e) = paths::ensure_dirs(path_config) {
                eprintln!("Warning: Failed to create application directories: {}", e);
            }
        }

        let log_level = match args.verbosity {
            0..=2 => log::LevelFilter::Debug,
            _ => log::LevelFilter::Trace,
        };

        match std::fs::File::create(&log_path) {
            Ok(file) => {
                env_logger::Builder::new()
                    .filter_level(log_level)
                    .format_timestamp_millis()
                    .target(env_logger::Target::Pipe(Box::new(file)))
                    .init();

                info!(
                    "Logging to file: {} (level: {:?})",
                    log_path.display(),
                    log_level
                );
                return;
            }
            Err(e) => {
                eprintln!(
                    "Warning: Cannot open log file {}: {}, logging to console",
                    log_path.display(),
                    e
                );
            }
        }
    }

    // Console logging with specified verbosity level (respects RUST_LOG if set)
    let default_level = match args.verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp_millis()
        .init();
}

fn print_summary(summary: &ReportSummary) {
    for skipped in &summary.skipped {
        println!("Skipped {}: {}", skipped.file_path.display(), skipped.reason);
    }

    if summary.mixed_frame_rates {
        println!(
            "Note: clips use different frame rates ({}). It is advised to keep video files with different framerates in separate folders.",
            format_rates(&summary.frame_rates)
        );
    }

    println!(
        "{} clip(s) logged, {} skipped",
        summary.rows_written(),
        summary.skipped.len()
    );
    println!("Output file saved to {}", display_path(&summary.output_path).display());
}

fn display_path(path: &std::path::Path) -> PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}
