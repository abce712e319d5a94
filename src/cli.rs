use clap::Parser;
use std::path::PathBuf;

use crate::table::TableFormat;

// Build version with probe backend info
const VERSION_INFO: &str = const_format::concatcp!(
    env!("CARGO_PKG_VERSION"), "\n",
    "Probe:  ffprobe (external process)\n",
    "Tables: rust_xlsxwriter (XLSX), csv\n",
    "Target: ", std::env::consts::ARCH, "-", std::env::consts::OS
);

/// Write a chained timecode log for a folder of video clips
#[derive(Parser, Debug)]
#[command(author, version = VERSION_INFO, about, long_about = None)]
pub struct Args {
    /// Folder containing the clips (not scanned recursively)
    #[arg(value_name = "FOLDER")]
    pub folder: PathBuf,

    /// Start timecode of the first clip (default: 00:00:00:00)
    #[arg(short = 's', long = "start", value_name = "HH:MM:SS:FF")]
    pub start_timecode: Option<String>,

    /// Output folder for the log (default: FOLDER)
    #[arg(short = 'o', long = "output-dir", value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Output file name without extension (default: AutoTCLog)
    #[arg(short = 'n', long = "name", value_name = "NAME")]
    pub output_name: Option<String>,

    /// Table format
    #[arg(long = "format", value_enum)]
    pub format: Option<TableFormat>,

    /// Additional container extension to scan, e.g. mts (can be specified multiple times)
    #[arg(long = "ext", value_name = "EXT")]
    pub extensions: Vec<String>,

    /// ffprobe executable (default: ffprobe on PATH)
    #[arg(long = "ffprobe", value_name = "PATH")]
    pub ffprobe: Option<PathBuf>,

    /// Per-call probe timeout in seconds, 0 disables it (default: 30)
    #[arg(long = "timeout", value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Save the effective options as defaults in the settings file
    #[arg(long = "save-settings")]
    pub save_settings: bool,

    /// Enable debug logging to file (default: autotclog.log)
    #[arg(short = 'l', long = "log", value_name = "LOG_FILE")]
    pub log_file: Option<Option<PathBuf>>,

    /// Increase logging verbosity (default: warn, -v: info, -vv: debug, -vvv+: trace)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    pub verbosity: u8,

    /// Custom configuration directory (overrides default platform paths)
    #[arg(short = 'c', long = "config-dir", value_name = "DIR")]
    pub config_dir: Option<PathBuf>,
}
