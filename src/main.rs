use chrono::Local;
use clap::Parser;
use session_snapshot::backup::result_error::error::Error;
use session_snapshot::backup::result_error::result::Result;
use session_snapshot::backup::result_error::WithMsg;
use session_snapshot::backup::session::{resolve_session_dir, FixedSessionDir};
use session_snapshot::backup::snapshot_config::SnapshotConfig;
use std::fs::File;
use std::path::PathBuf;
use std::process::exit;
use tracing::{error, info, Level};
use tracing_subscriber::fmt::writer::MakeWriterExt;

/// Snapshot the live session directory into hourly archives nested in a daily archive
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Live session directory to back up
    #[arg(short, long, env = "SESSION_DIR")]
    session_dir: Option<PathBuf>,

    /// Optional YAML config, defaults apply when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,
}

fn load_config(path: Option<&PathBuf>) -> Result<SnapshotConfig> {
    match path {
        None => Ok(SnapshotConfig::default()),
        Some(path) => File::open(path)
            .map_err(Error::from)
            .and_then(SnapshotConfig::from_yaml_reader)
            .with_msg(format!("Load config failed: {:?}", path)),
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr.with_max_level(Level::WARN).or_else(std::io::stdout))
        .init();
    let args = Args::parse();

    let res = resolve_session_dir(&FixedSessionDir(args.session_dir.clone()))
        .and_then(|session_dir| {
            load_config(args.config.as_ref()).map(|config| (session_dir, config))
        })
        .and_then(|(session_dir, config)| config.run(session_dir, &Local::now()));

    match res {
        Ok(paths) => {
            info!(
                "Stored {:?} in {:?}",
                paths.hourly_entry_name(),
                paths.daily_archive()
            );
            exit(0)
        }
        Err(e) => {
            error!("{e}");
            exit(1)
        }
    }
}
