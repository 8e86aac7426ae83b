//! # session_snapshot
//!
//! Hourly snapshots of a live session directory, folded into one archive per day.
//!
//! ## Layout
//!
//! ```text
//! <session>/archives/2024-02-13.tar
//!     -> 13.tar (1 PM)
//!     -> 14.tar (2 PM)
//!         -> constellation4/
//!             -> scripts/
//!             -> logs/
//! <session>/archives/14.tar      (last run of the hour, left on disk)
//! ```
//!
//! Every run rebuilds the hourly archive from a full walk of the session directory,
//! then appends it as one member of the daily archive. Daily archives only grow.
//!
//! ## Quick Start
//!
//! ```no_run
//! use session_snapshot::backup::snapshot_config::SnapshotConfig;
//!
//! let config = SnapshotConfig::builder().build();
//! let paths = config.run("/path/to/session", &chrono::Local::now())?;
//! println!("{:?}", paths.daily_archive());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod backup;
