//! Validation functions for configuration values.
//!
//! Archive directory names, blacklist names and time formats all end up as
//! single path segments, so they share the file name sanitization check.

use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, FixedOffset, NaiveDate, Offset, TimeZone, Utc};
use sanitize_filename::{is_sanitized, sanitize};
use validator::ValidationError;

use std::fmt::Write;
use std::path::Path;

pub fn validate_valid_file_name<S: AsRef<str>>(name: S) -> Result<(), ValidationError> {
    let name = name.as_ref();
    if name.is_empty() {
        return Err(ValidationError::new("InvalidFileName").with_message("Empty file name".into()));
    }

    if name == "." || name == ".." || !is_sanitized(name) {
        return Err(ValidationError::new("InvalidFileName").with_message(
            format!(
                "Invalid file name {:?}, try sanitizing like {:?}",
                name,
                sanitize(name)
            )
            .into(),
        ));
    }

    Ok(())
}

pub fn validate_file_names<I, S>(names: I) -> Result<(), ValidationError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    names.into_iter().try_for_each(validate_valid_file_name)
}

/// A usable time format parses cleanly and renders to a single file name.
pub fn validate_time_format<S: AsRef<str>>(format: S) -> Result<(), ValidationError> {
    let format = format.as_ref();
    if StrftimeItems::new(format).any(|item| matches!(item, Item::Error)) {
        return Err(ValidationError::new("InvalidTimeFormat")
            .with_message(format!("Invalid strftime string: {format:?}").into()));
    }

    let mut rendered = String::new();
    write!(rendered, "{}", sample_date_time().format(format)).map_err(|_| {
        ValidationError::new("InvalidTimeFormat")
            .with_message(format!("Cannot render strftime string: {format:?}").into())
    })?;

    validate_valid_file_name(&rendered).map_err(|_| {
        ValidationError::new("InvalidTimeFormat").with_message(
            format!("{format:?} renders to {rendered:?}, which is not a single file name").into(),
        )
    })
}

/// Runtime timestamps carry an offset, so the sample does too for `%z` and `%Z`
fn sample_date_time() -> DateTime<FixedOffset> {
    let naive = NaiveDate::from_ymd_opt(2024, 2, 13)
        .and_then(|d| d.and_hms_opt(13, 0, 0))
        .unwrap_or_default();
    let offset = FixedOffset::east_opt(9 * 3600).unwrap_or_else(|| Utc.fix());
    offset.from_utc_datetime(&naive)
}

pub fn validate_dir_exist<P: AsRef<Path>>(dir: P) -> Result<(), ValidationError> {
    let dir = dir.as_ref();
    if dir.exists() {
        if !dir.is_dir() {
            return Err(ValidationError::new("InvalidDirectory")
                .with_message(format!("{:?} is not a directory", dir).into()));
        }
    } else {
        return Err(ValidationError::new("InvalidDirectory")
            .with_message(format!("{:?} not found", dir).into()));
    }

    Ok(())
}
