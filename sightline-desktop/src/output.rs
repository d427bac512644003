//! Naming and creating output files.

use std::fs;
use std::io::{self, Write as _};
use std::path::{Path, PathBuf};

use anyhow::Context as _;
use time::OffsetDateTime;
use time::macros::format_description;

/// Formats the current time as `yyyyMMddHHmmss`, in the local time zone if it can be
/// determined and UTC otherwise.
pub fn timestamp_now() -> Result<String, anyhow::Error> {
    let now = OffsetDateTime::now_local().unwrap_or_else(|error| {
        log::debug!("using UTC for file names: {error}");
        OffsetDateTime::now_utc()
    });
    format_timestamp(now)
}

/// Formats `time` as `yyyyMMddHHmmss`.
pub fn format_timestamp(time: OffsetDateTime) -> Result<String, anyhow::Error> {
    time.format(format_description!(
        "[year][month][day][hour][minute][second]"
    ))
    .context("failed to format timestamp")
}

/// File name of a capture output before any disambiguation: `{prefix}log_{timestamp}.{extension}`.
pub fn base_file_name(prefix: &str, timestamp: &str, extension: &str) -> String {
    format!("{prefix}log_{timestamp}.{extension}")
}

/// Creates a new file in `dir` named by [`base_file_name`], or if that is taken, with `_1`,
/// `_2`, … inserted before the extension, and writes `contents` to it.
///
/// `dir` and its parents are created if necessary. Existing files are never overwritten.
pub fn write_new_file(
    dir: &Path,
    prefix: &str,
    timestamp: &str,
    extension: &str,
    contents: &str,
) -> Result<PathBuf, anyhow::Error> {
    fs::create_dir_all(dir)
        .with_context(|| format!("failed to create directory {dir}", dir = dir.display()))?;

    for suffix in 0u32.. {
        let name = match suffix {
            0 => base_file_name(prefix, timestamp, extension),
            n => format!("{prefix}log_{timestamp}_{n}.{extension}"),
        };
        let path = dir.join(name);
        match fs::OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(mut file) => {
                file.write_all(contents.as_bytes())
                    .and_then(|()| file.flush())
                    .with_context(|| format!("failed to write {path}", path = path.display()))?;
                return Ok(path);
            }
            Err(error) if error.kind() == io::ErrorKind::AlreadyExists => continue,
            Err(error) => {
                return Err(error)
                    .with_context(|| format!("failed to create {path}", path = path.display()));
            }
        }
    }
    anyhow::bail!("no free file name in {dir}", dir = dir.display())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use time::macros::datetime;

    #[test]
    fn timestamp_format() {
        assert_eq!(
            format_timestamp(datetime!(2024-03-05 07:08:09 UTC)).unwrap(),
            "20240305070809"
        );
        assert_eq!(timestamp_now().unwrap().len(), 14);
    }

    #[test]
    fn taken_names_get_a_suffix() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("a").join("b");
        let write = |text: &str| write_new_file(&out, "honolulu_", "20240305070809", "csv", text);

        let first = write("one").unwrap();
        let second = write("two").unwrap();
        let third = write("three").unwrap();
        assert_eq!(
            [&first, &second, &third].map(|p| p.file_name().unwrap().to_str().unwrap()),
            [
                "honolulu_log_20240305070809.csv",
                "honolulu_log_20240305070809_1.csv",
                "honolulu_log_20240305070809_2.csv",
            ]
        );
        assert_eq!(fs::read_to_string(&first).unwrap(), "one");
        assert_eq!(fs::read_to_string(&third).unwrap(), "three");
    }
}
