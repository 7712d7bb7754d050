/// Log setup. The TUI owns the terminal, so interactive runs log to a
/// file under the user's data dir; headless runs log to stderr. Level
/// comes from `RUST_LOG`, defaulting to info for this crate.
use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;

struct FileWriter(Mutex<File>);

impl<'a> tracing_subscriber::fmt::MakeWriter<'a> for FileWriter {
    type Writer = LockedFile<'a>;

    fn make_writer(&'a self) -> Self::Writer {
        LockedFile(&self.0)
    }
}

pub struct LockedFile<'a>(&'a Mutex<File>);

impl io::Write for LockedFile<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self.0.lock() {
            Ok(mut file) => io::Write::write(&mut *file, buf),
            Err(_) => Ok(buf.len()),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self.0.lock() {
            Ok(mut file) => io::Write::flush(&mut *file),
            Err(_) => Ok(()),
        }
    }
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("cityplan=info"))
}

/// Route logs to stderr. For headless runs where the terminal is plain.
pub fn init_stderr() {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(io::stderr)
        .init();
}

/// Route logs to `~/.local/share/cityplan/cityplan.log` (or the XDG data
/// dir), returning the path for display. For TUI runs.
pub fn init_file() -> Result<PathBuf> {
    let path = log_path();
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create log dir at {}", parent.display()))?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("Failed to open log file at {}", path.display()))?;

    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(FileWriter(Mutex::new(file)))
        .with_ansi(false)
        .init();

    Ok(path)
}

pub fn log_path() -> PathBuf {
    dirs_data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("cityplan")
        .join("cityplan.log")
}

fn dirs_data_dir() -> Option<PathBuf> {
    std::env::var("XDG_DATA_HOME")
        .ok()
        .map(PathBuf::from)
        .or_else(|| {
            std::env::var("HOME")
                .ok()
                .map(|h| PathBuf::from(h).join(".local").join("share"))
        })
}
