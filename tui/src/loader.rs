//! Background File Loaders
//!
//! One OS thread per trace file. Each scans its file line by line,
//! counting compute ring references (`comp_a.b.c`), and reports progress
//! into the log panel through a [`Logger`], colored from the live
//! [`SharedPalette`]. The frame thread never waits on a loader; it polls
//! [`LoaderSet::poll`] once per frame.

use std::fmt::Write as _;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::thread::{self, JoinHandle};

use tracevis_core::logf;
use tracevis_core::strings::file_size;
use tracevis_core::version::{CompVersion, COMP_COUNT};
use tracevis_core::{replace_escapes, ColorId, Logger, RichText, SharedPalette};

/// Lines between progress entries
const PROGRESS_INTERVAL: u64 = 100_000;

/// Result of scanning one file
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoadSummary {
    pub path: PathBuf,
    pub bytes: u64,
    pub lines: u64,
    /// Rings seen, with their reference counts, in index order
    pub rings: Vec<(CompVersion, u64)>,
}

impl LoadSummary {
    /// References across every ring
    pub fn ring_refs(&self) -> u64 {
        self.rings.iter().map(|(_, n)| n).sum()
    }
}

/// Path text safe to push into a log entry
fn display_name(path: &Path) -> String {
    replace_escapes(&path.display().to_string()).into_owned()
}

/// Scan `path`, logging progress and the final summary through `logger`
pub fn scan_file(path: &Path, logger: &Logger, palette: &SharedPalette) -> io::Result<LoadSummary> {
    let name = display_name(path);
    let bytes = file_size(path);
    logf!(logger, "Loading {} ({} bytes)", name, bytes);

    let reader = BufReader::new(File::open(path)?);
    let mut counts = [0u64; COMP_COUNT as usize];
    let mut lines = 0u64;

    for line in reader.split(b'\n') {
        let line = line?;
        lines += 1;

        for token in String::from_utf8_lossy(&line).split_ascii_whitespace() {
            if let Some(ring) = CompVersion::parse(token) {
                counts[ring.index() as usize] += 1;
            }
        }

        if lines % PROGRESS_INTERVAL == 0 {
            logf!(logger, "{}: {} lines", name, lines);
        }
    }

    let rings = counts
        .iter()
        .enumerate()
        .filter(|(_, n)| **n > 0)
        .filter_map(|(i, n)| CompVersion::from_index(i as u32).map(|v| (v, *n)))
        .collect();

    let summary = LoadSummary {
        path: path.to_path_buf(),
        bytes,
        lines,
        rings,
    };
    logger.append(&summary_entry(&summary, palette));
    Ok(summary)
}

fn summary_entry(summary: &LoadSummary, palette: &SharedPalette) -> RichText {
    let text = palette.get(ColorId::BarText);

    let mut entry = RichText::new();
    entry
        .push_colored(palette.get(ColorId::GreenText), "Loaded ")
        .push_colored(palette.get(ColorId::BrightText), &display_name(&summary.path))
        .push_color(text);
    let _ = write!(entry, ": {} lines, {} bytes", summary.lines, summary.bytes);

    for (ring, count) in &summary.rings {
        entry
            .push_newline()
            .push_colored(palette.get(ColorId::DimText), "  ")
            .push_colored(palette.get(ColorId::YellowText), &ring.to_string())
            .push_colored(text, &format!(" x{count}"));
    }
    entry
}

/// Loader threads started for the command-line files
#[derive(Debug, Default)]
pub struct LoaderSet {
    running: Vec<(PathBuf, JoinHandle<io::Result<LoadSummary>>)>,
    finished: Vec<LoadSummary>,
    failed: usize,
    palette: SharedPalette,
}

impl LoaderSet {
    /// Start one thread per file
    pub fn spawn(files: Vec<PathBuf>, logger: &Logger, palette: &SharedPalette) -> Self {
        let mut set = Self {
            palette: palette.clone(),
            ..Self::default()
        };

        for path in files {
            let thread_logger = logger.clone();
            let thread_palette = palette.clone();
            let thread_path = path.clone();
            let name = format!("loader-{}", set.running.len());

            match thread::Builder::new()
                .name(name)
                .spawn(move || scan_file(&thread_path, &thread_logger, &thread_palette))
            {
                Ok(handle) => set.running.push((path, handle)),
                Err(e) => {
                    tracing::error!(path = %path.display(), error = %e, "Failed to start loader");
                    set.failed += 1;
                }
            }
        }

        set
    }

    /// Collect loaders that finished since the last call
    ///
    /// Returns how many completed this time. Errors are logged in red.
    pub fn poll(&mut self, logger: &Logger) -> usize {
        let mut done = 0;
        let mut i = 0;

        while i < self.running.len() {
            if !self.running[i].1.is_finished() {
                i += 1;
                continue;
            }

            let (path, handle) = self.running.swap_remove(i);
            done += 1;
            match handle.join() {
                Ok(Ok(summary)) => self.finished.push(summary),
                Ok(Err(e)) => {
                    self.failed += 1;
                    let mut entry = RichText::new();
                    entry.push_colored(
                        self.palette.get(ColorId::RedText),
                        &replace_escapes(&format!("Failed to load {}: {e}", path.display())),
                    );
                    logger.append(entry);
                }
                Err(_) => {
                    self.failed += 1;
                    tracing::error!(path = %path.display(), "Loader thread panicked");
                }
            }
        }

        done
    }

    pub fn finished(&self) -> &[LoadSummary] {
        &self.finished
    }

    pub fn pending(&self) -> usize {
        self.running.len()
    }

    pub fn failed(&self) -> usize {
        self.failed
    }

    pub fn total(&self) -> usize {
        self.running.len() + self.finished.len() + self.failed
    }
}
