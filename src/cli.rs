//! # CLI Execution
//!
//! Builds a [`Job`] from the parsed arguments, picks the sink, and runs it.
//! File output goes through a temporary sibling that is renamed into place only
//! after the whole run succeeded, so a failed run never leaves a truncated
//! prime list behind.

use anyhow::{Context, Result};
use findprimes::{
    BufferedSink, CountSink, Job, OutputMode, Progress, RunSummary, SieveError, TextSink,
    MAX_BOUND,
};
use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

use super::Cli;

pub fn run(cli: &Cli) -> Result<()> {
    let bound = u32::try_from(cli.bound)
        .ok()
        .filter(|&b| b <= MAX_BOUND)
        .ok_or(SieveError::BoundTooLarge { bound: cli.bound })?;
    let mode = if cli.streaming {
        OutputMode::Streaming
    } else {
        OutputMode::Vector
    };
    let mut job = Job::new(bound, cli.algorithm, cli.threads, mode)
        .context("invalid run configuration")?;

    let reporter = if cli.progress_secs > 0 && cli.threads > 1 {
        let progress = Progress::new();
        job = job.with_progress(progress.clone());
        Some(progress.start_reporter(Duration::from_secs(cli.progress_secs)))
    } else {
        None
    };

    let result = if cli.count {
        run_count(&job)
    } else {
        match cli.output.as_deref() {
            Some(path) if path != Path::new("-") => run_to_file(&job, path),
            _ => run_to_stdout(&job),
        }
    };

    if let Some(reporter) = reporter {
        reporter.stop();
    }
    let summary = result?;

    if cli.summary_json {
        eprintln!("{}", serde_json::to_string(&summary)?);
    }
    Ok(())
}

fn run_job<S: BufferedSink>(job: &Job, sink: &mut S) -> Result<RunSummary> {
    job.run_into(sink).with_context(|| {
        format!(
            "sieve to {} with {} on {} threads failed",
            job.bound(),
            job.algorithm(),
            job.threads()
        )
    })
}

fn run_count(job: &Job) -> Result<RunSummary> {
    let mut sink = CountSink::default();
    let summary = run_job(job, &mut sink)?;
    let mut stdout = io::stdout().lock();
    match sink.largest {
        Some(largest) => writeln!(stdout, "{} primes, largest {}", sink.count, largest)?,
        None => writeln!(stdout, "0 primes")?,
    }
    Ok(summary)
}

fn run_to_stdout(job: &Job) -> Result<RunSummary> {
    let mut sink = TextSink::new(BufWriter::new(io::stdout().lock()));
    run_job(job, &mut sink)
}

fn run_to_file(job: &Job, path: &Path) -> Result<RunSummary> {
    let tmp = temp_path(path);
    let file =
        File::create(&tmp).with_context(|| format!("cannot create {}", tmp.display()))?;
    let mut sink = TextSink::new(BufWriter::new(file));

    let summary = match run_job(job, &mut sink) {
        Ok(summary) => summary,
        Err(e) => {
            drop(sink);
            if let Err(rm) = fs::remove_file(&tmp) {
                warn!(path = %tmp.display(), error = %rm, "failed to remove partial output");
            }
            return Err(e);
        }
    };
    let written = sink.written();
    drop(sink);

    // Atomic write: the run went to a temp sibling, rename it into place
    fs::rename(&tmp, path)
        .with_context(|| format!("cannot move output into {}", path.display()))?;
    info!(path = %path.display(), primes = written, "output written");
    Ok(summary)
}

/// `primes.txt` -> `primes.txt.tmp`, next to the target so the rename stays on
/// one filesystem.
fn temp_path(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(".tmp");
    PathBuf::from(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn temp_path_is_a_sibling() {
        let tmp = temp_path(Path::new("/data/out/primes.txt"));
        assert_eq!(tmp, PathBuf::from("/data/out/primes.txt.tmp"));
        assert_eq!(tmp.parent(), Some(Path::new("/data/out")));
    }
}
