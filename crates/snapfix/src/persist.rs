use std::collections::BTreeMap;
use std::fs;
use std::io::{self, BufRead, IsTerminal, Write};
use std::num::NonZeroUsize;
use std::process::Command;
use std::thread;

use anyhow::{Context, Result};
use camino::{Utf8Path, Utf8PathBuf};
use colored::Colorize;
use crossbeam_channel::unbounded;
use snapfix_static::EnvVars;
use tempfile::NamedTempFile;

use crate::diff::print_changeset;
use crate::settings::{Settings, UpdateMode};

/// What the persistence step did with the fixed files.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PersistOutcome {
    Wrote(usize),
    /// The update mode asked for a report only.
    NotRequested,
    /// Prompting was requested without a terminal to prompt on.
    NotATerminal,
}

/// A file whose new contents are waiting to be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileChange {
    pub path: Utf8PathBuf,
    pub old: String,
    pub new: String,
    /// Whether the prompt suggests writing the file.
    pub suggested: bool,
}

/// Write the fixed files as `settings` asks, reporting to `out`.
pub fn persist(
    fixed: &BTreeMap<Utf8PathBuf, String>,
    settings: &Settings,
    out: &mut impl Write,
) -> Result<PersistOutcome> {
    let var = EnvVars::SNAPFIX_UPDATE;
    match settings.update {
        UpdateMode::ReportOnly => {
            writeln!(out, "{var} environment not given, not updating snapshots")?;
            writeln!(
                out,
                "Rerun the tests with {} to update the snapshots",
                format!("{var}=yes").bold()
            )?;
            Ok(PersistOutcome::NotRequested)
        }
        UpdateMode::Prompt if !(io::stdin().is_terminal() && io::stdout().is_terminal()) => {
            writeln!(
                out,
                "{var}=interactive given, but not running in a TTY, not updating snapshots"
            )?;
            Ok(PersistOutcome::NotATerminal)
        }
        UpdateMode::Prompt => {
            let paths: Vec<&Utf8Path> = fixed.keys().map(Utf8PathBuf::as_path).collect();
            let clean = fan_out(&paths, settings.write_parallelism, |path| {
                is_tracked_and_clean(path)
            })
            .into_iter()
            .collect::<Result<Vec<_>>>()?;

            let changes: Vec<FileChange> = fixed
                .iter()
                .zip(clean)
                .map(|((path, new), suggested)| FileChange {
                    path: path.clone(),
                    old: fs::read_to_string(path).unwrap_or_default(),
                    new: new.clone(),
                    suggested,
                })
                .collect();

            let selected = select_changes(&changes, &mut io::stdin().lock(), out)?;
            let files: Vec<(Utf8PathBuf, String)> = selected
                .into_iter()
                .map(|change| (change.path.clone(), change.new.clone()))
                .collect();
            write_all(&files, settings.write_parallelism, out)
        }
        UpdateMode::Write => {
            let files: Vec<(Utf8PathBuf, String)> = fixed
                .iter()
                .map(|(path, text)| (path.clone(), text.clone()))
                .collect();
            write_all(&files, settings.write_parallelism, out)
        }
    }
}

/// Write `files`, staging every new text next to its target first.
///
/// Nothing is replaced unless all files were staged. Replacing the staged
/// files is a rename each, so a failure there leaves the files before it
/// written and the rest untouched.
fn write_all(
    files: &[(Utf8PathBuf, String)],
    parallelism: NonZeroUsize,
    out: &mut impl Write,
) -> Result<PersistOutcome> {
    let staged = fan_out(files, parallelism, |(path, text)| {
        stage(path, text).with_context(|| format!("Failed to write `{path}`"))
    })
    .into_iter()
    .collect::<Result<Vec<_>>>()?;

    let mut written: Vec<&Utf8Path> = Vec::with_capacity(files.len());
    for ((path, _), file) in files.iter().zip(staged) {
        if let Err(err) = file.persist(path) {
            tracing::error!(
                path = %path,
                written = ?written,
                "Failed to replace file after writing {} other file(s)",
                written.len()
            );
            let err = anyhow::Error::new(err.error).context(format!("Failed to write `{path}`"));
            return Err(if written.is_empty() {
                err
            } else {
                let list: Vec<&str> = written.iter().map(|path| path.as_str()).collect();
                err.context(format!("Already wrote {}", list.join(", ")))
            });
        }
        written.push(path);
    }

    writeln!(out, "snapfix: Wrote {} file(s)", files.len())?;
    Ok(PersistOutcome::Wrote(files.len()))
}

/// Write `text` to a temporary file in the directory of `path`.
fn stage(path: &Utf8Path, text: &str) -> io::Result<NamedTempFile> {
    let dir = path
        .parent()
        .filter(|parent| !parent.as_str().is_empty())
        .unwrap_or(Utf8Path::new("."));
    let mut file = tempfile::Builder::new()
        .prefix(".snapfix")
        .suffix(".rs")
        .tempfile_in(dir)?;
    file.write_all(text.as_bytes())?;
    if let Ok(metadata) = fs::metadata(path) {
        file.as_file().set_permissions(metadata.permissions())?;
    }
    Ok(file)
}

/// Ask about each change in turn and return the ones to write.
///
/// Answers are `y`, `n`, `a` (this and all remaining) and `q` (none of the
/// remaining). An empty answer takes the suggestion.
pub fn select_changes<'c>(
    changes: &'c [FileChange],
    input: &mut impl BufRead,
    out: &mut impl Write,
) -> io::Result<Vec<&'c FileChange>> {
    let mut selected = Vec::new();
    for (index, change) in changes.iter().enumerate() {
        writeln!(out)?;
        writeln!(
            out,
            "File {}/{}: {}",
            index + 1,
            changes.len(),
            change.path.as_str().bold()
        )?;
        print_changeset(out, &change.old, &change.new)?;

        let choices = if change.suggested { "[Y/n/a/q]" } else { "[y/N/a/q]" };
        write!(out, "Write this file? {choices} ")?;
        out.flush()?;

        let mut answer = String::new();
        input.read_line(&mut answer)?;
        match answer.trim() {
            "y" | "Y" => selected.push(change),
            "n" | "N" => {}
            "a" | "A" => {
                selected.extend(&changes[index..]);
                break;
            }
            "q" | "Q" => break,
            _ if change.suggested => selected.push(change),
            _ => {}
        }
    }
    Ok(selected)
}

/// Whether git knows the file and it has no uncommitted changes.
///
/// Files outside a repository count as untracked.
fn is_tracked_and_clean(path: &Utf8Path) -> Result<bool> {
    let dir = path.parent().unwrap_or(Utf8Path::new("."));

    let tracked = Command::new("git")
        .args(["ls-files", "--error-unmatch", "--", path.as_str()])
        .current_dir(dir)
        .output()
        .context("Failed to execute git ls-files command")?;
    if !tracked.status.success() {
        return Ok(false);
    }

    let changed = Command::new("git")
        .args(["diff-index", "HEAD", "--name-only", "--", path.as_str()])
        .current_dir(dir)
        .output()
        .context("Failed to execute git diff-index command")?;
    anyhow::ensure!(
        changed.status.success(),
        "git diff-index failed for `{path}`: {}",
        String::from_utf8_lossy(&changed.stderr).trim()
    );
    Ok(changed.stdout.iter().all(u8::is_ascii_whitespace))
}

/// Run `f` over `items` on at most `parallelism` threads, keeping input order.
fn fan_out<T, R, F>(items: &[T], parallelism: NonZeroUsize, f: F) -> Vec<R>
where
    T: Sync,
    R: Send,
    F: Fn(&T) -> R + Sync,
{
    let (job_tx, job_rx) = unbounded::<usize>();
    let (result_tx, result_rx) = unbounded::<(usize, R)>();
    for index in 0..items.len() {
        let _ = job_tx.send(index);
    }
    drop(job_tx);

    let workers = parallelism.get().min(items.len());
    thread::scope(|scope| {
        for _ in 0..workers {
            let job_rx = job_rx.clone();
            let result_tx = result_tx.clone();
            let f = &f;
            scope.spawn(move || {
                for index in job_rx {
                    let _ = result_tx.send((index, f(&items[index])));
                }
            });
        }
    });
    drop(result_tx);

    let mut results: Vec<(usize, R)> = result_rx.into_iter().collect();
    results.sort_by_key(|(index, _)| *index);
    results.into_iter().map(|(_, result)| result).collect()
}
