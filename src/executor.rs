use crate::{
    errors::{FileOperation, IoError},
    plan::{Op, Plan, Skipped},
    report::{Entry, EntryKind, Outcome, Report},
};
use miette::Diagnostic;
use std::{
    fs::{self, OpenOptions},
    io::ErrorKind,
    path::{Path, PathBuf},
};
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum ExecutionError {
    #[error("conflict: expected a {expected} at '{}' but something else is there", .path.display())]
    #[diagnostic(
        code(scaffold::execute::conflict),
        help("Move the existing entry out of the way and run again")
    )]
    Conflict { path: PathBuf, expected: EntryKind },

    #[error(transparent)]
    #[diagnostic(transparent)]
    Io(#[from] IoError),
}

/// What is currently at a path, if anything.
enum Existing {
    Nothing,
    Dir,
    File,
    Other,
}

fn inspect(path: &Path) -> Result<Existing, IoError> {
    match fs::metadata(path) {
        Ok(meta) if meta.is_dir() => Ok(Existing::Dir),
        Ok(meta) if meta.is_file() => Ok(Existing::File),
        Ok(_) => Ok(Existing::Other),
        Err(error) if error.kind() == ErrorKind::NotFound => Ok(Existing::Nothing),
        Err(error) => Err(IoError::new(FileOperation::Inspect, path.into(), error)),
    }
}

/// Creates a single directory, leaving an existing one untouched.
///
/// Parents are never created here: the plan orders every directory before its contents, so
/// a missing parent means an earlier action already failed.
fn create_directory(path: &Path) -> Result<Outcome, ExecutionError> {
    match inspect(path)? {
        Existing::Dir => Ok(Outcome::Exists),
        Existing::File | Existing::Other => Err(ExecutionError::Conflict {
            path: path.to_path_buf(),
            expected: EntryKind::Dir,
        }),
        Existing::Nothing => match fs::create_dir(path) {
            Ok(()) => Ok(Outcome::Created),
            Err(error) if error.kind() == ErrorKind::AlreadyExists && path.is_dir() => {
                Ok(Outcome::Exists)
            }
            Err(error) => Err(IoError::new(FileOperation::Mkdir, path.into(), error).into()),
        },
    }
}

/// Creates an empty file. An existing file is never opened for writing, let alone truncated.
fn touch_file(path: &Path) -> Result<Outcome, ExecutionError> {
    match inspect(path)? {
        Existing::File => Ok(Outcome::Exists),
        Existing::Dir | Existing::Other => Err(ExecutionError::Conflict {
            path: path.to_path_buf(),
            expected: EntryKind::File,
        }),
        Existing::Nothing => {
            match OpenOptions::new().write(true).create_new(true).open(path) {
                Ok(_) => Ok(Outcome::Created),
                Err(error) if error.kind() == ErrorKind::AlreadyExists && path.is_file() => {
                    Ok(Outcome::Exists)
                }
                Err(error) => Err(IoError::new(FileOperation::Touch, path.into(), error).into()),
            }
        }
    }
}

/// Reports what applying an action would do without touching the filesystem.
fn simulate(path: &Path, kind: EntryKind) -> Result<Outcome, ExecutionError> {
    match (inspect(path)?, kind) {
        (Existing::Nothing, _) => Ok(Outcome::Planned { exists: false }),
        (Existing::Dir, EntryKind::Dir) | (Existing::File, EntryKind::File) => {
            Ok(Outcome::Planned { exists: true })
        }
        _ => Err(ExecutionError::Conflict {
            path: path.to_path_buf(),
            expected: kind,
        }),
    }
}

fn skipped_entry(root: &Path, file: &Skipped) -> Entry {
    Entry {
        path: root.join(&file.path),
        kind: EntryKind::File,
        outcome: Outcome::Skipped,
    }
}

/// Applies every action of `plan` in order and records what happened to each of them.
///
/// A failing action does not stop the run; it is recorded and the remaining actions are still
/// attempted. Only failing to create the output root itself aborts. With `dry_run` nothing is
/// written. Skipped files are reported where they appear in the outline.
///
/// # Errors
///
/// Returns an [`IoError`] if the output root cannot be created.
pub fn apply(plan: &Plan, dry_run: bool) -> Result<Report, IoError> {
    if !dry_run {
        fs::create_dir_all(&plan.root)
            .map_err(|error| IoError::new(FileOperation::Mkdir, plan.root.clone(), error))?;
    }

    let mut report = Report::default();
    let mut skipped = plan.skipped.iter().peekable();

    for (index, action) in plan.actions.iter().enumerate() {
        while let Some(file) = skipped.next_if(|file| file.position <= index) {
            report.entries.push(skipped_entry(&plan.root, file));
        }

        let target = action.target(&plan.root);
        let kind = match action.op {
            Op::MakeDir => EntryKind::Dir,
            Op::Touch => EntryKind::File,
        };

        let result = match (dry_run, action.op) {
            (true, _) => simulate(&target, kind),
            (false, Op::MakeDir) => create_directory(&target),
            (false, Op::Touch) => touch_file(&target),
        };

        let outcome = result.unwrap_or_else(|error| {
            log::warn!("{}", error);
            Outcome::Failed(error)
        });

        log::debug!("{} -> {}", action, outcome.label());

        report.entries.push(Entry {
            path: target,
            kind,
            outcome,
        });
    }

    report
        .entries
        .extend(skipped.map(|file| skipped_entry(&plan.root, file)));

    Ok(report)
}
