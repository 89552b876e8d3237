use crate::executor::ExecutionError;
use colored::Colorize;
use std::{fmt, path::PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Dir,
    File,
}
impl EntryKind {
    fn as_str(&self) -> &str {
        match self {
            Self::Dir => "dir",
            Self::File => "file",
        }
    }
}
impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// What happened to one planned entry.
#[derive(Debug)]
pub enum Outcome {
    Created,
    Exists,
    /// Left out because the run is folders only.
    Skipped,
    /// Dry run: would be created, or is already there.
    Planned { exists: bool },
    Failed(ExecutionError),
}
impl Outcome {
    pub fn label(&self) -> &str {
        match self {
            Self::Created => "created",
            Self::Exists => "exists",
            Self::Skipped => "skipped",
            Self::Planned { .. } => "dry-run",
            Self::Failed(_) => "failed",
        }
    }

    fn symbol(&self) -> colored::ColoredString {
        match self {
            Self::Created => "+".green(),
            Self::Exists => "=".yellow(),
            Self::Skipped => "-".dimmed(),
            Self::Planned { .. } => "~".cyan(),
            Self::Failed(_) => "!".red().bold(),
        }
    }
}

#[derive(Debug)]
pub struct Entry {
    pub path: PathBuf,
    pub kind: EntryKind,
    pub outcome: Outcome,
}

/// Totals shown at the top of a [`Report`].
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Summary {
    pub dirs_created: usize,
    pub files_created: usize,
    pub existing: usize,
    pub skipped: usize,
    pub failed: usize,
}

#[derive(Debug, Default)]
pub struct Report {
    pub entries: Vec<Entry>,
}
impl Report {
    pub fn is_dry_run(&self) -> bool {
        self.entries
            .iter()
            .any(|entry| matches!(entry.outcome, Outcome::Planned { .. }))
    }

    pub fn failures(&self) -> impl Iterator<Item = (&Entry, &ExecutionError)> {
        self.entries.iter().filter_map(|entry| match &entry.outcome {
            Outcome::Failed(error) => Some((entry, error)),
            _ => None,
        })
    }

    pub fn has_failures(&self) -> bool {
        self.failures().next().is_some()
    }

    /// Dry-run entries that do not exist yet count as created.
    pub fn summary(&self) -> Summary {
        let mut summary = Summary::default();

        for entry in &self.entries {
            match (&entry.outcome, entry.kind) {
                (Outcome::Created | Outcome::Planned { exists: false }, EntryKind::Dir) => {
                    summary.dirs_created += 1
                }
                (Outcome::Created | Outcome::Planned { exists: false }, EntryKind::File) => {
                    summary.files_created += 1
                }
                (Outcome::Exists | Outcome::Planned { exists: true }, _) => summary.existing += 1,
                (Outcome::Skipped, _) => summary.skipped += 1,
                (Outcome::Failed(_), _) => summary.failed += 1,
            }
        }

        summary
    }

    pub fn render(&self) -> String {
        let summary = self.summary();
        let mut out = String::new();

        out.push_str(&format!("\n{}\n", "=== Report ===".bold()));
        if self.is_dry_run() {
            out.push_str(&format!(
                "{}\n",
                "Mode: DRY-RUN (nothing was written)".cyan()
            ));
        }
        out.push_str(&format!("Dirs created:   {}\n", summary.dirs_created));
        out.push_str(&format!("Files created:  {}\n", summary.files_created));
        out.push_str(&format!("Already there:  {}\n", summary.existing));
        out.push_str(&format!("Files skipped:  {}\n", summary.skipped));
        out.push_str(&format!("Failed:         {}\n\n", summary.failed));

        for entry in &self.entries {
            out.push_str(&format!(
                "{} [{}] {}\n",
                entry.outcome.symbol(),
                entry.kind,
                entry.path.display()
            ));
        }

        if self.has_failures() {
            out.push_str(&format!("\n{}\n", "Could not create:".red().bold()));
            for (entry, error) in self.failures() {
                out.push_str(&format!("  {}: {}\n", entry.path.display(), error));
            }
        }

        out
    }

    pub fn print(&self) {
        print!("{}", self.render());
    }
}
