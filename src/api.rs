use crate::{
    config::{Config, ConfigError},
    errors::{FileOperation, IoError},
    executor,
    outline::{self, ParseError, Tree},
    plan::{self, Plan},
    preview::preview_as_tree,
    prompt::{self, PromptError},
    report::Report,
    utils::{strip_bom, unescape_newlines},
};
use std::{
    fs,
    io::{self, Read},
    path::PathBuf,
};

#[derive(Debug, thiserror::Error, miette::Diagnostic)]
pub enum ScaffoldError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Io(#[from] IoError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Prompt(#[from] PromptError),

    #[error("{failed} entries could not be created")]
    #[diagnostic(
        code(scaffold::incomplete),
        help("The report above lists every path that failed and why")
    )]
    Incomplete { failed: usize },
}

/// Where the outline text comes from.
#[derive(Debug, Clone)]
pub enum SpecSource {
    File(PathBuf),
    Stdin,
    /// Outline given on the command line; `\n` sequences are line breaks.
    Inline(String),
}
impl SpecSource {
    pub fn read(&self) -> Result<String, IoError> {
        let text = match self {
            Self::File(path) => fs::read_to_string(path)
                .map_err(|error| IoError::new(FileOperation::Read, path.clone(), error))?,
            Self::Stdin => {
                let mut buffer = String::new();
                io::stdin().read_to_string(&mut buffer).map_err(|error| {
                    IoError::new(FileOperation::Read, PathBuf::from("<stdin>"), error)
                })?;
                buffer
            }
            Self::Inline(text) => unescape_newlines(text),
        };

        Ok(strip_bom(&text).to_string())
    }
}

#[derive(Debug, Clone)]
pub struct Request {
    pub source: SpecSource,
    pub config: Config,
    /// Show a preview and ask before writing anything.
    pub confirm: bool,
}

/// Parses `text` and compiles it into a [`Plan`] for `config`. Pure: nothing touches disk.
///
/// # Errors
///
/// Returns the first [`ParseError`] found in the outline.
pub fn plan_outline(text: &str, config: &Config) -> Result<(Tree, Plan), ParseError> {
    let tree = outline::parse_str(text, &config.parse_options())?;

    let plan = plan::compile(&tree, config);

    log::debug!(
        "planned {} actions ({} files skipped) under {}",
        plan.actions.len(),
        plan.skipped.len(),
        plan.root.display()
    );

    Ok((tree, plan))
}

/// Reads the outline, plans it and applies the plan.
///
/// Returns `Ok(None)` when the user declines the confirmation prompt. A returned [`Report`]
/// may still contain failed entries; see [`Report::has_failures`].
///
/// # Errors
///
/// Returns a [`ScaffoldError`] if:
///
/// - The outline cannot be read.
/// - The outline is malformed, in which case nothing is written.
/// - The confirmation prompt fails.
/// - The output root cannot be created.
pub fn run(request: &Request) -> Result<Option<Report>, ScaffoldError> {
    let text = request.source.read()?;

    let (tree, plan) = plan_outline(&text, &request.config)?;

    if plan.is_empty() && plan.skipped.is_empty() {
        log::warn!("the outline has no entries, nothing to create");
    }

    if request.confirm || request.config.dry_run {
        preview_as_tree(&tree, &plan.root.display().to_string());
    }

    if request.confirm && !request.config.dry_run && !prompt::apply_changes()? {
        log::info!("declined, nothing was written");
        return Ok(None);
    }

    let report = executor::apply(&plan, request.config.dry_run)?;

    Ok(Some(report))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::Action;
    use std::num::NonZeroUsize;

    #[test]
    fn test_plans_inline_outline() {
        let text = SpecSource::Inline(r"a/\n  b.txt\n  c/".to_string())
            .read()
            .unwrap();
        let mut config = Config::new("out");
        config.folders_only = true;

        let (_, plan) = plan_outline(&text, &config).unwrap();

        assert_eq!(
            plan.actions,
            vec![
                Action::make_dir("a"),
                Action::make_dir(PathBuf::from("a").join("c"))
            ]
        );
    }

    #[test]
    fn test_bad_outline_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("out");
        let mut config = Config::new(&root);
        config.indent_width = NonZeroUsize::new(2);
        let request = Request {
            source: SpecSource::Inline(r"a/\n   b.txt".to_string()),
            config,
            confirm: false,
        };

        let error = run(&request).unwrap_err();

        assert!(matches!(
            error,
            ScaffoldError::Parse(ParseError::BadIndent { .. })
        ));
        assert!(!root.exists());
    }

    #[test]
    fn test_inferred_width_still_rejects_inconsistent_indent() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("out");
        let request = Request {
            source: SpecSource::Inline(r"a/\n  b/\n   c".to_string()),
            config: Config::new(&root),
            confirm: false,
        };

        let error = run(&request).unwrap_err();

        assert!(matches!(
            error,
            ScaffoldError::Parse(ParseError::BadIndent {
                line: 3,
                found: 3,
                width: 2
            })
        ));
        assert!(!root.exists());
    }

    #[test]
    fn test_empty_outline_creates_only_the_root() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("out");
        let request = Request {
            source: SpecSource::Inline("# nothing yet".to_string()),
            config: Config::new(&root),
            confirm: false,
        };

        let report = run(&request).unwrap().unwrap();

        assert!(report.entries.is_empty());
        assert!(root.is_dir());
    }

    #[test]
    fn test_reads_outline_file() {
        let dir = tempfile::tempdir().unwrap();
        let spec = dir.path().join("layout.txt");
        fs::write(&spec, "\u{feff}src/\n  lib.rs\n").unwrap();
        let request = Request {
            source: SpecSource::File(spec),
            config: Config::new(dir.path().join("out")),
            confirm: false,
        };

        let report = run(&request).unwrap().unwrap();

        assert!(!report.has_failures());
        assert!(dir.path().join("out").join("src").join("lib.rs").is_file());
    }

    #[test]
    fn test_missing_outline_file_is_an_io_error() {
        let request = Request {
            source: SpecSource::File(PathBuf::from("/definitely/not/here.txt")),
            config: Config::new("out"),
            confirm: false,
        };

        assert!(matches!(run(&request), Err(ScaffoldError::Io(_))));
    }
}
