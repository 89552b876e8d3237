use crate::{
    config::Config,
    outline::{Node, NodeKind, Tree},
};
use indexmap::IndexMap;
use std::{
    fmt,
    path::{Path, PathBuf},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    MakeDir,
    /// Create an empty file.
    Touch,
}

/// A single filesystem operation, relative to the plan's output root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Action {
    pub op: Op,
    pub path: PathBuf,
}
impl Action {
    pub fn make_dir<P: Into<PathBuf>>(path: P) -> Self {
        Self {
            op: Op::MakeDir,
            path: path.into(),
        }
    }

    pub fn touch<P: Into<PathBuf>>(path: P) -> Self {
        Self {
            op: Op::Touch,
            path: path.into(),
        }
    }

    /// Where the action lands once resolved against `root`.
    pub fn target(&self, root: &Path) -> PathBuf {
        root.join(&self.path)
    }
}
impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.op {
            Op::MakeDir => write!(f, "mkdir {}", self.path.display()),
            Op::Touch => write!(f, "touch {}", self.path.display()),
        }
    }
}

/// A file left out of a folders-only plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Skipped {
    pub path: PathBuf,
    /// Number of actions that come before this file in tree order.
    pub position: usize,
}

/// The ordered operations that materialize a [`Tree`] under `root`.
///
/// Actions are in depth-first pre-order, so a directory always comes before anything inside
/// it and a plan can be replayed from the start at any time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Plan {
    pub root: PathBuf,
    pub actions: Vec<Action>,
    /// Files left out because the plan is folders only.
    pub skipped: Vec<Skipped>,
}
impl Plan {
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}

fn compile_level(
    children: &IndexMap<String, Node>,
    prefix: &Path,
    folders_only: bool,
    plan: &mut Plan,
) {
    for node in children.values() {
        let path = prefix.join(&node.name);

        match node.kind {
            NodeKind::Folder => {
                plan.actions.push(Action::make_dir(path.clone()));
                compile_level(&node.children, &path, folders_only, plan);
            }
            NodeKind::File if folders_only => {
                log::debug!("skipping file {}", path.display());
                let position = plan.actions.len();
                plan.skipped.push(Skipped { path, position });
            }
            NodeKind::File => plan.actions.push(Action::touch(path)),
        }
    }
}

/// Walks `tree` and produces the [`Plan`] for `config`. `config.dry_run` has no effect here.
pub fn compile(tree: &Tree, config: &Config) -> Plan {
    let mut plan = Plan {
        root: config.output_root.clone(),
        actions: Vec::new(),
        skipped: Vec::new(),
    };

    compile_level(&tree.children, Path::new(""), config.folders_only, &mut plan);

    plan
}
