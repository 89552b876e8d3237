//! Indentation outline parsing.
//!
//! An outline describes a directory tree with one entry per line. Nesting is expressed with
//! leading whitespace, a trailing `/` marks a folder, and lines starting with `#` are comments:
//!
//! ```text
//! my-project/
//!   src/
//!     main.py   # entry point
//!   README.md
//! ```
use crate::{
    names::{NamePolicy, NameViolation},
    utils::strip_bom,
};
use indexmap::IndexMap;
use miette::Diagnostic;
use std::{
    num::NonZeroUsize,
    path::{Path, PathBuf},
};
use thiserror::Error;

/// Indent width used when the outline has no nested entries to infer it from.
pub const DEFAULT_INDENT_WIDTH: usize = 2;

#[derive(Debug, Error, Diagnostic, PartialEq, Eq)]
pub enum ParseError {
    #[error("line {line}: indentation of {found} is not a multiple of the indent width {width}")]
    #[diagnostic(
        code(scaffold::parse::bad_indent),
        help("Indent every level with the same number of whitespace characters, or pass --indent")
    )]
    BadIndent {
        line: usize,
        found: usize,
        width: usize,
    },

    #[error("line {line}: invalid name '{name}': {reason}")]
    #[diagnostic(code(scaffold::parse::invalid_name))]
    InvalidName {
        line: usize,
        name: String,
        reason: NameViolation,
    },

    #[error("line {line}: '{name}' is nested at depth {depth} but has no parent folder")]
    #[diagnostic(
        code(scaffold::parse::orphan_node),
        help("Only folders (entries ending with '/') can contain nested entries")
    )]
    OrphanNode {
        line: usize,
        name: String,
        depth: usize,
    },

    #[error("line {line}: duplicate entry '{name}' in '{}'", display_parent(.parent))]
    #[diagnostic(
        code(scaffold::parse::duplicate_name),
        help("Every entry must be unique within its folder")
    )]
    DuplicateName {
        line: usize,
        name: String,
        parent: PathBuf,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseErrorKind {
    BadIndent,
    InvalidName,
    OrphanNode,
    DuplicateName,
}

impl ParseError {
    /// 1-based line number of the offending entry.
    pub fn line(&self) -> usize {
        match self {
            Self::BadIndent { line, .. }
            | Self::InvalidName { line, .. }
            | Self::OrphanNode { line, .. }
            | Self::DuplicateName { line, .. } => *line,
        }
    }

    pub fn kind(&self) -> ParseErrorKind {
        match self {
            Self::BadIndent { .. } => ParseErrorKind::BadIndent,
            Self::InvalidName { .. } => ParseErrorKind::InvalidName,
            Self::OrphanNode { .. } => ParseErrorKind::OrphanNode,
            Self::DuplicateName { .. } => ParseErrorKind::DuplicateName,
        }
    }
}

fn display_parent(parent: &Path) -> String {
    if parent.as_os_str().is_empty() {
        ".".to_string()
    } else {
        parent.display().to_string()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Folder,
    File,
}

/// A single outline entry. Only folders have children.
#[derive(Debug, Clone)]
pub struct Node {
    pub name: String,
    pub kind: NodeKind,
    pub depth: usize,
    /// 1-based line the entry was read from.
    pub line: usize,
    pub children: IndexMap<String, Node>,
}
impl Node {
    pub fn is_folder(&self) -> bool {
        self.kind == NodeKind::Folder
    }
}

/// The parsed outline. Acts as the synthetic root folder that owns every depth 0 entry.
#[derive(Debug, Clone, Default)]
pub struct Tree {
    pub children: IndexMap<String, Node>,
}
impl Tree {
    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// All nodes in depth-first pre-order.
    pub fn nodes(&self) -> Vec<&Node> {
        fn collect<'a>(children: &'a IndexMap<String, Node>, out: &mut Vec<&'a Node>) {
            for node in children.values() {
                out.push(node);
                collect(&node.children, out);
            }
        }

        let mut out = Vec::new();
        collect(&self.children, &mut out);
        out
    }

    fn children_at(&self, open: &[usize]) -> &IndexMap<String, Node> {
        let mut children = &self.children;
        for &index in open {
            let (_, folder) = children
                .get_index(index)
                .expect("open folder indices point at existing nodes");
            children = &folder.children;
        }
        children
    }

    fn children_at_mut(&mut self, open: &[usize]) -> &mut IndexMap<String, Node> {
        let mut children = &mut self.children;
        for &index in open {
            let (_, folder) = children
                .get_index_mut(index)
                .expect("open folder indices point at existing nodes");
            children = &mut folder.children;
        }
        children
    }

    fn path_of(&self, open: &[usize]) -> PathBuf {
        let mut path = PathBuf::new();
        let mut children = &self.children;
        for &index in open {
            let (name, folder) = children
                .get_index(index)
                .expect("open folder indices point at existing nodes");
            path.push(name);
            children = &folder.children;
        }
        path
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ParseOptions {
    /// Whitespace characters per nesting level. `None` infers it from the outline.
    pub indent_width: Option<NonZeroUsize>,
    pub names: NamePolicy,
}

/// A line that survived comment and blank filtering.
struct Entry<'a> {
    line: usize,
    indent: usize,
    label: &'a str,
}

fn significant(index: usize, raw: &str) -> Option<Entry<'_>> {
    lazy_static::lazy_static! {
        static ref TRAILING_COMMENT: regex::Regex =
            regex::Regex::new(r"\s+#.*$").expect("a valid regex pattern");
    }

    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        log::trace!("ignoring line {}", index + 1);
        return None;
    }

    let label = match TRAILING_COMMENT.find(trimmed) {
        Some(comment) => &trimmed[..comment.start()],
        None => trimmed,
    };

    Some(Entry {
        line: index + 1,
        indent: raw.chars().take_while(|c| c.is_whitespace()).count(),
        label,
    })
}

fn infer_from_entries(entries: &[Entry<'_>]) -> usize {
    entries
        .iter()
        .map(|entry| entry.indent)
        .filter(|indent| *indent > 0)
        .min()
        .unwrap_or(DEFAULT_INDENT_WIDTH)
}

fn build_node(entry: &Entry<'_>, width: usize, names: NamePolicy) -> Result<Node, ParseError> {
    if entry.indent % width != 0 {
        return Err(ParseError::BadIndent {
            line: entry.line,
            found: entry.indent,
            width,
        });
    }

    // a trailing separator of the policy marks a folder
    let label = entry.label.trim_end();
    let (name, kind) = match label.strip_suffix(names.separators()) {
        Some(stripped) => (stripped.trim_end(), NodeKind::Folder),
        None => (label, NodeKind::File),
    };

    names
        .validate(name)
        .map_err(|reason| ParseError::InvalidName {
            line: entry.line,
            name: name.to_string(),
            reason,
        })?;

    Ok(Node {
        name: name.to_string(),
        kind,
        depth: entry.indent / width,
        line: entry.line,
        children: IndexMap::new(),
    })
}

/// Hangs `node` under the folder open at `node.depth - 1`.
///
/// `open[d]` is the position of the most recent folder at depth `d` within its parent. Any
/// entry at depth `d` closes everything from `d` on, so nothing can be nested under a file.
fn attach(tree: &mut Tree, open: &mut Vec<usize>, node: Node) -> Result<(), ParseError> {
    if node.depth > open.len() {
        return Err(ParseError::OrphanNode {
            line: node.line,
            name: node.name,
            depth: node.depth,
        });
    }

    open.truncate(node.depth);

    if tree.children_at(open.as_slice()).contains_key(&node.name) {
        return Err(ParseError::DuplicateName {
            line: node.line,
            name: node.name,
            parent: tree.path_of(open.as_slice()),
        });
    }

    let is_folder = node.is_folder();
    let (index, _) = tree
        .children_at_mut(open.as_slice())
        .insert_full(node.name.clone(), node);

    if is_folder {
        open.push(index);
    }

    Ok(())
}

/// Parses outline lines into a [`Tree`], stopping at the first error.
pub fn parse<S: AsRef<str>>(lines: &[S], options: &ParseOptions) -> Result<Tree, ParseError> {
    let entries: Vec<Entry<'_>> = lines
        .iter()
        .enumerate()
        .filter_map(|(index, line)| significant(index, line.as_ref()))
        .collect();

    let width = match options.indent_width {
        Some(width) => width.get(),
        None => {
            let width = infer_from_entries(&entries);
            log::debug!("inferred an indent width of {}", width);
            width
        }
    };

    log::debug!("checking names against the {} policy", options.names);

    let mut tree = Tree::default();
    let mut open: Vec<usize> = Vec::new();

    for entry in &entries {
        let node = build_node(entry, width, options.names)?;
        attach(&mut tree, &mut open, node)?;
    }

    log::debug!(
        "parsed {} entries from {} lines",
        entries.len(),
        lines.len()
    );

    Ok(tree)
}

/// Like [`parse`], for a whole document. A leading byte order mark is ignored.
pub fn parse_str(text: &str, options: &ParseOptions) -> Result<Tree, ParseError> {
    let lines: Vec<&str> = strip_bom(text).lines().collect();

    parse(&lines, options)
}

/// Renders `tree` back into outline text, indenting each level by `width` spaces.
pub fn render(tree: &Tree, width: NonZeroUsize) -> String {
    fn render_level(children: &IndexMap<String, Node>, depth: usize, width: usize, out: &mut String) {
        for node in children.values() {
            out.push_str(&" ".repeat(depth * width));
            out.push_str(&node.name);
            if node.is_folder() {
                out.push('/');
            }
            out.push('\n');
            render_level(&node.children, depth + 1, width, out);
        }
    }

    let mut out = String::new();
    render_level(&tree.children, 0, width.get(), &mut out);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn width(n: usize) -> ParseOptions {
        ParseOptions {
            indent_width: NonZeroUsize::new(n),
            names: NamePolicy::Portable,
        }
    }

    fn shape(tree: &Tree) -> Vec<(usize, &str, NodeKind)> {
        tree.nodes()
            .into_iter()
            .map(|node| (node.depth, node.name.as_str(), node.kind))
            .collect()
    }

    #[test]
    fn test_parses_nested_outline() {
        let text = "my-project/\n  src/\n    main.py\n  README.md\n";
        let tree = parse_str(text, &width(2)).unwrap();

        assert_eq!(
            shape(&tree),
            vec![
                (0, "my-project", NodeKind::Folder),
                (1, "src", NodeKind::Folder),
                (2, "main.py", NodeKind::File),
                (1, "README.md", NodeKind::File),
            ]
        );
        let project = &tree.children["my-project"];
        assert_eq!(project.children.len(), 2);
        assert_eq!(project.children["src"].children["main.py"].line, 3);
    }

    #[test]
    fn test_rejects_indent_that_is_not_a_multiple_of_width() {
        let error = parse_str("a/\n   b.txt\n", &width(2)).unwrap_err();

        assert_eq!(
            error,
            ParseError::BadIndent {
                line: 2,
                found: 3,
                width: 2
            }
        );
        assert_eq!(error.kind(), ParseErrorKind::BadIndent);
    }

    #[test]
    fn test_rejects_skipped_levels() {
        let error = parse_str("a/\n    b.txt\n", &width(2)).unwrap_err();

        assert_eq!(error.kind(), ParseErrorKind::OrphanNode);
        assert_eq!(error.line(), 2);
    }

    #[test]
    fn test_rejects_entries_nested_under_a_file() {
        let error = parse_str("a/\n  b.txt\n    c.txt\n", &width(2)).unwrap_err();

        assert_eq!(
            error,
            ParseError::OrphanNode {
                line: 3,
                name: "c.txt".to_string(),
                depth: 2
            }
        );
    }

    #[test]
    fn test_file_closes_its_own_depth() {
        let error = parse_str("a/\n  b/\n  c.txt\n    d.txt\n", &width(2)).unwrap_err();

        assert_eq!(
            error,
            ParseError::OrphanNode {
                line: 4,
                name: "d.txt".to_string(),
                depth: 2
            }
        );

        let tree = parse_str("a/\n  b/\n  c.txt\n  d/\n    e.txt\n", &width(2)).unwrap();
        let a = &tree.children["a"];
        assert!(a.children["b"].children.is_empty());
        assert!(a.children["d"].children.contains_key("e.txt"));
    }

    #[test]
    fn test_shallower_sibling_closes_deeper_subtree() {
        let text = "a/\n  b/\nc.txt\n    d.txt\n";
        let error = parse_str(text, &width(2)).unwrap_err();

        assert_eq!(error.kind(), ParseErrorKind::OrphanNode);
        assert_eq!(error.line(), 4);

        let tree = parse_str("a/\n  b/\n    c.txt\n  d.txt\ne/\n", &width(2)).unwrap();
        assert_eq!(
            shape(&tree),
            vec![
                (0, "a", NodeKind::Folder),
                (1, "b", NodeKind::Folder),
                (2, "c.txt", NodeKind::File),
                (1, "d.txt", NodeKind::File),
                (0, "e", NodeKind::Folder),
            ]
        );
    }

    #[test]
    fn test_rejects_duplicate_siblings() {
        let error = parse_str("a/\n  b/\n    x\n    x/\n", &width(2)).unwrap_err();

        assert_eq!(
            error,
            ParseError::DuplicateName {
                line: 4,
                name: "x".to_string(),
                parent: PathBuf::from("a").join("b"),
            }
        );

        let error = parse_str("x\nx\n", &width(2)).unwrap_err();
        assert!(error.to_string().contains("in '.'"));
    }

    #[test]
    fn test_same_name_in_different_folders_is_fine() {
        let tree = parse_str("a/\n  mod.rs\nb/\n  mod.rs\n", &width(2)).unwrap();

        assert_eq!(tree.nodes().len(), 4);
    }

    #[test]
    fn test_comments_and_blank_lines_are_ignored() {
        let plain = parse_str("a/\n  b.txt\n  c/\n", &width(2)).unwrap();
        let noisy = parse_str(
            "# layout\n\na/\n      # indented comment\n  b.txt\n\n   \n  c/\n# end\n",
            &width(2),
        )
        .unwrap();

        assert_eq!(shape(&plain), shape(&noisy));
    }

    #[test]
    fn test_strips_trailing_comments_but_keeps_hash_in_names() {
        let tree = parse_str("src/   # sources\n  main.rs # entry\n  c#.txt\n", &width(2)).unwrap();

        assert_eq!(
            shape(&tree),
            vec![
                (0, "src", NodeKind::Folder),
                (1, "main.rs", NodeKind::File),
                (1, "c#.txt", NodeKind::File),
            ]
        );
    }

    fn inferred(lines: &[&str]) -> usize {
        let entries: Vec<Entry<'_>> = lines
            .iter()
            .enumerate()
            .filter_map(|(index, line)| significant(index, line))
            .collect();

        infer_from_entries(&entries)
    }

    #[test]
    fn test_infers_indent_width() {
        assert_eq!(inferred(&["a/", "    b/", "        c"]), 4);
        assert_eq!(inferred(&["a", "b"]), DEFAULT_INDENT_WIDTH);
        assert_eq!(inferred(&["a/", "      # odd comment", "  b"]), 2);

        let tree = parse_str("a/\n    b/\n        c\n", &ParseOptions::default()).unwrap();
        assert_eq!(tree.nodes()[2].depth, 2);
    }

    #[test]
    fn test_tabs_count_as_single_characters() {
        let tree = parse_str("a/\n\tb/\n\t\tc\n", &width(1)).unwrap();

        assert_eq!(tree.nodes()[2].depth, 2);
    }

    #[test]
    fn test_handles_crlf_line_endings() {
        let tree = parse_str("a/\r\n  b.txt\r\n", &width(2)).unwrap();

        assert_eq!(
            shape(&tree),
            vec![(0, "a", NodeKind::Folder), (1, "b.txt", NodeKind::File)]
        );
    }

    #[test]
    fn test_rejects_invalid_names() {
        let error = parse_str("a/\n  /\n", &width(2)).unwrap_err();
        assert_eq!(
            error,
            ParseError::InvalidName {
                line: 2,
                name: String::new(),
                reason: NameViolation::Empty
            }
        );

        let error = parse_str("../\n", &width(2)).unwrap_err();
        assert_eq!(error.kind(), ParseErrorKind::InvalidName);

        let error = parse_str("a/b.txt\n", &width(2)).unwrap_err();
        assert!(matches!(
            error,
            ParseError::InvalidName {
                reason: NameViolation::Separator('/'),
                ..
            }
        ));

        let error = parse_str("what?.txt\n", &width(2)).unwrap_err();
        assert_eq!(error.kind(), ParseErrorKind::InvalidName);
    }

    #[test]
    fn test_backslash_marks_a_folder() {
        let tree = parse_str("docs\\\n  index.md\n", &width(2)).unwrap();

        assert!(tree.children["docs"].is_folder());
    }

    #[test]
    fn test_backslash_is_part_of_the_name_under_posix() {
        let options = ParseOptions {
            indent_width: NonZeroUsize::new(2),
            names: NamePolicy::Posix,
        };

        let tree = parse_str("notes\\\n", &options).unwrap();

        assert_eq!(shape(&tree), vec![(0, "notes\\", NodeKind::File)]);

        let error = parse_str("notes\\\n  todo.txt\n", &options).unwrap_err();
        assert_eq!(error.kind(), ParseErrorKind::OrphanNode);
    }

    #[test]
    fn test_ignores_byte_order_mark() {
        let tree = parse_str("\u{feff}a/\n  b.txt\n", &width(2)).unwrap();

        assert_eq!(
            shape(&tree),
            vec![(0, "a", NodeKind::Folder), (1, "b.txt", NodeKind::File)]
        );
    }

    #[test]
    fn test_render_then_parse_preserves_structure() {
        let text = "app/\n  src/\n    lib.rs\n  empty/\nREADME.md\n";
        let tree = parse_str(text, &width(2)).unwrap();
        let four = NonZeroUsize::new(4).unwrap();

        let rendered = render(&tree, four);
        assert_eq!(
            rendered,
            "app/\n    src/\n        lib.rs\n    empty/\nREADME.md\n"
        );
        let reparsed = parse_str(&rendered, &width(4)).unwrap();
        assert_eq!(shape(&tree), shape(&reparsed));
    }

    #[test]
    fn test_empty_outline_is_an_empty_tree() {
        let tree = parse_str("# nothing here\n\n", &ParseOptions::default()).unwrap();

        assert!(tree.is_empty());
    }
}
