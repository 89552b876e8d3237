use crate::outline::{Node, Tree};
use colored::Colorize;
use indexmap::IndexMap;

/// Draws one level of the tree with ASCII connectors.
fn render_children(children: &IndexMap<String, Node>, prefix: &str, out: &mut String) {
    let len = children.len();

    for (i, node) in children.values().enumerate() {
        let is_last = i == len - 1;

        let connector = if is_last { "└── " } else { "├── " };
        let name = if node.is_folder() {
            format!("{}/", node.name).blue()
        } else {
            node.name.green()
        };
        out.push_str(&format!("{}{}{}\n", prefix.yellow(), connector.yellow(), name));

        let child_prefix = if is_last {
            format!("{}    ", prefix)
        } else {
            format!("{}│   ", prefix)
        };

        render_children(&node.children, &child_prefix, out);
    }
}

/// Renders `tree` below a `root_label` line, the way `tree(1)` would.
pub fn render_tree(tree: &Tree, root_label: &str) -> String {
    let mut out = format!("{}\n", root_label.bold().blue());

    render_children(&tree.children, "", &mut out);

    out
}

pub fn preview_as_tree(tree: &Tree, root_label: &str) {
    println!(
        "Legend: {} = (directory), {} = (file)",
        "blue".blue(),
        "green".green()
    );

    let fancy_prompt = format!(
        "{} {}\n",
        "┌─".bold().bright_blue(),
        "Preview".bold().bright_blue(),
    );

    println!("{}", fancy_prompt);

    print!("{}", render_tree(tree, root_label));

    println!("\n{}", "└─".bold().bright_blue());
}
