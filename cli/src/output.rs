//! Output formatting for flag trees and bound messages.

use protoflag_core::{BranchFlag, Cardinality, FlagTree, LeafFlag, LeafKind, MessageValue};
use serde::{Deserialize, Serialize};

/// Formats for `inspect`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Json,
    Yaml,
    Markdown,
    Table,
}

/// Formats for `parse`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ValueFormat {
    Json,
    Yaml,
}

/// Formats a compiled tree in the requested output format.
pub fn format_tree(tree: &FlagTree, format: OutputFormat) -> Result<String, String> {
    match format {
        OutputFormat::Json => serde_json::to_string_pretty(tree)
            .map_err(|e| format!("JSON serialization failed: {e}")),
        OutputFormat::Yaml => {
            serde_yaml::to_string(tree).map_err(|e| format!("YAML serialization failed: {e}"))
        }
        OutputFormat::Markdown => Ok(tree_to_markdown(tree)),
        OutputFormat::Table => Ok(tree_to_table(tree)),
    }
}

/// Formats a bound message in the requested output format.
pub fn format_message(message: &MessageValue, format: ValueFormat) -> Result<String, String> {
    let json = message.to_json();
    match format {
        ValueFormat::Json => serde_json::to_string_pretty(&json)
            .map_err(|e| format!("JSON serialization failed: {e}")),
        ValueFormat::Yaml => {
            serde_yaml::to_string(&json).map_err(|e| format!("YAML serialization failed: {e}"))
        }
    }
}

fn kind_label(kind: &LeafKind) -> String {
    match kind {
        LeafKind::Enum(spec) => format!("enum {}", spec.name),
        other => other.name().to_string(),
    }
}

fn cardinality_label(cardinality: &Cardinality) -> String {
    match cardinality {
        Cardinality::Singular => String::new(),
        Cardinality::Repeated => "repeated".to_string(),
        Cardinality::Optional => "optional".to_string(),
        Cardinality::OneofMember(group) => format!("oneof {group}"),
    }
}

fn tree_to_markdown(tree: &FlagTree) -> String {
    let mut out = String::new();
    write_markdown_level(&mut out, tree, "");
    out
}

fn write_markdown_level(out: &mut String, tree: &FlagTree, prefix: &str) {
    if prefix.is_empty() {
        out.push_str(&format!("# {}\n\n", tree.message));
    } else {
        out.push_str(&format!("## {prefix} ({})\n\n", tree.message));
    }

    if let Some(ref desc) = tree.description {
        out.push_str(&format!("{desc}\n\n"));
    }

    let leaves: Vec<&LeafFlag> = tree.leaves().collect();
    if !leaves.is_empty() {
        out.push_str("| Flag | Type | Cardinality | Required | Default | Description |\n");
        out.push_str("|------|------|-------------|----------|---------|-------------|\n");
        for leaf in leaves {
            let required = if leaf.required { "yes" } else { "no" };
            let default = leaf
                .default_raw
                .as_deref()
                .map(|d| format!("`{d}`"))
                .unwrap_or_default();
            let desc = leaf.description.as_deref().unwrap_or("");
            out.push_str(&format!(
                "| `--{}` | {} | {} | {required} | {default} | {desc} |\n",
                leaf.name,
                kind_label(&leaf.kind),
                cardinality_label(&leaf.cardinality),
            ));
        }
        out.push('\n');
    }

    let branches: Vec<&BranchFlag> = tree.branches().collect();
    if !branches.is_empty() {
        out.push_str("| Boundary | Message | Cardinality | Required | Description |\n");
        out.push_str("|----------|---------|-------------|----------|-------------|\n");
        for branch in &branches {
            let required = if branch.required { "yes" } else { "no" };
            let desc = branch.description.as_deref().unwrap_or("");
            out.push_str(&format!(
                "| `{}` | {} | {} | {required} | {desc} |\n",
                branch.name,
                branch.message,
                cardinality_label(&branch.cardinality),
            ));
        }
        out.push('\n');

        for branch in branches {
            let path = if prefix.is_empty() {
                branch.name.clone()
            } else {
                format!("{prefix} {}", branch.name)
            };
            write_markdown_level(out, &branch.child, &path);
        }
    }
}

fn tree_to_table(tree: &FlagTree) -> String {
    let mut out = String::new();
    out.push_str(&format!("Message: {}  Depth: {}\n", tree.message, tree.depth()));
    if let Some(ref desc) = tree.description {
        out.push_str(&format!("  {desc}\n"));
    }
    write_table_level(&mut out, tree, 1);
    out
}

fn write_table_level(out: &mut String, tree: &FlagTree, indent: usize) {
    let pad = "  ".repeat(indent);

    let rows: Vec<(String, &str)> = tree
        .leaves()
        .map(|leaf| {
            let mut name = format!("--{} <{}>", leaf.name, kind_label(&leaf.kind));
            let card = cardinality_label(&leaf.cardinality);
            if !card.is_empty() {
                name.push_str(&format!(" [{card}]"));
            }
            if leaf.required {
                name.push_str(" (required)");
            }
            (name, leaf.description.as_deref().unwrap_or(""))
        })
        .collect();
    let width = rows.iter().map(|(name, _)| name.len()).max().unwrap_or(4);
    for (name, desc) in &rows {
        out.push_str(format!("{pad}{name:<width$}  {desc}").trim_end());
        out.push('\n');
    }

    for branch in tree.branches() {
        let card = cardinality_label(&branch.cardinality);
        let card = if card.is_empty() { String::new() } else { format!(" [{card}]") };
        out.push_str(&format!("{pad}{} -> {}{card}\n", branch.name, branch.message));
        write_table_level(out, &branch.child, indent + 1);
    }
}
