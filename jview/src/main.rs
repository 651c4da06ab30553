//! `jview`: inspect and edit JSON/TOML documents as a schema-guided tree.

use std::{collections::HashSet, path::PathBuf};

use anyhow::{Context, Result, anyhow};
use clap::{Parser, Subcommand};
use colored::{ColoredString, Colorize};
use jsonview::data::{Data, Document, Key, Node, NodeId, TreeOptions, Variant};
use log::info;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Data file (`.json` or `.toml`).
    file: PathBuf,

    /// Schema file. Defaults to `<name>-schema.json` next to the data file.
    #[arg(short, long)]
    schema: Option<PathBuf>,

    /// Refuse key renames.
    #[arg(long)]
    read_only_keys: bool,

    /// Refuse value edits.
    #[arg(long)]
    read_only_values: bool,

    #[command(subcommand)]
    command: Option<Cmd>,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Print the whole tree.
    Show,
    /// Print one node and its details.
    Get { path: String },
    /// Commit a value. Accepts JSON; anything else is taken as a string.
    Set { path: String, value: String },
    /// Append a child to a list or map.
    Add {
        path: String,
        /// Key of the new map entry.
        #[arg(short, long)]
        key: Option<String>,
        value: String,
    },
    /// Remove a node.
    Rm { path: String },
    /// Restore the schema or variant default.
    Reset { path: String },
    /// Rename a map entry.
    Rename { path: String, new_key: String },
    /// Print only nodes matching a pattern and the paths leading to them.
    Filter {
        pattern: String,
        /// Keep the whole subtree of a matching node.
        #[arg(short = 'a', long)]
        keep_ancestors: bool,
        #[arg(short = 'c', long)]
        case_sensitive: bool,
    },
    /// Print the serialized document as JSON.
    Dump,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    let options = TreeOptions {
        editable_keys: !cli.read_only_keys,
        editable_values: !cli.read_only_values,
    };
    let mut doc = Document::open(&cli.file, cli.schema.as_ref(), options)?;

    match cli.command.unwrap_or(Cmd::Show) {
        Cmd::Show => print_tree(doc.tree.root(), 0, None),
        Cmd::Get { path } => {
            let node = find(&doc, &path)?;
            print_details(node);
        }
        Cmd::Set { path, value } => {
            let id = find(&doc, &path)?.id;
            doc.commit_value(id, parse_value(&value))?;
        }
        Cmd::Add { path, key, value } => {
            let parent = find(&doc, &path)?.id;
            let id = doc.add_child(parent, key.as_deref(), &parse_value(&value))?;
            info!("added {}", doc.tree.path_of(id).unwrap_or_default());
        }
        Cmd::Rm { path } => {
            let (parent, key) = parent_and_key(&doc, &path)?;
            doc.remove_child(parent, &key)?;
        }
        Cmd::Reset { path } => {
            let id = find(&doc, &path)?.id;
            doc.reset_value(id)?;
        }
        Cmd::Rename { path, new_key } => {
            let id = find(&doc, &path)?.id;
            doc.rename_key(id, &new_key)?;
        }
        Cmd::Filter {
            pattern,
            keep_ancestors,
            case_sensitive,
        } => {
            doc.filter.set_case_sensitive(case_sensitive)?;
            doc.set_pattern(&pattern)?;
            doc.set_keep_ancestors_visible(keep_ancestors);
            let visible = doc.visible();
            print_tree(doc.tree.root(), 0, Some(&visible));
        }
        Cmd::Dump => {
            println!("{}", serde_json::to_string_pretty(&doc.serialize_all())?);
        }
    }

    if doc.needs_save {
        doc.save()?;
        println!("{} {}", "saved".green(), cli.file.display());
    }
    Ok(())
}

fn find<'a>(doc: &'a Document, path: &str) -> Result<&'a Node> {
    doc.tree
        .get_by_path(path)
        .ok_or_else(|| anyhow!("no node at `{path}`"))
}

/// Parent id and child key for a dot-separated path.
fn parent_and_key(doc: &Document, path: &str) -> Result<(NodeId, Key)> {
    let (parent_path, last) = split_path(path);
    let parent = find(doc, parent_path)?;
    let key = match parent.raw {
        Data::List(_) => Key::Index(
            last.parse()
                .with_context(|| format!("`{last}` is not a list index"))?,
        ),
        _ => Key::Name(last.to_string()),
    };
    Ok((parent.id, key))
}

fn split_path(path: &str) -> (&str, &str) {
    match path.rsplit_once('.') {
        Some((parent, last)) => (parent, last),
        None => ("", path),
    }
}

fn parse_value(s: &str) -> Data {
    serde_json::from_str::<serde_json::Value>(s)
        .map(Data::from)
        .unwrap_or_else(|_| Data::Str(s.to_string()))
}

fn styled_value(node: &Node) -> ColoredString {
    let text = node.display.as_str();
    let styled = match node.variant {
        Variant::String => text.green(),
        Variant::Url | Variant::Filepath => text.green().underline(),
        Variant::Integer | Variant::Float => text.cyan(),
        Variant::Boolean => text.yellow(),
        Variant::None => text.magenta(),
        Variant::Range | Variant::Choice => text.blue(),
        Variant::Any => text.red(),
        _ => text.normal(),
    };
    if node.editable_value {
        styled
    } else {
        styled.dimmed()
    }
}

fn print_tree(node: &Node, depth: usize, visible: Option<&HashSet<NodeId>>) {
    if !matches!(node.key, Key::Root) {
        if visible.is_some_and(|v| !v.contains(&node.id)) {
            return;
        }
        let indent = "  ".repeat(depth);
        let key = match node.key {
            Key::Index(i) => format!("[{i}]"),
            _ => node.key.to_string(),
        };
        if node.is_container() && !node.keeps_raw_value() {
            println!(
                "{indent}{} {}",
                key.bold(),
                format!("<{}>", node.variant_label()).dimmed()
            );
        } else {
            println!("{indent}{}: {}", key.bold(), styled_value(node));
        }
    }
    let depth = if matches!(node.key, Key::Root) {
        depth
    } else {
        depth + 1
    };
    for child in &node.children {
        print_tree(child, depth, visible);
    }
}

fn print_details(node: &Node) {
    println!("{:<10}{}", "key", node.key);
    println!("{:<10}{}", "variant", node.variant_label());
    println!("{:<10}{}", "value", styled_value(node));
    println!("{:<10}{}", "raw", node.copy_text());
    println!("{:<10}{}", "tooltip", node.tooltip());
    println!(
        "{:<10}key: {}, value: {}",
        "editable", node.editable_key, node.editable_value
    );
    if node.schema.default.is_some() {
        println!("{:<10}{}", "default", node.is_default());
    }
    if node.is_container() {
        println!("{:<10}{}", "children", node.children.len());
    }
}
