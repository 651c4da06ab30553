use std::{
    collections::HashSet,
    fs,
    path::{Path, PathBuf},
    time::SystemTime,
};

use anyhow::{Context, bail};

use crate::{
    data::{
        build::TreeOptions,
        node::{Node, NodeId},
        registry::Registry,
        schema::Schema,
        tree::Tree,
        value::{Data, Key},
    },
    error::Result,
    filter::Filter,
};

/// On-disk format of a data file, chosen by extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Json,
    Toml,
}

impl Format {
    pub fn from_path(path: &Path) -> anyhow::Result<Self> {
        let ext = path.extension().and_then(|s| s.to_str()).unwrap_or("");
        match ext {
            "json" => Ok(Format::Json),
            "toml" | "tml" => Ok(Format::Toml),
            _ => bail!("Unsupported data file extension: {ext:?}"),
        }
    }

    pub fn parse(self, content: &str) -> anyhow::Result<Data> {
        if content.trim().is_empty() {
            return Ok(Data::Map(Default::default()));
        }
        let data = match self {
            Format::Json => Data::from(serde_json::from_str::<serde_json::Value>(content)?),
            Format::Toml => toml_to_data(&toml::from_str::<toml::Value>(content)?),
        };
        Ok(data)
    }

    pub fn render(self, data: &Data) -> anyhow::Result<String> {
        let s = match self {
            Format::Json => serde_json::to_string_pretty(data)?,
            Format::Toml => toml::to_string_pretty(data)?,
        };
        Ok(s)
    }
}

/// TOML has no JSON counterpart for datetimes; they are kept as their
/// RFC 3339 text.
fn toml_to_data(value: &toml::Value) -> Data {
    match value {
        toml::Value::String(s) => Data::Str(s.clone()),
        toml::Value::Integer(i) => Data::Int(*i),
        toml::Value::Float(f) => Data::Float(*f),
        toml::Value::Boolean(b) => Data::Bool(*b),
        toml::Value::Datetime(dt) => Data::Str(dt.to_string()),
        toml::Value::Array(items) => Data::List(items.iter().map(toml_to_data).collect()),
        toml::Value::Table(table) => Data::Map(
            table
                .iter()
                .map(|(k, v)| (k.clone(), toml_to_data(v)))
                .collect(),
        ),
    }
}

/// Derive the schema path for a data file: `config.toml` → `config-schema.json`.
pub fn default_schema_by_data(path: &Path) -> PathBuf {
    let binding = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let mut name_split = binding.split('.').collect::<Vec<_>>();
    if name_split.len() > 1 {
        name_split.pop();
    }

    let name = format!("{}-schema.json", name_split.join("."));

    match path.parent() {
        Some(parent) => parent.join(name),
        None => PathBuf::from(name),
    }
}

/// An editing session: one tree, its registry and filter, and the file it
/// came from.
#[derive(Debug, Clone)]
pub struct Document {
    pub tree: Tree,
    pub registry: Registry,
    pub schema: Schema,
    pub filter: Filter,
    /// Data value the tree was built from, kept in sync after every edit
    /// when `auto_sync` is set.
    pub data: Data,
    pub auto_sync: bool,
    /// Whether the tree has edits not yet written by [`Document::save`].
    pub needs_save: bool,
    /// Backing file, if any.
    pub path: Option<PathBuf>,
}

impl Document {
    /// Session over an in-memory value.
    pub fn new(data: Data, schema: Schema, mut registry: Registry, options: TreeOptions) -> Self {
        let tree = Tree::build_with_options(&data, &schema, &mut registry, options);
        Self {
            tree,
            registry,
            schema,
            filter: Filter::new(),
            data,
            auto_sync: true,
            needs_save: false,
            path: None,
        }
    }

    /// Load a data file and its schema.
    ///
    /// Without an explicit schema, `<name>-schema.json` next to the data file
    /// is used when it exists. A missing data file starts an empty map.
    pub fn open(
        path: impl AsRef<Path>,
        schema: Option<impl AsRef<Path>>,
        options: TreeOptions,
    ) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let schema = match schema {
            Some(sch) => {
                let sch = sch.as_ref();
                if !sch.exists() {
                    bail!("Schema file does not exist: {}", sch.display());
                }
                Self::load_schema(sch)?
            }
            None => {
                let derived = default_schema_by_data(path);
                if derived.exists() {
                    Self::load_schema(&derived)?
                } else {
                    debug!("no schema at {}, building without one", derived.display());
                    Schema::default()
                }
            }
        };

        let content = if path.exists() {
            fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?
        } else {
            String::new()
        };
        Self::from_content(&content, path, schema, options)
    }

    /// Session over already loaded file content.
    pub fn from_content(
        content: &str,
        path: &Path,
        schema: Schema,
        options: TreeOptions,
    ) -> anyhow::Result<Self> {
        let data = Format::from_path(path)?
            .parse(content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        let mut doc = Self::new(data, schema, Registry::new(), options);
        doc.path = Some(path.to_path_buf());
        info!(
            "loaded {} ({} nodes)",
            path.display(),
            doc.tree.node_count()
        );
        Ok(doc)
    }

    fn load_schema(path: &Path) -> anyhow::Result<Schema> {
        let content = fs::read_to_string(path)?;
        Schema::parse(&content).with_context(|| format!("Failed to parse {}", path.display()))
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.tree.get(id)
    }

    pub fn commit_value(&mut self, id: NodeId, value: Data) -> Result<()> {
        self.tree.commit_value(id, value)?;
        self.edited();
        Ok(())
    }

    pub fn reset_value(&mut self, id: NodeId) -> Result<()> {
        self.tree.reset_value(id)?;
        self.edited();
        Ok(())
    }

    pub fn rename_key(&mut self, id: NodeId, new_key: &str) -> Result<()> {
        self.tree.rename_key(id, new_key)?;
        self.edited();
        Ok(())
    }

    pub fn add_child(&mut self, parent: NodeId, key: Option<&str>, value: &Data) -> Result<NodeId> {
        let id = self
            .tree
            .add_child(&mut self.registry, parent, key, value)?;
        self.edited();
        Ok(id)
    }

    pub fn remove_child(&mut self, parent: NodeId, key: &Key) -> Result<Node> {
        let removed = self.tree.remove_child(parent, key)?;
        self.edited();
        Ok(removed)
    }

    /// Regenerate the full data value from the tree.
    pub fn serialize_all(&self) -> Data {
        self.tree.serialize()
    }

    /// Refresh [`Document::data`] from the tree.
    pub fn sync(&mut self) {
        self.data = self.tree.serialize();
    }

    pub fn set_pattern(&mut self, pattern: &str) -> Result<()> {
        self.filter.set_pattern(pattern)
    }

    pub fn set_keep_ancestors_visible(&mut self, keep: bool) {
        self.filter.set_keep_ancestors_visible(keep);
    }

    /// Nodes shown under the current filter.
    pub fn visible(&self) -> HashSet<NodeId> {
        self.filter.visible(&self.tree)
    }

    fn edited(&mut self) {
        self.needs_save = true;
        if self.auto_sync {
            self.sync();
        }
    }

    /// Write pending changes back to the backing file.
    ///
    /// An existing file is first copied to a timestamped backup next to it.
    pub fn save(&mut self) -> anyhow::Result<()> {
        if !self.needs_save {
            return Ok(());
        }
        let Some(path) = self.path.clone() else {
            bail!("Document has no backing file");
        };
        let format = Format::from_path(&path)?;
        let value = self.tree.serialize();
        let s = format.render(&value)?;

        if path.exists() {
            let backup_path = backup_path(&path)?;
            fs::copy(&path, &backup_path)?;
            debug!("backup written to {}", backup_path.display());
        }
        fs::write(&path, s).with_context(|| format!("Failed to write {}", path.display()))?;
        info!("saved {}", path.display());
        self.data = value;
        self.needs_save = false;
        Ok(())
    }
}

/// Free backup name next to `path`: `conf.bk-<secs>.json`, then
/// `conf.bk-<secs>-1.json` and so on for saves within the same second.
fn backup_path(path: &Path) -> anyhow::Result<PathBuf> {
    let ext = path.extension().and_then(|s| s.to_str()).unwrap_or("");
    let secs = SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)?
        .as_secs();

    let mut candidate = path.with_extension(format!("bk-{secs}.{ext}"));
    let mut n = 1;
    while candidate.exists() {
        candidate = path.with_extension(format!("bk-{secs}-{n}.{ext}"));
        n += 1;
    }
    Ok(candidate)
}
