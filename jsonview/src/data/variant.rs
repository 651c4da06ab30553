//! Value variants: classification, display, editing and serialization rules.
//!
//! Builtin variants form a closed sum type. Extensions plug in through
//! [`VariantExt`] and are carried by [`Variant::Extension`].

use std::{fmt, sync::Arc};

use crate::{
    data::value::{Data, Key, Map},
    error::{Result, TreeError},
};

/// Keys of a range compound value, in display order.
pub const RANGE_KEYS: [&str; 3] = ["start", "end", "step"];

/// Keys of a choice compound value.
pub const CHOICE_KEYS: [&str; 2] = ["value", "choices"];

/// Display text of a `None` node.
pub const NONE_LABEL: &str = "None";

/// User-defined variant.
///
/// Only `name` is required; an extension that keeps the default `matches`
/// is reached through an explicit schema `type` only. Returning a value from
/// `empty_container` turns the extension into a container: its children are
/// built from `descend` and serialized into a copy of that empty value.
pub trait VariantExt: fmt::Debug + Send + Sync {
    /// Name used by schema `type` fields.
    fn name(&self) -> &str;

    fn matches(&self, _data: &Data) -> bool {
        false
    }

    /// Fresh value children are serialized into. Must be a list or a map.
    fn empty_container(&self) -> Option<Data> {
        None
    }

    fn is_container(&self) -> bool {
        self.empty_container().is_some()
    }

    /// Child entries of `data`, `None` if it cannot be descended.
    fn descend<'d>(&self, data: &'d Data) -> Option<Vec<(Key, &'d Data)>> {
        entries(data)
    }

    /// Value used by a reset when the schema gives no default.
    fn default_value(&self) -> Data {
        Data::Null
    }

    fn display(&self, data: &Data) -> String {
        data.label()
    }

    /// Validate a committed value against the current one.
    ///
    /// Returns the new raw value or a description of what was expected.
    fn accept(&self, _current: &Data, new: &Data) -> std::result::Result<Data, String> {
        Ok(new.clone())
    }

    /// Value written back by the serializer.
    fn to_data(&self, raw: &Data) -> Data {
        raw.clone()
    }
}

/// Leaf variant created for schema types nobody registered.
///
/// It never matches by predicate and passes its value through unchanged.
#[derive(Debug)]
pub struct Opaque {
    name: String,
}

impl Opaque {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl VariantExt for Opaque {
    fn name(&self) -> &str {
        &self.name
    }
}

/// A named behaviour bundle for one shape of value.
#[derive(Debug, Clone)]
pub enum Variant {
    None,
    /// `http://`, `https://` or `file://` strings.
    Url,
    /// Absolute POSIX paths and drive-letter Windows paths.
    Filepath,
    String,
    Integer,
    Float,
    Boolean,
    List,
    /// `{start, end, step}` shown as one composite leaf.
    Range,
    /// `{value, choices}` shown as a single selection.
    Choice,
    OrderedMap,
    Map,
    /// Catch-all. Serializes to the string label, so it is never editable.
    Any,
    Extension(Arc<dyn VariantExt>),
}

impl PartialEq for Variant {
    fn eq(&self, other: &Self) -> bool {
        self.name() == other.name()
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Variant {
    /// Builtin variants in default priority order.
    ///
    /// Booleans come after integers here; that is safe because [`Data`]
    /// never represents a boolean as a number. Range and Choice precede the
    /// generic maps.
    pub fn builtins() -> Vec<Variant> {
        vec![
            Variant::None,
            Variant::Url,
            Variant::Filepath,
            Variant::String,
            Variant::Integer,
            Variant::Float,
            Variant::Boolean,
            Variant::List,
            Variant::Range,
            Variant::Choice,
            Variant::OrderedMap,
            Variant::Map,
            Variant::Any,
        ]
    }

    /// Builtin variant by schema name.
    pub fn from_name(name: &str) -> Option<Variant> {
        Self::builtins().into_iter().find(|v| v.name() == name)
    }

    pub fn name(&self) -> &str {
        match self {
            Variant::None => "None",
            Variant::Url => "Url",
            Variant::Filepath => "Filepath",
            Variant::String => "String",
            Variant::Integer => "Integer",
            Variant::Float => "Float",
            Variant::Boolean => "Boolean",
            Variant::List => "List",
            Variant::Range => "Range",
            Variant::Choice => "Choice",
            Variant::OrderedMap => "OrderedMap",
            Variant::Map => "Map",
            Variant::Any => "Any",
            Variant::Extension(ext) => ext.name(),
        }
    }

    pub fn matches(&self, data: &Data) -> bool {
        match self {
            Variant::None => matches!(data, Data::Null),
            Variant::Url => data.as_str().is_some_and(is_url),
            Variant::Filepath => data.as_str().is_some_and(is_filepath),
            Variant::String => matches!(data, Data::Str(_)),
            Variant::Integer => data.is_integer(),
            Variant::Float => matches!(data, Data::Float(_)),
            Variant::Boolean => matches!(data, Data::Bool(_)),
            Variant::List => matches!(data, Data::List(_)),
            Variant::Range => data.as_map().is_some_and(is_range_shape),
            Variant::Choice => data.as_map().is_some_and(is_choice_shape),
            Variant::OrderedMap => matches!(data, Data::OrderedMap(_)),
            Variant::Map => matches!(data, Data::Map(_)),
            Variant::Any => true,
            Variant::Extension(ext) => ext.matches(data),
        }
    }

    pub fn is_container(&self) -> bool {
        match self {
            Variant::List | Variant::Map | Variant::OrderedMap => true,
            Variant::Extension(ext) => ext.is_container(),
            _ => false,
        }
    }

    /// Fresh container of this variant, `None` for leaves.
    pub fn empty_container(&self) -> Option<Data> {
        match self {
            Variant::List => Some(Data::List(Vec::new())),
            Variant::Map => Some(Data::Map(Map::new())),
            Variant::OrderedMap => Some(Data::OrderedMap(Map::new())),
            Variant::Extension(ext) if ext.is_container() => ext.empty_container(),
            _ => None,
        }
    }

    /// Child entries of a container value in source order.
    ///
    /// `None` when `data` does not have this container's shape, as happens
    /// when a schema forces a container type onto a scalar.
    pub fn descend<'d>(&self, data: &'d Data) -> Option<Vec<(Key, &'d Data)>> {
        match (self, data) {
            (Variant::List, Data::List(_))
            | (Variant::Map | Variant::OrderedMap, Data::Map(_) | Data::OrderedMap(_)) => {
                entries(data)
            }
            (Variant::Extension(ext), _) if ext.is_container() => ext.descend(data),
            _ => None,
        }
    }

    /// Text shown for `data` in the value column.
    pub fn display(&self, data: &Data) -> String {
        match self {
            Variant::None => match data {
                Data::Null => NONE_LABEL.to_string(),
                other => other.label(),
            },
            _ if self.is_container() => String::new(),
            Variant::Range => match range_fields(data) {
                Some([start, end, step]) => {
                    format!("{}, {}, {}", start.label(), end.label(), step.label())
                }
                None => data.label(),
            },
            Variant::Choice => match data.as_map().and_then(|m| m.get("value")) {
                Some(value) => value.label(),
                None => data.label(),
            },
            Variant::Extension(ext) => ext.display(data),
            _ => data.label(),
        }
    }

    /// Whether nodes of this variant may ever have their value edited.
    pub fn is_value_editable(&self) -> bool {
        !self.is_container() && !matches!(self, Variant::Any)
    }

    /// Default value of this variant for resets.
    pub fn default_value(&self) -> Data {
        match self {
            Variant::None | Variant::Any => Data::Null,
            Variant::Url | Variant::Filepath | Variant::String => Data::Str(String::new()),
            Variant::Integer => Data::Int(0),
            Variant::Float => Data::Float(0.0),
            Variant::Boolean => Data::Bool(false),
            Variant::List => Data::List(Vec::new()),
            Variant::Range => Data::List(vec![Data::Int(0), Data::Int(1), Data::Int(1)]),
            // resolved against the node's own choices by the caller
            Variant::Choice => Data::Null,
            Variant::OrderedMap => Data::OrderedMap(Map::new()),
            Variant::Map => Data::Map(Map::new()),
            Variant::Extension(ext) => ext.default_value(),
        }
    }

    /// Validate `new` for a node currently holding `current`.
    ///
    /// Returns the new raw value. Nothing is mutated here, so a failed
    /// commit leaves the node as it was.
    pub fn accept(&self, path: &str, current: &Data, new: &Data) -> Result<Data> {
        let mismatch = |expected: &str| TreeError::TypeMismatch {
            path: path.to_string(),
            expected: expected.to_string(),
            actual: new.to_string(),
        };
        match self {
            Variant::None => match new {
                Data::Null | Data::Str(_) => Ok(new.clone()),
                _ => Err(mismatch("null or string")),
            },
            Variant::Url | Variant::Filepath | Variant::String => match new {
                Data::Str(_) => Ok(new.clone()),
                _ => Err(mismatch("string")),
            },
            Variant::Integer => match new {
                Data::Int(_) | Data::UInt(_) => Ok(new.clone()),
                _ => Err(mismatch("integer")),
            },
            Variant::Float => match new {
                Data::Float(_) => Ok(new.clone()),
                Data::Int(_) | Data::UInt(_) => Ok(Data::Float(new.as_f64().unwrap_or_default())),
                _ => Err(mismatch("float")),
            },
            Variant::Boolean => match new {
                Data::Bool(_) => Ok(new.clone()),
                _ => Err(mismatch("boolean")),
            },
            Variant::Range => accept_range(path, current, new),
            Variant::Choice => accept_choice(path, current, new),
            Variant::List | Variant::Map | Variant::OrderedMap => Err(TreeError::InvalidTarget {
                path: path.to_string(),
                reason: format!("{} nodes take structural edits only", self.name()),
            }),
            Variant::Any => Err(TreeError::NotEditable {
                path: path.to_string(),
            }),
            Variant::Extension(ext) if ext.is_container() => Err(TreeError::InvalidTarget {
                path: path.to_string(),
                reason: format!("{} nodes take structural edits only", self.name()),
            }),
            Variant::Extension(ext) => ext.accept(current, new).map_err(|e| mismatch(&e)),
        }
    }

    /// Leaf value written back by the serializer.
    ///
    /// Scalar variants re-type the node's value, so an explicit `String`
    /// type turns `5` into `"5"`. Choice values that fell out of their own
    /// choice list are repaired here.
    pub fn to_data(&self, raw: &Data, display: &str) -> Data {
        match self {
            Variant::None => match raw {
                Data::Null => Data::Null,
                _ if display == NONE_LABEL => Data::Null,
                _ => Data::Str(display.to_string()),
            },
            Variant::Url | Variant::Filepath | Variant::String => Data::Str(display.to_string()),
            Variant::Integer => match raw {
                Data::Int(_) | Data::UInt(_) => raw.clone(),
                _ => parse_integer(display).unwrap_or_else(|| raw.clone()),
            },
            Variant::Float => match raw {
                Data::Float(_) => raw.clone(),
                Data::Int(_) | Data::UInt(_) => Data::Float(raw.as_f64().unwrap_or_default()),
                _ => display.trim().parse().map(Data::Float).unwrap_or_else(|_| raw.clone()),
            },
            Variant::Boolean => match raw {
                Data::Bool(_) => raw.clone(),
                _ => display.trim().parse().map(Data::Bool).unwrap_or_else(|_| raw.clone()),
            },
            Variant::Range => raw.clone(),
            Variant::Choice => repair_choice(raw),
            Variant::Any => {
                if !matches!(raw, Data::Str(_)) {
                    debug!("lossy serialization of {} value as string", raw.kind());
                }
                Data::Str(display.to_string())
            }
            Variant::Extension(ext) => ext.to_data(raw),
            Variant::List | Variant::Map | Variant::OrderedMap => {
                self.empty_container().unwrap_or_default()
            }
        }
    }
}

/// Entries of any list or map value, `None` for scalars.
pub fn entries(data: &Data) -> Option<Vec<(Key, &Data)>> {
    match data {
        Data::List(items) => Some(
            items
                .iter()
                .enumerate()
                .map(|(i, v)| (Key::Index(i), v))
                .collect(),
        ),
        Data::Map(m) | Data::OrderedMap(m) => {
            Some(m.iter().map(|(k, v)| (Key::Name(k.clone()), v)).collect())
        }
        _ => None,
    }
}

fn parse_integer(s: &str) -> Option<Data> {
    let s = s.trim();
    s.parse::<i64>()
        .map(Data::Int)
        .or_else(|_| s.parse::<u64>().map(Data::UInt))
        .ok()
}

fn is_url(s: &str) -> bool {
    ["http://", "https://", "file://"]
        .iter()
        .any(|prefix| s.starts_with(prefix))
}

fn is_filepath(s: &str) -> bool {
    if s.starts_with('/') {
        return true;
    }
    let mut chars = s.chars();
    matches!(
        (chars.next(), chars.next(), chars.next()),
        (Some(drive), Some(':'), Some('\\')) if drive.is_ascii_uppercase()
    )
}

fn is_range_shape(m: &Map) -> bool {
    m.len() == RANGE_KEYS.len() && m.keys().all(|k| RANGE_KEYS.contains(&k.as_str()))
}

fn is_choice_shape(m: &Map) -> bool {
    m.len() == CHOICE_KEYS.len()
        && m.keys().all(|k| CHOICE_KEYS.contains(&k.as_str()))
        && matches!(m.get("choices"), Some(Data::List(_)))
}

/// `start`, `end` and `step` of a range value.
pub fn range_fields(data: &Data) -> Option<[&Data; 3]> {
    let m = data.as_map()?;
    Some([m.get("start")?, m.get("end")?, m.get("step")?])
}

/// Candidate values of a choice value.
pub fn choice_options(data: &Data) -> Option<&Vec<Data>> {
    data.as_map()?.get("choices")?.as_list()
}

/// Fit a committed number into the subtype of the field it replaces.
///
/// Integer fields accept integers and integral floats; anything with a
/// fractional part is rejected. Float fields accept any number.
fn retype_number(path: &str, field: &str, current: Option<&Data>, new: &Data) -> Result<Data> {
    let mismatch = |expected: &str| TreeError::TypeMismatch {
        path: format!("{path}.{field}"),
        expected: expected.to_string(),
        actual: new.to_string(),
    };
    let integer_field = current.is_some_and(Data::is_integer);
    match (current, new) {
        (_, Data::Int(_) | Data::UInt(_)) if integer_field => Ok(new.clone()),
        (_, Data::Float(f)) if integer_field => {
            if f.is_finite() && f.fract() == 0.0 && f.abs() < i64::MAX as f64 {
                Ok(Data::Int(*f as i64))
            } else {
                Err(mismatch("integer"))
            }
        }
        (Some(Data::Float(_)), Data::Int(_) | Data::UInt(_)) => {
            Ok(Data::Float(new.as_f64().unwrap_or_default()))
        }
        _ if new.is_number() => Ok(new.clone()),
        _ if integer_field => Err(mismatch("integer")),
        _ => Err(mismatch("number")),
    }
}

fn accept_range(path: &str, current: &Data, new: &Data) -> Result<Data> {
    let values: Vec<(&str, &Data)> = match new {
        Data::List(items) if items.len() == RANGE_KEYS.len() => {
            RANGE_KEYS.iter().copied().zip(items.iter()).collect()
        }
        Data::Map(m) | Data::OrderedMap(m) if is_range_shape(m) => {
            m.iter().map(|(k, v)| (k.as_str(), v)).collect()
        }
        _ => {
            return Err(TreeError::TypeMismatch {
                path: path.to_string(),
                expected: "{start, end, step} or [start, end, step]".to_string(),
                actual: new.to_string(),
            });
        }
    };

    // keep the map kind and key order of the value being replaced
    let mut out = match current {
        Data::Map(m) | Data::OrderedMap(m) if is_range_shape(m) => current.clone(),
        _ => Data::map(RANGE_KEYS.iter().map(|k| (*k, Data::Null))),
    };
    let Some(fields) = out.as_map_mut() else {
        return Err(TreeError::InvalidTarget {
            path: path.to_string(),
            reason: "range value is not a map".to_string(),
        });
    };

    let mut updated = Vec::with_capacity(values.len());
    for (field, value) in values {
        let current_field = current.as_map().and_then(|m| m.get(field));
        updated.push((field, retype_number(path, field, current_field, value)?));
    }
    for (field, value) in updated {
        fields.insert(field.to_string(), value);
    }
    Ok(out)
}

fn accept_choice(path: &str, current: &Data, new: &Data) -> Result<Data> {
    if let Some(m) = new.as_map()
        && is_choice_shape(m)
    {
        return Ok(new.clone());
    }

    let choices = choice_options(current).cloned().unwrap_or_default();
    if !choices.contains(new) {
        return Err(TreeError::TypeMismatch {
            path: path.to_string(),
            expected: format!("one of {}", Data::List(choices)),
            actual: new.to_string(),
        });
    }
    let mut out = current.clone();
    if let Some(m) = out.as_map_mut() {
        m.insert("value".to_string(), new.clone());
    }
    Ok(out)
}

/// Make sure the selected value is one of the choices.
///
/// A selection outside the list falls back to the first choice, or `null`
/// when there are none.
fn repair_choice(raw: &Data) -> Data {
    let Some(choices) = choice_options(raw) else {
        return raw.clone();
    };
    let selected = raw.as_map().and_then(|m| m.get("value"));
    if selected.is_some_and(|v| choices.contains(v)) {
        return raw.clone();
    }
    let fallback = choices.first().cloned().unwrap_or(Data::Null);
    warn!(
        "choice value {} is not among {}, using {}",
        selected.map(Data::to_string).unwrap_or_default(),
        Data::List(choices.clone()),
        fallback
    );
    let mut out = raw.clone();
    if let Some(m) = out.as_map_mut() {
        m.insert("value".to_string(), fallback);
    }
    out
}
