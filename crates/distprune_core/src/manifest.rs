use serde_json::{Map, Value};
use std::collections::HashSet;

use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DependencyKind {
    Dependencies,
    DevDependencies,
    OptionalDependencies,
    PeerDependencies,
}

impl DependencyKind {
    pub const ALL: [DependencyKind; 4] = [
        DependencyKind::Dependencies,
        DependencyKind::DevDependencies,
        DependencyKind::OptionalDependencies,
        DependencyKind::PeerDependencies,
    ];

    pub fn field_name(self) -> &'static str {
        match self {
            DependencyKind::Dependencies => "dependencies",
            DependencyKind::DevDependencies => "devDependencies",
            DependencyKind::OptionalDependencies => "optionalDependencies",
            DependencyKind::PeerDependencies => "peerDependencies",
        }
    }

    fn is_dependency_field(key: &str) -> bool {
        Self::ALL.iter().any(|kind| kind.field_name() == key)
    }
}

/// Package name → version constraint, in manifest order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DependencyMap {
    entries: Vec<(String, String)>,
}

impl DependencyMap {
    fn from_value(kind: DependencyKind, value: &Value) -> Result<Self> {
        let field = kind.field_name();
        let object = value
            .as_object()
            .ok_or_else(|| Error::Manifest(format!("{field} must be an object")))?;
        let entries = object
            .iter()
            .map(|(name, version)| match version.as_str() {
                Some(v) => Ok((name.clone(), v.to_string())),
                None => Err(Error::Manifest(format!("{field}.{name} must be a string"))),
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { entries })
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries.iter().find(|(n, _)| n == name).map(|(_, v)| v.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Copy without the named packages, or `None` when nothing would remain.
    pub fn without(&self, remove: &HashSet<&str>) -> Option<DependencyMap> {
        let entries: Vec<_> =
            self.entries.iter().filter(|(name, _)| !remove.contains(name.as_str())).cloned().collect();
        if entries.is_empty() { None } else { Some(Self { entries }) }
    }

    fn to_value(&self) -> Value {
        let object: Map<String, Value> = self
            .entries
            .iter()
            .map(|(name, version)| (name.clone(), Value::String(version.clone())))
            .collect();
        Value::Object(object)
    }
}

impl<N: Into<String>, V: Into<String>> FromIterator<(N, V)> for DependencyMap {
    fn from_iter<I: IntoIterator<Item = (N, V)>>(iter: I) -> Self {
        Self { entries: iter.into_iter().map(|(n, v)| (n.into(), v.into())).collect() }
    }
}

/// A `package.json` whose dependency groups have been validated.
///
/// Every other field is kept as raw JSON, in its original order.
#[derive(Debug, Clone, PartialEq)]
pub struct Manifest {
    fields: Map<String, Value>,
    groups: Vec<(DependencyKind, DependencyMap)>,
}

impl Manifest {
    pub fn parse_str(content: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(content)
            .map_err(|e| Error::Manifest(format!("malformed JSON: {e}")))?;
        Self::from_value(value)
    }

    pub fn from_value(value: Value) -> Result<Self> {
        let Value::Object(fields) = value else {
            return Err(Error::Manifest("package.json must be an object".to_string()));
        };
        let mut groups = Vec::new();
        for kind in DependencyKind::ALL {
            if let Some(raw) = fields.get(kind.field_name()) {
                groups.push((kind, DependencyMap::from_value(kind, raw)?));
            }
        }
        Ok(Self { fields, groups })
    }

    pub fn field(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    pub fn group(&self, kind: DependencyKind) -> Option<&DependencyMap> {
        self.groups.iter().find(|(k, _)| *k == kind).map(|(_, map)| map)
    }

    pub fn group_names(&self, kind: DependencyKind) -> Vec<&str> {
        self.group(kind).map(|map| map.names().collect()).unwrap_or_default()
    }

    /// Same manifest with the dependency fields dropped and `groups` appended
    /// after every other field, in the given order.
    pub(crate) fn with_groups(&self, groups: Vec<(DependencyKind, DependencyMap)>) -> Manifest {
        let mut fields: Map<String, Value> = self
            .fields
            .iter()
            .filter(|(key, _)| !DependencyKind::is_dependency_field(key))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();
        for (kind, map) in &groups {
            fields.insert(kind.field_name().to_string(), map.to_value());
        }
        Manifest { fields, groups }
    }

    pub fn to_value(&self) -> Value {
        Value::Object(self.fields.clone())
    }
}
