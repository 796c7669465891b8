//! Change notifications and candidate extraction
//!
//! A change notification describes one insert, update or delete on a
//! database record. The [`AssetFieldMap`] says which fields of which record
//! kinds hold delivery URLs; [`normalize`] uses it to find the URLs a change
//! left unreferenced.

use orb_common::OrbError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::{collections::BTreeMap, collections::HashSet, fmt, str::FromStr};

/// Field values of a record as delivered by the database webhook
pub type FieldValues = Map<String, Value>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ChangeType {
    Insert,
    Update,
    Delete,
}

impl fmt::Display for ChangeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChangeType::Insert => f.write_str("INSERT"),
            ChangeType::Update => f.write_str("UPDATE"),
            ChangeType::Delete => f.write_str("DELETE"),
        }
    }
}

/// Inbound webhook payload.
///
/// `old_record` is absent on insert and `record` is absent on delete.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeNotification {
    #[serde(rename = "type")]
    pub change: ChangeType,
    pub table: String,
    #[serde(default)]
    pub record: Option<FieldValues>,
    #[serde(default)]
    pub old_record: Option<FieldValues>,
}

/// Record kind -> ordered asset-bearing field names.
///
/// Parsed from `kind=field,field;kind=field`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssetFieldMap(BTreeMap<String, Vec<String>>);

impl Default for AssetFieldMap {
    fn default() -> Self {
        Self::new()
            .with_kind("menu_items", ["primary_image"])
            .with_kind("shops", ["logo_url", "banner_url"])
    }
}

impl AssetFieldMap {
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    pub fn with_kind<I, S>(mut self, kind: impl Into<String>, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.0
            .insert(kind.into(), fields.into_iter().map(Into::into).collect());
        self
    }

    pub fn supports(&self, kind: &str) -> bool {
        self.0.contains_key(kind)
    }

    /// Asset fields of `kind`; empty for kinds that are not managed.
    pub fn fields_for(&self, kind: &str) -> &[String] {
        self.0.get(kind).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn kinds(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }
}

impl FromStr for AssetFieldMap {
    type Err = OrbError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut map = AssetFieldMap::new();

        for entry in s.split(';').map(str::trim).filter(|e| !e.is_empty()) {
            let (kind, fields) = entry.split_once('=').ok_or_else(|| {
                OrbError::Config(format!("Field map entry '{}' must look like kind=field,...", entry))
            })?;

            let kind = kind.trim();
            if kind.is_empty() {
                return Err(OrbError::Config(format!("Field map entry '{}' has no record kind", entry)));
            }
            if map.supports(kind) {
                return Err(OrbError::Config(format!("Record kind '{}' is listed twice", kind)));
            }

            let fields: Vec<String> = fields
                .split(',')
                .map(str::trim)
                .filter(|f| !f.is_empty())
                .map(str::to_string)
                .collect();
            if fields.is_empty() {
                return Err(OrbError::Config(format!("Record kind '{}' lists no fields", kind)));
            }

            map = map.with_kind(kind, fields);
        }

        Ok(map)
    }
}

/// URLs orphaned by `notification`, in field order and without duplicates.
///
/// - DELETE: every non-empty old value.
/// - UPDATE: old values that are non-empty and differ from the new value.
/// - INSERT and unmanaged kinds: nothing.
pub fn normalize(notification: &ChangeNotification, field_map: &AssetFieldMap) -> Vec<String> {
    let fields = field_map.fields_for(&notification.table);
    let Some(old) = notification.old_record.as_ref() else {
        return Vec::new();
    };

    let mut seen = HashSet::new();
    let mut candidates = Vec::new();

    for field in fields {
        let Some(old_url) = non_empty_str(old.get(field)) else {
            continue;
        };

        let orphaned = match notification.change {
            ChangeType::Insert => false,
            ChangeType::Delete => true,
            ChangeType::Update => {
                let new_value = notification.record.as_ref().and_then(|r| r.get(field));
                new_value.and_then(Value::as_str) != Some(old_url)
            },
        };

        if orphaned && seen.insert(old_url) {
            candidates.push(old_url.to_string());
        }
    }

    candidates
}

fn non_empty_str(value: Option<&Value>) -> Option<&str> {
    value.and_then(Value::as_str).filter(|s| !s.is_empty())
}
