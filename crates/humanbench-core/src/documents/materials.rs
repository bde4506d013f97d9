//! Material document model.
//!
//! One material file per sub-study:
//!
//! ```text
//! {
//!   "sub_study_id": "study_1_personality",
//!   "items": [
//!     { "id": "q1", "question": "...", "metadata": { "label": "Shy (self-rated)" } }
//!   ]
//! }
//! ```
//!
//! Items are free-form objects authored by a generator, so they are kept as
//! ordered JSON maps and only `id`, `metadata.label` and `metadata.gt_key` are
//! interpreted. Writing a file back reproduces every other field unchanged.

use super::read_document;
use crate::error::AlignmentError;
use serde::de::Error as _;
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Top-level field naming the sub-study.
const SUB_STUDY_ID_FIELD: &str = "sub_study_id";

/// Top-level field holding the item list.
const ITEMS_FIELD: &str = "items";

/// Metadata field holding the free-text label.
const LABEL_FIELD: &str = "label";

/// Metadata field receiving the resolved ground-truth key.
const GT_KEY_FIELD: &str = "gt_key";

/// A material document for one sub-study.
///
/// The whole top-level object is kept in document order. `sub_study_id` and
/// `items` are decoded for alignment and written back at their original
/// positions.
#[derive(Debug, Clone)]
pub struct MaterialFile {
    sub_study_id: String,
    pub items: Vec<MaterialItem>,
    /// Top-level object; the `items` entry is a placeholder while decoded
    document: Map<String, Value>,
    /// Where the file was loaded from (not serialized)
    pub path: Option<PathBuf>,
}

/// A single material item, stored as its original JSON object.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MaterialItem {
    fields: Map<String, Value>,
}

impl MaterialFile {
    /// Creates an in-memory material file (no backing path).
    pub fn new(sub_study_id: impl Into<String>, items: Vec<MaterialItem>) -> Self {
        let sub_study_id = sub_study_id.into();
        let mut document = Map::new();
        document.insert(SUB_STUDY_ID_FIELD.to_string(), Value::String(sub_study_id.clone()));
        document.insert(ITEMS_FIELD.to_string(), Value::Null);
        Self {
            sub_study_id,
            items,
            document,
            path: None,
        }
    }

    pub fn sub_study_id(&self) -> &str {
        &self.sub_study_id
    }

    /// A top-level field other than `items`, as stored in the document.
    pub fn field(&self, key: &str) -> Option<&Value> {
        match key {
            ITEMS_FIELD => None,
            _ => self.document.get(key),
        }
    }

    /// Loads a material file and remembers its path for write-back.
    pub fn load(path: &Path) -> Result<Self, AlignmentError> {
        let contents = read_document(path)?;
        let mut file: MaterialFile =
            serde_json::from_str(&contents).map_err(|e| AlignmentError::DocumentParse {
                path: path.display().to_string(),
                reason: e.to_string(),
            })?;
        file.path = Some(path.to_path_buf());
        Ok(file)
    }

    /// Loads every `*.json` file in `dir`, sorted by file name.
    pub fn load_dir(dir: &Path) -> Result<Vec<Self>, AlignmentError> {
        let entries = std::fs::read_dir(dir).map_err(|e| AlignmentError::DocumentRead {
            path: dir.display().to_string(),
            reason: e.to_string(),
        })?;

        let mut paths: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.is_file() && path.extension().is_some_and(|ext| ext == "json"))
            .collect();
        paths.sort();

        debug!(dir = %dir.display(), files = paths.len(), "loading material files");
        paths.iter().map(|path| Self::load(path)).collect()
    }

    /// Serializes the file as pretty-printed UTF-8 JSON.
    ///
    /// Non-ASCII text is written as-is, never `\u` escaped.
    pub fn to_json_string(&self) -> Result<String, serde_json::Error> {
        let mut json = serde_json::to_string_pretty(self)?;
        json.push('\n');
        Ok(json)
    }

    /// Writes the file back to the path it was loaded from.
    pub fn save(&self) -> Result<(), AlignmentError> {
        let Some(path) = self.path.as_deref() else {
            return Err(AlignmentError::DocumentWrite {
                path: self.sub_study_id.clone(),
                reason: "material file has no backing path".to_string(),
            });
        };
        let write_err = |reason: String| AlignmentError::DocumentWrite {
            path: path.display().to_string(),
            reason,
        };
        let json = self.to_json_string().map_err(|e| write_err(e.to_string()))?;
        std::fs::write(path, json).map_err(|e| write_err(e.to_string()))
    }
}

impl Serialize for MaterialFile {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let has_items = self.document.contains_key(ITEMS_FIELD);
        let write_items = has_items || !self.items.is_empty();
        let len = self.document.len() + usize::from(write_items && !has_items);

        let mut map = serializer.serialize_map(Some(len))?;
        for (key, value) in &self.document {
            match key.as_str() {
                SUB_STUDY_ID_FIELD => map.serialize_entry(key, &self.sub_study_id)?,
                ITEMS_FIELD => map.serialize_entry(key, &self.items)?,
                _ => map.serialize_entry(key, value)?,
            }
        }
        // Items added to a file that had no `items` field go last
        if write_items && !has_items {
            map.serialize_entry(ITEMS_FIELD, &self.items)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for MaterialFile {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let mut document = Map::<String, Value>::deserialize(deserializer)?;

        let sub_study_id = match document.get(SUB_STUDY_ID_FIELD) {
            Some(Value::String(id)) => id.clone(),
            Some(_) => return Err(D::Error::custom("`sub_study_id` must be a string")),
            None => return Err(D::Error::missing_field("sub_study_id")),
        };
        let items = match document.get_mut(ITEMS_FIELD) {
            Some(value) => serde_json::from_value(value.take()).map_err(D::Error::custom)?,
            None => Vec::new(),
        };

        Ok(Self {
            sub_study_id,
            items,
            document,
            path: None,
        })
    }
}

impl MaterialItem {
    /// Wraps an existing JSON object.
    pub fn from_fields(fields: Map<String, Value>) -> Self {
        Self { fields }
    }

    /// Convenience constructor for an item with an id and optional label.
    pub fn with_label(id: impl Into<String>, label: Option<&str>) -> Self {
        let mut fields = Map::new();
        fields.insert("id".to_string(), Value::String(id.into()));
        if let Some(label) = label {
            let mut metadata = Map::new();
            metadata.insert(LABEL_FIELD.to_string(), Value::String(label.to_string()));
            fields.insert("metadata".to_string(), Value::Object(metadata));
        }
        Self { fields }
    }

    /// The underlying JSON object.
    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    /// Item identifier; numeric ids are rendered as strings.
    pub fn id(&self) -> Option<String> {
        match self.fields.get("id")? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    /// Free-text label, if present and not blank.
    pub fn label(&self) -> Option<&str> {
        self.metadata()?
            .get(LABEL_FIELD)?
            .as_str()
            .filter(|label| !label.trim().is_empty())
    }

    /// Ground-truth key assigned by a previous alignment.
    pub fn gt_key(&self) -> Option<&str> {
        self.metadata()?.get(GT_KEY_FIELD)?.as_str()
    }

    /// Sets `metadata.gt_key`, creating `metadata` if needed.
    ///
    /// Returns `true` when the item changed.
    pub fn set_gt_key(&mut self, key: &str) -> bool {
        if self.gt_key() == Some(key) {
            return false;
        }
        let metadata = self
            .fields
            .entry("metadata")
            .or_insert_with(|| Value::Object(Map::new()));
        if !metadata.is_object() {
            *metadata = Value::Object(Map::new());
        }
        if let Value::Object(map) = metadata {
            map.insert(GT_KEY_FIELD.to_string(), Value::String(key.to_string()));
        }
        true
    }

    /// Removes `metadata.gt_key`. Returns `true` when the item changed.
    pub fn clear_gt_key(&mut self) -> bool {
        match self.fields.get_mut("metadata") {
            Some(Value::Object(map)) => map.shift_remove(GT_KEY_FIELD).is_some(),
            _ => false,
        }
    }

    fn metadata(&self) -> Option<&Map<String, Value>> {
        self.fields.get("metadata")?.as_object()
    }
}
