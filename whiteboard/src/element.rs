use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

const DEFAULT_IMAGE_SIZE: u64 = 200;

/// One drawable object on a board. `attrs` holds the type-dependent fields
/// (position, src, points, ...) exactly as they appear on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementRecord {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(flatten)]
    pub attrs: Map<String, Value>,
}

impl ElementRecord {
    pub fn new(id: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind: kind.into(),
            attrs: Map::new(),
        }
    }

    pub fn with_attr(mut self, key: &str, value: Value) -> Self {
        self.attrs.insert(key.to_string(), value);
        self
    }

    pub fn allows_student_edit(&self) -> bool {
        self.attrs
            .get("allowStudentEdit")
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }

    fn apply_defaults(&mut self) {
        if self.kind == "image" {
            for key in &["width", "height"] {
                self.attrs
                    .entry(key.to_string())
                    .or_insert_with(|| Value::from(DEFAULT_IMAGE_SIZE));
            }
        }
    }

    /// Fields present in `incoming` overwrite the stored ones; everything
    /// else is retained, so a move update cannot erase an image's `src`.
    fn merge_from(&mut self, incoming: ElementRecord) {
        self.kind = incoming.kind;
        for (key, value) in incoming.attrs {
            self.attrs.insert(key, value);
        }
    }
}

/// Ordered per-room element collection. The sequence order is the z-order:
/// updates mutate in place and new ids always append at the tail.
#[derive(Debug, Default)]
pub struct ElementStore {
    elements: Vec<ElementRecord>,
}

impl ElementStore {
    pub fn new() -> Self {
        Self {
            elements: Vec::new(),
        }
    }

    pub fn upsert(&mut self, incoming: ElementRecord) {
        match self.elements.iter_mut().find(|e| e.id == incoming.id) {
            Some(existing) => {
                existing.merge_from(incoming);
                log::debug!("updated {} element {}", existing.kind, existing.id);
            }
            None => {
                let mut record = incoming;
                record.apply_defaults();
                log::debug!("added new {} element {}", record.kind, record.id);
                self.elements.push(record);
            }
        }
    }

    /// Removing an absent id is a no-op, not an error.
    pub fn remove(&mut self, id: &str) {
        self.elements.retain(|e| e.id != id);
    }

    pub fn clear(&mut self) {
        self.elements.clear();
    }

    pub fn replace_all(&mut self, elements: Vec<ElementRecord>) {
        self.elements = elements;
    }

    pub fn snapshot(&self) -> &[ElementRecord] {
        &self.elements
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}
