//! Record tree model.
//!
//! A [`Form`] is the stored representation of one catalog record: a flat,
//! append-only arena of [`StoredValue`] nodes that together encode a tree
//! through parent references. Three node kinds exist:
//!
//! - **Leaf**: a primitive value, stored as a canonical string
//! - **Node**: a structured value whose children reference it as parent
//! - **Link**: an alias to a value emitted earlier in the same form,
//!   preserving shared references in the source object graph
//!
//! Link targets must already exist when the link is appended; forward
//! references are rejected. Readers can therefore resolve links in a
//! single pass over the arena in insertion order.
//!
//! Forms are write-once: the mapper populates a fresh form, the store
//! persists it, and an update replaces the whole form.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{Error, Result};
use crate::path::Path;

/// Index of a value within its form's arena.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct ValueId(u32);

impl ValueId {
    /// Returns the raw arena index.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for ValueId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The tagged payload of a stored value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", rename_all_fields = "camelCase", tag = "kind")]
pub enum ValueNode {
    /// A primitive value with its canonical string payload.
    Leaf {
        /// Name of the primitive (or enumeration) type.
        type_name: String,
        /// Canonical string payload (numbers, dates and codes included).
        payload: String,
    },
    /// A structured value; children reference it by parent id.
    Node {
        /// Name of the structured type.
        type_name: String,
    },
    /// An alias to a value emitted earlier in the same form.
    Link {
        /// The aliased value.
        target: ValueId,
    },
}

/// One value in a form's arena.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredValue {
    /// Arena index of this value.
    pub id: ValueId,
    /// Parent value, or `None` for a root value.
    pub parent: Option<ValueId>,
    /// Full dotted path from the record root.
    pub path: Path,
    /// Position among repeated siblings at the same (parent, path).
    pub ordinal: u32,
    /// The tagged payload.
    pub node: ValueNode,
}

/// The tree-shaped stored representation of one catalog record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Form {
    /// Human-readable record title.
    pub title: String,
    /// Creation/update timestamp.
    pub updated_at: DateTime<Utc>,
    values: Vec<StoredValue>,
}

// Link translation depth bound; writer-produced forms never chain links,
// so anything deeper indicates a malformed form.
const MAX_LINK_DEPTH: usize = 16;

impl Form {
    /// Creates an empty form with the given title.
    #[must_use]
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            updated_at: Utc::now(),
            values: Vec::new(),
        }
    }

    /// Appends a leaf value and returns its id.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidInput` if `parent` does not exist.
    pub fn push_leaf(
        &mut self,
        parent: Option<ValueId>,
        path: Path,
        type_name: impl Into<String>,
        payload: impl Into<String>,
    ) -> Result<ValueId> {
        let node = ValueNode::Leaf {
            type_name: type_name.into(),
            payload: payload.into(),
        };
        self.push(parent, path, node)
    }

    /// Appends a structured node value and returns its id.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidInput` if `parent` does not exist.
    pub fn push_node(
        &mut self,
        parent: Option<ValueId>,
        path: Path,
        type_name: impl Into<String>,
    ) -> Result<ValueId> {
        let node = ValueNode::Node {
            type_name: type_name.into(),
        };
        self.push(parent, path, node)
    }

    /// Appends a link to an already-present value and returns its id.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidInput` if `parent` or `target` does not
    /// exist; forward references are never accepted.
    pub fn push_link(
        &mut self,
        parent: Option<ValueId>,
        path: Path,
        target: ValueId,
    ) -> Result<ValueId> {
        if target.index() >= self.values.len() {
            return Err(Error::InvalidInput(format!(
                "link target {target} does not exist yet (forward references are rejected)"
            )));
        }
        self.push(parent, path, ValueNode::Link { target })
    }

    fn push(&mut self, parent: Option<ValueId>, path: Path, node: ValueNode) -> Result<ValueId> {
        if let Some(parent_id) = parent {
            if parent_id.index() >= self.values.len() {
                return Err(Error::InvalidInput(format!(
                    "parent value {parent_id} does not exist"
                )));
            }
        }
        let id = ValueId(u32::try_from(self.values.len()).map_err(|_| {
            Error::InvalidInput("form exceeds the maximum number of values".into())
        })?);
        let ordinal = self.next_ordinal(parent, &path);
        self.values.push(StoredValue {
            id,
            parent,
            path,
            ordinal,
            node,
        });
        Ok(id)
    }

    /// Returns the lowest unused ordinal for a (parent, path) pair.
    #[must_use]
    pub fn next_ordinal(&self, parent: Option<ValueId>, path: &Path) -> u32 {
        self.values
            .iter()
            .filter(|v| v.parent == parent && &v.path == path)
            .map(|v| v.ordinal + 1)
            .max()
            .unwrap_or(0)
    }

    /// Looks up a value by id.
    #[must_use]
    pub fn value(&self, id: ValueId) -> Option<&StoredValue> {
        self.values.get(id.index())
    }

    /// Iterates over all values in insertion order.
    pub fn values(&self) -> impl Iterator<Item = &StoredValue> {
        self.values.iter()
    }

    /// Iterates over root values (those without a parent).
    pub fn roots(&self) -> impl Iterator<Item = &StoredValue> {
        self.values.iter().filter(|v| v.parent.is_none())
    }

    /// Iterates over the children of a value, in insertion order.
    pub fn children_of(&self, parent: ValueId) -> impl Iterator<Item = &StoredValue> {
        self.values.iter().filter(move |v| v.parent == Some(parent))
    }

    /// Number of values in the arena.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the form holds no values.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Collects every leaf payload addressed by `path`, following links.
    ///
    /// A link at path `q` exposes the leaves of its target subtree under
    /// `q`, so aliased subtrees contribute to path scans exactly like
    /// inline ones.
    #[must_use]
    pub fn leaf_payloads_at(&self, path: &Path) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_payloads(path.as_str(), 0, &mut out);
        out
    }

    fn collect_payloads<'a>(&'a self, path: &str, depth: usize, out: &mut Vec<&'a str>) {
        if depth > MAX_LINK_DEPTH {
            return;
        }
        for value in &self.values {
            match &value.node {
                ValueNode::Leaf { payload, .. } if value.path.as_str() == path => {
                    out.push(payload.as_str());
                }
                ValueNode::Link { target } => {
                    let link_path = value.path.as_str();
                    let suffix = if path == link_path {
                        Some("")
                    } else {
                        path.strip_prefix(link_path)
                            .filter(|rest| rest.starts_with('.'))
                    };
                    if let (Some(suffix), Some(target_value)) = (suffix, self.value(*target)) {
                        let translated = format!("{}{suffix}", target_value.path.as_str());
                        if translated != path {
                            self.collect_payloads(&translated, depth + 1, out);
                        }
                    }
                }
                _ => {}
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path(s: &str) -> Path {
        Path::parse(s).unwrap()
    }

    #[test]
    fn ordinals_ascend_per_parent_and_path() {
        let mut form = Form::new("test");
        let root = form.push_node(None, path("contact"), "Contact").unwrap();
        let a = form
            .push_leaf(Some(root), path("contact.keyword"), "CharacterString", "lakes")
            .unwrap();
        let b = form
            .push_leaf(Some(root), path("contact.keyword"), "CharacterString", "rivers")
            .unwrap();
        assert_eq!(form.value(a).unwrap().ordinal, 0);
        assert_eq!(form.value(b).unwrap().ordinal, 1);

        // A different path under the same parent restarts at zero.
        let c = form
            .push_leaf(Some(root), path("contact.name"), "CharacterString", "x")
            .unwrap();
        assert_eq!(form.value(c).unwrap().ordinal, 0);
    }

    #[test]
    fn forward_link_rejected() {
        let mut form = Form::new("test");
        let result = form.push_link(None, path("contact"), ValueId(3));
        assert!(result.is_err());
    }

    #[test]
    fn link_to_existing_value_accepted() {
        let mut form = Form::new("test");
        let node = form.push_node(None, path("contact"), "Contact").unwrap();
        let link = form.push_link(None, path("distributor"), node).unwrap();
        assert!(matches!(
            form.value(link).unwrap().node,
            ValueNode::Link { target } if target == node
        ));
    }

    #[test]
    fn missing_parent_rejected() {
        let mut form = Form::new("test");
        let result = form.push_leaf(Some(ValueId(0)), path("title"), "CharacterString", "x");
        assert!(result.is_err());
    }

    #[test]
    fn children_iterate_in_insertion_order() {
        let mut form = Form::new("test");
        let root = form.push_node(None, path("citation"), "Citation").unwrap();
        form.push_leaf(Some(root), path("citation.title"), "CharacterString", "one")
            .unwrap();
        form.push_leaf(Some(root), path("citation.date"), "Date", "2020-05-01")
            .unwrap();
        let children: Vec<_> = form.children_of(root).map(|v| v.path.as_str()).collect();
        assert_eq!(children, ["citation.title", "citation.date"]);
    }

    #[test]
    fn leaf_payloads_follow_links() {
        let mut form = Form::new("test");
        let contact = form.push_node(None, path("contact"), "Contact").unwrap();
        form.push_leaf(
            Some(contact),
            path("contact.organisation"),
            "CharacterString",
            "Hydrology Office",
        )
        .unwrap();
        // The distributor aliases the contact node.
        form.push_link(None, path("distributor"), contact).unwrap();

        let direct = form.leaf_payloads_at(&path("contact.organisation"));
        assert_eq!(direct, ["Hydrology Office"]);

        let via_link = form.leaf_payloads_at(&path("distributor.organisation"));
        assert_eq!(via_link, ["Hydrology Office"]);
    }

    #[test]
    fn serde_roundtrip() {
        let mut form = Form::new("Lake Survey 2020");
        let root = form.push_node(None, path("citation"), "Citation").unwrap();
        form.push_leaf(
            Some(root),
            path("citation.title"),
            "CharacterString",
            "Lake Survey 2020",
        )
        .unwrap();
        form.push_link(None, path("alias"), root).unwrap();

        let json = serde_json::to_string(&form).unwrap();
        let parsed: Form = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, form);
    }
}
