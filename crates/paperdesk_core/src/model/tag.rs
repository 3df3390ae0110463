//! Tag domain model.
//!
//! Tags are administered out of band; the core reads them as a flat
//! adjacency list (id, name, parent reference) and renders the hierarchy on
//! demand through the taxonomy builder.

use serde::{Deserialize, Serialize};

/// Stable identifier for a user-defined tag.
pub type TagId = i64;

/// One row of the user-defined tag taxonomy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub id: TagId,
    pub name: String,
    /// Parent tag id. `None` means root-level tag. A parent id that does not
    /// resolve to any existing tag is promoted to root by the tree builder.
    pub parent_id: Option<TagId>,
}

impl Tag {
    pub fn new(id: TagId, name: impl Into<String>, parent_id: Option<TagId>) -> Self {
        Self {
            id,
            name: name.into(),
            parent_id,
        }
    }
}

/// Tag reference attached to a paper, as handed to the transport layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagRef {
    pub id: TagId,
    pub name: String,
}
