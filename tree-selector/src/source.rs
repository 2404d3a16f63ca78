use std::fmt::Debug;
use std::hash::Hash;

/// Borrowed view of a single node exposed by a [`TreeSource`].
#[derive(Debug)]
pub enum Node<'a, V> {
    /// A folder owning an ordered set of children.
    Folder { name: &'a str },
    /// A leaf owning exactly one payload value.
    Leaf { name: &'a str, value: &'a V },
}

impl<'a, V> Node<'a, V> {
    /// Display name used for sorting and text filtering.
    pub fn name(&self) -> &'a str {
        match self {
            Node::Folder { name } => name,
            Node::Leaf { name, .. } => name,
        }
    }

    /// Payload of a leaf node.
    pub fn value(&self) -> Option<&'a V> {
        match self {
            Node::Folder { .. } => None,
            Node::Leaf { value, .. } => Some(value),
        }
    }

    pub fn is_folder(&self) -> bool {
        matches!(self, Node::Folder { .. })
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, Node::Leaf { .. })
    }
}

// Manual impls: a derive would require `V: Clone`.
impl<V> Clone for Node<'_, V> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<V> Copy for Node<'_, V> {}

/// Externally owned hierarchy consumed by the selector.
///
/// Implementations hand out identifiers instead of references, so the
/// selector can keep selection and scroll targets across frames while the
/// tree is mutated by the host. An identifier that no longer resolves
/// through [`TreeSource::node`] is treated as gone.
pub trait TreeSource {
    /// Stable identity of a node. Equality is node identity.
    type Id: Copy + Eq + Hash + Debug + 'static;
    /// Leaf payload. Equality is payload (value) equality.
    type Value: Clone + PartialEq;

    /// Immediate children of `parent` in a stable order.
    ///
    /// `None` enumerates the top-level nodes. Leaves return an empty slice.
    fn children(&self, parent: Option<Self::Id>) -> &[Self::Id];

    /// Resolve an identifier, returning `None` once the node is gone.
    fn node(&self, id: Self::Id) -> Option<Node<'_, Self::Value>>;

    /// Total number of nodes below the top level, used to pre-size buffers.
    fn descendant_count(&self) -> usize {
        0
    }
}
