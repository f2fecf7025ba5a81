//! Storage trait for diagrams under assembly
//!
//! Nodes are the class boxes, edges the relations between them. Renderers
//! only ever see a database through a shared reference.

/// A diagram's boxes and connections
pub trait Database: Send + Sync {
    type Node: Clone + Send + Sync;
    type Edge: Clone + Send + Sync;

    /// Boxes in registration order
    fn nodes(&self) -> impl Iterator<Item = &Self::Node>;

    /// Connections in first-insertion order
    fn edges(&self) -> impl Iterator<Item = &Self::Edge>;

    /// Drop every box, connection and layout entry
    fn clear(&mut self);

    fn node_count(&self) -> usize;

    fn edge_count(&self) -> usize;
}
