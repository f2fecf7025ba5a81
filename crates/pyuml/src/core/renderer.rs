//! Core renderer trait for diagram output
//!
//! A renderer turns a populated [`Database`] into text. Rendering is a pure
//! function of the database: calling it twice yields the same output.

use super::{Database, Result};

/// Core trait for diagram renderers
pub trait Renderer<D: Database>: Send + Sync {
    /// The output type of this renderer
    type Output;

    /// Render the diagram database into the output format
    fn render(&self, database: &D) -> Result<Self::Output>;

    /// Get the name of this renderer
    fn name(&self) -> &'static str;

    /// Get the supported output format
    fn format(&self) -> &'static str;
}
