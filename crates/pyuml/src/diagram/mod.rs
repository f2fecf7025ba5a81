//! Class diagram assembly, rendering and drawing

mod database;
mod draw;
mod renderer;

pub use database::{ClassId, DiagramModel, Endpoint, Relation, StructureEntry, DEFAULT_NOTATION};
pub use draw::{draw, ImageRenderer, PlantUmlCommand, PLANTUML_ENGINE, PLANTUML_ENV};
pub use renderer::{render_class_block, DiagramRenderer, MemberFilter, RenderOptions};
