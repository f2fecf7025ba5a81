//! Core abstractions shared by extraction and diagram assembly

pub mod chumsky_utils;
mod database;
mod diagnostics;
mod error;
pub mod logging;
mod renderer;
mod syntax;
mod types;

pub use database::*;
pub use diagnostics::*;
pub use error::*;
pub use logging::*;
pub use renderer::*;
pub use syntax::*;
pub use types::*;
