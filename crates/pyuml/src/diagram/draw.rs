//! Image rendering through an external PlantUML installation
//!
//! Diagram text is piped to `plantuml -pipe`; the image bytes come back on
//! stdout. The program can be overridden with the `PYUML_PLANTUML`
//! environment variable (for instance to point at a wrapper script around
//! `java -jar plantuml.jar`).

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::thread;

use tracing::{debug, info, span, Level};

use super::{DiagramModel, DiagramRenderer};
use crate::core::{ImageFormat, Renderer, Result, UmlError};

/// Environment variable naming the PlantUML executable
pub const PLANTUML_ENV: &str = "PYUML_PLANTUML";

/// The only engine [`PlantUmlCommand`] understands
pub const PLANTUML_ENGINE: &str = "plantuml";

/// Turns diagram text into image bytes
pub trait ImageRenderer: Send + Sync {
    fn render_image(&self, text: &str, format: ImageFormat, engine: &str) -> Result<Vec<u8>>;
}

/// Renders images by running the `plantuml` command
#[derive(Debug, Clone)]
pub struct PlantUmlCommand {
    program: PathBuf,
}

impl PlantUmlCommand {
    /// Use `$PYUML_PLANTUML`, falling back to `plantuml` on the `PATH`
    pub fn new() -> Self {
        let program = std::env::var_os(PLANTUML_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("plantuml"));
        Self { program }
    }

    pub fn with_program(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Wrap diagram text in `@startuml`/`@enduml` unless it already is
    pub fn wrap(text: &str) -> String {
        if text.trim_start().starts_with("@startuml") {
            text.to_string()
        } else {
            format!("@startuml\n{}\n@enduml\n", text)
        }
    }
}

impl Default for PlantUmlCommand {
    fn default() -> Self {
        Self::new()
    }
}

impl ImageRenderer for PlantUmlCommand {
    fn render_image(&self, text: &str, format: ImageFormat, engine: &str) -> Result<Vec<u8>> {
        if engine != PLANTUML_ENGINE {
            return Err(UmlError::render_failure(format!(
                "unsupported engine '{}' (only '{}' is available)",
                engine, PLANTUML_ENGINE
            )));
        }

        debug!(program = %self.program.display(), format = %format, "spawning renderer");

        let mut child = Command::new(&self.program)
            .arg("-pipe")
            .arg(format!("-t{}", format))
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                UmlError::render_failure(format!(
                    "failed to start {}: {}",
                    self.program.display(),
                    e
                ))
            })?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| UmlError::render_failure("renderer stdin unavailable"))?;
        let input = Self::wrap(text);
        // Feed stdin from another thread so a full stdout pipe cannot stall us.
        let writer = thread::spawn(move || stdin.write_all(input.as_bytes()));

        let output = child.wait_with_output().map_err(|e| {
            UmlError::render_failure(format!("{} did not finish: {}", self.program.display(), e))
        })?;

        match writer.join() {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                return Err(UmlError::render_failure(format!(
                    "failed to send diagram to {}: {}",
                    self.program.display(),
                    e
                )))
            }
            Err(_) => return Err(UmlError::render_failure("renderer input thread panicked")),
        }

        if !output.status.success() {
            return Err(UmlError::render_failure(format!(
                "{} exited with {}: {}",
                self.program.display(),
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        Ok(output.stdout)
    }
}

/// Render `diagram` and write the image to `output`
///
/// Returns the number of bytes written. Any failure of the image renderer,
/// including an empty result, is reported as [`UmlError::RenderFailure`].
pub fn draw(
    diagram: &DiagramModel,
    renderer: &dyn ImageRenderer,
    format: ImageFormat,
    engine: &str,
    output: &Path,
) -> Result<usize> {
    let span = span!(Level::INFO, "draw", format = %format, engine, output = %output.display());
    let _enter = span.enter();

    let text = DiagramRenderer::new().render(diagram)?;

    let bytes = renderer
        .render_image(&text, format, engine)
        .map_err(|e| match e {
            UmlError::RenderFailure { .. } => e,
            other => UmlError::render_failure(other.to_string()),
        })?;

    if bytes.is_empty() {
        return Err(UmlError::render_failure(format!(
            "{} renderer produced no {} output",
            engine, format
        )));
    }

    fs::write(output, &bytes)?;
    info!(bytes = bytes.len(), output = %output.display(), "diagram drawn");
    Ok(bytes.len())
}
