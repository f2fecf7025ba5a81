//! Command-line interface for the pyuml utility
//!
//! Extracts single classes from Python files and assembles diagram
//! manifests into PlantUML text or images.

use anyhow::{anyhow, bail, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

use pyuml::core::logging::init_logging;
use pyuml::diagram::{draw, DiagramRenderer, MemberFilter, PlantUmlCommand, RenderOptions};
use pyuml::extract::{ClassExtractor, ModuleResolver, SourceUnit};
use pyuml::manifest::{BuildOutcome, DiagramManifest};
use pyuml::{ImageFormat, Renderer, Stereotype, TracingSink};

/// pyuml - Class diagrams from Python source
#[derive(Parser)]
#[command(name = "pyuml")]
#[command(about = "Extract Python classes into PlantUML class diagrams")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(author = env!("CARGO_PKG_AUTHORS"))]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Set log level (trace|debug|info|warn|error)
    #[arg(long, value_enum, default_value_t = LogLevel::Warn)]
    pub log_level: LogLevel,

    /// Set log format (compact|pretty|json)
    #[arg(long, value_enum, default_value_t = LogFormat::Compact)]
    pub log_format: LogFormat,
}

/// Log level options
#[derive(Copy, Clone, Debug, ValueEnum, PartialEq, Eq)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

/// Log format options
#[derive(Copy, Clone, Debug, ValueEnum, PartialEq, Eq)]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

impl LogFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogFormat::Compact => "compact",
            LogFormat::Pretty => "pretty",
            LogFormat::Json => "json",
        }
    }
}

/// Class stereotype choices
#[derive(Copy, Clone, Debug, ValueEnum, PartialEq, Eq, Default)]
pub enum StereotypeChoice {
    #[default]
    Class,
    Interface,
    Abstract,
}

impl From<StereotypeChoice> for Stereotype {
    fn from(value: StereotypeChoice) -> Self {
        match value {
            StereotypeChoice::Class => Stereotype::Class,
            StereotypeChoice::Interface => Stereotype::Interface,
            StereotypeChoice::Abstract => Stereotype::Abstract,
        }
    }
}

/// Image format choices
#[derive(Copy, Clone, Debug, ValueEnum, PartialEq, Eq)]
pub enum FormatChoice {
    Svg,
    Png,
    Txt,
}

impl From<FormatChoice> for ImageFormat {
    fn from(value: FormatChoice) -> Self {
        match value {
            FormatChoice::Svg => ImageFormat::Svg,
            FormatChoice::Png => ImageFormat::Png,
            FormatChoice::Txt => ImageFormat::Txt,
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Extract one class and print its diagram block
    Extract {
        /// Python source file (use - for stdin)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Class to extract; dotted names reach nested classes (Outer.Inner)
        #[arg(short, long = "class")]
        class_name: String,

        /// Stereotype of the class block
        #[arg(long, value_enum, default_value_t = StereotypeChoice::Class)]
        stereotype: StereotypeChoice,

        /// Include members whose name starts with an underscore
        #[arg(long)]
        all_members: bool,

        /// Print the extracted model as JSON instead of a diagram block
        #[arg(long)]
        json: bool,

        /// Output file (use - for stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Build a diagram manifest and print the diagram text
    Render {
        /// JSON manifest describing the diagram
        #[arg(short, long)]
        manifest: PathBuf,

        /// Module search roots (defaults to the manifest's directory)
        #[arg(short, long = "root")]
        roots: Vec<PathBuf>,

        /// Include members whose name starts with an underscore
        #[arg(long)]
        all_members: bool,

        /// Fail when any class could not be extracted
        #[arg(long)]
        strict: bool,

        /// Output file (use - for stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Build a diagram manifest and draw it with PlantUML
    Draw {
        /// JSON manifest describing the diagram
        #[arg(short, long)]
        manifest: PathBuf,

        /// Module search roots (defaults to the manifest's directory)
        #[arg(short, long = "root")]
        roots: Vec<PathBuf>,

        /// Image file to write
        #[arg(short, long)]
        output: PathBuf,

        /// Image format (defaults to the output file extension, then svg)
        #[arg(short, long, value_enum)]
        format: Option<FormatChoice>,

        /// Rendering engine
        #[arg(long, default_value = pyuml::diagram::PLANTUML_ENGINE)]
        engine: String,

        /// Fail when any class could not be extracted
        #[arg(long)]
        strict: bool,
    },
}

/// Main CLI application
#[derive(Default)]
pub struct PyumlApp;

impl PyumlApp {
    pub fn new() -> Self {
        Self
    }

    /// Run the application with the given CLI arguments
    pub fn run(&mut self, cli: Cli) -> Result<()> {
        // Environment variables take precedence over the flags.
        let log_level_str = std::env::var("PYUML_LOG_LEVEL")
            .ok()
            .or_else(|| std::env::var("RUST_LOG").ok())
            .or_else(|| Some(cli.log_level.as_str().to_string()));

        let log_format_str = std::env::var("PYUML_LOG_FORMAT")
            .ok()
            .or_else(|| Some(cli.log_format.as_str().to_string()));

        if let Err(e) = init_logging(log_level_str.as_deref(), log_format_str.as_deref()) {
            eprintln!("Warning: Failed to initialize logging: {}", e);
        }

        if cli.verbose {
            eprintln!("pyuml v{}", env!("CARGO_PKG_VERSION"));
        }

        match cli.command {
            Commands::Extract {
                input,
                class_name,
                stereotype,
                all_members,
                json,
                output,
            } => self.extract_command(
                input,
                &class_name,
                stereotype.into(),
                Self::render_options(all_members),
                json,
                output,
                cli.verbose,
            ),
            Commands::Render {
                manifest,
                roots,
                all_members,
                strict,
                output,
            } => self.render_command(
                &manifest,
                roots,
                Self::render_options(all_members),
                strict,
                output,
                cli.verbose,
            ),
            Commands::Draw {
                manifest,
                roots,
                output,
                format,
                engine,
                strict,
            } => {
                let format = format
                    .map(ImageFormat::from)
                    .or_else(|| {
                        output
                            .extension()
                            .and_then(|ext| ext.to_str())
                            .and_then(ImageFormat::from_extension)
                    })
                    .unwrap_or_default();
                self.draw_command(&manifest, roots, &output, format, &engine, strict, cli.verbose)
            }
        }
    }

    fn render_options(all_members: bool) -> RenderOptions {
        let members = if all_members {
            MemberFilter::All
        } else {
            MemberFilter::Public
        };
        RenderOptions::default().with_members(members)
    }

    /// Handle the extract command
    #[allow(clippy::too_many_arguments)]
    fn extract_command(
        &self,
        input: Option<PathBuf>,
        class_name: &str,
        stereotype: Stereotype,
        options: RenderOptions,
        json: bool,
        output: Option<PathBuf>,
        verbose: bool,
    ) -> Result<()> {
        let origin = match &input {
            Some(path) if path.to_string_lossy() != "-" => path.clone(),
            _ => PathBuf::from("<stdin>"),
        };
        let content = self.read_input(input)?;

        if verbose {
            eprintln!("Read {} bytes from {}", content.len(), origin.display());
        }

        debug!(class = class_name, origin = %origin.display(), "extracting from input");
        let unit = SourceUnit::new(origin, content);
        let model =
            ClassExtractor::with_sink(&TracingSink).extract_unit(&unit, class_name, stereotype)?;

        let text = if json {
            serde_json::to_string_pretty(&model)?
        } else {
            pyuml::diagram::render_class_block(&model, &options)
        };

        if verbose {
            eprintln!(
                "Extracted {} attributes and {} methods",
                model.attributes().len(),
                model.methods().len()
            );
        }

        self.write_output(output, &text)
    }

    /// Handle the render command
    fn render_command(
        &self,
        manifest: &Path,
        roots: Vec<PathBuf>,
        options: RenderOptions,
        strict: bool,
        output: Option<PathBuf>,
        verbose: bool,
    ) -> Result<()> {
        let outcome = self.build_manifest(manifest, roots, strict, verbose)?;
        let text = DiagramRenderer::with_options(options).render(&outcome.diagram)?;
        self.write_output(output, &text)
    }

    /// Handle the draw command
    #[allow(clippy::too_many_arguments)]
    fn draw_command(
        &self,
        manifest: &Path,
        roots: Vec<PathBuf>,
        output: &Path,
        format: ImageFormat,
        engine: &str,
        strict: bool,
        verbose: bool,
    ) -> Result<()> {
        let outcome = self.build_manifest(manifest, roots, strict, verbose)?;
        let renderer = PlantUmlCommand::new();
        let written = draw(&outcome.diagram, &renderer, format, engine, output)?;

        if verbose {
            eprintln!("Wrote {} bytes of {} to {}", written, format, output.display());
        }
        Ok(())
    }

    /// Load a manifest and extract its classes, reporting skipped ones
    pub fn build_manifest(
        &self,
        manifest: &Path,
        roots: Vec<PathBuf>,
        strict: bool,
        verbose: bool,
    ) -> Result<BuildOutcome> {
        let parsed = DiagramManifest::load(manifest)
            .map_err(|e| anyhow!("Failed to load manifest '{}': {}", manifest.display(), e))?;

        let roots = if roots.is_empty() {
            vec![manifest
                .parent()
                .filter(|dir| !dir.as_os_str().is_empty())
                .map(Path::to_path_buf)
                .unwrap_or_else(|| PathBuf::from("."))]
        } else {
            roots
        };

        if verbose {
            eprintln!(
                "Building {} classes against {} search root(s)",
                parsed.classes.len(),
                roots.len()
            );
        }

        debug!(manifest = %manifest.display(), roots = ?roots, "building manifest");
        let resolver = ModuleResolver::new(roots);
        let outcome = parsed.build(&resolver, &TracingSink)?;

        for failure in &outcome.failures {
            eprintln!("Skipped {}: {}", failure.selector, failure.error);
        }
        if strict && !outcome.is_complete() {
            bail!("{} class(es) could not be extracted", outcome.failures.len());
        }

        Ok(outcome)
    }

    /// Read input from file or stdin
    pub fn read_input(&self, input: Option<PathBuf>) -> Result<String> {
        match input {
            Some(path) if path.to_string_lossy() != "-" => fs::read_to_string(&path)
                .map_err(|e| anyhow!("Failed to read input file '{}': {}", path.display(), e)),
            _ => {
                let mut content = String::new();
                io::stdin().read_to_string(&mut content)?;
                Ok(content)
            }
        }
    }

    /// Write output to file or stdout
    pub fn write_output(&self, output: Option<PathBuf>, content: &str) -> Result<()> {
        let stdout_content = if content.is_empty() || content.ends_with('\n') {
            content.to_string()
        } else {
            format!("{}\n", content)
        };

        match output {
            Some(path) if path.to_string_lossy() != "-" => {
                fs::write(&path, content).map_err(|e| {
                    anyhow!("Failed to write output file '{}': {}", path.display(), e)
                })?;
            }
            _ => {
                print!("{}", stdout_content);
                io::stdout().flush()?;
            }
        }
        Ok(())
    }
}
