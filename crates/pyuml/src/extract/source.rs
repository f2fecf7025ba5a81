//! Source providers
//!
//! Locating the source text of a class is kept behind the [`SourceProvider`]
//! trait so extraction itself never touches the filesystem directly.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use super::ClassSelector;
use crate::core::{Result, UmlError};

/// Source text of one Python module
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceUnit {
    /// Where the text came from; used in error messages
    pub path: PathBuf,
    pub text: String,
}

impl SourceUnit {
    pub fn new(path: impl Into<PathBuf>, text: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            text: text.into(),
        }
    }
}

/// A located class: the module text plus the class path inside it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocatedSource {
    pub unit: SourceUnit,
    /// Dotted path of the class inside the module (`Outer.Inner`)
    pub class_path: String,
}

/// Finds the source text that declares a selected class
pub trait SourceProvider: Send + Sync {
    /// Locate the module declaring `selector`
    ///
    /// Failing to find or read a module is
    /// [`UmlError::SourceUnavailable`]; whether the class really is declared
    /// there is checked later, during extraction.
    fn locate(&self, selector: &ClassSelector) -> Result<LocatedSource>;
}

/// Serves one in-memory module for every selector
///
/// Dotted selectors are taken as class paths inside that module.
#[derive(Debug, Clone)]
pub struct StaticSource {
    unit: SourceUnit,
}

impl StaticSource {
    pub fn new(path: impl Into<PathBuf>, text: impl Into<String>) -> Self {
        Self {
            unit: SourceUnit::new(path, text),
        }
    }
}

impl SourceProvider for StaticSource {
    fn locate(&self, selector: &ClassSelector) -> Result<LocatedSource> {
        let class_path = match selector {
            ClassSelector::InFile { class_path, .. } => class_path.clone(),
            ClassSelector::Dotted { dotted } => dotted.clone(),
        };
        Ok(LocatedSource {
            unit: self.unit.clone(),
            class_path,
        })
    }
}

/// Resolves selectors against module search roots on disk
///
/// `a/b.py::Name` is looked up relative to each root in order (absolute
/// paths are used as they are). `pkg.mod.Name` tries the longest module
/// prefix first, as `pkg/mod.py` and then `pkg/mod/__init__.py` under each
/// root.
#[derive(Debug, Clone)]
pub struct ModuleResolver {
    roots: Vec<PathBuf>,
}

impl ModuleResolver {
    pub fn new(roots: impl IntoIterator<Item = impl Into<PathBuf>>) -> Self {
        Self {
            roots: roots.into_iter().map(Into::into).collect(),
        }
    }

    /// Resolve against the current directory only
    pub fn current_dir() -> Self {
        Self::new([PathBuf::from(".")])
    }

    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }

    fn describe_roots(&self) -> String {
        self.roots
            .iter()
            .map(|root| root.display().to_string())
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn find_file(&self, path: &Path) -> Option<PathBuf> {
        if path.is_absolute() {
            return path.is_file().then(|| path.to_path_buf());
        }
        self.roots
            .iter()
            .map(|root| root.join(path))
            .find(|candidate| candidate.is_file())
    }

    fn find_module(&self, segments: &[&str]) -> Option<PathBuf> {
        let relative: PathBuf = segments.iter().collect();
        self.roots.iter().find_map(|root| {
            let base = root.join(&relative);
            let module = base.with_extension("py");
            if module.is_file() {
                return Some(module);
            }
            let package = base.join("__init__.py");
            package.is_file().then_some(package)
        })
    }
}

impl SourceProvider for ModuleResolver {
    fn locate(&self, selector: &ClassSelector) -> Result<LocatedSource> {
        let class_name = selector.to_string();

        let (path, class_path) = match selector {
            ClassSelector::InFile { path, class_path } => {
                let found = self.find_file(path).ok_or_else(|| {
                    UmlError::source_unavailable(
                        &class_name,
                        format!("no file {} under {}", path.display(), self.describe_roots()),
                    )
                })?;
                (found, class_path.clone())
            }
            ClassSelector::Dotted { dotted } => {
                let segments: Vec<&str> = dotted.split('.').collect();
                (1..segments.len())
                    .rev()
                    .find_map(|split| {
                        self.find_module(&segments[..split])
                            .map(|module| (module, segments[split..].join(".")))
                    })
                    .ok_or_else(|| {
                        UmlError::source_unavailable(
                            &class_name,
                            format!("no module for '{}' under {}", dotted, self.describe_roots()),
                        )
                    })?
            }
        };

        debug!(
            selector = %selector,
            path = %path.display(),
            class_path = %class_path,
            "located module"
        );

        let text = fs::read_to_string(&path).map_err(|e| {
            UmlError::source_unavailable(&class_name, format!("{}: {}", path.display(), e))
        })?;

        Ok(LocatedSource {
            unit: SourceUnit { path, text },
            class_path,
        })
    }
}

impl Default for ModuleResolver {
    fn default() -> Self {
        Self::current_dir()
    }
}
