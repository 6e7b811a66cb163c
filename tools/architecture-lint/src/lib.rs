//! Layer-boundary lint for the `client` crate.
//!
//! The client is split into `domain` (rules and ports), `inbound` (the CLI)
//! and `outbound` (HTTP and storage adapters). This crate parses every
//! source file under those directories with `syn` and rejects:
//!
//! - `domain` depending on `inbound`/`outbound` or on transport, CLI, or
//!   filesystem crates
//! - `inbound` importing `outbound` (wiring happens in `app.rs`)
//! - `outbound` importing `inbound`
//! - the HTTP client module naming the concrete `SessionStore`; it must go
//!   through the `SessionHandle` port
//!
//! Run it with `cargo run -p architecture-lint`.

use std::collections::BTreeSet;
use std::fmt;
use std::io;

use camino::{Utf8Path, Utf8PathBuf};
use cap_std::ambient_authority;
use cap_std::fs::Dir;
use syn::visit::Visit;

/// Source directories checked, relative to `client/src`.
const LAYER_DIRS: [&str; 3] = ["domain", "inbound", "outbound"];

/// Files that may only reach the session through its port.
const SESSION_PORT_ONLY: [&str; 2] = ["domain/api_client.rs", "domain/api_client/"];

/// A single boundary violation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// File path relative to `client/src`.
    pub file: Utf8PathBuf,
    /// Rule that was broken.
    pub message: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.file, self.message)
    }
}

/// Why linting failed.
#[derive(Debug)]
pub enum ArchitectureLintError {
    /// A directory or file could not be read.
    Io(io::Error),
    /// A path was outside the known layers or a file did not parse.
    Parse { file: Utf8PathBuf, message: String },
    /// Boundary violations, sorted by file.
    Violations(Vec<Violation>),
}

impl fmt::Display for ArchitectureLintError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(err) => write!(f, "failed to read client sources: {err}"),
            Self::Parse { file, message } => write!(f, "cannot lint {file}: {message}"),
            Self::Violations(violations) => {
                writeln!(f, "{} layer boundary violation(s):", violations.len())?;
                for violation in violations {
                    writeln!(f, "- {violation}")?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ArchitectureLintError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Parse { .. } | Self::Violations(_) => None,
        }
    }
}

impl From<io::Error> for ArchitectureLintError {
    fn from(value: io::Error) -> Self {
        Self::Io(value)
    }
}

/// A Rust source file to lint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LintSource {
    /// Path relative to `client/src`.
    pub file: Utf8PathBuf,
    /// File contents.
    pub contents: String,
}

impl LintSource {
    /// Convenience constructor for tests.
    pub fn new(file: impl Into<Utf8PathBuf>, contents: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            contents: contents.into(),
        }
    }
}

/// Lint the client crate rooted at `client_dir` (the directory holding its
/// `Cargo.toml`).
pub fn lint_client_sources(client_dir: &Utf8Path) -> Result<(), ArchitectureLintError> {
    let src = Dir::open_ambient_dir(client_dir.join("src"), ambient_authority())?;
    let mut sources = Vec::new();
    for layer in LAYER_DIRS {
        if !src.exists(layer) {
            continue;
        }
        collect_sources(&src.open_dir(layer)?, Utf8Path::new(layer), &mut sources)?;
    }
    lint_sources(&sources)
}

/// Lint in-memory sources.
pub fn lint_sources(sources: &[LintSource]) -> Result<(), ArchitectureLintError> {
    let mut violations = Vec::new();
    for source in sources {
        let layer = Layer::of(&source.file).ok_or_else(|| ArchitectureLintError::Parse {
            file: source.file.clone(),
            message: "not under domain/, inbound/ or outbound/".to_owned(),
        })?;
        let parsed = syn::parse_file(&source.contents).map_err(|err| ArchitectureLintError::Parse {
            file: source.file.clone(),
            message: err.to_string(),
        })?;
        violations.extend(check_file(&source.file, layer, &parsed));
    }
    violations.sort_by(|a, b| a.file.cmp(&b.file).then_with(|| a.message.cmp(&b.message)));
    if violations.is_empty() {
        Ok(())
    } else {
        Err(ArchitectureLintError::Violations(violations))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Layer {
    Domain,
    Inbound,
    Outbound,
}

impl Layer {
    fn of(file: &Utf8Path) -> Option<Self> {
        match file.components().next()?.as_str() {
            "domain" => Some(Self::Domain),
            "inbound" => Some(Self::Inbound),
            "outbound" => Some(Self::Outbound),
            _ => None,
        }
    }

    const fn name(self) -> &'static str {
        match self {
            Self::Domain => "domain",
            Self::Inbound => "inbound",
            Self::Outbound => "outbound",
        }
    }

    fn forbidden_modules(self) -> &'static [&'static str] {
        match self {
            Self::Domain => &["inbound", "outbound", "app"],
            Self::Inbound => &["outbound"],
            Self::Outbound => &["inbound", "app"],
        }
    }

    fn forbidden_crates(self) -> &'static [&'static str] {
        match self {
            Self::Domain => &["reqwest", "actix_web", "actix_rt", "clap", "cap_std", "tempfile"],
            Self::Inbound => &["reqwest", "cap_std", "actix_web"],
            Self::Outbound => &["clap", "actix_web"],
        }
    }
}

fn check_file(file: &Utf8Path, layer: Layer, parsed: &syn::File) -> Vec<Violation> {
    let mut collector = PathCollector::default();
    collector.visit_file(parsed);
    let port_only = SESSION_PORT_ONLY
        .iter()
        .any(|guarded| file.as_str() == *guarded || file.as_str().starts_with(guarded));

    let mut messages = BTreeSet::new();
    for segments in &collector.paths {
        if let Some(module) = internal_root(segments).filter(|root| layer.forbidden_modules().contains(root)) {
            messages.insert(format!("{} must not depend on crate::{module}", layer.name()));
        }
        if let Some(krate) = external_root(segments).filter(|root| layer.forbidden_crates().contains(root)) {
            messages.insert(format!("{} must not depend on `{krate}`", layer.name()));
        }
        if port_only && segments.iter().any(|segment| segment == "SessionStore") {
            messages.insert("the HTTP client must use the SessionHandle port, not SessionStore".to_owned());
        }
    }

    messages
        .into_iter()
        .map(|message| Violation {
            file: file.to_owned(),
            message,
        })
        .collect()
}

fn is_relative(segment: &str) -> bool {
    matches!(segment, "crate" | "self" | "super")
}

/// First crate-internal module named by a path, if the path is internal.
fn internal_root(segments: &[String]) -> Option<&str> {
    let first = segments.first()?.as_str();
    let index = match first {
        "crate" | "self" | "super" => segments.iter().position(|segment| !is_relative(segment))?,
        "ego_house" => 1,
        _ if LAYER_DIRS.contains(&first) => 0,
        _ => return None,
    };
    segments.get(index).map(String::as_str)
}

fn external_root(segments: &[String]) -> Option<&str> {
    let root = segments.first()?.as_str();
    (!is_relative(root) && root != "ego_house").then_some(root)
}

#[derive(Default)]
struct PathCollector {
    paths: BTreeSet<Vec<String>>,
}

impl PathCollector {
    fn use_tree(&mut self, tree: &syn::UseTree, mut prefix: Vec<String>) {
        match tree {
            syn::UseTree::Path(path) => {
                prefix.push(path.ident.to_string());
                self.use_tree(&path.tree, prefix);
            }
            syn::UseTree::Name(name) => {
                prefix.push(name.ident.to_string());
                self.paths.insert(prefix);
            }
            syn::UseTree::Rename(rename) => {
                prefix.push(rename.ident.to_string());
                self.paths.insert(prefix);
            }
            syn::UseTree::Glob(_) => {
                prefix.push("*".to_owned());
                self.paths.insert(prefix);
            }
            syn::UseTree::Group(group) => {
                for item in &group.items {
                    self.use_tree(item, prefix.clone());
                }
            }
        }
    }
}

impl<'ast> Visit<'ast> for PathCollector {
    fn visit_path(&mut self, node: &'ast syn::Path) {
        let segments: Vec<String> = node.segments.iter().map(|s| s.ident.to_string()).collect();
        if !segments.is_empty() {
            self.paths.insert(segments);
        }
        syn::visit::visit_path(self, node);
    }

    fn visit_item_use(&mut self, node: &'ast syn::ItemUse) {
        self.use_tree(&node.tree, Vec::new());
    }
}

fn collect_sources(
    dir: &Dir,
    relative: &Utf8Path,
    sources: &mut Vec<LintSource>,
) -> Result<(), ArchitectureLintError> {
    for entry in dir.entries()? {
        let entry = entry?;
        let name = entry.file_name().into_string().map_err(|raw| ArchitectureLintError::Parse {
            file: relative.to_owned(),
            message: format!("non UTF-8 file name {raw:?}"),
        })?;
        let path = relative.join(&name);
        if entry.file_type()?.is_dir() {
            collect_sources(&entry.open_dir()?, &path, sources)?;
        } else if path.extension() == Some("rs") {
            sources.push(LintSource {
                contents: dir.read_to_string(&name)?,
                file: path,
            });
        }
    }
    Ok(())
}
