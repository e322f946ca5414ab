//! Link-dependency discovery from CMake's graphviz export.
//!
//! `cmake --graphviz=<file> <build>` writes one graph for the whole project
//! plus one `<file>.<target>` graph per target. We read the graph for the
//! primary library, take every node label in file order (the library's own
//! node included), and persist the names to [`MANIFEST_FILE`] inside the
//! build tree.
//!
//! Discovery is best-effort. A failing export yields
//! [`Extraction::Degraded`] with whatever was recovered, never an error.

use anyhow::Result;
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tracing::{debug, trace};

use crate::build::BuildTree;
use crate::process::{Cmd, CommandRunner};

/// Manifest written to the build tree and copied to the package root.
pub const MANIFEST_FILE: &str = "link_dependencies.txt";

/// Base name of the intermediate graph files.
const GRAPH_FILE: &str = "uspack-deps.dot";

/// Outcome of a dependency extraction that did not hit a hard failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Extraction {
    /// Export and parse succeeded.
    Complete(Vec<String>),
    /// Something went wrong; the list may be empty or partial.
    Degraded { deps: Vec<String>, reason: String },
}

impl Extraction {
    pub fn deps(&self) -> &[String] {
        match self {
            Self::Complete(deps) | Self::Degraded { deps, .. } => deps,
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, Self::Degraded { .. })
    }
}

fn label_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r#"^\s*"[^"]+"\s*\[\s*label\s*=\s*"([^"]+)""#).expect("label pattern is valid")
    })
}

/// Node labels of a graphviz export, one per label line, in file order.
pub fn parse_graph_labels(graph: &str) -> Vec<String> {
    graph
        .lines()
        .filter_map(|line| label_pattern().captures(line))
        .map(|caps| caps[1].to_string())
        .collect()
}

/// `cmake --graphviz=<graph> <build>`.
pub fn graphviz_cmd(cmake: &str, graph: &Path, build: &Path) -> Cmd {
    Cmd::new(cmake)
        .arg(format!("--graphviz={}", graph.display()))
        .arg_path(build)
        .allow_fail()
}

/// Export the dependency graph, filter it for `library` and write the manifest.
///
/// Only a missing build tree is a hard error. Export, parse and manifest
/// failures degrade the result; graph cleanup failures are ignored.
pub fn extract_dependencies(
    cmake: &str,
    build: &BuildTree,
    library: &str,
    runner: &dyn CommandRunner,
) -> Result<Extraction> {
    let build = BuildTree::open(&build.path)?;
    let graph = build.path.join(GRAPH_FILE);
    let target_graph = build.path.join(format!("{}.{}", GRAPH_FILE, library));

    let mut extraction = export_and_parse(cmake, &build, &graph, &target_graph, library, runner);

    let manifest = build.path.join(MANIFEST_FILE);
    if let Err(e) = write_manifest(&manifest, extraction.deps()) {
        extraction = Extraction::Degraded {
            deps: extraction.deps().to_vec(),
            reason: format!("failed to write {}: {}", manifest.display(), e),
        };
    }

    cleanup_graph_files(&build.path);

    match &extraction {
        Extraction::Complete(deps) => {
            println!("  Found {} link dependencies", deps.len());
        }
        Extraction::Degraded { reason, .. } => {
            eprintln!("  [WARN] Dependency extraction incomplete: {}", reason);
        }
    }

    Ok(extraction)
}

fn export_and_parse(
    cmake: &str,
    build: &BuildTree,
    graph: &Path,
    target_graph: &Path,
    library: &str,
    runner: &dyn CommandRunner,
) -> Extraction {
    let degraded = |reason: String| Extraction::Degraded {
        deps: Vec::new(),
        reason,
    };

    match graphviz_cmd(cmake, graph, &build.path).run(runner) {
        Ok(result) if !result.success() => {
            return degraded(format!(
                "graphviz export exited with code {}",
                result.code()
            ));
        }
        Ok(_) => {}
        Err(e) => return degraded(format!("graphviz export did not run: {:#}", e)),
    }

    let content = match fs::read_to_string(target_graph) {
        Ok(content) => content,
        Err(e) => {
            return degraded(format!(
                "no graph for '{}' at {}: {}",
                library,
                target_graph.display(),
                e
            ))
        }
    };

    let deps = parse_graph_labels(&content);
    debug!(count = deps.len(), graph = %target_graph.display(), "parsed graph labels");
    Extraction::Complete(deps)
}

fn write_manifest(path: &Path, deps: &[String]) -> std::io::Result<()> {
    let mut content = deps.join("\n");
    if !content.is_empty() {
        content.push('\n');
    }
    fs::write(path, content)
}

/// Read a manifest back; blank lines are skipped.
pub fn read_manifest(path: &Path) -> Result<Vec<String>> {
    let content = fs::read_to_string(path)?;
    Ok(content
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect())
}

fn cleanup_graph_files(build_dir: &Path) {
    let Ok(entries) = fs::read_dir(build_dir) else {
        return;
    };
    let graphs: Vec<PathBuf> = entries
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| {
            p.file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.starts_with(GRAPH_FILE))
        })
        .collect();

    for graph in graphs {
        if let Err(e) = fs::remove_file(&graph) {
            trace!(path = %graph.display(), error = %e, "graph cleanup failed");
        }
    }
}
