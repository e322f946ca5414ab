//! Shared test utilities for uspack tests.

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::{BTreeSet, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use walkdir::WalkDir;

use uspack::config::Config;
use uspack::process::{Cmd, CommandResult, CommandRunner};

/// Graph CMake would export for the core library.
pub const CORE_GRAPH: &str = r#"digraph "CppMicroServices" {
node [
  fontsize = "12"
];
    "node0" [ label = "CppMicroServices", shape = doubleoctagon ];
    "node1" [ label = "dl", shape = septagon ];
    "node0" -> "node1" [ style = dotted ] // CppMicroServices -> dl
}
"#;

/// Test environment rooted in a temporary work directory.
pub struct TestEnv {
    /// Temporary directory (kept alive for lifetime of TestEnv)
    pub _temp_dir: TempDir,
    pub work_dir: PathBuf,
}

impl TestEnv {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let work_dir = temp_dir.path().to_path_buf();
        Self {
            _temp_dir: temp_dir,
            work_dir,
        }
    }

    /// Configuration for `platform` with everything else at defaults.
    pub fn config(&self, platform: &str) -> Config {
        let vars = HashMap::from([("USPACK_PLATFORM".to_string(), platform.to_string())]);
        Config::from_vars(&self.work_dir, &vars).expect("Failed to build config")
    }
}

/// How the mock build behaves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flavor {
    /// One shared library under lib/.
    Unix,
    /// Import library and DLL under build-type subdirectories.
    Windows,
}

/// Runner that records commands and fakes what git and cmake would do.
pub struct MockRunner {
    pub calls: RefCell<Vec<Cmd>>,
    /// Fail the first command whose rendered line contains this text.
    pub fail_on: Option<(&'static str, i32)>,
    /// Graph written for the primary target; `None` writes nothing.
    pub graph: Option<String>,
    pub flavor: Flavor,
}

impl MockRunner {
    pub fn new() -> Self {
        Self {
            calls: RefCell::new(Vec::new()),
            fail_on: None,
            graph: Some(CORE_GRAPH.to_string()),
            flavor: Flavor::Unix,
        }
    }

    pub fn failing_on(mut self, needle: &'static str, code: i32) -> Self {
        self.fail_on = Some((needle, code));
        self
    }

    pub fn without_graph(mut self) -> Self {
        self.graph = None;
        self
    }

    pub fn with_flavor(mut self, flavor: Flavor) -> Self {
        self.flavor = flavor;
        self
    }

    /// Rendered command lines, in call order.
    pub fn lines(&self) -> Vec<String> {
        self.calls.borrow().iter().map(|c| c.to_string()).collect()
    }
}

impl CommandRunner for MockRunner {
    fn execute(&self, cmd: &Cmd) -> anyhow::Result<CommandResult> {
        self.calls.borrow_mut().push(cmd.clone());

        if let Some((needle, code)) = self.fail_on {
            if cmd.to_string().contains(needle) {
                return Ok(CommandResult::failed(code, format!("mock failure: {}", needle)));
            }
        }

        let args = cmd.get_args();
        match (cmd.program(), args.first().map(String::as_str)) {
            ("git", Some("clone")) => {
                let dest = args.last().expect("clone destination");
                create_mock_source(Path::new(dest));
            }
            ("cmake", Some("--build")) => create_mock_build_output(Path::new(&args[1]), self.flavor),
            ("cmake", Some(arg)) if arg.starts_with("--graphviz=") => {
                if let Some(graph) = &self.graph {
                    let path = arg.trim_start_matches("--graphviz=");
                    fs::write(path, graph).expect("write graph");
                    fs::write(format!("{}.CppMicroServices", path), graph).expect("write graph");
                }
            }
            ("cmake", _) => {
                let build = args
                    .iter()
                    .find_map(|a| a.strip_prefix("-B"))
                    .expect("configure names a build dir");
                create_mock_configure_output(Path::new(build));
            }
            _ => {}
        }

        Ok(CommandResult::ok(""))
    }
}

pub fn write_file(path: &Path, content: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("Failed to create parent dir");
    }
    fs::write(path, content).expect("Failed to write file");
}

/// Upstream checkout with public and private headers for every bundle.
pub fn create_mock_source(root: &Path) {
    let files = [
        "CMakeLists.txt",
        "core/include/cppmicroservices/Bundle.h",
        "core/include/cppmicroservices/BundleContext.h",
        "core/src/bundle/BundlePrivate.h",
        "core/src/bundle/Bundle.cpp",
        "core/src/service/ServiceListeners.h",
        "core/src/util/Utils.h",
        "httpservice/include/cppmicroservices/httpservice/HttpServlet.h",
        "httpservice/src/HttpServletPrivate.h",
        "shellservice/include/cppmicroservices/shellservice/ShellService.h",
        "webconsole/include/cppmicroservices/webconsole/AbstractWebConsolePlugin.h",
        "third_party/miniz.h",
        "third_party/absl/base/config.h",
        "cmake/usFunctionAddResources.cmake",
        "cmake/usBundleInit.cpp",
        "cmake/templates/BundleActivator.cpp.in",
    ];
    for file in files {
        write_file(&root.join(file), file);
    }
}

fn create_mock_configure_output(build: &Path) {
    for name in [
        "CppMicroServicesConfig.cmake",
        "CppMicroServicesConfigVersion.cmake",
        "CppMicroServicesTargets.cmake",
    ] {
        write_file(&build.join(name), name);
    }
    // Per-directory CMake files must not reach the package root
    write_file(&build.join("core/CppMicroServicesTargets.cmake"), "nested");
}

fn create_mock_build_output(build: &Path, flavor: Flavor) {
    write_file(&build.join("include/cppmicroservices/GlobalConfig.h"), "global");
    write_file(
        &build.join("core/include/cppmicroservices/FrameworkConfig.h"),
        "generated",
    );
    match flavor {
        Flavor::Unix => {
            write_file(&build.join("lib/libCppMicroServices.so"), "so");
        }
        Flavor::Windows => {
            write_file(&build.join("lib/Release/CppMicroServices.lib"), "implib");
            write_file(&build.join("bin/Release/CppMicroServices.dll"), "dll");
            write_file(&build.join("bin/Release/usShell.exe"), "exe");
        }
    }
}

/// Every file under `root`, relative to it.
pub fn file_set(root: &Path) -> BTreeSet<PathBuf> {
    WalkDir::new(root)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.path().strip_prefix(root).unwrap().to_path_buf())
        .collect()
}

/// Assert that a file exists.
pub fn assert_file_exists(path: &Path) {
    assert!(path.is_file(), "Expected file to exist: {}", path.display());
}

/// Assert that a directory exists.
pub fn assert_dir_exists(path: &Path) {
    assert!(path.is_dir(), "Expected directory to exist: {}", path.display());
}
