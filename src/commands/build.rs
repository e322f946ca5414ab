//! Pipeline phase commands.

use anyhow::Result;

use uspack::deps::Extraction;
use uspack::pipeline::Pipeline;

/// Which phase(s) to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Clone the upstream source
    Source,
    /// Configure and build
    Build,
    /// Extract link dependencies
    Deps,
    /// Harvest into the package tree
    Package,
    /// Everything, in order
    Create,
}

/// Execute one phase or the whole pipeline.
pub fn cmd_build(pipeline: &Pipeline<'_>, phase: Phase) -> Result<()> {
    match phase {
        Phase::Source => {
            let tree = pipeline.source()?;
            println!("Source tree: {} ({})", tree.path.display(), tree.branch);
        }
        Phase::Build => {
            let (_, build) = pipeline.build()?;
            println!("Build tree: {}", build.path.display());
        }
        Phase::Deps => print_dependencies(&pipeline.dependencies()?),
        Phase::Package => {
            let (package, _) = pipeline.package()?;
            println!("Package tree: {}", package.root.display());
        }
        Phase::Create => {
            let report = pipeline.create()?;
            print_dependencies(&report.dependencies);
            report.info.print();
        }
    }
    Ok(())
}

fn print_dependencies(extraction: &Extraction) {
    if extraction.deps().is_empty() {
        println!("Link dependencies: (none found)");
        return;
    }
    println!("Link dependencies:");
    for dep in extraction.deps() {
        println!("  {}", dep);
    }
}
