//! Info command - prints the package info declaration.

use anyhow::Result;

use uspack::pipeline::Pipeline;

/// Execute the info command.
pub fn cmd_info(pipeline: &Pipeline<'_>, json: bool) -> Result<()> {
    let info = pipeline.info();
    if json {
        println!("{}", info.to_json()?);
    } else {
        info.print();
    }
    Ok(())
}
