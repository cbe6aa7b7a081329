use anyhow::Result;
use vergen::EmitBuilder;

// VERGEN_GIT_SHA feeds `gxsmread --version`; outside a git checkout it is
// left unset and the binary reports the package version alone.
fn main() -> Result<()> {
    EmitBuilder::builder().git_sha(true).emit()?;
    Ok(())
}
