//! Emits the `VERGEN_*` variables read by `src/version.rs`.

use vergen_gitcl::{Build, Emitter, Gitcl};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let build = Build::builder().build_timestamp(true).build();
    let git = Gitcl::builder().branch(true).sha(true).dirty(true).build();

    // Outside a git checkout vergen warns and emits placeholders.
    Emitter::default()
        .add_instructions(&build)?
        .add_instructions(&git)?
        .emit()?;

    Ok(())
}
