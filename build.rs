use anyhow::Error;
use vergen_gitcl::{Emitter, GitclBuilder};

/// container and tarball builds have no `.git`, so the sha can be handed in.
const SHA_OVERRIDE: &str = "QUOTEBOARD_GIT_SHA";

fn main() -> Result<(), Error> {
    // embedded by `sqlx::migrate!`
    println!("cargo:rerun-if-changed=migrations");
    println!("cargo:rerun-if-env-changed={SHA_OVERRIDE}");

    match std::env::var(SHA_OVERRIDE) {
        Ok(sha) if !sha.trim().is_empty() => {
            println!("cargo:rustc-env=VERGEN_GIT_SHA={}", sha.trim());
        }
        _ => {
            let gitcl = GitclBuilder::default().sha(true).build()?;
            Emitter::default().add_instructions(&gitcl)?.emit()?;
        }
    }

    Ok(())
}
