pub fn get_version() -> String {
    let version = env!("CARGO_PKG_VERSION");

    if env!("VERGEN_GIT_SHA") == "VERGEN_IDEMPOTENT_OUTPUT" {
        version.to_string()
    } else {
        format!("{} ({})", version, short_sha(env!("VERGEN_GIT_SHA")))
    }
}

fn short_sha(sha: &str) -> &str {
    sha.get(..7).unwrap_or(sha)
}
