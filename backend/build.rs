//! Embeds the short commit hash of HEAD as the build version string.
//!
//! Builds outside a git checkout (crate tarballs, CI exports) fall back
//! to a placeholder instead of failing.

use std::process::Command;

const FALLBACK: &str = "unknown";

fn short_commit_hash() -> Option<String> {
    let output = Command::new("git")
        .args(["rev-parse", "--short", "HEAD"])
        .output()
        .ok()?;
    if !output.status.success() {
        return None;
    }
    let hash = String::from_utf8(output.stdout).ok()?;
    let hash = hash.trim();
    if hash.is_empty() {
        return None;
    }
    Some(hash.to_owned())
}

fn main() {
    // Re-run when HEAD moves so the embedded hash stays current.
    println!("cargo:rerun-if-changed=../.git/HEAD");

    let hash = match short_commit_hash() {
        Some(hash) => hash,
        None => {
            println!("cargo:warning=not a git checkout; build version falls back to '{FALLBACK}'");
            FALLBACK.to_owned()
        }
    };
    println!("cargo:rustc-env=BUILD_COMMIT_HASH={hash}");
}
