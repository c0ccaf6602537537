//! Stamps xicon-server with its build identity
//!
//! `/api/buildinfo` and the startup log read `GIT_HASH`, `BUILD_TIMESTAMP`
//! and `BUILD_PROFILE`. Hosted builds usually ship without a `.git`
//! directory, so `XICON_GIT_HASH` may supply the commit instead.

use std::env;
use std::process::Command;

const UNKNOWN: &str = "unknown";

fn git_short_hash() -> Option<String> {
    let output = Command::new("git")
        .args(["rev-parse", "--short=8", "HEAD"])
        .output()
        .ok()
        .filter(|output| output.status.success())?;
    let hash = String::from_utf8(output.stdout).ok()?;
    Some(hash.trim().to_string()).filter(|h| !h.is_empty())
}

fn main() {
    let git_hash = env::var("XICON_GIT_HASH")
        .ok()
        .map(|h| h.trim().chars().take(8).collect::<String>())
        .filter(|h| !h.is_empty())
        .or_else(git_short_hash)
        .unwrap_or_else(|| UNKNOWN.to_string());

    let stamp = chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true);
    let profile = env::var("PROFILE").unwrap_or_else(|_| UNKNOWN.to_string());

    // No rerun-if directives: the stamp is refreshed on every build.
    for (key, value) in [
        ("GIT_HASH", git_hash),
        ("BUILD_TIMESTAMP", stamp),
        ("BUILD_PROFILE", profile),
    ] {
        println!("cargo:rustc-env={}={}", key, value);
    }
}
