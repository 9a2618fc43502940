//! Build-time version details for `kc --version`.
//!
//! - `KC_BUILD_TIMESTAMP`: UTC build time, taken from `SOURCE_DATE_EPOCH` when
//!   set so packaged builds are reproducible
//! - `KC_GIT_COMMIT`: short commit hash; a `KC_GIT_COMMIT` variable in the
//!   build environment wins over git (release tarballs have no `.git`)

use std::env;
use std::process::Command;

use chrono::{DateTime, Utc};

fn main() {
    println!("cargo:rerun-if-changed=.git/HEAD");
    println!("cargo:rerun-if-changed=.git/index");
    println!("cargo:rerun-if-env-changed=SOURCE_DATE_EPOCH");
    println!("cargo:rerun-if-env-changed=KC_GIT_COMMIT");

    let built_at = source_date_epoch().unwrap_or_else(Utc::now);
    println!(
        "cargo:rustc-env=KC_BUILD_TIMESTAMP={}",
        built_at.format("%Y-%m-%dT%H:%M:%SZ")
    );

    let commit = env::var("KC_GIT_COMMIT")
        .ok()
        .filter(|c| !c.trim().is_empty())
        .or_else(git_commit)
        .unwrap_or_else(|| "unknown".to_string());
    println!("cargo:rustc-env=KC_GIT_COMMIT={}", commit.trim());
}

fn source_date_epoch() -> Option<DateTime<Utc>> {
    let secs = env::var("SOURCE_DATE_EPOCH").ok()?.trim().parse::<i64>().ok()?;
    DateTime::from_timestamp(secs, 0)
}

fn git_commit() -> Option<String> {
    let output = Command::new("git")
        .args(["rev-parse", "--short", "HEAD"])
        .output()
        .ok()?;
    if !output.status.success() {
        return None;
    }
    let hash = String::from_utf8(output.stdout).ok()?;
    let hash = hash.trim();
    (!hash.is_empty()).then(|| hash.to_string())
}
