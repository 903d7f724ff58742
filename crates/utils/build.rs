use std::{env, process::Command};

fn main() {
    println!("cargo:rerun-if-env-changed=AGENCY_GIT_COMMIT");
    println!("cargo:rerun-if-env-changed=AGENCY_DEPLOYMENT");

    // Site deploys build from a source tarball without .git and pass the
    // commit in; local builds ask git.
    let commit = env::var("AGENCY_GIT_COMMIT").ok().or_else(|| {
        Command::new("git")
            .args(["rev-parse", "--short", "HEAD"])
            .output()
            .ok()
            .filter(|output| output.status.success())
            .map(|output| String::from_utf8_lossy(&output.stdout).trim().to_string())
    });
    if let Some(commit) = commit.filter(|c| !c.is_empty()) {
        println!("cargo:rustc-env=AGENCY_GIT_COMMIT={}", commit);
    }

    if let Ok(deployment) = env::var("AGENCY_DEPLOYMENT") {
        println!("cargo:rustc-env=AGENCY_DEPLOYMENT={}", deployment);
    }

    // ISO 8601, UTC
    if let Ok(output) = Command::new("date")
        .args(["-u", "+%Y-%m-%dT%H:%M:%SZ"])
        .output()
        && output.status.success()
    {
        let timestamp = String::from_utf8_lossy(&output.stdout).trim().to_string();
        println!("cargo:rustc-env=AGENCY_BUILD_TIMESTAMP={}", timestamp);
    }
}
