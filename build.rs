use std::env;
use std::process::Command;
use std::time::{SystemTime, UNIX_EPOCH};

// Stamps the binary with the revision it was built from. Release pipelines
// building from a tarball set COVVAR_BUILD_HASH instead.
fn main() {
    let hash = env::var("COVVAR_BUILD_HASH")
        .ok()
        .filter(|value| !value.trim().is_empty())
        .unwrap_or_else(git_revision);

    let epoch = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);

    println!("cargo:rustc-env=BUILD_HASH={hash}");
    println!("cargo:rustc-env=BUILD_EPOCH={epoch}");
    println!("cargo:rerun-if-env-changed=COVVAR_BUILD_HASH");
    println!("cargo:rerun-if-changed=.git/HEAD");
    println!("cargo:rerun-if-changed=.git/index");
}

fn git_revision() -> String {
    let Some(mut hash) = git(&["rev-parse", "--short", "HEAD"]).filter(|hash| !hash.is_empty())
    else {
        return "unknown".to_string();
    };
    if git(&["status", "--porcelain", "-uno"]).is_some_and(|status| !status.is_empty()) {
        hash.push('*');
    }
    hash
}

fn git(args: &[&str]) -> Option<String> {
    Command::new("git")
        .args(args)
        .output()
        .ok()
        .filter(|out| out.status.success())
        .map(|out| String::from_utf8_lossy(&out.stdout).trim().to_string())
}
