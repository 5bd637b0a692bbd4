//! Stamps the build time into `VIM_TEXT_BUILD_STAMP` for `vim-text --version`.
//! Set the variable in the environment to pin it.

use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

const STAMP_VAR: &str = "VIM_TEXT_BUILD_STAMP";

/// Current UTC time in whole seconds, e.g. `2024-05-01T12:30:00Z`.
fn utc_now() -> Option<String> {
    let secs = OffsetDateTime::now_utc().unix_timestamp();
    OffsetDateTime::from_unix_timestamp(secs).ok()?.format(&Rfc3339).ok()
}

fn main() {
    let stamp = std::env::var(STAMP_VAR)
        .ok()
        .or_else(utc_now)
        .unwrap_or_else(|| "unknown".to_string());
    println!("cargo:rustc-env={}={}", STAMP_VAR, stamp);
    println!("cargo:rerun-if-env-changed={}", STAMP_VAR);
}
