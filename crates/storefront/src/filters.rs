//! Askama filters for the site shell.

use std::fmt::Display;

use chrono::Datelike;

/// Footer copyright line for `holder`, dated with the current year.
///
/// Usage in templates: `{{ brand_name|copyright }}`
#[allow(clippy::unnecessary_wraps)]
#[askama::filter_fn]
pub fn copyright(holder: impl Display, _env: &dyn askama::Values) -> askama::Result<String> {
    Ok(copyright_notice(chrono::Utc::now().year(), &holder))
}

fn copyright_notice(year: i32, holder: &impl Display) -> String {
    format!("\u{a9} {year} {holder}. All Rights Reserved.")
}
