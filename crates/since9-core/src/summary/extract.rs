use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use super::{PackageSummary, UsageRecord};

/// Parentheses and the trailing "n usage(s) found" wording around a count.
static USAGE_NOISE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[()]| usages? found").expect("usage noise pattern is valid"));

const SOURCE_SUFFIX: &str = ".java";

/// A package line looks like `<the.package.name> (n usage[s] found)`.
pub fn extract_package_name(line: &str) -> &str {
    line.split_whitespace().next().unwrap_or_default()
}

/// A class line looks like `<ClassName>.java  (n usage[s] found)`; this reduces it to
/// `ClassName,n`, keeping the digits exactly as written.
///
/// Lines without a recognizable count come back cleaned but otherwise untouched.
pub fn extract_class_info(line: &str) -> String {
    let cleaned = USAGE_NOISE.replace_all(line.trim(), "");
    cleaned.replace("  ", ",").replacen(SOURCE_SUFFIX, "", 1)
}

/// Cleaned `package,n` form of a package line.
pub fn extract_package_info(line: &str) -> PackageSummary {
    let cleaned = USAGE_NOISE.replace_all(line.trim(), "");
    let mut tokens = cleaned.split_whitespace();
    let package = tokens.next().unwrap_or_default().to_string();
    let rest: Vec<_> = tokens.collect();
    let occurrence_count = if rest.is_empty() {
        debug!(%package, "package line carries no usage count");
        None
    } else {
        Some(rest.join(" "))
    };
    PackageSummary {
        package,
        occurrence_count,
    }
}

/// Build the record for a class line that belongs to `package`.
pub fn usage_record(package: &str, class_line: &str) -> UsageRecord {
    let info = extract_class_info(class_line);
    let (class_name, occurrence_count) = match info.split_once(',') {
        Some((name, count)) => (name.to_string(), Some(count.to_string())),
        None => (info, None),
    };
    if !occurrence_count.as_deref().is_some_and(is_plain_count) {
        debug!(%package, %class_name, ?occurrence_count, "class line has no clean usage count");
    }
    UsageRecord {
        package: package.to_string(),
        class_name,
        occurrence_count,
    }
}

fn is_plain_count(count: &str) -> bool {
    !count.is_empty() && count.bytes().all(|b| b.is_ascii_digit())
}
