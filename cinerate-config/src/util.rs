/// Parse a boolean environment variable; accepts 1/0, true/false, yes/no.
pub(crate) fn parse_bool_var(name: &str) -> Option<bool> {
    let raw = std::env::var(name).ok()?;
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" => Some(true),
        "0" | "false" | "no" => Some(false),
        _ => None,
    }
}

/// Parse a comma-separated environment variable into trimmed entries.
pub(crate) fn parse_csv_var(name: &str) -> Option<Vec<String>> {
    let raw = std::env::var(name).ok()?;
    let entries: Vec<String> = raw
        .split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(str::to_string)
        .collect();
    Some(entries)
}
