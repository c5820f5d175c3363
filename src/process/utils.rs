/// Trim whitespace + strip outer quotes if present.
pub fn clean_str(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.starts_with('"') && trimmed.ends_with('"') && trimmed.len() >= 2 {
        trimmed[1..trimmed.len() - 1].trim().to_string()
    } else {
        trimmed.to_string()
    }
}

/// Join parts with `" - "` only when every part is present.
///
/// Sources compose descriptive strings like `"Internal - Blockage"`; a row
/// missing any component yields no composite rather than a partial one.
pub fn join_all(parts: &[Option<String>]) -> Option<String> {
    let mut out: Vec<&str> = Vec::with_capacity(parts.len());
    for p in parts {
        out.push(p.as_deref()?);
    }
    Some(out.join(" - "))
}

/// Prefix a present value, e.g. `"Type 2"` from `Some("2")`.
pub fn prefixed(prefix: &str, value: Option<String>) -> Option<String> {
    value.map(|v| format!("{} {}", prefix, v))
}
