/// Trim and lowercase a free-text value for comparisons
pub fn normalize(value: &str) -> String {
    value.trim().to_lowercase()
}

/// Uppercase the first character, leaving the rest untouched
pub fn capitalize_first(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Split a pasted blob into item names on commas and newlines
pub fn split_names(input: &str) -> Vec<String> {
    input
        .split(|c: char| c == ',' || c == '\n' || c == '\r')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}
