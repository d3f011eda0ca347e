/// Splits an edited tag string on `,`, trimming and dropping empty pieces.
/// Order and duplicates are kept as typed.
#[must_use]
pub fn parse_tag_text(text: &str) -> Vec<String> {
    text.split(',')
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(ToString::to_string)
        .collect()
}

/// Inverse of [`parse_tag_text`] for pre-filling an edit field.
#[must_use]
pub fn format_tag_text(tags: &[String]) -> String {
    tags.join(", ")
}
