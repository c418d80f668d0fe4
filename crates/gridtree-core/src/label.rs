//! Human-readable labels for field and table names

use crate::tree::ChildTableNode;

/// Turn a `snake_case` or `camelCase` field name into a display label.
///
/// Underscores become spaces, a space is inserted before each internal
/// capital letter, and every word starts with a capital letter. Runs of
/// separators collapse to a single space.
///
/// ```
/// use gridtree_core::format_field_label;
///
/// assert_eq!(format_field_label("user_id"), "User Id");
/// assert_eq!(format_field_label("pageTitle"), "Page Title");
/// ```
pub fn format_field_label(field: &str) -> String {
    let mut spaced = String::with_capacity(field.len() + 4);
    for ch in field.chars() {
        if ch == '_' {
            spaced.push(' ');
            continue;
        }
        if ch.is_uppercase() && !spaced.is_empty() {
            spaced.push(' ');
        }
        spaced.push(ch);
    }

    spaced
        .split_whitespace()
        .map(capitalize_first)
        .collect::<Vec<_>>()
        .join(" ")
}

fn capitalize_first(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Tab label for a child table: its configured plural name, else the
/// formatted table name.
pub fn format_tab_name(table_name: &str, node: Option<&ChildTableNode>) -> String {
    node.and_then(ChildTableNode::plural_name)
        .map(str::to_string)
        .unwrap_or_else(|| format_field_label(table_name))
}
