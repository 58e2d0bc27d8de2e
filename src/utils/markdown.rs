/// Utility functions for handling Telegram MarkdownV2 formatting
///
/// MarkdownV2 requires escaping of special characters to prevent formatting issues.
const SPECIAL: &[char] = &[
    '_', '*', '[', ']', '(', ')', '~', '`', '>', '#', '+', '-', '=', '|', '{', '}', '.', '!',
];

/// Escapes markdown special characters for MarkdownV2 parsing mode
///
/// # Example
/// ```
/// use calendar_chat_bot::utils::markdown::escape_markdown;
///
/// let text = "Созвон (важно)";
/// assert_eq!(escape_markdown(text), "Созвон \\(важно\\)");
/// ```
pub fn escape_markdown(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if SPECIAL.contains(&c) || c == '\\' {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Bold span with escaped contents.
pub fn bold(text: &str) -> String {
    format!("*{}*", escape_markdown(text))
}

/// Escapes text for use inside an inline link target, where only `)` and `\` are special.
pub fn escape_link_target(url: &str) -> String {
    url.replace('\\', "\\\\").replace(')', "\\)")
}
