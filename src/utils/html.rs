// src/utils/html.rs

/// Sanitises admin-entered rich text (job descriptions, notes) before it is stored.
///
/// Safe formatting tags such as `<b>` or `<ul>` survive; `<script>` blocks,
/// event-handler attributes and similar are removed.
pub fn clean_html(input: &str) -> String {
    ammonia::clean(input.trim())
}
