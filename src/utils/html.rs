use ammonia;

/// Clean HTML content using the ammonia library.
///
/// Whitelist-based sanitization for admin-authored text (quiz descriptions,
/// question text, choice labels): safe tags like <b> and <p> survive,
/// <script>/<iframe> and event-handler attributes are stripped before the
/// content ever reaches storage.
pub fn clean_html(input: &str) -> String {
    ammonia::clean(input)
}
