/// Sanitize extracted page text before it reaches the prompt.
///
/// Strips control characters (keeping newlines and tabs), trims lines and
/// drops blank ones. Superscripts, daggers and other footnote markers are
/// kept: they carry the author-to-affiliation mapping.
pub fn sanitize_extracted_text(raw: &str) -> String {
    raw.chars()
        .filter(|c| !c.is_control() || matches!(c, '\n' | '\t'))
        .collect::<String>()
        .lines()
        .map(|l| l.trim())
        .filter(|l| !l.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}
