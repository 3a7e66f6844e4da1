pub const AFFILIATION_SYSTEM_PROMPT: &str = r#"
You are a bibliographic extraction assistant. Your ONLY role is to read the
first pages of a research paper and list its authors with their affiliations.

RULES:
1. Extract ONLY information explicitly present in the text.
2. Include authors only. Exclude editors, reviewers, translators and anyone
   listed in acknowledgements.
3. Preserve the mapping between authors and affiliations. Superscripts,
   symbols (*, †, ‡) and footnote markers link an author to an affiliation.
4. If a field is missing for an author, output null for that field.
5. Output valid JSON only. No prose, no explanations, no markdown fences.
"#;

/// Cut `text` to at most `max_chars` characters, on a char boundary.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => &text[..byte_idx],
        None => text,
    }
}

/// Build the user prompt for one paper. `text` must already be truncated.
pub fn build_affiliation_prompt(text: &str, fields: &[&str]) -> String {
    let example_fields = fields
        .iter()
        .map(|f| format!("\"{f}\": \"... or null\""))
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        r#"<paper>
{text}
</paper>

Extract every author of the paper above. Return a JSON object with a single key
"authors" whose value is an array. Each element must have exactly these fields:
{fields_list}.

Example: {{"authors": [{{{example_fields}}}]}}

Use null for any field that is not stated. Return valid JSON only."#,
        fields_list = fields.join(", "),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline_config::SERVICE_FIELDS;

    #[test]
    fn truncate_shorter_text_unchanged() {
        assert_eq!(truncate_chars("hello", 10), "hello");
        assert_eq!(truncate_chars("hello", 5), "hello");
    }

    #[test]
    fn truncate_cuts_at_char_count() {
        assert_eq!(truncate_chars("hello world", 5), "hello");
        assert_eq!(truncate_chars("abc", 0), "");
    }

    #[test]
    fn truncate_respects_multibyte_chars() {
        let text = "Zürich¹ München²";
        let cut = truncate_chars(text, 7);
        assert_eq!(cut, "Zürich¹");
        assert_eq!(cut.chars().count(), 7);
    }

    #[test]
    fn prompt_lists_every_field_and_the_text() {
        let prompt = build_affiliation_prompt("Jane Doe, MIT", &SERVICE_FIELDS);
        for field in SERVICE_FIELDS {
            assert!(prompt.contains(field), "missing {field}");
        }
        assert!(prompt.contains("Jane Doe, MIT"));
        assert!(!prompt.contains("paper_name"));
    }

    #[test]
    fn prompt_is_deterministic() {
        let a = build_affiliation_prompt("x", &SERVICE_FIELDS);
        let b = build_affiliation_prompt("x", &SERVICE_FIELDS);
        assert_eq!(a, b);
    }

    #[test]
    fn system_prompt_excludes_non_authors() {
        assert!(AFFILIATION_SYSTEM_PROMPT.contains("Exclude editors"));
        assert!(AFFILIATION_SYSTEM_PROMPT.contains("null"));
        assert!(AFFILIATION_SYSTEM_PROMPT.contains("valid JSON only"));
    }
}
