//! String sanitization applied to JSON request bodies
//!
//! Every string value is HTML-escaped, stripped of script-like fragments and
//! control characters, then trimmed. The pass is repeated until the output is
//! stable, so sanitizing already sanitized input is a no-op.

use regex::Regex;
use serde_json::Value;
use std::sync::OnceLock;

/// Sanitize every string inside a JSON value, keeping its structure
pub fn sanitize_value(value: Value) -> Value {
    match value {
        Value::String(s) => Value::String(sanitize_string(&s)),
        Value::Array(items) => Value::Array(items.into_iter().map(sanitize_value).collect()),
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(key, value)| (key, sanitize_value(value)))
                .collect(),
        ),
        other => other,
    }
}

/// Sanitize a single string
pub fn sanitize_string(input: &str) -> String {
    let mut current = sanitize_once(input);

    // after the first pass only removals can change the text, so this ends
    loop {
        let next = sanitize_once(&current);
        if next == current {
            return current;
        }
        current = next;
    }
}

fn sanitize_once(input: &str) -> String {
    let mut text = escape_html(input);

    for pattern in dangerous_patterns() {
        text = pattern.replace_all(&text, "").into_owned();
    }

    control_chars().replace_all(&text, "").trim().to_string()
}

/// Escape HTML special characters, leaving existing character references intact
fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());

    for (index, ch) in input.char_indices() {
        match ch {
            '&' if entity().is_match(&input[index..]) => out.push('&'),
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            other => out.push(other),
        }
    }

    out
}

fn entity() -> &'static Regex {
    static ENTITY: OnceLock<Regex> = OnceLock::new();
    ENTITY.get_or_init(|| {
        Regex::new(r"^&(?:[A-Za-z][A-Za-z0-9]{1,31}|#[0-9]{1,7}|#[xX][0-9A-Fa-f]{1,6});")
            .expect("Failed to compile entity regex")
    })
}

fn dangerous_patterns() -> &'static [Regex] {
    static PATTERNS: OnceLock<Vec<Regex>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        [
            r"(?is)<script[^>]*>.*?</script>",
            r"(?i)javascript:",
            r"(?i)on\w+\s*=",
            r"(?is)<iframe[^>]*>.*?</iframe>",
            r"(?is)<object[^>]*>.*?</object>",
            r"(?i)<embed[^>]*>",
        ]
        .iter()
        .map(|pattern| Regex::new(pattern).expect("Failed to compile sanitizer pattern"))
        .collect()
    })
}

fn control_chars() -> &'static Regex {
    static CONTROL: OnceLock<Regex> = OnceLock::new();
    CONTROL.get_or_init(|| {
        Regex::new(r"[\x00-\x08\x0B\x0C\x0E-\x1F\x7F]")
            .expect("Failed to compile control character regex")
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_escapes_markup() {
        assert_eq!(
            sanitize_string("<b>\"hi\"</b> & 'you'"),
            "&lt;b&gt;&quot;hi&quot;&lt;/b&gt; &amp; &#x27;you&#x27;"
        );
        assert_eq!(
            sanitize_string("<script>alert(1)</script>"),
            "&lt;script&gt;alert(1)&lt;/script&gt;"
        );
    }

    #[test]
    fn test_strips_script_fragments() {
        assert_eq!(sanitize_string("javascript:alert(1)"), "alert(1)");
        assert_eq!(sanitize_string("JavaScript:go"), "go");
        assert_eq!(sanitize_string("x onclick = evil"), "x  evil");
        assert_eq!(sanitize_string("jajavascript:vascript:run"), "run");
    }

    #[test]
    fn test_strips_control_chars_and_trims() {
        assert_eq!(sanitize_string("  hi\u{0}there\u{7f} \n"), "hithere");
        assert_eq!(sanitize_string("line\nbreak\ttab"), "line\nbreak\ttab");
    }

    #[test]
    fn test_existing_entities_are_kept() {
        assert_eq!(sanitize_string("&amp; &lt; &#39; &#x27;"), "&amp; &lt; &#39; &#x27;");
        assert_eq!(sanitize_string("fish & chips"), "fish &amp; chips");
        assert_eq!(sanitize_string("&nope"), "&amp;nope");
    }

    #[test]
    fn test_sanitize_is_idempotent() {
        let samples = [
            "<b>\"quoted\"</b> & 'single'",
            "<script>x</script>",
            "jajavascript:vascript:",
            "oonclick=nclick=x",
            "  tabs\tand\u{1}ctrl  ",
            "fish &amp chips &amp; more",
            "plain text",
        ];

        for sample in samples {
            let once = sanitize_string(sample);
            assert_eq!(sanitize_string(&once), once, "not idempotent for {sample:?}");
        }
    }

    #[test]
    fn test_sanitize_value_walks_structure() {
        let value = json!({
            "message": " <i>hi</i> ",
            "nested": {"list": ["javascript:x", 1, true, null]},
            "count": 3
        });

        assert_eq!(
            sanitize_value(value),
            json!({
                "message": "&lt;i&gt;hi&lt;/i&gt;",
                "nested": {"list": ["x", 1, true, null]},
                "count": 3
            })
        );
    }
}
