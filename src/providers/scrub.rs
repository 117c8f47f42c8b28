use std::borrow::Cow;

const MAX_API_ERROR_CHARS: usize = 200;

const REDACTED: &str = "[REDACTED]";

/// Markers followed by a credential. The marker itself is redacted with the token
/// for key prefixes; for URL and header markers only the token is replaced.
const PREFIX_PATTERNS: [&str; 3] = ["sk-", "sess-", "org-"];

const MARKER_PATTERNS: [&str; 6] = [
    "/bot",
    "Authorization: Bearer ",
    "authorization: bearer ",
    "Bearer ",
    "api_key=",
    "\"api_key\":\"",
];

fn is_secret_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | ':' | '+' | '=')
}

fn token_end(input: &str, from: usize) -> usize {
    input[from..]
        .char_indices()
        .find(|(_, c)| !is_secret_char(*c))
        .map_or(input.len(), |(i, _)| from + i)
}

/// Replace every token that follows `marker`. With `keep_marker` the marker text
/// survives so the redacted output still reads as a URL or header.
fn scrub_after_marker(scrubbed: &mut String, marker: &str, keep_marker: bool) {
    let mut search_from = 0;
    while let Some(rel) = scrubbed[search_from..].find(marker) {
        let start = search_from + rel;
        let content_start = start + marker.len();
        let end = token_end(scrubbed, content_start);

        // Skip bare markers without a token value.
        if end == content_start {
            search_from = content_start;
            continue;
        }

        let replace_from = if keep_marker { content_start } else { start };
        scrubbed.replace_range(replace_from..end, REDACTED);
        search_from = replace_from + REDACTED.len();
    }
}

/// Scrub credential-like patterns from provider and transport error strings.
///
/// Covers OpenAI keys (`sk-...`), bearer headers and Telegram bot tokens
/// embedded in request URLs (`/bot<token>/getUpdates`).
pub fn scrub_secret_patterns(input: &str) -> Cow<'_, str> {
    let needs_scrubbing = PREFIX_PATTERNS
        .iter()
        .chain(MARKER_PATTERNS.iter())
        .any(|pattern| input.contains(pattern));
    if !needs_scrubbing {
        return Cow::Borrowed(input);
    }

    let mut scrubbed = input.to_string();
    for pattern in PREFIX_PATTERNS {
        scrub_after_marker(&mut scrubbed, pattern, false);
    }
    for marker in MARKER_PATTERNS {
        scrub_after_marker(&mut scrubbed, marker, true);
    }
    Cow::Owned(scrubbed)
}

/// Sanitize API error text by scrubbing secrets and truncating length.
pub fn sanitize_api_error(input: &str) -> String {
    let scrubbed = scrub_secret_patterns(input);

    if scrubbed.chars().count() <= MAX_API_ERROR_CHARS {
        return scrubbed.into_owned();
    }

    let truncated: String = scrubbed.chars().take(MAX_API_ERROR_CHARS).collect();
    format!("{truncated}...")
}

/// Build a sanitized provider error from a failed HTTP response.
pub async fn api_error(provider: &str, response: reqwest::Response) -> anyhow::Error {
    let status = response.status();
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "<failed to read provider error body>".to_string());
    let sanitized = sanitize_api_error(&body);
    anyhow::anyhow!("{provider} API error ({status}): {sanitized}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn leaves_clean_text_borrowed() {
        let input = "model overloaded, try again";
        assert!(matches!(scrub_secret_patterns(input), Cow::Borrowed(_)));
    }

    #[test]
    fn redacts_openai_key() {
        let out = scrub_secret_patterns("Incorrect API key provided: sk-proj-abc123XYZ.");
        assert!(!out.contains("abc123"));
        assert!(out.contains(REDACTED));
    }

    #[test]
    fn redacts_telegram_token_in_url_but_keeps_method() {
        let out = scrub_secret_patterns(
            "error sending request for url (https://api.telegram.org/bot123456:AAE-secret_Tok/getUpdates)",
        );
        assert!(!out.contains("AAE-secret_Tok"));
        assert!(out.contains("/bot[REDACTED]/getUpdates"));
    }

    #[test]
    fn redacts_bearer_header() {
        let out = scrub_secret_patterns("Authorization: Bearer abc.def.ghi");
        assert_eq!(out, "Authorization: Bearer [REDACTED]");
    }

    #[test]
    fn bare_marker_without_token_is_untouched() {
        let out = scrub_secret_patterns("path ends with /bot");
        assert_eq!(out, "path ends with /bot");
    }

    #[test]
    fn sanitize_truncates_long_bodies() {
        let long = "x".repeat(500);
        let out = sanitize_api_error(&long);
        assert_eq!(out.chars().count(), MAX_API_ERROR_CHARS + 3);
        assert!(out.ends_with("..."));
    }

    #[test]
    fn sanitize_truncates_on_char_boundary() {
        let long = "é".repeat(300);
        let out = sanitize_api_error(&long);
        assert!(out.starts_with('é'));
        assert!(out.ends_with("..."));
    }
}
