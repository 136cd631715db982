use once_cell::sync::Lazy;
use regex::Regex;

/// Sentinels some hosted models leave at the end of a completion.
pub const END_OF_TEXT_MARKERS: &[&str] = &["<|end_of_text|>", "<|eot_id|>"];

static OPENING_FENCE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)```(?:jsx|tsx|javascript|typescript|html|css|js|ts)\b[ \t]*\r?\n?")
        .expect("opening fence pattern is valid")
});
static BARE_FENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"```[ \t]*\r?\n?").expect("closing fence pattern is valid"));
static HTML_WRAPPER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"</?html>[ \t]*\r?\n?").expect("html wrapper pattern is valid"));

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SanitizeOptions {
    /// Drop everything before the first `import`.
    pub strip_preamble: bool,
}

/// Turns a raw completion into bare source code.
///
/// The result never contains a code fence, an `<html>`/`</html>` tag or an
/// end-of-text sentinel, and sanitizing it again returns it unchanged.
pub fn sanitize(raw: &str, options: SanitizeOptions) -> String {
    // Removing one marker can join the halves of another, so repeat until
    // a pass changes nothing. Every pass that continues shortens the text.
    let mut text = raw.to_string();
    loop {
        let next = strip_markers(&text);
        if next == text {
            break;
        }
        text = next;
    }

    let text = if options.strip_preamble {
        match text.find("import") {
            Some(idx) => &text[idx..],
            None => text.as_str(),
        }
    } else {
        text.as_str()
    };

    text.trim().to_string()
}

fn strip_markers(text: &str) -> String {
    let text = OPENING_FENCE.replace_all(text, "");
    let text = BARE_FENCE.replace_all(&text, "");
    let text = HTML_WRAPPER.replace_all(&text, "");
    let mut text = text.into_owned();
    for marker in END_OF_TEXT_MARKERS {
        text = text.replace(marker, "");
    }
    text
}
