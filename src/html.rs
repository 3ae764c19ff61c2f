//! Allow-list HTML sanitizer and block parser for verdict text.
//!
//! Both provider backends are instructed to format analysis and advice with
//! a small set of HTML tags.  The model output is still untrusted text, so
//! before anything is stored it passes through [`sanitize`], which keeps only
//! `<p>`, `<strong>`, `<ul>`, `<li>` and `<br>` (attributes stripped, every
//! other tag removed).  The verdict view then renders the sanitized string
//! via [`parse_blocks`] — there is no webview, so the HTML is turned into a
//! flat list of paragraphs and bullets with strong runs.

/// Tags that survive sanitization.  Everything else is dropped, keeping only
/// its inner text.
const ALLOWED_TAGS: &[&str] = &["p", "strong", "ul", "li", "br"];

// ---------------------------------------------------------------------------
// sanitize
// ---------------------------------------------------------------------------

/// Strip `input` down to the allow-listed tags.
///
/// * Allowed tags are re-emitted in normalized form (`<p>`, `</strong>`, …)
///   with any attributes removed; `<br/>` variants collapse to `<br>`.
/// * Disallowed tags are removed entirely; their inner text remains.
/// * A `<` that does not start a tag (next char is not a letter or `/`) is
///   escaped to `&lt;` and everything after it is kept as text, even when a
///   real tag follows later in the input.
pub fn sanitize(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(lt) = rest.find('<') {
        out.push_str(&rest[..lt]);
        let after = &rest[lt + 1..];

        let starts_tag = after
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_alphabetic() || c == '/');
        if !starts_tag {
            // Stray '<' in prose; must not swallow text up to the next '>'.
            out.push_str("&lt;");
            rest = after;
            continue;
        }

        match after.find('>') {
            Some(gt) => {
                let inner = &after[..gt];
                if let Some(tag) = normalize_tag(inner) {
                    out.push_str(&tag);
                }
                // Disallowed or malformed tag: dropped.
                rest = &after[gt + 1..];
            }
            None => {
                // Unterminated tag at end of input; escape and keep going.
                out.push_str("&lt;");
                rest = after;
            }
        }
    }

    out.push_str(rest);
    out
}

/// Parse the inside of a tag (`"p"`, `"/ul"`, `"br /"`, `"p class=x"`) and
/// return its normalized form when the tag name is allow-listed.
fn normalize_tag(inner: &str) -> Option<String> {
    let inner = inner.trim();
    let (closing, inner) = match inner.strip_prefix('/') {
        Some(rest) => (true, rest.trim_start()),
        None => (false, inner),
    };

    let name: String = inner
        .chars()
        .take_while(|c| c.is_ascii_alphanumeric())
        .collect::<String>()
        .to_ascii_lowercase();

    if !ALLOWED_TAGS.contains(&name.as_str()) {
        return None;
    }

    // Anything after the tag name must be attributes or a self-closing
    // slash; both are discarded.
    Some(if closing {
        format!("</{name}>")
    } else {
        format!("<{name}>")
    })
}

// ---------------------------------------------------------------------------
// Block model
// ---------------------------------------------------------------------------

/// A run of text with uniform styling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Span {
    pub text: String,
    /// `true` inside `<strong>…</strong>`.
    pub strong: bool,
}

/// One renderable unit of verdict text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    /// A `<p>` paragraph (or stray text outside any tag).
    Paragraph(Vec<Span>),
    /// A `<li>` item inside a list.
    Bullet(Vec<Span>),
}

impl Block {
    pub fn spans(&self) -> &[Span] {
        match self {
            Block::Paragraph(s) | Block::Bullet(s) => s,
        }
    }
}

// ---------------------------------------------------------------------------
// parse_blocks
// ---------------------------------------------------------------------------

/// Convert *sanitized* HTML into a flat list of [`Block`]s.
///
/// `<br>` becomes a newline inside the current block; the egui layer renders
/// newlines verbatim.  Basic entities (`&amp;` `&lt;` `&gt;` `&quot;`
/// `&#39;` `&nbsp;`) are decoded.  Input is expected to have passed through
/// [`sanitize`] first; unknown tags that somehow remain are treated as text.
pub fn parse_blocks(html: &str) -> Vec<Block> {
    let mut blocks = Vec::new();
    let mut spans: Vec<Span> = Vec::new();
    let mut strong_depth = 0usize;
    let mut in_bullet = false;

    let flush = |spans: &mut Vec<Span>, in_bullet: bool, blocks: &mut Vec<Block>| {
        let content = std::mem::take(spans);
        if content.iter().any(|s| !s.text.trim().is_empty()) {
            blocks.push(if in_bullet {
                Block::Bullet(content)
            } else {
                Block::Paragraph(content)
            });
        }
    };

    let mut rest = html;
    while let Some(lt) = rest.find('<') {
        push_text(&mut spans, &rest[..lt], strong_depth > 0);
        let after = &rest[lt + 1..];

        let Some(gt) = after.find('>') else {
            // Sanitized input never hits this, but stay total.
            push_text(&mut spans, "<", strong_depth > 0);
            rest = after;
            continue;
        };

        match after[..gt].trim() {
            "p" | "ul" => {
                flush(&mut spans, in_bullet, &mut blocks);
                in_bullet = false;
            }
            "/p" | "/ul" => {
                flush(&mut spans, in_bullet, &mut blocks);
                in_bullet = false;
            }
            "li" => {
                flush(&mut spans, in_bullet, &mut blocks);
                in_bullet = true;
            }
            "/li" => {
                flush(&mut spans, in_bullet, &mut blocks);
                in_bullet = false;
            }
            "strong" => strong_depth += 1,
            "/strong" => strong_depth = strong_depth.saturating_sub(1),
            "br" => push_text(&mut spans, "\n", strong_depth > 0),
            other => {
                // Not a tag we know — render it as literal text.
                push_text(&mut spans, &format!("<{other}>"), strong_depth > 0);
            }
        }

        rest = &after[gt + 1..];
    }

    push_text(&mut spans, rest, strong_depth > 0);
    flush(&mut spans, in_bullet, &mut blocks);

    blocks
}

/// Append decoded text to the span list, merging consecutive runs with the
/// same styling.
fn push_text(spans: &mut Vec<Span>, raw: &str, strong: bool) {
    if raw.is_empty() {
        return;
    }
    let text = decode_entities(raw);
    match spans.last_mut() {
        Some(last) if last.strong == strong => last.text.push_str(&text),
        _ => spans.push(Span { text, strong }),
    }
}

/// Decode the handful of entities the providers actually emit.
fn decode_entities(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let after = &rest[amp..];

        let replaced = [
            ("&amp;", "&"),
            ("&lt;", "<"),
            ("&gt;", ">"),
            ("&quot;", "\""),
            ("&#39;", "'"),
            ("&nbsp;", " "),
        ]
        .iter()
        .find(|(entity, _)| after.starts_with(entity));

        match replaced {
            Some((entity, value)) => {
                out.push_str(value);
                rest = &after[entity.len()..];
            }
            None => {
                out.push('&');
                rest = &after[1..];
            }
        }
    }

    out.push_str(rest);
    out
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
