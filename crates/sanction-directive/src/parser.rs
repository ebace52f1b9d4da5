// parser.rs — Tolerant tag scanner.
//
// Wire format:
//
//   <sanction-chat-summary>free text</sanction-chat-summary>
//   <sanction-write path="src/a.ts" description="optional">raw content</sanction-write>
//
// The scanner walks the text looking for `<sanction-`. At each hit it tries
// to read a well-formed opening tag, then searches for the matching close.
// Anything it can't make sense of is recorded as a ParseAnomaly and skipped;
// scanning resumes right after the offending opening tag so later directives
// are still found. Nothing here allocates per character or can panic on
// arbitrary input.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::anomaly::ParseAnomaly;
use crate::directive::{Directive, FileWrite};

/// Tag carrying a file write. Requires a `path` attribute.
pub const WRITE_TAG: &str = "sanction-write";

/// Tag carrying the change summary.
pub const SUMMARY_TAG: &str = "sanction-chat-summary";

const TAG_PREFIX: &str = "<sanction-";

/// Opening tag anchored at the start of the slice:
/// name, zero or more `key="value"` attributes, optional self-closing slash.
static OPEN_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"\A<(sanction-[a-z][a-z0-9-]*)((?:\s+[A-Za-z_][A-Za-z0-9_-]*\s*=\s*"[^"]*")*)\s*(/?)>"#,
    )
    .expect("open tag regex is valid")
});

static ATTRIBUTE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"([A-Za-z_][A-Za-z0-9_-]*)\s*=\s*"([^"]*)""#).expect("attribute regex is valid")
});

/// Everything recovered from one pass over a text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ParseReport {
    /// Directives in encounter order.
    pub directives: Vec<Directive>,
    /// Tags that were dropped, in encounter order.
    pub anomalies: Vec<ParseAnomaly>,
}

impl ParseReport {
    /// The first summary in the text.
    pub fn summary(&self) -> Option<&str> {
        self.directives.iter().find_map(Directive::as_summary)
    }

    /// All file writes, in encounter order. Duplicated paths are kept.
    pub fn file_writes(&self) -> impl Iterator<Item = &FileWrite> {
        self.directives.iter().filter_map(Directive::as_file_write)
    }

    /// True when no directive of any kind was found.
    pub fn is_empty(&self) -> bool {
        self.directives.is_empty()
    }
}

/// Scan `text` for directives, collecting anomalies along the way.
pub fn scan(text: &str) -> ParseReport {
    let mut report = ParseReport::default();
    let mut cursor = 0;

    while let Some(relative) = text[cursor..].find(TAG_PREFIX) {
        let start = cursor + relative;
        let Some(open) = OPEN_TAG.captures(&text[start..]) else {
            report.anomalies.push(ParseAnomaly::MalformedTag { offset: start });
            cursor = start + TAG_PREFIX.len();
            continue;
        };

        let name = open.get(1).map_or("", |m| m.as_str());
        let attributes = open.get(2).map_or("", |m| m.as_str());
        let self_closing = open.get(3).is_some_and(|m| !m.as_str().is_empty());
        let body_start = start + open.get(0).map_or(0, |m| m.as_str().len());
        cursor = body_start;

        if name != WRITE_TAG && name != SUMMARY_TAG {
            report.anomalies.push(ParseAnomaly::UnknownTag {
                name: name.to_string(),
                offset: start,
            });
            continue;
        }

        if self_closing {
            report.anomalies.push(ParseAnomaly::MissingContent {
                tag: name.to_string(),
                offset: start,
            });
            continue;
        }

        let Some(body_len) = find_body_end(&text[body_start..], name) else {
            report.anomalies.push(ParseAnomaly::Unterminated {
                tag: name.to_string(),
                offset: start,
            });
            continue;
        };
        let body = &text[body_start..body_start + body_len];
        cursor = body_start + body_len + closing_tag(name).len();

        let directive = if name == WRITE_TAG {
            file_write(attributes, body, start)
        } else {
            summary(body, start)
        };
        match directive {
            Ok(directive) => report.directives.push(directive),
            Err(anomaly) => report.anomalies.push(anomaly),
        }
    }

    for anomaly in &report.anomalies {
        tracing::debug!(offset = anomaly.offset(), "skipping directive: {}", anomaly);
    }

    report
}

/// Every directive in `text`, in encounter order.
pub fn extract_directives(text: &str) -> Vec<Directive> {
    scan(text).directives
}

/// The change summary, if the text carries a non-empty one.
///
/// When several summary tags are present the first wins.
pub fn extract_summary(text: &str) -> Option<String> {
    scan(text).summary().map(str::to_string)
}

/// All well-formed file writes, in encounter order.
pub fn extract_file_writes(text: &str) -> Vec<FileWrite> {
    scan(text)
        .directives
        .into_iter()
        .filter_map(|directive| match directive {
            Directive::FileWrite(write) => Some(write),
            Directive::Summary { .. } => None,
        })
        .collect()
}

fn file_write(attributes: &str, body: &str, offset: usize) -> Result<Directive, ParseAnomaly> {
    let mut path = None;
    let mut description = None;
    for caps in ATTRIBUTE.captures_iter(attributes) {
        let value = caps.get(2).map_or("", |m| m.as_str());
        match caps.get(1).map_or("", |m| m.as_str()) {
            // First occurrence wins if an attribute is repeated.
            "path" if path.is_none() => path = Some(value),
            "description" if description.is_none() => description = Some(value),
            _ => {}
        }
    }

    let path = path
        .filter(|p| !p.trim().is_empty())
        .ok_or_else(|| ParseAnomaly::MissingAttribute {
            tag: WRITE_TAG.to_string(),
            attribute: "path".to_string(),
            offset,
        })?;

    Ok(Directive::FileWrite(FileWrite {
        path: path.trim().to_string(),
        content: trim_layout_newlines(body).to_string(),
        description: description
            .filter(|d| !d.trim().is_empty())
            .map(str::to_string),
    }))
}

fn summary(body: &str, offset: usize) -> Result<Directive, ParseAnomaly> {
    let text = body.trim();
    if text.is_empty() {
        return Err(ParseAnomaly::EmptySummary { offset });
    }
    Ok(Directive::Summary {
        text: text.to_string(),
    })
}

/// Length of the body up to the matching close tag.
///
/// Returns None if the text ends first, or if the same tag is opened again
/// before it is closed (the outer tag is then the unterminated one). The
/// close is only searched for up to the next reopen, so a run of truncated
/// tags is scanned in linear time.
fn find_body_end(rest: &str, name: &str) -> Option<usize> {
    let limit = find_reopen(rest, name).unwrap_or(rest.len());
    rest[..limit].find(&closing_tag(name))
}

/// Position of `<name` followed by a tag delimiter, if present.
fn find_reopen(haystack: &str, name: &str) -> Option<usize> {
    let needle = format!("<{name}");
    haystack.match_indices(&needle).find_map(|(pos, _)| {
        let next = haystack[pos + needle.len()..].chars().next();
        match next {
            Some(c) if c.is_whitespace() || c == '>' || c == '/' => Some(pos),
            _ => None,
        }
    })
}

fn closing_tag(name: &str) -> String {
    format!("</{name}>")
}

/// Drop one newline right after the opening tag and one right before the
/// closing tag. Everything else is content.
fn trim_layout_newlines(body: &str) -> &str {
    let body = body
        .strip_prefix("\r\n")
        .or_else(|| body.strip_prefix('\n'))
        .unwrap_or(body);
    body.strip_suffix("\r\n")
        .or_else(|| body.strip_suffix('\n'))
        .unwrap_or(body)
}
