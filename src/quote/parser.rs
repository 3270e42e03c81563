//! Turns the agent's free-text answer into a quote and author.
//!
//! The agent is asked for `QUOTE:` / `AUTHOR:` lines. Small local models do
//! not always comply, so when those lines are missing the text is split on
//! the usual attribution delimiters instead. Parsing is pure; inferring a
//! missing author needs the model and is left to the caller.

use super::{Quote, UNKNOWN_AUTHOR};

/// Inferred authors must be shorter than this many characters.
pub const MAX_AUTHOR_CHARS: usize = 50;

const QUOTE_LABEL: &str = "QUOTE:";
const AUTHOR_LABEL: &str = "AUTHOR:";
const DASH_SEPARATOR: &str = " - ";
const BY_SEPARATOR: &str = "by ";

/// Result of parsing agent output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedOutput {
    /// Text and author were both found.
    Complete(Quote),
    /// Only the quote text was found.
    NeedsAuthor(String),
}

/// Parse agent output into a quote.
///
/// A `QUOTE:` line without a usable `AUTHOR:` line still goes through the
/// attribution heuristics before the author is reported missing.
pub fn parse_output(output: &str) -> ParsedOutput {
    let unattributed = match parse_structured(output) {
        Some(ParsedOutput::NeedsAuthor(text)) => text,
        Some(complete) => return complete,
        None => output.to_string(),
    };

    match split_attribution(&unattributed) {
        Some(quote) => ParsedOutput::Complete(quote),
        None => ParsedOutput::NeedsAuthor(clean_text(&unattributed)),
    }
}

fn split_attribution(text: &str) -> Option<Quote> {
    // Split on the last " - ": `"Be yourself." - Oscar Wilde`
    if let Some((quote, author)) = text.rsplit_once(DASH_SEPARATOR) {
        return Some(Quote::new(clean_text(quote), clean_author(author)));
    }

    // Split on the first "by ", in any case. ASCII lowercasing keeps byte
    // offsets identical, so the index is valid in the original text.
    let pos = text.to_ascii_lowercase().find(BY_SEPARATOR)?;
    Some(Quote::new(
        clean_text(&text[..pos]),
        clean_author(&text[pos + BY_SEPARATOR.len()..]),
    ))
}

/// Validate an author name inferred by the model.
///
/// Returns `None` for empty answers, "Unknown" in any case, and anything
/// too long to be a name.
pub fn accept_inferred_author(reply: &str) -> Option<String> {
    let author = reply.trim();
    if author.is_empty()
        || author.eq_ignore_ascii_case(UNKNOWN_AUTHOR)
        || author.chars().count() >= MAX_AUTHOR_CHARS
    {
        return None;
    }
    Some(author.to_string())
}

fn parse_structured(output: &str) -> Option<ParsedOutput> {
    let mut text = None;
    let mut author = None;

    for line in output.lines() {
        let line = line.trim().trim_start_matches('*').trim_start();
        if let Some(value) = strip_label(line, QUOTE_LABEL) {
            text.get_or_insert_with(|| clean_text(value));
        } else if let Some(value) = strip_label(line, AUTHOR_LABEL) {
            author.get_or_insert_with(|| value.trim_matches('*').trim().to_string());
        }
    }

    let text = text.filter(|t| !t.is_empty())?;
    Some(match author.filter(|a| !a.is_empty()) {
        Some(author) => ParsedOutput::Complete(Quote::new(text, clean_author(&author))),
        None => ParsedOutput::NeedsAuthor(text),
    })
}

fn strip_label<'a>(line: &'a str, label: &str) -> Option<&'a str> {
    let prefix = line.get(..label.len())?;
    if !prefix.eq_ignore_ascii_case(label) {
        return None;
    }
    Some(line[label.len()..].trim_start_matches('*'))
}

fn clean_text(text: &str) -> String {
    text.trim()
        .trim_matches(|c| c == '"' || c == '\u{201C}' || c == '\u{201D}')
        .trim()
        .to_string()
}

fn clean_author(author: &str) -> String {
    let author = author.trim();
    if author.is_empty() || author.eq_ignore_ascii_case(UNKNOWN_AUTHOR) {
        UNKNOWN_AUTHOR.to_string()
    } else {
        author.to_string()
    }
}
