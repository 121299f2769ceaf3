//! FITS header card parsing and the per-entry card scan.

use alloc::string::String;
use alloc::vec::Vec;

use log::{debug, trace};

use crate::block::{padded_byte_len, CARD_SIZE};
use crate::value::{coerce_token, Value};

/// Name of the card that terminates a header.
pub const END_KEYWORD: &str = "END";
/// Commentary keyword whose card text is free-form.
pub const COMMENT_KEYWORD: &str = "COMMENT";
/// Commentary keyword whose card text is free-form.
pub const HISTORY_KEYWORD: &str = "HISTORY";
/// Synthetic name given to cards that match no known card grammar.
pub const GARBAGE_KEYWORD: &str = "GARBAGE";

const COMMENTARY_KEYWORDS: [&str; 2] = [COMMENT_KEYWORD, HISTORY_KEYWORD];

// ── Types ──

/// One decoded header card (keyword record).
#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    /// Keyword token, or one of the sentinels `END`, `COMMENT`, `HISTORY`,
    /// `GARBAGE`.
    pub name: String,
    /// The value token as it appeared on the card, trimmed.
    pub raw_text: String,
    /// Typed value, `None` when the keyword carries no usable value.
    pub value: Option<Value>,
    /// Text after the `/` separator, the free-form text of commentary cards,
    /// or the whole card for `GARBAGE`.
    pub comment: Option<String>,
}

impl Param {
    fn end() -> Self {
        Param {
            name: END_KEYWORD.into(),
            raw_text: String::new(),
            value: None,
            comment: None,
        }
    }

    fn garbage(text: &str) -> Self {
        Param {
            name: GARBAGE_KEYWORD.into(),
            raw_text: String::new(),
            value: None,
            comment: Some(text.into()),
        }
    }

    /// Returns `true` if this is the header terminator.
    pub fn is_end(&self) -> bool {
        self.name == END_KEYWORD
    }

    /// Returns `true` for `COMMENT` and `HISTORY` records.
    pub fn is_commentary(&self) -> bool {
        COMMENTARY_KEYWORDS.contains(&self.name.as_str())
    }

    /// Returns `true` if the card could not be parsed.
    pub fn is_garbage(&self) -> bool {
        self.name == GARBAGE_KEYWORD
    }
}

/// How the header scan of an entry ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderEnd {
    /// An `END` card was found.
    Terminated,
    /// The buffer ran out before any `END` card.
    Truncated,
}

/// Result of scanning the header cards of one entry.
#[derive(Debug, Clone, PartialEq)]
pub struct HeaderScan {
    /// Every decoded card in order, including a final `END` when present.
    pub params: Vec<Param>,
    /// Terminal state of the scan.
    pub end: HeaderEnd,
    /// Header length rounded up to whole blocks.
    pub byte_len: usize,
}

// ── Card parsing ──

/// Parse a single header card.
///
/// Never fails: a card matching none of the card grammars becomes a
/// `GARBAGE` param carrying the card text. Bytes are read one per character,
/// so any byte sequence decodes.
pub fn parse_card(card_bytes: &[u8]) -> Param {
    let text: String = card_bytes.iter().map(|&b| b as char).collect();
    parse_card_text(&text)
}

/// Parse the text of a single header card. See [`parse_card`].
pub fn parse_card_text(text: &str) -> Param {
    if text.trim() == END_KEYWORD {
        return Param::end();
    }
    if let Some(param) = parse_commentary(text) {
        return param;
    }
    if let Some(param) = parse_keyword_record(text) {
        return param;
    }
    debug!("unparseable header card: {:?}", text.trim_end());
    Param::garbage(text)
}

fn parse_commentary(text: &str) -> Option<Param> {
    let body = text.trim_start();
    COMMENTARY_KEYWORDS.iter().find_map(|&keyword| {
        let rest = body.strip_prefix(keyword)?;
        Some(Param {
            name: keyword.into(),
            raw_text: String::new(),
            value: None,
            comment: Some(rest.trim().into()),
        })
    })
}

fn is_keyword_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '-'
}

fn is_bare_value_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '.' | '+' | '-' | ',' | '_')
}

/// `KEY = VALUE [/ COMMENT]`
fn parse_keyword_record(text: &str) -> Option<Param> {
    let body = text.trim_start();
    let key_len = body
        .find(|c: char| !is_keyword_char(c))
        .unwrap_or(body.len());
    if key_len == 0 {
        return None;
    }
    let (name, rest) = body.split_at(key_len);
    let rest = rest.trim_start().strip_prefix('=')?.trim_start();

    let (token, after) = split_value_token(rest)?;
    let token = token.trim();
    let comment = after
        .trim_start()
        .strip_prefix('/')
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(String::from);

    Some(Param {
        name: name.into(),
        raw_text: token.into(),
        value: coerce_token(token),
        comment,
    })
}

/// Split the text after `=` into the value token and whatever follows it.
///
/// Returns `None` for an unterminated string or complex literal.
fn split_value_token(rest: &str) -> Option<(&str, &str)> {
    if rest.starts_with('\'') {
        let mut chars = rest.char_indices().skip(1).peekable();
        while let Some((i, c)) = chars.next() {
            if c != '\'' {
                continue;
            }
            if matches!(chars.peek(), Some((_, '\''))) {
                chars.next();
                continue;
            }
            return Some(rest.split_at(i + 1));
        }
        return None;
    }
    if rest.starts_with('(') {
        let close = rest.find(')')?;
        return Some(rest.split_at(close + 1));
    }
    let len = rest
        .find(|c: char| !is_bare_value_char(c))
        .unwrap_or(rest.len());
    Some(rest.split_at(len))
}

// ── Header scan ──

/// Decode successive cards starting at `start` until an `END` card or the
/// end of `buf`.
///
/// A trailing fragment shorter than one card is not decoded. The reported
/// byte length covers every consumed card, rounded up to whole blocks.
pub fn scan_header(buf: &[u8], start: usize) -> HeaderScan {
    let mut params = Vec::new();
    let mut offset = start;

    let end = loop {
        let Some(card) = buf.get(offset..offset + CARD_SIZE) else {
            break HeaderEnd::Truncated;
        };
        let param = parse_card(card);
        trace!("card at {offset}: {} = {:?}", param.name, param.raw_text);
        offset += CARD_SIZE;

        let is_end = param.is_end();
        params.push(param);
        if is_end {
            break HeaderEnd::Terminated;
        }
    };

    HeaderScan {
        params,
        end,
        byte_len: padded_byte_len(offset - start),
    }
}
