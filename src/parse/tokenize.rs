use std::ops::Range;

use super::types::{ParseError, Token};

/// Split a line into words on whitespace outside quotes.
///
/// Single and double quotes both delimit quoted spans; a backslash outside
/// single quotes escapes the next character. Adjacent quoted and unquoted
/// parts join into one word (`--name="a b"` → `--name=a b`).
pub fn tokenize(line: &str) -> Result<Vec<Token>, ParseError> {
    let mut tokens = Vec::new();
    let mut buf = String::new();
    let mut start: Option<usize> = None;
    let mut quoted = false;
    // (quote char, byte offset where it opened)
    let mut open: Option<(char, usize)> = None;
    let mut esc = false;

    for (i, c) in line.char_indices() {
        if esc {
            buf.push(c);
            esc = false;
            continue;
        }
        match open {
            Some((q, _)) if c == q => {
                open = None;
            }
            Some(('"', _)) if c == '\\' => {
                esc = true;
            }
            Some(_) => buf.push(c),
            None if c.is_whitespace() => {
                if let Some(s) = start.take() {
                    tokens.push(Token {
                        text: std::mem::take(&mut buf),
                        start: s,
                        quoted,
                    });
                    quoted = false;
                }
            }
            None => {
                start.get_or_insert(i);
                match c {
                    '\'' | '"' => {
                        open = Some((c, i));
                        quoted = true;
                    }
                    '\\' => esc = true,
                    _ => buf.push(c),
                }
            }
        }
    }

    if let Some((_, position)) = open {
        return Err(ParseError::MalformedQuoting { position });
    }
    // A trailing lone backslash is kept literally.
    if esc {
        buf.push('\\');
    }
    if let Some(s) = start {
        tokens.push(Token {
            text: buf,
            start: s,
            quoted,
        });
    }
    log::trace!("tokenized {} word(s)", tokens.len());
    Ok(tokens)
}

/// First whitespace-delimited word of a line, without quote processing.
pub fn leading_word(line: &str) -> &str {
    line.split_whitespace().next().unwrap_or("")
}

/// Whether a line is an invocation of `keyword`, compared case-insensitively.
pub fn is_invocation(line: &str, keyword: &str) -> bool {
    leading_word(line).eq_ignore_ascii_case(keyword)
}

/// Where a line's quoted text and trailing comment are.
///
/// Quoted spans cover the text between the quotes. A comment starts at an
/// unquoted `#` at the start of the line or after whitespace; scanning stops
/// there. An unterminated quote runs to the end of the line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuoteMap {
    spans: Vec<Range<usize>>,
    comment: Option<usize>,
}

impl QuoteMap {
    pub fn new(line: &str) -> Self {
        let mut spans = Vec::new();
        let mut open: Option<(char, usize)> = None;
        let mut esc = false;
        let mut after_blank = true;

        for (i, c) in line.char_indices() {
            if esc {
                esc = false;
                after_blank = false;
                continue;
            }
            match open {
                Some((q, start)) if c == q => {
                    spans.push(start..i);
                    open = None;
                }
                Some(('"', _)) if c == '\\' => esc = true,
                Some(_) => {}
                None => match c {
                    '\\' => esc = true,
                    '\'' | '"' => open = Some((c, i + c.len_utf8())),
                    '#' if after_blank => {
                        return Self {
                            spans,
                            comment: Some(i),
                        };
                    }
                    _ => {}
                },
            }
            after_blank = open.is_none() && c.is_whitespace();
        }

        if let Some((_, start)) = open {
            spans.push(start..line.len());
        }
        Self {
            spans,
            comment: None,
        }
    }

    /// Whether byte offset `pos` lies inside quotes.
    pub fn is_quoted(&self, pos: usize) -> bool {
        self.spans.iter().any(|span| span.contains(&pos))
    }

    /// Byte offset of the `#` opening an unquoted comment.
    pub fn comment_start(&self) -> Option<usize> {
        self.comment
    }
}
