//! Generic open/close token scanner
//!
//! Finds every `open ... close` token in a string and replaces it with the
//! handler's output. A backslash directly before the open token escapes it;
//! inside a token a backslash before the close token escapes that close.

use crate::Result;

/// Scanner for one kind of delimited token, e.g. `${` / `}`
#[derive(Debug, Clone, Copy)]
pub struct TokenParser<'a> {
    open: &'a str,
    close: &'a str,
}

impl<'a> TokenParser<'a> {
    pub const fn new(open: &'a str, close: &'a str) -> Self {
        Self { open, close }
    }

    /// Whether `text` contains the open token at all
    pub fn has_token(&self, text: &str) -> bool {
        text.contains(self.open)
    }

    /// Whether `text` holds a complete token that is not escaped, i.e. one
    /// `parse` would hand to its handler
    pub fn contains_unescaped(&self, text: &str) -> bool {
        let bytes = text.as_bytes();
        let mut offset = 0;
        while let Some(found) = text[offset..].find(self.open) {
            let start = offset + found;
            let body_start = start + self.open.len();
            if start > 0 && bytes[start - 1] == b'\\' {
                offset = body_start;
                continue;
            }
            // An unterminated token ends the scan, as it does in `parse`
            return self.find_close(text, body_start).is_some();
        }
        false
    }

    /// Replace every token in `text` with `handler(expression)`
    pub fn parse<F>(&self, text: &str, mut handler: F) -> Result<String>
    where
        F: FnMut(&str) -> Result<String>,
    {
        let Some(mut start) = text.find(self.open) else {
            return Ok(text.to_string());
        };

        let bytes = text.as_bytes();
        let mut result = String::with_capacity(text.len());
        let mut offset = 0;

        loop {
            if start > 0 && bytes[start - 1] == b'\\' {
                // Escaped open token: drop the backslash, keep the token literally
                result.push_str(&text[offset..start - 1]);
                result.push_str(self.open);
                offset = start + self.open.len();
            } else {
                result.push_str(&text[offset..start]);
                let body_start = start + self.open.len();
                match self.find_close(text, body_start) {
                    Some((expression, end)) => {
                        result.push_str(&handler(&expression)?);
                        offset = end + self.close.len();
                    }
                    None => {
                        result.push_str(&text[start..]);
                        offset = text.len();
                    }
                }
            }

            match text[offset..].find(self.open) {
                Some(next) => start = offset + next,
                None => break,
            }
        }

        result.push_str(&text[offset..]);
        Ok(result)
    }

    /// Collect the expression up to the first unescaped close token.
    /// Returns the unescaped expression and the byte index of that close token.
    fn find_close(&self, text: &str, from: usize) -> Option<(String, usize)> {
        let bytes = text.as_bytes();
        let mut expression = String::new();
        let mut offset = from;

        while let Some(found) = text[offset..].find(self.close) {
            let end = offset + found;
            if end > offset && bytes[end - 1] == b'\\' {
                expression.push_str(&text[offset..end - 1]);
                expression.push_str(self.close);
                offset = end + self.close.len();
            } else {
                expression.push_str(&text[offset..end]);
                return Some((expression, end));
            }
        }
        None
    }
}
