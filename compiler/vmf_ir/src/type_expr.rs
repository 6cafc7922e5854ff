//! Textual type expressions.
//!
//! Types appear as text in three places: program snapshots, the property
//! bags attached to diagnostics, and rendered generated declarations. All of
//! them use the same `Head<Arg, Arg>` syntax, parsed here into a
//! [`TypeExpr`] tree that the [`crate::TypePool`] interns.

use std::fmt;

/// A parsed type expression: a (possibly qualified) head with type arguments.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct TypeExpr {
    pub head: String,
    pub args: Vec<TypeExpr>,
}

/// Error from [`TypeExpr::parse`].
#[derive(Clone, Eq, PartialEq, Debug, thiserror::Error)]
pub enum TypeParseError {
    #[error("empty type expression")]
    Empty,
    #[error("expected a type name at offset {offset}")]
    ExpectedName { offset: usize },
    #[error("unexpected `{found}` at offset {offset}")]
    Unexpected { offset: usize, found: char },
    #[error("unclosed `<` opened at offset {offset}")]
    Unclosed { offset: usize },
}

impl TypeExpr {
    /// A type with no arguments.
    pub fn named(head: impl Into<String>) -> Self {
        TypeExpr {
            head: head.into(),
            args: Vec::new(),
        }
    }

    /// Parse `Head<Arg, Arg<Inner>>`. Whitespace between tokens is ignored.
    pub fn parse(text: &str) -> Result<Self, TypeParseError> {
        let mut parser = Parser { text, pos: 0 };
        parser.skip_ws();
        if parser.at_end() {
            return Err(TypeParseError::Empty);
        }
        let expr = parser.parse_type()?;
        parser.skip_ws();
        match parser.peek() {
            None => Ok(expr),
            Some(found) => Err(TypeParseError::Unexpected {
                offset: parser.pos,
                found,
            }),
        }
    }

    /// Last path segment of the head (`App.Models.User` → `User`).
    pub fn short_name(&self) -> &str {
        short_name(&self.head)
    }
}

impl fmt::Display for TypeExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.head)?;
        if !self.args.is_empty() {
            f.write_str("<")?;
            for (i, arg) in self.args.iter().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                write!(f, "{arg}")?;
            }
            f.write_str(">")?;
        }
        Ok(())
    }
}

/// Last segment of a `.`- or `::`-qualified path.
pub fn short_name(path: &str) -> &str {
    let after_colons = path.rsplit("::").next().unwrap_or(path);
    after_colons.rsplit('.').next().unwrap_or(after_colons)
}

/// Split `text` on `sep`, ignoring separators nested inside `<...>`.
///
/// Segments are trimmed; an all-whitespace input yields no segments.
pub fn split_top_level(text: &str, sep: char) -> Vec<&str> {
    if text.trim().is_empty() {
        return Vec::new();
    }
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (i, c) in text.char_indices() {
        match c {
            '<' => depth += 1,
            '>' => depth = depth.saturating_sub(1),
            c if c == sep && depth == 0 => {
                parts.push(text[start..i].trim());
                start = i + c.len_utf8();
            }
            _ => {}
        }
    }
    parts.push(text[start..].trim());
    parts
}

struct Parser<'a> {
    text: &'a str,
    pos: usize,
}

impl Parser<'_> {
    fn peek(&self) -> Option<char> {
        self.text[self.pos..].chars().next()
    }

    fn at_end(&self) -> bool {
        self.pos >= self.text.len()
    }

    fn skip_ws(&mut self) {
        while let Some(c) = self.peek() {
            if !c.is_whitespace() {
                break;
            }
            self.pos += c.len_utf8();
        }
    }

    fn parse_type(&mut self) -> Result<TypeExpr, TypeParseError> {
        self.skip_ws();
        let start = self.pos;
        while let Some(c) = self.peek() {
            if matches!(c, '<' | '>' | ',') || c.is_whitespace() {
                break;
            }
            self.pos += c.len_utf8();
        }
        if self.pos == start {
            return Err(TypeParseError::ExpectedName { offset: start });
        }
        let head = self.text[start..self.pos].to_owned();

        self.skip_ws();
        let mut args = Vec::new();
        if self.peek() == Some('<') {
            let open = self.pos;
            self.pos += 1;
            loop {
                args.push(self.parse_type()?);
                self.skip_ws();
                match self.peek() {
                    Some(',') => self.pos += 1,
                    Some('>') => {
                        self.pos += 1;
                        break;
                    }
                    Some(found) => {
                        return Err(TypeParseError::Unexpected {
                            offset: self.pos,
                            found,
                        })
                    }
                    None => return Err(TypeParseError::Unclosed { offset: open }),
                }
            }
        }
        Ok(TypeExpr { head, args })
    }
}
