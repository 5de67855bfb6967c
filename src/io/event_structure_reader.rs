use super::{specs::warn_all, InstanceReader, WarningHandler};
use crate::{
    events::{Event, EventStructure},
    utils::InputFormatError,
};
use anyhow::{Context, Result};
use std::{
    io::{BufRead, BufReader, Read},
    iter::Peekable,
    str::CharIndices,
};

/// A reader for event structures.
///
/// Each non-blank line describes an event as a pair made of its identifier and an `Event` record.
/// The fields `pred` and `icnf` of the record give the lists of predecessors and conflicting events;
/// any other field is ignored, whatever its value (nested brackets and string literals are allowed).
///
/// # Format
///
/// The following content defines three events; `2` and `3` require `1`, and `3` is in conflict with `2`.
///
/// ```text
/// (1, Event(pred=(), icnf=()))
/// (2, Event(pred=(1), icnf=(), label="send"))
/// (3, Event(pred=(1), icnf=(2), label="recv", pos=[0, {1}]))
/// ```
///
/// References to identifiers that match no event are reported as warnings.
#[derive(Default)]
pub struct EventStructureReader {
    warning_handlers: Vec<WarningHandler>,
}

impl InstanceReader<EventStructure> for EventStructureReader {
    fn read(&self, reader: &mut dyn Read) -> Result<EventStructure> {
        let mut structure = EventStructure::default();
        let br = BufReader::new(reader);
        for (i, line) in br.lines().enumerate() {
            let context = || format!("while reading line with index {}", i);
            let l = line.with_context(context)?;
            if l.trim().is_empty() {
                continue;
            }
            let (event, id_column) = EventLineParser::new(1 + i, &l)
                .parse_event()
                .with_context(context)?;
            let id = event.id();
            if structure.get_event(id).is_some() {
                return Err(InputFormatError::new(
                    1 + i,
                    id_column,
                    format!("duplicate event identifier {}", id),
                ))
                .with_context(context);
            }
            structure.add_event(event).with_context(context)?;
        }
        for id in structure.dangling_references() {
            warn_all(
                &self.warning_handlers,
                0,
                format!("event {} is referenced but never defined", id),
            );
        }
        Ok(structure)
    }

    fn add_warning_handler(&mut self, h: WarningHandler) {
        self.warning_handlers.push(h);
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum TokenKind {
    Open(char),
    Close(char),
    Operator(char),
    Identifier(String),
    Literal(String),
    Integer(String),
}

impl TokenKind {
    fn describe(&self) -> String {
        match self {
            TokenKind::Open(c) | TokenKind::Close(c) | TokenKind::Operator(c) => {
                format!(r#""{}""#, c)
            }
            TokenKind::Identifier(s) => format!(r#"identifier "{}""#, s),
            TokenKind::Literal(s) => format!(r#"string "{}""#, s),
            TokenKind::Integer(s) => format!("integer {}", s),
        }
    }
}

struct Token {
    kind: TokenKind,
    column: usize,
}

struct EventLineParser<'a> {
    line: usize,
    chars: Peekable<CharIndices<'a>>,
    n_chars: usize,
    column: usize,
}

fn is_delimiter(c: char) -> bool {
    c.is_whitespace() || "()[]{}=,\"".contains(c)
}

fn closing_of(c: char) -> char {
    match c {
        '(' => ')',
        '[' => ']',
        _ => '}',
    }
}

impl<'a> EventLineParser<'a> {
    fn new(line: usize, content: &'a str) -> Self {
        Self {
            line,
            chars: content.char_indices().peekable(),
            n_chars: content.chars().count(),
            column: 0,
        }
    }

    fn error<S>(&self, column: usize, reason: S) -> InputFormatError
    where
        S: Into<String>,
    {
        InputFormatError::new(self.line, column, reason)
    }

    fn bump(&mut self) -> Option<char> {
        self.chars.next().map(|(_, c)| {
            self.column += 1;
            c
        })
    }

    fn skip_whitespaces(&mut self) {
        while matches!(self.chars.peek(), Some((_, c)) if c.is_whitespace()) {
            self.bump();
        }
    }

    fn next_token(&mut self) -> Result<Option<Token>, InputFormatError> {
        self.skip_whitespaces();
        let c = match self.bump() {
            Some(c) => c,
            None => return Ok(None),
        };
        let column = self.column;
        let kind = match c {
            '(' | '[' | '{' => TokenKind::Open(c),
            ')' | ']' | '}' => TokenKind::Close(c),
            '=' | ',' => TokenKind::Operator(c),
            '"' => {
                let mut value = String::new();
                loop {
                    match self.bump() {
                        Some('"') => break,
                        Some(c) => value.push(c),
                        None => return Err(self.error(column, "unterminated string literal")),
                    }
                }
                TokenKind::Literal(value)
            }
            _ => {
                let mut value = c.to_string();
                while let Some((_, c)) = self.chars.peek() {
                    if is_delimiter(*c) {
                        break;
                    }
                    value.push(*c);
                    self.bump();
                }
                if value.bytes().all(|b| b.is_ascii_digit()) {
                    TokenKind::Integer(value)
                } else {
                    TokenKind::Identifier(value)
                }
            }
        };
        Ok(Some(Token { kind, column }))
    }

    fn expect_token(&mut self, expected: &str) -> Result<Token, InputFormatError> {
        match self.next_token()? {
            Some(t) => Ok(t),
            None => Err(self.error(
                self.n_chars + 1,
                format!("unexpected end of line, expected {}", expected),
            )),
        }
    }

    fn expect_kind(&mut self, kind: TokenKind) -> Result<Token, InputFormatError> {
        let expected = kind.describe();
        let token = self.expect_token(&expected)?;
        if token.kind == kind {
            Ok(token)
        } else {
            Err(self.error(
                token.column,
                format!(
                    "unexpected token {}, expected {}",
                    token.kind.describe(),
                    expected
                ),
            ))
        }
    }

    fn expect_open(&mut self) -> Result<char, InputFormatError> {
        let token = self.expect_token("an opening bracket")?;
        match token.kind {
            TokenKind::Open(c) => Ok(c),
            k => Err(self.error(
                token.column,
                format!("unexpected token {}, expected an opening bracket", k.describe()),
            )),
        }
    }

    fn integer_of(&self, token: &Token, value: &str) -> Result<usize, InputFormatError> {
        value
            .parse::<usize>()
            .map_err(|_| self.error(token.column, format!("integer {} is too large", value)))
    }

    fn expect_integer(&mut self) -> Result<(usize, usize), InputFormatError> {
        let token = self.expect_token("an integer")?;
        match &token.kind {
            TokenKind::Integer(s) => Ok((self.integer_of(&token, s)?, token.column)),
            k => Err(self.error(
                token.column,
                format!("unexpected token {}, expected an integer", k.describe()),
            )),
        }
    }

    fn parse_event(mut self) -> Result<(Event, usize), InputFormatError> {
        self.expect_kind(TokenKind::Open('('))?;
        let (id, id_column) = self.expect_integer()?;
        self.expect_kind(TokenKind::Operator(','))?;
        self.expect_kind(TokenKind::Identifier("Event".to_string()))?;
        self.expect_kind(TokenKind::Open('('))?;
        let mut predecessors = vec![];
        let mut conflicts = vec![];
        let mut first = true;
        loop {
            let mut token = self.expect_token(r#"a field or ")""#)?;
            if token.kind == TokenKind::Close(')') {
                break;
            }
            if !first {
                if token.kind != TokenKind::Operator(',') {
                    return Err(self.error(
                        token.column,
                        format!(r#"unexpected token {}, expected ",""#, token.kind.describe()),
                    ));
                }
                token = self.expect_token("a field name")?;
            }
            let field = match token.kind {
                TokenKind::Identifier(name) => name,
                k => {
                    return Err(self.error(
                        token.column,
                        format!("unexpected token {}, expected a field name", k.describe()),
                    ))
                }
            };
            self.expect_kind(TokenKind::Operator('='))?;
            match field.as_str() {
                "pred" => predecessors = self.parse_id_list()?,
                "icnf" => conflicts = self.parse_id_list()?,
                _ => self.skip_value()?,
            }
            first = false;
        }
        self.expect_kind(TokenKind::Close(')'))?;
        if let Some(t) = self.next_token()? {
            return Err(self.error(
                t.column,
                format!("unexpected token {} after the event", t.kind.describe()),
            ));
        }
        Ok((Event::new(id, predecessors, conflicts), id_column))
    }

    fn parse_id_list(&mut self) -> Result<Vec<usize>, InputFormatError> {
        let open = self.expect_open()?;
        let close = closing_of(open);
        let mut ids = vec![];
        loop {
            let mut token = self.expect_token(&format!(r#"an integer or "{}""#, close))?;
            if token.kind == TokenKind::Close(close) {
                return Ok(ids);
            }
            if !ids.is_empty() {
                if token.kind != TokenKind::Operator(',') {
                    return Err(self.error(
                        token.column,
                        format!(r#"unexpected token {}, expected ",""#, token.kind.describe()),
                    ));
                }
                token = self.expect_token("an integer")?;
            }
            match &token.kind {
                TokenKind::Integer(s) => ids.push(self.integer_of(&token, s)?),
                k => {
                    return Err(self.error(
                        token.column,
                        format!("unexpected token {}, expected an integer", k.describe()),
                    ))
                }
            }
        }
    }

    fn skip_value(&mut self) -> Result<(), InputFormatError> {
        let token = self.expect_token("a value")?;
        match token.kind {
            TokenKind::Open(c) => self.skip_until_closing(closing_of(c)),
            TokenKind::Close(_) | TokenKind::Operator(_) => Err(self.error(
                token.column,
                format!("unexpected token {}, expected a value", token.kind.describe()),
            )),
            _ => Ok(()),
        }
    }

    fn skip_until_closing(&mut self, close: char) -> Result<(), InputFormatError> {
        loop {
            let token = self.expect_token(&format!(r#""{}""#, close))?;
            match token.kind {
                TokenKind::Open(c) => self.skip_until_closing(closing_of(c))?,
                TokenKind::Close(c) if c == close => return Ok(()),
                TokenKind::Close(c) => {
                    return Err(self.error(
                        token.column,
                        format!(r#"unbalanced "{}", expected "{}""#, c, close),
                    ))
                }
                _ => {}
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{cell::RefCell, rc::Rc};

    fn read(s: &str) -> Result<EventStructure> {
        EventStructureReader::default().read(&mut s.as_bytes())
    }

    fn format_error(s: &str) -> InputFormatError {
        read(s)
            .unwrap_err()
            .chain()
            .find_map(|e| e.downcast_ref::<InputFormatError>())
            .cloned()
            .unwrap()
    }

    #[test]
    fn test_single_event() {
        let structure = read("(1, Event(pred=(), icnf=()))").unwrap();
        assert_eq!(1, structure.len());
        let event = structure.get_event(1).unwrap();
        assert!(event.predecessors().is_empty());
        assert!(event.conflicts().is_empty());
        assert!(structure.is_leaf(1));
    }

    #[test]
    fn test_predecessor_is_not_leaf() {
        let structure =
            read("(1, Event(pred=(), icnf=()))\n(2, Event(pred=(1), icnf=()))\n").unwrap();
        assert!(!structure.is_leaf(1));
        assert!(structure.is_leaf(2));
    }

    #[test]
    fn test_lists_and_ignored_fields() {
        let structure = read(
            r#"(3, Event(name="a (b", pred=(1, 2), pos=[0, {1, (2)}], icnf=(4), t=x))"#,
        )
        .unwrap();
        let event = structure.get_event(3).unwrap();
        assert_eq!(&[1, 2], event.predecessors());
        assert_eq!(&[4], event.conflicts());
    }

    #[test]
    fn test_other_bracket_kinds_for_lists() {
        let structure = read("(3, Event(pred=[1,2], icnf={}))").unwrap();
        assert_eq!(&[1, 2], structure.get_event(3).unwrap().predecessors());
    }

    #[test]
    fn test_missing_fields() {
        let structure = read("(1, Event())").unwrap();
        assert!(structure.get_event(1).unwrap().predecessors().is_empty());
    }

    #[test]
    fn test_blank_lines() {
        let structure = read("\n(1, Event())\n   \n(2, Event())\n").unwrap();
        assert_eq!(2, structure.len());
    }

    #[test]
    fn test_display_is_read_back() {
        let structure = read("(3, Event(pred=(1, 2), icnf=(4)))").unwrap();
        let written = structure.get_event(3).unwrap().to_string();
        let read_back = read(&written).unwrap();
        assert_eq!(structure.get_event(3), read_back.get_event(3));
    }

    #[test]
    fn test_negative_id() {
        let e = format_error("(-1, Event())");
        assert_eq!(1, e.line());
        assert_eq!(2, e.column());
    }

    #[test]
    fn test_error_position() {
        let e = format_error("(1, Event())\n(2, Event(pred=(1 2)))");
        assert_eq!(2, e.line());
        assert_eq!(19, e.column());
    }

    #[test]
    fn test_missing_event_keyword() {
        let e = format_error("(1, Evt())");
        assert_eq!(5, e.column());
    }

    #[test]
    fn test_unterminated_string() {
        let e = format_error(r#"(1, Event(x="abc))"#);
        assert_eq!(13, e.column());
    }

    #[test]
    fn test_unbalanced_brackets() {
        let e = format_error("(1, Event(x=[1)))");
        assert_eq!(15, e.column());
    }

    #[test]
    fn test_unexpected_end_of_line() {
        let e = format_error("(1, Event(pred=(1)");
        assert_eq!(19, e.column());
    }

    #[test]
    fn test_trailing_tokens() {
        let e = format_error("(1, Event()) x");
        assert_eq!(14, e.column());
    }

    #[test]
    fn test_duplicate_id() {
        let e = format_error("(1, Event())\n(1, Event())");
        assert_eq!(2, e.line());
        assert_eq!(2, e.column());
    }

    #[test]
    fn test_too_large_integer() {
        let e = format_error("(1, Event(pred=(99999999999999999999999999)))");
        assert_eq!(17, e.column());
    }

    #[test]
    fn test_dangling_reference_warning() {
        let warnings = Rc::new(RefCell::new(vec![]));
        let warnings_clone = Rc::clone(&warnings);
        let mut reader = EventStructureReader::default();
        reader.add_warning_handler(Box::new(move |_, w| warnings_clone.borrow_mut().push(w)));
        reader
            .read(&mut "(1, Event(icnf=(5)))".as_bytes())
            .unwrap();
        assert_eq!(
            vec!["event 5 is referenced but never defined".to_string()],
            *warnings.borrow()
        );
    }
}
