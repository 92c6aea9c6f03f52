//! Minimal Turtle parser for ontology files.
//!
//! Covers the subset small ontologies actually use: `@prefix` directives,
//! IRI references, prefixed names, the `a` keyword, string literals (with
//! language tags and datatype annotations), integer and decimal literals,
//! `;`/`,` predicate-object lists, and `#` comments. Blank nodes and
//! collections are rejected with a line-numbered error.

use std::collections::HashMap;

use crate::error::TurtleError;
use crate::term::iri;

/// A parsed RDF term in object position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurtleTerm {
    /// An IRI, fully resolved against the prefix table.
    Iri(String),
    /// A literal, reduced to its lexical form. Language tags and datatype
    /// annotations are parsed but dropped.
    Literal(String),
}

/// A parsed Turtle document: the prefix table plus triples in source order.
///
/// Subjects and predicates are always IRIs in the supported subset, so they
/// are plain strings; only objects may be literals.
#[derive(Debug, Default)]
pub struct TurtleDocument {
    pub prefixes: HashMap<String, String>,
    pub triples: Vec<(String, String, TurtleTerm)>,
}

/// Parse a Turtle document.
pub fn parse(source: &str) -> Result<TurtleDocument, TurtleError> {
    Parser::new(source).run()
}

fn is_pname_char(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_' || ch == '-'
}

struct Parser {
    chars: Vec<char>,
    pos: usize,
    line: usize,
    doc: TurtleDocument,
}

impl Parser {
    fn new(source: &str) -> Self {
        Self {
            chars: source.chars().collect(),
            pos: 0,
            line: 1,
            doc: TurtleDocument::default(),
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.pos += 1;
        if ch == '\n' {
            self.line += 1;
        }
        Some(ch)
    }

    fn error(&self, message: impl Into<String>) -> TurtleError {
        TurtleError {
            line: self.line,
            message: message.into(),
        }
    }

    fn error_at(&self, line: usize, message: impl Into<String>) -> TurtleError {
        TurtleError {
            line,
            message: message.into(),
        }
    }

    /// Skip whitespace and `#` comments.
    fn skip_trivia(&mut self) {
        while let Some(ch) = self.peek() {
            if ch.is_whitespace() {
                self.bump();
            } else if ch == '#' {
                while let Some(c) = self.peek() {
                    if c == '\n' {
                        break;
                    }
                    self.bump();
                }
            } else {
                break;
            }
        }
    }

    fn expect(&mut self, expected: char) -> Result<(), TurtleError> {
        match self.bump() {
            Some(ch) if ch == expected => Ok(()),
            Some(ch) => Err(self.error(format!("expected '{expected}', found '{ch}'"))),
            None => Err(self.error(format!("expected '{expected}', found end of input"))),
        }
    }

    fn run(mut self) -> Result<TurtleDocument, TurtleError> {
        loop {
            self.skip_trivia();
            match self.peek() {
                None => break,
                Some('@') => self.directive()?,
                Some(_) => self.statement()?,
            }
        }
        Ok(self.doc)
    }

    fn directive(&mut self) -> Result<(), TurtleError> {
        self.expect('@')?;
        let keyword = self.bareword();
        if keyword != "prefix" {
            return Err(self.error(format!("unsupported directive: @{keyword}")));
        }
        self.skip_trivia();
        let prefix = self.pname_chars();
        self.expect(':')?;
        self.skip_trivia();
        let namespace = self.iri_ref()?;
        self.skip_trivia();
        self.expect('.')?;
        self.doc.prefixes.insert(prefix, namespace);
        Ok(())
    }

    /// One statement: a subject, its predicate-object lists, a final `.`.
    fn statement(&mut self) -> Result<(), TurtleError> {
        let subject = self.parse_subject()?;
        loop {
            self.skip_trivia();
            let predicate = self.parse_predicate()?;
            loop {
                self.skip_trivia();
                let object = self.parse_object()?;
                self.doc
                    .triples
                    .push((subject.clone(), predicate.clone(), object));
                self.skip_trivia();
                if self.peek() == Some(',') {
                    self.bump();
                } else {
                    break;
                }
            }
            match self.peek() {
                Some(';') => {
                    // Runs of semicolons and a trailing one before '.' are
                    // legal Turtle.
                    while self.peek() == Some(';') {
                        self.bump();
                        self.skip_trivia();
                    }
                    if self.peek() == Some('.') {
                        self.bump();
                        return Ok(());
                    }
                }
                Some('.') => {
                    self.bump();
                    return Ok(());
                }
                Some(ch) => {
                    return Err(self.error(format!("expected ';', ',' or '.', found '{ch}'")));
                }
                None => return Err(self.error("unexpected end of input in statement")),
            }
        }
    }

    fn parse_subject(&mut self) -> Result<String, TurtleError> {
        match self.peek() {
            Some('<') => self.iri_ref(),
            Some('"') => Err(self.error("a literal cannot be the subject of a triple")),
            Some('_') if self.peek_at(1) == Some(':') => {
                Err(self.error("blank nodes are not supported"))
            }
            Some('[') => Err(self.error("blank nodes are not supported")),
            Some('(') => Err(self.error("collections are not supported")),
            Some(_) => self.prefixed_name(),
            None => Err(self.error("expected a subject, found end of input")),
        }
    }

    fn parse_predicate(&mut self) -> Result<String, TurtleError> {
        match self.peek() {
            Some('<') => self.iri_ref(),
            // Bare `a` is rdf:type; anything longer is a prefixed name.
            Some('a') if self.peek_at(1).map_or(true, |c| !is_pname_char(c) && c != ':') => {
                self.bump();
                Ok(iri::RDF_TYPE.to_string())
            }
            Some('"') => Err(self.error("a literal cannot be the predicate of a triple")),
            Some(_) => self.prefixed_name(),
            None => Err(self.error("expected a predicate, found end of input")),
        }
    }

    fn parse_object(&mut self) -> Result<TurtleTerm, TurtleError> {
        match self.peek() {
            Some('<') => Ok(TurtleTerm::Iri(self.iri_ref()?)),
            Some('"') => Ok(TurtleTerm::Literal(self.string_literal()?)),
            Some(ch) if ch.is_ascii_digit() || ch == '+' || ch == '-' => {
                Ok(TurtleTerm::Literal(self.numeric_literal()?))
            }
            Some('_') if self.peek_at(1) == Some(':') => {
                Err(self.error("blank nodes are not supported"))
            }
            Some('[') => Err(self.error("blank nodes are not supported")),
            Some('(') => Err(self.error("collections are not supported")),
            Some(_) => Ok(TurtleTerm::Iri(self.prefixed_name()?)),
            None => Err(self.error("expected an object, found end of input")),
        }
    }

    fn bareword(&mut self) -> String {
        let mut word = String::new();
        while let Some(ch) = self.peek() {
            if ch.is_ascii_alphabetic() {
                word.push(ch);
                self.bump();
            } else {
                break;
            }
        }
        word
    }

    fn pname_chars(&mut self) -> String {
        let mut out = String::new();
        while let Some(ch) = self.peek() {
            if is_pname_char(ch) {
                out.push(ch);
                self.bump();
            } else {
                break;
            }
        }
        out
    }

    /// `prefix:local`, resolved against the prefix table.
    fn prefixed_name(&mut self) -> Result<String, TurtleError> {
        let prefix = self.pname_chars();
        if self.peek() != Some(':') {
            return match self.peek() {
                Some(ch) if prefix.is_empty() => {
                    Err(self.error(format!("unexpected character: '{ch}'")))
                }
                Some(ch) => Err(self.error(format!("expected ':' after '{prefix}', found '{ch}'"))),
                None => Err(self.error("unexpected end of input")),
            };
        }
        self.bump();
        let local = self.pname_chars();
        let namespace = self
            .doc
            .prefixes
            .get(&prefix)
            .ok_or_else(|| self.error(format!("undeclared prefix: '{prefix}:'")))?;
        Ok(format!("{namespace}{local}"))
    }

    fn iri_ref(&mut self) -> Result<String, TurtleError> {
        let start_line = self.line;
        self.expect('<')?;
        let mut iri = String::new();
        loop {
            match self.bump() {
                Some('>') => return Ok(iri),
                Some('\n') | None => {
                    return Err(self.error_at(start_line, "unterminated IRI reference"));
                }
                Some(ch) => iri.push(ch),
            }
        }
    }

    fn string_literal(&mut self) -> Result<String, TurtleError> {
        let start_line = self.line;
        self.expect('"')?;
        let mut value = String::new();
        loop {
            match self.bump() {
                Some('"') => break,
                Some('\\') => match self.bump() {
                    Some('"') => value.push('"'),
                    Some('\\') => value.push('\\'),
                    Some('n') => value.push('\n'),
                    Some('t') => value.push('\t'),
                    Some('r') => value.push('\r'),
                    Some(ch) => {
                        return Err(self.error(format!("invalid string escape: '\\{ch}'")));
                    }
                    None => return Err(self.error_at(start_line, "unterminated string literal")),
                },
                Some('\n') | None => {
                    return Err(self.error_at(start_line, "unterminated string literal"));
                }
                Some(ch) => value.push(ch),
            }
        }
        // Language tag or datatype annotation; the lexical form is all that
        // is kept.
        if self.peek() == Some('@') {
            self.bump();
            while self
                .peek()
                .map_or(false, |c| c.is_ascii_alphanumeric() || c == '-')
            {
                self.bump();
            }
        } else if self.peek() == Some('^') && self.peek_at(1) == Some('^') {
            self.bump();
            self.bump();
            match self.peek() {
                Some('<') => {
                    self.iri_ref()?;
                }
                _ => {
                    self.prefixed_name()?;
                }
            }
        }
        Ok(value)
    }

    /// Integer or decimal literal. A decimal point must be followed by a
    /// digit, so a statement-terminating `.` after a number stays intact.
    fn numeric_literal(&mut self) -> Result<String, TurtleError> {
        let mut lexeme = String::new();
        if let Some(sign @ ('+' | '-')) = self.peek() {
            lexeme.push(sign);
            self.bump();
        }
        let digits_start = lexeme.len();
        while let Some(ch) = self.peek() {
            if ch.is_ascii_digit() {
                lexeme.push(ch);
                self.bump();
            } else {
                break;
            }
        }
        if lexeme.len() == digits_start {
            return Err(self.error("malformed numeric literal"));
        }
        if self.peek() == Some('.') && self.peek_at(1).map_or(false, |c| c.is_ascii_digit()) {
            lexeme.push('.');
            self.bump();
            while let Some(ch) = self.peek() {
                if ch.is_ascii_digit() {
                    lexeme.push(ch);
                    self.bump();
                } else {
                    break;
                }
            }
        }
        Ok(lexeme)
    }
}
