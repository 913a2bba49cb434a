//! A hand-written tokenizer for proto3 source.
//!
//! Comments immediately preceding a declaration (`//` or `/* */`, on their
//! own line(s) directly above it) are retained as doc comments rather than
//! discarded, so they survive into the schema model's `doc` fields and from
//! there into generated JavaDoc-equivalent output.

use std::fmt;

/// 1-based line and column of a token's first character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Loc {
    pub line: u32,
    pub col: u32,
}

impl fmt::Display for Loc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.col)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Ident(String),
    IntLit(i64),
    FloatLit(f64),
    StrLit(String),
    /// A single-character symbol: `{ } ( ) [ ] < > ; , . = -`
    Symbol(char),
    Eof,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Ident(s) => write!(f, "identifier `{}`", s),
            Token::IntLit(n) => write!(f, "integer `{}`", n),
            Token::FloatLit(n) => write!(f, "float `{}`", n),
            Token::StrLit(s) => write!(f, "string {:?}", s),
            Token::Symbol(c) => write!(f, "`{}`", c),
            Token::Eof => write!(f, "end of file"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum LexerError {
    UnterminatedString,
    UnterminatedBlockComment,
    InvalidNumber(String),
    UnexpectedChar(char),
}

impl fmt::Display for LexerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LexerError::UnterminatedString => write!(f, "unterminated string literal"),
            LexerError::UnterminatedBlockComment => write!(f, "unterminated block comment"),
            LexerError::InvalidNumber(s) => write!(f, "invalid number literal: {}", s),
            LexerError::UnexpectedChar(c) => write!(f, "unexpected character: {:?}", c),
        }
    }
}

impl std::error::Error for LexerError {}

/// One token together with its location and any doc comment found directly
/// above it (blank-line-free run of `//` lines, or a single `/* ... */`).
pub struct TokenWithLoc {
    pub token: Token,
    pub loc: Loc,
    pub doc_comment: Option<String>,
}

pub struct Lexer<'a> {
    chars: std::iter::Peekable<std::str::CharIndices<'a>>,
    input: &'a str,
    line: u32,
    col: u32,
    pending_doc: Vec<String>,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Lexer<'a> {
        Lexer {
            chars: input.char_indices().peekable(),
            input,
            line: 1,
            col: 1,
            pending_doc: Vec::new(),
        }
    }

    pub fn loc(&self) -> Loc {
        Loc {
            line: self.line,
            col: self.col,
        }
    }

    fn bump(&mut self) -> Option<char> {
        let (_, c) = self.chars.next()?;
        if c == '\n' {
            self.line += 1;
            self.col = 1;
        } else {
            self.col += 1;
        }
        Some(c)
    }

    fn peek_char(&mut self) -> Option<char> {
        self.chars.peek().map(|&(_, c)| c)
    }

    fn peek_rest(&mut self) -> &'a str {
        match self.chars.peek() {
            Some(&(idx, _)) => &self.input[idx..],
            None => "",
        }
    }

    /// Consumes whitespace and comments, stashing consecutive `//` line
    /// comments (and standalone `/* */` block comments) as a pending doc
    /// comment for the next real token. A blank line between a comment run
    /// and the following token breaks the association.
    fn skip_trivia(&mut self) -> Result<(), LexerError> {
        loop {
            match self.peek_char() {
                Some(c) if c == ' ' || c == '\t' || c == '\r' => {
                    self.bump();
                }
                Some('\n') => {
                    self.bump();
                }
                Some('/') if self.peek_rest().starts_with("//") => {
                    self.bump();
                    self.bump();
                    // A `///` or `//!` style marker still collapses to plain text.
                    let mut text = String::new();
                    while let Some(c) = self.peek_char() {
                        if c == '\n' {
                            break;
                        }
                        text.push(c);
                        self.bump();
                    }
                    self.pending_doc.push(text.trim().to_string());
                }
                Some('/') if self.peek_rest().starts_with("/*") => {
                    self.bump();
                    self.bump();
                    let mut text = String::new();
                    loop {
                        if self.peek_rest().starts_with("*/") {
                            self.bump();
                            self.bump();
                            break;
                        }
                        match self.bump() {
                            Some(c) => text.push(c),
                            None => return Err(LexerError::UnterminatedBlockComment),
                        }
                    }
                    self.pending_doc.clear();
                    self.pending_doc.push(text.trim().to_string());
                }
                _ => return Ok(()),
            }
        }
    }

    fn take_doc_comment(&mut self) -> Option<String> {
        if self.pending_doc.is_empty() {
            None
        } else {
            Some(std::mem::take(&mut self.pending_doc).join("\n"))
        }
    }

    pub fn next_token(&mut self) -> Result<TokenWithLoc, LexerError> {
        self.skip_trivia()?;
        let loc = self.loc();
        let doc_comment = self.take_doc_comment();

        let token = match self.peek_char() {
            None => Token::Eof,
            Some(c) if is_ident_start(c) => self.lex_ident(),
            Some(c) if c.is_ascii_digit() => self.lex_number()?,
            Some('-') => self.lex_number()?,
            Some('"') | Some('\'') => self.lex_string()?,
            Some(c) if "{}()[]<>;,.=".contains(c) => {
                self.bump();
                Token::Symbol(c)
            }
            Some(c) => return Err(LexerError::UnexpectedChar(c)),
        };

        Ok(TokenWithLoc {
            token,
            loc,
            doc_comment,
        })
    }

    fn lex_ident(&mut self) -> Token {
        let mut s = String::new();
        while let Some(c) = self.peek_char() {
            if is_ident_continue(c) {
                s.push(c);
                self.bump();
            } else {
                break;
            }
        }
        Token::Ident(s)
    }

    fn lex_number(&mut self) -> Result<Token, LexerError> {
        let mut s = String::new();
        if self.peek_char() == Some('-') {
            s.push('-');
            self.bump();
        }
        let mut is_float = false;
        while let Some(c) = self.peek_char() {
            if c.is_ascii_digit() {
                s.push(c);
                self.bump();
            } else if c == '.' && !is_float {
                is_float = true;
                s.push(c);
                self.bump();
            } else if (c == 'e' || c == 'E')
                && s.chars().last().map(|c| c.is_ascii_digit()).unwrap_or(false)
            {
                is_float = true;
                s.push(c);
                self.bump();
                if matches!(self.peek_char(), Some('+') | Some('-')) {
                    s.push(self.bump().unwrap());
                }
            } else if is_ident_start(c) && !matches!(c, 'e' | 'E') {
                // hex / octal prefixes like 0x1A, or a bare identifier-ish suffix
                s.push(c);
                self.bump();
            } else {
                break;
            }
        }
        if is_float {
            s.parse::<f64>()
                .map(Token::FloatLit)
                .map_err(|_| LexerError::InvalidNumber(s.clone()))
        } else if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
            i64::from_str_radix(hex, 16)
                .map(Token::IntLit)
                .map_err(|_| LexerError::InvalidNumber(s.clone()))
        } else {
            s.parse::<i64>()
                .map(Token::IntLit)
                .map_err(|_| LexerError::InvalidNumber(s.clone()))
        }
    }

    fn lex_string(&mut self) -> Result<Token, LexerError> {
        let quote = self.bump().unwrap();
        let mut s = String::new();
        loop {
            match self.bump() {
                None => return Err(LexerError::UnterminatedString),
                Some(c) if c == quote => break,
                Some('\\') => match self.bump() {
                    Some('n') => s.push('\n'),
                    Some('t') => s.push('\t'),
                    Some('r') => s.push('\r'),
                    Some('\\') => s.push('\\'),
                    Some(c) if c == quote => s.push(quote),
                    Some(c) => s.push(c),
                    None => return Err(LexerError::UnterminatedString),
                },
                Some(c) => s.push(c),
            }
        }
        Ok(Token::StrLit(s))
    }
}

fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn is_ident_continue(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '.'
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(input: &str) -> Vec<Token> {
        let mut lexer = Lexer::new(input);
        let mut out = Vec::new();
        loop {
            let t = lexer.next_token().unwrap();
            let eof = t.token == Token::Eof;
            out.push(t.token);
            if eof {
                break;
            }
        }
        out
    }

    #[test]
    fn lexes_keywords_and_symbols() {
        assert_eq!(
            vec![
                Token::Ident("message".to_string()),
                Token::Ident("Foo".to_string()),
                Token::Symbol('{'),
                Token::Symbol('}'),
                Token::Eof,
            ],
            tokens("message Foo {}")
        );
    }

    #[test]
    fn lexes_negative_and_positive_integers() {
        assert_eq!(
            vec![Token::IntLit(-42), Token::IntLit(21), Token::Eof],
            tokens("-42 21")
        );
    }

    #[test]
    fn lexes_floats() {
        assert_eq!(vec![Token::FloatLit(3.5), Token::Eof], tokens("3.5"));
    }

    #[test]
    fn lexes_string_literal_with_escapes() {
        assert_eq!(
            vec![Token::StrLit("a\nb".to_string()), Token::Eof],
            tokens("\"a\\nb\"")
        );
    }

    #[test]
    fn line_comment_becomes_doc_comment_on_next_token() {
        let mut lexer = Lexer::new("// hello\nmessage Foo {}");
        let t = lexer.next_token().unwrap();
        assert_eq!(Some("hello".to_string()), t.doc_comment);
        assert_eq!(Token::Ident("message".to_string()), t.token);
    }

    #[test]
    fn consecutive_line_comments_join_with_newline() {
        let mut lexer = Lexer::new("// first\n// second\nmessage Foo {}");
        let t = lexer.next_token().unwrap();
        assert_eq!(Some("first\nsecond".to_string()), t.doc_comment);
    }

    #[test]
    fn block_comment_is_doc_comment() {
        let mut lexer = Lexer::new("/* a message */\nmessage Foo {}");
        let t = lexer.next_token().unwrap();
        assert_eq!(Some("a message".to_string()), t.doc_comment);
    }

    #[test]
    fn tracks_line_and_column() {
        let mut lexer = Lexer::new("abc\ndef");
        let first = lexer.next_token().unwrap();
        assert_eq!(Loc { line: 1, col: 1 }, first.loc);
        let second = lexer.next_token().unwrap();
        assert_eq!(Loc { line: 2, col: 1 }, second.loc);
    }
}
