//! A straightforward recursive-descent parser for the proto3 subset spec.md
//! §4.1 and §6 describe: `syntax`, `package`, `import`, options, `message`,
//! `enum`, fields, oneofs, map fields (parsed but left for the schema
//! builder to reject), and `reserved` blocks.

use crate::ast::*;
use crate::error::{ParseError, ParseErrorWithLocation, ParseResult};
use crate::lexer::{Lexer, Loc, Token};

pub struct Parser<'a> {
    lexer: Lexer<'a>,
    current_token: Token,
    current_loc: Loc,
    current_doc: Option<String>,
}

impl<'a> Parser<'a> {
    pub fn new(input: &'a str) -> ParseResult<Parser<'a>> {
        let mut lexer = Lexer::new(input);
        let first = lexer.next_token()?;
        Ok(Parser {
            lexer,
            current_token: first.token,
            current_loc: first.loc,
            current_doc: first.doc_comment,
        })
    }

    pub fn loc(&self) -> Loc {
        self.current_loc
    }

    /// Parses a complete `.proto` file, reporting the location of the first
    /// syntax error encountered (spec.md §4.1: any error is fatal for the
    /// whole file).
    pub fn parse_file(input: &str) -> Result<ProtoFile, ParseErrorWithLocation> {
        let mut parser = match Parser::new(input) {
            Ok(p) => p,
            Err(error) => {
                return Err(ParseErrorWithLocation {
                    error,
                    loc: Loc::default(),
                })
            }
        };
        parser.file().map_err(|error| ParseErrorWithLocation {
            error,
            loc: parser.current_loc,
        })
    }

    fn bump(&mut self) -> ParseResult<Token> {
        let next = self.lexer.next_token()?;
        let prev = std::mem::replace(&mut self.current_token, next.token);
        self.current_loc = next.loc;
        self.current_doc = next.doc_comment;
        Ok(prev)
    }

    fn take_doc(&mut self) -> Option<String> {
        self.current_doc.take()
    }

    fn expect_symbol(&mut self, c: char) -> ParseResult<()> {
        match self.current_token {
            Token::Symbol(s) if s == c => {
                self.bump()?;
                Ok(())
            }
            Token::Eof => Err(ParseError::UnexpectedEof {
                expected: format!("`{}`", c),
            }),
            ref other => Err(ParseError::UnexpectedToken {
                expected: format!("`{}`", c),
                found: other.clone(),
            }),
        }
    }

    fn at_symbol(&self, c: char) -> bool {
        matches!(self.current_token, Token::Symbol(s) if s == c)
    }

    fn expect_ident(&mut self) -> ParseResult<String> {
        match self.current_token.clone() {
            Token::Ident(s) => {
                self.bump()?;
                Ok(s)
            }
            Token::Eof => Err(ParseError::UnexpectedEof {
                expected: "identifier".to_string(),
            }),
            other => Err(ParseError::UnexpectedToken {
                expected: "identifier".to_string(),
                found: other,
            }),
        }
    }

    fn expect_int(&mut self) -> ParseResult<i64> {
        match self.current_token.clone() {
            Token::IntLit(n) => {
                self.bump()?;
                Ok(n)
            }
            Token::Eof => Err(ParseError::UnexpectedEof {
                expected: "integer".to_string(),
            }),
            other => Err(ParseError::UnexpectedToken {
                expected: "integer".to_string(),
                found: other,
            }),
        }
    }

    fn expect_str(&mut self) -> ParseResult<String> {
        match self.current_token.clone() {
            Token::StrLit(s) => {
                self.bump()?;
                Ok(s)
            }
            Token::Eof => Err(ParseError::UnexpectedEof {
                expected: "string literal".to_string(),
            }),
            other => Err(ParseError::UnexpectedToken {
                expected: "string literal".to_string(),
                found: other,
            }),
        }
    }

    fn is_ident(&self, s: &str) -> bool {
        matches!(&self.current_token, Token::Ident(i) if i == s)
    }

    fn eat_ident_if(&mut self, s: &str) -> ParseResult<bool> {
        if self.is_ident(s) {
            self.bump()?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    fn file(&mut self) -> ParseResult<ProtoFile> {
        let mut file = ProtoFile::default();

        if self.eat_ident_if("syntax")? {
            self.expect_symbol('=')?;
            let s = self.expect_str()?;
            self.expect_symbol(';')?;
            file.syntax = Some(match s.as_str() {
                "proto3" => Syntax::Proto3,
                "proto2" => Syntax::Proto2,
                other => return Err(ParseError::UnknownSyntax(other.to_string())),
            });
        }

        loop {
            match self.current_token.clone() {
                Token::Eof => break,
                Token::Ident(ref kw) if kw == "package" => {
                    self.bump()?;
                    file.package = Some(self.dotted_path()?);
                    self.expect_symbol(';')?;
                }
                Token::Ident(ref kw) if kw == "import" => {
                    self.bump()?;
                    let public = self.eat_ident_if("public")?;
                    let _ = self.eat_ident_if("weak")?;
                    let path = self.expect_str()?;
                    self.expect_symbol(';')?;
                    file.imports.push(Import { path, public });
                }
                Token::Ident(ref kw) if kw == "option" => {
                    let opt = self.option_decl()?;
                    file.options.push(opt);
                }
                Token::Ident(ref kw) if kw == "message" => {
                    let m = self.message()?;
                    file.messages.push(m);
                }
                Token::Ident(ref kw) if kw == "enum" => {
                    let e = self.enum_decl()?;
                    file.enums.push(e);
                }
                Token::Symbol(';') => {
                    self.bump()?;
                }
                other => {
                    let loc = self.current_loc;
                    self.bump()?;
                    file.unknown_elements.push(UnknownElement {
                        description: format!("{}", other),
                        loc,
                    });
                }
            }
        }

        Ok(file)
    }

    fn dotted_path(&mut self) -> ParseResult<String> {
        // The lexer folds `a.b.c` into one identifier token already, since
        // `.` is an identifier-continue character.
        self.expect_ident()
    }

    /// `option name = value;` — used both at file scope and inside messages.
    fn option_decl(&mut self) -> ParseResult<OptionDecl> {
        self.bump()?; // `option`
        let name = if self.at_symbol('(') {
            self.bump()?;
            let n = self.dotted_path()?;
            self.expect_symbol(')')?;
            n
        } else {
            self.dotted_path()?
        };
        self.expect_symbol('=')?;
        let value = self.option_value()?;
        self.expect_symbol(';')?;
        Ok(OptionDecl { name, value })
    }

    fn option_value(&mut self) -> ParseResult<OptionValue> {
        match self.current_token.clone() {
            Token::StrLit(s) => {
                self.bump()?;
                Ok(OptionValue::Str(s))
            }
            Token::IntLit(n) => {
                self.bump()?;
                Ok(OptionValue::Int(n))
            }
            Token::FloatLit(n) => {
                self.bump()?;
                Ok(OptionValue::Float(n))
            }
            Token::Ident(ref s) if s == "true" => {
                self.bump()?;
                Ok(OptionValue::Bool(true))
            }
            Token::Ident(ref s) if s == "false" => {
                self.bump()?;
                Ok(OptionValue::Bool(false))
            }
            Token::Ident(s) => {
                self.bump()?;
                Ok(OptionValue::Ident(s))
            }
            Token::Eof => Err(ParseError::UnexpectedEof {
                expected: "option value".to_string(),
            }),
            other => Err(ParseError::UnexpectedToken {
                expected: "option value".to_string(),
                found: other,
            }),
        }
    }

    fn message(&mut self) -> ParseResult<MessageNode> {
        let doc = self.take_doc();
        self.bump()?; // `message`
        let name = self.expect_ident()?;
        self.expect_symbol('{')?;

        let mut node = MessageNode {
            doc,
            name,
            ..Default::default()
        };

        while !self.at_symbol('}') {
            self.message_member(&mut node)?;
        }
        self.expect_symbol('}')?;
        Ok(node)
    }

    fn message_member(&mut self, node: &mut MessageNode) -> ParseResult<()> {
        match self.current_token.clone() {
            Token::Ident(ref kw) if kw == "option" => {
                let opt = self.option_decl()?;
                if opt.name == "deprecated" {
                    node.deprecated = matches!(opt.value, OptionValue::Bool(true));
                }
                node.options.push(opt);
            }
            Token::Ident(ref kw) if kw == "message" => {
                node.nested_messages.push(self.message()?);
            }
            Token::Ident(ref kw) if kw == "enum" => {
                node.nested_enums.push(self.enum_decl()?);
            }
            Token::Ident(ref kw) if kw == "oneof" => {
                node.oneofs.push(self.oneof()?);
            }
            Token::Ident(ref kw) if kw == "reserved" => {
                self.reserved(node)?;
            }
            Token::Ident(ref kw) if kw == "map" => {
                node.map_fields.push(self.map_field()?);
            }
            Token::Symbol(';') => {
                self.bump()?;
            }
            _ => {
                node.fields.push(self.field()?);
            }
        }
        Ok(())
    }

    /// `[repeated|optional] <type> <name> = <number> [field_options];`
    fn field(&mut self) -> ParseResult<FieldNode> {
        let doc = self.take_doc();
        let loc = self.current_loc;

        let repeated = self.eat_ident_if("repeated")?;
        let explicit_optional = if !repeated {
            self.eat_ident_if("optional")?
        } else {
            false
        };

        let type_name = self.field_type_name()?;
        let name = self.expect_ident()?;
        self.expect_symbol('=')?;
        let number = self.field_number()?;

        let mut deprecated = false;
        if self.at_symbol('[') {
            deprecated = self.field_options()?;
        }
        self.expect_symbol(';')?;

        Ok(FieldNode {
            doc,
            name,
            type_name,
            number,
            repeated,
            explicit_optional,
            deprecated,
            loc,
        })
    }

    fn field_number(&mut self) -> ParseResult<i32> {
        let n = self.expect_int()?;
        i32::try_from(n).map_err(|_| ParseError::InvalidFieldNumber(n))
    }

    /// `[deprecated = true, other_option = "x"]`; returns whether
    /// `deprecated` was set true.
    fn field_options(&mut self) -> ParseResult<bool> {
        self.expect_symbol('[')?;
        let mut deprecated = false;
        loop {
            let name = if self.at_symbol('(') {
                self.bump()?;
                let n = self.dotted_path()?;
                self.expect_symbol(')')?;
                n
            } else {
                self.dotted_path()?
            };
            self.expect_symbol('=')?;
            let value = self.option_value()?;
            if name == "deprecated" && matches!(value, OptionValue::Bool(true)) {
                deprecated = true;
            }
            if self.at_symbol(',') {
                self.bump()?;
                continue;
            }
            break;
        }
        self.expect_symbol(']')?;
        Ok(deprecated)
    }

    fn field_type_name(&mut self) -> ParseResult<FieldTypeName> {
        let name = self.dotted_path()?;
        if let Some(scalar) = ScalarType::from_keyword(&name) {
            Ok(FieldTypeName::Scalar(scalar))
        } else {
            Ok(FieldTypeName::Named(name))
        }
    }

    fn oneof(&mut self) -> ParseResult<OneofNode> {
        let doc = self.take_doc();
        self.bump()?; // `oneof`
        let name = self.expect_ident()?;
        self.expect_symbol('{')?;
        let mut fields = Vec::new();
        while !self.at_symbol('}') {
            if self.at_symbol(';') {
                self.bump()?;
                continue;
            }
            fields.push(self.field()?);
        }
        self.expect_symbol('}')?;
        Ok(OneofNode { doc, name, fields })
    }

    /// `map<key_type, value_type> name = number;` — parsed in full so the
    /// schema builder can produce a precise `UnsupportedMap` diagnostic
    /// (spec.md §7) rather than a generic parse error.
    fn map_field(&mut self) -> ParseResult<MapFieldNode> {
        let doc = self.take_doc();
        let loc = self.current_loc;
        self.bump()?; // `map`
        self.expect_symbol('<')?;
        let key_name = self.dotted_path()?;
        let key_type = ScalarType::from_keyword(&key_name).ok_or_else(|| {
            ParseError::UnexpectedToken {
                expected: "scalar map key type".to_string(),
                found: Token::Ident(key_name.clone()),
            }
        })?;
        self.expect_symbol(',')?;
        let value_type = self.field_type_name()?;
        self.expect_symbol('>')?;
        let name = self.expect_ident()?;
        self.expect_symbol('=')?;
        let number = self.field_number()?;
        if self.at_symbol('[') {
            self.field_options()?;
        }
        self.expect_symbol(';')?;
        Ok(MapFieldNode {
            doc,
            name,
            key_type,
            value_type,
            number,
            loc,
        })
    }

    fn reserved(&mut self, node: &mut MessageNode) -> ParseResult<()> {
        self.bump()?; // `reserved`
        if matches!(self.current_token, Token::StrLit(_)) {
            loop {
                node.reserved_names.push(self.expect_str()?);
                if self.at_symbol(',') {
                    self.bump()?;
                    continue;
                }
                break;
            }
        } else {
            loop {
                let from = self.field_number()?;
                let to = if self.is_ident("to") {
                    self.bump()?;
                    if self.is_ident("max") {
                        self.bump()?;
                        i32::MAX
                    } else {
                        self.field_number()?
                    }
                } else {
                    from
                };
                node.reserved_numbers.push(ReservedRange { from, to });
                if self.at_symbol(',') {
                    self.bump()?;
                    continue;
                }
                break;
            }
        }
        self.expect_symbol(';')?;
        Ok(())
    }

    fn enum_decl(&mut self) -> ParseResult<EnumNode> {
        let doc = self.take_doc();
        self.bump()?; // `enum`
        let name = self.expect_ident()?;
        self.expect_symbol('{')?;

        let mut node = EnumNode {
            doc,
            name,
            values: Vec::new(),
            options: Vec::new(),
        };

        while !self.at_symbol('}') {
            match self.current_token.clone() {
                Token::Ident(ref kw) if kw == "option" => {
                    node.options.push(self.option_decl()?);
                }
                Token::Symbol(';') => {
                    self.bump()?;
                }
                _ => {
                    let vdoc = self.take_doc();
                    let vname = self.expect_ident()?;
                    self.expect_symbol('=')?;
                    let number = self.field_number()?;
                    let mut deprecated = false;
                    if self.at_symbol('[') {
                        deprecated = self.field_options()?;
                    }
                    self.expect_symbol(';')?;
                    node.values.push(EnumValueNode {
                        doc: vdoc,
                        name: vname,
                        number,
                        deprecated,
                    });
                }
            }
        }
        self.expect_symbol('}')?;
        Ok(node)
    }
}
