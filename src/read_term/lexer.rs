use crate::error::PrologError;

use super::stream::CharReader;

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum TokenKind {
    Eof,
    Name(String),
    Var(String),
    Int(i64),
    Float(f64),
    Str(String),
    /// `(` preceded by layout
    Open,
    /// `(` immediately after a name: argument list opener
    OpenCt,
    Close,
    OpenL,
    CloseL,
    Comma,
    Bar,
    End,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Token {
    pub kind: TokenKind,
    pub line: usize,
}

enum Char {
    Layout(char),
    Solo(char),
    Meta(char),
    Digit(char),
    Underscore,
    CapitalLetter(char),
    SmallLetter(char),
    Graphic(char),
    Invalid(char),
    Eof,
}

fn classify(c: Option<char>) -> Char {
    match c {
        None => Char::Eof,
        Some(c) => match c {
            ' ' | '\t' | '\r' | '\n' => Char::Layout(c),
            '!' | '(' | ')' | ',' | ';' | '[' | ']' | '|' | '%' => Char::Solo(c),
            '\\' | '\'' | '"' => Char::Meta(c),
            '0'..='9' => Char::Digit(c),
            '_' => Char::Underscore,
            'A'..='Z' => Char::CapitalLetter(c),
            'a'..='z' => Char::SmallLetter(c),
            '#' | '$' | '&' | '*' | '+' | '-' | '.' | '/' | ':' | '<' | '=' | '>' | '?' | '@'
            | '^' | '~' => Char::Graphic(c),
            _ => Char::Invalid(c),
        },
    }
}

pub(crate) struct Lexer<'a> {
    reader: CharReader<'a>,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            reader: CharReader::new(source),
        }
    }

    fn error<T>(&self, message: impl Into<String>) -> Result<T, PrologError> {
        Err(PrologError::Tokenize {
            line: self.reader.line(),
            message: message.into(),
        })
    }

    fn token(&self, kind: TokenKind) -> Result<Token, PrologError> {
        Ok(Token {
            kind,
            line: self.reader.line(),
        })
    }

    fn next_char(&mut self) -> Char {
        classify(self.reader.get())
    }

    fn peek_char(&self) -> Char {
        classify(self.reader.peek())
    }

    fn alpha_numeric(&mut self, c: char) -> String {
        let mut t = c.to_string();
        loop {
            match self.peek_char() {
                Char::Underscore => t.push('_'),
                Char::SmallLetter(c) | Char::CapitalLetter(c) | Char::Digit(c) => t.push(c),
                _ => return t,
            }
            self.reader.get();
        }
    }

    fn graphic(&mut self, c: char) -> String {
        let mut t = c.to_string();
        loop {
            match self.peek_char() {
                Char::Graphic(c) => t.push(c),
                Char::Meta('\\') => t.push('\\'),
                _ => return t,
            }
            self.reader.get();
        }
    }

    fn quoted(&mut self, quote: char) -> Result<String, PrologError> {
        let mut t = String::new();
        loop {
            match self.reader.get() {
                None => return self.error(format!("missing closing {}", quote)),
                Some('\\') => match self.reader.get() {
                    Some('\n') => {}
                    Some('\\') => t.push('\\'),
                    Some('\'') => t.push('\''),
                    Some('"') => t.push('"'),
                    Some('a') => t.push('\x07'),
                    Some('b') => t.push('\x08'),
                    Some('f') => t.push('\x0C'),
                    Some('n') => t.push('\n'),
                    Some('r') => t.push('\r'),
                    Some('t') => t.push('\t'),
                    Some('v') => t.push('\x0B'),
                    Some(c) => return self.error(format!("unknown escape \\{}", c)),
                    None => return self.error("unknown escape at end of input"),
                },
                Some(c) if c == quote => {
                    // doubled quote is a literal quote character
                    if self.reader.peek() == Some(quote) {
                        t.push(c);
                        self.reader.get();
                    } else {
                        return Ok(t);
                    }
                }
                Some(c) => t.push(c),
            }
        }
    }

    fn numeric(&mut self, c: char) -> Result<Token, PrologError> {
        let mut t = c.to_string();
        while let Char::Digit(c) = self.peek_char() {
            t.push(c);
            self.reader.get();
        }

        // fraction only when a digit follows the dot, otherwise the dot is
        // the end-of-clause marker
        if self.reader.peek() == Some('.') && matches!(classify(self.reader.peek2()), Char::Digit(_))
        {
            self.reader.get();
            t.push('.');
            while let Char::Digit(c) = self.peek_char() {
                t.push(c);
                self.reader.get();
            }
            let mut probe = self.reader.clone_probe();
            if let Some(e @ ('e' | 'E')) = probe.next() {
                let mut exp = String::from(e);
                match probe.next() {
                    Some(sign @ ('+' | '-')) => {
                        if matches!(probe.next(), Some('0'..='9')) {
                            exp.push(sign);
                        } else {
                            exp.clear();
                        }
                    }
                    Some('0'..='9') => {}
                    _ => exp.clear(),
                }
                if !exp.is_empty() {
                    for _ in 0..exp.len() {
                        self.reader.get();
                    }
                    t.push_str(&exp);
                    while let Char::Digit(c) = self.peek_char() {
                        t.push(c);
                        self.reader.get();
                    }
                }
            }
            match t.parse::<f64>() {
                Ok(f) => self.token(TokenKind::Float(f)),
                Err(_) => self.error(format!("bad float {}", t)),
            }
        } else {
            match t.parse::<i64>() {
                Ok(i) => self.token(TokenKind::Int(i)),
                Err(_) => self.error(format!("integer out of range {}", t)),
            }
        }
    }

    fn line_comment(&mut self) {
        loop {
            match self.reader.get() {
                None | Some('\n') => return,
                _ => {}
            }
        }
    }

    fn block_comment(&mut self) -> Result<(), PrologError> {
        loop {
            match self.reader.get() {
                None => return self.error("missing closing */"),
                Some('*') if self.reader.peek() == Some('/') => {
                    self.reader.get();
                    return Ok(());
                }
                _ => {}
            }
        }
    }

    pub fn next(&mut self) -> Result<Token, PrologError> {
        let mut c = self.next_char();

        // an immediate open paren attaches to the preceding name
        if let Char::Solo('(') = c {
            return self.token(TokenKind::OpenCt);
        }

        loop {
            match c {
                Char::Eof => return self.token(TokenKind::Eof),

                Char::Layout(_) => c = self.next_char(),

                Char::Solo('%') => {
                    self.line_comment();
                    c = self.next_char();
                }

                Char::SmallLetter(c) => {
                    let name = self.alpha_numeric(c);
                    return self.token(TokenKind::Name(name));
                }

                Char::Graphic('.') => {
                    match self.peek_char() {
                        Char::Solo('%') | Char::Layout(_) | Char::Eof => {
                            return self.token(TokenKind::End)
                        }
                        _ => {}
                    }
                    let name = self.graphic('.');
                    return self.token(TokenKind::Name(name));
                }

                Char::Graphic('/') => {
                    if self.reader.peek() == Some('*') {
                        self.reader.get();
                        self.block_comment()?;
                        c = self.next_char();
                    } else {
                        let name = self.graphic('/');
                        return self.token(TokenKind::Name(name));
                    }
                }

                Char::Graphic(c) => {
                    let name = self.graphic(c);
                    return self.token(TokenKind::Name(name));
                }

                // backslash opens graphic tokens such as \+ and \==
                Char::Meta('\\') => {
                    let name = self.graphic('\\');
                    return self.token(TokenKind::Name(name));
                }

                Char::Meta('\'') => {
                    let name = self.quoted('\'')?;
                    return self.token(TokenKind::Name(name));
                }

                Char::Meta('"') => {
                    let s = self.quoted('"')?;
                    return self.token(TokenKind::Str(s));
                }

                Char::Solo(';') => return self.token(TokenKind::Name(";".to_string())),
                Char::Solo('!') => return self.token(TokenKind::Name("!".to_string())),

                Char::Underscore => {
                    let name = self.alpha_numeric('_');
                    return self.token(TokenKind::Var(name));
                }
                Char::CapitalLetter(c) => {
                    let name = self.alpha_numeric(c);
                    return self.token(TokenKind::Var(name));
                }

                Char::Digit(c) => return self.numeric(c),

                Char::Solo('(') => return self.token(TokenKind::Open),
                Char::Solo(')') => return self.token(TokenKind::Close),
                Char::Solo('[') => return self.token(TokenKind::OpenL),
                Char::Solo(']') => return self.token(TokenKind::CloseL),
                Char::Solo('|') => return self.token(TokenKind::Bar),
                Char::Solo(',') => return self.token(TokenKind::Comma),

                Char::Solo(c) | Char::Meta(c) | Char::Invalid(c) => {
                    return self.error(format!("unexpected character {:?}", c))
                }
            }
        }
    }
}
