use std::collections::HashMap;
use std::rc::Rc;

use crate::error::PrologError;
use crate::operators::OperatorTable;

use super::lexer::{Lexer, Token, TokenKind};
use super::term::Term;

/// One top-level term read from source, with the names of the variables the
/// parser numbered `0..var_names.len()`.
#[derive(Debug)]
pub(crate) struct ParsedTerm {
    pub term: Rc<Term>,
    pub var_names: Vec<String>,
    pub line: usize,
}

pub(crate) struct Parser<'a> {
    ops: &'a OperatorTable,
    lexer: Lexer<'a>,
    vars: Vec<String>,
    var_map: HashMap<String, usize>,
}

impl<'a> Parser<'a> {
    pub fn new(ops: &'a OperatorTable, source: &'a str) -> Self {
        Self {
            ops,
            lexer: Lexer::new(source),
            vars: Vec::new(),
            var_map: HashMap::new(),
        }
    }

    pub fn next_term(&mut self) -> Result<Option<ParsedTerm>, PrologError> {
        self.vars.clear();
        self.var_map.clear();

        let token = self.lexer.next()?;
        if token.kind == TokenKind::Eof {
            return Ok(None);
        }
        let line = token.line;

        let (term, next) = self.expr(token, 1200)?;
        match next.kind {
            TokenKind::End => Ok(Some(ParsedTerm {
                term,
                var_names: std::mem::take(&mut self.vars),
                line,
            })),
            _ => self.parse_error(&next, "expected . at end of clause"),
        }
    }

    fn parse_error<T>(&self, token: &Token, message: &str) -> Result<T, PrologError> {
        Err(PrologError::Parse {
            line: token.line,
            message: format!("{} (got {})", message, describe(&token.kind)),
        })
    }

    fn var(&mut self, name: &str) -> Rc<Term> {
        // every `_` is a fresh variable; named variables are shared within
        // the clause being read
        if name != "_" {
            if let Some(&idx) = self.var_map.get(name) {
                return Term::new_var(idx);
            }
        }
        let idx = self.vars.len();
        self.vars.push(name.to_string());
        if name != "_" {
            self.var_map.insert(name.to_string(), idx);
        }
        Term::new_var(idx)
    }

    /// Precedence-limited expression parse: read a primary term, then keep
    /// absorbing infix operators of precedence <= `max_p`. Returns the term
    /// and the first unconsumed token.
    fn expr(&mut self, token: Token, max_p: u16) -> Result<(Rc<Term>, Token), PrologError> {
        let (mut term, mut next, mut prec) = self.primary(token, max_p)?;

        loop {
            let sym = match &next.kind {
                TokenKind::Name(s) => s.clone(),
                TokenKind::Comma => ",".to_string(),
                _ => return Ok((term, next)),
            };
            let def = match self.ops.infix(&sym) {
                Some(d) => d.clone(),
                None => return Ok((term, next)),
            };
            if def.prec > max_p || prec > def.left_max() {
                return Ok((term, next));
            }

            let right_token = self.lexer.next()?;
            let (right, after) = self.expr(right_token, def.right_max())?;
            term = Term::new_compound(sym, vec![term, right]);
            prec = def.prec;
            next = after;
        }
    }

    fn primary(
        &mut self,
        token: Token,
        max_p: u16,
    ) -> Result<(Rc<Term>, Token, u16), PrologError> {
        match token.kind {
            TokenKind::Eof => self.parse_error(&token, "unexpected end of input"),
            TokenKind::Name(s) => self.name(s, max_p),
            TokenKind::Var(s) => {
                let v = self.var(&s);
                Ok((v, self.lexer.next()?, 0))
            }
            TokenKind::Int(i) => Ok((Term::new_integer(i), self.lexer.next()?, 0)),
            TokenKind::Float(f) => Ok((Term::new_float(f), self.lexer.next()?, 0)),
            TokenKind::Str(s) => Ok((Term::new_str(s), self.lexer.next()?, 0)),
            TokenKind::Open | TokenKind::OpenCt => {
                let inner = self.lexer.next()?;
                let (term, next) = self.expr(inner, 1200)?;
                match next.kind {
                    TokenKind::Close => Ok((term, self.lexer.next()?, 0)),
                    _ => self.parse_error(&next, "expected )"),
                }
            }
            TokenKind::OpenL => {
                let list = self.list()?;
                Ok((list, self.lexer.next()?, 0))
            }
            _ => self.parse_error(&token, "unexpected token"),
        }
    }

    fn name(&mut self, s: String, max_p: u16) -> Result<(Rc<Term>, Token, u16), PrologError> {
        let next = self.lexer.next()?;
        match &next.kind {
            TokenKind::OpenCt => {
                let c = self.compound(s)?;
                Ok((c, self.lexer.next()?, 0))
            }
            // a sign glued to a numeric literal
            TokenKind::Int(i) if s == "-" => {
                let t = Term::new_integer(-*i);
                Ok((t, self.lexer.next()?, 0))
            }
            TokenKind::Float(f) if s == "-" => {
                let t = Term::new_float(-*f);
                Ok((t, self.lexer.next()?, 0))
            }
            TokenKind::Comma
            | TokenKind::Close
            | TokenKind::CloseL
            | TokenKind::Bar
            | TokenKind::End => Ok((Term::new_atom(s), next, 0)),
            _ => {
                if let Some(def) = self.ops.prefix(&s) {
                    if def.prec <= max_p && can_start_term(&next.kind) {
                        let def = def.clone();
                        let (operand, after) = self.expr(next, def.right_max())?;
                        return Ok((Term::new_compound(s, vec![operand]), after, def.prec));
                    }
                }
                Ok((Term::new_atom(s), next, 0))
            }
        }
    }

    fn compound(&mut self, functor: String) -> Result<Rc<Term>, PrologError> {
        let mut args = Vec::new();
        let mut token = self.lexer.next()?;
        loop {
            let (arg, next) = self.arg(token)?;
            args.push(arg);
            match next.kind {
                TokenKind::Comma => token = self.lexer.next()?,
                TokenKind::Close => return Ok(Term::new_compound(functor, args)),
                _ => return self.parse_error(&next, "expected , or ) in argument list"),
            }
        }
    }

    /// Arguments of compounds and list elements bind tighter than the comma
    /// operator, so the separating comma stays a separator.
    fn arg(&mut self, token: Token) -> Result<(Rc<Term>, Token), PrologError> {
        self.expr(token, 999)
    }

    fn list(&mut self) -> Result<Rc<Term>, PrologError> {
        let mut token = self.lexer.next()?;
        if token.kind == TokenKind::CloseL {
            return Ok(Term::nil());
        }

        let mut items = Vec::new();
        loop {
            let (item, next) = self.arg(token)?;
            items.push(item);
            token = next;
            match token.kind {
                TokenKind::Comma => token = self.lexer.next()?,
                _ => break,
            }
        }

        let tail = match token.kind {
            TokenKind::Bar => {
                let t = self.lexer.next()?;
                let (tail, next) = self.arg(t)?;
                token = next;
                tail
            }
            _ => Term::nil(),
        };

        match token.kind {
            TokenKind::CloseL => Ok(Term::list(items.into_iter(), tail)),
            _ => self.parse_error(&token, "expected ] at end of list"),
        }
    }
}

fn can_start_term(kind: &TokenKind) -> bool {
    matches!(
        kind,
        TokenKind::Name(_)
            | TokenKind::Var(_)
            | TokenKind::Int(_)
            | TokenKind::Float(_)
            | TokenKind::Str(_)
            | TokenKind::Open
            | TokenKind::OpenCt
            | TokenKind::OpenL
    )
}

fn describe(kind: &TokenKind) -> String {
    match kind {
        TokenKind::Eof => "end of input".to_string(),
        TokenKind::Name(s) => format!("name {}", s),
        TokenKind::Var(s) => format!("variable {}", s),
        TokenKind::Int(i) => format!("integer {}", i),
        TokenKind::Float(f) => format!("float {}", f),
        TokenKind::Str(s) => format!("string {:?}", s),
        TokenKind::Open | TokenKind::OpenCt => "(".to_string(),
        TokenKind::Close => ")".to_string(),
        TokenKind::OpenL => "[".to_string(),
        TokenKind::CloseL => "]".to_string(),
        TokenKind::Comma => ",".to_string(),
        TokenKind::Bar => "|".to_string(),
        TokenKind::End => ".".to_string(),
    }
}
