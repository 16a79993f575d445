use std::fmt::Write as _;
use std::io::{Read, Write};
use std::rc::Rc;

use crate::operators::OperatorTable;
use crate::read_term::term::Term;

use super::arithmetic::{self, Value};
use super::frame::{Bindings, Frame};
use super::solve::Solver;
use super::{throw, Response};

/// Render the current value of a term. With an operator table, infix and
/// prefix operators print in operator notation with minimal parentheses;
/// without one, everything prints in functional notation.
pub(crate) fn term_text(
    store: &Bindings,
    ops: Option<&OperatorTable>,
    t: &Rc<Term>,
    quote_strings: bool,
) -> String {
    let mut out = String::new();
    fmt_term(store, ops, t, 1200, quote_strings, &mut out);
    out
}

fn fmt_term(
    store: &Bindings,
    ops: Option<&OperatorTable>,
    t: &Rc<Term>,
    max_p: u16,
    quote_strings: bool,
    out: &mut String,
) {
    let t = store.resolve(t);
    match &**t {
        Term::Var(idx) => {
            let _ = write!(out, "_G{}", idx);
        }
        Term::Atom(s) => out.push_str(s),
        Term::Integer(i) => {
            let _ = write!(out, "{}", i);
        }
        Term::Float(f) => {
            if f.is_finite() && f.fract() == 0.0 && f.abs() < 1e15 {
                let _ = write!(out, "{:.1}", f);
            } else {
                let _ = write!(out, "{}", f);
            }
        }
        Term::Str(s) => {
            if quote_strings {
                let _ = write!(out, "{:?}", s);
            } else {
                out.push_str(s);
            }
        }
        Term::Compound(c) if c.functor == "." && c.args.len() == 2 => {
            fmt_list(store, ops, &c.args[0], &c.args[1], quote_strings, out);
        }
        Term::Compound(c) => {
            if let Some(ops_t) = ops {
                if c.args.len() == 2 {
                    if let Some(def) = ops_t.infix(&c.functor) {
                        let parens = def.prec > max_p;
                        if parens {
                            out.push('(');
                        }
                        fmt_term(store, ops, &c.args[0], def.left_max(), quote_strings, out);
                        if c.functor == "," {
                            out.push(',');
                        } else if c.functor.starts_with(|ch: char| ch.is_alphanumeric()) {
                            // alphabetic operators need the spaces: 5 mod 2
                            let _ = write!(out, " {} ", c.functor);
                        } else {
                            let _ = write!(out, "{}", c.functor);
                        }
                        fmt_term(store, ops, &c.args[1], def.right_max(), quote_strings, out);
                        if parens {
                            out.push(')');
                        }
                        return;
                    }
                }
                if c.args.len() == 1 {
                    if let Some(def) = ops_t.prefix(&c.functor) {
                        let parens = def.prec > max_p;
                        if parens {
                            out.push('(');
                        }
                        out.push_str(&c.functor);
                        if c.functor.chars().all(|ch| ch.is_alphanumeric() || ch == '_') {
                            out.push(' ');
                        }
                        fmt_term(store, ops, &c.args[0], def.right_max(), quote_strings, out);
                        if parens {
                            out.push(')');
                        }
                        return;
                    }
                }
            }
            out.push_str(&c.functor);
            out.push('(');
            for (i, a) in c.args.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                fmt_term(store, ops, a, 999, quote_strings, out);
            }
            out.push(')');
        }
    }
}

fn fmt_list(
    store: &Bindings,
    ops: Option<&OperatorTable>,
    head: &Rc<Term>,
    tail: &Rc<Term>,
    quote_strings: bool,
    out: &mut String,
) {
    out.push('[');
    fmt_term(store, ops, head, 999, quote_strings, out);
    let mut rest = store.resolve(tail).clone();
    loop {
        let current = rest.clone();
        match &*current {
            Term::Atom(s) if s == "[]" => break,
            Term::Compound(c) if c.functor == "." && c.args.len() == 2 => {
                out.push(',');
                fmt_term(store, ops, &c.args[0], 999, quote_strings, out);
                rest = store.resolve(&c.args[1]).clone();
            }
            _ => {
                out.push('|');
                fmt_term(store, ops, &current, 999, quote_strings, out);
                break;
            }
        }
    }
    out.push(']');
}

fn emit(mut frame: Frame, text: &str, next: &mut dyn Solver) -> Response {
    if let Err(e) = frame
        .context_mut()
        .streams
        .out
        .write_all(text.as_bytes())
    {
        return throw::io_error(e);
    }
    next.solve(frame)
}

pub(crate) fn solve_write(frame: Frame, args: &[Rc<Term>], next: &mut dyn Solver) -> Response {
    let text = term_text(
        frame.store(),
        Some(&frame.context().operators),
        &args[0],
        false,
    );
    emit(frame, &text, next)
}

pub(crate) fn solve_nl(frame: Frame, _: &[Rc<Term>], next: &mut dyn Solver) -> Response {
    emit(frame, "\n", next)
}

pub(crate) fn solve_tab(frame: Frame, args: &[Rc<Term>], next: &mut dyn Solver) -> Response {
    match arithmetic::eval(frame.store(), &args[0]) {
        Ok(Value::Integer(n)) => {
            let text = " ".repeat(n.max(0) as usize);
            emit(frame, &text, next)
        }
        Ok(Value::Float(_)) => {
            let t = frame.resolve(&args[0]);
            throw::type_error("integer", frame.store(), &t)
        }
        Err(r) => r,
    }
}

pub(crate) fn solve_put_char(frame: Frame, args: &[Rc<Term>], next: &mut dyn Solver) -> Response {
    let t = frame.resolve(&args[0]);
    match &*t {
        Term::Atom(s) if s.chars().count() == 1 => {
            let text = s.clone();
            emit(frame, &text, next)
        }
        Term::Var(_) => throw::instantiation_error("put_char/1"),
        _ => throw::type_error("character", frame.store(), &t),
    }
}

pub(crate) fn solve_get_char(
    mut frame: Frame,
    args: &[Rc<Term>],
    next: &mut dyn Solver,
) -> Response {
    let c = match read_one_char(&mut frame.context_mut().streams.inp) {
        Ok(c) => c,
        Err(e) => return throw::io_error(e),
    };
    let atom = match c {
        Some(c) => Term::new_atom(c.to_string()),
        None => Term::new_atom("end_of_file"),
    };
    frame.sub_frame(|mut frame| {
        if frame.unify(&args[0], &atom) {
            next.solve(frame)
        } else {
            Response::Fail
        }
    })
}

/// Read a single UTF-8 character from the input stream.
fn read_one_char(inp: &mut Box<dyn std::io::BufRead>) -> std::io::Result<Option<char>> {
    let mut first = [0u8; 1];
    match inp.read(&mut first) {
        Ok(0) => return Ok(None),
        Ok(_) => {}
        Err(e) => return Err(e),
    }
    let width = match first[0] {
        b if b < 0x80 => 1,
        b if b >= 0xF0 => 4,
        b if b >= 0xE0 => 3,
        _ => 2,
    };
    let mut buf = [0u8; 4];
    buf[0] = first[0];
    if width > 1 {
        inp.read_exact(&mut buf[1..width])?;
    }
    match std::str::from_utf8(&buf[..width]) {
        Ok(s) => Ok(s.chars().next()),
        Err(_) => Err(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            "invalid utf-8 on input",
        )),
    }
}
