use std::cmp::Ordering;
use std::rc::Rc;

use phf::phf_map;

use crate::error::EvalError;
use crate::read_term::term::Term;

use super::frame::{Bindings, Frame};
use super::solve::Solver;
use super::{throw, Response};

/// A computed number. Integer arithmetic stays integer; any float operand
/// makes the result float.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum Value {
    Integer(i64),
    Float(f64),
}

impl Value {
    fn to_term(self) -> Rc<Term> {
        match self {
            Value::Integer(i) => Term::new_integer(i),
            Value::Float(f) => Term::new_float(f),
        }
    }
}

fn promote2<R>(
    v1: Value,
    v2: Value,
    fi: impl FnOnce(i64, i64) -> Result<R, Response>,
    fd: impl FnOnce(f64, f64) -> Result<R, Response>,
) -> Result<R, Response> {
    match (v1, v2) {
        (Value::Integer(a), Value::Integer(b)) => fi(a, b),
        (Value::Integer(a), Value::Float(b)) => fd(a as f64, b),
        (Value::Float(a), Value::Integer(b)) => fd(a, b as f64),
        (Value::Float(a), Value::Float(b)) => fd(a, b),
    }
}

fn checked(r: Option<i64>) -> Result<Value, Response> {
    match r {
        Some(i) => Ok(Value::Integer(i)),
        None => Err(throw::evaluation_error(EvalError::IntOverflow)),
    }
}

/// Recursively reduce an expression term to a number.
pub(crate) fn eval(store: &Bindings, expr: &Rc<Term>) -> Result<Value, Response> {
    let expr = store.resolve(expr).clone();
    match &*expr {
        Term::Integer(i) => Ok(Value::Integer(*i)),
        Term::Float(f) => Ok(Value::Float(*f)),
        Term::Var(_) => Err(throw::instantiation_error("arithmetic expression")),
        Term::Compound(c) => {
            let pi = format!("{}/{}", c.functor, c.args.len());
            match EVALUABLE.get(pi.as_str()) {
                Some(f) => {
                    let mut values = Vec::with_capacity(c.args.len());
                    for a in &c.args {
                        values.push(eval(store, a)?);
                    }
                    f(&values)
                }
                None => Err(throw::type_error("evaluable", store, &expr)),
            }
        }
        _ => Err(throw::type_error("evaluable", store, &expr)),
    }
}

pub(crate) fn solve_is(mut frame: Frame, args: &[Rc<Term>], next: &mut dyn Solver) -> Response {
    match eval(frame.store(), &args[1]) {
        Err(r) => r,
        Ok(v) => frame.sub_frame(|mut frame| {
            if frame.unify(&args[0], &v.to_term()) {
                next.solve(frame)
            } else {
                Response::Fail
            }
        }),
    }
}

fn compare(frame: &Frame, t1: &Rc<Term>, t2: &Rc<Term>) -> Result<Option<Ordering>, Response> {
    let v1 = eval(frame.store(), t1)?;
    let v2 = eval(frame.store(), t2)?;
    promote2(
        v1,
        v2,
        |a, b| Ok(a.partial_cmp(&b)),
        |a, b| Ok(a.partial_cmp(&b)),
    )
}

fn numeric_test(
    frame: Frame,
    args: &[Rc<Term>],
    next: &mut dyn Solver,
    accept: fn(Ordering) -> bool,
) -> Response {
    match compare(&frame, &args[0], &args[1]) {
        Ok(Some(o)) if accept(o) => next.solve(frame),
        Ok(_) => Response::Fail,
        Err(r) => r,
    }
}

pub(crate) fn solve_eq(frame: Frame, args: &[Rc<Term>], next: &mut dyn Solver) -> Response {
    numeric_test(frame, args, next, |o| o == Ordering::Equal)
}

pub(crate) fn solve_neq(frame: Frame, args: &[Rc<Term>], next: &mut dyn Solver) -> Response {
    numeric_test(frame, args, next, |o| o != Ordering::Equal)
}

pub(crate) fn solve_lss(frame: Frame, args: &[Rc<Term>], next: &mut dyn Solver) -> Response {
    numeric_test(frame, args, next, |o| o == Ordering::Less)
}

pub(crate) fn solve_leq(frame: Frame, args: &[Rc<Term>], next: &mut dyn Solver) -> Response {
    numeric_test(frame, args, next, |o| o != Ordering::Greater)
}

pub(crate) fn solve_gtr(frame: Frame, args: &[Rc<Term>], next: &mut dyn Solver) -> Response {
    numeric_test(frame, args, next, |o| o == Ordering::Greater)
}

pub(crate) fn solve_geq(frame: Frame, args: &[Rc<Term>], next: &mut dyn Solver) -> Response {
    numeric_test(frame, args, next, |o| o != Ordering::Less)
}

type EvalFn = fn(args: &[Value]) -> Result<Value, Response>;

fn eval_add(args: &[Value]) -> Result<Value, Response> {
    promote2(
        args[0],
        args[1],
        |a, b| checked(a.checked_add(b)),
        |a, b| Ok(Value::Float(a + b)),
    )
}

fn eval_sub(args: &[Value]) -> Result<Value, Response> {
    promote2(
        args[0],
        args[1],
        |a, b| checked(a.checked_sub(b)),
        |a, b| Ok(Value::Float(a - b)),
    )
}

fn eval_mul(args: &[Value]) -> Result<Value, Response> {
    promote2(
        args[0],
        args[1],
        |a, b| checked(a.checked_mul(b)),
        |a, b| Ok(Value::Float(a * b)),
    )
}

/// `/` keeps an exact integer quotient as an integer, and falls back to
/// float otherwise.
fn eval_div(args: &[Value]) -> Result<Value, Response> {
    promote2(
        args[0],
        args[1],
        |a, b| {
            if b == 0 {
                Err(throw::evaluation_error(EvalError::DivisionByZero))
            } else if b == -1 {
                checked(a.checked_neg())
            } else if a % b == 0 {
                Ok(Value::Integer(a / b))
            } else {
                Ok(Value::Float(a as f64 / b as f64))
            }
        },
        |a, b| {
            if b == 0.0 {
                Err(throw::evaluation_error(EvalError::DivisionByZero))
            } else {
                Ok(Value::Float(a / b))
            }
        },
    )
}

fn integer_only(v: Value) -> Response {
    Response::Throw(Box::new(crate::error::PrologError::Type {
        expected: "integer",
        culprit: match v {
            Value::Integer(i) => i.to_string(),
            Value::Float(f) => format!("{:?}", f),
        },
    }))
}

/// `//` is floor division over integers.
fn eval_int_div(args: &[Value]) -> Result<Value, Response> {
    match (args[0], args[1]) {
        (Value::Integer(a), Value::Integer(b)) => {
            if b == 0 {
                Err(throw::evaluation_error(EvalError::DivisionByZero))
            } else if a == i64::MIN && b == -1 {
                Err(throw::evaluation_error(EvalError::IntOverflow))
            } else {
                let mut q = a / b;
                if a % b != 0 && (a < 0) != (b < 0) {
                    q -= 1;
                }
                Ok(Value::Integer(q))
            }
        }
        (Value::Float(_), _) => Err(integer_only(args[0])),
        _ => Err(integer_only(args[1])),
    }
}

/// `mod` takes the sign of the divisor.
fn eval_mod(args: &[Value]) -> Result<Value, Response> {
    match (args[0], args[1]) {
        (Value::Integer(a), Value::Integer(b)) => {
            if b == 0 {
                Err(throw::evaluation_error(EvalError::DivisionByZero))
            } else if b == -1 {
                Ok(Value::Integer(0))
            } else {
                let r = a % b;
                Ok(Value::Integer(if r != 0 && (r < 0) != (b < 0) {
                    r + b
                } else {
                    r
                }))
            }
        }
        (Value::Float(_), _) => Err(integer_only(args[0])),
        _ => Err(integer_only(args[1])),
    }
}

fn eval_pow(args: &[Value]) -> Result<Value, Response> {
    promote2(
        args[0],
        args[1],
        |a, b| {
            if b >= 0 {
                checked(u32::try_from(b).ok().and_then(|e| a.checked_pow(e)))
            } else {
                Ok(Value::Float((a as f64).powf(b as f64)))
            }
        },
        |a, b| Ok(Value::Float(a.powf(b))),
    )
}

fn eval_neg(args: &[Value]) -> Result<Value, Response> {
    match args[0] {
        Value::Integer(i) => checked(i.checked_neg()),
        Value::Float(f) => Ok(Value::Float(-f)),
    }
}

fn eval_plus(args: &[Value]) -> Result<Value, Response> {
    Ok(args[0])
}

fn eval_abs(args: &[Value]) -> Result<Value, Response> {
    match args[0] {
        Value::Integer(i) => checked(i.checked_abs()),
        Value::Float(f) => Ok(Value::Float(f.abs())),
    }
}

fn eval_max(args: &[Value]) -> Result<Value, Response> {
    let less = promote2(args[0], args[1], |a, b| Ok(a < b), |a, b| Ok(a < b))?;
    Ok(if less { args[1] } else { args[0] })
}

fn eval_min(args: &[Value]) -> Result<Value, Response> {
    let less = promote2(args[0], args[1], |a, b| Ok(a <= b), |a, b| Ok(a <= b))?;
    Ok(if less { args[0] } else { args[1] })
}

static EVALUABLE: phf::Map<&'static str, EvalFn> = phf_map! {
    "+/2" => eval_add,
    "-/2" => eval_sub,
    "*/2" => eval_mul,
    "//2" => eval_div,
    "///2" => eval_int_div,
    "mod/2" => eval_mod,
    "**/2" => eval_pow,
    "-/1" => eval_neg,
    "+/1" => eval_plus,
    "abs/1" => eval_abs,
    "max/2" => eval_max,
    "min/2" => eval_min,
};
