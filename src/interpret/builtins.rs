use std::rc::Rc;

use phf::phf_map;

use crate::read_term::term::Term;

use super::frame::Frame;
use super::solve::Solver;
use super::{arithmetic, database, findall, functor, solve, throw, univ, write, Response};

pub(crate) type SolveFn =
    fn(frame: Frame, args: &[Rc<Term>], next: &mut dyn Solver) -> Response;

fn solve_true(frame: Frame, _: &[Rc<Term>], next: &mut dyn Solver) -> Response {
    next.solve(frame)
}

fn solve_fail(_: Frame, _: &[Rc<Term>], _: &mut dyn Solver) -> Response {
    Response::Fail
}

fn solve_call(frame: Frame, args: &[Rc<Term>], next: &mut dyn Solver) -> Response {
    solve::call(frame, &args[0], next)
}

fn solve_unify(mut frame: Frame, args: &[Rc<Term>], next: &mut dyn Solver) -> Response {
    frame.sub_frame(|mut frame| {
        if frame.unify(&args[0], &args[1]) {
            next.solve(frame)
        } else {
            Response::Fail
        }
    })
}

fn solve_not_unifiable(mut frame: Frame, args: &[Rc<Term>], next: &mut dyn Solver) -> Response {
    let unifies = frame.sub_frame(|mut frame| frame.unify(&args[0], &args[1]));
    if unifies {
        Response::Fail
    } else {
        next.solve(frame)
    }
}

fn solve_identical(frame: Frame, args: &[Rc<Term>], next: &mut dyn Solver) -> Response {
    if frame.store().equal(&args[0], &args[1]) {
        next.solve(frame)
    } else {
        Response::Fail
    }
}

fn solve_not_identical(frame: Frame, args: &[Rc<Term>], next: &mut dyn Solver) -> Response {
    if frame.store().equal(&args[0], &args[1]) {
        Response::Fail
    } else {
        next.solve(frame)
    }
}

fn type_test(
    frame: Frame,
    args: &[Rc<Term>],
    next: &mut dyn Solver,
    test: fn(&Term) -> bool,
) -> Response {
    let t = frame.resolve(&args[0]);
    if test(&t) {
        next.solve(frame)
    } else {
        Response::Fail
    }
}

fn solve_var(frame: Frame, args: &[Rc<Term>], next: &mut dyn Solver) -> Response {
    type_test(frame, args, next, |t| matches!(t, Term::Var(_)))
}

fn solve_nonvar(frame: Frame, args: &[Rc<Term>], next: &mut dyn Solver) -> Response {
    type_test(frame, args, next, |t| !matches!(t, Term::Var(_)))
}

fn solve_atom(frame: Frame, args: &[Rc<Term>], next: &mut dyn Solver) -> Response {
    type_test(frame, args, next, |t| matches!(t, Term::Atom(_)))
}

fn solve_number(frame: Frame, args: &[Rc<Term>], next: &mut dyn Solver) -> Response {
    type_test(frame, args, next, |t| {
        matches!(t, Term::Integer(_) | Term::Float(_))
    })
}

fn solve_integer(frame: Frame, args: &[Rc<Term>], next: &mut dyn Solver) -> Response {
    type_test(frame, args, next, |t| matches!(t, Term::Integer(_)))
}

fn solve_float(frame: Frame, args: &[Rc<Term>], next: &mut dyn Solver) -> Response {
    type_test(frame, args, next, |t| matches!(t, Term::Float(_)))
}

fn solve_atomic(frame: Frame, args: &[Rc<Term>], next: &mut dyn Solver) -> Response {
    type_test(frame, args, next, |t| {
        matches!(
            t,
            Term::Atom(_) | Term::Integer(_) | Term::Float(_) | Term::Str(_)
        )
    })
}

fn solve_compound(frame: Frame, args: &[Rc<Term>], next: &mut dyn Solver) -> Response {
    type_test(frame, args, next, |t| matches!(t, Term::Compound(_)))
}

fn solve_asserta(frame: Frame, args: &[Rc<Term>], next: &mut dyn Solver) -> Response {
    database::assert(frame, &args[0], false, next)
}

fn solve_assertz(frame: Frame, args: &[Rc<Term>], next: &mut dyn Solver) -> Response {
    database::assert(frame, &args[0], true, next)
}

fn solve_retract(frame: Frame, args: &[Rc<Term>], next: &mut dyn Solver) -> Response {
    database::retract(frame, &args[0], next)
}

/// length(?List, ?N). Counts a proper list, or builds a list of fresh
/// variables when only the length is known.
fn solve_length(mut frame: Frame, args: &[Rc<Term>], next: &mut dyn Solver) -> Response {
    let mut count: i64 = 0;
    let mut tail = frame.resolve(&args[0]);
    loop {
        let current = tail.clone();
        match &*current {
            Term::Atom(s) if s == "[]" => {
                let n = Term::new_integer(count);
                return frame.sub_frame(|mut frame| {
                    if frame.unify(&n, &args[1]) {
                        next.solve(frame)
                    } else {
                        Response::Fail
                    }
                });
            }
            Term::Compound(c) if c.functor == "." && c.args.len() == 2 => {
                count += 1;
                tail = frame.resolve(&c.args[1]);
            }
            Term::Var(_) => break,
            _ => return throw::type_error("list", frame.store(), &args[0]),
        }
    }

    // open or unbound list: the length must tell us how far to go
    let n = frame.resolve(&args[1]);
    match &*n {
        Term::Integer(n) if *n >= count => {
            let fresh = *n - count;
            frame.sub_frame(|mut frame| {
                let base = frame.store_mut().alloc(fresh as usize);
                let items = (0..fresh as usize).map(|i| Term::new_var(base + i));
                let rest = Term::list(items, Term::nil());
                if frame.unify(&tail, &rest) {
                    next.solve(frame)
                } else {
                    Response::Fail
                }
            })
        }
        Term::Integer(_) => Response::Fail,
        Term::Var(_) => throw::instantiation_error("length/2 with open list"),
        _ => throw::type_error("integer", frame.store(), &n),
    }
}

static BUILTINS: phf::Map<&'static str, SolveFn> = phf_map! {
    "true/0" => solve_true,
    "fail/0" => solve_fail,
    "false/0" => solve_fail,
    "call/1" => solve_call,
    "=/2" => solve_unify,
    "\\=/2" => solve_not_unifiable,
    "==/2" => solve_identical,
    "\\==/2" => solve_not_identical,
    "var/1" => solve_var,
    "nonvar/1" => solve_nonvar,
    "atom/1" => solve_atom,
    "number/1" => solve_number,
    "integer/1" => solve_integer,
    "float/1" => solve_float,
    "atomic/1" => solve_atomic,
    "compound/1" => solve_compound,
    "is/2" => arithmetic::solve_is,
    "=:=/2" => arithmetic::solve_eq,
    "=\\=/2" => arithmetic::solve_neq,
    "</2" => arithmetic::solve_lss,
    "=</2" => arithmetic::solve_leq,
    ">/2" => arithmetic::solve_gtr,
    ">=/2" => arithmetic::solve_geq,
    "functor/3" => functor::solve_functor,
    "arg/3" => functor::solve_arg,
    "=../2" => univ::solve_univ,
    "asserta/1" => solve_asserta,
    "assertz/1" => solve_assertz,
    "retract/1" => solve_retract,
    "findall/3" => findall::solve_findall,
    "length/2" => solve_length,
    "write/1" => write::solve_write,
    "nl/0" => write::solve_nl,
    "tab/1" => write::solve_tab,
    "put_char/1" => write::solve_put_char,
    "get_char/1" => write::solve_get_char,
};

pub(crate) fn lookup(pi: &str) -> Option<&SolveFn> {
    BUILTINS.get(pi)
}
