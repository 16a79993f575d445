use std::rc::Rc;

use crate::read_term::term::Term;

use super::frame::Frame;
use super::solve::Solver;
use super::{throw, Response};

/// functor(?Term, ?Name, ?Arity): decompose a bound term, or construct one
/// from a name and arity.
pub(crate) fn solve_functor(
    mut frame: Frame,
    args: &[Rc<Term>],
    next: &mut dyn Solver,
) -> Response {
    let t = frame.resolve(&args[0]);
    match &*t {
        Term::Compound(c) => {
            let name = Term::new_atom(c.functor.clone());
            let arity = Term::new_integer(c.args.len() as i64);
            frame.sub_frame(|mut frame| {
                if frame.unify(&args[1], &name) && frame.unify(&args[2], &arity) {
                    next.solve(frame)
                } else {
                    Response::Fail
                }
            })
        }
        Term::Atom(_) | Term::Integer(_) | Term::Float(_) | Term::Str(_) => {
            let zero = Term::new_integer(0);
            frame.sub_frame(|mut frame| {
                if frame.unify(&args[1], &t) && frame.unify(&args[2], &zero) {
                    next.solve(frame)
                } else {
                    Response::Fail
                }
            })
        }
        Term::Var(_) => construct(frame, args, next),
    }
}

fn construct(mut frame: Frame, args: &[Rc<Term>], next: &mut dyn Solver) -> Response {
    let name = frame.resolve(&args[1]);
    let arity = frame.resolve(&args[2]);
    match (&*name, &*arity) {
        (Term::Var(_), _) => throw::instantiation_error("functor/3 name"),
        (_, Term::Var(_)) => throw::instantiation_error("functor/3 arity"),
        (Term::Compound(_), Term::Integer(0)) => {
            throw::type_error("atomic", frame.store(), &name)
        }
        (_, Term::Integer(0)) => frame.sub_frame(|mut frame| {
            if frame.unify(&args[0], &name) {
                next.solve(frame)
            } else {
                Response::Fail
            }
        }),
        (Term::Atom(s), Term::Integer(n)) if *n > 0 => {
            let functor = s.clone();
            let n = *n as usize;
            frame.sub_frame(|mut frame| {
                let base = frame.store_mut().alloc(n);
                let c = Term::new_compound(functor, (0..n).map(|i| Term::new_var(base + i)).collect());
                if frame.unify(&args[0], &c) {
                    next.solve(frame)
                } else {
                    Response::Fail
                }
            })
        }
        (_, Term::Integer(n)) if *n < 0 => {
            throw::domain_error("not_less_than_zero", frame.store(), &arity)
        }
        (_, Term::Integer(_)) => throw::type_error("atom", frame.store(), &name),
        _ => throw::type_error("integer", frame.store(), &arity),
    }
}

/// arg(+N, +Term, ?Arg): the N-th (1-based) argument of a compound.
pub(crate) fn solve_arg(mut frame: Frame, args: &[Rc<Term>], next: &mut dyn Solver) -> Response {
    let n = frame.resolve(&args[0]);
    let t = frame.resolve(&args[1]);
    match (&*n, &*t) {
        (Term::Var(_), _) => throw::instantiation_error("arg/3 index"),
        (_, Term::Var(_)) => throw::instantiation_error("arg/3 term"),
        (Term::Integer(i), Term::Compound(c)) => {
            if *i < 1 {
                throw::domain_error("argument_index", frame.store(), &n)
            } else if (*i as usize) <= c.args.len() {
                let arg = c.args[(*i - 1) as usize].clone();
                frame.sub_frame(|mut frame| {
                    if frame.unify(&arg, &args[2]) {
                        next.solve(frame)
                    } else {
                        Response::Fail
                    }
                })
            } else {
                Response::Fail
            }
        }
        (Term::Integer(_), _) => throw::type_error("compound", frame.store(), &t),
        _ => throw::type_error("integer", frame.store(), &n),
    }
}
