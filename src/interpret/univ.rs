use std::rc::Rc;

use crate::read_term::term::Term;

use super::frame::Frame;
use super::solve::Solver;
use super::{throw, Response};

/// `=../2`: Term and [Name|Args] are two views of the same thing.
pub(crate) fn solve_univ(frame: Frame, args: &[Rc<Term>], next: &mut dyn Solver) -> Response {
    let t = frame.resolve(&args[0]);
    match &*t {
        Term::Compound(c) => {
            let items = std::iter::once(Term::new_atom(c.functor.clone()))
                .chain(c.args.iter().cloned());
            let list = Term::list(items.collect::<Vec<_>>().into_iter(), Term::nil());
            unify_continue(frame, &list, &args[1], next)
        }
        Term::Atom(_) | Term::Integer(_) | Term::Float(_) | Term::Str(_) => {
            let list = Term::list(std::iter::once(t.clone()), Term::nil());
            unify_continue(frame, &list, &args[1], next)
        }
        Term::Var(_) => construct(frame, args, next),
    }
}

fn unify_continue(
    mut frame: Frame,
    a: &Rc<Term>,
    b: &Rc<Term>,
    next: &mut dyn Solver,
) -> Response {
    frame.sub_frame(|mut frame| {
        if frame.unify(a, b) {
            next.solve(frame)
        } else {
            Response::Fail
        }
    })
}

fn construct(frame: Frame, args: &[Rc<Term>], next: &mut dyn Solver) -> Response {
    // walk the list into a vector of elements
    let mut items = Vec::new();
    let mut tail = frame.resolve(&args[1]);
    loop {
        let current = tail.clone();
        match &*current {
            Term::Atom(s) if s == "[]" => break,
            Term::Compound(c) if c.functor == "." && c.args.len() == 2 => {
                items.push(frame.resolve(&c.args[0]));
                tail = frame.resolve(&c.args[1]);
            }
            Term::Var(_) => return throw::instantiation_error("=../2 list"),
            _ => return throw::type_error("list", frame.store(), &args[1]),
        }
    }

    let Some((name, rest)) = items.split_first() else {
        return throw::domain_error("non_empty_list", frame.store(), &args[1]);
    };
    let built = match &**name {
        Term::Var(_) => return throw::instantiation_error("=../2 name"),
        Term::Atom(s) if !rest.is_empty() => Term::new_compound(s.clone(), rest.to_vec()),
        Term::Atom(_) | Term::Integer(_) | Term::Float(_) | Term::Str(_) if rest.is_empty() => {
            name.clone()
        }
        _ => return throw::type_error("atom", frame.store(), name),
    };
    unify_continue(frame, &args[0], &built, next)
}
