use std::rc::Rc;

use tracing::{debug, trace, warn};

use crate::flags::UnknownFlag;
use crate::read_term::term::Term;

use super::frame::Frame;
use super::solve::{Continuation, Solver};
use super::{builtins, solve, throw, Clause, Procedure, Response};

/// Resolve a goal against the stored clauses of its predicate, in insertion
/// order. Works on a snapshot of the clause list, so assert/retract during
/// the proof do not disturb this activation.
pub(crate) fn solve_user(
    mut frame: Frame,
    pi: &str,
    goal: &Rc<Term>,
    next: &mut dyn Solver,
) -> Response {
    let clauses = match frame.context().procedures.get(pi) {
        Some(p) => p.clauses.clone(),
        None => return unknown(pi, &frame),
    };

    let mut next_cut = false;
    let mut r = Response::Fail;
    for clause in &clauses {
        trace!(predicate = %pi, "try clause");
        r = frame.sub_frame(|mut frame| {
            let (head, body) = frame.instantiate_clause(clause);
            if !frame.unify(&head, goal) {
                return Response::Fail;
            }
            match &body {
                None => next.solve(frame).map_cut(|| {
                    next_cut = true;
                    Response::Cut
                }),
                Some(b) => solve::solve(
                    frame,
                    b,
                    &mut Continuation::new(|frame| {
                        next.solve(frame).map_cut(|| {
                            next_cut = true;
                            Response::Cut
                        })
                    }),
                ),
            }
        });
        match r {
            Response::Fail => continue,
            _ => break,
        }
    }

    // a cut that came through our own clause body commits this activation;
    // one that came from the caller's continuation keeps propagating
    r.map_cut(|| {
        if next_cut {
            Response::Cut
        } else {
            Response::Fail
        }
    })
}

fn unknown(pi: &str, frame: &Frame) -> Response {
    match frame.context().flags.unknown {
        UnknownFlag::Fail => {
            debug!(predicate = %pi, "no clauses, failing");
            Response::Fail
        }
        UnknownFlag::Warning => {
            warn!(predicate = %pi, "no clauses for predicate");
            Response::Fail
        }
        UnknownFlag::Error => throw::existence_error(pi),
    }
}

/// Split a (dereferenced) clause term into head and body, checking the head
/// is callable. Used by assert and retract.
fn unpack_clause(frame: &Frame, t: &Rc<Term>) -> Result<(Rc<Term>, Option<Rc<Term>>), Response> {
    let t = frame.resolve(t);
    let (head, body) = match &*t {
        Term::Compound(c) if c.functor == ":-" && c.args.len() == 2 => {
            (frame.resolve(&c.args[0]), Some(c.args[1].clone()))
        }
        _ => (t.clone(), None),
    };
    match &*head {
        Term::Atom(_) | Term::Compound(_) => Ok((head, body)),
        Term::Var(_) => Err(throw::instantiation_error("clause head")),
        _ => Err(throw::type_error("callable", frame.store(), &head)),
    }
}

pub(crate) fn assert(
    mut frame: Frame,
    clause_term: &Rc<Term>,
    at_end: bool,
    next: &mut dyn Solver,
) -> Response {
    let (head, body) = match unpack_clause(&frame, clause_term) {
        Ok(hb) => hb,
        Err(r) => return r,
    };
    let pi = match head.pi() {
        Some(pi) => pi,
        None => return throw::type_error("callable", frame.store(), &head),
    };
    if builtins::lookup(&pi).is_some() {
        return throw::domain_error("modifiable_procedure", frame.store(), &head);
    }

    // detach head and body together so they keep sharing variables
    let snapshot = match &body {
        Some(b) => frame
            .store()
            .detach(&Term::new_compound(":-", vec![head.clone(), b.clone()])),
        None => frame.store().detach(&head),
    };
    let clause = match (&*snapshot.term, &body) {
        (Term::Compound(c), Some(_)) => Rc::new(Clause {
            head: c.args[0].clone(),
            body: Some(c.args[1].clone()),
            n_vars: snapshot.n_vars,
        }),
        _ => Rc::new(Clause {
            head: snapshot.term.clone(),
            body: None,
            n_vars: snapshot.n_vars,
        }),
    };

    debug!(predicate = %pi, at_end, "assert clause");
    let procedure = frame
        .context_mut()
        .procedures
        .entry(pi)
        .or_insert_with(Procedure::default);
    if at_end {
        procedure.clauses.push(clause);
    } else {
        procedure.clauses.insert(0, clause);
    }
    next.solve(frame)
}

pub(crate) fn retract(mut frame: Frame, pattern: &Rc<Term>, next: &mut dyn Solver) -> Response {
    let (head_pat, body_pat) = match unpack_clause(&frame, pattern) {
        Ok(hb) => hb,
        Err(r) => return r,
    };
    let body_pat = body_pat.unwrap_or_else(|| Term::new_atom("true"));
    let pi = match head_pat.pi() {
        Some(pi) => pi,
        None => return throw::type_error("callable", frame.store(), &head_pat),
    };

    let clauses = match frame.context().procedures.get(&pi) {
        Some(p) => p.clauses.clone(),
        None => return Response::Fail,
    };

    // re-satisfiable: each retry removes the next clause in the snapshot
    // that still exists and unifies with the pattern
    let mut r = Response::Fail;
    for clause in &clauses {
        let still_present = frame
            .context()
            .procedures
            .get(&pi)
            .map(|p| p.clauses.iter().any(|c| Rc::ptr_eq(c, clause)))
            .unwrap_or(false);
        if !still_present {
            continue;
        }

        r = frame.sub_frame(|mut frame| {
            let (head, body) = frame.instantiate_clause(clause);
            let body = body.unwrap_or_else(|| Term::new_atom("true"));
            if frame.unify(&head, &head_pat) && frame.unify(&body, &body_pat) {
                debug!(predicate = %pi, "retract clause");
                if let Some(p) = frame.context_mut().procedures.get_mut(&pi) {
                    p.clauses.retain(|c| !Rc::ptr_eq(c, clause));
                }
                next.solve(frame)
            } else {
                Response::Fail
            }
        });
        match r {
            Response::Fail => continue,
            _ => break,
        }
    }
    r
}
