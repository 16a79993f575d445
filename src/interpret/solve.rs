use std::rc::Rc;

use tracing::trace;

use crate::read_term::term::Term;

use super::frame::Frame;
use super::{builtins, database, Response};

/// A success continuation. `solve` calls it once per solution of its goal;
/// the continuation's return value drives backtracking (`Fail` asks for the
/// next solution, anything else unwinds).
pub(crate) trait Solver {
    fn solve(&mut self, frame: Frame) -> Response;
}

pub(crate) struct Continuation<F>
where
    F: FnMut(Frame) -> Response,
{
    solve: F,
}

impl<F> Continuation<F>
where
    F: FnMut(Frame) -> Response,
{
    pub fn new(f: F) -> Self {
        Self { solve: f }
    }
}

impl<F> Solver for Continuation<F>
where
    F: FnMut(Frame) -> Response,
{
    fn solve(&mut self, frame: Frame) -> Response {
        (self.solve)(frame)
    }
}

/// Prove `goal` in the current environment, calling `next` at every
/// solution. Control constructs are handled here; everything else is either
/// a builtin or a user predicate.
pub(crate) fn solve(frame: Frame, goal: &Rc<Term>, next: &mut dyn Solver) -> Response {
    let g = frame.resolve(goal);
    match &*g {
        // an unbound or non-callable goal is not provable
        Term::Var(_) | Term::Integer(_) | Term::Float(_) | Term::Str(_) => {
            trace!(?g, "uncallable goal");
            Response::Fail
        }
        Term::Atom(s) => match s.as_str() {
            "true" => next.solve(frame),
            "fail" | "false" => Response::Fail,
            "!" => next.solve(frame).map_failed(|| Response::Cut),
            _ => dispatch(frame, &g, &[], next),
        },
        Term::Compound(c) => match (c.functor.as_str(), c.args.len()) {
            (",", 2) => solve_and(frame, &c.args[0], &c.args[1], next),
            (";", 2) => solve_or(frame, &c.args[0], &c.args[1], next),
            ("->", 2) => solve_if_then_else(frame, &c.args[0], &c.args[1], None, next),
            ("\\+", 1) => solve_not_provable(frame, &c.args[0], next),
            _ => dispatch(frame, &g, &c.args, next),
        },
    }
}

fn dispatch(
    frame: Frame,
    goal: &Rc<Term>,
    args: &[Rc<Term>],
    next: &mut dyn Solver,
) -> Response {
    let pi = match goal.pi() {
        Some(pi) => pi,
        None => return Response::Fail,
    };
    match builtins::lookup(&pi) {
        Some(f) => {
            trace!(goal = %pi, "builtin");
            f(frame, args, next)
        }
        None => database::solve_user(frame, &pi, goal, next),
    }
}

fn solve_and(frame: Frame, a: &Rc<Term>, b: &Rc<Term>, next: &mut dyn Solver) -> Response {
    solve(
        frame,
        a,
        &mut Continuation::new(|frame| solve(frame, b, next)),
    )
}

fn solve_or(mut frame: Frame, a: &Rc<Term>, b: &Rc<Term>, next: &mut dyn Solver) -> Response {
    // (C -> T ; E) is one construct, recognized before the left branch runs
    let left = frame.resolve(a);
    if let Term::Compound(c) = &*left {
        if c.functor == "->" && c.args.len() == 2 {
            return solve_if_then_else(frame, &c.args[0], &c.args[1], Some(b), next);
        }
    }
    frame
        .sub_frame(|frame| solve(frame, a, next))
        .map_failed(|| solve(frame, b, next))
}

fn solve_if_then_else(
    mut frame: Frame,
    cond: &Rc<Term>,
    then_t: &Rc<Term>,
    else_t: Option<&Rc<Term>>,
    next: &mut dyn Solver,
) -> Response {
    let mut cond_met = false;
    let mut then_cut = false;
    frame
        .sub_frame(|frame| {
            solve(
                frame,
                cond,
                &mut Continuation::new(|frame| {
                    // first solution of the condition commits: the then-goal
                    // runs here, and whatever happens afterwards the
                    // condition's remaining alternatives are discarded
                    cond_met = true;
                    solve(frame, then_t, next)
                        .map_cut(|| {
                            then_cut = true;
                            Response::Cut
                        })
                        .map_failed(|| Response::Cut)
                }),
            )
        })
        .map_cut(|| {
            if then_cut {
                Response::Cut
            } else {
                Response::Fail
            }
        })
        .map_failed(|| match else_t {
            Some(e) if !cond_met => solve(frame, e, next),
            _ => Response::Fail,
        })
}

fn solve_not_provable(mut frame: Frame, goal: &Rc<Term>, next: &mut dyn Solver) -> Response {
    let mut found = false;
    let r = frame.sub_frame(|frame| {
        solve(
            frame,
            goal,
            &mut Continuation::new(|_| {
                found = true;
                Response::Cut
            }),
        )
    });
    match r {
        Response::Fail | Response::Cut => {
            if found {
                Response::Fail
            } else {
                next.solve(frame)
            }
        }
        r => r,
    }
}

/// Meta-call: prove a constructed goal. Opaque to cut, so a `!` inside the
/// called goal cuts only within it.
pub(crate) fn call(frame: Frame, goal: &Rc<Term>, next: &mut dyn Solver) -> Response {
    let mut next_cut = false;
    solve(
        frame,
        goal,
        &mut Continuation::new(|frame| {
            next.solve(frame).map_cut(|| {
                next_cut = true;
                Response::Cut
            })
        }),
    )
    .map_cut(|| {
        if next_cut {
            Response::Cut
        } else {
            Response::Fail
        }
    })
}
