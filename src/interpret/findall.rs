use std::rc::Rc;

use crate::read_term::term::Term;

use super::frame::{Frame, Snapshot};
use super::solve::{Continuation, Solver};
use super::{solve, Response};

/// findall(Template, Goal, List): collect an instance of `Template` for
/// every solution of `Goal`, then unify the collected list with `List`.
///
/// The goal runs in its own sub-frame, so the only binding that survives to
/// the caller is `List` itself. Each instance is detached from the store
/// while the goal's bindings are live and re-instantiated with fresh
/// variables after the rewind.
pub(crate) fn solve_findall(
    mut frame: Frame,
    args: &[Rc<Term>],
    next: &mut dyn Solver,
) -> Response {
    let mut instances: Vec<Snapshot> = Vec::new();

    let r = frame.sub_frame(|frame| {
        solve::call(
            frame,
            &args[1],
            &mut Continuation::new(|frame| {
                instances.push(frame.store().detach(&args[0]));
                Response::Fail
            }),
        )
    });
    match r {
        Response::Fail => {}
        r => return r,
    }

    frame.sub_frame(|mut frame| {
        let items: Vec<Rc<Term>> = instances
            .iter()
            .map(|s| frame.instantiate_snapshot(s))
            .collect();
        let list = Term::list(items.into_iter(), Term::nil());
        if frame.unify(&list, &args[2]) {
            next.solve(frame)
        } else {
            Response::Fail
        }
    })
}
