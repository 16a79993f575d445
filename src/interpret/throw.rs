use std::rc::Rc;

use crate::error::{EvalError, PrologError};
use crate::read_term::term::Term;

use super::frame::Bindings;
use super::{write, Response};

/// Constructors for the runtime error responses builtins raise. Logical
/// failure never comes through here.

pub(crate) fn instantiation_error(context: impl Into<String>) -> Response {
    Response::Throw(Box::new(PrologError::Instantiation {
        context: context.into(),
    }))
}

pub(crate) fn type_error(expected: &'static str, store: &Bindings, culprit: &Rc<Term>) -> Response {
    Response::Throw(Box::new(PrologError::Type {
        expected,
        culprit: write::term_text(store, None, culprit, true),
    }))
}

pub(crate) fn domain_error(
    domain: &'static str,
    store: &Bindings,
    culprit: &Rc<Term>,
) -> Response {
    Response::Throw(Box::new(PrologError::Domain {
        domain,
        culprit: write::term_text(store, None, culprit, true),
    }))
}

pub(crate) fn existence_error(procedure: &str) -> Response {
    Response::Throw(Box::new(PrologError::Existence {
        procedure: procedure.to_string(),
    }))
}

pub(crate) fn evaluation_error(kind: EvalError) -> Response {
    Response::Throw(Box::new(PrologError::Evaluation(kind)))
}

pub(crate) fn io_error(e: std::io::Error) -> Response {
    Response::Throw(Box::new(PrologError::Io(e)))
}
