pub(crate) mod arithmetic;
pub(crate) mod builtins;
pub(crate) mod database;
pub(crate) mod findall;
pub(crate) mod frame;
pub(crate) mod functor;
pub(crate) mod solve;
pub(crate) mod throw;
pub(crate) mod univ;
pub(crate) mod write;

#[cfg(test)]
mod test;

use std::collections::HashMap;
use std::io::{BufRead, Write};
use std::rc::Rc;

use crate::error::PrologError;
use crate::flags::Flags;
use crate::operators::OperatorTable;
use crate::read_term::term::Term;

/// Outcome of driving a goal. `Fail` asks the caller for the next
/// alternative; `Cut` additionally discards alternatives up to the enclosing
/// predicate activation; `Halt` means the consumer stopped pulling solutions;
/// `Throw` aborts the whole query.
#[derive(Debug)]
pub(crate) enum Response {
    Fail,
    Cut,
    Halt,
    Throw(Box<PrologError>),
}

impl Response {
    pub(crate) fn map_failed<F: FnOnce() -> Response>(self, op: F) -> Response {
        match self {
            Response::Fail => op(),
            _ => self,
        }
    }

    pub(crate) fn map_cut<F: FnOnce() -> Response>(self, op: F) -> Response {
        match self {
            Response::Cut => op(),
            _ => self,
        }
    }
}

/// A stored clause. Head and body share one variable numbering
/// `0..n_vars`; activation renumbers them into fresh slots.
#[derive(Debug)]
pub(crate) struct Clause {
    pub head: Rc<Term>,
    pub body: Option<Rc<Term>>,
    pub n_vars: usize,
}

/// The clauses of one predicate, in resolution order.
#[derive(Debug, Default)]
pub(crate) struct Procedure {
    pub clauses: Vec<Rc<Clause>>,
}

/// Input/output handles used by the i/o builtins; replaceable so hosts and
/// tests can capture output.
pub(crate) struct Streams {
    pub out: Box<dyn Write>,
    pub inp: Box<dyn BufRead>,
}

impl Default for Streams {
    fn default() -> Self {
        Self {
            out: Box::new(std::io::stdout()),
            inp: Box::new(std::io::BufReader::new(std::io::stdin())),
        }
    }
}

/// Everything a running query can see: the clause database, configuration
/// flags, the operator registry and the i/o streams.
pub(crate) struct Context {
    pub procedures: HashMap<String, Procedure>,
    pub flags: Flags,
    pub operators: OperatorTable,
    pub streams: Streams,
}

impl Context {
    pub fn new(flags: Flags) -> Self {
        Self {
            procedures: HashMap::new(),
            flags,
            operators: OperatorTable::core(),
            streams: Streams::default(),
        }
    }
}
