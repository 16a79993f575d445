use std::rc::Rc;

use tracing::debug;

use crate::error::PrologError;
use crate::interpret::{Clause, Context, Procedure};
use crate::operators::OperatorTable;
use crate::read_term::parser::{ParsedTerm, Parser};
use crate::read_term::term::Term;

/// Parse program text and append its clauses to the database. The load is
/// all-or-nothing: on a tokenize or parse error nothing from this text is
/// kept, while clauses from earlier loads stay untouched.
pub(crate) fn load_text(ctx: &mut Context, source: &str) -> Result<usize, PrologError> {
    let clauses = parse_program(&ctx.operators, source)?;
    let n = clauses.len();
    for (pi, clause) in clauses {
        add_clause(ctx, pi, clause, true);
    }
    debug!(clauses = n, "consulted text");
    Ok(n)
}

pub(crate) fn parse_program(
    ops: &OperatorTable,
    source: &str,
) -> Result<Vec<(String, Rc<Clause>)>, PrologError> {
    let mut parser = Parser::new(ops, source);
    let mut out = Vec::new();
    while let Some(t) = parser.next_term()? {
        out.push(clause_from_term(t)?);
    }
    Ok(out)
}

/// Split a top-level term into a stored clause: `Head :- Body` is a rule,
/// any other callable term is a fact.
fn clause_from_term(t: ParsedTerm) -> Result<(String, Rc<Clause>), PrologError> {
    let n_vars = t.var_names.len();
    let (head, body) = match &*t.term {
        Term::Compound(c) if c.functor == ":-" && c.args.len() == 2 => {
            (c.args[0].clone(), Some(c.args[1].clone()))
        }
        _ => (t.term.clone(), None),
    };
    match head.pi() {
        Some(pi) => Ok((pi, Rc::new(Clause { head, body, n_vars }))),
        None => Err(PrologError::Parse {
            line: t.line,
            message: "clause head is not callable".to_string(),
        }),
    }
}

pub(crate) fn add_clause(ctx: &mut Context, pi: String, clause: Rc<Clause>, at_end: bool) {
    let procedure = ctx.procedures.entry(pi).or_insert_with(Procedure::default);
    if at_end {
        procedure.clauses.push(clause);
    } else {
        procedure.clauses.insert(0, clause);
    }
}
