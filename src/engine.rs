use std::io::{BufRead, Write};

use tracing::debug;

use crate::consult;
use crate::error::PrologError;
use crate::flags::Flags;
use crate::interpret::frame::{renumber, Bindings, Frame};
use crate::interpret::solve::{solve, Continuation};
use crate::interpret::{write, Context, Response};
use crate::read_term::parser::Parser;
use crate::read_term::term::Term;

/// What the solution sink wants next: keep enumerating, or abandon the
/// stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Stop,
}

/// One proof of the query: the query's named variables mapped to the
/// printed form of their values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Solution {
    bindings: Vec<(String, String)>,
}

impl Solution {
    pub fn get(&self, name: &str) -> Option<&str> {
        self.bindings
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.bindings.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }
}

/// List predicates that resolve through the ordinary engine rather than
/// native code.
const PRELUDE: &str = "
member(X, [X|_]).
member(X, [_|T]) :- member(X, T).

append([], L, L).
append([H|T], L, [H|R]) :- append(T, L, R).
";

/// An in-memory Prolog engine: a clause database plus the machinery to
/// prove queries against it.
pub struct Engine {
    ctx: Context,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

impl Engine {
    pub fn new() -> Self {
        let mut ctx = Context::new(Flags::default());
        consult::load_text(&mut ctx, PRELUDE).expect("list library is well-formed");
        Self { ctx }
    }

    /// Parse `source` and append its clauses. On error nothing from
    /// `source` is kept and previously loaded clauses survive.
    pub fn load(&mut self, source: &str) -> Result<(), PrologError> {
        consult::load_text(&mut self.ctx, source)?;
        Ok(())
    }

    /// Append a single clause, e.g. `"likes(mary, wine)."`.
    pub fn assert_one(&mut self, clause_text: &str) -> Result<(), PrologError> {
        let clauses = consult::parse_program(&self.ctx.operators, clause_text)?;
        if clauses.len() != 1 {
            return Err(PrologError::Parse {
                line: 1,
                message: format!("expected exactly one clause, found {}", clauses.len()),
            });
        }
        for (pi, clause) in clauses {
            consult::add_clause(&mut self.ctx, pi, clause, true);
        }
        Ok(())
    }

    /// Discard all clauses (the list library included, which is then
    /// reinstated) and start from a clean database. Flags survive.
    pub fn reset(&mut self) {
        self.ctx.procedures.clear();
        consult::load_text(&mut self.ctx, PRELUDE).expect("list library is well-formed");
    }

    /// Prove the goal, collecting every solution in order. Convenience for
    /// finite solution sets; use [`Engine::query_with`] to stop early.
    pub fn query(&mut self, goal_text: &str) -> Result<Vec<Solution>, PrologError> {
        let mut all = Vec::new();
        self.query_with(goal_text, |s| {
            all.push(s);
            Flow::Continue
        })?;
        Ok(all)
    }

    /// Prove the goal, stopping after the first solution.
    pub fn query_first(&mut self, goal_text: &str) -> Result<Option<Solution>, PrologError> {
        let mut first = None;
        self.query_with(goal_text, |s| {
            first = Some(s);
            Flow::Stop
        })?;
        Ok(first)
    }

    /// Prove the goal, handing each solution to `sink` as it is found. The
    /// sink's return value drives the stream: `Continue` backtracks into
    /// the next alternative, `Stop` abandons the search. Either way the
    /// binding store is fully unwound before this returns.
    pub fn query_with(
        &mut self,
        goal_text: &str,
        mut sink: impl FnMut(Solution) -> Flow,
    ) -> Result<(), PrologError> {
        let parsed = {
            let mut parser = Parser::new(&self.ctx.operators, goal_text);
            let first = parser.next_term()?;
            let Some(t) = first else {
                return Err(PrologError::Parse {
                    line: 1,
                    message: "empty query".to_string(),
                });
            };
            if parser.next_term()?.is_some() {
                return Err(PrologError::Parse {
                    line: t.line,
                    message: "more than one term in query".to_string(),
                });
            }
            t
        };
        debug!(goal = goal_text.trim(), "query");

        let mut store = Bindings::new();
        let base = store.alloc(parsed.var_names.len());
        let goal = renumber(&parsed.term, base);

        // `_`-prefixed variables stay out of the reported solutions
        let query_vars: Vec<(String, usize)> = parsed
            .var_names
            .iter()
            .enumerate()
            .filter(|(_, name)| !name.starts_with('_'))
            .map(|(i, name)| (name.clone(), base + i))
            .collect();

        let frame = Frame::new(&mut self.ctx, &mut store);
        let r = solve(
            frame,
            &goal,
            &mut Continuation::new(|frame| {
                let bindings = query_vars
                    .iter()
                    .map(|(name, slot)| {
                        let value = write::term_text(
                            frame.store(),
                            Some(&frame.context().operators),
                            &Term::new_var(*slot),
                            true,
                        );
                        (name.clone(), value)
                    })
                    .collect();
                match sink(Solution { bindings }) {
                    Flow::Continue => Response::Fail,
                    Flow::Stop => Response::Halt,
                }
            }),
        );
        match r {
            Response::Fail | Response::Cut | Response::Halt => Ok(()),
            Response::Throw(e) => Err(*e),
        }
    }

    pub fn flags_mut(&mut self) -> &mut Flags {
        &mut self.ctx.flags
    }

    /// Redirect the output of `write/1` and friends.
    pub fn set_output(&mut self, out: Box<dyn Write>) {
        self.ctx.streams.out = out;
    }

    /// Redirect the input of `get_char/1`.
    pub fn set_input(&mut self, inp: Box<dyn BufRead>) {
        self.ctx.streams.inp = inp;
    }
}
