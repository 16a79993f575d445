use std::collections::HashMap;
use std::rc::Rc;

use crate::read_term::term::Term;

use super::{Clause, Context};

/// The substitution store: one slot per live variable, plus the trail of
/// bindings that lets a rewind restore any earlier state exactly.
#[derive(Debug, Default)]
pub(crate) struct Bindings {
    slots: Vec<Option<Rc<Term>>>,
    trail: Vec<usize>,
}

/// An opaque checkpoint; rewinding to it undoes every binding and variable
/// allocation made after it was taken.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Mark {
    slots: usize,
    trail: usize,
}

/// A term detached from the store: fully resolved, with the variables left
/// unbound renumbered `0..n_vars`. Safe to keep across a rewind.
#[derive(Debug)]
pub(crate) struct Snapshot {
    pub term: Rc<Term>,
    pub n_vars: usize,
}

impl Bindings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate `n` fresh unbound variables, returning the first slot index.
    pub fn alloc(&mut self, n: usize) -> usize {
        let base = self.slots.len();
        self.slots.resize(base + n, None);
        base
    }

    pub fn lookup(&self, idx: usize) -> Option<&Rc<Term>> {
        self.slots[idx].as_ref()
    }

    pub fn bind(&mut self, idx: usize, t: Rc<Term>) {
        debug_assert!(self.slots[idx].is_none());
        self.slots[idx] = Some(t);
        self.trail.push(idx);
    }

    /// Follow the binding chain of `t` until an unbound variable or a
    /// non-variable term.
    pub fn resolve<'t>(&'t self, mut t: &'t Rc<Term>) -> &'t Rc<Term> {
        while let Term::Var(idx) = &**t {
            match &self.slots[*idx] {
                Some(next) => t = next,
                None => break,
            }
        }
        t
    }

    #[cfg(test)]
    pub fn trail_len(&self) -> usize {
        self.trail.len()
    }

    pub fn mark(&self) -> Mark {
        Mark {
            slots: self.slots.len(),
            trail: self.trail.len(),
        }
    }

    pub fn rewind(&mut self, mark: Mark) {
        while self.trail.len() > mark.trail {
            if let Some(idx) = self.trail.pop() {
                if idx < mark.slots {
                    self.slots[idx] = None;
                }
            }
        }
        self.slots.truncate(mark.slots);
    }

    /// Does the value of `t` contain the variable `idx`?
    pub fn occurs(&self, idx: usize, t: &Rc<Term>) -> bool {
        match &**self.resolve(t) {
            Term::Var(j) => *j == idx,
            Term::Compound(c) => c.args.iter().any(|a| self.occurs(idx, a)),
            _ => false,
        }
    }

    /// Structural identity of the dereferenced terms, without binding
    /// anything: the `==/2` relation.
    pub fn equal(&self, a: &Rc<Term>, b: &Rc<Term>) -> bool {
        let a = self.resolve(a);
        let b = self.resolve(b);
        match (&**a, &**b) {
            (Term::Var(i), Term::Var(j)) => i == j,
            (Term::Atom(x), Term::Atom(y)) => x == y,
            (Term::Integer(x), Term::Integer(y)) => x == y,
            (Term::Float(x), Term::Float(y)) => x == y,
            (Term::Str(x), Term::Str(y)) => x == y,
            (Term::Compound(c1), Term::Compound(c2)) => {
                c1.functor == c2.functor
                    && c1.args.len() == c2.args.len()
                    && c1.args.iter().zip(&c2.args).all(|(x, y)| self.equal(x, y))
            }
            _ => false,
        }
    }

    pub fn detach(&self, t: &Rc<Term>) -> Snapshot {
        let mut map = HashMap::new();
        let term = self.detach_inner(t, &mut map);
        Snapshot {
            term,
            n_vars: map.len(),
        }
    }

    fn detach_inner(&self, t: &Rc<Term>, map: &mut HashMap<usize, usize>) -> Rc<Term> {
        let t = self.resolve(t);
        match &**t {
            Term::Var(idx) => {
                let next = map.len();
                Term::new_var(*map.entry(*idx).or_insert(next))
            }
            Term::Compound(c) => Term::new_compound(
                c.functor.clone(),
                c.args
                    .iter()
                    .map(|a| self.detach_inner(a, map))
                    .collect(),
            ),
            _ => t.clone(),
        }
    }
}

/// Replace every `Var(i)` in a stored term with `Var(base + i)`. Stored
/// clauses number their variables densely from zero, so a block of fresh
/// slots starting at `base` standardizes the clause apart.
pub(crate) fn renumber(t: &Rc<Term>, base: usize) -> Rc<Term> {
    match &**t {
        Term::Var(i) => Term::new_var(base + i),
        Term::Compound(c) => Term::new_compound(
            c.functor.clone(),
            c.args.iter().map(|a| renumber(a, base)).collect(),
        ),
        _ => t.clone(),
    }
}

/// A scope over the store. Taking a sub-frame marks the trail; dropping the
/// frame rewinds to that mark, so every exit path of a choice point restores
/// the environment.
pub(crate) struct Frame<'a> {
    ctx: &'a mut Context,
    store: &'a mut Bindings,
    mark: Mark,
}

impl<'a> Frame<'a> {
    pub fn new(ctx: &'a mut Context, store: &'a mut Bindings) -> Self {
        let mark = store.mark();
        Self { ctx, store, mark }
    }

    pub fn sub_frame<F, R>(&mut self, f: F) -> R
    where
        F: FnOnce(Frame) -> R,
    {
        f(Frame::new(self.ctx, self.store))
    }

    pub fn context(&self) -> &Context {
        self.ctx
    }

    pub fn context_mut(&mut self) -> &mut Context {
        self.ctx
    }

    pub fn store(&self) -> &Bindings {
        self.store
    }

    pub fn store_mut(&mut self) -> &mut Bindings {
        self.store
    }

    /// Dereference `t` to an owned handle on its current value.
    pub fn resolve(&self, t: &Rc<Term>) -> Rc<Term> {
        self.store.resolve(t).clone()
    }

    /// Attempt to make two terms identical, binding variables as needed.
    /// Failure may leave trial bindings behind; the caller's frame (or an
    /// explicit rewind) is responsible for undoing them.
    pub fn unify(&mut self, a: &Rc<Term>, b: &Rc<Term>) -> bool {
        let a = self.resolve(a);
        let b = self.resolve(b);
        match (&*a, &*b) {
            (Term::Var(i), Term::Var(j)) if i == j => true,
            (Term::Var(i), _) => self.bind_checked(*i, &b),
            (_, Term::Var(j)) => self.bind_checked(*j, &a),
            (Term::Atom(x), Term::Atom(y)) => x == y,
            (Term::Integer(x), Term::Integer(y)) => x == y,
            (Term::Float(x), Term::Float(y)) => x == y,
            (Term::Str(x), Term::Str(y)) => x == y,
            (Term::Compound(c1), Term::Compound(c2))
                if c1.functor == c2.functor && c1.args.len() == c2.args.len() =>
            {
                c1.args.iter().zip(&c2.args).all(|(x, y)| self.unify(x, y))
            }
            _ => false,
        }
    }

    fn bind_checked(&mut self, idx: usize, t: &Rc<Term>) -> bool {
        if self.ctx.flags.occurs_check && self.store.occurs(idx, t) {
            return false;
        }
        self.store.bind(idx, t.clone());
        true
    }

    /// Standardize a clause apart: fresh slots for its variables, head and
    /// body sharing them.
    pub fn instantiate_clause(&mut self, clause: &Clause) -> (Rc<Term>, Option<Rc<Term>>) {
        let base = self.store.alloc(clause.n_vars);
        (
            renumber(&clause.head, base),
            clause.body.as_ref().map(|b| renumber(b, base)),
        )
    }

    /// Bring a detached term back to life with fresh variables.
    pub fn instantiate_snapshot(&mut self, s: &Snapshot) -> Rc<Term> {
        let base = self.store.alloc(s.n_vars);
        renumber(&s.term, base)
    }
}

impl Drop for Frame<'_> {
    fn drop(&mut self) {
        self.store.rewind(self.mark);
    }
}
