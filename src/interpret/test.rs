use std::cell::RefCell;
use std::io;
use std::rc::Rc;

use crate::error::{EvalError, PrologError};
use crate::flags::{Flags, UnknownFlag};
use crate::read_term::term::Term;
use crate::{Engine, Flow};

use super::frame::{Bindings, Frame};
use super::Context;

fn solutions(engine: &mut Engine, goal: &str) -> Vec<Vec<(String, String)>> {
    engine
        .query(goal)
        .expect("query runs")
        .into_iter()
        .map(|s| {
            s.iter()
                .map(|(n, v)| (n.to_string(), v.to_string()))
                .collect()
        })
        .collect()
}

fn first_binding(engine: &mut Engine, goal: &str, var: &str) -> Option<String> {
    let all = engine.query(goal).expect("query runs");
    all.first().and_then(|s| s.get(var).map(str::to_string))
}

#[test]
fn rewind_restores_every_binding() {
    let mut store = Bindings::new();
    let base = store.alloc(3);
    let mark = store.mark();

    store.bind(base, Term::new_atom("a"));
    store.bind(base + 1, Term::new_var(base + 2));
    assert!(store.lookup(base).is_some());

    store.rewind(mark);
    assert!(store.lookup(base).is_none());
    assert!(store.lookup(base + 1).is_none());
    assert!(store.lookup(base + 2).is_none());
}

#[test]
fn dereference_follows_chains_and_is_stable() {
    let mut store = Bindings::new();
    let base = store.alloc(3);
    store.bind(base, Term::new_var(base + 1));
    store.bind(base + 1, Term::new_var(base + 2));
    store.bind(base + 2, Term::new_atom("end"));

    let v = Term::new_var(base);
    let once = store.resolve(&v).clone();
    assert_eq!(once, Term::new_atom("end"));
    let twice = store.resolve(&once).clone();
    assert_eq!(once, twice);
}

#[test]
fn unify_binds_and_frame_drop_unwinds() {
    let mut ctx = Context::new(Flags::default());
    let mut store = Bindings::new();
    let base = store.alloc(2);

    {
        let mut frame = Frame::new(&mut ctx, &mut store);
        let pattern = Term::new_compound("f", vec![Term::new_var(base), Term::new_atom("b")]);
        let value = Term::new_compound("f", vec![Term::new_atom("a"), Term::new_var(base + 1)]);
        assert!(frame.unify(&pattern, &value));
        assert_eq!(frame.resolve(&Term::new_var(base)), Term::new_atom("a"));
        assert_eq!(frame.resolve(&Term::new_var(base + 1)), Term::new_atom("b"));
    }
    assert!(store.lookup(base).is_none());
    assert!(store.lookup(base + 1).is_none());
}

#[test]
fn occurs_check_rejects_self_embedding() {
    let mut ctx = Context::new(Flags::default());
    let mut store = Bindings::new();
    let base = store.alloc(1);
    let mut frame = Frame::new(&mut ctx, &mut store);
    let v = Term::new_var(base);
    let f = Term::new_compound("f", vec![Term::new_var(base)]);
    assert!(!frame.unify(&v, &f));
}

#[test]
fn integers_and_floats_do_not_unify() {
    let mut engine = Engine::new();
    assert!(solutions(&mut engine, "1 = 1.").len() == 1);
    assert!(solutions(&mut engine, "1 = 1.0.").is_empty());
    assert!(solutions(&mut engine, "1 = \"1\".").is_empty());
}

#[test]
fn structural_equality_does_not_bind() {
    let mut engine = Engine::new();
    assert!(solutions(&mut engine, "f(X) == f(X).").len() == 1);
    assert!(solutions(&mut engine, "f(X) == f(Y).").is_empty());
    assert!(solutions(&mut engine, "f(X) \\== f(Y).").len() == 1);
    // == must not have bound anything
    assert_eq!(
        first_binding(&mut engine, "X \\== a, X = b.", "X"),
        Some("b".to_string())
    );
}

#[test]
fn not_unifiable_leaves_no_trace() {
    let mut engine = Engine::new();
    assert_eq!(
        first_binding(&mut engine, "\\=(X, a) ; X = b.", "X"),
        Some("b".to_string())
    );
    assert!(solutions(&mut engine, "a \\= a.").is_empty());
    assert!(solutions(&mut engine, "a \\= b.").len() == 1);
}

#[test]
fn arithmetic_keeps_integer_and_float_apart() {
    let mut engine = Engine::new();
    assert_eq!(
        first_binding(&mut engine, "X is 2 + 3 * 4.", "X"),
        Some("14".to_string())
    );
    assert_eq!(
        first_binding(&mut engine, "X is 1 + 2.5.", "X"),
        Some("3.5".to_string())
    );
    assert_eq!(
        first_binding(&mut engine, "X is 15 / 3.", "X"),
        Some("5".to_string())
    );
    assert_eq!(
        first_binding(&mut engine, "X is 7 / 2.", "X"),
        Some("3.5".to_string())
    );
    assert_eq!(
        first_binding(&mut engine, "X is -7 // 2.", "X"),
        Some("-4".to_string())
    );
    assert_eq!(
        first_binding(&mut engine, "X is -7 mod 2.", "X"),
        Some("1".to_string())
    );
    assert_eq!(
        first_binding(&mut engine, "X is 7 mod -2.", "X"),
        Some("-1".to_string())
    );
    assert_eq!(
        first_binding(&mut engine, "X is 2 ** 10.", "X"),
        Some("1024".to_string())
    );
    assert_eq!(
        first_binding(&mut engine, "X is abs(-5).", "X"),
        Some("5".to_string())
    );
    assert_eq!(
        first_binding(&mut engine, "X is max(2, 3.0).", "X"),
        Some("3.0".to_string())
    );
    assert_eq!(
        first_binding(&mut engine, "X is min(2, 3).", "X"),
        Some("2".to_string())
    );
}

#[test]
fn arithmetic_faults_carry_their_kind() {
    let mut engine = Engine::new();
    assert!(matches!(
        engine.query("X is 1 / 0."),
        Err(PrologError::Evaluation(EvalError::DivisionByZero))
    ));
    assert!(matches!(
        engine.query("X is 5 mod 0."),
        Err(PrologError::Evaluation(EvalError::DivisionByZero))
    ));
    assert!(matches!(
        engine.query("X is Y + 1."),
        Err(PrologError::Instantiation { .. })
    ));
    assert!(matches!(
        engine.query("X is foo + 1."),
        Err(PrologError::Type { expected: "evaluable", .. })
    ));
    assert!(matches!(
        engine.query("X is 9223372036854775807 + 1."),
        Err(PrologError::Evaluation(EvalError::IntOverflow))
    ));
}

#[test]
fn numeric_comparisons_promote() {
    let mut engine = Engine::new();
    assert_eq!(solutions(&mut engine, "1 =:= 1.0.").len(), 1);
    assert_eq!(solutions(&mut engine, "1 =\\= 2.").len(), 1);
    assert_eq!(solutions(&mut engine, "2 < 3.").len(), 1);
    assert_eq!(solutions(&mut engine, "3 =< 3.").len(), 1);
    assert_eq!(solutions(&mut engine, "2 > 3.").is_empty(), true);
    assert_eq!(solutions(&mut engine, "3 >= 4.").is_empty(), true);
}

#[test]
fn type_tests_inspect_the_dereferenced_term() {
    let mut engine = Engine::new();
    assert_eq!(solutions(&mut engine, "var(X).").len(), 1);
    assert_eq!(solutions(&mut engine, "X = a, var(X).").len(), 0);
    assert_eq!(solutions(&mut engine, "X = a, atom(X).").len(), 1);
    assert_eq!(solutions(&mut engine, "number(3.5).").len(), 1);
    assert_eq!(solutions(&mut engine, "integer(3).").len(), 1);
    assert_eq!(solutions(&mut engine, "integer(3.5).").len(), 0);
    assert_eq!(solutions(&mut engine, "float(3.5).").len(), 1);
    assert_eq!(solutions(&mut engine, "compound(f(a)).").len(), 1);
    assert_eq!(solutions(&mut engine, "compound(a).").len(), 0);
    assert_eq!(solutions(&mut engine, "atomic(\"s\").").len(), 1);
    assert_eq!(solutions(&mut engine, "nonvar(f(X)).").len(), 1);
}

#[test]
fn functor_decomposes_and_constructs() {
    let mut engine = Engine::new();
    let s = solutions(&mut engine, "functor(foo(a, b), N, A).");
    assert_eq!(s.len(), 1);
    assert_eq!(s[0][0], ("N".to_string(), "foo".to_string()));
    assert_eq!(s[0][1], ("A".to_string(), "2".to_string()));

    assert_eq!(
        first_binding(&mut engine, "functor(T, foo, 2), functor(T, N, A).", "T"),
        Some("foo(_G3,_G4)".to_string())
    );
    assert_eq!(solutions(&mut engine, "functor(atom, atom, 0).").len(), 1);
    assert_eq!(solutions(&mut engine, "functor(7, 7, 0).").len(), 1);

    assert!(matches!(
        engine.query("functor(T, N, 2)."),
        Err(PrologError::Instantiation { .. })
    ));
    assert!(matches!(
        engine.query("functor(T, foo, -1)."),
        Err(PrologError::Domain { .. })
    ));
}

#[test]
fn arg_indexes_from_one() {
    let mut engine = Engine::new();
    assert_eq!(
        first_binding(&mut engine, "arg(2, foo(a, b, c), X).", "X"),
        Some("b".to_string())
    );
    assert!(solutions(&mut engine, "arg(4, foo(a, b, c), X).").is_empty());
    assert!(matches!(
        engine.query("arg(0, foo(a), X)."),
        Err(PrologError::Domain { .. })
    ));
    assert!(matches!(
        engine.query("arg(N, foo(a), X)."),
        Err(PrologError::Instantiation { .. })
    ));
}

#[test]
fn univ_works_both_ways() {
    let mut engine = Engine::new();
    assert_eq!(
        first_binding(&mut engine, "foo(a, b) =.. L.", "L"),
        Some("[foo,a,b]".to_string())
    );
    assert_eq!(
        first_binding(&mut engine, "T =.. [foo, a, b].", "T"),
        Some("foo(a,b)".to_string())
    );
    assert_eq!(
        first_binding(&mut engine, "T =.. [baz].", "T"),
        Some("baz".to_string())
    );
    assert_eq!(
        first_binding(&mut engine, "7 =.. L.", "L"),
        Some("[7]".to_string())
    );
    assert!(matches!(
        engine.query("T =.. L."),
        Err(PrologError::Instantiation { .. })
    ));
    assert!(matches!(
        engine.query("T =.. [f(x), a]."),
        Err(PrologError::Type { .. })
    ));
}

#[test]
fn unknown_predicate_policy_is_configurable() {
    let mut engine = Engine::new();
    assert!(solutions(&mut engine, "no_such_predicate(1).").is_empty());

    engine.flags_mut().unknown = UnknownFlag::Error;
    assert!(matches!(
        engine.query("no_such_predicate(1)."),
        Err(PrologError::Existence { .. })
    ));
}

#[test]
fn length_counts_and_generates() {
    let mut engine = Engine::new();
    assert_eq!(
        first_binding(&mut engine, "length([a, b, c], N).", "N"),
        Some("3".to_string())
    );
    assert_eq!(
        first_binding(&mut engine, "length(L, 2).", "L"),
        Some("[_G1,_G2]".to_string())
    );
    assert!(solutions(&mut engine, "length([a], 2).").is_empty());
}

#[derive(Clone, Default)]
struct SharedBuf(Rc<RefCell<Vec<u8>>>);

impl SharedBuf {
    fn text(&self) -> String {
        String::from_utf8(self.0.borrow().clone()).expect("utf-8 output")
    }
}

impl io::Write for SharedBuf {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[test]
fn write_prints_the_dereferenced_term() {
    let mut engine = Engine::new();
    let buf = SharedBuf::default();
    engine.set_output(Box::new(buf.clone()));

    engine
        .query("X = f(Y, [1, 2]), write(X), nl, tab(2), write(1 + 2 * 3), nl.")
        .expect("query runs");
    assert_eq!(buf.text(), "f(_G1,[1,2])\n  1+2*3\n");
}

#[test]
fn put_char_and_get_char_round_the_streams() {
    let mut engine = Engine::new();
    let buf = SharedBuf::default();
    engine.set_output(Box::new(buf.clone()));
    engine.set_input(Box::new(io::Cursor::new(b"hi".to_vec())));

    let s = solutions(&mut engine, "get_char(A), get_char(B), get_char(C), put_char(x).");
    assert_eq!(s.len(), 1);
    assert_eq!(s[0][0].1, "h");
    assert_eq!(s[0][1].1, "i");
    assert_eq!(s[0][2].1, "end_of_file");
    assert_eq!(buf.text(), "x");
}

#[test]
fn stream_can_be_abandoned_between_solutions() {
    let mut engine = Engine::new();
    engine
        .load("count(z). count(s(N)) :- count(N).")
        .expect("loads");

    // the program has infinitely many solutions; take three and walk away
    let mut seen = Vec::new();
    engine
        .query_with("count(X).", |s| {
            seen.push(s.get("X").map(str::to_string));
            if seen.len() == 3 {
                Flow::Stop
            } else {
                Flow::Continue
            }
        })
        .expect("query runs");
    assert_eq!(
        seen,
        vec![
            Some("z".to_string()),
            Some("s(z)".to_string()),
            Some("s(s(z))".to_string()),
        ]
    );

    // the engine is reusable afterwards
    assert_eq!(solutions(&mut engine, "count(z).").len(), 1);
}

#[test]
fn call_is_opaque_to_cut() {
    let mut engine = Engine::new();
    engine
        .load("p(1). p(2). q(X) :- call((p(X), !)).")
        .expect("loads");
    let s = solutions(&mut engine, "q(X).");
    assert_eq!(s.len(), 1);
    assert_eq!(s[0][0].1, "1");
    // the cut inside call/1 does not cut the caller's alternatives
    let t = solutions(&mut engine, "p(X), call(!).");
    assert_eq!(t.len(), 2);
}
