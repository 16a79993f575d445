//! End-to-end behavior of the engine through its public surface.

use hornlog::{Engine, Flow, PrologError};

fn values(engine: &mut Engine, goal: &str, var: &str) -> Vec<String> {
    engine
        .query(goal)
        .expect("query runs")
        .iter()
        .map(|s| s.get(var).expect("variable is reported").to_string())
        .collect()
}

#[test]
fn grandparent_solutions_follow_clause_order() {
    let mut engine = Engine::new();
    engine
        .load(
            "parent(tom, bob). parent(tom, liz). parent(bob, ann). parent(bob, pat).
             grandparent(X, Z) :- parent(X, Y), parent(Y, Z).",
        )
        .expect("loads");

    assert_eq!(values(&mut engine, "grandparent(tom, G).", "G"), ["ann", "pat"]);
}

#[test]
fn arithmetic_respects_operator_precedence() {
    let mut engine = Engine::new();
    assert_eq!(values(&mut engine, "X is 2 + 3 * 4.", "X"), ["14"]);
    assert_eq!(values(&mut engine, "X is (2 + 3) * 4.", "X"), ["20"]);
}

#[test]
fn member_enumerates_in_order() {
    let mut engine = Engine::new();
    assert_eq!(
        values(&mut engine, "member(X, [a, b, c]).", "X"),
        ["a", "b", "c"]
    );
}

#[test]
fn append_concatenates_and_splits() {
    let mut engine = Engine::new();
    assert_eq!(
        values(&mut engine, "append([1, 2], [3, 4], L).", "L"),
        ["[1,2,3,4]"]
    );

    let splits = engine
        .query("append(A, B, [1, 2, 3]).")
        .expect("query runs");
    let pairs: Vec<(String, String)> = splits
        .iter()
        .map(|s| {
            (
                s.get("A").expect("A").to_string(),
                s.get("B").expect("B").to_string(),
            )
        })
        .collect();
    assert_eq!(
        pairs,
        [
            ("[]".to_string(), "[1,2,3]".to_string()),
            ("[1]".to_string(), "[2,3]".to_string()),
            ("[1,2]".to_string(), "[3]".to_string()),
            ("[1,2,3]".to_string(), "[]".to_string()),
        ]
    );
}

#[test]
fn cut_commits_to_the_first_clause() {
    let mut engine = Engine::new();
    engine
        .load("max(X, Y, X) :- X >= Y, !. max(_, Y, Y).")
        .expect("loads");

    assert_eq!(values(&mut engine, "max(5, 3, M).", "M"), ["5"]);
    assert_eq!(values(&mut engine, "max(2, 7, M).", "M"), ["7"]);
}

#[test]
fn cut_does_not_prune_the_caller() {
    let mut engine = Engine::new();
    engine
        .load(
            "d(1). d(2).
             once_d(X) :- d(X), !.
             pair(X, Y) :- d(X), once_d(Y).",
        )
        .expect("loads");

    // the cut inside once_d must not remove d's alternatives in pair
    let sols = engine.query("pair(X, Y).").expect("query runs");
    let pairs: Vec<(String, String)> = sols
        .iter()
        .map(|s| {
            (
                s.get("X").expect("X").to_string(),
                s.get("Y").expect("Y").to_string(),
            )
        })
        .collect();
    assert_eq!(
        pairs,
        [
            ("1".to_string(), "1".to_string()),
            ("2".to_string(), "1".to_string()),
        ]
    );
}

#[test]
fn cut_discards_earlier_choice_points_in_the_body() {
    let mut engine = Engine::new();
    engine.load("d(1). d(2). d(3).").expect("loads");
    assert_eq!(values(&mut engine, "d(X), !.", "X"), ["1"]);
}

#[test]
fn negation_as_failure() {
    let mut engine = Engine::new();
    engine
        .load("likes(mary, wine). likes(john, wine).")
        .expect("loads");

    let yes = engine.query("\\+ likes(tom, wine).").expect("query runs");
    assert_eq!(yes.len(), 1);
    assert!(yes[0].is_empty());

    let no = engine.query("\\+ likes(mary, wine).").expect("query runs");
    assert!(no.is_empty());
}

#[test]
fn findall_collects_all_instances() {
    let mut engine = Engine::new();
    engine
        .load("likes(mary, wine). likes(john, wine).")
        .expect("loads");

    assert_eq!(
        values(&mut engine, "findall(X, likes(X, wine), L).", "L"),
        ["[mary,john]"]
    );
    assert_eq!(
        values(&mut engine, "findall(X, likes(X, beer), L).", "L"),
        ["[]"]
    );
}

#[test]
fn findall_does_not_leak_bindings() {
    let mut engine = Engine::new();
    engine.load("p(1). p(2).").expect("loads");

    let sols = engine
        .query("findall(X, p(X), L), X = unbound_by_findall.")
        .expect("query runs");
    assert_eq!(sols.len(), 1);
    assert_eq!(sols[0].get("X"), Some("unbound_by_findall"));
    assert_eq!(sols[0].get("L"), Some("[1,2]"));
}

#[test]
fn if_then_else_commits_to_the_condition() {
    let mut engine = Engine::new();
    engine.load("c(1). c(2).").expect("loads");

    // only the first solution of the condition is taken
    assert_eq!(values(&mut engine, "(c(X) -> Y = hit ; Y = miss).", "Y"), ["hit"]);
    assert_eq!(values(&mut engine, "(c(X) -> Y = hit ; Y = miss).", "X"), ["1"]);
    assert_eq!(
        values(&mut engine, "(fail -> Y = hit ; Y = miss).", "Y"),
        ["miss"]
    );
    // bare if-then fails when the condition fails
    assert!(engine
        .query("(fail -> Y = hit).")
        .expect("query runs")
        .is_empty());
}

#[test]
fn disjunction_tries_both_branches_in_order() {
    let mut engine = Engine::new();
    assert_eq!(values(&mut engine, "(X = 1 ; X = 2).", "X"), ["1", "2"]);
}

#[test]
fn assert_and_retract_maintain_clause_order() {
    let mut engine = Engine::new();
    engine.load("counter(1).").expect("loads");

    engine.query("assertz(counter(2)).").expect("query runs");
    engine.query("asserta(counter(0)).").expect("query runs");
    assert_eq!(values(&mut engine, "counter(X).", "X"), ["0", "1", "2"]);

    let removed = engine.query("retract(counter(1)).").expect("query runs");
    assert_eq!(removed.len(), 1);
    assert_eq!(values(&mut engine, "counter(X).", "X"), ["0", "2"]);

    // retract removes exactly one clause per solution, next match on retry
    let rest = engine.query("retract(counter(N)).").expect("query runs");
    assert_eq!(rest.len(), 2);
    assert!(values(&mut engine, "counter(X).", "X").is_empty());
}

#[test]
fn asserted_rules_resolve_like_loaded_ones() {
    let mut engine = Engine::new();
    engine
        .query("assertz((bigger(X, Y) :- X > Y)).")
        .expect("query runs");
    assert_eq!(engine.query("bigger(3, 2).").expect("query runs").len(), 1);
    assert!(engine.query("bigger(1, 2).").expect("query runs").is_empty());
}

#[test]
fn solution_order_is_reproducible() {
    let mut engine = Engine::new();
    engine
        .load("color(red). color(green). color(blue).")
        .expect("loads");
    let first = values(&mut engine, "color(X).", "X");
    let second = values(&mut engine, "color(X).", "X");
    assert_eq!(first, ["red", "green", "blue"]);
    assert_eq!(first, second);
}

#[test]
fn load_error_keeps_previously_loaded_clauses() {
    let mut engine = Engine::new();
    engine.load("stable(1).").expect("loads");

    let err = engine.load("broken(").expect_err("must not parse");
    assert!(matches!(err, PrologError::Parse { .. }));

    assert_eq!(values(&mut engine, "stable(X).", "X"), ["1"]);
}

#[test]
fn tokenize_error_reports_the_line() {
    let mut engine = Engine::new();
    let err = engine
        .load("ok(1).\nbad(\"unterminated).")
        .expect_err("must not tokenize");
    match err {
        PrologError::Tokenize { line, .. } => assert_eq!(line, 2),
        e => panic!("unexpected error {:?}", e),
    }
}

#[test]
fn runtime_error_aborts_the_stream_but_not_the_database() {
    let mut engine = Engine::new();
    engine.load("p(1). p(x). p(3).").expect("loads");

    let err = engine
        .query("p(X), Y is X + 1.")
        .expect_err("second clause is not a number");
    assert!(matches!(err, PrologError::Type { .. }));

    // the database and engine survive
    assert_eq!(values(&mut engine, "p(X).", "X"), ["1", "x", "3"]);
}

#[test]
fn reset_clears_user_clauses() {
    let mut engine = Engine::new();
    engine.load("gone(1).").expect("loads");
    engine.reset();
    assert!(engine.query("gone(X).").expect("query runs").is_empty());
    // the list library is back after the reset
    assert_eq!(
        engine.query("member(b, [a, b]).").expect("query runs").len(),
        1
    );
}

#[test]
fn assert_one_accepts_a_single_clause() {
    let mut engine = Engine::new();
    engine.assert_one("city(osaka).").expect("asserts");
    assert_eq!(values(&mut engine, "city(X).", "X"), ["osaka"]);

    assert!(engine.assert_one("a(1). b(2).").is_err());
}

#[test]
fn query_first_takes_one_solution() {
    let mut engine = Engine::new();
    engine.load("n(1). n(2).").expect("loads");

    let first = engine.query_first("n(X).").expect("query runs");
    assert_eq!(first.expect("one solution").get("X"), Some("1"));
    assert!(engine
        .query_first("n(9).")
        .expect("query runs")
        .is_none());
}

#[test]
fn query_with_stops_on_demand() {
    let mut engine = Engine::new();
    engine.load("n(1). n(2). n(3). n(4).").expect("loads");

    let mut seen = Vec::new();
    engine
        .query_with("n(X).", |s| {
            seen.push(s.get("X").expect("X").to_string());
            if seen.len() == 2 {
                Flow::Stop
            } else {
                Flow::Continue
            }
        })
        .expect("query runs");
    assert_eq!(seen, ["1", "2"]);
}

#[test]
fn variables_shared_between_goals_stay_shared() {
    let mut engine = Engine::new();
    engine
        .load("edge(a, b). edge(b, c). path(X, Z) :- edge(X, Y), edge(Y, Z).")
        .expect("loads");
    assert_eq!(values(&mut engine, "path(a, C).", "C"), ["c"]);
}

#[test]
fn partial_bindings_print_with_list_tails() {
    let mut engine = Engine::new();
    assert_eq!(
        values(&mut engine, "L = [a, b | T].", "L"),
        ["[a,b|_G1]"]
    );
}

#[test]
fn recursion_over_lists() {
    let mut engine = Engine::new();
    engine
        .load(
            "sum([], 0).
             sum([H|T], S) :- sum(T, S0), S is S0 + H.",
        )
        .expect("loads");
    assert_eq!(values(&mut engine, "sum([1, 2, 3, 4], S).", "S"), ["10"]);
}
