use canolr::{
    build_tables,
    collection::StateID,
    grammar::{Grammar, TerminalID},
    parse::{parse, Definition, Trace},
    table::{Action, ConflictKind},
};
use canolr_runtime::{
    definition::ParseAction,
    parser::{Outcome, ParseError, Parser, Symbol},
};
use canolr_tests::grammars;
use tracing_subscriber::filter::LevelFilter;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_ansi(false)
        .with_max_level(LevelFilter::TRACE)
        .with_test_writer()
        .try_init();
}

fn tokens(g: &Grammar, input: &str) -> Vec<TerminalID> {
    input
        .split_whitespace()
        .map(|name| g.terminal_by_name(name).unwrap())
        .collect()
}

fn actions(g: &Grammar, trace: &Trace) -> Vec<String> {
    trace
        .steps()
        .iter()
        .map(|step| match step.action {
            ParseAction::Shift(..) => "shift".to_owned(),
            ParseAction::Reduce { production, .. } => {
                format!("reduce {}", g.production(production).display(g))
            }
            ParseAction::Accept => "accept".to_owned(),
            ParseAction::Error => "error".to_owned(),
        })
        .collect()
}

#[test]
fn accepts_assignment() {
    init_tracing();
    let g = Grammar::define(grammars::assignment).unwrap();
    let tables = build_tables(&g);

    let trace = parse(&tables, &g, tokens(&g, "id = * id"));
    assert!(trace.is_accepted());
    assert_eq!(
        actions(&g, &trace),
        [
            "shift",
            "reduce L -> id",
            "shift",
            "shift",
            "shift",
            "reduce L -> id",
            "reduce R -> L",
            "reduce L -> * R",
            "reduce R -> L",
            "reduce S -> L = R",
            "accept",
        ]
    );

    let last = trace.steps().last().unwrap();
    assert_eq!(last.symbols, [Symbol::N(g.start_symbol())]);
    assert_eq!(last.remaining, [TerminalID::EOI]);
    assert_eq!(last.states.len(), 2);
    assert_eq!(last.states[0], StateID::INITIAL);
}

#[test]
fn snapshots_precede_each_action() {
    let g = Grammar::define(grammars::assignment).unwrap();
    let tables = build_tables(&g);
    let ident = g.terminal_by_name("id").unwrap();
    let trace = parse(&tables, &g, tokens(&g, "id = * id"));

    let first = &trace.steps()[0];
    assert_eq!(first.states, [StateID::INITIAL]);
    assert!(first.symbols.is_empty());
    assert_eq!(first.remaining.len(), 5);
    assert_eq!(first.remaining[0], ident);
    assert_eq!(trace.steps()[1].symbols, [Symbol::T(ident)]);
}

#[test]
fn explicit_end_marker_is_not_duplicated() {
    let g = Grammar::define(grammars::assignment).unwrap();
    let tables = build_tables(&g);
    let mut input = tokens(&g, "id = * id");
    let implicit = parse(&tables, &g, input.clone());
    input.push(TerminalID::EOI);
    let explicit = parse(&tables, &g, input);
    assert_eq!(implicit, explicit);
}

#[test]
fn rejects_misplaced_star() {
    let g = Grammar::define(grammars::assignment).unwrap();
    let tables = build_tables(&g);
    let star = g.terminal_by_name("*").unwrap();

    let trace = parse(&tables, &g, tokens(&g, "id = id * id"));
    assert!(!trace.is_accepted());
    assert_eq!(trace.steps().last().unwrap().action, ParseAction::Error);
    match trace.error() {
        Some(ParseError::UnexpectedToken {
            lookahead,
            position,
            expected,
            ..
        }) => {
            assert_eq!(*lookahead, star);
            assert_eq!(*position, 3);
            assert_eq!(expected, &[TerminalID::EOI]);
        }
        err => panic!("unexpected error: {:?}", err),
    }
}

#[test]
fn rejects_trailing_tokens() {
    let g = Grammar::define(grammars::assignment).unwrap();
    let tables = build_tables(&g);
    let ident = g.terminal_by_name("id").unwrap();

    let trace = parse(&tables, &g, [ident, TerminalID::EOI, ident]);
    assert_eq!(
        trace.error(),
        Some(&ParseError::TrailingInput {
            position: 1,
            remaining: 2,
        })
    );
    assert_eq!(trace.steps().last().unwrap().action, ParseAction::Accept);
}

#[test]
fn stacks_move_in_lockstep() {
    let g = Grammar::define(grammars::arithmetic).unwrap();
    let tables = build_tables(&g);
    for input in [
        "num",
        "num + num * num",
        "( num - num ) / num",
        "( ( num ) )",
        "num + * num",
        "( num",
    ] {
        let parser = Parser::new(Definition::new(&g, &tables), tokens(&g, input));
        let mut count = 0;
        for step in parser {
            assert_eq!(step.states.len(), step.symbols.len() + 1, "{}", input);
            assert_eq!(step.states[0], StateID::INITIAL);
            count += 1;
        }
        assert!(count > 0);
    }
}

#[test]
fn arithmetic_precedence_shapes_the_reductions() {
    let g = Grammar::define(grammars::arithmetic).unwrap();
    let tables = build_tables(&g);
    let trace = parse(&tables, &g, tokens(&g, "num + num * num"));
    assert!(trace.is_accepted());

    let reductions: Vec<_> = actions(&g, &trace)
        .into_iter()
        .filter(|a| a.starts_with("reduce EXPR") || a.starts_with("reduce FACTOR -> FACTOR"))
        .collect();
    assert_eq!(
        reductions,
        [
            "reduce EXPR -> FACTOR",
            "reduce FACTOR -> FACTOR * TERM",
            "reduce EXPR -> EXPR + FACTOR",
        ]
    );
}

#[test]
fn empty_productions_pop_nothing() {
    let g = Grammar::define(grammars::call).unwrap();
    let tables = build_tables(&g);

    let trace = parse(&tables, &g, tokens(&g, "id ( )"));
    assert!(trace.is_accepted());
    let epsilon = trace
        .steps()
        .iter()
        .find(|step| matches!(step.action, ParseAction::Reduce { len: 0, .. }))
        .unwrap();
    assert_eq!(epsilon.symbols.len(), 2);

    for input in ["id ( id )", "id ( id , id , id )"] {
        assert!(parse(&tables, &g, tokens(&g, input)).is_accepted(), "{}", input);
    }
    for input in ["id ( , )", "id ( id , )", "id"] {
        assert!(!parse(&tables, &g, tokens(&g, input)).is_accepted(), "{}", input);
    }
}

#[test]
fn ambiguous_grammar_keeps_shift() {
    init_tracing();
    let g = Grammar::define(grammars::ambiguous_expr).unwrap();
    let tables = build_tables(&g);
    let plus = g.terminal_by_name("+").unwrap();

    assert!(tables.conflicts.has_conflicts());
    let conflict = tables.conflicts.iter().next().unwrap();
    assert_eq!(conflict.state, StateID::from_raw(4));
    assert_eq!(conflict.terminal, plus);
    assert_eq!(conflict.kind, ConflictKind::ShiftReduce);
    assert_eq!(tables.actions.get(conflict.state, plus), conflict.kept);
    assert!(matches!(conflict.kept, Action::Shift(..)));

    // The kept shift makes `+` right-associative.
    let trace = parse(&tables, &g, tokens(&g, "id + id + id"));
    assert!(trace.is_accepted());
    let reduces = actions(&g, &trace)
        .iter()
        .filter(|a| *a == "reduce E -> E + E")
        .count();
    assert_eq!(reduces, 2);
    let shifts_before_first_sum = actions(&g, &trace)
        .iter()
        .take_while(|a| *a != "reduce E -> E + E")
        .filter(|a| *a == "shift")
        .count();
    assert_eq!(shifts_before_first_sum, 5);
}

#[test]
fn reduce_reduce_prefers_earlier_production() {
    let g = Grammar::define(grammars::reduce_reduce).unwrap();
    let tables = build_tables(&g);
    let conflict = tables.conflicts.iter().next().unwrap();
    assert_eq!(conflict.kind, ConflictKind::ReduceReduce);
    assert_eq!(conflict.terminal, TerminalID::EOI);

    let trace = parse(&tables, &g, tokens(&g, "x"));
    assert!(trace.is_accepted());
    assert!(actions(&g, &trace).contains(&"reduce A -> x".to_owned()));
}

#[test]
fn shared_tables_across_threads() {
    let g = Grammar::define(grammars::arithmetic).unwrap();
    let tables = build_tables(&g);
    let inputs = ["num", "( num + num ) * num", "num num", "num / ( num - num )"];

    let results: Vec<bool> = std::thread::scope(|scope| {
        let handles: Vec<_> = inputs
            .iter()
            .map(|input| {
                let (g, tables) = (&g, &tables);
                scope.spawn(move || parse(tables, g, tokens(g, input)).is_accepted())
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });
    assert_eq!(results, [true, true, false, true]);
}

#[test]
fn outcome_is_on_last_step_only() {
    let g = Grammar::define(grammars::balanced).unwrap();
    let tables = build_tables(&g);
    for input in ["( ) ( ( ) )", "( ( )"] {
        let trace = parse(&tables, &g, tokens(&g, input));
        let (last, init) = trace.steps().split_last().unwrap();
        assert!(init.iter().all(|step| step.outcome.is_none()));
        assert_eq!(last.outcome.as_ref(), trace.outcome());
        assert!(matches!(
            trace.outcome(),
            Some(Outcome::Accepted | Outcome::Rejected(..))
        ));
    }
}
