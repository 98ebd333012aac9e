//! Binding between the generated tables and the runtime parser.

use crate::{
    collection::StateID,
    grammar::{Grammar, NonterminalID, ProductionID, TerminalID},
    table::{Action, ParseTables},
};
use canolr_runtime::{
    definition::{ParseAction, ParseTable},
    parser::{ParseTrace, Parser},
};

/// The parse table definition backed by [`ParseTables`].
#[derive(Debug, Copy, Clone)]
pub struct Definition<'t> {
    grammar: &'t Grammar,
    tables: &'t ParseTables,
}

impl<'t> Definition<'t> {
    pub fn new(grammar: &'t Grammar, tables: &'t ParseTables) -> Self {
        Self { grammar, tables }
    }
}

impl ParseTable for Definition<'_> {
    type State = StateID;
    type Terminal = TerminalID;
    type Nonterminal = NonterminalID;
    type Reduce = ProductionID;

    fn initial_state(&self) -> StateID {
        StateID::INITIAL
    }

    fn end_of_input(&self) -> TerminalID {
        TerminalID::EOI
    }

    fn action(
        &self,
        current: StateID,
        lookahead: TerminalID,
    ) -> ParseAction<StateID, NonterminalID, ProductionID> {
        match self.tables.actions.get(current, lookahead) {
            Action::Shift(next) => ParseAction::Shift(next),
            Action::Reduce(production) => {
                let p = self.grammar.production(production);
                ParseAction::Reduce {
                    production,
                    left: p.left(),
                    len: p.right().len(),
                }
            }
            Action::Accept => ParseAction::Accept,
            Action::Error => ParseAction::Error,
        }
    }

    fn goto(&self, current: StateID, symbol: NonterminalID) -> Option<StateID> {
        self.tables.gotos.get(current, symbol)
    }

    fn expected_terminals(&self, current: StateID) -> Vec<TerminalID> {
        self.tables.actions.expected(current)
    }
}

pub type Trace = ParseTrace<StateID, TerminalID, NonterminalID, ProductionID>;

/// Run `tokens` against the tables and return the full step trace.
///
/// The end-of-input marker is appended when `tokens` does not end with it.
pub fn parse<I>(tables: &ParseTables, grammar: &Grammar, tokens: I) -> Trace
where
    I: IntoIterator<Item = TerminalID>,
{
    let trace = Parser::new(Definition::new(grammar, tables), tokens).run();
    tracing::debug!(
        steps = trace.steps().len(),
        accepted = trace.is_accepted(),
        "parse finished"
    );
    trace
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{grammar::SymbolID::*, table::build_tables};
    use canolr_runtime::parser::{Outcome, ParseError, Symbol};

    // S -> ( S ) S | ε
    fn balanced() -> Grammar {
        Grammar::define(|g| {
            let lparen = g.terminal("(")?;
            let rparen = g.terminal(")")?;
            let s = g.nonterminal("S")?;
            g.rule(s, [T(lparen), N(s), T(rparen), N(s)])?;
            g.rule(s, [])?;
            Ok(())
        })
        .unwrap()
    }

    fn tokens(g: &Grammar, input: &str) -> Vec<TerminalID> {
        input
            .chars()
            .map(|c| g.terminal_by_name(&c.to_string()).unwrap())
            .collect()
    }

    #[test]
    fn empty_input_reduces_epsilon() {
        let g = balanced();
        let tables = build_tables(&g);
        assert!(!tables.conflicts.has_conflicts());

        let trace = parse(&tables, &g, []);
        assert!(trace.is_accepted());
        assert_eq!(trace.steps().len(), 2);
        assert_eq!(
            trace.steps()[0].action,
            ParseAction::Reduce {
                production: ProductionID::from_raw(2),
                left: g.start_symbol(),
                len: 0,
            }
        );
        assert_eq!(trace.steps()[1].symbols, [Symbol::N(g.start_symbol())]);
    }

    #[test]
    fn nested_parens() {
        let g = balanced();
        let tables = build_tables(&g);
        for input in ["()", "(())", "()()", "(()())()"] {
            let trace = parse(&tables, &g, tokens(&g, input));
            assert!(trace.is_accepted(), "{}", input);
            for step in trace.steps() {
                assert_eq!(step.states.len(), step.symbols.len() + 1);
            }
        }
    }

    #[test]
    fn unbalanced_parens_are_rejected() {
        let g = balanced();
        let tables = build_tables(&g);
        let rparen = g.terminal_by_name(")").unwrap();

        let trace = parse(&tables, &g, tokens(&g, "(()"));
        assert!(matches!(
            trace.error(),
            Some(ParseError::UnexpectedToken { lookahead, position: 3, .. }) if *lookahead == TerminalID::EOI
        ));

        let trace = parse(&tables, &g, tokens(&g, ")"));
        match trace.outcome() {
            Some(Outcome::Rejected(ParseError::UnexpectedToken {
                state,
                lookahead,
                position,
                expected,
            })) => {
                assert_eq!(*state, StateID::INITIAL);
                assert_eq!(*lookahead, rparen);
                assert_eq!(*position, 0);
                assert!(!expected.contains(&rparen));
            }
            outcome => panic!("unexpected outcome: {:?}", outcome),
        }
    }
}
