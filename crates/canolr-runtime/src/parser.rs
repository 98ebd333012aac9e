//! The shift/reduce parse driver.

use crate::definition::{ParseAction, ParseTable};
use std::fmt;

/// An entry of the symbol stack.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Symbol<TTerm, TNonterm> {
    T(TTerm),
    N(TNonterm),
}

/// A snapshot of the parser configuration, taken just before `action` was
/// performed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step<S, T, N, R>
where
    S: fmt::Debug,
    T: fmt::Debug,
    N: fmt::Debug,
{
    pub states: Vec<S>,
    pub symbols: Vec<Symbol<T, N>>,
    pub remaining: Vec<T>,
    pub action: ParseAction<S, N, R>,
    /// Set on the last step of a parse only.
    pub outcome: Option<Outcome<S, T, N>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome<S, T, N>
where
    S: fmt::Debug,
    T: fmt::Debug,
    N: fmt::Debug,
{
    Accepted,
    Rejected(ParseError<S, T, N>),
}

impl<S, T, N> Outcome<S, T, N>
where
    S: fmt::Debug,
    T: fmt::Debug,
    N: fmt::Debug,
{
    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted)
    }
}

/// The reason why a parse has stopped without accepting the input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError<S, T, N>
where
    S: fmt::Debug,
    T: fmt::Debug,
    N: fmt::Debug,
{
    #[error("unexpected token {lookahead:?} at {position} in state {state:?} (expected {expected:?})")]
    UnexpectedToken {
        state: S,
        lookahead: T,
        position: usize,
        expected: Vec<T>,
    },

    #[error("no goto entry for {nonterminal:?} in state {state:?}")]
    MissingGoto { state: S, nonterminal: N },

    #[error("cannot pop {len} symbols in state {state:?} from a stack of {depth}")]
    StackUnderflow { state: S, len: usize, depth: usize },

    #[error("input accepted at {position} but {remaining} token(s) follow")]
    TrailingInput { position: usize, remaining: usize },
}

/// The ordered record of every step taken by a parse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseTrace<S, T, N, R>
where
    S: fmt::Debug,
    T: fmt::Debug,
    N: fmt::Debug,
{
    steps: Vec<Step<S, T, N, R>>,
}

impl<S, T, N, R> ParseTrace<S, T, N, R>
where
    S: fmt::Debug,
    T: fmt::Debug,
    N: fmt::Debug,
{
    pub fn steps(&self) -> &[Step<S, T, N, R>] {
        &self.steps
    }

    pub fn into_steps(self) -> Vec<Step<S, T, N, R>> {
        self.steps
    }

    /// The outcome recorded on the final step.
    pub fn outcome(&self) -> Option<&Outcome<S, T, N>> {
        self.steps.last().and_then(|step| step.outcome.as_ref())
    }

    pub fn is_accepted(&self) -> bool {
        self.outcome().map_or(false, Outcome::is_accepted)
    }

    pub fn error(&self) -> Option<&ParseError<S, T, N>> {
        match self.outcome()? {
            Outcome::Rejected(err) => Some(err),
            Outcome::Accepted => None,
        }
    }
}

pub type StepOf<TDef> = Step<
    <TDef as ParseTable>::State,
    <TDef as ParseTable>::Terminal,
    <TDef as ParseTable>::Nonterminal,
    <TDef as ParseTable>::Reduce,
>;

pub type TraceOf<TDef> = ParseTrace<
    <TDef as ParseTable>::State,
    <TDef as ParseTable>::Terminal,
    <TDef as ParseTable>::Nonterminal,
    <TDef as ParseTable>::Reduce,
>;

type OutcomeOf<TDef> = Outcome<
    <TDef as ParseTable>::State,
    <TDef as ParseTable>::Terminal,
    <TDef as ParseTable>::Nonterminal,
>;

type ErrorOf<TDef> = ParseError<
    <TDef as ParseTable>::State,
    <TDef as ParseTable>::Terminal,
    <TDef as ParseTable>::Nonterminal,
>;

/// The parser driven based on a parse table, over a finite token sequence.
///
/// Each call of [`Parser::step`] performs exactly one action and reports it.
/// The parser stops after the step that accepts or rejects the input.
#[derive(Debug)]
pub struct Parser<TDef>
where
    TDef: ParseTable,
{
    definition: TDef,
    state_stack: Vec<TDef::State>,
    symbol_stack: Vec<Symbol<TDef::Terminal, TDef::Nonterminal>>,
    input: Vec<TDef::Terminal>,
    cursor: usize,
    outcome: Option<OutcomeOf<TDef>>,
}

impl<TDef> Parser<TDef>
where
    TDef: ParseTable,
{
    /// Create a parser over `tokens`. The end-of-input marker is appended
    /// unless `tokens` already ends with it.
    pub fn new<I>(definition: TDef, tokens: I) -> Self
    where
        I: IntoIterator<Item = TDef::Terminal>,
    {
        let end_of_input = definition.end_of_input();
        let mut input: Vec<_> = tokens.into_iter().collect();
        if input.last() != Some(&end_of_input) {
            input.push(end_of_input);
        }

        let initial_state = definition.initial_state();
        Self {
            definition,
            state_stack: vec![initial_state],
            symbol_stack: vec![],
            input,
            cursor: 0,
            outcome: None,
        }
    }

    pub fn state_stack(&self) -> &[TDef::State] {
        &self.state_stack
    }

    pub fn symbol_stack(&self) -> &[Symbol<TDef::Terminal, TDef::Nonterminal>] {
        &self.symbol_stack
    }

    /// The unread input, lookahead first.
    pub fn remaining(&self) -> &[TDef::Terminal] {
        self.input.get(self.cursor..).unwrap_or(&[])
    }

    pub fn outcome(&self) -> Option<&OutcomeOf<TDef>> {
        self.outcome.as_ref()
    }

    pub fn is_finished(&self) -> bool {
        self.outcome.is_some()
    }

    /// Perform a single action. Returns `None` once the parse has finished.
    pub fn step(&mut self) -> Option<StepOf<TDef>> {
        if self.outcome.is_some() {
            return None;
        }
        debug_assert_eq!(self.state_stack.len(), self.symbol_stack.len() + 1);

        // The initial state is never popped.
        let current = *self.state_stack.last()?;
        let lookahead = self
            .input
            .get(self.cursor)
            .copied()
            .unwrap_or_else(|| self.definition.end_of_input());

        let states = self.state_stack.clone();
        let symbols = self.symbol_stack.clone();
        let remaining = self.remaining().to_vec();

        let action = self.definition.action(current, lookahead);
        let outcome = match action {
            ParseAction::Shift(next) => {
                self.symbol_stack.push(Symbol::T(lookahead));
                self.state_stack.push(next);
                self.cursor += 1;
                None
            }

            ParseAction::Reduce { left, len, .. } => self
                .reduce(current, left, len)
                .err()
                .map(Outcome::Rejected),

            ParseAction::Accept => {
                let rest = self.input.len().saturating_sub(self.cursor + 1);
                if rest > 0 {
                    Some(Outcome::Rejected(ParseError::TrailingInput {
                        position: self.cursor,
                        remaining: rest,
                    }))
                } else {
                    Some(Outcome::Accepted)
                }
            }

            ParseAction::Error => Some(Outcome::Rejected(ParseError::UnexpectedToken {
                state: current,
                lookahead,
                position: self.cursor,
                expected: self.definition.expected_terminals(current),
            })),
        };

        self.outcome = outcome.clone();
        Some(Step {
            states,
            symbols,
            remaining,
            action,
            outcome,
        })
    }

    fn reduce(
        &mut self,
        current: TDef::State,
        left: TDef::Nonterminal,
        len: usize,
    ) -> Result<(), ErrorOf<TDef>> {
        let depth = self.symbol_stack.len();
        if len > depth {
            return Err(ParseError::StackUnderflow {
                state: current,
                len,
                depth,
            });
        }

        let top = self.state_stack[self.state_stack.len() - len - 1];
        let next = self
            .definition
            .goto(top, left)
            .ok_or(ParseError::MissingGoto {
                state: top,
                nonterminal: left,
            })?;

        self.state_stack.truncate(self.state_stack.len() - len);
        self.symbol_stack.truncate(depth - len);
        self.symbol_stack.push(Symbol::N(left));
        self.state_stack.push(next);
        Ok(())
    }

    /// Drive the parser to the end and collect the trace.
    pub fn run(self) -> TraceOf<TDef> {
        ParseTrace {
            steps: self.collect(),
        }
    }
}

impl<TDef> Iterator for Parser<TDef>
where
    TDef: ParseTable,
{
    type Item = StepOf<TDef>;

    fn next(&mut self) -> Option<Self::Item> {
        self.step()
    }
}
