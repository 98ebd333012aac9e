//! Parse table definition.

use std::{fmt, sync::Arc};

/// The trait for abstracting a generated LR(1) parse table.
pub trait ParseTable {
    /// The number to identify the state of LR(1) automaton.
    type State: Copy + Eq + fmt::Debug;

    /// The number to identify the terminal symbols.
    type Terminal: Copy + Eq + fmt::Debug;

    /// The number to identify the nonterminal symbols.
    type Nonterminal: Copy + Eq + fmt::Debug;

    /// The value that identifies the production used by a reduction.
    type Reduce: Copy + Eq + fmt::Debug;

    /// Return the initial state number.
    fn initial_state(&self) -> Self::State;

    /// Return the terminal symbol that marks the end of input.
    fn end_of_input(&self) -> Self::Terminal;

    /// Return the action corresponding to the specified state number and
    /// lookahead symbol.
    fn action(
        &self,
        current: Self::State,
        lookahead: Self::Terminal,
    ) -> ParseAction<Self::State, Self::Nonterminal, Self::Reduce>;

    /// Return the state to enter after reducing to `symbol` in `current`.
    fn goto(&self, current: Self::State, symbol: Self::Nonterminal) -> Option<Self::State>;

    /// Return the terminal symbols that have an action in `current`.
    fn expected_terminals(&self, current: Self::State) -> Vec<Self::Terminal>;
}

macro_rules! impl_parse_table_for_pointer {
    ($($ptr:ty),*) => {$(
        impl<T: ?Sized> ParseTable for $ptr
        where
            T: ParseTable,
        {
            type State = T::State;
            type Terminal = T::Terminal;
            type Nonterminal = T::Nonterminal;
            type Reduce = T::Reduce;

            fn initial_state(&self) -> Self::State {
                (**self).initial_state()
            }

            fn end_of_input(&self) -> Self::Terminal {
                (**self).end_of_input()
            }

            fn action(
                &self,
                current: Self::State,
                lookahead: Self::Terminal,
            ) -> ParseAction<Self::State, Self::Nonterminal, Self::Reduce> {
                (**self).action(current, lookahead)
            }

            fn goto(&self, current: Self::State, symbol: Self::Nonterminal) -> Option<Self::State> {
                (**self).goto(current, symbol)
            }

            fn expected_terminals(&self, current: Self::State) -> Vec<Self::Terminal> {
                (**self).expected_terminals(current)
            }
        }
    )*};
}

impl_parse_table_for_pointer!(&T, Arc<T>);

/// The action that the parser performs in a state on a lookahead symbol.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ParseAction<TState, TNonterminal, TReduce> {
    /// Push the lookahead symbol and enter the specified state.
    Shift(TState),

    /// Pop `len` symbols and replace them with `left`.
    Reduce {
        production: TReduce,
        left: TNonterminal,
        len: usize,
    },

    Accept,

    /// There is no action for the lookahead symbol.
    Error,
}
