//! The canonical collection of LR(1) item sets.

use crate::{
    grammar::{Grammar, SymbolID},
    item::{Expander, ItemSet},
    types::{Map, Queue, Set},
};
use std::fmt;

#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StateID(u32);

impl StateID {
    /// The state built from `closure({[S' -> . S, $]})`.
    pub const INITIAL: Self = Self(0);

    #[inline]
    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    #[inline]
    pub const fn into_raw(self) -> u32 {
        self.0
    }

    fn from_index(index: usize) -> Self {
        Self(u32::try_from(index).expect("too many LR(1) states"))
    }

    fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for StateID {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "S#{:03}", self.0)
    }
}

#[derive(Debug)]
pub struct State {
    items: ItemSet,
    transitions: Map<SymbolID, StateID>,
}

impl State {
    pub fn items(&self) -> &ItemSet {
        &self.items
    }

    /// Outgoing edges, in the order the successors were computed.
    pub fn transitions(&self) -> impl Iterator<Item = (SymbolID, StateID)> + '_ {
        self.transitions.iter().map(|(symbol, next)| (*symbol, *next))
    }
}

/// The deterministic LR(1) automaton. State IDs are assigned in
/// breadth-first discovery order.
#[derive(Debug)]
pub struct CanonicalCollection {
    states: Vec<State>,
}

impl CanonicalCollection {
    pub fn generate(g: &Grammar) -> Self {
        Self::build(&Expander::new(g))
    }

    #[tracing::instrument(skip_all)]
    pub fn build(expander: &Expander<'_>) -> Self {
        // The index in `item_sets` is the state ID.
        let mut item_sets = Set::<ItemSet>::default();
        let mut transitions = Vec::<Map<SymbolID, StateID>>::new();

        item_sets.insert(expander.initial());
        transitions.push(Map::default());
        let mut pending: Queue<StateID> = Some(StateID::INITIAL).into_iter().collect();

        while let Some(current) = pending.pop() {
            let items = &item_sets[current.index()];
            let successors: Vec<(SymbolID, ItemSet)> = expander
                .next_symbols(items)
                .into_iter()
                .map(|symbol| (symbol, expander.goto(items, symbol)))
                .filter(|(_, next)| !next.is_empty())
                .collect();

            for (symbol, next_items) in successors {
                let (index, inserted) = item_sets.insert_full(next_items);
                let next = StateID::from_index(index);
                if inserted {
                    tracing::trace!("new state {:?} via {:?} from {:?}", next, symbol, current);
                    transitions.push(Map::default());
                    pending.push(next);
                }
                transitions[current.index()].insert(symbol, next);
            }
        }

        let states: Vec<State> = item_sets
            .into_iter()
            .zip(transitions)
            .map(|(items, transitions)| State { items, transitions })
            .collect();
        tracing::debug!("built {} LR(1) states", states.len());

        Self { states }
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub fn states(&self) -> impl Iterator<Item = (StateID, &State)> + '_ {
        self.states
            .iter()
            .enumerate()
            .map(|(i, state)| (StateID::from_index(i), state))
    }

    pub fn state(&self, id: StateID) -> &State {
        &self.states[id.index()]
    }

    pub fn transition(&self, id: StateID, symbol: SymbolID) -> Option<StateID> {
        self.states
            .get(id.index())
            .and_then(|state| state.transitions.get(&symbol).copied())
    }

    /// Outgoing edges of `id`. Empty for an unknown state.
    pub fn transitions(&self, id: StateID) -> impl Iterator<Item = (SymbolID, StateID)> + '_ {
        self.states.get(id.index()).into_iter().flat_map(State::transitions)
    }
}
