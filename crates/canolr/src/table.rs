//! ACTION/GOTO tables projected from the canonical collection.

use crate::{
    collection::{CanonicalCollection, StateID},
    grammar::{Grammar, NonterminalID, ProductionID, SymbolID, TerminalID},
    item::Expander,
    types::Map,
};
use indexmap::map::Entry;
use std::fmt;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Action {
    Shift(StateID),
    Reduce(ProductionID),
    Accept,
    Error,
}

impl Action {
    pub fn display<'g>(&'g self, g: &'g Grammar) -> ActionDisplay<'g> {
        ActionDisplay { g, action: self }
    }
}

pub struct ActionDisplay<'g> {
    g: &'g Grammar,
    action: &'g Action,
}

impl fmt::Display for ActionDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.action {
            Action::Shift(next) => write!(f, "shift({:?})", next),
            Action::Reduce(p) => write!(f, "reduce({})", self.g.production(*p).display(self.g)),
            Action::Accept => f.write_str("accept"),
            Action::Error => f.write_str("error"),
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ConflictKind {
    ShiftReduce,
    ReduceReduce,
    AcceptReduce,
}

impl ConflictKind {
    fn between(kept: Action, rejected: Action) -> Self {
        match (kept, rejected) {
            (Action::Accept, _) | (_, Action::Accept) => Self::AcceptReduce,
            (Action::Reduce(..), Action::Reduce(..)) => Self::ReduceReduce,
            _ => Self::ShiftReduce,
        }
    }
}

impl fmt::Display for ConflictKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::ShiftReduce => "shift/reduce",
            Self::ReduceReduce => "reduce/reduce",
            Self::AcceptReduce => "accept/reduce",
        })
    }
}

/// Two incompatible actions for the same ACTION cell. `kept` is the one
/// written first and stays in the table.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind} conflict in {state:?} on {terminal:?}: kept {kept:?}, rejected {rejected:?}")]
pub struct Conflict {
    pub state: StateID,
    pub terminal: TerminalID,
    pub kind: ConflictKind,
    pub kept: Action,
    pub rejected: Action,
}

impl Conflict {
    /// Render with symbol names instead of raw IDs.
    pub fn display<'g>(&'g self, g: &'g Grammar) -> ConflictDisplay<'g> {
        ConflictDisplay { g, conflict: self }
    }
}

pub struct ConflictDisplay<'g> {
    g: &'g Grammar,
    conflict: &'g Conflict,
}

impl fmt::Display for ConflictDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Conflict {
            state,
            terminal,
            kind,
            kept,
            rejected,
        } = self.conflict;
        write!(
            f,
            "{} conflict in {:?} on `{}`: kept {}, rejected {}",
            kind,
            state,
            self.g.terminal_name(*terminal),
            kept.display(self.g),
            rejected.display(self.g),
        )
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ConflictReport {
    conflicts: Vec<Conflict>,
}

impl ConflictReport {
    pub fn has_conflicts(&self) -> bool {
        !self.conflicts.is_empty()
    }

    pub fn len(&self) -> usize {
        self.conflicts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.conflicts.is_empty()
    }

    /// Conflicts in detection order.
    pub fn iter(&self) -> impl Iterator<Item = &Conflict> + '_ {
        self.conflicts.iter()
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ActionTable {
    rows: Map<StateID, Map<TerminalID, Action>>,
}

impl ActionTable {
    /// `Action::Error` when the cell is empty.
    pub fn get(&self, state: StateID, terminal: TerminalID) -> Action {
        self.rows
            .get(&state)
            .and_then(|row| row.get(&terminal))
            .copied()
            .unwrap_or(Action::Error)
    }

    /// Filled cells, row by row.
    pub fn iter(&self) -> impl Iterator<Item = (StateID, TerminalID, Action)> + '_ {
        self.rows.iter().flat_map(|(state, row)| {
            row.iter()
                .map(move |(terminal, action)| (*state, *terminal, *action))
        })
    }

    pub fn row(&self, state: StateID) -> impl Iterator<Item = (TerminalID, Action)> + '_ {
        self.rows
            .get(&state)
            .into_iter()
            .flat_map(|row| row.iter().map(|(t, a)| (*t, *a)))
    }

    /// The terminals with a non-error action in `state`, by ascending ID.
    pub fn expected(&self, state: StateID) -> Vec<TerminalID> {
        let mut expected: Vec<_> = self.row(state).map(|(t, _)| t).collect();
        expected.sort();
        expected
    }

    /// The number of states.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct GotoTable {
    rows: Map<StateID, Map<NonterminalID, StateID>>,
}

impl GotoTable {
    pub fn get(&self, state: StateID, symbol: NonterminalID) -> Option<StateID> {
        self.rows
            .get(&state)
            .and_then(|row| row.get(&symbol))
            .copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (StateID, NonterminalID, StateID)> + '_ {
        self.rows.iter().flat_map(|(state, row)| {
            row.iter().map(move |(symbol, next)| (*state, *symbol, *next))
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseTables {
    pub actions: ActionTable,
    pub gotos: GotoTable,
    pub conflicts: ConflictReport,
}

impl ParseTables {
    /// Fill the tables from `collection`.
    ///
    /// States are visited by ascending ID and items in item-set order. When a
    /// cell is already taken by a different action, the earlier one is kept
    /// and the conflict is recorded.
    #[tracing::instrument(skip_all)]
    pub fn from_collection(g: &Grammar, collection: &CanonicalCollection) -> Self {
        let mut actions = ActionTable::default();
        let mut gotos = GotoTable::default();
        let mut conflicts = ConflictReport::default();

        for (id, state) in collection.states() {
            let action_row = actions.rows.entry(id).or_default();
            for item in state.items() {
                let (terminal, action) = match item.next_symbol(g) {
                    Some(SymbolID::T(t)) => match collection.transition(id, SymbolID::T(t)) {
                        Some(next) => (t, Action::Shift(next)),
                        None => continue,
                    },
                    Some(SymbolID::N(..)) => continue,
                    None if item.production == ProductionID::ACCEPT => {
                        (TerminalID::EOI, Action::Accept)
                    }
                    None => (item.lookahead, Action::Reduce(item.production)),
                };

                match action_row.entry(terminal) {
                    Entry::Vacant(entry) => {
                        entry.insert(action);
                    }
                    Entry::Occupied(entry) if *entry.get() == action => (),
                    Entry::Occupied(entry) => {
                        let conflict = Conflict {
                            state: id,
                            terminal,
                            kind: ConflictKind::between(*entry.get(), action),
                            kept: *entry.get(),
                            rejected: action,
                        };
                        tracing::warn!("{}", conflict.display(g));
                        conflicts.conflicts.push(conflict);
                    }
                }
            }

            let goto_row = gotos.rows.entry(id).or_default();
            for (symbol, next) in state.transitions() {
                if let SymbolID::N(n) = symbol {
                    goto_row.insert(n, next);
                }
            }
        }

        tracing::debug!(
            states = collection.len(),
            conflicts = conflicts.len(),
            "built parse tables"
        );

        Self {
            actions,
            gotos,
            conflicts,
        }
    }
}

/// Run the whole construction and keep conflicts as warnings.
pub fn build_tables(g: &Grammar) -> ParseTables {
    let collection = CanonicalCollection::build(&Expander::new(g));
    ParseTables::from_collection(g, &collection)
}

#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum TableError {
    #[error("the grammar is not LR(1): {} conflict(s)", .report.len())]
    Conflicts { report: ConflictReport },
}

#[derive(Debug, Default)]
pub struct Config {
    deny_conflicts: bool,
}

impl Config {
    pub const fn new() -> Self {
        Self {
            deny_conflicts: false,
        }
    }

    /// Fail the generation when any conflict is detected.
    pub fn deny_conflicts(&mut self) -> &mut Self {
        self.deny_conflicts = true;
        self
    }

    /// Keep the first-written action on conflicts. This is the default.
    pub fn allow_conflicts(&mut self) -> &mut Self {
        self.deny_conflicts = false;
        self
    }

    pub fn generate(&self, g: &Grammar) -> Result<ParseTables, TableError> {
        let tables = build_tables(g);
        if self.deny_conflicts && tables.conflicts.has_conflicts() {
            return Err(TableError::Conflicts {
                report: tables.conflicts,
            });
        }
        Ok(tables)
    }
}
