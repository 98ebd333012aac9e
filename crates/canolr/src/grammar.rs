//! Context-free grammars.

use crate::types::Map;
use std::fmt;

// ==== Symbols ====

#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TerminalID(u16);

impl TerminalID {
    /// Reserved terminal symbol that marks the end of input.
    pub const EOI: Self = Self(0);

    const OFFSET: u16 = 1;

    #[inline]
    pub const fn from_raw(raw: u16) -> Self {
        Self(raw)
    }

    #[inline]
    pub const fn into_raw(self) -> u16 {
        self.0
    }
}

impl fmt::Debug for TerminalID {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            &Self::EOI => write!(f, "T#End"),
            _ => write!(f, "T#{:03}", self.0),
        }
    }
}

/// A set of terminal symbols, backed by a bit set.
#[derive(Default, Clone, PartialEq, Eq)]
pub struct TerminalSet {
    inner: bit_set::BitSet,
}

impl TerminalSet {
    pub fn contains(&self, id: TerminalID) -> bool {
        self.inner.contains(id.0.into())
    }

    pub fn insert(&mut self, id: TerminalID) -> bool {
        self.inner.insert(id.0.into())
    }

    /// Add all elements of `other`, and return whether this set has grown.
    pub fn union_with(&mut self, other: &Self) -> bool {
        let before = self.inner.len();
        self.inner.union_with(&other.inner);
        self.inner.len() != before
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Iterate over the elements in ascending ID order.
    pub fn iter(&self) -> impl Iterator<Item = TerminalID> + '_ {
        // Every element was inserted from a `u16`.
        self.inner.iter().map(|raw| TerminalID(raw as u16))
    }
}

impl fmt::Debug for TerminalSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl FromIterator<TerminalID> for TerminalSet {
    fn from_iter<I>(iter: I) -> Self
    where
        I: IntoIterator<Item = TerminalID>,
    {
        Self {
            inner: iter.into_iter().map(|t| t.0.into()).collect(),
        }
    }
}

#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NonterminalID(u16);

impl NonterminalID {
    /// Reserved nonterminal symbol used as the head of the augmenting production.
    pub const START: Self = Self(0);

    const OFFSET: u16 = 1;

    #[inline]
    pub const fn from_raw(raw: u16) -> Self {
        Self(raw)
    }

    #[inline]
    pub const fn into_raw(self) -> u16 {
        self.0
    }
}

impl fmt::Debug for NonterminalID {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            &Self::START => write!(f, "N#Start"),
            _ => write!(f, "N#{:03}", self.0),
        }
    }
}

#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SymbolID {
    T(TerminalID),
    N(NonterminalID),
}

impl fmt::Debug for SymbolID {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::T(t) => write!(f, "{:?}", t),
            Self::N(n) => write!(f, "{:?}", n),
        }
    }
}

impl From<TerminalID> for SymbolID {
    fn from(t: TerminalID) -> Self {
        Self::T(t)
    }
}

impl From<NonterminalID> for SymbolID {
    fn from(n: NonterminalID) -> Self {
        Self::N(n)
    }
}

// ==== Productions ====

/// The index of a production, in declaration order.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProductionID(u16);

impl ProductionID {
    /// The augmenting production `S' -> S`.
    pub const ACCEPT: Self = Self(0);

    const OFFSET: u16 = 1;

    #[inline]
    pub const fn from_raw(raw: u16) -> Self {
        Self(raw)
    }

    #[inline]
    pub const fn into_raw(self) -> u16 {
        self.0
    }
}

impl fmt::Debug for ProductionID {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            &Self::ACCEPT => write!(f, "P#Accept"),
            _ => write!(f, "P#{:03}", self.0),
        }
    }
}

/// A production rule `left -> right`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Production {
    left: NonterminalID,
    right: Vec<SymbolID>,
}

impl Production {
    /// Return the head of this production.
    pub fn left(&self) -> NonterminalID {
        self.left
    }

    /// Return the body of this production.
    pub fn right(&self) -> &[SymbolID] {
        &self.right[..]
    }

    /// `"L -> * R"`, or `"L -> ε"` for an empty body.
    pub fn display<'g>(&'g self, g: &'g Grammar) -> ProductionDisplay<'g> {
        ProductionDisplay { g, production: self }
    }
}

pub struct ProductionDisplay<'g> {
    g: &'g Grammar,
    production: &'g Production,
}

impl fmt::Display for ProductionDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ->", self.g.nonterminal_name(self.production.left))?;
        if self.production.right.is_empty() {
            return f.write_str(" ε");
        }
        for symbol in &self.production.right {
            write!(f, " {}", self.g.symbol_name(*symbol))?;
        }
        Ok(())
    }
}

// ==== Grammar ====

/// A frozen context-free grammar, augmented with `S' -> S`.
#[derive(Debug)]
pub struct Grammar {
    terminals: Map<TerminalID, String>,
    nonterminals: Map<NonterminalID, String>,
    productions: Map<ProductionID, Production>,
    productions_by_left: Map<NonterminalID, Vec<ProductionID>>,
    start_symbol: NonterminalID,
}

impl Grammar {
    /// Define a grammar using the specified function.
    ///
    /// The augmenting production `S' -> S` is inserted as production 0 once
    /// `f` returns, so the productions declared in `f` are numbered from 1.
    pub fn define<F>(f: F) -> Result<Self, GrammarError>
    where
        F: FnOnce(&mut GrammarDef) -> Result<(), GrammarError>,
    {
        let mut def = GrammarDef {
            terminals: Map::default(),
            nonterminals: Map::default(),
            productions: Map::default(),
            start: None,
            next_terminal: TerminalID::OFFSET,
            next_nonterminal: NonterminalID::OFFSET,
            next_production: ProductionID::OFFSET,
        };
        def.terminals.insert(TerminalID::EOI, "$".into());
        def.nonterminals.insert(NonterminalID::START, "$start".into());

        f(&mut def)?;

        def.end()
    }

    pub fn terminals(&self) -> impl Iterator<Item = (TerminalID, &str)> + '_ {
        self.terminals.iter().map(|(id, name)| (*id, name.as_str()))
    }

    pub fn nonterminals(&self) -> impl Iterator<Item = (NonterminalID, &str)> + '_ {
        self.nonterminals.iter().map(|(id, name)| (*id, name.as_str()))
    }

    /// Iterate over all productions in index order, starting with `S' -> S`.
    pub fn productions(&self) -> impl Iterator<Item = (ProductionID, &Production)> + '_ {
        self.productions.iter().map(|(id, p)| (*id, p))
    }

    pub fn production(&self, id: ProductionID) -> &Production {
        &self.productions[&id]
    }

    /// Return the productions whose head is `n`, in index order.
    pub fn productions_of(&self, n: NonterminalID) -> &[ProductionID] {
        self.productions_by_left
            .get(&n)
            .map_or(&[][..], |ids| &ids[..])
    }

    /// Return the start symbol chosen by the grammar definition (not `S'`).
    pub fn start_symbol(&self) -> NonterminalID {
        self.start_symbol
    }

    pub fn terminal_name(&self, id: TerminalID) -> &str {
        &self.terminals[&id]
    }

    pub fn nonterminal_name(&self, id: NonterminalID) -> &str {
        &self.nonterminals[&id]
    }

    pub fn symbol_name(&self, symbol: SymbolID) -> &str {
        match symbol {
            SymbolID::T(t) => self.terminal_name(t),
            SymbolID::N(n) => self.nonterminal_name(n),
        }
    }

    pub fn terminal_by_name(&self, name: &str) -> Option<TerminalID> {
        self.terminals
            .iter()
            .find_map(|(id, n)| (n == name).then_some(*id))
    }

    pub fn nonterminal_by_name(&self, name: &str) -> Option<NonterminalID> {
        self.nonterminals
            .iter()
            .find_map(|(id, n)| (*id != NonterminalID::START && n == name).then_some(*id))
    }
}

/// The contextual values for building a `Grammar`.
#[derive(Debug)]
pub struct GrammarDef {
    terminals: Map<TerminalID, String>,
    nonterminals: Map<NonterminalID, String>,
    productions: Map<ProductionID, Production>,
    start: Option<NonterminalID>,
    next_terminal: u16,
    next_nonterminal: u16,
    next_production: u16,
}

impl GrammarDef {
    /// Declare a terminal symbol used in this grammar.
    pub fn terminal(&mut self, name: &str) -> Result<TerminalID, GrammarError> {
        verify_name(name)?;
        if self.terminals.values().any(|n| n == name) {
            return Err(GrammarError::DuplicateTerminal { name: name.into() });
        }
        let id = TerminalID(self.next_terminal);
        self.next_terminal += 1;
        self.terminals.insert(id, name.into());
        Ok(id)
    }

    /// Declare a nonterminal symbol used in this grammar.
    pub fn nonterminal(&mut self, name: &str) -> Result<NonterminalID, GrammarError> {
        verify_name(name)?;
        if self
            .nonterminals
            .iter()
            .any(|(id, n)| *id != NonterminalID::START && n == name)
        {
            return Err(GrammarError::DuplicateNonterminal { name: name.into() });
        }
        let id = NonterminalID(self.next_nonterminal);
        self.next_nonterminal += 1;
        self.nonterminals.insert(id, name.into());
        Ok(id)
    }

    /// Append a production rule `left -> right` to this grammar.
    pub fn rule<I>(&mut self, left: NonterminalID, right: I) -> Result<ProductionID, GrammarError>
    where
        I: IntoIterator<Item = SymbolID>,
    {
        let id = ProductionID(self.next_production);

        self.check_nonterminal(left, id)?;
        let right: Vec<SymbolID> = right.into_iter().collect();
        for &symbol in &right {
            match symbol {
                SymbolID::T(t) => self.check_terminal(t, id)?,
                SymbolID::N(n) => self.check_nonterminal(n, id)?,
            }
        }

        for (&existing, p) in &self.productions {
            if p.left == left && p.right == right {
                return Err(GrammarError::DuplicateProduction {
                    left: self.nonterminals[&left].clone(),
                    existing,
                });
            }
        }

        self.next_production += 1;
        self.productions.insert(id, Production { left, right });
        Ok(id)
    }

    /// Specify the start symbol for this grammar.
    pub fn start_symbol(&mut self, symbol: NonterminalID) {
        self.start.replace(symbol);
    }

    fn check_terminal(&self, t: TerminalID, production: ProductionID) -> Result<(), GrammarError> {
        if t == TerminalID::EOI {
            return Err(GrammarError::ReservedSymbol {
                symbol: SymbolID::T(t),
                production,
            });
        }
        if !self.terminals.contains_key(&t) {
            return Err(GrammarError::UndeclaredTerminal { id: t, production });
        }
        Ok(())
    }

    fn check_nonterminal(
        &self,
        n: NonterminalID,
        production: ProductionID,
    ) -> Result<(), GrammarError> {
        if n == NonterminalID::START {
            return Err(GrammarError::ReservedSymbol {
                symbol: SymbolID::N(n),
                production,
            });
        }
        if !self.nonterminals.contains_key(&n) {
            return Err(GrammarError::UndeclaredNonterminal { id: n, production });
        }
        Ok(())
    }

    fn end(mut self) -> Result<Grammar, GrammarError> {
        if self.productions.is_empty() {
            return Err(GrammarError::EmptyProductions);
        }

        // Fall back to the first declared nonterminal.
        let start = match self.start.take() {
            Some(start) => start,
            None => self
                .nonterminals
                .keys()
                .find(|id| **id != NonterminalID::START)
                .copied()
                .ok_or(GrammarError::MissingStartSymbol)?,
        };
        if start == NonterminalID::START || !self.nonterminals.contains_key(&start) {
            return Err(GrammarError::MissingStartSymbol);
        }
        if self.productions.values().all(|p| p.left != start) {
            return Err(GrammarError::StartSymbolWithoutRule {
                name: self.nonterminals[&start].clone(),
            });
        }

        let start_name = format!("{}'", self.nonterminals[&start]);
        self.nonterminals.insert(NonterminalID::START, start_name);

        let mut productions = Map::default();
        productions.insert(
            ProductionID::ACCEPT,
            Production {
                left: NonterminalID::START,
                right: vec![SymbolID::N(start)],
            },
        );
        productions.extend(self.productions);

        let mut productions_by_left: Map<NonterminalID, Vec<ProductionID>> = Map::default();
        for &n in self.nonterminals.keys() {
            productions_by_left.insert(n, vec![]);
        }
        for (&id, p) in &productions {
            productions_by_left.entry(p.left).or_default().push(id);
        }

        tracing::debug!(
            terminals = self.terminals.len(),
            nonterminals = self.nonterminals.len(),
            productions = productions.len(),
            "grammar frozen"
        );

        Ok(Grammar {
            terminals: self.terminals,
            nonterminals: self.nonterminals,
            productions,
            productions_by_left,
            start_symbol: start,
        })
    }
}

/// Errors detected while defining a grammar.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum GrammarError {
    #[error("invalid symbol name: `{name}'")]
    InvalidName { name: String },

    #[error("the terminal `{name}' has already been declared")]
    DuplicateTerminal { name: String },

    #[error("the nonterminal `{name}' has already been declared")]
    DuplicateNonterminal { name: String },

    #[error("production {production:?} refers to the undeclared terminal {id:?}")]
    UndeclaredTerminal {
        id: TerminalID,
        production: ProductionID,
    },

    #[error("production {production:?} refers to the undeclared nonterminal {id:?}")]
    UndeclaredNonterminal {
        id: NonterminalID,
        production: ProductionID,
    },

    #[error("production {production:?} uses the reserved symbol {symbol:?}")]
    ReservedSymbol {
        symbol: SymbolID,
        production: ProductionID,
    },

    #[error("duplicate production for `{left}' (already declared as {existing:?})")]
    DuplicateProduction {
        left: String,
        existing: ProductionID,
    },

    #[error("the grammar has no production rules")]
    EmptyProductions,

    #[error("the start symbol is missing or undeclared")]
    MissingStartSymbol,

    #[error("the start symbol `{name}' has no production rule")]
    StartSymbolWithoutRule { name: String },
}

fn verify_name(name: &str) -> Result<(), GrammarError> {
    // `$` is the end marker.
    if name.is_empty() || name == "$" || name.chars().any(char::is_whitespace) {
        return Err(GrammarError::InvalidName { name: name.into() });
    }
    Ok(())
}
