//! LR(1) items and the closure/GOTO operators over item sets.

use crate::{
    first_sets::FirstSets,
    grammar::{Grammar, ProductionID, SymbolID, TerminalID},
    types::Set,
};
use std::{collections::BTreeSet, fmt};

/// The LR(1) item `[A -> α . β, a]`.
///
/// The ordering (production, dot, lookahead) is the iteration order of
/// item sets and hence the order in which the table builder visits items.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LR1Item {
    pub production: ProductionID,
    /// The position of the marker, in `0..=right.len()`.
    pub index: u16,
    pub lookahead: TerminalID,
}

impl LR1Item {
    /// The symbol just after the marker, if any.
    pub fn next_symbol(&self, g: &Grammar) -> Option<SymbolID> {
        g.production(self.production)
            .right()
            .get(usize::from(self.index))
            .copied()
    }

    pub fn is_complete(&self, g: &Grammar) -> bool {
        usize::from(self.index) >= g.production(self.production).right().len()
    }

    fn advance(self) -> Self {
        Self {
            index: self.index + 1,
            ..self
        }
    }

    /// `"L -> * . R, ="`
    pub fn display<'g>(&'g self, g: &'g Grammar) -> ItemDisplay<'g> {
        ItemDisplay { g, item: self }
    }
}

pub struct ItemDisplay<'g> {
    g: &'g Grammar,
    item: &'g LR1Item,
}

impl fmt::Display for ItemDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let production = self.g.production(self.item.production);
        write!(f, "{} ->", self.g.nonterminal_name(production.left()))?;
        for (i, symbol) in production.right().iter().enumerate() {
            if i == usize::from(self.item.index) {
                f.write_str(" .")?;
            }
            write!(f, " {}", self.g.symbol_name(*symbol))?;
        }
        if usize::from(self.item.index) == production.right().len() {
            f.write_str(" .")?;
        }
        write!(f, ", {}", self.g.terminal_name(self.item.lookahead))
    }
}

/// An ordered set of LR(1) items.
///
/// Equality and hashing are structural, so two item sets with the same
/// content denote the same automaton state.
#[derive(Debug, Default, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ItemSet {
    items: BTreeSet<LR1Item>,
}

impl ItemSet {
    pub fn iter(&self) -> impl Iterator<Item = &LR1Item> + '_ {
        self.items.iter()
    }

    pub fn contains(&self, item: &LR1Item) -> bool {
        self.items.contains(item)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl FromIterator<LR1Item> for ItemSet {
    fn from_iter<I: IntoIterator<Item = LR1Item>>(iter: I) -> Self {
        Self {
            items: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a ItemSet {
    type Item = &'a LR1Item;
    type IntoIter = std::collections::btree_set::Iter<'a, LR1Item>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

/// Closure and GOTO over the LR(1) items of a grammar.
#[derive(Debug)]
pub struct Expander<'g> {
    grammar: &'g Grammar,
    first_sets: FirstSets,
}

impl<'g> Expander<'g> {
    pub fn new(grammar: &'g Grammar) -> Self {
        Self {
            grammar,
            first_sets: FirstSets::new(grammar),
        }
    }

    pub fn grammar(&self) -> &'g Grammar {
        self.grammar
    }

    pub fn first_sets(&self) -> &FirstSets {
        &self.first_sets
    }

    /// `closure({[S' -> . S, $]})`, the item set of the initial state.
    pub fn initial(&self) -> ItemSet {
        let kernel = LR1Item {
            production: ProductionID::ACCEPT,
            index: 0,
            lookahead: TerminalID::EOI,
        };
        self.closure(&Some(kernel).into_iter().collect())
    }

    /// Saturate `kernels` with `[B -> . γ, b]` for every `[A -> α . B β, a]`
    /// it contains and every `b` in `First(β a)`.
    pub fn closure(&self, kernels: &ItemSet) -> ItemSet {
        let mut items = kernels.items.clone();
        let mut pending: Vec<LR1Item> = items.iter().copied().collect();

        while let Some(item) = pending.pop() {
            let production = self.grammar.production(item.production);
            let (n, beta) = match &production.right()[usize::from(item.index)..] {
                [SymbolID::N(n), beta @ ..] => (*n, beta),
                _ => continue,
            };

            let lookaheads = self.first_sets.first_with_lookahead(beta, item.lookahead);
            for &id in self.grammar.productions_of(n) {
                for lookahead in lookaheads.iter() {
                    let added = LR1Item {
                        production: id,
                        index: 0,
                        lookahead,
                    };
                    if items.insert(added) {
                        pending.push(added);
                    }
                }
            }
        }

        ItemSet { items }
    }

    /// Move the marker over `symbol` and take the closure. The result is
    /// empty when no item expects `symbol`.
    pub fn goto(&self, items: &ItemSet, symbol: SymbolID) -> ItemSet {
        let kernels: ItemSet = items
            .iter()
            .filter(|item| item.next_symbol(self.grammar) == Some(symbol))
            .map(|item| item.advance())
            .collect();
        if kernels.is_empty() {
            return kernels;
        }
        self.closure(&kernels)
    }

    /// The symbols just after a marker, in the order they first appear.
    pub fn next_symbols(&self, items: &ItemSet) -> Set<SymbolID> {
        items
            .iter()
            .filter_map(|item| item.next_symbol(self.grammar))
            .collect()
    }
}
