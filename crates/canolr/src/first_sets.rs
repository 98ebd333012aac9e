//! Calculation of FIRST sets.

use crate::{
    grammar::{Grammar, NonterminalID, SymbolID, TerminalID, TerminalSet},
    types::{Map, Set},
};

/// `First(X)` of a symbol or a sequence of symbols.
///
/// `nullable` plays the role of the epsilon marker: it is set when the whole
/// symbol (or sequence) can derive the empty string.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct First {
    pub terminals: TerminalSet,
    pub nullable: bool,
}

#[derive(Debug)]
pub struct FirstSets {
    nullables: Set<NonterminalID>,
    map: Map<NonterminalID, TerminalSet>,
}

impl FirstSets {
    #[tracing::instrument(skip_all)]
    pub fn new(g: &Grammar) -> Self {
        let mut nullables = Set::default();
        let mut map: Map<NonterminalID, TerminalSet> = g
            .nonterminals()
            .map(|(n, _)| (n, TerminalSet::default()))
            .collect();

        // A -> Y1 Y2 ... Yk に対して、先頭から nullable でない記号 Yi に到達するまで
        // First(Y1) ... First(Yi) を First(A) に加える。値が更新されなくなるまで繰り返す
        let mut rounds = 0;
        loop {
            rounds += 1;
            let mut changed = false;
            for (_, production) in g.productions() {
                let mut added = TerminalSet::default();
                let mut is_rhs_nullable = true;
                for &symbol in production.right() {
                    match symbol {
                        SymbolID::T(t) => {
                            added.insert(t);
                            is_rhs_nullable = false;
                        }
                        SymbolID::N(n) => {
                            added.union_with(&map[&n]);
                            is_rhs_nullable = nullables.contains(&n);
                        }
                    }
                    if !is_rhs_nullable {
                        break;
                    }
                }

                changed |= map[&production.left()].union_with(&added);
                if is_rhs_nullable {
                    changed |= nullables.insert(production.left());
                }
            }
            if !changed {
                break;
            }
        }
        tracing::debug!(rounds, nullables = nullables.len(), "FIRST sets converged");

        Self { nullables, map }
    }

    pub fn is_nullable(&self, n: NonterminalID) -> bool {
        self.nullables.contains(&n)
    }

    /// `First(X)` for a single symbol.
    pub fn first(&self, symbol: SymbolID) -> First {
        match symbol {
            SymbolID::T(t) => First {
                terminals: Some(t).into_iter().collect(),
                nullable: false,
            },
            SymbolID::N(n) => First {
                terminals: self.map[&n].clone(),
                nullable: self.is_nullable(n),
            },
        }
    }

    /// `First(Y1 Y2 ... Yk)`. The empty sequence is nullable.
    pub fn first_of(&self, symbols: &[SymbolID]) -> First {
        let mut res = First {
            terminals: TerminalSet::default(),
            nullable: true,
        };
        for &symbol in symbols {
            match symbol {
                SymbolID::T(t) => {
                    res.terminals.insert(t);
                    res.nullable = false;
                }
                SymbolID::N(n) => {
                    res.terminals.union_with(&self.map[&n]);
                    res.nullable = self.is_nullable(n);
                }
            }
            if !res.nullable {
                break;
            }
        }
        res
    }

    /// `First(prefix lookahead)`, the lookaheads of the items a closure adds.
    pub fn first_with_lookahead(&self, prefix: &[SymbolID], lookahead: TerminalID) -> TerminalSet {
        let First {
            mut terminals,
            nullable,
        } = self.first_of(prefix);
        if nullable {
            terminals.insert(lookahead);
        }
        terminals
    }
}
