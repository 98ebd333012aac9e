//! Grammar definitions for integration tests.

use canolr::grammar::{GrammarDef, GrammarError, SymbolID::*};

/// The assignment grammar from the dragon book (LR(1) but not SLR).
///
/// ```text
/// S -> L = R | R
/// L -> * R | id
/// R -> L
/// ```
pub fn assignment(g: &mut GrammarDef) -> Result<(), GrammarError> {
    let equal = g.terminal("=")?;
    let star = g.terminal("*")?;
    let ident = g.terminal("id")?;

    let s = g.nonterminal("S")?;
    let l = g.nonterminal("L")?;
    let r = g.nonterminal("R")?;

    g.rule(s, [N(l), T(equal), N(r)])?;
    g.rule(s, [N(r)])?;
    g.rule(l, [T(star), N(r)])?;
    g.rule(l, [T(ident)])?;
    g.rule(r, [N(l)])?;
    Ok(())
}

/// `E -> E + E | id`, with a shift/reduce conflict on `+`.
pub fn ambiguous_expr(g: &mut GrammarDef) -> Result<(), GrammarError> {
    let plus = g.terminal("+")?;
    let ident = g.terminal("id")?;
    let e = g.nonterminal("E")?;

    g.rule(e, [N(e), T(plus), N(e)])?;
    g.rule(e, [T(ident)])?;
    Ok(())
}

/// Two nonterminals derive the same single token.
pub fn reduce_reduce(g: &mut GrammarDef) -> Result<(), GrammarError> {
    let x = g.terminal("x")?;
    let s = g.nonterminal("S")?;
    let a = g.nonterminal("A")?;
    let b = g.nonterminal("B")?;

    g.rule(s, [N(a)])?;
    g.rule(s, [N(b)])?;
    g.rule(a, [T(x)])?;
    g.rule(b, [T(x)])?;
    Ok(())
}

pub fn arithmetic(g: &mut GrammarDef) -> Result<(), GrammarError> {
    // declare terminal symbols.
    let lparen = g.terminal("(")?;
    let rparen = g.terminal(")")?;
    let plus = g.terminal("+")?;
    let minus = g.terminal("-")?;
    let star = g.terminal("*")?;
    let slash = g.terminal("/")?;
    let num = g.terminal("num")?;

    // declare nonterminal symbols.
    let expr = g.nonterminal("EXPR")?;
    let factor = g.nonterminal("FACTOR")?;
    let term = g.nonterminal("TERM")?;

    g.start_symbol(expr);

    g.rule(expr, [N(expr), T(plus), N(factor)])?;
    g.rule(expr, [N(expr), T(minus), N(factor)])?;
    g.rule(expr, [N(factor)])?;
    g.rule(factor, [N(factor), T(star), N(term)])?;
    g.rule(factor, [N(factor), T(slash), N(term)])?;
    g.rule(factor, [N(term)])?;
    g.rule(term, [T(num)])?;
    g.rule(term, [T(lparen), N(expr), T(rparen)])?;
    Ok(())
}

/// `S -> ( S ) S | ε`
pub fn balanced(g: &mut GrammarDef) -> Result<(), GrammarError> {
    let lparen = g.terminal("(")?;
    let rparen = g.terminal(")")?;
    let s = g.nonterminal("S")?;

    g.rule(s, [T(lparen), N(s), T(rparen), N(s)])?;
    g.rule(s, [])?;
    Ok(())
}

/// A call expression with an optional, comma-separated argument list.
///
/// ```text
/// CALL -> id ( ARGS )
/// ARGS -> LIST | ε
/// LIST -> LIST , id | id
/// ```
pub fn call(g: &mut GrammarDef) -> Result<(), GrammarError> {
    let ident = g.terminal("id")?;
    let lparen = g.terminal("(")?;
    let rparen = g.terminal(")")?;
    let comma = g.terminal(",")?;

    let call = g.nonterminal("CALL")?;
    let args = g.nonterminal("ARGS")?;
    let list = g.nonterminal("LIST")?;

    g.rule(call, [T(ident), T(lparen), N(args), T(rparen)])?;
    g.rule(args, [N(list)])?;
    g.rule(args, [])?;
    g.rule(list, [N(list), T(comma), T(ident)])?;
    g.rule(list, [T(ident)])?;
    Ok(())
}
