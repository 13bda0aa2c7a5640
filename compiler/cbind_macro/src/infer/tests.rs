use std::collections::HashMap;

use super::*;
use crate::parser::parse;
use pretty_assertions::assert_eq;

#[derive(Default)]
struct Env {
    macros: HashMap<String, (Option<MacroType>, Option<Expr>, Option<bool>)>,
}

impl Env {
    /// Register a macro the way a registry would: parsed and typed, but
    /// not yet classified.
    fn define(&mut self, name: &str, text: &str) {
        let expr = parse(text).ok();
        let ty = expr.as_ref().and_then(|expr| infer_type(expr, &*self));
        self.macros.insert(name.to_owned(), (ty, expr, None));
    }
}

impl MacroEnv for Env {
    fn lookup(&self, name: &str) -> Option<MacroInfo<'_>> {
        self.macros.get(name).map(|(ty, expr, constant)| MacroInfo {
            ty: ty.as_ref(),
            expr: expr.as_ref(),
            constant: *constant,
        })
    }
}

fn ty_of(text: &str, env: &Env) -> Option<MacroType> {
    let expr = parse(text).unwrap_or_else(|err| panic!("`{text}` failed to parse: {err}"));
    infer_type(&expr, env)
}

fn constant(text: &str, env: &Env) -> bool {
    let expr = parse(text).unwrap_or_else(|err| panic!("`{text}` failed to parse: {err}"));
    is_constant(&expr, env)
}

#[test]
fn literal_types() {
    let env = Env::default();
    assert_eq!(ty_of("100", &env), Some(MacroType::I32));
    assert_eq!(ty_of("3000000000", &env), Some(MacroType::I64));
    assert_eq!(ty_of("1.0f", &env), Some(MacroType::F32));
    assert_eq!(ty_of("'x'", &env), Some(MacroType::Char));
    assert_eq!(ty_of("\"s\"", &env), Some(MacroType::Str));
}

#[test]
fn comparisons_and_negation_yield_bool() {
    let env = Env::default();
    assert_eq!(ty_of("1 < 2", &env), Some(MacroType::Bool));
    assert_eq!(ty_of("1u != 2", &env), Some(MacroType::Bool));
    assert_eq!(ty_of("!0", &env), Some(MacroType::Bool));
}

#[test]
fn arithmetic_promotes_and_widens() {
    let env = Env::default();
    assert_eq!(ty_of("'a' + 1", &env), Some(MacroType::I32));
    assert_eq!(ty_of("1 + 2u", &env), Some(MacroType::U32));
    assert_eq!(ty_of("1u << 40ll", &env), Some(MacroType::I64));
    assert_eq!(ty_of("1 * 2.0", &env), Some(MacroType::F64));
    assert_eq!(ty_of("1 && 2u", &env), Some(MacroType::U32));
}

#[test]
fn unary_keeps_operand_type() {
    let env = Env::default();
    assert_eq!(ty_of("-1u", &env), Some(MacroType::U32));
    assert_eq!(ty_of("~0ull", &env), Some(MacroType::U64));
}

#[test]
fn casts_and_sizeof() {
    let env = Env::default();
    assert_eq!(ty_of("(uint64_t)1", &env), Some(MacroType::U64));
    assert_eq!(ty_of("(unsigned)-1", &env), Some(MacroType::U32));
    assert_eq!(
        ty_of("(AVRational)1", &env),
        Some(MacroType::Named("AVRational".to_owned()))
    );
    assert_eq!(ty_of("(AVRational)1 + 1", &env), None);
    assert_eq!(ty_of("sizeof(long)", &env), Some(MacroType::I32));
}

#[test]
fn ternary_takes_else_branch_type() {
    let env = Env::default();
    assert_eq!(ty_of("1 ? 2.0 : 3u", &env), Some(MacroType::U32));
}

#[test]
fn references_resolve_through_environment() {
    let mut env = Env::default();
    env.define("BASE", "0x100u");
    env.define("NEXT", "BASE + 1");
    assert_eq!(ty_of("NEXT", &env), Some(MacroType::U32));
    assert_eq!(ty_of("UNKNOWN + 1", &env), None);
    assert_eq!(ty_of("f(1)", &env), None);
}

#[test]
fn constant_classification() {
    let mut env = Env::default();
    env.define("BASE", "1 << 4");
    env.define("CALL", "f(1)");
    env.define("BROKEN", "1 +");

    assert!(constant("1 + 2 * 3", &env));
    assert!(constant("BASE | 1", &env));
    assert!(constant("sizeof(int)", &env));
    assert!(constant("sizeof 4", &env));
    assert!(!constant("sizeof(struct S)", &env));
    assert!(!constant("sizeof(BASE)", &env));
    assert!(!constant("CALL", &env));
    assert!(!constant("BROKEN", &env));
    assert!(!constant("UNKNOWN", &env));
    assert!(!constant("f(1)", &env));
}

#[test]
fn already_classified_references_are_trusted() {
    let mut env = Env::default();
    env.define("FIXED", "1");
    if let Some(entry) = env.macros.get_mut("FIXED") {
        entry.2 = Some(false);
    }
    assert!(!constant("FIXED + 1", &env));
}

#[test]
fn reference_cycles_are_not_constant() {
    let mut env = Env::default();
    // Typed by hand: a cycle can never infer a type on its own.
    for (name, text) in [("A", "B + 1"), ("B", "A + 1")] {
        env.macros.insert(
            name.to_owned(),
            (Some(MacroType::I32), parse(text).ok(), None),
        );
    }
    assert!(!constant("A", &env));
}
