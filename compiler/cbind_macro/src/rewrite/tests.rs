use super::*;
use crate::infer::{infer_type, NoMacros};
use crate::parser::parse;
use pretty_assertions::assert_eq;

fn round(text: &str) -> String {
    let expr = parse(text).unwrap_or_else(|err| panic!("`{text}` failed to parse: {err}"));
    rewrite(&expr)
}

#[test]
fn redundant_parentheses_are_dropped() {
    assert_eq!(round("1 + 2 * 3"), "1 + 2 * 3");
    assert_eq!(round("(1 + (2 * 3))"), "1 + 2 * 3");
    assert_eq!(round("((A))"), "A");
}

#[test]
fn required_parentheses_are_kept() {
    assert_eq!(round("(1 + 2) * 3"), "(1 + 2) * 3");
    assert_eq!(round("8 - (4 - 2)"), "8 - (4 - 2)");
    assert_eq!(round("(8 - 4) - 2"), "8 - 4 - 2");
    assert_eq!(round("(A ? 1 : 2) + 3"), "(A ? 1 : 2) + 3");
    assert_eq!(round("(A ? B : C) ? 1 : 2"), "(A ? B : C) ? 1 : 2");
    assert_eq!(round("A ? 1 : B ? 2 : 3"), "A ? 1 : B ? 2 : 3");
}

#[test]
fn unary_and_cast_operands() {
    assert_eq!(round("-(1 + 2)"), "-(1 + 2)");
    assert_eq!(round("-(-1)"), "-(-1)");
    assert_eq!(round("~-1"), "~-1");
    assert_eq!(round("(int)(1 << 2)"), "(int)(1 << 2)");
    assert_eq!(round("(int)-1"), "(int)-1");
}

#[test]
fn cast_types_are_respelled() {
    assert_eq!(round("(uint32_t)1"), "(uint)1");
    assert_eq!(round("(unsigned)X"), "(uint)X");
    assert_eq!(round("(char)65"), "(byte)65");
    assert_eq!(round("(int64_t)0"), "(long)0");
    assert_eq!(round("(AVRational)X"), "(AVRational)X");
}

#[test]
fn integer_spellings() {
    assert_eq!(round("3000000000"), "3000000000L");
    assert_eq!(round("100"), "100");
    assert_eq!(round("10u"), "10U");
    assert_eq!(round("0xFFFFFFFFFFFFFFFF"), "0xFFFFFFFFFFFFFFFFUL");
    assert_eq!(round("017"), "15");
    assert_eq!(round("0b1010"), "0b1010");
    assert_eq!(round("1ULL"), "1UL");
    assert_eq!(round("5ll"), "5L");
    assert_eq!(round("0x00000001ULL"), "0x00000001UL");
}

/// Rewriting twice gives the same text, and both passes infer the type of
/// the source literal.
#[test]
fn sixty_four_bit_spellings_are_stable() {
    for text in ["1LL", "1ll", "1ULL", "0x1ULL", "0x00000001ULL", "5l", "7ul", "4294967296U"] {
        let expr = parse(text).unwrap_or_else(|err| panic!("`{text}` failed to parse: {err}"));
        let once = rewrite(&expr);
        let reparsed = parse(&once).unwrap_or_else(|err| panic!("`{once}` failed to parse: {err}"));
        assert_eq!(rewrite(&reparsed), once, "`{text}`");
        assert_eq!(
            infer_type(&reparsed, &NoMacros),
            infer_type(&expr, &NoMacros),
            "`{text}` rewritten as `{once}`"
        );
    }
    assert_eq!(round("4294967296U"), "4294967296UL");
}

#[test]
fn mixed_width_product_is_stable() {
    let text = "((0ll) * (0)) * (0 * (2148602923) ? (2280047129) : (AV_NAME) != 165ll)";
    let once = round(text);
    assert_eq!(round(&once), once);
}

#[test]
fn float_and_char_spellings() {
    assert_eq!(round("1.5f"), "1.5f");
    assert_eq!(round("2.0"), "2.0");
    assert_eq!(round("'a'"), "'a'");
    assert_eq!(round(r"'\n'"), r"'\n'");
    assert_eq!(round(r"'\0'"), r"'\x00'");
    assert_eq!(round(r"'\''"), r"'\''");
    assert_eq!(round(r#""text\n""#), r#""text\n""#);
}

#[test]
fn sizeof_spellings() {
    assert_eq!(round("sizeof(unsigned long long)"), "sizeof(ulong)");
    assert_eq!(round("sizeof(struct AVFrame)"), "sizeof(AVFrame)");
    assert_eq!(round("sizeof 1"), "sizeof(int)");
    assert_eq!(round("sizeof 'c'"), "sizeof(byte)");
    assert_eq!(round("sizeof(X)"), "sizeof(X)");
}

#[test]
fn calls() {
    assert_eq!(round("MKTAG( 'a','b' , 1+2 )"), "MKTAG('a', 'b', 1 + 2)");
}

#[test]
fn operators_keep_maximal_munch_spelling() {
    assert_eq!(round("A&&B||C<<1>=2"), "A && B || C << 1 >= 2");
}
