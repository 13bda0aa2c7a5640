use super::*;
use pretty_assertions::assert_eq;

fn kinds(text: &str) -> Vec<TokenKind> {
    tokenize(text)
        .unwrap_or_else(|err| panic!("`{text}` failed to lex: {err}"))
        .into_iter()
        .map(|token| token.kind)
        .collect()
}

fn int(text: &str) -> IntLiteral {
    match kinds(text).as_slice() {
        [TokenKind::Literal(Literal::Int(int))] => int.clone(),
        other => panic!("`{text}` is not a single integer literal: {other:?}"),
    }
}

#[test]
fn operators_use_maximal_munch() {
    assert_eq!(
        kinds("a&&b||c<<1>=2!=3"),
        vec![
            TokenKind::Ident("a".into()),
            TokenKind::AmpAmp,
            TokenKind::Ident("b".into()),
            TokenKind::PipePipe,
            TokenKind::Ident("c".into()),
            TokenKind::Shl,
            TokenKind::Literal(Literal::Int(IntLiteral {
                value: 1,
                radix: Radix::Decimal,
                digits: "1".into(),
                ty: MacroType::I32,
            })),
            TokenKind::GtEq,
            TokenKind::Literal(Literal::Int(IntLiteral {
                value: 2,
                radix: Radix::Decimal,
                digits: "2".into(),
                ty: MacroType::I32,
            })),
            TokenKind::NotEq,
            TokenKind::Literal(Literal::Int(IntLiteral {
                value: 3,
                radix: Radix::Decimal,
                digits: "3".into(),
                ty: MacroType::I32,
            })),
        ]
    );
}

#[test]
fn unsuffixed_decimal_widens_past_int_range() {
    assert_eq!(int("100").ty, MacroType::I32);
    assert_eq!(int("2147483647").ty, MacroType::I32);
    assert_eq!(int("2147483648").ty, MacroType::I64);
    assert_eq!(int("3000000000").ty, MacroType::I64);
}

#[test]
fn suffixes_pick_starting_width() {
    assert_eq!(int("10u").ty, MacroType::U32);
    assert_eq!(int("10UL").ty, MacroType::U64);
    assert_eq!(int("10lu").ty, MacroType::U64);
    assert_eq!(int("10l").ty, MacroType::I64);
    assert_eq!(int("10LL").ty, MacroType::I64);
    assert_eq!(int("10ull").ty, MacroType::U64);
    assert_eq!(int("10LLU").ty, MacroType::U64);
    assert_eq!(int("5000000000u").ty, MacroType::U64);
}

#[test]
fn non_decimal_literals_fall_back_to_unsigned() {
    let all_ones = int("0xFFFFFFFFFFFFFFFF");
    assert_eq!(all_ones.ty, MacroType::U64);
    assert_eq!(all_ones.value, u64::MAX);
    assert_eq!(all_ones.radix, Radix::Hex);
    assert_eq!(all_ones.digits, "FFFFFFFFFFFFFFFF");
}

#[test]
fn octal_and_binary_values() {
    let octal = int("017");
    assert_eq!((octal.value, octal.radix), (15, Radix::Octal));
    assert_eq!(octal.digits, "17");

    let binary = int("0b101");
    assert_eq!((binary.value, binary.radix), (5, Radix::Binary));

    let zero = int("0");
    assert_eq!((zero.value, zero.radix), (0, Radix::Decimal));
}

#[test]
fn oversized_literals_are_rejected() {
    assert!(matches!(
        tokenize("18446744073709551616"),
        Err(ParseError::Overflow { .. })
    ));
    assert!(matches!(
        tokenize("9223372036854775808"),
        Err(ParseError::Overflow { .. })
    ));
}

#[test]
fn malformed_literals_are_rejected() {
    for text in ["10ms", "09", "0x", "1e+", "10uu"] {
        assert!(
            matches!(tokenize(text), Err(ParseError::InvalidLiteral { .. })),
            "`{text}` should be malformed"
        );
    }
}

#[test]
fn floating_literals() {
    assert_eq!(
        kinds("1.5 .5f 1e9"),
        vec![
            TokenKind::Literal(Literal::Float {
                text: "1.5".into(),
                single: false
            }),
            TokenKind::Literal(Literal::Float {
                text: ".5".into(),
                single: true
            }),
            TokenKind::Literal(Literal::Float {
                text: "1e9".into(),
                single: false
            }),
        ]
    );
}

#[test]
fn character_escapes_are_decoded() {
    assert_eq!(
        kinds(r"'a' '\n' '\x41' '\101' '\0' '\''"),
        vec![
            TokenKind::Literal(Literal::Char(b'a')),
            TokenKind::Literal(Literal::Char(b'\n')),
            TokenKind::Literal(Literal::Char(0x41)),
            TokenKind::Literal(Literal::Char(65)),
            TokenKind::Literal(Literal::Char(0)),
            TokenKind::Literal(Literal::Char(b'\'')),
        ]
    );
}

#[test]
fn string_literal_is_kept_verbatim() {
    assert_eq!(
        kinds(r#""a\"b""#),
        vec![TokenKind::Literal(Literal::Str(r#""a\"b""#.into()))]
    );
}

#[test]
fn unterminated_literals() {
    assert_eq!(tokenize("'a"), Err(ParseError::Unterminated { pos: 0 }));
    assert_eq!(tokenize("x \"abc"), Err(ParseError::Unterminated { pos: 2 }));
}

#[test]
fn unexpected_character() {
    assert_eq!(
        tokenize("1 @ 2"),
        Err(ParseError::UnexpectedChar { ch: '@', pos: 2 })
    );
}

#[test]
fn continuations_are_whitespace() {
    assert_eq!(kinds("a \\\n + b").len(), 3);
}

#[test]
fn fold_continuations_into_spaces() {
    assert_eq!(
        fold_line_continuations("(1 << 2) | \\\n    (1 << 3)"),
        "(1 << 2) | (1 << 3)"
    );
    assert_eq!(fold_line_continuations("  A\\\r\nB  "), "A B");
    assert_eq!(fold_line_continuations(r"'\\'"), r"'\\'");
}
