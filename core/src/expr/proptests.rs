//! Property-based tests for the evaluator.

use super::*;
use proptest::prelude::*;

fn arb_allowed_text() -> impl Strategy<Value = String> {
    "[0-9+*/(). ,-]{0,12}"
}

fn arb_forbidden_char() -> impl Strategy<Value = char> {
    prop_oneof![
        proptest::char::range('a', 'z'),
        proptest::char::range('A', 'Z'),
        Just('_'),
        Just('['),
        Just(']'),
        Just('{'),
        Just('}'),
        Just('`'),
    ]
}

proptest! {
    #[test]
    fn forbidden_characters_are_always_rejected(
        prefix in arb_allowed_text(),
        bad in arb_forbidden_char(),
        suffix in "[ -~]{0,12}",
    ) {
        let input = format!("{prefix}{bad}{suffix}");
        let position = prefix.chars().count();
        prop_assert_eq!(
            evaluate(&input),
            Err(EvalError::DisallowedCharacter { ch: bad, position })
        );
    }

    #[test]
    fn integer_sums_are_exact(terms in proptest::collection::vec(0u32..100_000, 1..8)) {
        let input = terms
            .iter()
            .map(u32::to_string)
            .collect::<Vec<_>>()
            .join(" + ");
        let expected: u64 = terms.iter().map(|t| u64::from(*t)).sum();
        prop_assert_eq!(evaluate(&input), Ok(expected as f64));
    }

    #[test]
    fn product_binds_before_sum(a in 0u32..1000, b in 0u32..1000, c in 0u32..1000) {
        let expected = f64::from(a) + f64::from(b) * f64::from(c);
        prop_assert_eq!(evaluate(&format!("{a} + {b} * {c}")), Ok(expected));
        prop_assert_eq!(evaluate(&format!("({a} + {b} * {c})")), Ok(expected));
    }

    #[test]
    fn literal_touching_a_group_is_rejected(a in 0u32..1000, b in 0u32..1000, gap in " {0,2}") {
        let leading = format!("{a}{gap}({b})");
        let trailing = format!("({a}){gap}{b}");
        prop_assert_eq!(evaluate(&leading), Err(EvalError::InvalidNumber(leading.clone())));
        prop_assert_eq!(evaluate(&trailing), Err(EvalError::InvalidNumber(trailing.clone())));
    }

    #[test]
    fn allowed_text_never_panics(input in arb_allowed_text()) {
        let _ = evaluate(&input);
    }
}
