//! Multiplicity algebra tests
//!
//! Covers:
//! - Printing and signature encoding
//! - Literal reading
//! - Subsumption
//! - Intersection and minimal subsuming multiplicities

use insta::assert_snapshot;
use m3_multiplicity::*;
use proptest::prelude::*;
use rstest::rstest;

fn m(literal: &str) -> Multiplicity {
    literal
        .parse()
        .unwrap_or_else(|e| panic!("Failed to read '{}': {:?}", literal, e))
}

// === Printing ===

#[rstest]
#[case("[1]", "1", "_1_")]
#[case("[0..1]", "0..1", "_$0_1$_")]
#[case("[*]", "*", "_MANY_")]
#[case("[1..*]", "1..*", "_$1_MANY$_")]
#[case("[0]", "0", "_$0_0$_")]
#[case("[2..10]", "2..10", "_$2_10$_")]
#[case("[3..*]", "3..*", "_$3_MANY$_")]
#[case("[m]", "m", "_m_")]
fn test_print_and_signature(#[case] literal: &str, #[case] printed: &str, #[case] signature: &str) {
    let multiplicity = m(literal);
    assert_eq!(multiplicity.print(false), printed);
    assert_eq!(multiplicity.print(true), format!("[{}]", printed));
    assert_eq!(multiplicity.to_string(), printed);
    assert_eq!(multiplicity.signature_string(), signature);
}

#[test]
fn test_print_constructed() {
    assert_eq!(Multiplicity::range(2, 10).unwrap().print(false), "2..10");
    assert_eq!(Multiplicity::range(2, 10).unwrap().signature_string(), "_$2_10$_");
    assert_eq!(Multiplicity::unbounded(0).print(false), "*");
    assert_eq!(Multiplicity::range(4, 4).unwrap().print(false), "4");
}

// === Literals ===

#[rstest]
#[case("1")]
#[case(" [ 0 .. 1 ] ")]
#[case("*")]
#[case("[_m1]")]
fn test_literal_forms_accepted(#[case] literal: &str) {
    assert!(literal.parse::<Multiplicity>().is_ok());
}

#[rstest]
#[case("[1..x]")]
#[case("[1")]
#[case("[]")]
#[case("[*..3]")]
#[case("[a-b]")]
fn test_literal_forms_rejected(#[case] literal: &str) {
    assert!(matches!(
        literal.parse::<Multiplicity>(),
        Err(MultiplicityError::Parse { .. })
    ));
}

#[test]
fn test_literal_bounds_are_validated() {
    assert!(matches!(
        "[5..2]".parse::<Multiplicity>(),
        Err(MultiplicityError::Invalid { .. })
    ));
    assert!(matches!(
        "[-1]".parse::<Multiplicity>(),
        Err(MultiplicityError::Invalid { .. })
    ));
}

#[test]
fn test_error_messages() {
    assert_snapshot!(
        "[5..2]".parse::<Multiplicity>().unwrap_err().to_string(),
        @"Invalid multiplicity [5..2]: lower bound exceeds upper bound"
    );
    assert_snapshot!(
        PURE_ONE.subsumes(&m("[n]")).unwrap_err().to_string(),
        @"Multiplicity '[n]' is not concrete"
    );
}

// === Subsumption ===

#[rstest]
#[case("[*]", "[1]", true)]
#[case("[*]", "[0..1]", true)]
#[case("[*]", "[3..17]", true)]
#[case("[1..*]", "[0..1]", false)]
#[case("[1..*]", "[2..5]", true)]
#[case("[0..1]", "[1]", true)]
#[case("[0..1]", "[*]", false)]
#[case("[1]", "[0..1]", false)]
#[case("[1]", "[1..*]", false)]
#[case("[2..10]", "[3..10]", true)]
#[case("[2..10]", "[3..11]", false)]
fn test_subsumes(#[case] target: &str, #[case] value: &str, #[case] expected: bool) {
    assert_eq!(m(target).subsumes(&m(value)).unwrap(), expected);
}

#[test]
fn test_pure_one_subsumes_only_itself() {
    for other in ["[0..1]", "[*]", "[1..*]", "[0]", "[2]", "[1..2]"] {
        assert!(!PURE_ONE.subsumes(&m(other)).unwrap(), "[1] subsumes {}", other);
    }
    assert!(PURE_ONE.subsumes(&PURE_ONE).unwrap());
}

#[test]
fn test_subsumes_requires_concrete() {
    let param = m("[m]");
    assert!(param.subsumes(&PURE_ONE).is_err());
    assert!(ZERO_MANY.subsumes(&param).is_err());
}

// === Intersection ===

#[test]
fn test_intersect_examples() {
    assert!(!intersect(&[m("[0..10]"), m("[11..20]")]).unwrap());
    assert!(intersect(&[m("[0..10]"), m("[10..20]")]).unwrap());
}

#[test]
fn test_min_subsuming_example() {
    let list = [m("[4..10]"), m("[5..10]"), m("[7..21]"), m("[71..*]")];
    assert_eq!(min_subsuming_multiplicity(&list).unwrap(), m("[4..*]"));
}

#[rstest]
#[case(vec!["[m]"])]
#[case(vec!["[m]", "[m]"])]
#[case(vec!["[m]", "[n]"])]
fn test_min_subsuming_of_parameters_is_zero_many(#[case] literals: Vec<&str>) {
    let list: Vec<Multiplicity> = literals.iter().map(|literal| m(literal)).collect();
    let result = min_subsuming_multiplicity(&list).unwrap();
    assert!(result.is_concrete());
    assert_eq!(result, ZERO_MANY);
}

#[test]
fn test_min_subsuming_mixed_parameter_keeps_concrete_lower() {
    assert_eq!(
        min_subsuming_multiplicity(&[m("[m]"), m("[2..3]"), m("[5]")]).unwrap(),
        m("[2..*]")
    );
}

// === Laws ===

fn concrete() -> impl Strategy<Value = Multiplicity> {
    (0u32..50, proptest::option::of(0u32..50)).prop_map(|(lower, extra)| match extra {
        Some(extra) => Multiplicity::range(lower, lower + extra).unwrap(),
        None => Multiplicity::unbounded(lower),
    })
}

proptest! {
    #[test]
    fn subsumes_is_reflexive(a in concrete()) {
        prop_assert!(a.subsumes(&a).unwrap());
    }

    #[test]
    fn zero_many_subsumes_everything(a in concrete()) {
        prop_assert!(ZERO_MANY.subsumes(&a).unwrap());
    }

    #[test]
    fn subsumes_is_antisymmetric(a in concrete(), b in concrete()) {
        if a.subsumes(&b).unwrap() && b.subsumes(&a).unwrap() {
            prop_assert_eq!(a, b);
        }
    }

    #[test]
    fn intersect_is_symmetric(a in concrete(), b in concrete()) {
        prop_assert_eq!(
            intersect(&[a.clone(), b.clone()]).unwrap(),
            intersect(&[b, a]).unwrap()
        );
    }

    #[test]
    fn subsumed_pairs_intersect(a in concrete(), b in concrete()) {
        if a.subsumes(&b).unwrap() {
            prop_assert!(intersect(&[a, b]).unwrap());
        }
    }

    #[test]
    fn min_subsuming_subsumes_members(list in proptest::collection::vec(concrete(), 1..6)) {
        let result = min_subsuming_multiplicity(&list).unwrap();
        for member in &list {
            prop_assert!(result.subsumes(member).unwrap());
        }
    }

    #[test]
    fn print_reads_back(a in concrete()) {
        prop_assert_eq!(a.print(true).parse::<Multiplicity>().unwrap(), a);
    }
}
