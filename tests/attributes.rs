use iris::{CmpPredicate, ConstAttribute, DataType};

#[test]
fn attributes_carry_their_data_type() {
    assert_eq!(ConstAttribute::UIntVal(7).data_type(), DataType::UInt);
    assert_eq!(ConstAttribute::SIntVal(-7).data_type(), DataType::SInt);
    assert_eq!(ConstAttribute::FloatVal(0.5).data_type(), DataType::Float);
    assert_eq!(ConstAttribute::BoolVal(true).data_type(), DataType::Bool);
}

#[test]
fn conversions_pick_the_matching_variant() {
    assert_eq!(ConstAttribute::from(7u64), ConstAttribute::UIntVal(7));
    assert_eq!(ConstAttribute::from(-7i64), ConstAttribute::SIntVal(-7));
    assert_eq!(ConstAttribute::from(0.5f64), ConstAttribute::FloatVal(0.5));
    assert_eq!(ConstAttribute::from(true), ConstAttribute::BoolVal(true));
}

#[test]
fn serialization_round_trips_value_and_type() {
    let attrs = [
        ConstAttribute::UIntVal(u64::MAX),
        ConstAttribute::SIntVal(i64::MIN),
        ConstAttribute::FloatVal(2.5),
        ConstAttribute::BoolVal(false),
    ];
    for attr in attrs {
        let json = serde_json::to_string(&attr).unwrap();
        let back: ConstAttribute = serde_json::from_str(&json).unwrap();
        assert_eq!(back, attr);
        assert_eq!(back.data_type(), attr.data_type());
    }
}

#[test]
fn identity_predicates() {
    assert!(ConstAttribute::UIntVal(0).is_zero());
    assert!(ConstAttribute::SIntVal(0).is_zero());
    assert!(ConstAttribute::FloatVal(0.0).is_zero());
    assert!(!ConstAttribute::BoolVal(false).is_zero());

    assert!(ConstAttribute::UIntVal(1).is_one());
    assert!(ConstAttribute::FloatVal(1.0).is_one());

    assert!(ConstAttribute::UIntVal(u64::MAX).is_all_ones());
    assert!(ConstAttribute::SIntVal(-1).is_all_ones());
    assert!(!ConstAttribute::UIntVal(1).is_all_ones());
    assert!(!ConstAttribute::FloatVal(-1.0).is_all_ones());
}

#[test]
fn data_type_predicates_are_total() {
    let all = [
        DataType::UInt,
        DataType::SInt,
        DataType::Float,
        DataType::Bool,
        DataType::None,
    ];
    for dt in all {
        let classes = [
            dt.is_integer(),
            dt.is_floating(),
            dt.is_bool(),
            dt == DataType::None,
        ];
        assert_eq!(classes.iter().filter(|c| **c).count(), 1, "{:?}", dt);
        if dt.is_integer() {
            assert!(dt.is_signed() ^ dt.is_unsigned());
        }
    }
}

#[test]
fn display_strings() {
    assert_eq!(DataType::None.to_string(), "none");
    assert_eq!(DataType::Bool.to_string(), "bool");
    assert_eq!(DataType::SInt.to_string(), "si");
    assert_eq!(DataType::UInt.to_string(), "ui");
    assert_eq!(DataType::Float.to_string(), "f");

    assert_eq!(CmpPredicate::Eq.to_string(), "EQ");
    assert_eq!(CmpPredicate::Neq.to_string(), "NEQ");
    assert_eq!(CmpPredicate::A.to_string(), "A");
    assert_eq!(CmpPredicate::B.to_string(), "B");
    assert_eq!(CmpPredicate::Ae.to_string(), "AE");
    assert_eq!(CmpPredicate::Be.to_string(), "BE");

    assert_eq!(ConstAttribute::SIntVal(-3).to_string(), "-3");
    assert_eq!(ConstAttribute::BoolVal(true).to_string(), "true");
}
