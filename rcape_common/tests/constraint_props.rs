//! Property tests for parameter constraints and domain codes.

use proptest::prelude::*;
use rcape_common::prelude::*;

proptest! {
    #[test]
    fn int_range_is_containment(min in -1000i64..1000, span in 0i64..1000, v in -3000i64..3000) {
        let max = min + span;
        let rule = Constraint::IntRange { min, max };
        prop_assert_eq!(rule.check(&Value::Int(v)), (min..=max).contains(&v));
    }

    #[test]
    fn stepped_range_needs_both_conditions(v in -64i64..64) {
        let rule = Constraint::MultipleOf { step: 4, min: 0, max: 16 };
        prop_assert_eq!(rule.check(&Value::Int(v)), v % 4 == 0 && (0..=16).contains(&v));
    }

    #[test]
    fn float_range_accepts_ints_inside(v in -5i64..5) {
        let rule = Constraint::FloatRange { min: -1.5, max: 1.5 };
        prop_assert_eq!(rule.check(&Value::Int(v)), (-1..=1).contains(&v));
    }

    #[test]
    fn length_bounds_sequences(n in 0usize..200) {
        let rule = Constraint::Length { min: 1, max: 128 };
        prop_assert_eq!(rule.check(&Value::Bytes(vec![0; n])), (1..=128).contains(&n));
    }

    #[test]
    fn robot_state_codes_round_trip_or_fail(code in -10i64..10) {
        match RobotState::try_from(code) {
            Ok(state) => prop_assert_eq!(state.code() as i64, code),
            Err(_) => prop_assert!(!(0..=3).contains(&code)),
        }
    }
}

#[test]
fn non_finite_floats_never_pass() {
    for v in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
        assert!(!Constraint::FloatRange { min: f64::MIN, max: f64::MAX }.check(&Value::Float(v)));
        assert!(!Constraint::Positive.check(&Value::Float(v)));
    }
}
