use mra_derivative::prelude::*;
use mra_derivative::topology::neighbor::{enforce_bc, neighbor};
use proptest::prelude::*;

fn any_code() -> impl Strategy<Value = BoundaryCode> {
    prop::sample::select(BoundaryCode::ALL.to_vec())
}

fn valid_axis() -> impl Strategy<Value = [BoundaryCode; 2]> {
    prop_oneof![
        Just([BoundaryCode::Periodic, BoundaryCode::Periodic]),
        (any_code(), any_code())
            .prop_filter("non-periodic", |(l, r)| {
                *l != BoundaryCode::Periodic && *r != BoundaryCode::Periodic
            })
            .prop_map(|(l, r)| [l, r]),
    ]
}

#[test]
fn display_uses_code_names() {
    let bc = BoundaryConds::<2>::new([
        [BoundaryCode::Zero, BoundaryCode::Dirichlet],
        [BoundaryCode::Periodic, BoundaryCode::Periodic],
    ])
    .unwrap();
    assert_eq!(
        bc.to_string(),
        "BoundaryConditions(zero:dirichlet, periodic:periodic)"
    );
}

#[test]
fn wrong_shape_is_rejected() {
    let err = BoundaryConds::<2>::from_codes(&[[0, 0]]).unwrap_err();
    assert!(matches!(err, MraError::BoundaryShape { expected: 2, rows: 1, .. }));
    assert_eq!(err.kind(), ErrorKind::Configuration);
    assert_eq!(
        BoundaryConds::<1>::from_codes(&[[0, 6]]),
        Err(MraError::InvalidBoundaryCode(6))
    );
    assert_eq!(
        BoundaryConds::<1>::from_codes(&[vec![0, 1, 2]]).unwrap_err().kind(),
        ErrorKind::Configuration
    );
}

#[test]
fn copies_are_independent() {
    let a = BoundaryConds::<1>::free();
    let mut b = a.clone();
    b.set(0, Side::Left, BoundaryCode::Dirichlet).unwrap();
    assert_eq!(a.get(0, Side::Left).unwrap(), BoundaryCode::Free);
    assert_eq!(b.get(0, Side::Left).unwrap(), BoundaryCode::Dirichlet);
}

proptest! {
    #[test]
    fn valid_matrices_construct(rows in prop::array::uniform3(valid_axis())) {
        let bc = BoundaryConds::<3>::new(rows).unwrap();
        let codes = bc.as_codes();
        prop_assert_eq!(BoundaryConds::<3>::from_codes(&codes).unwrap(), bc);
    }

    #[test]
    fn half_periodic_axes_fail(axis in 0usize..3, other in any_code(), left in any::<bool>()) {
        prop_assume!(other != BoundaryCode::Periodic);
        let mut rows = [[BoundaryCode::Free; 2]; 3];
        rows[axis] = if left {
            [BoundaryCode::Periodic, other]
        } else {
            [other, BoundaryCode::Periodic]
        };
        prop_assert_eq!(
            BoundaryConds::<3>::new(rows),
            Err(MraError::UnpairedPeriodic { axis })
        );
    }

    #[test]
    fn out_of_range_codes_fail(code in prop_oneof![-100i32..0, 6i32..100]) {
        prop_assert_eq!(
            BoundaryConds::<1>::from_codes(&[[2, code]]),
            Err(MraError::InvalidBoundaryCode(code))
        );
    }

    #[test]
    fn names_round_trip(code in any_code()) {
        prop_assert_eq!(BoundaryCode::from_name(code.name()).unwrap(), code);
        prop_assert_eq!(BoundaryCode::try_from(code.code()).unwrap(), code);
    }

    #[test]
    fn left_step_from_zero(level in 0u32..20, code in any_code()) {
        let right = if code == BoundaryCode::Periodic { code } else { BoundaryCode::Free };
        let got = enforce_bc(0, code, right, level, -1).unwrap();
        if code == BoundaryCode::Periodic {
            prop_assert_eq!(got, Some((1i64 << level) - 1));
        } else {
            prop_assert_eq!(got, None);
        }
    }

    #[test]
    fn interior_steps_are_plain(level in 2u32..20, frac in 0.0f64..1.0, step in prop_oneof![Just(-1i64), Just(1i64)]) {
        let n = 1i64 << level;
        let l = ((frac * n as f64) as i64).clamp(1, n - 2);
        prop_assume!(l + step >= 0 && l + step < n);
        let bc = BoundaryConds::<2>::uniform(BoundaryCode::Zero);
        let key = TreeKey::new(level, [l, 0]).unwrap();
        let nb = neighbor(&key, 0, step, &bc).unwrap();
        prop_assert_eq!(nb, TreeKey::new(level, [l + step, 0]).unwrap());
        // resolution is a pure function
        prop_assert_eq!(neighbor(&key, 0, step, &bc).unwrap(), nb);
    }

    #[test]
    fn right_wrap_is_symmetric(level in 0u32..20) {
        let n = 1i64 << level;
        let bc = BoundaryConds::<1>::periodic();
        let key = TreeKey::new(level, [n - 1]).unwrap();
        prop_assert_eq!(neighbor(&key, 0, 1, &bc).unwrap(), TreeKey::new(level, [0]).unwrap());
        let open = BoundaryConds::<1>::uniform(BoundaryCode::Neumann);
        prop_assert!(neighbor(&key, 0, 1, &open).unwrap().is_invalid());
    }
}

#[test]
fn mismatched_periodic_wrap_is_a_protocol_error() {
    let err = enforce_bc(1, BoundaryCode::Periodic, BoundaryCode::Zero, 2, -1).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Protocol);
}
