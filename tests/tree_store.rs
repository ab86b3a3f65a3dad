mod util;
use util::*;

use mra_derivative::algs::communicator::Priority;
use mra_derivative::data::tree::TreeForm;
use mra_derivative::prelude::*;

#[test]
fn compress_round_trip_on_refined_tree() {
    let world = World::serial(3);
    let opts = RefineOptions {
        initial_level: 1,
        max_level: 6,
        thresh: 1e-5,
    };
    let f = project_refined::<1, _>(&world, &TreeConfig::unit(4, 1), opts, |x| {
        (10.0 * x[0]).tanh()
    })
    .unwrap();
    let norm = f.norm2();
    let before: Vec<_> = f
        .leaf_keys()
        .into_iter()
        .map(|k| (k, f.get(&k).unwrap()))
        .collect();

    f.compress().unwrap();
    assert_eq!(f.form(), TreeForm::Compressed);
    f.compress().unwrap();
    f.reconstruct().unwrap();
    assert_eq!(f.form(), TreeForm::Reconstructed);

    for (key, node) in before {
        let after = f.get(&key).unwrap();
        assert!(node.coeffs().max_abs_diff(after.coeffs()) < 1e-12, "{key}");
    }
    assert!((f.norm2() - norm).abs() < 1e-12);
}

#[test]
fn remote_lookups_agree_across_backends() {
    for world in [World::serial(4), World::threaded(4).unwrap()] {
        let leaves: Vec<_> = [(1, 0), (2, 2), (3, 6), (3, 7)]
            .iter()
            .map(|&(n, l)| (key1(n, l), sample_block(3, l)))
            .collect();
        let f = tree_1d(&world, 3, &leaves);

        let coarse = f.find_node(&world, key1(5, 9), Priority::High);
        let exact = f.find_coeffs(&world, key1(2, 3), Priority::Normal);
        world.fence().unwrap();

        let found = coarse.get().unwrap();
        assert_eq!(found.key, key1(1, 0));
        assert_eq!(found.coeffs.as_slice(), leaf(&f, 1, 0).as_slice());

        // (2,3) is internal: restricted from (3,6) and (3,7)
        let two = f.two_scale();
        let mut want = two
            .child_to_parent(f.get(&key1(3, 6)).unwrap().coeffs(), &key1(3, 6))
            .unwrap();
        want.axpy(
            1.0,
            &two.child_to_parent(f.get(&key1(3, 7)).unwrap().coeffs(), &key1(3, 7))
                .unwrap(),
        )
        .unwrap();
        assert!(exact.get().unwrap().coeffs.max_abs_diff(&want) < 1e-14);
    }
}

#[test]
fn ownership_is_a_pure_function_of_the_key() {
    let world = World::serial(5);
    for pmap in [
        ProcessMap::Hashed,
        ProcessMap::Subtree { level: 2 },
        ProcessMap::Single,
    ] {
        let config = TreeConfig::unit(2, 2).with_pmap(pmap);
        let f = project_uniform::<2, _>(&world, &config, 3, |x| x[0] - x[1]).unwrap();
        let total: usize = (0..5).map(|r| f.local_len(r)).sum();
        assert_eq!(total, f.len());
        for r in 0..5 {
            for (key, _) in f.local_entries(r) {
                assert_eq!(f.owner(&key), r);
                assert_eq!(pmap.owner(&key, 5), r);
            }
        }
    }
}

#[test]
fn eval_follows_the_leaves() {
    let world = World::serial(2);
    let f = project_uniform::<1, _>(&world, &TreeConfig::unit(5, 1).with_cell(vec![(-2.0, 2.0)]), 3, |x| {
        x[0] * x[0]
    })
    .unwrap();
    for &x in &[-2.0, -0.3, 0.0, 1.1, 2.0] {
        assert!((f.eval(&[x]).unwrap() - x * x).abs() < 1e-11);
    }
    assert!(f.eval(&[2.5]).is_none());
}
