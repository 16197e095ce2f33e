//! Serpentine Kepler sweep.

mod common;

use sp_continuation::{KeplerSweep, KeplerSweepOptions};

#[test]
fn sweep_alternates_direction_and_stops_past_end() {
    let mut model = common::plain_model();
    model.solve(0.9, 1.0).unwrap();
    let options = KeplerSweepOptions {
        end_ec: 1.0025,
        ec_step: 1e-3,
        r_step: 0.05,
    };
    let snapshots: Vec<_> = KeplerSweep::new(&mut model, options)
        .unwrap()
        .collect::<Result<_, _>>()
        .unwrap();

    assert!(!snapshots.is_empty());
    assert!(snapshots.iter().all(|s| s.r_ratio > 0.5 && s.r_ratio < 1.0));
    assert!(snapshots.windows(2).all(|w| w[1].ec >= w[0].ec));
    assert!(snapshots.iter().all(|s| s.ec <= 1.0025));

    // first pass descends at the starting density while sub-Keplerian
    let first_pass: Vec<_> = snapshots.iter().filter(|s| s.ec == 1.0).collect();
    assert!(first_pass.len() > 1);
    assert!(first_pass.windows(2).all(|w| w[1].r_ratio < w[0].r_ratio));
    assert!(first_pass.iter().all(|s| s.omega < s.omega_k));

    // second pass climbs back towards the spherical limit
    let second_pass: Vec<_> = snapshots
        .iter()
        .filter(|s| s.ec > 1.0 && s.ec < 1.0015)
        .collect();
    assert!(second_pass.len() > 1);
    assert!(second_pass.windows(2).all(|w| w[1].r_ratio > w[0].r_ratio));

    let distinct_ec = snapshots
        .windows(2)
        .filter(|w| w[1].ec != w[0].ec)
        .count()
        + 1;
    assert_eq!(distinct_ec, 3);
}

#[test]
fn sweep_needs_solved_model() {
    let mut model = common::plain_model();
    assert!(KeplerSweep::new(&mut model, KeplerSweepOptions::default()).is_err());
}
