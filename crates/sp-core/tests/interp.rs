//! Interpolation through the crate-root API.

use sp_core::{Extrapolation, LinearInterp, resample_linear};

#[test]
fn batch_resample_matches_single_point_evaluation() {
    let xs = [0.0, 1.0, 3.0];
    let ys = [2.0, 4.0, 0.0];
    let targets = [-0.5, 0.0, 0.25, 2.0, 3.5];
    let interp = LinearInterp::new(xs.to_vec(), ys.to_vec(), Extrapolation::Linear).unwrap();

    let batch = resample_linear(&xs, &ys, &targets);
    assert_eq!(batch.len(), targets.len());
    for (&x, &y) in targets.iter().zip(&batch) {
        assert!((interp.eval(x).unwrap() - y).abs() < 1e-12, "x = {x}");
    }
    assert!((batch[0] - 1.0).abs() < 1e-12);
    assert!((batch[3] - 2.0).abs() < 1e-12);
}
