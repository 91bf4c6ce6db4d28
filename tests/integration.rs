use std::fs::File;

use param_init::{
    DType, InitConfig, InitErr, Initializer, Shape, TruncMethod, build_all,
    initializer::kaiming_stdv, input, no_grad, param,
};

fn shape(dims: &[i64]) -> Shape {
    Shape::new(dims).unwrap()
}

#[test]
fn uniform_large_sample_bounds() {
    let mut init = Initializer::seeded(42);
    let t = init.uniform(shape(&[250, 400]), -3., 7., DType::F64).unwrap().to_f64_vec();

    let min = t.iter().copied().fold(f64::INFINITY, f64::min);
    let max = t.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    assert!(min >= -3. && max < 7.);
    assert!(min < -2.99 && max > 6.99, "min = {min}, max = {max}");
}

#[test]
fn uniform_large_sample_bounds_every_dtype() {
    for dtype in [DType::F16, DType::F32, DType::F64] {
        let mut init = Initializer::seeded(42);
        let t = init.glorot_uniform(shape(&[500, 200]), 200, 500, dtype).unwrap();
        let limit = (6f64 / 700.).sqrt();

        let outside = t.to_f64_vec().iter().filter(|x| !(-limit..limit).contains(*x)).count();
        assert_eq!(outside, 0, "{dtype}: {outside} outside [-{limit}, {limit})");
    }
}

#[test]
fn same_seed_same_tensors() {
    let mut a = Initializer::seeded(1234);
    let mut b = Initializer::seeded(1234);
    let s = shape(&[16, 8, 2]);

    for _ in 0..3 {
        assert_eq!(
            a.kaiming_uniform(s, 8, DType::F32).unwrap(),
            b.kaiming_uniform(s, 8, DType::F32).unwrap()
        );
        assert_eq!(
            a.glorot_normal(s, 8, 16, DType::F64).unwrap(),
            b.glorot_normal(s, 8, 16, DType::F64).unwrap()
        );
        assert_eq!(
            a.trunc_normal(s, 1., 0., -1., 1., DType::F32).unwrap(),
            b.trunc_normal(s, 1., 0., -1., 1., DType::F32).unwrap()
        );
    }
}

#[test]
fn consecutive_draws_differ() {
    let mut init = Initializer::seeded(1234);
    let s = shape(&[32]);

    let first = init.normal(s, 1., 0., DType::F32).unwrap();
    let second = init.normal(s, 1., 0., DType::F32).unwrap();

    assert_ne!(first, second);
}

#[test]
fn trunc_normal_within_cutoffs() {
    let mut init = Initializer::seeded(7);

    for method in [TruncMethod::Clamp, TruncMethod::InverseCdf] {
        let t = init
            .trunc_normal_with(method, shape(&[64, 64]), 1., 0., -1., 1., DType::F32)
            .unwrap();

        assert!(t.to_f64_vec().iter().all(|x| (-1. ..=1.).contains(x)));
    }
}

#[test]
fn trunc_normal_within_cutoffs_every_dtype() {
    let cutoffs = [(-0.04, 0.04), (-1., 1.), (f64::NEG_INFINITY, f64::INFINITY)];

    for dtype in [DType::F16, DType::F32, DType::F64] {
        for method in [TruncMethod::Clamp, TruncMethod::InverseCdf] {
            for (lo, hi) in cutoffs {
                let mut init = Initializer::seeded(42);
                let t = init
                    .trunc_normal_with(method, shape(&[20_000]), 0.5, 0., lo, hi, dtype)
                    .unwrap()
                    .to_f64_vec();

                let bad = t.iter().filter(|x| !x.is_finite() || !(lo..=hi).contains(*x)).count();
                assert_eq!(bad, 0, "{dtype} {method:?} [{lo}, {hi}]: {bad} outside");
            }
        }
    }
}

#[test]
fn kaiming_normal_scale() {
    let mut init = Initializer::seeded(3);
    let fan_in = 256;
    let t = init.kaiming_normal(shape(&[512, 256]), fan_in, DType::F64).unwrap().to_f64_vec();

    let n = t.len() as f64;
    let std = (t.iter().map(|x| x * x).sum::<f64>() / n).sqrt();
    let expected = kaiming_stdv(fan_in).unwrap();

    assert!((std - expected).abs() / expected < 0.02, "std = {std}");
}

#[test]
fn constant_every_element() {
    let init = Initializer::seeded(0);

    for calc_grad in [true, false] {
        let p = init.constant(-1.5, shape(&[2, 3, 4]), DType::F64, calc_grad).unwrap();

        assert_eq!(p.requires_grad(), calc_grad);
        assert_eq!(p.tensor().len(), 24);
        assert!(p.tensor().to_f64_vec().iter().all(|&x| x == -1.5));
    }
}

#[test]
fn identity_three_by_three() {
    let init = Initializer::seeded(0);
    let p = init.identity(shape(&[3, 3]), DType::F32, true).unwrap();

    assert_eq!(
        p.tensor().to_f64_vec(),
        [1., 0., 0., 0., 1., 0., 0., 0., 1.]
    );
}

#[test]
fn invalid_arguments() {
    let mut init = Initializer::seeded(0);

    let err = init.kaiming_uniform(shape(&[4, 4]), 0, DType::F32).unwrap_err();
    assert!(matches!(err, InitErr::InvalidParameter { what: "fan_in", .. }));

    let err = init.glorot_uniform(shape(&[4, 4]), 0, 0, DType::F32).unwrap_err();
    assert!(matches!(err, InitErr::InvalidParameter { .. }));

    let err = init.uniform_matrix(-1, 4, 0., 1., DType::F32, true).unwrap_err();
    assert!(matches!(err, InitErr::InvalidShape(_)));
}

#[test]
fn wrappers() {
    let mut init = Initializer::seeded(0);
    let t = init.uniform(shape(&[2, 2]), 0., 1., DType::F32).unwrap();

    assert!(!input(t.clone()).requires_grad());
    assert!(!no_grad(t.clone()).requires_grad());

    let p = param(t.clone());
    assert!(p.requires_grad());
    assert_eq!(p.into_tensor(), t);
}

#[test]
fn empty_shape() {
    let mut init = Initializer::seeded(0);
    let t = init.glorot_uniform(shape(&[0, 8]), 8, 0, DType::F32).unwrap();

    assert!(t.is_empty());
}

#[test]
fn shipped_config() {
    let path = concat!(env!("CARGO_MANIFEST_DIR"), "/configs/mlp.json");
    let config = InitConfig::from_reader(File::open(path).unwrap()).unwrap();
    assert_eq!(config.seed, Some(42));

    let params = build_all(&config).unwrap();
    let names: Vec<_> = params.iter().map(|(name, _)| name.as_str()).collect();
    assert_eq!(
        names,
        ["fc1.weight", "fc1.bias", "fc2.weight", "fc2.bias", "embedding"]
    );

    let (_, fc1) = &params[0];
    let limit = (3f64 / 784.).sqrt();
    assert_eq!(fc1.shape().unwrap(), shape(&[128, 784]));
    assert!(fc1.requires_grad());
    assert!(fc1.tensor().to_f64_vec().iter().all(|x| (-limit..limit).contains(x)));

    let (_, bias) = &params[1];
    assert_eq!(bias.dtype(), DType::F32);
    assert!(bias.tensor().to_f64_vec().iter().all(|&x| x == 0.));

    let (_, embedding) = &params[4];
    assert_eq!(embedding.dtype(), DType::F16);
    assert_eq!(embedding.shape().unwrap(), shape(&[1000, 64]));
    assert!(embedding.tensor().to_f64_vec().iter().all(|x| (-0.04..=0.04).contains(x)));

    // same seed, same parameters
    let again = build_all(&config).unwrap();
    assert_eq!(params[4].1.tensor(), again[4].1.tensor());
}
