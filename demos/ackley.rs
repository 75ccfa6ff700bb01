use anyhow::Result;
use ndarray::{Array2, ArrayView1, Zip};
use podnn::surrogate::{BayesianRegressor, Features};
use podnn::{HyperParams, Mesh, PodnnModel};
use std::f64::consts::PI;

/// Parametrized 2D Ackley function, `mu` shifting its amplitude and frequencies
fn ackley(mesh: &Mesh, _t: Option<f64>, mu: ArrayView1<f64>) -> Array2<f64> {
    let mut u = Array2::zeros((1, mesh.n_xyz()));
    Zip::from(u.row_mut(0))
        .and(mesh.points().rows())
        .for_each(|ui, p| {
            let (x, y) = (p[0], p[1]);
            let r = (0.5 * (x * x + y * y)).sqrt();
            let c = 0.5 * ((2. * PI + 0.01 * mu[1]) * x).cos()
                + 0.5 * ((2. * PI + 0.01 * mu[2]) * y).cos();
            *ui = -20. * (1. + 0.1 * mu[0]) * (-0.2 * r).exp() - c.exp() + 20. + 1f64.exp();
        });
    u
}

fn main() -> Result<()> {
    env_logger::init();

    let hp = HyperParams {
        n_x: 60,
        x_min: -5.,
        x_max: 5.,
        n_y: 60,
        y_min: -5.,
        y_max: 5.,
        mu_min: vec![-1.; 3],
        mu_max: vec![1.; 3],
        n_s: 200,
        n_s_tst: 50,
        eps: 1e-8,
        train_val_test: (0.8, 0.2, 0.),
        epochs: 1000,
        x_noise: 0.01,
        ..HyperParams::default()
    };

    let mesh = Mesh::from_params(&hp)?;
    let mut model = PodnnModel::new(&hp, mesh, "cache/ackley")?;
    let bundle = model.generate_dataset(&ackley, true)?;

    let regressor = BayesianRegressor::params()
        .features(Features::Quadratic)
        .build()?;
    model.train(Box::new(regressor), &bundle)?;

    let test_set = model.create_test_set(&ackley)?;
    let (re_mean, re_std) = model.evaluate(&test_set)?;
    println!("Test relative error: mean {re_mean:.4}, std {re_std:.4}");

    let prediction = model.predict(test_set.x_v())?;
    let band = 2. * prediction.u_std.mean().unwrap_or(0.);
    println!("Mean two std band width: {band:.4}");
    Ok(())
}
