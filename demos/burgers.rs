use anyhow::Result;
use ndarray::{Array2, ArrayView1, Axis};
use podnn::surrogate::BayesianRegressor;
use podnn::{HyperParams, Mesh, PodnnModel};

/// Analytic solution of the 1D viscous Burgers equation, `mu = [nu]`
fn burgers(mesh: &Mesh, t: Option<f64>, mu: ArrayView1<f64>) -> Array2<f64> {
    let t = t.unwrap_or(1.);
    let nu = mu[0];
    let u = mesh.coordinates(0).mapv(|x| {
        if t == 1. {
            x / (1. + ((x * x - 0.25) / (4. * nu)).exp())
        } else {
            let t0 = (1. / (8. * nu)).exp();
            (x / t) / (1. + (t / t0).sqrt() * (x * x / (4. * nu * t)).exp())
        }
    });
    u.insert_axis(Axis(0))
}

fn main() -> Result<()> {
    env_logger::init();

    let hp: HyperParams = serde_json::from_str(
        r#"{
            "n_v": 1,
            "n_x": 256, "x_min": 0.0, "x_max": 1.5,
            "n_t": 10, "t_min": 1.0, "t_max": 5.0,
            "mu_min": [0.05], "mu_max": [0.1],
            "n_s": 100, "n_s_tst": 20,
            "eps": 1e-8, "eps_init": 1e-8, "n_L": 20,
            "train_val_test": [0.8, 0.2, 0.0],
            "epochs": 500, "seed": 1111
        }"#,
    )?;

    let mesh = Mesh::from_params(&hp)?;
    let mut model = PodnnModel::new(&hp, mesh, "cache/burgers")?;
    let bundle = model.generate_dataset(&burgers, true)?;

    let regressor = BayesianRegressor::params().build()?;
    let log = model.train(Box::new(regressor), &bundle)?;
    if let Some(step) = log.last() {
        println!(
            "Trained in {} steps, train mse {:.3e}, val mse {:?}",
            log.len(),
            step.train_mse,
            step.val_mse
        );
    }

    let test_set = model.create_test_set(&burgers)?;
    let (re_mean, re_std) = model.evaluate(&test_set)?;
    println!("Test relative error: mean {re_mean:.4}, std {re_std:.4}");

    let prediction = model.predict(test_set.x_v())?;
    let u_pred = model.restruct(&prediction.u_mean)?;
    let u_std = model.restruct(&prediction.u_std)?;
    let mid = hp.n_x / 2;
    println!(
        "u(x={:.3}, t=t_max, mu_0) = {:.4} +/- {:.4}",
        model.mesh().coordinates(0)[mid],
        u_pred[[mid, 0, hp.n_t - 1, 0]],
        2. * u_std[[mid, 0, hp.n_t - 1, 0]]
    );
    Ok(())
}
