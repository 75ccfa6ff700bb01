use anyhow::Result;
use ndarray::{s, Array2, ArrayView1, Axis};
use podnn::surrogate::RidgeRegressor;
use podnn::{HyperParams, Mesh, PodnnModel};

const N_MAXIMA: usize = 3;

/// 1D Shekel function, `mu = [beta_1..beta_m, gamma_1..gamma_m]` being the
/// widths and the locations of its `m` maxima
fn shekel(mesh: &Mesh, _t: Option<f64>, mu: ArrayView1<f64>) -> Array2<f64> {
    let beta = mu.slice(s![..N_MAXIMA]);
    let gamma = mu.slice(s![N_MAXIMA..]);
    let u = mesh.coordinates(0).mapv(|x| {
        beta.iter()
            .zip(gamma.iter())
            .map(|(b, g)| 1. / (b + (x - g) * (x - g)))
            .sum::<f64>()
    });
    u.insert_axis(Axis(0))
}

fn main() -> Result<()> {
    env_logger::init();

    let mut mu_min = vec![0.9; N_MAXIMA];
    let mut mu_max = vec![1.1; N_MAXIMA];
    for i in 0..N_MAXIMA {
        let location = 2. + 3. * i as f64;
        mu_min.push(location - 0.2);
        mu_max.push(location + 0.2);
    }
    let hp = HyperParams {
        n_x: 300,
        x_min: 0.,
        x_max: 10.,
        mu_min,
        mu_max,
        n_s: 300,
        n_s_tst: 50,
        eps: 1e-6,
        n_l: Some(15),
        train_val_test: (0.7, 0.2, 0.1),
        u_noise: 0.01,
        ..HyperParams::default()
    };

    let mesh = Mesh::from_params(&hp)?;
    let mut model = PodnnModel::new(&hp, mesh, "cache/shekel")?;
    let bundle = model.generate_dataset(&shekel, true)?;
    if let Some(reduction) = model.reduction() {
        println!(
            "POD basis of rank {} ({:.6} of the energy)",
            reduction.pod.rank(),
            reduction.pod.explained_variance_ratio()
        );
    }

    let regressor = RidgeRegressor::params()
        .penalties(&[1e-6, 1e-4, 1e-2, 1.])
        .build()?;
    model.train(Box::new(regressor), &bundle)?;

    let prediction = model.predict(&bundle.x_test_raw)?;
    let (re_mean, re_std) =
        podnn::relative_error(&bundle.u_test, &prediction.u_mean, hp.re_floor)?;
    println!("Held-out relative error: mean {re_mean:.4}, std {re_std:.4}");

    let test_set = model.create_test_set(&shekel)?;
    let (re_mean, re_std) = model.evaluate(&test_set)?;
    println!("Test relative error: mean {re_mean:.4}, std {re_std:.4}");
    Ok(())
}
