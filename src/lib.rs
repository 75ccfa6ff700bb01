/*!
This library implements reduced-order surrogate models of parametrized
simulations following the POD-NN approach.

A high-fidelity model (the ground truth) is evaluated on a set of sampled
parameters to produce snapshots of the solution fields. A Proper Orthogonal
Decomposition compresses the snapshots into a few reduced coefficients, and a
regressor learns the map from the inputs (time and parameters) to those
coefficients. New fields are then predicted by lifting the regressor outputs
back to the full space, along with their standard deviation when the
regressor is probabilistic.

The pipeline is driven by [PodnnModel], configured with [HyperParams]:

```no_run
use podnn::{HyperParams, Mesh, PodnnModel};
use podnn::surrogate::RidgeRegressor;
use ndarray::{Array2, ArrayView1, Axis};

// u(x; mu) = sin(mu_0 x) + mu_1
fn ground_truth(mesh: &Mesh, _t: Option<f64>, mu: ArrayView1<f64>) -> Array2<f64> {
    mesh.coordinates(0)
        .mapv(|x| (mu[0] * x).sin() + mu[1])
        .insert_axis(Axis(0))
}

let hp: HyperParams = serde_json::from_str(
    r#"{"n_x": 100, "x_max": 3.0, "mu_min": [1.0, 0.0], "mu_max": [2.0, 1.0],
        "n_s": 50, "n_s_tst": 10, "eps": 1e-8}"#,
).expect("valid configuration");
let mesh = Mesh::from_params(&hp).expect("mesh");
let mut model = PodnnModel::new(&hp, mesh, "cache/sin").expect("model");
let bundle = model.generate_dataset(&ground_truth, true).expect("dataset");
let regressor = RidgeRegressor::params().build().expect("regressor");
model.train(Box::new(regressor), &bundle).expect("training");

let test_set = model.create_test_set(&ground_truth).expect("test set");
let (re_mean, re_std) = model.evaluate(&test_set).expect("evaluation");
println!("relative error {re_mean:.3e} +/- {re_std:.3e}");
```

The building blocks are available separately:
* [doe]: sampling of the parameter space,
* [SnapshotSet]: parallel evaluation of a [GroundTruth] on a [Mesh],
* [SnapshotCache]: persistence of snapshots and fitted reductions as npy files,
* [pod]: POD basis computation, single or two-stage,
* [DatasetAssembler]: split, projection, noise and normalization of the data,
* [surrogate]: the [SurrogateRegressor] trait and its implementations,
* [Reconstructor] and [relative_error]: field reconstruction and metrics.
*/
#![warn(missing_docs)]
#![warn(rustdoc::broken_intra_doc_links)]

mod cache;
mod config;
mod dataset;
mod errors;
mod ground_truth;
mod mesh;
mod metrics;
mod model;
mod normalization;
mod partition;
mod reconstruct;

pub use cache::*;
pub use config::*;
pub use dataset::*;
pub use errors::*;
pub use ground_truth::*;
pub use mesh::*;
pub use metrics::*;
pub use model::*;
pub use normalization::*;
pub use partition::*;
pub use reconstruct::*;

pub use podnn_doe as doe;
pub use podnn_pod as pod;
pub use podnn_surrogate as surrogate;

pub use podnn_pod::Pod;
pub use podnn_surrogate::{SurrogateRegressor, TrainingLog};
