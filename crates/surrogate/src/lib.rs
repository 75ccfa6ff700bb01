/*!
This library implements the regression surrogates which map the inputs of a
reduced-order model (parameters, and time for unsteady problems) to the
reduced coefficients of the solution fields.

Every regressor implements the [SurrogateRegressor] trait, so that a pipeline
can hold a `Box<dyn SurrogateRegressor>` and train it without knowing its
internals:
* [RidgeRegressor] is deterministic: regularized least squares on polynomial
  features, the penalty being selected on the validation data,
* [BayesianRegressor] is probabilistic: Bayesian linear regression whose prior
  and noise precisions maximise the evidence, giving a predictive standard
  deviation.

Example:
```
use podnn_surrogate::{RidgeRegressor, SurrogateRegressor};
use ndarray::{array, Array2};

let x = array![[0., 0.], [1., 0.], [0., 1.], [1., 1.], [0.5, 0.5], [0.2, 0.7]];
let y = x.map_axis(ndarray::Axis(1), |r| r[0] * r[1] + r[0]).insert_axis(ndarray::Axis(1));

let mut model: Box<dyn SurrogateRegressor> = Box::new(RidgeRegressor::params().build().unwrap());
let empty = Array2::zeros((0, 2));
model.fit(x.view(), y.view(), empty.view(), empty.view(), 1).unwrap();
let (mean, _std) = model.predict(array![[0.5, 1.]].view()).unwrap();
assert!((mean[[0, 0]] - 1.).abs() < 1e-3);
```
*/
#![warn(missing_docs)]
#![warn(rustdoc::broken_intra_doc_links)]
mod bayesian;
mod errors;
mod features;
mod linear;
mod ridge;
mod traits;

pub use bayesian::*;
pub use errors::*;
pub use features::*;
pub use ridge::*;
pub use traits::*;
