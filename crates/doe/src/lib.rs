/*!
This library implements the parameter space sampling methods used to build
snapshot sets of reduced-order models, in particular the
[Latin Hypercube sampling](https://en.wikipedia.org/wiki/Latin_hypercube_sampling)
method which covers the parameter space with few high-fidelity evaluations.

A parameter space is a box `[mu_min_j, mu_max_j]^n_mu` described by a [ParameterSpace],
which is validated at construction time: malformed bounds are reported as
[DoeError::InvalidDomain] before any sampling happens.

Example:
```
use podnn_doe::{FullFactorial, Lhs, LhsKind, ParameterSpace, Random, SamplingMethod};

// Parameter space is [0.001, 0.01] x [1., 5.], samples are 2-dimensional.
let space = ParameterSpace::new(&[0.001, 1.], &[0.01, 5.]).unwrap();
// We draw five parameter vectors using centered Latin Hypercube sampling.
let mu = Lhs::new(&space).kind(LhsKind::Centered).sample(5);
// or else on a full factorial grid
let mu = FullFactorial::new(&space).sample(5);
// or else randomly with a seed for reproducibility
let mu = Random::new(&space).seed(42).sample(5);
```

This library contains three kinds of sampling methods:
* [Latin Hypercube Sampling](crate::lhs::Lhs),
* [Full Factorial Sampling](crate::full_factorial::FullFactorial),
* [Random Sampling](crate::random::Random)

[SamplingKind] selects one of them from a configuration value.
*/
#![warn(missing_docs)]
#![warn(rustdoc::broken_intra_doc_links)]
mod errors;
mod full_factorial;
mod lhs;
mod random;
mod space;
mod traits;
mod utils;

pub use errors::*;
pub use full_factorial::*;
pub use lhs::*;
pub use random::*;
pub use space::*;
pub use traits::*;
