/*!
This library implements the Proper Orthogonal Decomposition (POD) used to
compress a set of high-fidelity snapshots into a low-dimensional linear space.

Snapshots are stored column-wise in a matrix `U` of shape (n_h, n). The POD
basis is made of the dominant left singular vectors of the centered snapshots,
the number of retained modes `n_L` being the smallest one holding at least
`1 - eps` of the snapshot energy.

For time-dependent problems the two-stage POD first compresses each block of
`n_t` consecutive snapshots (the time steps of one parameter sample) with its
own threshold `eps_init`, then extracts the final basis from the concatenated
block modes. It avoids decomposing the whole snapshot matrix at once.

Example:
```
use podnn_pod::Pod;
use ndarray::Array2;

let u = Array2::from_shape_fn((50, 8), |(i, j)| ((i * j) as f64 / 50.).sin());
let pod = Pod::params().eps(1e-6).build(&u).expect("POD basis");
let coeffs = pod.project(&u).unwrap();
let rebuilt = pod.lift(&coeffs).unwrap();
assert_eq!(rebuilt.dim(), u.dim());
```
*/
#![warn(missing_docs)]
#![warn(rustdoc::broken_intra_doc_links)]
mod algorithm;
mod errors;
mod parameters;

pub use algorithm::*;
pub use errors::*;
pub use parameters::*;
