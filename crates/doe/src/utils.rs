use linfa::Float;
use ndarray::{Array1, ArrayBase, Data, Ix2};

/// Pairwise euclidean distances between rows of `x`,
/// returned as a condensed vector of length `n * (n - 1) / 2`.
pub fn pdist<F: Float>(x: &ArrayBase<impl Data<Elem = F>, Ix2>) -> Array1<F> {
    let n = x.nrows();
    let mut res = Vec::with_capacity(n * n.saturating_sub(1) / 2);
    for i in 0..n {
        for j in (i + 1)..n {
            let d2 = x
                .row(i)
                .iter()
                .zip(x.row(j))
                .fold(F::zero(), |acc, (a, b)| acc + (*a - *b) * (*a - *b));
            res.push(d2.sqrt());
        }
    }
    Array1::from(res)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    #[test]
    fn test_pdist() {
        let x = array![[0., 0.], [3., 4.], [0., 1.]];
        assert_abs_diff_eq!(pdist(&x), array![5., 1., 18f64.sqrt()], epsilon = 1e-12);
    }
}
