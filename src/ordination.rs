use ndarray::{Array1, Array2};

use crate::error::EbdError;
use crate::matrix::DistanceMatrix;

const MAX_ITERATIONS: usize = 500;
const TOLERANCE: f64 = 1e-12;

#[derive(Debug, Clone)]
pub struct Ordination {
    pub ids: Vec<String>,
    pub coords: Vec<[f64; 2]>,
    pub proportions: [f64; 2],
}

pub fn principal_coordinates(matrix: &DistanceMatrix) -> Result<Ordination, EbdError> {
    let n = matrix.len();
    if n == 0 {
        return Err(EbdError::Ordination("empty distance matrix".to_string()));
    }

    let mut centered = Array2::<f64>::zeros((n, n));
    for i in 0..n {
        for j in 0..n {
            let d = matrix.get(i, j);
            centered[[i, j]] = -0.5 * d * d;
        }
    }
    double_center(&mut centered);

    let trace: f64 = (0..n).map(|i| centered[[i, i]]).sum();

    // Shift by the Gershgorin bound so the spectrum of the shifted matrix is
    // non-negative and power iteration converges to the most positive
    // eigenvalue rather than the largest in magnitude.
    let shift = (0..n)
        .map(|i| (0..n).map(|j| centered[[i, j]].abs()).sum::<f64>())
        .fold(0.0_f64, f64::max);
    let mut shifted = centered;
    for i in 0..n {
        shifted[[i, i]] += shift;
    }

    let (top, v1) = power_iteration(&shifted);
    let lambda1 = top - shift;
    deflate(&mut shifted, top, &v1);
    let (second, v2) = power_iteration(&shifted);
    let lambda2 = second - shift;

    let scale1 = lambda1.max(0.0).sqrt();
    let scale2 = lambda2.max(0.0).sqrt();
    let coords = (0..n)
        .map(|i| [v1[i] * scale1, v2[i] * scale2])
        .collect();

    Ok(Ordination {
        ids: matrix.ids().to_vec(),
        coords,
        proportions: [proportion(lambda1, trace), proportion(lambda2, trace)],
    })
}

fn double_center(a: &mut Array2<f64>) {
    let n = a.nrows();
    let row_means: Vec<f64> = (0..n)
        .map(|i| (0..n).map(|j| a[[i, j]]).sum::<f64>() / n as f64)
        .collect();
    let col_means: Vec<f64> = (0..n)
        .map(|j| (0..n).map(|i| a[[i, j]]).sum::<f64>() / n as f64)
        .collect();
    let grand_mean = row_means.iter().sum::<f64>() / n as f64;
    for i in 0..n {
        for j in 0..n {
            a[[i, j]] += grand_mean - row_means[i] - col_means[j];
        }
    }
}

fn power_iteration(a: &Array2<f64>) -> (f64, Array1<f64>) {
    let n = a.nrows();
    let mut v = Array1::from_shape_fn(n, |i| 1.0 / (i as f64 + 1.0));
    let norm = v.dot(&v).sqrt();
    v /= norm;

    let mut eigenvalue = 0.0;
    for _ in 0..MAX_ITERATIONS {
        let mut next = a.dot(&v);
        let norm = next.dot(&next).sqrt();
        if norm < TOLERANCE {
            return (0.0, v);
        }
        next /= norm;
        let rayleigh = next.dot(&a.dot(&next));
        let converged = (rayleigh - eigenvalue).abs() <= TOLERANCE * rayleigh.abs().max(1.0);
        eigenvalue = rayleigh;
        v = next;
        if converged {
            break;
        }
    }
    (eigenvalue, v)
}

fn deflate(a: &mut Array2<f64>, eigenvalue: f64, v: &Array1<f64>) {
    let n = a.nrows();
    for i in 0..n {
        for j in 0..n {
            a[[i, j]] -= eigenvalue * v[i] * v[j];
        }
    }
}

fn proportion(eigenvalue: f64, trace: f64) -> f64 {
    if trace <= f64::EPSILON {
        return 0.0;
    }
    (eigenvalue.max(0.0) / trace).clamp(0.0, 1.0)
}
