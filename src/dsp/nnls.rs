//! Non-negative least squares (Lawson-Hanson active set)
//!
//! Solves `argmin_x ||A x - b||` subject to `x >= 0` for the small, dense
//! systems the chroma estimator produces (a handful of template columns).

/// Convergence tolerance on the dual vector `w = A' (b - A x)`
const TOLERANCE: f64 = 1e-10;

/// Solve a non-negative least squares problem
///
/// `columns[j]` is the j-th column of A (all of length `b.len()`). Returns
/// the non-negative coefficient vector, one entry per column. Columns of
/// zeros are legal and receive a zero coefficient.
pub fn nnls(columns: &[Vec<f64>], b: &[f64]) -> Vec<f64> {
    let n = columns.len();
    let m = b.len();
    debug_assert!(columns.iter().all(|c| c.len() == m));

    let mut x = vec![0.0f64; n];
    let mut passive = vec![false; n];
    let mut residual = b.to_vec();

    // The active set shrinks by at least one candidate per outer step in the
    // worst case; 3n iterations is the customary safety cap.
    let max_iterations = 3 * n.max(1);

    for _ in 0..max_iterations {
        // Dual vector on the active (zero) set
        let mut best: Option<(usize, f64)> = None;
        for j in 0..n {
            if passive[j] {
                continue;
            }
            let w = dot(&columns[j], &residual);
            if w > TOLERANCE && best.map_or(true, |(_, bw)| w > bw) {
                best = Some((j, w));
            }
        }

        let Some((enter, _)) = best else {
            break; // KKT conditions met
        };
        passive[enter] = true;

        // Solve the unconstrained subproblem on the passive set, stepping
        // back towards feasibility whenever the solution leaves the cone.
        loop {
            let z = solve_passive(columns, b, &passive, m);

            let mut all_positive = true;
            let mut alpha = f64::INFINITY;
            for j in 0..n {
                if passive[j] && z[j] <= 0.0 {
                    all_positive = false;
                    let step = x[j] / (x[j] - z[j]);
                    if step < alpha {
                        alpha = step;
                    }
                }
            }

            if all_positive {
                x = z;
                break;
            }

            for j in 0..n {
                if passive[j] {
                    x[j] += alpha * (z[j] - x[j]);
                    if x[j] <= TOLERANCE {
                        x[j] = 0.0;
                        passive[j] = false;
                    }
                }
            }
        }

        // Refresh the residual for the next dual evaluation
        residual.copy_from_slice(b);
        for j in 0..n {
            if x[j] != 0.0 {
                for (r, &a) in residual.iter_mut().zip(columns[j].iter()) {
                    *r -= x[j] * a;
                }
            }
        }
    }

    x
}

/// Least squares on the passive columns via normal equations
///
/// Returns a full-length vector with zeros on the active set.
fn solve_passive(columns: &[Vec<f64>], b: &[f64], passive: &[bool], m: usize) -> Vec<f64> {
    let members: Vec<usize> = (0..passive.len()).filter(|&j| passive[j]).collect();
    let k = members.len();

    // Gram matrix and right-hand side restricted to the passive set
    let mut gram = vec![vec![0.0f64; k]; k];
    let mut rhs = vec![0.0f64; k];
    for (pi, &i) in members.iter().enumerate() {
        rhs[pi] = dot(&columns[i], b);
        for (pj, &j) in members.iter().enumerate().skip(pi) {
            let g = dot(&columns[i], &columns[j]);
            gram[pi][pj] = g;
            gram[pj][pi] = g;
        }
    }
    debug_assert!(columns.iter().all(|c| c.len() == m));

    let solution = solve_symmetric(&mut gram, &mut rhs);

    let mut z = vec![0.0f64; passive.len()];
    for (pi, &j) in members.iter().enumerate() {
        z[j] = solution[pi];
    }
    z
}

/// Gaussian elimination with partial pivoting on a small dense system
///
/// Consumes `a` and `b` as scratch space. Near-singular pivots (collinear
/// or zero templates) resolve to a zero coefficient rather than blowing up.
fn solve_symmetric(a: &mut [Vec<f64>], b: &mut [f64]) -> Vec<f64> {
    let k = b.len();

    for col in 0..k {
        // Partial pivot
        let mut pivot_row = col;
        for row in (col + 1)..k {
            if a[row][col].abs() > a[pivot_row][col].abs() {
                pivot_row = row;
            }
        }
        a.swap(col, pivot_row);
        b.swap(col, pivot_row);

        let pivot = a[col][col];
        if pivot.abs() < 1e-12 {
            continue;
        }

        for row in (col + 1)..k {
            let factor = a[row][col] / pivot;
            if factor == 0.0 {
                continue;
            }
            for c in col..k {
                a[row][c] -= factor * a[col][c];
            }
            b[row] -= factor * b[col];
        }
    }

    // Back substitution
    let mut x = vec![0.0f64; k];
    for col in (0..k).rev() {
        let mut sum = b[col];
        for c in (col + 1)..k {
            sum -= a[col][c] * x[c];
        }
        x[col] = if a[col][col].abs() < 1e-12 {
            0.0
        } else {
            sum / a[col][col]
        };
    }
    x
}

fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}
