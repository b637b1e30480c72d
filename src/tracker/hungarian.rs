//! Kuhn-Munkres assignment (shortest augmenting path with dual potentials).
//!
//! Runs in O(n^2 m) for an n x m matrix with n <= m; taller matrices are
//! solved on their transpose.

use log::trace;
use ndarray::Array2;

use crate::tracker::matching::AssignmentSolver;

/// Default assignment solver of the tracker.
#[derive(Debug, Clone, Copy, Default)]
pub struct HungarianSolver;

impl AssignmentSolver for HungarianSolver {
    fn solve(&self, cost_matrix: &Array2<f32>) -> Vec<Option<usize>> {
        let (num_rows, num_cols) = cost_matrix.dim();
        if num_rows == 0 || num_cols == 0 {
            return vec![None; num_rows];
        }

        let assignment = if num_rows <= num_cols {
            let costs = cost_matrix.mapv(sanitize);
            solve_wide(&costs)
        } else {
            // every column gets a row; invert the column assignment
            let costs = cost_matrix.t().mapv(sanitize);
            let col_to_row = solve_wide(&costs);
            let mut row_to_col = vec![None; num_rows];
            for (col, row) in col_to_row.into_iter().enumerate() {
                if let Some(row) = row {
                    row_to_col[row] = Some(col);
                }
            }
            row_to_col
        };

        trace!("kuhn-munkres {num_rows}x{num_cols}: {assignment:?}");
        assignment
    }
}

/// Stand-in for non-finite costs; keeps the potentials finite.
const FORBIDDEN_COST: f64 = 1e12;

fn sanitize(cost: f32) -> f64 {
    if cost.is_finite() { cost as f64 } else { FORBIDDEN_COST }
}

/// Assign every row of an n x m matrix (n <= m) to a distinct column.
///
/// Indices are 1-based internally; column 0 is the virtual source of each
/// augmenting search.
fn solve_wide(costs: &Array2<f64>) -> Vec<Option<usize>> {
    let (n, m) = costs.dim();
    let mut u = vec![0.0f64; n + 1];
    let mut v = vec![0.0f64; m + 1];
    // row assigned to each column, 0 = free
    let mut p = vec![0usize; m + 1];
    let mut way = vec![0usize; m + 1];

    for i in 1..=n {
        p[0] = i;
        let mut j0 = 0usize;
        let mut min_v = vec![f64::INFINITY; m + 1];
        let mut used = vec![false; m + 1];

        loop {
            used[j0] = true;
            let i0 = p[j0];
            let mut delta = f64::INFINITY;
            let mut j1 = 0usize;

            for j in 1..=m {
                if used[j] {
                    continue;
                }
                let cur = costs[[i0 - 1, j - 1]] - u[i0] - v[j];
                if cur < min_v[j] {
                    min_v[j] = cur;
                    way[j] = j0;
                }
                if min_v[j] < delta {
                    delta = min_v[j];
                    j1 = j;
                }
            }

            for j in 0..=m {
                if used[j] {
                    u[p[j]] += delta;
                    v[j] -= delta;
                } else {
                    min_v[j] -= delta;
                }
            }

            j0 = j1;
            if p[j0] == 0 {
                break;
            }
        }

        // flip the augmenting path back to the source
        loop {
            let j1 = way[j0];
            p[j0] = p[j1];
            j0 = j1;
            if j0 == 0 {
                break;
            }
        }
    }

    let mut assignment = vec![None; n];
    for j in 1..=m {
        if p[j] != 0 {
            assignment[p[j] - 1] = Some(j - 1);
        }
    }
    assignment
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tracker::matching::LapjvSolver;
    use ndarray::array;

    /// Small deterministic generator so the property checks are reproducible.
    struct Lcg(u64);

    impl Lcg {
        fn next_f32(&mut self) -> f32 {
            self.0 = self
                .0
                .wrapping_mul(6364136223846793005)
                .wrapping_add(1442695040888963407);
            ((self.0 >> 40) as f32) / ((1u64 << 24) as f32)
        }
    }

    fn total_cost(cost: &Array2<f32>, assignment: &[Option<usize>]) -> f32 {
        assignment
            .iter()
            .enumerate()
            .filter_map(|(i, c)| c.map(|j| cost[[i, j]]))
            .sum()
    }

    /// Exhaustive minimum over every injective pairing of the smaller side.
    fn brute_force(cost: &Array2<f32>) -> f32 {
        fn go(cost: &Array2<f32>, row: usize, used: &mut [bool], acc: f32, best: &mut f32) {
            let (rows, cols) = cost.dim();
            let assigned = used.iter().filter(|&&u| u).count();
            if row == rows {
                if assigned == rows.min(cols) {
                    *best = best.min(acc);
                }
                return;
            }
            // leave the row unassigned only if columns run out otherwise
            if rows - row > cols - assigned {
                go(cost, row + 1, used, acc, best);
            }
            for j in 0..cols {
                if !used[j] {
                    used[j] = true;
                    go(cost, row + 1, used, acc + cost[[row, j]], best);
                    used[j] = false;
                }
            }
        }
        let mut best = f32::INFINITY;
        go(cost, 0, &mut vec![false; cost.ncols()], 0.0, &mut best);
        best
    }

    fn assert_valid(assignment: &[Option<usize>], rows: usize, cols: usize) {
        assert_eq!(assignment.len(), rows);
        let mut seen = vec![false; cols];
        for col in assignment.iter().flatten() {
            assert!(*col < cols);
            assert!(!seen[*col], "column {col} assigned twice");
            seen[*col] = true;
        }
        let assigned = assignment.iter().flatten().count();
        assert_eq!(assigned, rows.min(cols));
    }

    #[test]
    fn test_square_assignment() {
        let cost = array![[4.0, 1.0, 3.0], [2.0, 0.0, 5.0], [3.0, 2.0, 2.0]];
        let assignment = HungarianSolver.solve(&cost);
        assert_valid(&assignment, 3, 3);
        assert_eq!(total_cost(&cost, &assignment), 5.0);
    }

    #[test]
    fn test_wide_and_tall() {
        let wide = array![[0.9, 0.1, 0.5, 0.7]];
        assert_eq!(HungarianSolver.solve(&wide), vec![Some(1)]);

        let tall = array![[0.9], [0.1], [0.5]];
        assert_eq!(HungarianSolver.solve(&tall), vec![None, Some(0), None]);
    }

    #[test]
    fn test_empty_inputs() {
        assert!(HungarianSolver.solve(&Array2::<f32>::zeros((0, 3))).is_empty());
        assert_eq!(
            HungarianSolver.solve(&Array2::<f32>::zeros((2, 0))),
            vec![None, None]
        );
    }

    #[test]
    fn test_non_finite_cost_is_avoided() {
        let cost = array![[f32::INFINITY, 0.5], [0.2, 0.3]];
        assert_eq!(HungarianSolver.solve(&cost), vec![Some(1), Some(0)]);
    }

    #[test]
    fn test_matches_brute_force_on_small_matrices() {
        let mut rng = Lcg(0x5eed);
        for rows in 1..=4 {
            for cols in 1..=4 {
                for _ in 0..25 {
                    let cost = Array2::from_shape_fn((rows, cols), |_| rng.next_f32());
                    let expected = brute_force(&cost);

                    let hungarian = HungarianSolver.solve(&cost);
                    assert_valid(&hungarian, rows, cols);
                    assert!((total_cost(&cost, &hungarian) - expected).abs() < 1e-5);

                    let lapjv = LapjvSolver.solve(&cost);
                    assert_valid(&lapjv, rows, cols);
                    assert!((total_cost(&cost, &lapjv) - expected).abs() < 1e-5);
                }
            }
        }
    }

    #[test]
    fn test_ties_still_produce_valid_assignment() {
        let cost = Array2::<f32>::from_elem((3, 3), 1.0);
        let assignment = HungarianSolver.solve(&cost);
        assert_valid(&assignment, 3, 3);
    }
}
