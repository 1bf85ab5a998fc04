//! Per-element geometry: edge lengths, longest edges, volume, dihedral angles.

use nalgebra::{Point3, Vector3};

use crate::error::{RefineError, Result};
use crate::mesh::{TET_EDGES, TET_FACES};

/// Euclidean lengths of the six edges, ordered (0,1), (1,2), (0,2), (0,3), (1,3), (2,3).
///
/// This is the same order as the canonical edges I..VI, so index `k` of the
/// result is the length of edge `TET_EDGES[k]`.
pub fn edge_lengths(points: &[Point3<f64>; 4]) -> [f64; 6] {
    TET_EDGES.map(|(a, b)| (points[b] - points[a]).norm())
}

/// Indices of every edge whose length equals the maximum.
///
/// Ties are kept, so a regular tetrahedron reports all six edges. Degenerate
/// input (all lengths zero or NaN) yields an empty list, which callers treat
/// as an internal error.
///
/// # Errors
/// [`RefineError::EdgeCount`] if `lengths` does not hold exactly six values.
pub fn longest_edge_indices(lengths: &[f64]) -> Result<Vec<usize>> {
    if lengths.len() != TET_EDGES.len() {
        return Err(RefineError::EdgeCount {
            actual: lengths.len(),
        });
    }

    let maximum = lengths.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    Ok(lengths
        .iter()
        .enumerate()
        .filter(|&(_, &l)| l > 0.0 && l == maximum)
        .map(|(i, _)| i)
        .collect())
}

/// Signed volume of a tetrahedron, `det[p1 - p0, p2 - p0, p3 - p0] / 6`.
///
/// Positive for the canonical winding the case table templates assume.
#[inline]
pub fn signed_volume(points: &[Point3<f64>; 4]) -> f64 {
    let [p0, p1, p2, p3] = points;
    (p1 - p0).cross(&(p2 - p0)).dot(&(p3 - p0)) / 6.0
}

/// Unit normals of the four faces (outward for positive volume).
///
/// Degenerate faces keep a zero normal.
fn face_normals(points: &[Point3<f64>; 4]) -> [Vector3<f64>; 4] {
    TET_FACES.map(|[a, b, c]| {
        let n = (points[b] - points[a]).cross(&(points[c] - points[a]));
        n.try_normalize(0.0).unwrap_or(n)
    })
}

/// Dihedral angles in degrees for all six face pairs.
///
/// Each angle is `180 - acos(n_i . n_j)` with the dot product clamped to
/// `[-1, 1]`.
pub fn dihedral_angles(points: &[Point3<f64>; 4]) -> [f64; 6] {
    let normals = face_normals(points);
    let mut angles = [0.0; 6];
    let mut k = 0;
    for i in 0..4 {
        for j in (i + 1)..4 {
            let dot = normals[i].dot(&normals[j]).clamp(-1.0, 1.0);
            angles[k] = 180.0 - dot.acos().to_degrees();
            k += 1;
        }
    }
    angles
}

/// Minimum and maximum dihedral angle in degrees.
pub fn dihedral_angle_range(points: &[Point3<f64>; 4]) -> (f64, f64) {
    dihedral_angles(points)
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &a| {
            (lo.min(a), hi.max(a))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn corner_tet() -> [Point3<f64>; 4] {
        [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
            Point3::new(0.0, 0.0, 1.0),
        ]
    }

    fn regular_tet() -> [Point3<f64>; 4] {
        [
            Point3::new(1.0, 1.0, 1.0),
            Point3::new(-1.0, 1.0, -1.0),
            Point3::new(1.0, -1.0, -1.0),
            Point3::new(-1.0, -1.0, 1.0),
        ]
    }

    #[test]
    fn test_edge_length_order() {
        let lengths = edge_lengths(&corner_tet());
        let s2 = 2.0_f64.sqrt();
        let expected = [1.0, s2, 1.0, 1.0, s2, s2];
        for (l, e) in lengths.iter().zip(expected.iter()) {
            assert!((l - e).abs() < 1e-12);
        }
    }

    #[test]
    fn test_longest_edge_ties_preserved() {
        let lengths = edge_lengths(&regular_tet());
        let longest = longest_edge_indices(&lengths).unwrap();
        assert_eq!(longest, vec![0, 1, 2, 3, 4, 5]);

        let longest = longest_edge_indices(&edge_lengths(&corner_tet())).unwrap();
        assert_eq!(longest, vec![1, 4, 5]);
    }

    #[test]
    fn test_longest_edge_unique() {
        let longest = longest_edge_indices(&[1.0, 2.0, 3.0, 2.5, 0.5, 2.9]).unwrap();
        assert_eq!(longest, vec![2]);
    }

    #[test]
    fn test_longest_edge_rejects_wrong_length() {
        assert!(matches!(
            longest_edge_indices(&[1.0, 2.0]),
            Err(RefineError::EdgeCount { actual: 2 })
        ));
    }

    #[test]
    fn test_longest_edge_degenerate_is_empty() {
        assert!(longest_edge_indices(&[0.0; 6]).unwrap().is_empty());
        assert!(longest_edge_indices(&[f64::NAN; 6]).unwrap().is_empty());
    }

    #[test]
    fn test_signed_volume() {
        assert!((signed_volume(&corner_tet()) - 1.0 / 6.0).abs() < 1e-12);
        assert!((signed_volume(&regular_tet()) - 16.0 / 6.0).abs() < 1e-12);

        let mut flipped = corner_tet();
        flipped.swap(0, 1);
        assert!((signed_volume(&flipped) + 1.0 / 6.0).abs() < 1e-12);
    }

    #[test]
    fn test_dihedral_angles_regular() {
        let expected = (1.0_f64 / 3.0).acos().to_degrees();
        for a in dihedral_angles(&regular_tet()) {
            assert!((a - expected).abs() < 1e-9, "angle {}", a);
        }
    }

    #[test]
    fn test_dihedral_angle_range_corner() {
        let (lo, hi) = dihedral_angle_range(&corner_tet());
        // Three right angles at the corner, three of acos(1/sqrt(3)).
        let slanted = (1.0_f64 / 3.0_f64.sqrt()).acos().to_degrees();
        assert!((hi - 90.0).abs() < 1e-9);
        assert!((lo - slanted).abs() < 1e-9);
    }
}
