//! Subdivision case table.
//!
//! A tetrahedron with a subset of its six edges marked for bisection is
//! described by a 6-bit case code: bit `5 - k` is set when edge `k` (in the
//! order I..VI of [`TET_EDGES`]) is cut, so edge I has weight 32 and edge VI
//! weight 1. The 63 non-zero codes reduce, by relabelling the corners, to twelve
//! canonical subdivision patterns. Each pattern lists its child tetrahedra as
//! four slots:
//!
//! - `0..=3`: corners of the relabelled parent
//! - `4..=9`: midpoint of relabelled edge `slot - 4` (I..VI)
//! - `10`: centroid of the parent (only used when all six edges are cut)
//!
//! The patterns follow Ruprecht & Müller (1994) with the variants chosen in
//! Thompson & Pébay (2006). Where several edges tie for longest they are all
//! cut, so no per-case edge-length tie breaking is needed. The fully cut case
//! inserts the centroid so every child edge is shorter than the parent's.
//!
//! [`CanonicalCase::ThreeCNonNegative`] and [`CanonicalCase::FourANonNegative`]
//! are re-ordered copies of 3c and 4a. Some relabellings would turn 3c/4a
//! children inside out; those rows select the re-ordered copy instead.

use crate::error::{RefineError, Result};
use crate::mesh::TET_EDGES;

/// Template slot for the parent centroid.
pub const CENTROID_SLOT: u8 = 10;

/// Largest valid case code.
pub const MAX_CASE_CODE: usize = 63;

/// One of the twelve canonical subdivision patterns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CanonicalCase {
    /// One edge cut: 2 children.
    One,
    /// Two edges sharing a face: 3 children.
    TwoA,
    /// Two opposite edges: 4 children.
    TwoB,
    /// Three edges meeting at a corner: 4 children.
    ThreeA,
    /// Three edges bounding a face: 4 children.
    ThreeB,
    /// Three edges forming an open path: 5 children.
    ThreeC,
    /// Four edges, two faces fully cut: 6 children.
    FourA,
    /// Four edges forming a cycle: 6 children.
    FourB,
    /// Five edges: 7 children.
    Five,
    /// All six edges, with a centroid node: 12 children.
    Six,
    /// 3c with children re-ordered to keep positive volume.
    ThreeCNonNegative,
    /// 4a with children re-ordered to keep positive volume.
    FourANonNegative,
}

use CanonicalCase::*;

const CASE_1: [[u8; 4]; 2] = [[0, 4, 2, 3], [4, 1, 2, 3]];

const CASE_2A: [[u8; 4]; 3] = [[0, 4, 5, 3], [0, 5, 2, 3], [4, 1, 5, 3]];

const CASE_2B: [[u8; 4]; 4] = [[0, 4, 9, 3], [4, 1, 9, 3], [0, 4, 2, 9], [4, 1, 2, 9]];

const CASE_3A: [[u8; 4]; 4] = [[0, 4, 6, 7], [4, 1, 2, 3], [4, 2, 6, 3], [4, 6, 7, 3]];

const CASE_3B: [[u8; 4]; 4] = [[0, 7, 4, 2], [4, 7, 8, 2], [4, 8, 1, 2], [7, 3, 8, 2]];

const CASE_3C: [[u8; 4]; 5] = [
    [4, 2, 7, 5],
    [4, 2, 0, 7],
    [4, 1, 5, 3],
    [5, 7, 4, 3],
    [5, 2, 7, 3],
];

const CASE_3C_NON_NEGATIVE: [[u8; 4]; 5] = [
    [4, 7, 2, 5],
    [4, 0, 2, 7],
    [4, 5, 1, 3],
    [5, 4, 7, 3],
    [5, 7, 2, 3],
];

const CASE_4A: [[u8; 4]; 6] = [
    [7, 8, 9, 3],
    [6, 9, 7, 8],
    [6, 0, 1, 8],
    [6, 7, 0, 8],
    [1, 2, 6, 9],
    [1, 6, 8, 9],
];

const CASE_4A_NON_NEGATIVE: [[u8; 4]; 6] = [
    [7, 9, 8, 3],
    [6, 7, 9, 8],
    [6, 1, 0, 8],
    [6, 0, 7, 8],
    [1, 6, 2, 9],
    [1, 8, 6, 9],
];

const CASE_4B: [[u8; 4]; 6] = [
    [6, 8, 1, 5],
    [6, 8, 0, 1],
    [6, 7, 0, 8],
    [8, 7, 3, 2],
    [6, 8, 5, 2],
    [6, 8, 2, 7],
];

const CASE_5: [[u8; 4]; 7] = [
    [7, 8, 9, 3],
    [6, 5, 2, 9],
    [5, 7, 1, 8],
    [5, 7, 0, 1],
    [5, 7, 6, 0],
    [5, 7, 9, 6],
    [7, 8, 5, 9],
];

// The published case 6 keeps one child edge at full parent length; splitting
// around the centroid instead saves an iteration.
const CASE_6: [[u8; 4]; 12] = [
    [7, 8, 9, 3],
    [6, 5, 2, 9],
    [4, 1, 5, 8],
    [0, 4, 6, 7],
    [6, 10, 4, 5],
    [6, 4, 10, 7],
    [6, 7, 10, 9],
    [6, 9, 10, 5],
    [10, 5, 8, 4],
    [10, 8, 5, 9],
    [10, 8, 9, 7],
    [10, 8, 7, 4],
];

/// Child templates indexed by `CanonicalCase::id() - 1`.
const TEMPLATES: [&[[u8; 4]]; 12] = [
    &CASE_1,
    &CASE_2A,
    &CASE_2B,
    &CASE_3A,
    &CASE_3B,
    &CASE_3C,
    &CASE_4A,
    &CASE_4B,
    &CASE_5,
    &CASE_6,
    &CASE_3C_NON_NEGATIVE,
    &CASE_4A_NON_NEGATIVE,
];

impl CanonicalCase {
    /// All cases in id order.
    pub const ALL: [CanonicalCase; 12] = [
        One,
        TwoA,
        TwoB,
        ThreeA,
        ThreeB,
        ThreeC,
        FourA,
        FourB,
        Five,
        Six,
        ThreeCNonNegative,
        FourANonNegative,
    ];

    /// Case id in `1..=12`.
    pub fn id(self) -> usize {
        match self {
            One => 1,
            TwoA => 2,
            TwoB => 3,
            ThreeA => 4,
            ThreeB => 5,
            ThreeC => 6,
            FourA => 7,
            FourB => 8,
            Five => 9,
            Six => 10,
            ThreeCNonNegative => 11,
            FourANonNegative => 12,
        }
    }

    /// Case for an id in `1..=12`.
    pub fn from_id(id: usize) -> Option<Self> {
        Self::ALL.get(id.checked_sub(1)?).copied()
    }

    /// Short name, as used in the literature.
    pub fn name(self) -> &'static str {
        match self {
            One => "1",
            TwoA => "2a",
            TwoB => "2b",
            ThreeA => "3a",
            ThreeB => "3b",
            ThreeC => "3c",
            FourA => "4a",
            FourB => "4b",
            Five => "5",
            Six => "6",
            ThreeCNonNegative => "3c'",
            FourANonNegative => "4a'",
        }
    }

    /// Child tetrahedra as template slots.
    pub fn templates(self) -> &'static [[u8; 4]] {
        TEMPLATES[self.id() - 1]
    }

    /// Number of child tetrahedra.
    pub fn child_count(self) -> usize {
        self.templates().len()
    }
}

/// Where a template slot takes its node from, in terms of parent corners.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotSource {
    /// An original parent corner.
    Corner(usize),
    /// The midpoint of the edge between two parent corners.
    Midpoint(usize, usize),
    /// The centroid of the parent.
    Centroid,
}

/// One row of the case table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaseRow {
    /// Parent corner used for relabelled corner `i`.
    pub recode: [u8; 4],
    /// Canonical pattern applied after relabelling.
    pub case: CanonicalCase,
}

impl CaseRow {
    /// Resolve a template slot to parent corners.
    ///
    /// Returns `None` for slot values outside `0..=10`.
    pub fn slot_source(&self, slot: u8) -> Option<SlotSource> {
        match slot {
            0..=3 => Some(SlotSource::Corner(self.recode[slot as usize] as usize)),
            4..=9 => {
                let (a, b) = TET_EDGES[slot as usize - 4];
                Some(SlotSource::Midpoint(
                    self.recode[a] as usize,
                    self.recode[b] as usize,
                ))
            }
            CENTROID_SLOT => Some(SlotSource::Centroid),
            _ => None,
        }
    }

    /// Number of child tetrahedra this row produces.
    pub fn child_count(&self) -> usize {
        self.case.child_count()
    }
}

const fn row(recode: [u8; 4], case: CanonicalCase) -> CaseRow {
    CaseRow { recode, case }
}

/// Standard table for positively oriented elements, indexed by `code - 1`.
#[rustfmt::skip]
const STANDARD_ROWS: [CaseRow; MAX_CASE_CODE] = [
    row([2, 3, 0, 1], One),               //  1: 2-3
    row([1, 3, 2, 0], One),               //  2: 1-3
    row([1, 3, 2, 0], TwoA),              //  3: 1-3, 2-3
    row([3, 0, 2, 1], One),               //  4: 0-3
    row([2, 3, 0, 1], TwoA),              //  5: 0-3, 2-3
    row([0, 3, 1, 2], TwoA),              //  6: 0-3, 1-3
    row([3, 0, 2, 1], ThreeA),            //  7: 0-3, 1-3, 2-3
    row([0, 2, 3, 1], One),               //  8: 0-2
    row([0, 2, 3, 1], TwoA),              //  9: 0-2, 2-3
    row([1, 3, 2, 0], TwoB),              // 10: 0-2, 1-3
    row([3, 2, 0, 1], ThreeCNonNegative), // 11: 0-2, 1-3, 2-3
    row([3, 0, 2, 1], TwoA),              // 12: 0-2, 0-3
    row([3, 2, 1, 0], ThreeB),            // 13: 0-2, 0-3, 2-3
    row([3, 0, 2, 1], ThreeC),            // 14: 0-2, 0-3, 1-3
    row([0, 1, 2, 3], FourA),             // 15: 0-2, 0-3, 1-3, 2-3
    row([1, 2, 0, 3], One),               // 16: 1-2
    row([3, 2, 1, 0], TwoA),              // 17: 1-2, 2-3
    row([2, 1, 3, 0], TwoA),              // 18: 1-2, 1-3
    row([1, 2, 0, 3], ThreeB),            // 19: 1-2, 1-3, 2-3
    row([3, 0, 2, 1], TwoB),              // 20: 1-2, 0-3
    row([3, 2, 1, 0], ThreeC),            // 21: 1-2, 0-3, 2-3
    row([3, 1, 2, 0], ThreeCNonNegative), // 22: 1-2, 0-3, 1-3
    row([2, 0, 1, 3], FourA),             // 23: 1-2, 0-3, 1-3, 2-3
    row([1, 2, 0, 3], TwoA),              // 24: 1-2, 0-2
    row([2, 1, 3, 0], ThreeA),            // 25: 1-2, 0-2, 2-3
    row([1, 2, 0, 3], ThreeC),            // 26: 1-2, 0-2, 1-3
    row([1, 0, 3, 2], FourA),             // 27: 1-2, 0-2, 1-3, 2-3
    row([2, 0, 3, 1], ThreeCNonNegative), // 28: 1-2, 0-2, 0-3
    row([3, 1, 0, 2], FourA),             // 29: 1-2, 0-2, 0-3, 2-3
    row([0, 1, 2, 3], FourB),             // 30: 1-2, 0-2, 0-3, 1-3
    row([0, 1, 2, 3], Five),              // 31: 1-2, 0-2, 0-3, 1-3, 2-3
    row([0, 1, 2, 3], One),               // 32: 0-1
    row([0, 1, 2, 3], TwoB),              // 33: 0-1, 2-3
    row([3, 1, 0, 2], TwoA),              // 34: 0-1, 1-3
    row([1, 3, 2, 0], ThreeC),            // 35: 0-1, 1-3, 2-3
    row([1, 0, 3, 2], TwoA),              // 36: 0-1, 0-3
    row([0, 3, 2, 1], ThreeCNonNegative), // 37: 0-1, 0-3, 2-3
    row([0, 1, 2, 3], ThreeB),            // 38: 0-1, 0-3, 1-3
    row([1, 2, 0, 3], FourA),             // 39: 0-1, 0-3, 1-3, 2-3
    row([2, 0, 1, 3], TwoA),              // 40: 0-1, 0-2
    row([0, 2, 3, 1], ThreeC),            // 41: 0-1, 0-2, 2-3
    row([1, 0, 2, 3], ThreeCNonNegative), // 42: 0-1, 0-2, 1-3
    row([3, 0, 2, 1], FourB),             // 43: 0-1, 0-2, 1-3, 2-3
    row([0, 1, 2, 3], ThreeA),            // 44: 0-1, 0-2, 0-3
    row([3, 1, 2, 0], FourANonNegative),  // 45: 0-1, 0-2, 0-3, 2-3
    row([3, 2, 1, 0], FourA),             // 46: 0-1, 0-2, 0-3, 1-3
    row([1, 2, 0, 3], Five),              // 47: 0-1, 0-2, 0-3, 1-3, 2-3
    row([0, 1, 2, 3], TwoA),              // 48: 0-1, 1-2
    row([2, 1, 0, 3], ThreeCNonNegative), // 49: 0-1, 1-2, 2-3
    row([1, 3, 2, 0], ThreeA),            // 50: 0-1, 1-2, 1-3
    row([3, 0, 2, 1], FourA),             // 51: 0-1, 1-2, 1-3, 2-3
    row([0, 1, 2, 3], ThreeC),            // 52: 0-1, 1-2, 0-3
    row([1, 3, 2, 0], FourB),             // 53: 0-1, 1-2, 0-3, 2-3
    row([0, 2, 3, 1], FourA),             // 54: 0-1, 1-2, 0-3, 1-3
    row([0, 2, 3, 1], Five),              // 55: 0-1, 1-2, 0-3, 1-3, 2-3
    row([0, 2, 3, 1], ThreeB),            // 56: 0-1, 1-2, 0-2
    row([0, 3, 1, 2], FourA),             // 57: 0-1, 1-2, 0-2, 2-3
    row([2, 3, 0, 1], FourA),             // 58: 0-1, 1-2, 0-2, 1-3
    row([3, 0, 2, 1], Five),              // 59: 0-1, 1-2, 0-2, 1-3, 2-3
    row([1, 3, 2, 0], FourA),             // 60: 0-1, 1-2, 0-2, 0-3
    row([1, 3, 2, 0], Five),              // 61: 0-1, 1-2, 0-2, 0-3, 2-3
    row([3, 2, 1, 0], Five),              // 62: 0-1, 1-2, 0-2, 0-3, 1-3
    row([0, 1, 2, 3], Six),               // 63: all edges
];

/// Winding convention of the input elements.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Orientation {
    /// Elements have positive signed volume.
    #[default]
    Standard,
    /// Elements are wound the other way (negative signed volume).
    Inverted,
}

impl Orientation {
    /// `Inverted` when `inverted` is true.
    pub fn from_inverted(inverted: bool) -> Self {
        if inverted {
            Orientation::Inverted
        } else {
            Orientation::Standard
        }
    }
}

/// Corner relabelling that turns an inverted element into a standard one.
const INVERT_SWAP: [u8; 4] = [1, 0, 2, 3];

/// Index of the edge joining two local corners.
pub fn edge_index(a: usize, b: usize) -> Option<usize> {
    let key = if a < b { (a, b) } else { (b, a) };
    TET_EDGES.iter().position(|&e| e == key)
}

/// Case-code bit for edge `k` (I has weight 32, VI weight 1).
#[inline]
pub fn edge_bit(k: usize) -> u8 {
    1 << (5 - k)
}

/// Code of the same cut pattern seen through a corner relabelling.
///
/// Edge `(a, b)` of the relabelled element is cut iff edge
/// `(perm[a], perm[b])` of the original is.
fn permute_code(code: usize, perm: [u8; 4]) -> usize {
    let mut out = 0;
    for (k, &(a, b)) in TET_EDGES.iter().enumerate() {
        let Some(orig) = edge_index(perm[a] as usize, perm[b] as usize) else {
            continue;
        };
        if (code & edge_bit(orig) as usize) != 0 {
            out |= edge_bit(k) as usize;
        }
    }
    out
}

/// Run-scoped case table.
///
/// Each refinement run builds its own immutable copy, so runs with
/// different orientation settings never share mutable state.
#[derive(Debug, Clone)]
pub struct CaseTable {
    rows: [CaseRow; MAX_CASE_CODE],
    orientation: Orientation,
}

impl CaseTable {
    /// Build the table for the given element winding.
    ///
    /// For [`Orientation::Inverted`] every row is rewritten to relabel the
    /// element as `(c1, c0, c2, c3)` first, which makes it positively wound;
    /// the children then come out with positive volume and still split
    /// exactly the coded edges.
    pub fn new(orientation: Orientation) -> Self {
        let rows = match orientation {
            Orientation::Standard => STANDARD_ROWS,
            Orientation::Inverted => std::array::from_fn(|i| {
                let swapped = permute_code(i + 1, INVERT_SWAP);
                let base = STANDARD_ROWS[swapped - 1];
                CaseRow {
                    recode: base.recode.map(|c| INVERT_SWAP[c as usize]),
                    case: base.case,
                }
            }),
        };
        Self { rows, orientation }
    }

    /// Winding this table was built for.
    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    /// Row for a non-zero case code.
    ///
    /// # Errors
    /// [`RefineError::CaseCodeOutOfRange`] for code 0 or codes above 63.
    pub fn lookup(&self, code: usize) -> Result<CaseRow> {
        if code == 0 || code > MAX_CASE_CODE {
            return Err(RefineError::CaseCodeOutOfRange { code });
        }
        Ok(self.rows[code - 1])
    }

    /// Row for an element with the given signed volume.
    ///
    /// An inverted table applies its relabelled rows to negatively wound
    /// elements only. Elements that are already positive, such as children
    /// emitted by an earlier iteration, take the standard rows, so repeated
    /// passes never flip a child back.
    pub fn lookup_oriented(&self, code: usize, volume: f64) -> Result<CaseRow> {
        let row = self.lookup(code)?;
        if self.orientation == Orientation::Inverted && volume > 0.0 {
            return Ok(STANDARD_ROWS[code - 1]);
        }
        Ok(row)
    }

    /// All rows with their codes.
    pub fn rows(&self) -> impl Iterator<Item = (usize, &CaseRow)> + '_ {
        self.rows.iter().enumerate().map(|(i, r)| (i + 1, r))
    }
}

impl Default for CaseTable {
    fn default() -> Self {
        Self::new(Orientation::Standard)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algo::refine::signed_volume;
    use nalgebra::Point3;
    use std::collections::BTreeSet;

    fn reference_tet() -> [Point3<f64>; 4] {
        [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
            Point3::new(0.0, 0.0, 1.0),
        ]
    }

    fn cut_edges(code: usize) -> BTreeSet<(usize, usize)> {
        (0..6)
            .filter(|&k| (code & edge_bit(k) as usize) != 0)
            .map(|k| TET_EDGES[k])
            .collect()
    }

    /// Apply a row to concrete corners; returns child volumes and the set of split edges.
    fn apply(row: &CaseRow, corners: &[Point3<f64>; 4]) -> (Vec<f64>, BTreeSet<(usize, usize)>) {
        let mut split = BTreeSet::new();
        let mut volumes = Vec::new();
        for child in row.case.templates() {
            let pts = child.map(|slot| match row.slot_source(slot).unwrap() {
                SlotSource::Corner(c) => corners[c],
                SlotSource::Midpoint(a, b) => {
                    split.insert((a.min(b), a.max(b)));
                    Point3::from((corners[a].coords + corners[b].coords) * 0.5)
                }
                SlotSource::Centroid => Point3::from(
                    corners.iter().map(|p| p.coords).sum::<nalgebra::Vector3<f64>>() * 0.25,
                ),
            });
            volumes.push(signed_volume(&pts));
        }
        (volumes, split)
    }

    #[test]
    fn test_child_counts() {
        let counts: Vec<usize> = CanonicalCase::ALL.iter().map(|c| c.child_count()).collect();
        assert_eq!(counts, vec![2, 3, 4, 4, 4, 5, 6, 6, 7, 12, 5, 6]);
    }

    #[test]
    fn test_case_ids_round_trip() {
        for case in CanonicalCase::ALL {
            assert_eq!(CanonicalCase::from_id(case.id()), Some(case));
        }
        assert_eq!(CanonicalCase::from_id(0), None);
        assert_eq!(CanonicalCase::from_id(13), None);
    }

    #[test]
    fn test_every_code_has_a_case() {
        let table = CaseTable::default();
        for code in 1..=MAX_CASE_CODE {
            let row = table.lookup(code).unwrap();
            assert!((1..=12).contains(&row.case.id()));
            let mut recode = row.recode;
            recode.sort_unstable();
            assert_eq!(recode, [0, 1, 2, 3], "code {} recode is not a permutation", code);
        }
    }

    #[test]
    fn test_lookup_bounds() {
        let table = CaseTable::default();
        assert!(matches!(
            table.lookup(0),
            Err(RefineError::CaseCodeOutOfRange { code: 0 })
        ));
        assert!(matches!(
            table.lookup(64),
            Err(RefineError::CaseCodeOutOfRange { code: 64 })
        ));
    }

    #[test]
    fn test_standard_rows_split_coded_edges_with_positive_children() {
        let table = CaseTable::new(Orientation::Standard);
        let corners = reference_tet();
        let parent = signed_volume(&corners);

        for code in 1..=MAX_CASE_CODE {
            let row = table.lookup(code).unwrap();
            let (volumes, split) = apply(&row, &corners);
            assert_eq!(split, cut_edges(code), "code {} splits the wrong edges", code);
            for (i, v) in volumes.iter().enumerate() {
                assert!(*v > 0.0, "code {} child {} has volume {}", code, i, v);
            }
            let total: f64 = volumes.iter().sum();
            assert!((total - parent).abs() < 1e-12, "code {} children do not fill parent", code);
        }
    }

    #[test]
    fn test_non_negative_variants_are_reorderings() {
        let key = |t: &[[u8; 4]]| -> BTreeSet<[u8; 4]> {
            t.iter()
                .map(|c| {
                    let mut c = *c;
                    c.sort_unstable();
                    c
                })
                .collect()
        };
        assert_eq!(key(ThreeC.templates()), key(ThreeCNonNegative.templates()));
        assert_eq!(key(FourA.templates()), key(FourANonNegative.templates()));
    }

    #[test]
    fn test_inverted_rows_fix_orientation() {
        let table = CaseTable::new(Orientation::Inverted);
        assert_eq!(table.orientation(), Orientation::Inverted);

        let mut corners = reference_tet();
        corners.swap(0, 1);
        let parent = signed_volume(&corners);
        assert!(parent < 0.0);

        for code in 1..=MAX_CASE_CODE {
            let row = table.lookup(code).unwrap();
            let (volumes, split) = apply(&row, &corners);
            assert_eq!(split, cut_edges(code), "code {} splits the wrong edges", code);
            assert!(volumes.iter().all(|&v| v > 0.0), "code {} has inverted children", code);
            let total: f64 = volumes.iter().sum();
            assert!((total + parent).abs() < 1e-12);
        }
    }

    #[test]
    fn test_inverted_table_leaves_positive_elements_standard() {
        let standard = CaseTable::new(Orientation::Standard);
        let inverted = CaseTable::new(Orientation::Inverted);
        let corners = reference_tet();
        for code in 1..=MAX_CASE_CODE {
            let row = inverted.lookup_oriented(code, signed_volume(&corners)).unwrap();
            assert_eq!(row, standard.lookup(code).unwrap());
            let (volumes, _) = apply(&row, &corners);
            assert!(volumes.iter().all(|&v| v > 0.0));
        }
        assert_eq!(
            inverted.lookup_oriented(5, -1.0).unwrap(),
            inverted.lookup(5).unwrap()
        );
    }

    #[test]
    fn test_standard_table_preserves_negative_winding() {
        let table = CaseTable::default();
        let mut corners = reference_tet();
        corners.swap(0, 1);
        for code in 1..=MAX_CASE_CODE {
            let row = table.lookup_oriented(code, signed_volume(&corners)).unwrap();
            let (volumes, split) = apply(&row, &corners);
            assert_eq!(split, cut_edges(code));
            assert!(volumes.iter().all(|&v| v < 0.0));
        }
    }

    #[test]
    fn test_permute_code_identity_and_swap() {
        for code in 1..=MAX_CASE_CODE {
            assert_eq!(permute_code(code, [0, 1, 2, 3]), code);
            assert_eq!(permute_code(permute_code(code, INVERT_SWAP), INVERT_SWAP), code);
        }
        // Swapping corners 0 and 1 exchanges edges II (1-2) and III (0-2).
        assert_eq!(permute_code(edge_bit(1) as usize, INVERT_SWAP), edge_bit(2) as usize);
        assert_eq!(permute_code(edge_bit(0) as usize, INVERT_SWAP), edge_bit(0) as usize);
    }

    #[test]
    fn test_slot_sources() {
        let row = CaseTable::default().lookup(1).unwrap();
        assert_eq!(row.recode, [2, 3, 0, 1]);
        assert_eq!(row.slot_source(0), Some(SlotSource::Corner(2)));
        assert_eq!(row.slot_source(4), Some(SlotSource::Midpoint(2, 3)));
        assert_eq!(row.slot_source(CENTROID_SLOT), Some(SlotSource::Centroid));
        assert_eq!(row.slot_source(11), None);
    }
}
