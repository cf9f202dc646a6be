use crate::error::AnalyzeError;
use std::str::FromStr;

/// Distance between two atoms of one frame, tagged with the elements of both
/// endpoints.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bond {
    pub length: f64,
    pub atom_a: usize,
    pub atom_b: usize,
    pub elem_a: usize,
    pub elem_b: usize,
}

impl Bond {
    /// The endpoint atom of the given element. The first endpoint wins if
    /// both share the element.
    pub fn atom_of(&self, elem: usize) -> Option<usize> {
        if self.elem_a == elem {
            Some(self.atom_a)
        } else if self.elem_b == elem {
            Some(self.atom_b)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl FromStr for SortDirection {
    type Err = String;

    /// `min` sorts the shortest bond first, `max` the longest.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "min" => Ok(SortDirection::Ascending),
            "max" => Ok(SortDirection::Descending),
            _ => Err(format!("sort direction must be 'min' or 'max', found '{}'", s)),
        }
    }
}

/// Returns a copy of the bonds sorted by length. The sort is stable, so
/// bonds of equal length keep their traversal order in both directions.
pub fn sorted_bonds(bonds: &[Bond], direction: SortDirection) -> Vec<Bond> {
    let mut sorted: Vec<Bond> = bonds.to_vec();
    match direction {
        SortDirection::Ascending => sorted.sort_by(|a, b| a.length.total_cmp(&b.length)),
        SortDirection::Descending => sorted.sort_by(|a, b| b.length.total_cmp(&a.length)),
    }
    sorted
}

/// Picks the bond at the 1-based `rank` after sorting.
pub fn select_bond(
    bonds: &[Bond],
    direction: SortDirection,
    rank: usize,
    label: &str,
) -> Result<Bond, AnalyzeError> {
    if rank == 0 || rank > bonds.len() {
        return Err(AnalyzeError::Index {
            bond_type: String::from(label),
            rank,
            available: bonds.len(),
        });
    }
    Ok(sorted_bonds(bonds, direction)[rank - 1])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bonds(lengths: &[f64]) -> Vec<Bond> {
        lengths
            .iter()
            .enumerate()
            .map(|(index, length)| Bond {
                length: *length,
                atom_a: index,
                atom_b: index + 10,
                elem_a: 0,
                elem_b: 0,
            })
            .collect()
    }

    #[test]
    fn sort_directions_reverse_without_ties() {
        let list = bonds(&[1.4, 0.9, 2.2, 1.1]);
        let ascending: Vec<f64> = sorted_bonds(&list, SortDirection::Ascending)
            .iter()
            .map(|bond| bond.length)
            .collect();
        let mut descending: Vec<f64> = sorted_bonds(&list, SortDirection::Descending)
            .iter()
            .map(|bond| bond.length)
            .collect();
        descending.reverse();
        assert_eq!(ascending, descending);
        assert_eq!(ascending, vec![0.9, 1.1, 1.4, 2.2]);
    }

    #[test]
    fn ties_keep_traversal_order() {
        let list = bonds(&[1.2, 0.8, 1.2]);
        let descending = sorted_bonds(&list, SortDirection::Descending);
        assert_eq!(descending[0].atom_a, 0);
        assert_eq!(descending[1].atom_a, 2);
        let ascending = sorted_bonds(&list, SortDirection::Ascending);
        assert_eq!(ascending[1].atom_a, 0);
        assert_eq!(ascending[2].atom_a, 2);
    }

    #[test]
    fn sorting_leaves_the_input_untouched() {
        let list = bonds(&[1.5, 1.0]);
        let _ = sorted_bonds(&list, SortDirection::Ascending);
        assert_eq!(list[0].length, 1.5);
    }

    #[test]
    fn select_bond_checks_rank() {
        let list = bonds(&[1.0, 2.0, 3.0]);
        let bond = select_bond(&list, SortDirection::Descending, 1, "A-A").unwrap();
        assert_eq!(bond.length, 3.0);
        let err = select_bond(&list, SortDirection::Ascending, 5, "A-A").unwrap_err();
        assert!(matches!(
            err,
            AnalyzeError::Index {
                rank: 5,
                available: 3,
                ..
            }
        ));
    }

    #[test]
    fn endpoints_by_element() {
        let bond = Bond {
            length: 1.0,
            atom_a: 3,
            atom_b: 7,
            elem_a: 0,
            elem_b: 1,
        };
        assert_eq!(bond.atom_of(1), Some(7));
        assert_eq!(bond.atom_of(0), Some(3));
        assert_eq!(bond.atom_of(2), None);
    }

    #[test]
    fn parses_sort_direction() {
        assert_eq!(
            "min".parse::<SortDirection>(),
            Ok(SortDirection::Ascending)
        );
        assert_eq!(
            "max".parse::<SortDirection>(),
            Ok(SortDirection::Descending)
        );
        assert!("largest".parse::<SortDirection>().is_err());
    }
}
