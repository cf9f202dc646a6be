use crate::error::AnalyzeError;
use hashbrown::HashMap;
use itertools::Itertools;
use log::{debug, trace};

/// An unordered pair of elements. The smaller element index is stored first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BondType {
    pub first: usize,
    pub second: usize,
}

impl BondType {
    pub fn new(elem_a: usize, elem_b: usize) -> Self {
        if elem_a <= elem_b {
            BondType {
                first: elem_a,
                second: elem_b,
            }
        } else {
            BondType {
                first: elem_b,
                second: elem_a,
            }
        }
    }

    pub fn is_homonuclear(&self) -> bool {
        self.first == self.second
    }
}

/// Two atom indices of one entry of a traversal list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AtomPair {
    pub i: usize,
    pub j: usize,
}

/// Static description of the molecule: elements, the element of every atom
/// and the bond types with their traversal lists. Built once per run and
/// shared by reference with every frame and rule.
#[derive(Debug, Clone)]
pub struct SystemDescriptor {
    pub name: Option<String>,
    element_names: Vec<String>,
    element_indices: HashMap<String, usize>,
    atom_elements: Vec<usize>,
    element_atoms: Vec<Vec<usize>>,
    bond_types: Vec<BondType>,
    bond_type_ids: HashMap<BondType, usize>,
    traversal_lists: Vec<Vec<AtomPair>>,
}

impl SystemDescriptor {
    /// Creates the descriptor from the ordered element names and the element
    /// name of every atom.
    pub fn new<S: AsRef<str>, T: AsRef<str>>(
        name: Option<String>,
        element_names: &[S],
        atom_elements: &[T],
    ) -> Result<SystemDescriptor, AnalyzeError> {
        if element_names.is_empty() {
            return Err(AnalyzeError::config("the element list is empty"));
        }
        if atom_elements.is_empty() {
            return Err(AnalyzeError::config("the atom list is empty"));
        }

        let mut element_indices: HashMap<String, usize> = HashMap::new();
        for (index, elem) in element_names.iter().enumerate() {
            let elem: &str = elem.as_ref();
            if element_indices.insert(String::from(elem), index).is_some() {
                return Err(AnalyzeError::config(format!(
                    "element '{}' is listed more than once",
                    elem
                )));
            }
        }
        let element_names: Vec<String> = element_names
            .iter()
            .map(|elem| String::from(elem.as_ref()))
            .collect();

        let atom_elements: Vec<usize> = atom_elements
            .iter()
            .map(|elem| {
                element_indices.get(elem.as_ref()).copied().ok_or_else(|| {
                    AnalyzeError::config(format!("element '{}' doesn't exist", elem.as_ref()))
                })
            })
            .collect::<Result<Vec<usize>, AnalyzeError>>()?;

        // atom ids grouped by element, in input order
        let mut element_atoms: Vec<Vec<usize>> = vec![Vec::new(); element_names.len()];
        for (atom, elem) in atom_elements.iter().enumerate() {
            element_atoms[*elem].push(atom);
        }
        if let Some(elem) = element_atoms.iter().position(|atoms| atoms.is_empty()) {
            return Err(AnalyzeError::config(format!(
                "element '{}' has no atoms",
                element_names[elem]
            )));
        }

        debug!("molecule: {}", name.as_deref().unwrap_or("-"));
        debug!("elements: {}", element_names.iter().join(" "));
        debug!("atoms: {}", atom_elements.len());
        for (elem, atoms) in element_atoms.iter().enumerate() {
            trace!("{}: {}", element_names[elem], atoms.iter().join(" "));
        }

        let bond_types: Vec<BondType> = enumerate_bond_types(&element_atoms);
        let bond_type_ids: HashMap<BondType, usize> = bond_types
            .iter()
            .enumerate()
            .map(|(id, bond_type)| (*bond_type, id))
            .collect();
        let traversal_lists: Vec<Vec<AtomPair>> = bond_types
            .iter()
            .map(|bond_type| build_traversal_list(*bond_type, &element_atoms))
            .collect();

        let descriptor = SystemDescriptor {
            name,
            element_names,
            element_indices,
            atom_elements,
            element_atoms,
            bond_types,
            bond_type_ids,
            traversal_lists,
        };
        for id in 0..descriptor.n_bond_types() {
            debug!(
                "bond type {} ==> {} ({} bonds)",
                id,
                descriptor.bond_type_label(id),
                descriptor.bond_count(id)
            );
        }
        Ok(descriptor)
    }

    pub fn n_elements(&self) -> usize {
        self.element_names.len()
    }

    pub fn n_atoms(&self) -> usize {
        self.atom_elements.len()
    }

    pub fn n_bond_types(&self) -> usize {
        self.bond_types.len()
    }

    /// Number of unordered atom pairs, N(N-1)/2.
    pub fn total_bond_count(&self) -> usize {
        let n_atoms: usize = self.n_atoms();
        n_atoms * (n_atoms - 1) / 2
    }

    pub fn element_index(&self, name: &str) -> Result<usize, AnalyzeError> {
        self.element_indices
            .get(name)
            .copied()
            .ok_or_else(|| AnalyzeError::config(format!("element '{}' doesn't exist", name)))
    }

    pub fn element_name(&self, elem: usize) -> &str {
        &self.element_names[elem]
    }

    pub fn atom_element(&self, atom: usize) -> usize {
        self.atom_elements[atom]
    }

    pub fn element_atoms(&self, elem: usize) -> &[usize] {
        &self.element_atoms[elem]
    }

    pub fn bond_types(&self) -> &[BondType] {
        &self.bond_types
    }

    pub fn bond_type(&self, id: usize) -> BondType {
        self.bond_types[id]
    }

    /// Resolves the id of the bond type formed by two element indices.
    pub fn bond_type_id(&self, elem_a: usize, elem_b: usize) -> Result<usize, AnalyzeError> {
        let bond_type = BondType::new(elem_a, elem_b);
        self.bond_type_ids.get(&bond_type).copied().ok_or_else(|| {
            AnalyzeError::config(format!(
                "the bond type {}-{} doesn't exist",
                self.element_name(bond_type.first),
                self.element_name(bond_type.second)
            ))
        })
    }

    /// Resolves the id of the bond type formed by two element names.
    pub fn bond_type_id_by_name(&self, elem_a: &str, elem_b: &str) -> Result<usize, AnalyzeError> {
        let elem_a: usize = self.element_index(elem_a)?;
        let elem_b: usize = self.element_index(elem_b)?;
        self.bond_type_id(elem_a, elem_b)
    }

    pub fn traversal_list(&self, id: usize) -> &[AtomPair] {
        &self.traversal_lists[id]
    }

    pub fn bond_count(&self, id: usize) -> usize {
        self.traversal_lists[id].len()
    }

    /// Label of a bond type, e.g. `C-H`.
    pub fn bond_type_label(&self, id: usize) -> String {
        let bond_type: BondType = self.bond_types[id];
        format!(
            "{}-{}",
            self.element_name(bond_type.first),
            self.element_name(bond_type.second)
        )
    }
}

fn enumerate_bond_types(element_atoms: &[Vec<usize>]) -> Vec<BondType> {
    let n_elements: usize = element_atoms.len();
    let mut bond_types: Vec<BondType> = Vec::new();
    for i in 0..n_elements {
        // a homonuclear pair needs at least two atoms of the element
        if element_atoms[i].len() > 1 {
            bond_types.push(BondType::new(i, i));
        }
        for j in (i + 1)..n_elements {
            bond_types.push(BondType::new(i, j));
        }
    }
    bond_types
}

fn build_traversal_list(bond_type: BondType, element_atoms: &[Vec<usize>]) -> Vec<AtomPair> {
    let first: &[usize] = &element_atoms[bond_type.first];
    if bond_type.is_homonuclear() {
        first
            .iter()
            .tuple_combinations()
            .map(|(i, j)| AtomPair { i: *i, j: *j })
            .collect()
    } else {
        let second: &[usize] = &element_atoms[bond_type.second];
        first
            .iter()
            .cartesian_product(second.iter())
            .map(|(i, j)| AtomPair { i: *i, j: *j })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    fn descriptor(elements: &[&str], atoms: &[&str]) -> SystemDescriptor {
        SystemDescriptor::new(None, elements, atoms).unwrap()
    }

    #[test]
    fn enumerates_bond_types_in_output_order() {
        let system = descriptor(&["A", "B"], &["A", "B", "A"]);
        assert_eq!(
            system.bond_types(),
            &[BondType::new(0, 0), BondType::new(0, 1)]
        );
        assert_eq!(system.bond_count(0), 1);
        assert_eq!(system.bond_count(1), 2);
        assert_eq!(system.traversal_list(0), &[AtomPair { i: 0, j: 2 }]);
        assert_eq!(
            system.traversal_list(1),
            &[AtomPair { i: 0, j: 1 }, AtomPair { i: 2, j: 1 }]
        );
    }

    #[test]
    fn skips_homonuclear_type_of_single_atom_elements() {
        let system = descriptor(&["C", "O", "H"], &["C", "O", "H", "H", "H", "H"]);
        let labels: Vec<String> = (0..system.n_bond_types())
            .map(|id| system.bond_type_label(id))
            .collect();
        assert_eq!(labels, vec!["C-O", "C-H", "O-H", "H-H"]);
        assert!(system.bond_type_id_by_name("C", "C").is_err());
        assert_eq!(system.bond_type_id_by_name("H", "O").unwrap(), 2);
    }

    #[test]
    fn traversal_lists_partition_all_atom_pairs() {
        let system = descriptor(
            &["C", "H", "O", "N"],
            &["H", "C", "H", "O", "N", "C", "H", "O", "H"],
        );
        let mut seen: BTreeSet<(usize, usize)> = BTreeSet::new();
        let mut total: usize = 0;
        for id in 0..system.n_bond_types() {
            for pair in system.traversal_list(id) {
                let key = (pair.i.min(pair.j), pair.i.max(pair.j));
                assert!(seen.insert(key), "pair {:?} listed twice", key);
                total += 1;
            }
        }
        let n_atoms: usize = system.n_atoms();
        assert_eq!(total, n_atoms * (n_atoms - 1) / 2);
        assert_eq!(total, system.total_bond_count());
    }

    #[test]
    fn traversal_pairs_match_their_bond_type() {
        let system = descriptor(&["C", "H"], &["H", "C", "H", "C", "H"]);
        for id in 0..system.n_bond_types() {
            let bond_type = system.bond_type(id);
            for pair in system.traversal_list(id) {
                assert_eq!(system.atom_element(pair.i), bond_type.first);
                assert_eq!(system.atom_element(pair.j), bond_type.second);
            }
        }
    }

    #[test]
    fn bond_type_is_normalized() {
        assert_eq!(BondType::new(3, 1), BondType::new(1, 3));
        assert_eq!(BondType::new(3, 1).first, 1);
        assert!(BondType::new(2, 2).is_homonuclear());
    }

    #[test]
    fn rejects_unknown_element() {
        let result = SystemDescriptor::new(None, &["C", "H"], &["C", "X"]);
        assert!(matches!(result, Err(AnalyzeError::Configuration(_))));
    }

    #[test]
    fn rejects_duplicate_and_unused_elements() {
        assert!(SystemDescriptor::new(None, &["C", "C"], &["C", "C"]).is_err());
        assert!(SystemDescriptor::new(None, &["C", "H"], &["C", "C"]).is_err());
    }

    #[test]
    fn rejects_empty_lists() {
        let none: [&str; 0] = [];
        assert!(SystemDescriptor::new(None, &none, &["C"]).is_err());
        assert!(SystemDescriptor::new(None, &["C"], &none).is_err());
    }
}
