use crate::error::AnalyzeError;
use crate::finder::AnchorSpec;
use crate::initialization::SystemDescriptor;
use crate::molecule::{select_bond, Frame, SortDirection};
use log::debug;

/// Locates one atom: sorts the bonds of a heteronuclear bond type, takes the
/// bond at `rank` and keeps the endpoint of the anchor element.
#[derive(Debug, Clone, PartialEq)]
pub struct Anchor {
    elem: usize,
    bond_type: usize,
    label: String,
    direction: SortDirection,
    rank: usize,
}

impl Anchor {
    pub fn new(descriptor: &SystemDescriptor, spec: &AnchorSpec) -> Result<Anchor, AnalyzeError> {
        if spec.pair_i == spec.pair_j {
            return Err(AnalyzeError::config(format!(
                "anchor bond {}-{} must join two different elements",
                spec.pair_i, spec.pair_j
            )));
        }
        if spec.anchor != spec.pair_i && spec.anchor != spec.pair_j {
            return Err(AnalyzeError::config(format!(
                "anchor element {} is not part of the bond {}-{}",
                spec.anchor, spec.pair_i, spec.pair_j
            )));
        }
        if spec.rank == 0 {
            return Err(AnalyzeError::config("the rank of an atom rule starts at 1"));
        }
        let elem: usize = descriptor.element_index(&spec.anchor)?;
        let bond_type: usize = descriptor.bond_type_id_by_name(&spec.pair_i, &spec.pair_j)?;
        Ok(Anchor {
            elem,
            bond_type,
            label: descriptor.bond_type_label(bond_type),
            direction: spec.direction,
            rank: spec.rank,
        })
    }

    pub fn check_rank(&self, descriptor: &SystemDescriptor) -> Result<(), AnalyzeError> {
        let available: usize = descriptor.bond_count(self.bond_type);
        if self.rank > available {
            return Err(AnalyzeError::Index {
                bond_type: self.label.clone(),
                rank: self.rank,
                available,
            });
        }
        Ok(())
    }

    /// Index of the selected atom in this frame.
    pub fn select_atom(&self, frame: &Frame) -> Result<usize, AnalyzeError> {
        let bond = select_bond(
            frame.bonds(self.bond_type)?,
            self.direction,
            self.rank,
            &self.label,
        )?;
        // the bond type is heteronuclear and contains the anchor element
        bond.atom_of(self.elem).ok_or_else(|| {
            AnalyzeError::config(format!("bond {} has no anchor atom", self.label))
        })
    }
}

/// Distance between the atoms located by two independent anchors.
#[derive(Debug, Clone, PartialEq)]
pub struct AtomFinder {
    first: Anchor,
    second: Anchor,
}

impl AtomFinder {
    pub fn new(
        descriptor: &SystemDescriptor,
        first: &AnchorSpec,
        second: &AnchorSpec,
    ) -> Result<AtomFinder, AnalyzeError> {
        let first = Anchor::new(descriptor, first)?;
        let second = Anchor::new(descriptor, second)?;
        debug!(
            "atom finder: {} rank {} <-> {} rank {}",
            first.label, first.rank, second.label, second.rank
        );
        Ok(AtomFinder { first, second })
    }

    pub fn check_rank(&self, descriptor: &SystemDescriptor) -> Result<(), AnalyzeError> {
        self.first.check_rank(descriptor)?;
        self.second.check_rank(descriptor)
    }

    /// Reads the distance from the full distance matrix of the frame.
    pub fn evaluate(&self, frame: &Frame) -> Result<f64, AnalyzeError> {
        let atom_a: usize = self.first.select_atom(frame)?;
        let atom_b: usize = self.second.select_atom(frame)?;
        Ok(frame.distance_matrix()?[[atom_a, atom_b]])
    }
}
