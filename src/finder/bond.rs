use crate::error::AnalyzeError;
use crate::initialization::SystemDescriptor;
use crate::molecule::{select_bond, Frame, SortDirection};
use log::debug;

/// Selects the length of the bond at `rank` of one bond type after sorting
/// its bonds by length.
#[derive(Debug, Clone, PartialEq)]
pub struct BondFinder {
    bond_type: usize,
    label: String,
    direction: SortDirection,
    rank: usize,
}

impl BondFinder {
    pub fn new(
        descriptor: &SystemDescriptor,
        elem_a: &str,
        elem_b: &str,
        direction: SortDirection,
        rank: usize,
    ) -> Result<BondFinder, AnalyzeError> {
        if rank == 0 {
            return Err(AnalyzeError::config("the rank of a bond rule starts at 1"));
        }
        let bond_type: usize = descriptor.bond_type_id_by_name(elem_a, elem_b)?;
        let label: String = descriptor.bond_type_label(bond_type);
        debug!("bond finder: {} {:?} rank {}", label, direction, rank);
        Ok(BondFinder {
            bond_type,
            label,
            direction,
            rank,
        })
    }

    /// Fails if the rank exceeds the number of bonds of the bond type. The
    /// count is fixed by the topology, so this holds for every frame.
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

    pub fn evaluate(&self, frame: &Frame) -> Result<f64, AnalyzeError> {
        let bond = select_bond(
            frame.bonds(self.bond_type)?,
            self.direction,
            self.rank,
            &self.label,
        )?;
        Ok(bond.length)
    }
}
