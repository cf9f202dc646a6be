use crate::error::AnalyzeError;
use crate::initialization::{AtomPair, SystemDescriptor};
use crate::molecule::Bond;
use log::trace;
use ndarray::prelude::*;
use std::ops::BitOr;

/// Derived quantities computed for every frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameRequirements {
    /// upper triangle of the distance matrix, row by row
    pub distance_vector: bool,
    /// full symmetric N x N distance matrix
    pub distance_matrix: bool,
    /// bond lists grouped by bond type
    pub bonds: bool,
}

impl BitOr for FrameRequirements {
    type Output = FrameRequirements;

    fn bitor(self, rhs: FrameRequirements) -> FrameRequirements {
        FrameRequirements {
            distance_vector: self.distance_vector || rhs.distance_vector,
            distance_matrix: self.distance_matrix || rhs.distance_matrix,
            bonds: self.bonds || rhs.bonds,
        }
    }
}

/// One geometry of the trajectory with its energy and the distances derived
/// from its coordinates.
#[derive(Debug, Clone)]
pub struct Frame {
    energy: f64,
    coordinates: Array2<f64>,
    distance_vector: Option<Array1<f64>>,
    distance_matrix: Option<Array2<f64>>,
    bonds: Option<Vec<Vec<Bond>>>,
}

impl Frame {
    /// Creates a frame from coordinates of shape (n_atoms, 3) and computes
    /// the requested derived quantities.
    pub fn new(
        descriptor: &SystemDescriptor,
        energy: f64,
        coordinates: Array2<f64>,
        requirements: FrameRequirements,
    ) -> Result<Frame, AnalyzeError> {
        let n_atoms: usize = descriptor.n_atoms();
        if coordinates.dim() != (n_atoms, 3) {
            return Err(AnalyzeError::MalformedFrame(format!(
                "expected coordinates of shape ({}, 3), found {:?}",
                n_atoms,
                coordinates.dim()
            )));
        }

        let mut frame = Frame {
            energy,
            coordinates,
            distance_vector: None,
            distance_matrix: None,
            bonds: None,
        };
        if requirements.distance_vector {
            frame.distance_vector = Some(frame.calc_distance_vector());
        }
        if requirements.distance_matrix {
            frame.distance_matrix = Some(frame.calc_distance_matrix());
        }
        if requirements.bonds {
            frame.bonds = Some(frame.calc_bonds(descriptor));
        }
        Ok(frame)
    }

    pub fn energy(&self) -> f64 {
        self.energy
    }

    pub fn n_atoms(&self) -> usize {
        self.coordinates.nrows()
    }

    pub fn coordinates(&self) -> ArrayView2<f64> {
        self.coordinates.view()
    }

    /// Euclidean distance between atoms `i` and `j`.
    pub fn pairwise_distance(&self, i: usize, j: usize) -> f64 {
        if i == j {
            return 0.0;
        }
        if let Some(matrix) = &self.distance_matrix {
            return matrix[[i, j]];
        }
        if let Some(vector) = &self.distance_vector {
            return vector[upper_triangle_index(self.n_atoms(), i.min(j), i.max(j))];
        }
        self.calc_distance(i, j)
    }

    pub fn distance_matrix(&self) -> Result<ArrayView2<f64>, AnalyzeError> {
        self.distance_matrix
            .as_ref()
            .map(|matrix| matrix.view())
            .ok_or_else(|| AnalyzeError::config("the distance matrix was not computed"))
    }

    pub fn distance_vector(&self) -> Result<ArrayView1<f64>, AnalyzeError> {
        self.distance_vector
            .as_ref()
            .map(|vector| vector.view())
            .ok_or_else(|| AnalyzeError::config("the distance vector was not computed"))
    }

    /// Bonds of one bond type in traversal order.
    pub fn bonds(&self, bond_type: usize) -> Result<&[Bond], AnalyzeError> {
        let bonds: &Vec<Vec<Bond>> = self
            .bonds
            .as_ref()
            .ok_or_else(|| AnalyzeError::config("the bond lists were not computed"))?;
        bonds
            .get(bond_type)
            .map(|list| list.as_slice())
            .ok_or_else(|| AnalyzeError::config(format!("unknown bond type id {}", bond_type)))
    }

    fn calc_distance(&self, i: usize, j: usize) -> f64 {
        self.coordinates
            .row(i)
            .iter()
            .zip(self.coordinates.row(j).iter())
            .map(|(a, b)| (a - b).powi(2))
            .sum::<f64>()
            .sqrt()
    }

    fn calc_distance_vector(&self) -> Array1<f64> {
        let n_atoms: usize = self.n_atoms();
        let mut vector: Vec<f64> = Vec::with_capacity(n_atoms * n_atoms.saturating_sub(1) / 2);
        for i in 0..n_atoms {
            for j in (i + 1)..n_atoms {
                vector.push(self.calc_distance(i, j));
            }
        }
        trace!("distance vector: {}", vector.len());
        Array1::from(vector)
    }

    fn calc_distance_matrix(&self) -> Array2<f64> {
        let n_atoms: usize = self.n_atoms();
        let mut matrix: Array2<f64> = Array2::zeros((n_atoms, n_atoms));
        for i in 0..n_atoms {
            for j in (i + 1)..n_atoms {
                let distance: f64 = self.pairwise_distance(i, j);
                matrix[[i, j]] = distance;
                matrix[[j, i]] = distance;
            }
        }
        trace!("distance matrix:\n{}", matrix);
        matrix
    }

    fn calc_bonds(&self, descriptor: &SystemDescriptor) -> Vec<Vec<Bond>> {
        (0..descriptor.n_bond_types())
            .map(|id| {
                let bonds: Vec<Bond> = descriptor
                    .traversal_list(id)
                    .iter()
                    .map(|pair: &AtomPair| Bond {
                        length: self.pairwise_distance(pair.i, pair.j),
                        atom_a: pair.i,
                        atom_b: pair.j,
                        elem_a: descriptor.atom_element(pair.i),
                        elem_b: descriptor.atom_element(pair.j),
                    })
                    .collect();
                trace!(
                    "{}: {:?}",
                    descriptor.bond_type_label(id),
                    bonds.iter().map(|bond| bond.length).collect::<Vec<f64>>()
                );
                bonds
            })
            .collect()
    }
}

/// Position of the pair (i, j), i < j, in the row-major upper triangle.
fn upper_triangle_index(n_atoms: usize, i: usize, j: usize) -> usize {
    i * n_atoms - i * (i + 1) / 2 + (j - i - 1)
}
