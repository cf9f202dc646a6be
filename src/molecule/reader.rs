use crate::error::AnalyzeError;
use crate::initialization::SystemDescriptor;
use crate::molecule::{Frame, FrameRequirements};
use ndarray::prelude::*;
use std::io::BufRead;

/// Reads frames from an xyz-like trajectory. Every block is made of the
/// number of atoms, a line starting with the energy and one
/// `<label> x y z` line per atom.
pub struct TrajectoryReader<R: BufRead> {
    source: R,
    line_number: usize,
    buffer: String,
}

impl<R: BufRead> TrajectoryReader<R> {
    pub fn new(source: R) -> Self {
        TrajectoryReader {
            source,
            line_number: 0,
            buffer: String::new(),
        }
    }

    /// Number of lines consumed so far.
    pub fn line_number(&self) -> usize {
        self.line_number
    }

    /// Reads the next frame. Returns `Ok(None)` at the end of the input.
    pub fn read_frame(
        &mut self,
        descriptor: &SystemDescriptor,
        requirements: FrameRequirements,
    ) -> Result<Option<Frame>, AnalyzeError> {
        // skip empty lines between two blocks
        loop {
            if !self.next_line()? {
                return Ok(None);
            }
            if !self.buffer.trim().is_empty() {
                break;
            }
        }

        let n_atoms: usize = descriptor.n_atoms();
        let count_token: &str = self.buffer.split_whitespace().next().unwrap_or_default();
        let count: usize = count_token.parse::<usize>().map_err(|_| {
            AnalyzeError::parse(
                self.line_number,
                format!("expected the number of atoms, found '{}'", count_token),
            )
        })?;
        if count != n_atoms {
            return Err(AnalyzeError::parse(
                self.line_number,
                format!(
                    "frame has {} atoms but the system description has {}",
                    count, n_atoms
                ),
            ));
        }

        self.expect_line("the energy line")?;
        // the energy is the first token, the rest of the line is free text
        let energy_token: &str = self.buffer.split_whitespace().next().unwrap_or_default();
        let energy: f64 = parse_finite(energy_token).ok_or_else(|| {
            AnalyzeError::parse(
                self.line_number,
                format!("expected the energy as first token, found '{}'", energy_token),
            )
        })?;

        let mut coordinates: Array2<f64> = Array2::zeros((n_atoms, 3));
        for atom in 0..n_atoms {
            self.expect_line("an atom line")?;
            let mut tokens = self.buffer.split_whitespace();
            // the element label is not checked against the system description
            let _label = tokens.next();
            for item in 0..3 {
                let token: &str = tokens.next().ok_or_else(|| {
                    AnalyzeError::parse(
                        self.line_number,
                        format!("atom {} has fewer than 3 coordinates", atom + 1),
                    )
                })?;
                coordinates[[atom, item]] = parse_finite(token).ok_or_else(|| {
                    AnalyzeError::parse(
                        self.line_number,
                        format!("invalid coordinate '{}' of atom {}", token, atom + 1),
                    )
                })?;
            }
        }

        Frame::new(descriptor, energy, coordinates, requirements).map(Some)
    }

    fn next_line(&mut self) -> Result<bool, AnalyzeError> {
        self.buffer.clear();
        let bytes: usize = self.source.read_line(&mut self.buffer)?;
        if bytes == 0 {
            return Ok(false);
        }
        self.line_number += 1;
        Ok(true)
    }

    fn expect_line(&mut self, what: &str) -> Result<(), AnalyzeError> {
        if self.next_line()? {
            Ok(())
        } else {
            Err(AnalyzeError::parse(
                self.line_number + 1,
                format!("unexpected end of input, expected {}", what),
            ))
        }
    }
}

/// Parses a number, rejecting `nan` and `inf`.
fn parse_finite(token: &str) -> Option<f64> {
    token.parse::<f64>().ok().filter(|value| value.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const WATER: &str = "\
3
-76.4
O 0.0 0.0 0.0
H 0.96 0.0 0.0
H -0.24 0.93 0.0

3
 -76.3 step 2
O 0.0 0.0 0.1
H 1.0 0.0 0.0
H -0.25 0.95 0.0
";

    fn water() -> SystemDescriptor {
        SystemDescriptor::new(None, &["O", "H"], &["O", "H", "H"]).unwrap()
    }

    fn bonds_only() -> FrameRequirements {
        FrameRequirements {
            bonds: true,
            ..FrameRequirements::default()
        }
    }

    #[test]
    fn reads_consecutive_frames() {
        let system = water();
        let mut reader = TrajectoryReader::new(WATER.as_bytes());
        let first = reader.read_frame(&system, bonds_only()).unwrap().unwrap();
        assert_relative_eq!(first.energy(), -76.4);
        assert_relative_eq!(first.coordinates()[[1, 0]], 0.96);
        let second = reader.read_frame(&system, bonds_only()).unwrap().unwrap();
        assert_relative_eq!(second.energy(), -76.3);
        assert_relative_eq!(second.coordinates()[[0, 2]], 0.1);
        assert!(reader.read_frame(&system, bonds_only()).unwrap().is_none());
        assert_eq!(reader.line_number(), 11);
    }

    #[test]
    fn atom_count_must_match_description() {
        let system = water();
        let input = "2\n0.0\nO 0 0 0\nH 1 0 0\n";
        let mut reader = TrajectoryReader::new(input.as_bytes());
        let result = reader.read_frame(&system, bonds_only());
        assert!(matches!(result, Err(AnalyzeError::Parse { line: 1, .. })));
    }

    #[test]
    fn truncated_frame_is_a_parse_error() {
        let system = water();
        let input = "3\n-1.0\nO 0 0 0\nH 1 0 0\n";
        let mut reader = TrajectoryReader::new(input.as_bytes());
        let result = reader.read_frame(&system, bonds_only());
        assert!(matches!(result, Err(AnalyzeError::Parse { line: 5, .. })));
    }

    #[test]
    fn missing_coordinate_is_a_parse_error() {
        let system = water();
        let input = "3\n-1.0\nO 0 0 0\nH 1 0\nH 0 1 0\n";
        let mut reader = TrajectoryReader::new(input.as_bytes());
        let result = reader.read_frame(&system, bonds_only());
        assert!(matches!(result, Err(AnalyzeError::Parse { line: 4, .. })));
    }

    #[test]
    fn energy_is_the_first_token_only() {
        let system = water();
        let input = "3\nstep 10 energy -76.4\nO 0 0 0\nH 1 0 0\nH 0 1 0\n";
        let mut reader = TrajectoryReader::new(input.as_bytes());
        let result = reader.read_frame(&system, bonds_only());
        assert!(matches!(result, Err(AnalyzeError::Parse { line: 2, .. })));
    }

    #[test]
    fn non_finite_values_are_rejected() {
        let system = water();
        let input = "3\n-1.0\nO 0 0 0\nH nan 0 0\nH 0 1 0\n";
        let mut reader = TrajectoryReader::new(input.as_bytes());
        let result = reader.read_frame(&system, bonds_only());
        assert!(matches!(result, Err(AnalyzeError::Parse { line: 4, .. })));

        let input = "3\ninf\nO 0 0 0\nH 1 0 0\nH 0 1 0\n";
        let mut reader = TrajectoryReader::new(input.as_bytes());
        let result = reader.read_frame(&system, bonds_only());
        assert!(matches!(result, Err(AnalyzeError::Parse { line: 2, .. })));
    }

    #[test]
    fn energy_must_be_numeric() {
        let system = water();
        let input = "3\nno energy here\nO 0 0 0\nH 1 0 0\nH 0 1 0\n";
        let mut reader = TrajectoryReader::new(input.as_bytes());
        assert!(reader.read_frame(&system, bonds_only()).is_err());
    }

    #[test]
    fn empty_input_has_no_frames() {
        let system = water();
        let mut reader = TrajectoryReader::new("\n\n".as_bytes());
        assert!(reader.read_frame(&system, bonds_only()).unwrap().is_none());
    }
}
