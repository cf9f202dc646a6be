pub use atom::*;
pub use bond::*;
pub use rule::*;

pub mod atom;
pub mod bond;
pub mod rule;

use crate::error::AnalyzeError;
use crate::initialization::SystemDescriptor;
use crate::molecule::{Frame, FrameRequirements};

/// A configured rule mapping a frame to one value.
#[derive(Debug, Clone, PartialEq)]
pub enum Rule {
    Bond(BondFinder),
    Atom(AtomFinder),
}

impl Rule {
    /// Resolves the element names of a rule against the system description.
    pub fn new(descriptor: &SystemDescriptor, spec: &RuleSpec) -> Result<Rule, AnalyzeError> {
        match spec {
            RuleSpec::Bond {
                elem_a,
                elem_b,
                direction,
                rank,
            } => BondFinder::new(descriptor, elem_a, elem_b, *direction, *rank).map(Rule::Bond),
            RuleSpec::Atom { first, second } => {
                AtomFinder::new(descriptor, first, second).map(Rule::Atom)
            }
        }
    }

    /// Derived quantities a frame must provide for this rule.
    pub fn requirements(&self) -> FrameRequirements {
        match self {
            Rule::Bond(_) => FrameRequirements {
                bonds: true,
                ..FrameRequirements::default()
            },
            Rule::Atom(_) => FrameRequirements {
                bonds: true,
                distance_matrix: true,
                ..FrameRequirements::default()
            },
        }
    }

    pub fn check_rank(&self, descriptor: &SystemDescriptor) -> Result<(), AnalyzeError> {
        match self {
            Rule::Bond(finder) => finder.check_rank(descriptor),
            Rule::Atom(finder) => finder.check_rank(descriptor),
        }
    }

    pub fn evaluate(&self, frame: &Frame) -> Result<f64, AnalyzeError> {
        match self {
            Rule::Bond(finder) => finder.evaluate(frame),
            Rule::Atom(finder) => finder.evaluate(frame),
        }
    }
}
