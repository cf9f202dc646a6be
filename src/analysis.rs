use crate::finder::{Rule, RuleSpec};
use crate::initialization::SystemDescriptor;
use crate::molecule::{sorted_bonds, Frame, FrameRequirements, SortDirection, TrajectoryReader};
use crate::output::ReportWriter;
use anyhow::{Context, Result};
use log::{debug, info};
use std::io::{BufRead, Write};

/// The per-frame work of a run: either the configured rules in order or,
/// without rules, every bond length of every bond type.
pub struct Analysis<'a> {
    descriptor: &'a SystemDescriptor,
    rules: Vec<(RuleSpec, Rule)>,
    requirements: FrameRequirements,
    sort_full_report: bool,
}

impl<'a> Analysis<'a> {
    /// Resolves the rules and checks their ranks against the topology, so
    /// that configuration errors stop the run before the first frame.
    pub fn new(descriptor: &'a SystemDescriptor, specs: &[RuleSpec]) -> Result<Analysis<'a>> {
        let mut rules: Vec<(RuleSpec, Rule)> = Vec::with_capacity(specs.len());
        let mut requirements = FrameRequirements {
            bonds: true,
            ..FrameRequirements::default()
        };
        for (index, spec) in specs.iter().enumerate() {
            let rule: Rule = Rule::new(descriptor, spec)
                .and_then(|rule| rule.check_rank(descriptor).map(|_| rule))
                .with_context(|| format!("invalid rule {} ({})", index + 1, spec))?;
            requirements = requirements | rule.requirements();
            rules.push((spec.clone(), rule));
        }
        debug!("frame requirements: {:?}", requirements);

        Ok(Analysis {
            descriptor,
            rules,
            requirements,
            sort_full_report: false,
        })
    }

    /// Sorts the bond lengths of each bond type in the full report.
    pub fn with_sorted_full_report(mut self, sort: bool) -> Self {
        self.sort_full_report = sort;
        self
    }

    pub fn requirements(&self) -> FrameRequirements {
        self.requirements
    }

    pub fn is_full_report(&self) -> bool {
        self.rules.is_empty()
    }

    /// Column labels: `rule<k>` for rules, `<A>-<B>(<k>)` for the full report.
    pub fn column_labels(&self) -> Vec<String> {
        if self.is_full_report() {
            (0..self.descriptor.n_bond_types())
                .flat_map(|id| {
                    let label: String = self.descriptor.bond_type_label(id);
                    (1..=self.descriptor.bond_count(id))
                        .map(move |k| format!("{}({})", label, k))
                })
                .collect()
        } else {
            (1..=self.rules.len())
                .map(|k| format!("rule{}", k))
                .collect()
        }
    }

    /// All values of one frame in column order.
    pub fn evaluate(&self, frame: &Frame) -> Result<Vec<f64>> {
        if self.is_full_report() {
            let mut values: Vec<f64> = Vec::with_capacity(self.descriptor.total_bond_count());
            for id in 0..self.descriptor.n_bond_types() {
                let bonds = frame.bonds(id)?;
                if self.sort_full_report {
                    let sorted = sorted_bonds(bonds, SortDirection::Ascending);
                    values.extend(sorted.iter().map(|bond| bond.length));
                } else {
                    values.extend(bonds.iter().map(|bond| bond.length));
                }
            }
            return Ok(values);
        }

        self.rules
            .iter()
            .enumerate()
            .map(|(index, (spec, rule))| {
                rule.evaluate(frame)
                    .with_context(|| format!("rule {} ({}) failed", index + 1, spec))
            })
            .collect()
    }

    /// Processes the whole trajectory and returns the number of frames.
    /// The first error aborts the run.
    pub fn run<R: BufRead, W: Write>(
        &self,
        mut reader: TrajectoryReader<R>,
        writer: &mut ReportWriter<W>,
    ) -> Result<usize> {
        writer.write_header(&self.column_labels())?;

        let mut n_frames: usize = 0;
        while let Some(frame) = reader
            .read_frame(self.descriptor, self.requirements)
            .with_context(|| format!("unable to read frame {}", n_frames + 1))?
        {
            n_frames += 1;
            let values: Vec<f64> = self
                .evaluate(&frame)
                .with_context(|| format!("frame {}", n_frames))?;
            writer.write_row(&values, frame.energy())?;
        }
        writer.flush()?;

        info!("processed {} frames", n_frames);
        Ok(n_frames)
    }
}
