use crate::error::AnalyzeError;
use crate::molecule::SortDirection;
use log::debug;
use std::fmt;
use std::io::BufRead;

/// One endpoint selection of an `atom` rule: sort the `pair_i`-`pair_j`
/// bonds, take the bond at `rank` and keep its `anchor` atom.
#[derive(Debug, Clone, PartialEq)]
pub struct AnchorSpec {
    pub anchor: String,
    pub pair_i: String,
    pub pair_j: String,
    pub direction: SortDirection,
    pub rank: usize,
}

/// A rule as written by the user, before the element names are resolved.
#[derive(Debug, Clone, PartialEq)]
pub enum RuleSpec {
    /// `bond <elemA> <elemB> <min|max> <rank>`
    Bond {
        elem_a: String,
        elem_b: String,
        direction: SortDirection,
        rank: usize,
    },
    /// `atom <anchor> <i> <j> <min|max> <rank> <anchor> <i> <j> <min|max> <rank>`
    Atom {
        first: AnchorSpec,
        second: AnchorSpec,
    },
}

fn direction_keyword(direction: SortDirection) -> &'static str {
    match direction {
        SortDirection::Ascending => "min",
        SortDirection::Descending => "max",
    }
}

impl fmt::Display for AnchorSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {} {}",
            self.anchor,
            self.pair_i,
            self.pair_j,
            direction_keyword(self.direction),
            self.rank
        )
    }
}

impl fmt::Display for RuleSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuleSpec::Bond {
                elem_a,
                elem_b,
                direction,
                rank,
            } => write!(
                f,
                "bond {} {} {} {}",
                elem_a,
                elem_b,
                direction_keyword(*direction),
                rank
            ),
            RuleSpec::Atom { first, second } => write!(f, "atom {} {}", first, second),
        }
    }
}

struct Tokens<'a> {
    inner: std::str::SplitWhitespace<'a>,
    line_number: usize,
}

impl<'a> Tokens<'a> {
    fn word(&mut self, what: &str) -> Result<String, AnalyzeError> {
        self.inner
            .next()
            .map(String::from)
            .ok_or_else(|| AnalyzeError::parse(self.line_number, format!("missing {}", what)))
    }

    fn direction(&mut self) -> Result<SortDirection, AnalyzeError> {
        let word: String = self.word("sort direction")?;
        word.parse::<SortDirection>()
            .map_err(|details| AnalyzeError::parse(self.line_number, details))
    }

    fn rank(&mut self) -> Result<usize, AnalyzeError> {
        let word: String = self.word("rank")?;
        word.parse::<usize>().map_err(|_| {
            AnalyzeError::parse(
                self.line_number,
                format!("rank must be a positive integer, found '{}'", word),
            )
        })
    }

    fn anchor(&mut self) -> Result<AnchorSpec, AnalyzeError> {
        Ok(AnchorSpec {
            anchor: self.word("anchor element")?,
            pair_i: self.word("bond element")?,
            pair_j: self.word("bond element")?,
            direction: self.direction()?,
            rank: self.rank()?,
        })
    }
}

/// Parses a single rule line. `line_number` is only used for diagnostics.
pub fn parse_rule(line: &str, line_number: usize) -> Result<RuleSpec, AnalyzeError> {
    let mut tokens = Tokens {
        inner: line.split_whitespace(),
        line_number,
    };
    let kind: String = tokens.word("rule kind")?;
    let rule: RuleSpec = match kind.as_str() {
        "bond" => RuleSpec::Bond {
            elem_a: tokens.word("bond element")?,
            elem_b: tokens.word("bond element")?,
            direction: tokens.direction()?,
            rank: tokens.rank()?,
        },
        "atom" => RuleSpec::Atom {
            first: tokens.anchor()?,
            second: tokens.anchor()?,
        },
        _ => {
            return Err(AnalyzeError::parse(
                line_number,
                format!("invalid rule '{}', expected 'bond' or 'atom'", kind),
            ))
        }
    };
    if let Some(extra) = tokens.inner.next() {
        return Err(AnalyzeError::parse(
            line_number,
            format!("unexpected token '{}' after the rule", extra),
        ));
    }
    Ok(rule)
}

/// Parses a rule file with one rule per line. Empty lines and lines
/// starting with `#` are skipped.
pub fn read_rules<R: BufRead>(reader: R) -> Result<Vec<RuleSpec>, AnalyzeError> {
    let mut rules: Vec<RuleSpec> = Vec::new();
    for (index, line) in reader.lines().enumerate() {
        let line: String = line?;
        let trimmed: &str = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let rule: RuleSpec = parse_rule(trimmed, index + 1)?;
        debug!("rule {}: {}", rules.len() + 1, rule);
        rules.push(rule);
    }
    Ok(rules)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_bond_rule() {
        let rule = parse_rule("bond C H max 2", 1).unwrap();
        assert_eq!(
            rule,
            RuleSpec::Bond {
                elem_a: String::from("C"),
                elem_b: String::from("H"),
                direction: SortDirection::Descending,
                rank: 2,
            }
        );
        assert_eq!(rule.to_string(), "bond C H max 2");
    }

    #[test]
    fn parses_atom_rule() {
        let rule = parse_rule("atom O O H min 1  C C H max 3", 1).unwrap();
        match &rule {
            RuleSpec::Atom { first, second } => {
                assert_eq!(first.anchor, "O");
                assert_eq!(first.direction, SortDirection::Ascending);
                assert_eq!(second.pair_j, "H");
                assert_eq!(second.rank, 3);
            }
            _ => panic!("expected an atom rule"),
        }
        assert_eq!(rule.to_string(), "atom O O H min 1 C C H max 3");
    }

    #[test]
    fn rejects_malformed_rules() {
        assert!(parse_rule("angle C H C", 1).is_err());
        assert!(parse_rule("bond C H", 1).is_err());
        assert!(parse_rule("bond C H up 1", 1).is_err());
        assert!(parse_rule("bond C H min one", 1).is_err());
        assert!(parse_rule("bond C H min 1 extra", 1).is_err());
        assert!(parse_rule("atom O O H min 1", 1).is_err());
    }

    #[test]
    fn reads_rule_file() {
        let input = "# distances\nbond C H min 1\n\n   \natom H C H min 1 O O H min 1\n";
        let rules = read_rules(input.as_bytes()).unwrap();
        assert_eq!(rules.len(), 2);
        assert!(matches!(rules[1], RuleSpec::Atom { .. }));
    }

    #[test]
    fn rule_file_errors_carry_line_number() {
        let input = "bond C H min 1\n# comment\nbond C H sideways 1\n";
        let result = read_rules(input.as_bytes());
        assert!(matches!(result, Err(AnalyzeError::Parse { line: 3, .. })));
    }
}
