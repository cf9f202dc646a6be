use anyhow::{bail, Context, Result};
use bond_analyze::analysis::Analysis;
use bond_analyze::defaults::{OUTPUT_EXTENSION, VERBOSE};
use bond_analyze::finder::{parse_rule, read_rules, RuleSpec};
use bond_analyze::initialization::{
    load_system_descriptor, system_descriptor_path, AnalysisConfiguration, SystemDescriptor,
};
use bond_analyze::molecule::TrajectoryReader;
use bond_analyze::output::{ReportFormat, ReportWriter};
use clap::{crate_name, crate_version, Arg, ArgAction, ArgMatches, Command};
use env_logger::Builder;
use log::{error, info, warn, LevelFilter};
use std::convert::TryFrom;
use std::fs::{self, File};
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process;

fn cli() -> Command<'static> {
    Command::new(crate_name!())
        .version(crate_version!())
        .about("extracts bond lengths from molecular trajectories")
        .arg(
            Arg::new("trajectory")
                .help("Sets the xyz trajectory to analyze, reads stdin if omitted")
                .index(1),
        )
        .arg(
            Arg::new("system")
                .short('s')
                .long("system")
                .takes_value(true)
                .value_name("FILE")
                .help("System description, defaults to $MOLECULE_DIR/.$MOLECULE"),
        )
        .arg(
            Arg::new("find")
                .short('f')
                .long("find")
                .takes_value(true)
                .value_name("RULE")
                .conflicts_with("rules")
                .help("Evaluates a single rule, e.g. \"bond C H min 1\""),
        )
        .arg(
            Arg::new("rules")
                .short('r')
                .long("rules")
                .takes_value(true)
                .value_name("FILE")
                .help("Evaluates the rules of a rule file"),
        )
        .arg(
            Arg::new("no-header")
                .short('n')
                .long("no-header")
                .action(ArgAction::SetTrue)
                .help("Does not print the header line"),
        )
        .arg(
            Arg::new("no-energy")
                .short('e')
                .long("no-energy")
                .action(ArgAction::SetTrue)
                .help("Does not print the energy column"),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .action(ArgAction::Count)
                .help("Increases the print level"),
        )
}

fn main() {
    let matches: ArgMatches = cli().get_matches();
    let config: Result<AnalysisConfiguration> =
        AnalysisConfiguration::new().context("unable to load the configuration");

    let verbose: i8 = verbose_level(
        config.as_ref().map(|config| config.verbose).unwrap_or(VERBOSE),
        matches.get_count("verbose"),
    );
    Builder::new()
        .format(|buf, record| writeln!(buf, "{}", record.args()))
        .filter(None, log_level(verbose))
        .init();

    if let Err(err) = config.and_then(|config| run(&matches, config)) {
        error!("Error: {:#}", err);
        process::exit(1);
    }
}

/// Print level from the configured value and the number of `-v` flags.
fn verbose_level(configured: i8, flags: u8) -> i8 {
    configured.saturating_add(i8::try_from(flags).unwrap_or(i8::MAX))
}

fn log_level(verbose: i8) -> LevelFilter {
    match verbose {
        v if v >= 2 => LevelFilter::Trace,
        1 => LevelFilter::Debug,
        0 => LevelFilter::Info,
        -1 => LevelFilter::Warn,
        _ => LevelFilter::Error,
    }
}

fn run(matches: &ArgMatches, mut config: AnalysisConfiguration) -> Result<()> {
    if matches.get_flag("no-header") {
        config.print_header = false;
    }
    if matches.get_flag("no-energy") {
        config.print_energy = false;
    }

    let system_path: PathBuf =
        system_descriptor_path(matches.get_one::<String>("system").map(Path::new))?;
    let descriptor: SystemDescriptor = load_system_descriptor(&system_path)
        .with_context(|| format!("invalid system description {}", system_path.display()))?;

    let specs: Vec<RuleSpec> = if let Some(rule) = matches.get_one::<String>("find") {
        vec![parse_rule(rule, 1).context("invalid rule")?]
    } else if let Some(rule_file) = matches.get_one::<String>("rules") {
        let file = File::open(rule_file)
            .with_context(|| format!("unable to open rule file {}", rule_file))?;
        read_rules(BufReader::new(file))
            .with_context(|| format!("invalid rule file {}", rule_file))?
    } else {
        Vec::new()
    };

    let analysis = Analysis::new(&descriptor, &specs)?
        .with_sorted_full_report(config.sort_full_report);

    // a trajectory file gets its report next to it, stdin goes to stdout
    let (input, output, report_path): (Box<dyn BufRead>, Box<dyn Write>, Option<PathBuf>) =
        match matches.get_one::<String>("trajectory") {
            Some(trajectory) => {
                let input_path: &Path = Path::new(trajectory);
                let output_path: PathBuf = input_path.with_extension(OUTPUT_EXTENSION);
                if output_path == input_path {
                    bail!(
                        "the trajectory {} would be overwritten by the report",
                        trajectory
                    );
                }
                let file = File::open(input_path)
                    .with_context(|| format!("unable to open trajectory {}", trajectory))?;
                let report = File::create(&output_path).with_context(|| {
                    format!("unable to create report {}", output_path.display())
                })?;
                info!("report: {}", output_path.display());
                (
                    Box::new(BufReader::new(file)) as Box<dyn BufRead>,
                    Box::new(BufWriter::new(report)) as Box<dyn Write>,
                    Some(output_path),
                )
            }
            None => (
                Box::new(BufReader::new(io::stdin())) as Box<dyn BufRead>,
                Box::new(BufWriter::new(io::stdout())) as Box<dyn Write>,
                None,
            ),
        };

    let mut writer = ReportWriter::new(output, ReportFormat::from(&config));
    let result = analysis.run(TrajectoryReader::new(input), &mut writer);
    drop(writer);
    if let (Err(_), Some(path)) = (&result, &report_path) {
        // no partial reports
        warn!("removing incomplete report {}", path.display());
        if let Err(err) = fs::remove_file(path) {
            warn!("unable to remove {}: {}", path.display(), err);
        }
    }
    result.map(|_| ())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbose_level_saturates() {
        assert_eq!(verbose_level(0, 2), 2);
        assert_eq!(verbose_level(-1, 0), -1);
        assert_eq!(verbose_level(120, 20), i8::MAX);
        assert_eq!(verbose_level(0, u8::MAX), i8::MAX);
        assert_eq!(log_level(verbose_level(i8::MAX, 1)), LevelFilter::Trace);
        assert_eq!(log_level(verbose_level(i8::MIN, 0)), LevelFilter::Error);
    }

    #[test]
    fn find_and_rules_conflict() {
        let result = cli().try_get_matches_from(vec![
            "bond-analyze",
            "-f",
            "bond O H min 1",
            "-r",
            "rules.txt",
        ]);
        assert!(result.is_err());
        let matches = cli()
            .try_get_matches_from(vec!["bond-analyze", "-n", "-vv", "traj.xyz"])
            .unwrap();
        assert!(matches.get_flag("no-header"));
        assert_eq!(matches.get_count("verbose"), 2);
        assert_eq!(
            matches.get_one::<String>("trajectory").map(String::as_str),
            Some("traj.xyz")
        );
    }
}
