use crate::defaults::*;
use crate::error::AnalyzeError;
use crate::initialization::SystemDescriptor;
use log::{debug, info};
use serde::Deserialize;
use std::env;
use std::fs;
use std::io::BufRead;
use std::path::{Path, PathBuf};

fn default_verbose() -> i8 {
    VERBOSE
}
fn default_data_width() -> usize {
    DATA_WIDTH
}
fn default_data_precision() -> usize {
    DATA_PRECISION
}
fn default_blank_width() -> usize {
    BLANK_WIDTH
}
fn default_print_header() -> bool {
    PRINT_HEADER
}
fn default_print_energy() -> bool {
    PRINT_ENERGY
}
fn default_sort_full_report() -> bool {
    SORT_FULL_REPORT
}

/// Settings of the report and the logging, read from `bond_analyze.toml`.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct AnalysisConfiguration {
    #[serde(default = "default_verbose")]
    pub verbose: i8,
    #[serde(default = "default_data_width")]
    pub data_width: usize,
    #[serde(default = "default_data_precision")]
    pub data_precision: usize,
    #[serde(default = "default_blank_width")]
    pub blank_width: usize,
    #[serde(default = "default_print_header")]
    pub print_header: bool,
    #[serde(default = "default_print_energy")]
    pub print_energy: bool,
    #[serde(default = "default_sort_full_report")]
    pub sort_full_report: bool,
}

impl Default for AnalysisConfiguration {
    fn default() -> Self {
        AnalysisConfiguration {
            verbose: VERBOSE,
            data_width: DATA_WIDTH,
            data_precision: DATA_PRECISION,
            blank_width: BLANK_WIDTH,
            print_header: PRINT_HEADER,
            print_energy: PRINT_ENERGY,
            sort_full_report: SORT_FULL_REPORT,
        }
    }
}

impl AnalysisConfiguration {
    /// Reads the configuration file of the working directory. Missing
    /// options (or a missing file) fall back to the defaults.
    pub fn new() -> Result<Self, AnalyzeError> {
        let config_file_path: &Path = Path::new(CONFIG_FILE_NAME);
        let config_string: String = if config_file_path.exists() {
            fs::read_to_string(config_file_path)?
        } else {
            String::new()
        };
        Self::from_toml(&config_string)
    }

    pub fn from_toml(config_string: &str) -> Result<Self, AnalyzeError> {
        let config: Self = toml::from_str(config_string).map_err(|err| {
            AnalyzeError::config(format!("invalid {}: {}", CONFIG_FILE_NAME, err))
        })?;
        if config.data_precision == 0 {
            return Err(AnalyzeError::config("data_precision must be at least 1"));
        }
        Ok(config)
    }
}

/// Location of the system description: an explicit path wins, otherwise
/// `$MOLECULE_DIR/.$MOLECULE` is used.
pub fn system_descriptor_path(explicit: Option<&Path>) -> Result<PathBuf, AnalyzeError> {
    resolve_descriptor_path(
        explicit,
        env::var(MOLECULE_ENV).ok(),
        env::var(MOLECULE_DIR_ENV).ok(),
    )
}

fn resolve_descriptor_path(
    explicit: Option<&Path>,
    molecule: Option<String>,
    directory: Option<String>,
) -> Result<PathBuf, AnalyzeError> {
    if let Some(path) = explicit {
        return Ok(path.to_path_buf());
    }
    let missing = |name: &str| {
        AnalyzeError::config(format!(
            "no system description given and ${} is not set",
            name
        ))
    };
    let molecule: String = molecule.ok_or_else(|| missing(MOLECULE_ENV))?;
    let directory: String = directory.ok_or_else(|| missing(MOLECULE_DIR_ENV))?;
    Ok(Path::new(&directory).join(format!(".{}", molecule)))
}

/// Reads a system description file.
pub fn load_system_descriptor(path: &Path) -> Result<SystemDescriptor, AnalyzeError> {
    info!("system description: {}", path.display());
    let file = fs::File::open(path).map_err(|err| {
        AnalyzeError::config(format!(
            "unable to open system description {}: {}",
            path.display(),
            err
        ))
    })?;
    read_system_descriptor(std::io::BufReader::new(file))
}

/// Parses the key-value lines of a system description:
///
/// ```text
/// molecule = "ch4"
/// elem_num = 2
/// elem_list = (C H)
/// atom_num = 5
/// atom_list = (C H H H H)
/// ```
pub fn read_system_descriptor<R: BufRead>(reader: R) -> Result<SystemDescriptor, AnalyzeError> {
    let mut name: Option<String> = None;
    let mut elem_num: Option<(usize, usize)> = None;
    let mut elem_list: Option<(usize, Vec<String>)> = None;
    let mut atom_num: Option<(usize, usize)> = None;
    let mut atom_list: Option<(usize, Vec<String>)> = None;

    for (index, line) in reader.lines().enumerate() {
        let line_number: usize = index + 1;
        let line: String = line?;
        if line.trim().is_empty() || line.trim_start().starts_with('#') {
            continue;
        }
        let line: String = line
            .chars()
            .map(|c| match c {
                '=' | '(' | ')' | '\'' | '"' => ' ',
                _ => c,
            })
            .collect();
        let mut tokens = line.split_whitespace();
        let key: &str = match tokens.next() {
            Some(key) => key,
            None => continue,
        };
        let values: Vec<String> = tokens.map(String::from).collect();

        match key {
            "molecule" => name = values.into_iter().next(),
            "elem_num" => elem_num = Some((line_number, parse_count(line_number, key, &values)?)),
            "elem_list" => elem_list = Some((line_number, values)),
            "atom_num" => atom_num = Some((line_number, parse_count(line_number, key, &values)?)),
            "atom_list" => atom_list = Some((line_number, values)),
            _ => debug!("ignoring unknown key '{}' at line {}", key, line_number),
        }
    }

    let elem_list: Vec<String> = checked_list("elem", elem_num, elem_list)?;
    let atom_list: Vec<String> = checked_list("atom", atom_num, atom_list)?;
    SystemDescriptor::new(name, &elem_list, &atom_list)
}

fn parse_count(line_number: usize, key: &str, values: &[String]) -> Result<usize, AnalyzeError> {
    match values.first() {
        Some(value) => value.parse::<usize>().map_err(|_| {
            AnalyzeError::config(format!(
                "{} at line {} expects a non-negative integer, found '{}'",
                key, line_number, value
            ))
        }),
        None => Err(AnalyzeError::config(format!(
            "{} at line {} expects a value",
            key, line_number
        ))),
    }
}

fn checked_list(
    prefix: &str,
    count: Option<(usize, usize)>,
    list: Option<(usize, Vec<String>)>,
) -> Result<Vec<String>, AnalyzeError> {
    let (_, count) = count.ok_or_else(|| {
        AnalyzeError::config(format!("missing key '{}_num' in system description", prefix))
    })?;
    let (line_number, list) = list.ok_or_else(|| {
        AnalyzeError::config(format!("missing key '{}_list' in system description", prefix))
    })?;
    if list.len() != count {
        return Err(AnalyzeError::config(format!(
            "{}_list at line {} has {} entries but {}_num is {}",
            prefix,
            line_number,
            list.len(),
            prefix,
            count
        )));
    }
    Ok(list)
}
