// config file
pub const CONFIG_FILE_NAME: &str = "bond_analyze.toml";
// environment variable holding the molecule name
pub const MOLECULE_ENV: &str = "MOLECULE";
// environment variable holding the directory of the molecule descriptions
pub const MOLECULE_DIR_ENV: &str = "MOLECULE_DIR";
// extension of the report written next to a trajectory file
pub const OUTPUT_EXTENSION: &str = "anly";
// print level
pub const VERBOSE: i8 = 0;
// width of a data column
pub const DATA_WIDTH: usize = 15;
// significant digits of the printed values
pub const DATA_PRECISION: usize = 6;
// width of the leading column ('#' in the header line)
pub const BLANK_WIDTH: usize = 2;
// print the header line with the column labels
pub const PRINT_HEADER: bool = true;
// print the energy of each frame as the last column
pub const PRINT_ENERGY: bool = true;
// sort the bond lengths of each bond type in the full report.
// The default keeps the order of the traversal lists.
pub const SORT_FULL_REPORT: bool = false;
