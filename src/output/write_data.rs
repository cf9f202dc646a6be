use crate::error::AnalyzeError;
use crate::initialization::AnalysisConfiguration;
use std::io::Write;

/// Column layout of the report.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportFormat {
    pub data_width: usize,
    pub data_precision: usize,
    pub blank_width: usize,
    pub print_header: bool,
    pub print_energy: bool,
}

impl From<&AnalysisConfiguration> for ReportFormat {
    fn from(config: &AnalysisConfiguration) -> Self {
        ReportFormat {
            data_width: config.data_width,
            data_precision: config.data_precision,
            blank_width: config.blank_width,
            print_header: config.print_header,
            print_energy: config.print_energy,
        }
    }
}

impl Default for ReportFormat {
    fn default() -> Self {
        ReportFormat::from(&AnalysisConfiguration::default())
    }
}

/// Writes the header line and one line per frame in fixed-width,
/// left-aligned columns.
pub struct ReportWriter<W: Write> {
    stream: W,
    format: ReportFormat,
}

impl<W: Write> ReportWriter<W> {
    pub fn new(stream: W, format: ReportFormat) -> Self {
        ReportWriter { stream, format }
    }

    /// Writes the column labels. Nothing is written if the header is
    /// disabled.
    pub fn write_header(&mut self, labels: &[String]) -> Result<(), AnalyzeError> {
        if !self.format.print_header {
            return Ok(());
        }
        let mut line: String = format!("{:<width$}", "#", width = self.format.blank_width);
        for label in labels {
            line.push_str(&format!("{:<width$}", label, width = self.format.data_width));
        }
        if self.format.print_energy {
            line.push_str("Energy");
        }
        writeln!(self.stream, "{}", line)?;
        Ok(())
    }

    pub fn write_row(&mut self, values: &[f64], energy: f64) -> Result<(), AnalyzeError> {
        // the leading column only exists next to a header line
        let mut line: String = if self.format.print_header {
            format!("{:<width$}", " ", width = self.format.blank_width)
        } else {
            String::new()
        };
        for value in values {
            line.push_str(&format!(
                "{:<width$}",
                format_general(*value, self.format.data_precision),
                width = self.format.data_width
            ));
        }
        if self.format.print_energy {
            line.push_str(&format_general(energy, self.format.data_precision));
        }
        writeln!(self.stream, "{}", line)?;
        Ok(())
    }

    pub fn flush(&mut self) -> Result<(), AnalyzeError> {
        self.stream.flush()?;
        Ok(())
    }

    pub fn into_inner(self) -> W {
        self.stream
    }
}

/// Formats a number with `precision` significant digits like `%g` in C:
/// trailing zeros are dropped and the exponential form is used for
/// exponents below -4 or from `precision` on.
pub fn format_general(value: f64, precision: usize) -> String {
    if value == 0.0 {
        return String::from("0");
    }
    if !value.is_finite() {
        return value.to_string();
    }
    let precision: usize = precision.max(1);
    // the exponent after rounding to the requested digits
    let scientific: String = format!("{:.*e}", precision - 1, value);
    let (mantissa, exponent) = match scientific.split_once('e') {
        Some((mantissa, exponent)) => (mantissa, exponent.parse::<i32>().unwrap_or(0)),
        None => (scientific.as_str(), 0),
    };

    if exponent < -4 || exponent >= precision as i32 {
        format!(
            "{}e{}{:02}",
            trim_fraction(mantissa),
            if exponent < 0 { '-' } else { '+' },
            exponent.abs()
        )
    } else {
        let decimals: usize = (precision as i32 - 1 - exponent) as usize;
        trim_fraction(&format!("{:.*}", decimals, value))
    }
}

fn trim_fraction(number: &str) -> String {
    if number.contains('.') {
        String::from(number.trim_end_matches('0').trim_end_matches('.'))
    } else {
        String::from(number)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn general_format_matches_c() {
        assert_eq!(format_general(1.0, 6), "1");
        assert_eq!(format_general(2.0_f64.sqrt(), 6), "1.41421");
        assert_eq!(format_general(-76.4, 6), "-76.4");
        assert_eq!(format_general(0.0, 6), "0");
        assert_eq!(format_general(0.0001, 6), "0.0001");
        assert_eq!(format_general(0.00001234, 6), "1.234e-05");
        assert_eq!(format_general(1234567.0, 6), "1.23457e+06");
        assert_eq!(format_general(123456.0, 6), "123456");
        assert_eq!(format_general(-40.123456789, 6), "-40.1235");
        assert_eq!(format_general(1.5, 1), "2");
    }

    #[test]
    fn writes_header_and_rows() {
        let format = ReportFormat {
            data_width: 8,
            ..ReportFormat::default()
        };
        let mut writer = ReportWriter::new(Vec::new(), format);
        writer
            .write_header(&[String::from("rule1"), String::from("rule2")])
            .unwrap();
        writer.write_row(&[1.0, 0.5], -1.25).unwrap();
        let text = String::from_utf8(writer.into_inner()).unwrap();
        assert_eq!(text, "# rule1   rule2   Energy\n  1       0.5     -1.25\n");
    }

    #[test]
    fn header_and_energy_can_be_disabled() {
        let format = ReportFormat {
            data_width: 6,
            print_header: false,
            print_energy: false,
            ..ReportFormat::default()
        };
        let mut writer = ReportWriter::new(Vec::new(), format);
        writer.write_header(&[String::from("rule1")]).unwrap();
        writer.write_row(&[1.0, 2.0], -1.0).unwrap();
        let text = String::from_utf8(writer.into_inner()).unwrap();
        assert_eq!(text, "1     2     \n");
    }
}
