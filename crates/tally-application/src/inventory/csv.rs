//! CSV rendering of the inventory.

use chrono::{NaiveDate, TimeZone};
use std::fmt::Display;
use tally_core::config::ExportSettings;
use tally_core::inventory::ScanRecord;

const HEADER: [&str; 4] = ["code", "format", "date", "time"];

/// How the export file is laid out and named.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvOptions {
    pub delimiter: char,
    pub filename_prefix: String,
}

impl Default for CsvOptions {
    fn default() -> Self {
        Self::from(&ExportSettings::default())
    }
}

impl From<&ExportSettings> for CsvOptions {
    fn from(settings: &ExportSettings) -> Self {
        Self {
            delimiter: settings.delimiter,
            filename_prefix: settings.filename_prefix.clone(),
        }
    }
}

impl CsvOptions {
    /// `<prefix>-<YYYY-MM-DD>.csv`
    pub fn filename(&self, today: NaiveDate) -> String {
        format!("{}-{}.csv", self.filename_prefix, today.format("%Y-%m-%d"))
    }
}

/// A rendered export, ready to be offered as a download or written to disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvExport {
    pub filename: String,
    pub content: String,
}

/// Renders records in the given order, dates and times in `tz`.
pub(crate) fn render<Tz>(records: &[ScanRecord], delimiter: char, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let mut out = String::new();
    push_row(&mut out, delimiter, HEADER);

    for record in records {
        let local = record.observed_at.with_timezone(tz);
        let date = local.format("%Y-%m-%d").to_string();
        let time = local.format("%H:%M:%S").to_string();
        push_row(
            &mut out,
            delimiter,
            [
                record.code.as_str(),
                record.format.as_str(),
                date.as_str(),
                time.as_str(),
            ],
        );
    }

    out
}

fn push_row<'a>(out: &mut String, delimiter: char, fields: impl IntoIterator<Item = &'a str>) {
    for (i, field) in fields.into_iter().enumerate() {
        if i > 0 {
            out.push(delimiter);
        }
        push_field(out, delimiter, field);
    }
    out.push('\n');
}

fn push_field(out: &mut String, delimiter: char, field: &str) {
    let needs_quotes = field
        .chars()
        .any(|c| c == delimiter || c == '"' || c == '\n' || c == '\r');
    if needs_quotes {
        out.push('"');
        out.push_str(&field.replace('"', "\"\""));
        out.push('"');
    } else {
        out.push_str(field);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use tally_core::inventory::RecordId;

    fn record(id: u64, code: &str, at: &str) -> ScanRecord {
        ScanRecord::new(
            RecordId(id),
            code,
            Some("CODE_128"),
            at.parse().unwrap(),
        )
    }

    #[test]
    fn test_header_and_rows() {
        let records = vec![
            record(2, "222", "2024-06-10T08:30:05Z"),
            record(1, "111", "2024-06-10T08:29:59Z"),
        ];

        let csv = render(&records, ';', &Utc);

        assert_eq!(
            csv,
            "code;format;date;time\n\
             222;CODE_128;2024-06-10;08:30:05\n\
             111;CODE_128;2024-06-10;08:29:59\n"
        );
    }

    #[test]
    fn test_fields_with_delimiter_or_quotes_are_quoted() {
        let records = vec![record(1, "A;B \"x\"", "2024-06-10T08:29:59Z")];

        let csv = render(&records, ';', &Utc);

        assert_eq!(csv.lines().nth(1).unwrap(), "\"A;B \"\"x\"\"\";CODE_128;2024-06-10;08:29:59");
    }

    #[test]
    fn test_comma_delimiter() {
        let records = vec![record(1, "A;B", "2024-06-10T08:29:59Z")];

        let csv = render(&records, ',', &Utc);

        assert_eq!(csv.lines().next().unwrap(), "code,format,date,time");
        assert_eq!(csv.lines().nth(1).unwrap(), "A;B,CODE_128,2024-06-10,08:29:59");
    }

    #[test]
    fn test_filename_contains_date() {
        let options = CsvOptions::default();
        let today = NaiveDate::from_ymd_opt(2024, 6, 10).unwrap();
        assert_eq!(options.filename(today), "scan-2024-06-10.csv");
    }
}
