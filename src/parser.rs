//! Attendance log parsing
//!
//! Raw logs are UTF-8 text with one check-in per line:
//!
//! ```text
//! 2018-3-2 AM 9:02,Fri,...
//! ```
//!
//! Only lines starting with the literal character `'2'` (a 2000s-era year)
//! are treated as records; headers, blank lines, and comments all fail that
//! filter and are silently dropped. A line that passes the filter but
//! violates the record shape is a hard parse error, never skipped.

use crate::calendar::{weekday_from_symbol, Meridiem, TimeOfDay};
use crate::error::PipelineError;
use chrono::{NaiveDate, Weekday};
use serde::Serialize;

/// One parsed check-in line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttendanceRecord {
    pub date: NaiveDate,
    pub time: TimeOfDay,
    pub weekday: Weekday,
}

/// Leading-prefix filter: record lines carry a 2000s-era date up front
fn is_record_line(line: &str) -> bool {
    line.starts_with('2')
}

/// Parse a `"YYYY-M-D"` token (components not zero-padded)
pub fn parse_date_token(token: &str) -> Result<NaiveDate, PipelineError> {
    let invalid = || PipelineError::InvalidDate(token.to_string());

    let parts: Vec<&str> = token.split('-').collect();
    let [year, month, day] = parts.as_slice() else {
        return Err(invalid());
    };

    let year: i32 = year.parse().map_err(|_| invalid())?;
    let month: u32 = month.parse().map_err(|_| invalid())?;
    let day: u32 = day.parse().map_err(|_| invalid())?;

    NaiveDate::from_ymd_opt(year, month, day).ok_or_else(invalid)
}

/// Parse one retained line: comma-separated fields, the first of which is a
/// space-separated `"<date> <meridiem> <clock>"` stamp, the second a weekday
/// symbol. Trailing fields are ignored.
pub fn parse_record_line(line: &str) -> Result<AttendanceRecord, PipelineError> {
    let malformed = || PipelineError::MalformedRecord(line.to_string());

    let mut fields = line.split(',');
    let stamp = fields.next().ok_or_else(malformed)?;
    let weekday_token = fields.next().ok_or_else(malformed)?;

    let mut parts = stamp.split_whitespace();
    let date_token = parts.next().ok_or_else(malformed)?;
    let meridiem_token = parts.next().ok_or_else(malformed)?;
    let clock_token = parts.next().ok_or_else(malformed)?;

    let date = parse_date_token(date_token)?;
    let meridiem = Meridiem::from_symbol(meridiem_token)?;
    let time = TimeOfDay::from_clock(meridiem, clock_token)?;
    let weekday = weekday_from_symbol(weekday_token)?;

    Ok(AttendanceRecord {
        date,
        time,
        weekday,
    })
}

/// Parse every retained line of a log into attendance records
pub fn parse_log(text: &str) -> Result<Vec<AttendanceRecord>, PipelineError> {
    text.lines()
        .filter(|line| is_record_line(line))
        .map(parse_record_line)
        .collect()
}

/// Extract the leading date token of every retained line, duplicates
/// included. Downstream only needs this as adjacency context and a
/// date-to-record-existence lookup; distinctness is applied there.
pub fn observed_dates(text: &str) -> Result<Vec<NaiveDate>, PipelineError> {
    text.lines()
        .filter(|line| is_record_line(line))
        .map(|line| {
            let token = line
                .split(',')
                .next()
                .and_then(|stamp| stamp.split_whitespace().next())
                .ok_or_else(|| PipelineError::MalformedRecord(line.to_string()))?;
            parse_date_token(token)
        })
        .collect()
}

/// Per-line validation report for a raw log
#[derive(Debug, Serialize)]
pub struct LogReport {
    pub total_lines: usize,
    pub ignored_lines: usize,
    pub valid_records: usize,
    pub errors: Vec<LineError>,
}

/// One malformed retained line
#[derive(Debug, Serialize)]
pub struct LineError {
    /// 1-based line number in the input
    pub line_number: usize,
    pub error: String,
}

/// Check every line of a log without aborting on the first malformed record
pub fn validate_log(text: &str) -> LogReport {
    let mut report = LogReport {
        total_lines: 0,
        ignored_lines: 0,
        valid_records: 0,
        errors: Vec::new(),
    };

    for (index, line) in text.lines().enumerate() {
        report.total_lines += 1;

        if !is_record_line(line) {
            report.ignored_lines += 1;
            continue;
        }

        match parse_record_line(line) {
            Ok(_) => report.valid_records += 1,
            Err(e) => report.errors.push(LineError {
                line_number: index + 1,
                error: e.to_string(),
            }),
        }
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_LOG: &str = "\
date,weekday
2018-3-2 AM 9:02,Fri,check-in
2018-3-5 PM 1:10,Mon,check-in

# trailing comment
2018-3-6 AM 8:55,Tue,check-in
";

    #[test]
    fn test_parse_log_filters_non_record_lines() {
        let records = parse_log(SAMPLE_LOG).unwrap();
        assert_eq!(records.len(), 3);

        assert_eq!(
            records[0].date,
            NaiveDate::from_ymd_opt(2018, 3, 2).unwrap()
        );
        assert_eq!(records[0].time, TimeOfDay { hour: 9, minute: 2 });
        assert_eq!(records[0].weekday, Weekday::Fri);

        // PM 1:10 lands at 13:10
        assert_eq!(records[1].time, TimeOfDay { hour: 13, minute: 10 });
    }

    #[test]
    fn test_header_excluded_from_records_and_dates() {
        let text = "date,weekday\n2020-1-1 AM 9:00,Wed,x\n";
        assert_eq!(parse_log(text).unwrap().len(), 1);
        assert_eq!(observed_dates(text).unwrap().len(), 1);
    }

    #[test]
    fn test_korean_locale_line() {
        let records = parse_log("2018-3-2 오전 9:02,금,출근\n").unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].weekday, Weekday::Fri);
        assert_eq!(records[0].time.hour, 9);
    }

    #[test]
    fn test_observed_dates_keep_duplicates() {
        let text = "2020-1-1 AM 9:00,Wed,x\n2020-1-1 PM 2:00,Wed,x\n2020-1-3 AM 9:00,Fri,x\n";
        let dates = observed_dates(text).unwrap();
        assert_eq!(dates.len(), 3);
        assert_eq!(dates[0], dates[1]);
    }

    #[test]
    fn test_retained_malformed_line_is_an_error() {
        // Passes the leading-'2' filter but has no weekday field
        let result = parse_log("2020-1-1 AM 9:00\n");
        assert!(matches!(result, Err(PipelineError::MalformedRecord(_))));

        // Unknown weekday symbol propagates rather than being skipped
        let result = parse_log("2020-1-1 AM 9:00,Blursday,x\n");
        assert!(matches!(result, Err(PipelineError::UnknownWeekday(_))));
    }

    #[test]
    fn test_date_token_shapes() {
        assert_eq!(
            parse_date_token("2020-1-9").unwrap(),
            NaiveDate::from_ymd_opt(2020, 1, 9).unwrap()
        );
        assert!(parse_date_token("2020-13-1").is_err());
        assert!(parse_date_token("2020-1").is_err());
        assert!(parse_date_token("2020-1-1-1").is_err());
        assert!(parse_date_token("2020-02-31").is_err());
    }

    #[test]
    fn test_validate_log_reports_without_aborting() {
        let text = "\
header
2020-1-1 AM 9:00,Wed,x
2020-1-2 XX 9:00,Thu,x
2020-1-3 AM 9:00,Fri,x
";
        let report = validate_log(text);
        assert_eq!(report.total_lines, 4);
        assert_eq!(report.ignored_lines, 1);
        assert_eq!(report.valid_records, 2);
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.errors[0].line_number, 3);
    }
}
