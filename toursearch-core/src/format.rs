use chrono::NaiveDate;

/// Formats a date as `MM/DD/YYYY`; an absent date formats to an empty string.
pub fn format_date(date: Option<NaiveDate>) -> String {
    match date {
        Some(date) => date.format("%m/%d/%Y").to_string(),
        None => String::new(),
    }
}
