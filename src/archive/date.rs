use chrono::NaiveDate;

use super::error::ExtractError;
use super::types::WorkDate;

const MONTH_ABBR: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

fn month_number(abbr: &str) -> Option<u32> {
    MONTH_ABBR
        .iter()
        .position(|m| m.eq_ignore_ascii_case(abbr))
        .map(|i| i as u32 + 1)
}

/// Parse a blurb date such as "02 Jul 2020".
pub fn parse_listing_date(text: &str) -> Result<WorkDate, ExtractError> {
    let text = text.trim();
    let mut parts = text.split_whitespace();
    let (Some(day), Some(month), Some(year), None) = (parts.next(), parts.next(), parts.next(), parts.next()) else {
        return Err(ExtractError::date(text));
    };
    let month = month_number(month).ok_or_else(|| ExtractError::date(text))?;
    let day: u32 = day.parse().map_err(|_| ExtractError::date(text))?;
    let year: i32 = year.parse().map_err(|_| ExtractError::date(text))?;
    let date = NaiveDate::from_ymd_opt(year, month, day).ok_or_else(|| ExtractError::date(text))?;
    Ok(WorkDate::new(date, text))
}

/// Parse a work page date such as "2020-07-02".
pub fn parse_detail_date(text: &str) -> Result<WorkDate, ExtractError> {
    let text = text.trim();
    let date = NaiveDate::parse_from_str(text, "%Y-%m-%d").map_err(|_| ExtractError::date(text))?;
    Ok(WorkDate::new(date, text))
}
