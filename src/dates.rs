use chrono::NaiveDate;

/// Storage format of `DATE` columns. SQLite keeps dates as ISO-8601 text.
pub const SQL_DATE_FORMAT: &str = "%Y-%m-%d";

/// Formats accepted from the command line, tried in order.
const INPUT_FORMATS: &[&str] = &[SQL_DATE_FORMAT, "%d/%m/%Y", "%Y/%m/%d"];

#[derive(Debug, thiserror::Error)]
pub enum DateError {
    #[error("Invalid stored date '{value}': {source}")]
    InvalidSqlDate {
        value: String,
        source: chrono::ParseError,
    },

    #[error("Unrecognized date '{0}' (expected YYYY-MM-DD, DD/MM/YYYY or YYYY/MM/DD)")]
    UnrecognizedInput(String),
}

/// Convert the text of a SQL `DATE` column into a date.
pub fn sql_date_to_date(value: &str) -> Result<NaiveDate, DateError> {
    NaiveDate::parse_from_str(value.trim(), SQL_DATE_FORMAT).map_err(|source| {
        DateError::InvalidSqlDate {
            value: value.to_string(),
            source,
        }
    })
}

/// Convert a date into the text stored in a SQL `DATE` column.
pub fn date_to_sql_date(date: NaiveDate) -> String {
    date.format(SQL_DATE_FORMAT).to_string()
}

/// Parse a date typed by a user.
pub fn parse_date(input: &str) -> Result<NaiveDate, DateError> {
    let input = input.trim();
    INPUT_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(input, format).ok())
        .ok_or_else(|| DateError::UnrecognizedInput(input.to_string()))
}
