use chrono::NaiveDateTime;
use regex::Regex;

use crate::error::{GraphError, GraphResult};
use crate::mapper::Mapper;
use crate::row::{Row, Value};

fn column<'a>(row: &'a Row, col: &str) -> GraphResult<&'a Value> {
    row.get(col).ok_or_else(|| GraphError::MissingColumn(col.to_string()))
}

fn str_column<'a>(row: &'a Row, col: &str) -> GraphResult<&'a str> {
    column(row, col)?
        .as_str()
        .ok_or_else(|| GraphError::Parse(format!("column {col} is not a string")))
}

/// Strips ASCII punctuation out of a string column.
pub struct FilterPunctuation {
    pub column: String,
}

impl FilterPunctuation {
    pub fn new(column: impl Into<String>) -> Self {
        Self { column: column.into() }
    }
}

impl Mapper for FilterPunctuation {
    fn apply(&self, mut row: Row) -> GraphResult<Vec<Row>> {
        let cleaned: String = str_column(&row, &self.column)?
            .chars()
            .filter(|c| !c.is_ascii_punctuation())
            .collect();
        row.insert(self.column.clone(), Value::Str(cleaned));
        Ok(vec![row])
    }
}

/// Lower-cases a string column.
pub struct LowerCase {
    pub column: String,
}

impl LowerCase {
    pub fn new(column: impl Into<String>) -> Self {
        Self { column: column.into() }
    }
}

impl Mapper for LowerCase {
    fn apply(&self, mut row: Row) -> GraphResult<Vec<Row>> {
        let lowered = str_column(&row, &self.column)?.to_lowercase();
        row.insert(self.column.clone(), Value::Str(lowered));
        Ok(vec![row])
    }
}

/// Splits a string column on a regex separator, emitting one row per token.
/// All but the last row are clones of the original row with the column
/// overwritten (per-token rows must each be independently observable).
pub struct Split {
    pub column: String,
    separator: Regex,
}

impl Split {
    pub fn new(column: impl Into<String>) -> GraphResult<Self> {
        Self::with_separator(column, r"\s+")
    }

    pub fn with_separator(column: impl Into<String>, separator: &str) -> GraphResult<Self> {
        let separator = Regex::new(separator).map_err(|e| GraphError::Parse(e.to_string()))?;
        Ok(Self { column: column.into(), separator })
    }
}

impl Mapper for Split {
    fn apply(&self, mut row: Row) -> GraphResult<Vec<Row>> {
        let text = str_column(&row, &self.column)?.to_string();
        let mut out = Vec::new();
        let mut rest = text.as_str();
        while let Some(m) = self.separator.find(rest) {
            let (token, remainder) = (&rest[..m.start()], &rest[m.end()..]);
            row.insert(self.column.clone(), Value::Str(token.to_string()));
            out.push(row.clone());
            rest = remainder;
        }
        row.insert(self.column.clone(), Value::Str(rest.to_string()));
        out.push(row);
        Ok(out)
    }
}

/// Keeps only the named columns, dropping everything else.
pub struct Project {
    pub columns: Vec<String>,
}

impl Project {
    pub fn new(columns: impl Into<Vec<String>>) -> Self {
        Self { columns: columns.into() }
    }
}

impl Mapper for Project {
    fn apply(&self, row: Row) -> GraphResult<Vec<Row>> {
        let mut out = Row::new();
        for col in &self.columns {
            out.insert(col.clone(), column(&row, col)?.clone());
        }
        Ok(vec![out])
    }
}

/// Drops rows for which `predicate` returns `false`.
pub struct Filter<F> {
    predicate: F,
}

impl<F> Filter<F>
where
    F: Fn(&Row) -> bool,
{
    pub fn new(predicate: F) -> Self {
        Self { predicate }
    }
}

impl<F> Mapper for Filter<F>
where
    F: Fn(&Row) -> bool,
{
    fn apply(&self, row: Row) -> GraphResult<Vec<Row>> {
        if (self.predicate)(&row) { Ok(vec![row]) } else { Ok(vec![]) }
    }
}

/// Stores the result of an arbitrary row -> f64 closure into `result_column`.
/// Covers ad hoc expressions (log-ratios, quotients) a pipeline needs once.
pub struct BinaryArithmeticOperation<F> {
    operation: F,
    pub result_column: String,
}

impl<F> BinaryArithmeticOperation<F>
where
    F: Fn(&Row) -> GraphResult<f64>,
{
    pub fn new(operation: F, result_column: impl Into<String>) -> Self {
        Self { operation, result_column: result_column.into() }
    }
}

impl<F> Mapper for BinaryArithmeticOperation<F>
where
    F: Fn(&Row) -> GraphResult<f64>,
{
    fn apply(&self, mut row: Row) -> GraphResult<Vec<Row>> {
        let value = (self.operation)(&row)?;
        row.insert(self.result_column.clone(), Value::Float(value));
        Ok(vec![row])
    }
}

/// Multiplies several numeric columns together into `result_column`.
pub struct Product {
    pub columns: Vec<String>,
    pub result_column: String,
}

impl Product {
    pub fn new(columns: impl Into<Vec<String>>, result_column: impl Into<String>) -> Self {
        Self { columns: columns.into(), result_column: result_column.into() }
    }
}

impl Mapper for Product {
    fn apply(&self, mut row: Row) -> GraphResult<Vec<Row>> {
        let mut product = 1.0;
        for col in &self.columns {
            let v = column(&row, col)?
                .as_f64()
                .ok_or_else(|| GraphError::Parse(format!("column {col} is not numeric")))?;
            product *= v;
        }
        row.insert(self.result_column.clone(), Value::Float(product));
        Ok(vec![row])
    }
}

/// Great-circle distance in kilometres between two `[lon, lat]` columns.
pub struct Haversine {
    pub start: String,
    pub end: String,
    pub result_column: String,
}

impl Haversine {
    pub fn new(start: impl Into<String>, end: impl Into<String>, result_column: impl Into<String>) -> Self {
        Self { start: start.into(), end: end.into(), result_column: result_column.into() }
    }
}

fn coord_pair(row: &Row, col: &str) -> GraphResult<(f64, f64)> {
    match column(row, col)? {
        Value::Point(p) if p.len() == 2 => Ok((p[0].to_radians(), p[1].to_radians())),
        _ => Err(GraphError::Parse(format!("column {col} is not a [lon, lat] coordinate pair"))),
    }
}

impl Mapper for Haversine {
    fn apply(&self, mut row: Row) -> GraphResult<Vec<Row>> {
        const EARTH_RADIUS_KM: f64 = 6373.0;
        let (lon1, lat1) = coord_pair(&row, &self.start)?;
        let (lon2, lat2) = coord_pair(&row, &self.end)?;

        let lat_sin = ((lat2 - lat1) / 2.0).sin().powi(2);
        let lon_sin = ((lon2 - lon1) / 2.0).sin().powi(2);
        let angle = (lat_sin + lat1.cos() * lat2.cos() * lon_sin).sqrt();
        let distance = 2.0 * EARTH_RADIUS_KM * angle.asin();

        row.insert(self.result_column.clone(), Value::Float(distance));
        Ok(vec![row])
    }
}

fn datetime_format(value: &str) -> &'static str {
    if value.contains('.') { "%Y%m%dT%H%M%S%.f" } else { "%Y%m%dT%H%M%S" }
}

fn parse_datetime(value: &str) -> GraphResult<NaiveDateTime> {
    NaiveDateTime::parse_from_str(value, datetime_format(value))
        .map_err(|e| GraphError::Parse(format!("invalid datetime {value:?}: {e}")))
}

/// Extracts a `strftime`-style projection of a `date_column` value, in the
/// `YYYYMMDD'T'HHMMSS[.ffffff]` convention, into `result_column`.
pub struct DatetimeExtractor {
    pub date_column: String,
    pub format: String,
    pub result_column: String,
}

impl DatetimeExtractor {
    pub fn new(date_column: impl Into<String>, format: impl Into<String>, result_column: impl Into<String>) -> Self {
        Self { date_column: date_column.into(), format: format.into(), result_column: result_column.into() }
    }
}

impl Mapper for DatetimeExtractor {
    fn apply(&self, mut row: Row) -> GraphResult<Vec<Row>> {
        let raw = str_column(&row, &self.date_column)?;
        let date = parse_datetime(raw)?;
        row.insert(self.result_column.clone(), Value::Str(date.format(&self.format).to_string()));
        Ok(vec![row])
    }
}

/// Difference between two datetime columns, in hours.
pub struct Duration {
    pub start: String,
    pub end: String,
    pub result_column: String,
}

impl Duration {
    pub fn new(start: impl Into<String>, end: impl Into<String>, result_column: impl Into<String>) -> Self {
        Self { start: start.into(), end: end.into(), result_column: result_column.into() }
    }
}

impl Mapper for Duration {
    fn apply(&self, mut row: Row) -> GraphResult<Vec<Row>> {
        let start = parse_datetime(str_column(&row, &self.start)?)?;
        let end = parse_datetime(str_column(&row, &self.end)?)?;
        let hours = (end - start).num_milliseconds() as f64 / 3_600_000.0;
        row.insert(self.result_column.clone(), Value::Float(hours));
        Ok(vec![row])
    }
}

/// Parses listed columns from string to integer in place.
pub struct StrToInt {
    pub columns: Vec<String>,
}

impl StrToInt {
    pub fn new(columns: impl Into<Vec<String>>) -> Self {
        Self { columns: columns.into() }
    }
}

impl Mapper for StrToInt {
    fn apply(&self, mut row: Row) -> GraphResult<Vec<Row>> {
        for col in &self.columns {
            let parsed: i64 = str_column(&row, col)?
                .parse()
                .map_err(|_| GraphError::Parse(format!("column {col} is not an integer")))?;
            row.insert(col.clone(), Value::Int(parsed));
        }
        Ok(vec![row])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(col: &str, v: Value) -> Row {
        Row::from([(col.to_string(), v)])
    }

    #[test]
    fn split_emits_one_row_per_token() {
        let r = row("text", Value::Str("hello  world".into()));
        let out = Split::new("text").unwrap().apply(r).unwrap();
        let tokens: Vec<_> = out.iter().map(|r| r.get("text").unwrap().as_str().unwrap()).collect();
        assert_eq!(tokens, vec!["hello", "world"]);
    }

    #[test]
    fn str_to_int_parses_listed_columns() {
        let r = row("num", Value::Str("015".into()));
        let out = StrToInt::new(vec!["num".to_string()]).apply(r).unwrap();
        assert_eq!(out[0].get("num"), Some(&Value::Int(15)));
    }

    #[test]
    fn datetime_extractor_reads_year() {
        let r = row("t", Value::Str("20181011T145551".into()));
        let mapper = DatetimeExtractor::new("t", "%Y", "year");
        let out = mapper.apply(r).unwrap();
        assert_eq!(out[0].get("year"), Some(&Value::Str("2018".into())));
    }

    #[test]
    fn project_keeps_only_named_columns() {
        let r = Row::from([
            ("a".to_string(), Value::Int(1)),
            ("b".to_string(), Value::Int(2)),
        ]);
        let out = Project::new(vec!["a".to_string()]).apply(r).unwrap();
        assert_eq!(out[0].len(), 1);
        assert_eq!(out[0].get("a"), Some(&Value::Int(1)));
    }
}
