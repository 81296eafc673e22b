//! Request validation from column definitions.

use crate::error::AppError;
use crate::schema::{ColumnDef, ColumnType, TableDef};
use regex::Regex;
use serde_json::{Map, Value};
use std::sync::OnceLock;

pub struct RequestValidator;

impl RequestValidator {
    /// Validate an insert body: no unknown columns, all required columns present, values fit their types.
    pub fn validate_insert(table: &TableDef, body: &Map<String, Value>) -> Result<(), AppError> {
        reject_unknown(table, body)?;
        for col in &table.columns {
            match body.get(col.name) {
                None if col.required() => {
                    return Err(AppError::Validation(format!("{} is required", col.name)));
                }
                None => {}
                Some(v) => check_value(col, v)?,
            }
        }
        Ok(())
    }

    /// Validate only the fields present in body (PATCH semantics).
    pub fn validate_update(table: &TableDef, body: &Map<String, Value>) -> Result<(), AppError> {
        reject_unknown(table, body)?;
        for (name, v) in body {
            if let Some(col) = table.column(name) {
                check_value(col, v)?;
            }
        }
        Ok(())
    }

    /// Parse a primary key taken from a path or query string.
    pub fn parse_key(table: &TableDef, raw: &str) -> Result<Value, AppError> {
        let pk = table.pk();
        if pk.ty.is_integer() {
            let n: i32 = raw
                .trim()
                .parse()
                .map_err(|_| AppError::BadRequest(format!("invalid {}: '{}'", pk.name, raw)))?;
            return Ok(Value::Number(n.into()));
        }
        let v = Value::String(raw.to_string());
        check_value(pk, &v).map_err(|e| match e {
            AppError::Validation(msg) => AppError::BadRequest(msg),
            other => other,
        })?;
        Ok(v)
    }

    /// Validate `?column=value` filters; unknown columns are rejected.
    pub fn validate_filters(table: &TableDef, filters: &[(String, Value)]) -> Result<(), AppError> {
        for (name, v) in filters {
            let col = table
                .column(name)
                .ok_or_else(|| AppError::BadRequest(format!("unknown filter column: {}", name)))?;
            check_value(col, v)?;
        }
        Ok(())
    }
}

fn reject_unknown(table: &TableDef, body: &Map<String, Value>) -> Result<(), AppError> {
    if let Some(name) = body.keys().find(|k| !table.has_column(k)) {
        return Err(AppError::Validation(format!(
            "unknown column for {}: {}",
            table.name, name
        )));
    }
    Ok(())
}

/// Check one value against its column. Integers may arrive as numeric strings.
pub fn check_value(col: &ColumnDef, v: &Value) -> Result<(), AppError> {
    let invalid = |what: &str| AppError::Validation(format!("{} must be {}", col.name, what));
    if v.is_null() {
        return if col.nullable { Ok(()) } else { Err(invalid("non-null")) };
    }
    match col.ty {
        ColumnType::Serial | ColumnType::Integer => {
            let ok = match v {
                Value::Number(n) => n.as_i64().is_some_and(|i| i32::try_from(i).is_ok()),
                Value::String(s) => s.trim().parse::<i32>().is_ok(),
                _ => false,
            };
            if !ok {
                return Err(invalid("a 32-bit integer"));
            }
        }
        ColumnType::Varchar(max) => {
            let s = v.as_str().ok_or_else(|| invalid("a string"))?;
            if s.chars().count() > max as usize {
                return Err(AppError::Validation(format!(
                    "{} must be at most {} characters",
                    col.name, max
                )));
            }
        }
        ColumnType::Numeric { precision, scale } => {
            let text = match v {
                Value::Number(n) => n.to_string(),
                Value::String(s) => s.trim().to_string(),
                _ => return Err(invalid("a decimal number")),
            };
            if !fits_numeric(&text, precision, scale) {
                return Err(invalid(&format!(
                    "a decimal fitting NUMERIC({}, {}) after rounding to {} places",
                    precision, scale, scale
                )));
            }
        }
        ColumnType::Date => {
            let ok = v
                .as_str()
                .is_some_and(|s| chrono::NaiveDate::parse_from_str(s, "%Y-%m-%d").is_ok());
            if !ok {
                return Err(invalid("a date (YYYY-MM-DD)"));
            }
        }
        ColumnType::Timestamptz => {
            let ok = v
                .as_str()
                .is_some_and(|s| chrono::DateTime::parse_from_rfc3339(s).is_ok());
            if !ok {
                return Err(invalid("an RFC 3339 timestamp"));
            }
        }
    }
    Ok(())
}

fn decimal_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^[+-]?([0-9]*)(?:\.([0-9]*))?(?:[eE]([+-]?[0-9]+))?$").expect("static decimal pattern")
    })
}

/// Whether `text` (plain or exponent form) fits NUMERIC(precision, scale) once rounded
/// half away from zero to `scale` fractional digits, as PostgreSQL stores it.
pub fn fits_numeric(text: &str, precision: u8, scale: u8) -> bool {
    let Some(caps) = decimal_pattern().captures(text) else {
        return false;
    };
    let int = caps.get(1).map_or("", |m| m.as_str());
    let frac = caps.get(2).map_or("", |m| m.as_str());
    if int.is_empty() && frac.is_empty() {
        return false;
    }
    let exp: i64 = match caps.get(3).map(|m| m.as_str().parse::<i64>()) {
        None => 0,
        Some(Ok(e)) => e,
        Some(Err(_)) => return false,
    };

    let mut digits: Vec<u8> = int.bytes().chain(frac.bytes()).map(|b| b - b'0').collect();
    let leading_zeros = digits.iter().take_while(|d| **d == 0).count();
    digits.drain(..leading_zeros);
    if digits.is_empty() {
        return true;
    }
    // value = 0.d1d2...dn * 10^point
    let Some(mut point) = (int.len() as i64)
        .checked_add(exp)
        .and_then(|p| p.checked_sub(leading_zeros as i64))
    else {
        return false;
    };

    let keep = point + i64::from(scale);
    if keep < 0 {
        // below half a unit of the last place
        return true;
    }
    let keep = keep as usize;
    if keep < digits.len() {
        let round_up = digits[keep] >= 5;
        digits.truncate(keep);
        if round_up {
            let mut i = digits.len();
            loop {
                if i == 0 {
                    digits.insert(0, 1);
                    point += 1;
                    break;
                }
                i -= 1;
                if digits[i] == 9 {
                    digits[i] = 0;
                } else {
                    digits[i] += 1;
                    break;
                }
            }
        }
    }
    point.max(0) <= i64::from(precision.saturating_sub(scale))
}
