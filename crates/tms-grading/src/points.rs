//! Lenient parsing of point values.

use std::fmt;

/// Why a cell did not yield a number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PointsProblem {
    Empty,
    Invalid(String),
}

impl fmt::Display for PointsProblem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => f.write_str("empty cell"),
            Self::Invalid(raw) => write!(f, "'{raw}' is not a number"),
        }
    }
}

/// Parsed value of a points cell. `value` is 0 whenever `problem` is set.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedPoints {
    pub value: f64,
    pub problem: Option<PointsProblem>,
}

impl ParsedPoints {
    pub fn is_clean(&self) -> bool {
        self.problem.is_none()
    }
}

/// Parses a decimal number, accepting a comma as decimal separator.
///
/// Never fails: an empty or malformed cell yields 0 together with the
/// problem, so one bad cell cannot abort a whole row.
pub fn parse_points(cell: &str) -> ParsedPoints {
    let trimmed = cell.trim();
    if trimmed.is_empty() {
        return ParsedPoints {
            value: 0.0,
            problem: Some(PointsProblem::Empty),
        };
    }

    match trimmed.replace(',', ".").parse::<f64>() {
        Ok(value) if value.is_finite() => ParsedPoints {
            value,
            problem: None,
        },
        _ => ParsedPoints {
            value: 0.0,
            problem: Some(PointsProblem::Invalid(cell.to_string())),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn comma_decimal_separator() {
        assert_eq!(parse_points("12,5").value, 12.5);
        assert!(parse_points("12,5").is_clean());
    }

    #[test]
    fn dot_and_integer_values() {
        assert_eq!(parse_points("10").value, 10.0);
        assert_eq!(parse_points(" 7.25 ").value, 7.25);
        assert_eq!(parse_points("-1").value, -1.0);
    }

    #[test]
    fn empty_cell_is_zero_with_problem() {
        let parsed = parse_points("");
        assert_eq!(parsed.value, 0.0);
        assert_eq!(parsed.problem, Some(PointsProblem::Empty));
    }

    #[test]
    fn garbage_is_zero_with_problem() {
        let parsed = parse_points("abc");
        assert_eq!(parsed.value, 0.0);
        assert_eq!(parsed.problem, Some(PointsProblem::Invalid("abc".to_string())));
        // Two separators are not a thousands format.
        assert!(!parse_points("1,234,5").is_clean());
    }

    #[test]
    fn non_finite_values_are_rejected() {
        assert!(!parse_points("NaN").is_clean());
        assert!(!parse_points("inf").is_clean());
    }
}
