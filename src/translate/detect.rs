use std::fmt;
use std::str::FromStr;

use lazy_static::lazy_static;
use regex::Regex;

use crate::error::Error;

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum QueryLanguage {
    Flux,
    InfluxQL,
}

impl FromStr for QueryLanguage {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "flux" => Ok(QueryLanguage::Flux),
            "influxql" => Ok(QueryLanguage::InfluxQL),
            other => Err(Error::unsupported_query(format!(
                "unknown query type '{}', expected flux or influxql",
                other
            ))),
        }
    }
}

impl fmt::Display for QueryLanguage {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            QueryLanguage::Flux => write!(f, "Flux"),
            QueryLanguage::InfluxQL => write!(f, "InfluxQL"),
        }
    }
}

lazy_static! {
    static ref FLUX_FROM: Regex = Regex::new(r"^\s*from\s*\(").unwrap();
    static ref INFLUXQL_SELECT: Regex = Regex::new(r"(?i)^\s*select\b").unwrap();
}

/// Flux starts with `from(` or pipes with `|>`; InfluxQL starts with `SELECT`.
pub fn detect(query: &str) -> Option<QueryLanguage> {
    if FLUX_FROM.is_match(query) || query.contains("|>") {
        Some(QueryLanguage::Flux)
    } else if INFLUXQL_SELECT.is_match(query) {
        Some(QueryLanguage::InfluxQL)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_detect() {
        use QueryLanguage::*;

        #[rustfmt::skip]
        let tests = [
            (r#"from(bucket:"b") |> range(start:-1h)"#, Some(Flux)),
            ("  from (bucket: \"b\")", Some(Flux)),
            ("buckets() |> limit(n: 1)", Some(Flux)),
            ("SELECT mean(x) FROM cpu", Some(InfluxQL)),
            ("\n  select x from cpu", Some(InfluxQL)),
            ("SHOW MEASUREMENTS", None),
            ("selection", None),
            ("", None),
        ];

        for (query, expected) in &tests {
            assert_eq!(*expected, detect(query), "while detecting {:?}", query);
        }
    }

    #[test]
    fn test_from_str() -> std::result::Result<(), Box<dyn std::error::Error>> {
        assert_eq!(QueryLanguage::Flux, "FLUX".parse()?);
        assert_eq!(QueryLanguage::InfluxQL, "influxql".parse()?);

        let err = "sql".parse::<QueryLanguage>().unwrap_err();
        assert_eq!(ErrorKind::UnsupportedQuery, err.kind());
        Ok(())
    }
}
