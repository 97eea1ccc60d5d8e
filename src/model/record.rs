use std::collections::HashMap;
use std::fmt;

/// A single cell of an input row.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Null,
    Bool(bool),
    /// Integers keep every digit; `Number` holds the rest.
    Integer(i64),
    Unsigned(u64),
    Number(f64),
    String(String),
}

impl Scalar {
    /// Null and empty strings count as absent.
    pub fn is_empty(&self) -> bool {
        match self {
            Scalar::Null => true,
            Scalar::String(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Scalar::Integer(n) => Some(*n as f64),
            Scalar::Unsigned(n) => Some(*n as f64),
            Scalar::Number(n) => Some(*n),
            Scalar::Bool(true) => Some(1.0),
            Scalar::Bool(false) => Some(0.0),
            Scalar::String(s) => s.trim().parse::<f64>().ok(),
            Scalar::Null => None,
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Scalar::Null => Ok(()),
            Scalar::Bool(b) => write!(f, "{}", b),
            Scalar::Integer(n) => write!(f, "{}", n),
            Scalar::Unsigned(n) => write!(f, "{}", n),
            Scalar::Number(n) => write!(f, "{}", n),
            Scalar::String(s) => write!(f, "{}", s),
        }
    }
}

impl From<&str> for Scalar {
    fn from(s: &str) -> Self {
        Scalar::String(s.to_owned())
    }
}

impl From<String> for Scalar {
    fn from(s: String) -> Self {
        Scalar::String(s)
    }
}

impl From<i64> for Scalar {
    fn from(n: i64) -> Self {
        Scalar::Integer(n)
    }
}

impl From<f64> for Scalar {
    fn from(n: f64) -> Self {
        Scalar::Number(n)
    }
}

/// One flat row of input data keyed by column name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    row: usize,
    fields: HashMap<String, Scalar>,
}

impl Record {
    pub fn new(row: usize) -> Self {
        Self {
            row,
            fields: HashMap::new(),
        }
    }

    pub fn with<K: Into<String>, V: Into<Scalar>>(mut self, column: K, value: V) -> Self {
        self.insert(column, value);
        self
    }

    pub fn insert<K: Into<String>, V: Into<Scalar>>(&mut self, column: K, value: V) {
        self.fields.insert(column.into(), value.into());
    }

    /// 1-based position of the row in its source.
    #[inline]
    pub fn row(&self) -> usize {
        self.row
    }

    #[inline]
    pub fn get(&self, column: &str) -> Option<&Scalar> {
        self.fields.get(column)
    }

    /// Like `get`, but treats null and blank cells as missing.
    pub fn get_present(&self, column: &str) -> Option<&Scalar> {
        self.fields.get(column).filter(|v| !v.is_empty())
    }

    pub fn columns(&self) -> impl Iterator<Item = &String> {
        self.fields.keys()
    }
}
