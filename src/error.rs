use std::{error, fmt};

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ErrorKind {
    /// Malformed JSON, CSV, annotated CSV or timestamp input.
    Format,
    /// Missing or invalid metric naming inputs, metric type or data source.
    Config,
    /// Query language cannot be detected or the forced type is unknown.
    UnsupportedQuery,
    /// The live query against InfluxDB failed.
    ExternalQuery,
    Io,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let s = match self {
            ErrorKind::Format => "format error",
            ErrorKind::Config => "config error",
            ErrorKind::UnsupportedQuery => "unsupported query",
            ErrorKind::ExternalQuery => "external query error",
            ErrorKind::Io => "I/O error",
        };
        write!(f, "{}", s)
    }
}

pub struct Error {
    kind: ErrorKind,
    message: String,
    source: Option<Box<dyn error::Error>>,
}

impl Error {
    pub fn new<M: Into<String>>(kind: ErrorKind, message: M) -> Self {
        Self {
            kind,
            message: message.into(),
            source: None,
        }
    }

    pub fn format<M: Into<String>>(message: M) -> Self {
        Self::new(ErrorKind::Format, message)
    }

    pub fn config<M: Into<String>>(message: M) -> Self {
        Self::new(ErrorKind::Config, message)
    }

    pub fn unsupported_query<M: Into<String>>(message: M) -> Self {
        Self::new(ErrorKind::UnsupportedQuery, message)
    }

    pub fn external_query<M: Into<String>>(message: M) -> Self {
        Self::new(ErrorKind::ExternalQuery, message)
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Debug for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Unexpected error: {}", self)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self.source {
            Some(err) => write!(
                f,
                "{}: {}. Source error: {}",
                self.kind, self.message, err
            ),
            None => write!(f, "{}: {}", self.kind, self.message),
        }
    }
}

impl error::Error for Error {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self.source {
            Some(ref err) => Some(&**err),
            None => None,
        }
    }
}

impl<E: error::Error + 'static> From<(ErrorKind, String, E)> for Error {
    fn from((kind, message, err): (ErrorKind, String, E)) -> Self {
        Self {
            kind,
            message,
            source: Some(Box::new(err)),
        }
    }
}

impl<E: error::Error + 'static> From<(ErrorKind, &str, E)> for Error {
    fn from((kind, message, err): (ErrorKind, &str, E)) -> Self {
        Self {
            kind,
            message: message.into(),
            source: Some(Box::new(err)),
        }
    }
}

impl From<Error> for String {
    fn from(err: Error) -> Self {
        format!("{}", err)
    }
}

pub type Result<T> = std::result::Result<T, Error>;
