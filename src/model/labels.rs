use std::collections::BTreeMap;
use std::fmt;

pub type LabelName = String;

pub type LabelValue = String;

/// Label set of a sample. Ordered by name so output is deterministic.
pub type Labels = BTreeMap<LabelName, LabelValue>;

pub const NAME_LABEL: &str = "__name__";

/// Escapes a label value for exposition text and PromQL string literals.
pub fn escape_label_value(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            _ => out.push(ch),
        }
    }
    out
}

/// Replaces everything outside `[A-Za-z0-9_:]` with `_` and prefixes a leading digit.
pub fn sanitize_metric_name(name: &str) -> String {
    sanitize(name, |c| c.is_ascii_alphanumeric() || c == '_' || c == ':')
}

/// Same as `sanitize_metric_name` but `:` is not allowed in label names.
pub fn sanitize_label_name(name: &str) -> String {
    sanitize(name, |c| c.is_ascii_alphanumeric() || c == '_')
}

fn sanitize<F: Fn(char) -> bool>(name: &str, allowed: F) -> String {
    let mut out: String = name
        .chars()
        .map(|c| if allowed(c) { c } else { '_' })
        .collect();

    if out.starts_with(|c: char| c.is_ascii_digit()) {
        out.insert(0, '_');
    }
    out
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum MatchOp {
    Eql,
    Neq,
    EqlRe,
    NeqRe,
}

impl MatchOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchOp::Eql => "=",
            MatchOp::Neq => "!=",
            MatchOp::EqlRe => "=~",
            MatchOp::NeqRe => "!~",
        }
    }
}

impl std::convert::TryFrom<&str> for MatchOp {
    type Error = crate::error::Error;

    /// Accepts PromQL, Flux and InfluxQL spellings of the comparison.
    fn try_from(op: &str) -> crate::error::Result<Self> {
        match op {
            "=" | "==" => Ok(MatchOp::Eql),
            "!=" | "<>" => Ok(MatchOp::Neq),
            "=~" => Ok(MatchOp::EqlRe),
            "!~" => Ok(MatchOp::NeqRe),
            _ => Err(crate::error::Error::format(format!(
                "unexpected match op literal '{}'",
                op
            ))),
        }
    }
}

/// A PromQL label matcher such as `host="server01"` or `path=~"/api/.*"`.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelMatcher {
    label: LabelName,
    match_op: MatchOp,
    value: LabelValue,
}

impl LabelMatcher {
    pub fn new<N, V>(label: N, match_op: MatchOp, value: V) -> Self
    where
        N: Into<LabelName>,
        V: Into<LabelValue>,
    {
        Self {
            label: sanitize_label_name(&label.into()),
            match_op,
            value: value.into(),
        }
    }

    pub fn label(&self) -> &LabelName {
        &self.label
    }

    pub fn match_op(&self) -> MatchOp {
        self.match_op
    }

    pub fn value(&self) -> &LabelValue {
        &self.value
    }
}

impl fmt::Display for LabelMatcher {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{}{}\"{}\"",
            self.label,
            self.match_op.as_str(),
            escape_label_value(&self.value)
        )
    }
}
