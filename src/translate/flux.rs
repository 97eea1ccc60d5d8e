use std::convert::TryFrom;

use lazy_static::lazy_static;
use log::{debug, warn};
use regex::{Captures, Regex};

use super::query::{Aggregation, Clause};
use super::rule::{duration, group, is_disjunction, Rule};
use crate::convert::namer::{FIELD_COLUMN, MEASUREMENT_COLUMN};
use crate::model::{LabelMatcher, MatchOp};

lazy_static! {
    pub static ref FLUX_RULES: Vec<Rule> = vec![
        Rule::once(
            "bucket",
            Regex::new(r#"\bfrom\s*\(\s*bucket\s*:\s*"([^"]*)"\s*\)"#).unwrap(),
            bucket,
        ),
        Rule::once(
            "range",
            Regex::new(r"\|>\s*range\s*\(\s*start\s*:\s*([^,\s)]+)").unwrap(),
            range,
        ),
        // The body runs up to the next `|>`.
        Rule::every(
            "filter",
            Regex::new(r"\bfilter\s*\(\s*fn\s*:\s*\(\s*r\s*\)\s*=>((?:[^|]|\|[^>])*)").unwrap(),
            filter,
        ),
        Rule::once(
            "aggregateWindow",
            Regex::new(r"\|>\s*aggregateWindow\s*\(([^)]*)\)").unwrap(),
            aggregate_window,
        ),
        Rule::once(
            "aggregate",
            Regex::new(r"\|>\s*(mean|sum|count|min|max|stddev|median)\s*\(").unwrap(),
            aggregate,
        ),
        Rule::once(
            "group",
            Regex::new(r"\|>\s*group\s*\(\s*columns\s*:\s*\[([^\]]*)\]").unwrap(),
            group_columns,
        ),
    ];
    // `r.col == "v"`, `r["col"] != "v"` or `r.col =~ /re/`.
    static ref PREDICATE: Regex = Regex::new(
        r#"\br(?:\.([A-Za-z_][A-Za-z0-9_]*)|\[\s*"([^"]+)"\s*\])\s*(==|!=|=~|!~)\s*(?:"((?:[^"\\]|\\.)*)"|/((?:[^/\\]|\\.)*)/)"#
    )
    .unwrap();
    static ref EVERY: Regex = Regex::new(r"\bevery\s*:\s*([0-9A-Za-z]+)").unwrap();
    static ref FN: Regex = Regex::new(r"\bfn\s*:\s*([A-Za-z_]+)").unwrap();
}

fn bucket(caps: &Captures) -> Vec<Clause> {
    vec![Clause::Bucket(caps[1].to_owned())]
}

fn range(caps: &Captures) -> Vec<Clause> {
    let start = &caps[1];
    match start.strip_prefix('-') {
        Some(literal) => duration(literal).map(Clause::Range).into_iter().collect(),
        None => {
            debug!("range start '{}' is not relative to now; keeping an instant selector", start);
            vec![]
        }
    }
}

fn filter(caps: &Captures) -> Vec<Clause> {
    let body = &caps[1];
    let clauses = PREDICATE.captures_iter(body).flat_map(|p| predicate(&p));
    if !is_disjunction(body, &PREDICATE) {
        return clauses.collect();
    }

    let mut alternatives = Vec::new();
    for clause in clauses {
        match clause {
            Clause::Matcher(m) => alternatives.push(m),
            other => {
                warn!("ignoring filter that joins {:?} with 'or': {}", other, body.trim());
                return vec![];
            }
        }
    }
    if alternatives.is_empty() {
        return vec![];
    }
    vec![Clause::AnyOf(alternatives)]
}

fn predicate(caps: &Captures) -> Vec<Clause> {
    let column = match group(caps, 1).or_else(|| group(caps, 2)) {
        Some(column) => column,
        None => return vec![],
    };

    let (op, value) = match (group(caps, 4), group(caps, 5)) {
        (Some(s), _) => (&caps[3], unescape_string(s)),
        (None, Some(re)) => (regex_op(&caps[3]), re.replace("\\/", "/")),
        (None, None) => return vec![],
    };
    let literal_eq = op == "==";

    match column {
        MEASUREMENT_COLUMN if literal_eq => return vec![Clause::Measurement(value)],
        FIELD_COLUMN if literal_eq => return vec![Clause::Field(value)],
        // _start, _value and the other system columns are not labels.
        _ if column.starts_with('_') => {
            debug!("predicate on '{}' has no label equivalent", column);
            return vec![];
        }
        _ => {}
    }

    match MatchOp::try_from(op) {
        Ok(op) => vec![Clause::Matcher(LabelMatcher::new(column, op, value))],
        Err(e) => {
            warn!("ignoring predicate on '{}': {}", column, e.message());
            vec![]
        }
    }
}

// `r.host == /x/` compares against a regex literal.
fn regex_op(op: &str) -> &str {
    match op {
        "==" => "=~",
        "!=" => "!~",
        other => other,
    }
}

fn aggregate_window(caps: &Captures) -> Vec<Clause> {
    let args = &caps[1];

    let every = match EVERY.captures(args).and_then(|c| duration(&c[1])) {
        Some(every) => every,
        None => {
            warn!("aggregateWindow without a usable 'every' argument");
            return vec![];
        }
    };

    let func = FN.captures(args).and_then(|c| {
        let name = &c[1];
        let func = Aggregation::from_name(name);
        if func.is_none() {
            warn!("aggregate function '{}' has no PromQL equivalent", name);
        }
        func
    });

    vec![Clause::Window(every, func)]
}

fn aggregate(caps: &Captures) -> Vec<Clause> {
    Aggregation::from_name(&caps[1])
        .map(Clause::Aggregate)
        .into_iter()
        .collect()
}

fn group_columns(caps: &Captures) -> Vec<Clause> {
    caps[1]
        .split(',')
        .map(|c| c.trim().trim_matches('"'))
        .filter(|c| !c.is_empty() && !c.starts_with('_'))
        .map(|c| Clause::GroupBy(c.to_owned()))
        .collect()
}

fn unescape_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(ch) = chars.next() {
        match ch {
            '\\' => match chars.next() {
                Some('n') => out.push('\n'),
                Some(next) => out.push(next),
                None => out.push('\\'),
            },
            _ => out.push(ch),
        }
    }
    out
}
