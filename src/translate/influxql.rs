use std::convert::TryFrom;

use lazy_static::lazy_static;
use log::{debug, warn};
use regex::{Captures, Regex};

use super::query::{Aggregation, Clause};
use super::rule::{duration, group, is_disjunction, Rule};
use crate::model::{LabelMatcher, MatchOp};

lazy_static! {
    pub static ref INFLUXQL_RULES: Vec<Rule> = vec![
        Rule::once(
            "select",
            Regex::new(
                r#"(?is)^\s*SELECT\s+(.+?)\s+FROM\s+((?:"[^"]+"|[^\s;,"]+)(?:\.(?:"[^"]+"|[^\s;,".]+))*)"#
            )
            .unwrap(),
            select,
        ),
        Rule::once(
            "time range",
            Regex::new(r"(?i)\btime\s*>=?\s*now\(\)\s*-\s*((?:[0-9]+[a-z]+)+)").unwrap(),
            time_range,
        ),
        Rule::once(
            "where",
            Regex::new(
                r"(?is)\bWHERE\s+(.+?)\s*(?:\bGROUP\s+BY\b|\bORDER\s+BY\b|\bLIMIT\b|\bSLIMIT\b|\bOFFSET\b|\bSOFFSET\b|\bFILL\s*\(|\bTZ\s*\(|;|$)"
            )
            .unwrap(),
            where_clause,
        ),
        Rule::once(
            "group by",
            Regex::new(
                r"(?is)\bGROUP\s+BY\s+(.+?)\s*(?:\bORDER\s+BY\b|\bLIMIT\b|\bSLIMIT\b|\bOFFSET\b|\bSOFFSET\b|\bFILL\s*\(|\bTZ\s*\(|;|$)"
            )
            .unwrap(),
            group_by,
        ),
    ];
    // `"tag" = 'v'`, `tag <> 'v'` or `tag =~ /re/`.
    static ref CONDITION: Regex = Regex::new(
        r#"(?i)"?\b([A-Za-z_][A-Za-z0-9_]*)"?\s*(=~|!~|!=|<>|=)\s*(?:'((?:[^'\\]|\\.)*)'|/((?:[^/\\]|\\.)*)/)"#
    )
    .unwrap();
    static ref FUNCTION: Regex = Regex::new(
        r#"^\s*([A-Za-z_]+)\s*\(\s*(?:"([^"]+)"|([A-Za-z_][A-Za-z0-9_]*|\*))\s*\)"#
    )
    .unwrap();
    static ref FIELD: Regex = Regex::new(r#"^\s*(?:"([^"]+)"|([A-Za-z_][A-Za-z0-9_]*))"#).unwrap();
    static ref SEGMENT: Regex = Regex::new(r#""([^"]+)"|([^."]+)"#).unwrap();
    static ref GROUP_ITEM: Regex = Regex::new(
        r#"(?i)\btime\s*\(\s*([0-9]+[a-z]+)[^)]*\)|"([^"]+)"|([A-Za-z_][A-Za-z0-9_]*)"#
    )
    .unwrap();
}

fn select(caps: &Captures) -> Vec<Clause> {
    let mut clauses = Vec::new();

    // db.rp.measurement: only the last segment names the series.
    let measurement = SEGMENT
        .captures_iter(&caps[2])
        .last()
        .and_then(|c| group(&c, 1).or_else(|| group(&c, 2)).map(str::to_owned));
    if let Some(measurement) = measurement {
        clauses.push(Clause::Measurement(measurement));
    }

    let fields = &caps[1];
    if fields.contains(',') {
        debug!("only the first of the selected fields is translated: {}", fields);
    }

    if let Some(f) = FUNCTION.captures(fields) {
        match Aggregation::from_name(&f[1]) {
            Some(func) => clauses.push(Clause::Aggregate(func)),
            None => warn!("function '{}' has no PromQL equivalent", &f[1]),
        }
        if let Some(field) = group(&f, 2).or_else(|| group(&f, 3)).filter(|f| *f != "*") {
            clauses.push(Clause::Field(field.to_owned()));
        }
    } else if let Some(f) = FIELD.captures(fields) {
        if let Some(field) = group(&f, 1).or_else(|| group(&f, 2)) {
            clauses.push(Clause::Field(field.to_owned()));
        }
    }

    clauses
}

fn time_range(caps: &Captures) -> Vec<Clause> {
    duration(&caps[1]).map(Clause::Range).into_iter().collect()
}

fn where_clause(caps: &Captures) -> Vec<Clause> {
    let body = &caps[1];
    let matchers = CONDITION.captures_iter(body).filter_map(|c| tag_condition(&c));
    if !is_disjunction(body, &CONDITION) {
        return matchers.map(Clause::Matcher).collect();
    }

    let alternatives: Vec<LabelMatcher> = matchers.collect();
    if alternatives.is_empty() {
        return vec![];
    }
    vec![Clause::AnyOf(alternatives)]
}

fn tag_condition(caps: &Captures) -> Option<LabelMatcher> {
    let tag = &caps[1];
    if tag.eq_ignore_ascii_case("time") {
        return None;
    }

    let (op, value) = match (group(caps, 3), group(caps, 4)) {
        (Some(s), _) => (&caps[2], s.replace("\\'", "'")),
        (None, Some(re)) => (regex_op(&caps[2]), re.replace("\\/", "/")),
        (None, None) => return None,
    };

    match MatchOp::try_from(op) {
        Ok(op) => Some(LabelMatcher::new(tag, op, value)),
        Err(e) => {
            warn!("ignoring condition on '{}': {}", tag, e.message());
            None
        }
    }
}

// `host = /x/` compares against a regex literal.
fn regex_op(op: &str) -> &str {
    match op {
        "=" => "=~",
        "!=" | "<>" => "!~",
        other => other,
    }
}

fn group_by(caps: &Captures) -> Vec<Clause> {
    GROUP_ITEM
        .captures_iter(&caps[1])
        .filter_map(|item| match group(&item, 1) {
            Some(every) => duration(every).map(|d| Clause::Window(d, None)),
            None => group(&item, 2)
                .or_else(|| group(&item, 3))
                .map(|tag| Clause::GroupBy(tag.to_owned())),
        })
        .collect()
}
