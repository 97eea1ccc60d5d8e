use std::time::Duration;

use lazy_static::lazy_static;
use log::{debug, trace, warn};
use regex::{Captures, Regex};

use super::query::{Clause, PromQuery};
use crate::parser::parse_duration;

lazy_static! {
    static ref OR: Regex = Regex::new(r"(?i)\bor\b").unwrap();
}

pub type Build = fn(&Captures) -> Vec<Clause>;

/// A pattern recognised in the source query and the clauses it yields.
pub struct Rule {
    name: &'static str,
    pattern: Regex,
    repeat: bool,
    build: Build,
}

impl Rule {
    /// Applies to the first match only.
    pub fn once(name: &'static str, pattern: Regex, build: Build) -> Self {
        Self {
            name,
            pattern,
            repeat: false,
            build,
        }
    }

    /// Applies to every non-overlapping match.
    pub fn every(name: &'static str, pattern: Regex, build: Build) -> Self {
        Self {
            name,
            pattern,
            repeat: true,
            build,
        }
    }

    #[inline]
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn apply(&self, query: &str) -> Vec<Clause> {
        if self.repeat {
            self.pattern
                .captures_iter(query)
                .flat_map(|caps| (self.build)(&caps))
                .collect()
        } else {
            self.pattern
                .captures(query)
                .map(|caps| (self.build)(&caps))
                .unwrap_or_default()
        }
    }
}

/// Runs the rules in order over the query. Unrecognised text is ignored.
pub fn apply_rules(rules: &[Rule], query: &str) -> PromQuery {
    let mut promql = PromQuery::default();

    for rule in rules {
        let clauses = rule.apply(query);
        if clauses.is_empty() {
            trace!("rule '{}' did not match", rule.name());
        }
        for clause in clauses {
            debug!("rule '{}' matched: {:?}", rule.name(), clause);
            promql.apply(clause);
        }
    }

    promql
}

/// Text of capture group `i`, if it participated in the match.
pub fn group<'t>(caps: &Captures<'t>, i: usize) -> Option<&'t str> {
    caps.get(i).map(|m| m.as_str())
}

/// True when the conditions in `body` are joined by `or`. Text matched by
/// `operand` is skipped, so an `or` inside a quoted value does not count.
pub fn is_disjunction(body: &str, operand: &Regex) -> bool {
    OR.is_match(&operand.replace_all(body, " "))
}

/// Duration literal as PromQL understands it, or a warning and nothing.
pub fn duration(literal: &str) -> Option<Duration> {
    match parse_duration(literal.trim()) {
        Ok(d) => Some(d),
        Err(e) => {
            warn!("ignoring duration '{}': {}", literal, e.message());
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::translate::query::Aggregation;

    fn measurement(caps: &Captures) -> Vec<Clause> {
        vec![Clause::Measurement(caps[1].to_owned())]
    }

    fn aggregate(caps: &Captures) -> Vec<Clause> {
        Aggregation::from_name(&caps[1])
            .map(Clause::Aggregate)
            .into_iter()
            .collect()
    }

    #[test]
    fn test_once_and_every() {
        let once = Rule::once("m", Regex::new(r"m=(\w+)").unwrap(), measurement);
        let every = Rule::every("m", Regex::new(r"m=(\w+)").unwrap(), measurement);

        assert_eq!(vec![Clause::Measurement("cpu".into())], once.apply("m=cpu m=mem"));
        assert_eq!(
            vec![
                Clause::Measurement("cpu".into()),
                Clause::Measurement("mem".into())
            ],
            every.apply("m=cpu m=mem")
        );
        assert!(once.apply("nothing here").is_empty());
    }

    #[test]
    fn test_apply_rules() {
        let rules = vec![
            Rule::once("measurement", Regex::new(r"m=(\w+)").unwrap(), measurement),
            Rule::once("aggregate", Regex::new(r"fn=(\w+)").unwrap(), aggregate),
        ];

        assert_eq!("avg(cpu)", apply_rules(&rules, "m=cpu fn=mean").render());
        assert_eq!("cpu", apply_rules(&rules, "m=cpu fn=last").render());
        assert!(apply_rules(&rules, "").is_empty());
    }

    #[test]
    fn test_is_disjunction() {
        let operand = Regex::new(r#"\w+ == "[^"]*""#).unwrap();

        #[rustfmt::skip]
        let tests = [
            (r#"host == "a" or host == "b""#, true),
            (r#"host == "a" OR host == "b""#, true),
            (r#"host == "a" and dc == "b""#, false),
            (r#"host == "a or b""#, false),
            (r#"host == "a" and vendor > 1"#, false),
        ];

        for (body, expected) in &tests {
            assert_eq!(*expected, is_disjunction(body, &operand), "while checking {}", body);
        }
    }

    #[test]
    fn test_duration() {
        assert_eq!(Some(Duration::from_secs(300)), duration(" 5m "));
        assert_eq!(None, duration("1mo"));
        assert_eq!(None, duration("-1h"));
    }
}
