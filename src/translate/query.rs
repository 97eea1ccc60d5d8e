use std::time::Duration;

use log::{debug, warn};

use crate::convert::namer::join_name;
use crate::model::{sanitize_label_name, sanitize_metric_name, LabelMatcher, MatchOp};
use crate::parser::format_duration;

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Aggregation {
    Mean,
    Sum,
    Count,
    Min,
    Max,
    Stddev,
    Median,
}

impl Aggregation {
    /// Flux and InfluxQL function names, case-insensitive.
    pub fn from_name(name: &str) -> Option<Self> {
        use Aggregation::*;
        match name.to_ascii_lowercase().as_str() {
            "mean" => Some(Mean),
            "sum" => Some(Sum),
            "count" => Some(Count),
            "min" => Some(Min),
            "max" => Some(Max),
            "stddev" => Some(Stddev),
            "median" => Some(Median),
            _ => None,
        }
    }

    fn operator(&self) -> &'static str {
        use Aggregation::*;
        match self {
            Mean => "avg",
            Sum => "sum",
            Count => "count",
            Min => "min",
            Max => "max",
            Stddev => "stddev",
            Median => "quantile",
        }
    }

    fn parameter(&self) -> Option<&'static str> {
        match self {
            Aggregation::Median => Some("0.5"),
            _ => None,
        }
    }

    fn arguments(&self, inner: &str) -> String {
        match self.parameter() {
            Some(param) => format!("{}, {}", param, inner),
            None => inner.to_owned(),
        }
    }

    /// `avg_over_time(inner)`; `inner` must be a range vector.
    pub fn over_time(&self, inner: &str) -> String {
        format!("{}_over_time({})", self.operator(), self.arguments(inner))
    }

    /// `avg(inner)` or `avg by (a, b) (inner)`.
    pub fn aggregate(&self, by: &[String], inner: &str) -> String {
        match by.len() {
            0 => format!("{}({})", self.operator(), self.arguments(inner)),
            _ => format!(
                "{} by ({}) ({})",
                self.operator(),
                by.join(", "),
                self.arguments(inner)
            ),
        }
    }
}

/// One recognised piece of a source query.
#[derive(Debug, Clone, PartialEq)]
pub enum Clause {
    Bucket(String),
    Range(Duration),
    Measurement(String),
    Field(String),
    Matcher(LabelMatcher),
    /// Matchers joined by `or`; any one of them may hold.
    AnyOf(Vec<LabelMatcher>),
    /// Windowed aggregation; the function may come from elsewhere in the query.
    Window(Duration, Option<Aggregation>),
    Aggregate(Aggregation),
    GroupBy(String),
}

/// PromQL expression assembled from clauses. For single-valued clauses the
/// first one applied wins.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct PromQuery {
    measurement: Option<String>,
    field: Option<String>,
    matchers: Vec<LabelMatcher>,
    range: Option<Duration>,
    window: Option<Duration>,
    window_fn: Option<Aggregation>,
    aggregate: Option<Aggregation>,
    group_by: Vec<String>,
}

impl PromQuery {
    pub fn apply(&mut self, clause: Clause) {
        match clause {
            Clause::Bucket(b) => {
                debug!("bucket '{}' has no PromQL equivalent", b);
            }
            Clause::Range(d) => {
                self.range.get_or_insert(d);
            }
            Clause::Measurement(m) => {
                self.measurement.get_or_insert(m);
            }
            Clause::Field(f) => {
                self.field.get_or_insert(f);
            }
            Clause::Matcher(m) => {
                if !self.matchers.contains(&m) {
                    self.matchers.push(m);
                }
            }
            Clause::AnyOf(alternatives) => match merge_alternatives(&alternatives) {
                Some(m) => self.apply(Clause::Matcher(m)),
                None => {
                    let alternatives: Vec<String> =
                        alternatives.iter().map(|m| m.to_string()).collect();
                    warn!(
                        "no single matcher selects {}; dropping the condition",
                        alternatives.join(" or ")
                    );
                }
            },
            Clause::Window(every, func) => {
                if self.window.is_none() {
                    self.window = Some(every);
                    self.window_fn = func;
                }
            }
            Clause::Aggregate(a) => {
                self.aggregate.get_or_insert(a);
            }
            Clause::GroupBy(label) => {
                let label = sanitize_label_name(&label);
                if !self.group_by.contains(&label) {
                    self.group_by.push(label);
                }
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.selector().is_empty()
    }

    /// `measurement_field{matchers}`.
    pub fn selector(&self) -> String {
        let name = match (&self.measurement, &self.field) {
            (Some(m), Some(f)) => join_name(m, f),
            (Some(m), None) => sanitize_metric_name(m),
            (None, Some(f)) => sanitize_metric_name(f),
            (None, None) => String::new(),
        };

        if self.matchers.is_empty() {
            return name;
        }
        let matchers: Vec<String> = self.matchers.iter().map(|m| m.to_string()).collect();
        format!("{}{{{}}}", name, matchers.join(", "))
    }

    pub fn render(&self) -> String {
        let selector = self.selector();

        // A window without its own function (InfluxQL `GROUP BY time(..)`)
        // takes the selected aggregation.
        let mut aggregate = self.aggregate;
        let mut window_fn = self.window_fn;
        if self.window.is_some() && window_fn.is_none() {
            window_fn = aggregate.take();
        }

        let expr = match (self.window, window_fn) {
            (Some(every), Some(func)) => {
                func.over_time(&format!("{}[{}]", selector, format_duration(every)))
            }
            _ => match (aggregate, self.range.or(self.window)) {
                (None, Some(range)) => format!("{}[{}]", selector, format_duration(range)),
                _ => selector,
            },
        };

        let outer = match (aggregate, self.window.and(window_fn)) {
            (Some(a), _) => Some(a),
            (None, Some(func)) if !self.group_by.is_empty() => Some(func),
            _ => None,
        };

        match outer {
            Some(op) => op.aggregate(&self.group_by, &expr),
            None => {
                if !self.group_by.is_empty() {
                    warn!(
                        "grouping by ({}) needs an aggregation; dropping it",
                        self.group_by.join(", ")
                    );
                }
                expr
            }
        }
    }
}

/// `host="a" or host="b"` becomes `host=~"a|b"`. Only equality and regex
/// matches on one label merge.
fn merge_alternatives(alternatives: &[LabelMatcher]) -> Option<LabelMatcher> {
    let label = alternatives.first()?.label();
    if let [only] = alternatives {
        return Some(only.clone());
    }

    let mut patterns: Vec<String> = Vec::with_capacity(alternatives.len());
    for m in alternatives {
        if m.label() != label {
            return None;
        }
        let pattern = match m.match_op() {
            MatchOp::Eql => regex::escape(m.value()),
            MatchOp::EqlRe => m.value().clone(),
            MatchOp::Neq | MatchOp::NeqRe => return None,
        };
        if !patterns.contains(&pattern) {
            patterns.push(pattern);
        }
    }

    Some(LabelMatcher::new(
        label.clone(),
        MatchOp::EqlRe,
        patterns.join("|"),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINUTE: Duration = Duration::from_secs(60);
    const HOUR: Duration = Duration::from_secs(3600);

    fn query(clauses: Vec<Clause>) -> PromQuery {
        let mut q = PromQuery::default();
        for clause in clauses {
            q.apply(clause);
        }
        q
    }

    fn cpu() -> Vec<Clause> {
        vec![
            Clause::Measurement("cpu".into()),
            Clause::Field("usage_user".into()),
        ]
    }

    #[test]
    fn test_render() {
        use Aggregation::*;
        use Clause::*;

        let host = || Matcher(LabelMatcher::new("host", MatchOp::Eql, "server01"));

        #[rustfmt::skip]
        let tests: Vec<(Vec<Clause>, &str)> = vec![
            (vec![], "cpu_usage_user"),
            (vec![Range(HOUR)], "cpu_usage_user[1h]"),
            (vec![host(), Range(HOUR)], "cpu_usage_user{host=\"server01\"}[1h]"),
            (vec![Range(HOUR), Aggregate(Mean)], "avg(cpu_usage_user)"),
            (vec![Range(HOUR), Window(MINUTE, None), Aggregate(Mean)], "avg_over_time(cpu_usage_user[1m])"),
            (vec![Window(5 * MINUTE, Some(Max))], "max_over_time(cpu_usage_user[5m])"),
            (vec![Window(5 * MINUTE, Some(Mean)), Aggregate(Max)], "max(avg_over_time(cpu_usage_user[5m]))"),
            (vec![Window(5 * MINUTE, None), Aggregate(Max), GroupBy("host".into())], "max by (host) (max_over_time(cpu_usage_user[5m]))"),
            (vec![Aggregate(Sum), GroupBy("host".into()), GroupBy("dc".into())], "sum by (host, dc) (cpu_usage_user)"),
            (vec![Window(MINUTE, None)], "cpu_usage_user[1m]"),
            (vec![GroupBy("host".into())], "cpu_usage_user"),
            (vec![Aggregate(Median)], "quantile(0.5, cpu_usage_user)"),
            (vec![Window(MINUTE, Some(Median)), GroupBy("host".into())], "quantile by (host) (0.5, quantile_over_time(0.5, cpu_usage_user[1m]))"),
        ];

        for (clauses, expected) in tests {
            let mut all = cpu();
            all.extend(clauses.clone());
            assert_eq!(expected, query(all).render(), "while rendering {:?}", clauses);
        }
    }

    #[test]
    fn test_first_clause_wins() {
        let q = query(vec![
            Clause::Measurement("cpu".into()),
            Clause::Measurement("mem".into()),
            Clause::Range(HOUR),
            Clause::Range(MINUTE),
            Clause::Bucket("system".into()),
        ]);
        assert_eq!("cpu[1h]", q.render());
    }

    #[test]
    fn test_any_of() {
        let eq = |label: &str, value: &str| LabelMatcher::new(label, MatchOp::Eql, value);

        #[rustfmt::skip]
        let tests: Vec<(Vec<LabelMatcher>, &str)> = vec![
            (vec![eq("host", "a"), eq("host", "b")], r#"cpu{host=~"a|b"}"#),
            (vec![eq("host", "a"), eq("host", "b.c"), eq("host", "a")], r#"cpu{host=~"a|b\\.c"}"#),
            (vec![eq("host", "a"), LabelMatcher::new("host", MatchOp::EqlRe, "^web")], r#"cpu{host=~"a|^web"}"#),
            (vec![eq("host", "a")], r#"cpu{host="a"}"#),
            (vec![eq("host", "a"), eq("dc", "b")], "cpu"),
            (vec![eq("host", "a"), LabelMatcher::new("host", MatchOp::Neq, "b")], "cpu"),
            (vec![], "cpu"),
        ];

        for (alternatives, expected) in tests {
            let q = query(vec![
                Clause::Measurement("cpu".into()),
                Clause::AnyOf(alternatives.clone()),
            ]);
            assert_eq!(expected, q.render(), "while merging {:?}", alternatives);
        }
    }

    #[test]
    fn test_selector_without_name() {
        let q = query(vec![Clause::Matcher(LabelMatcher::new(
            "job",
            MatchOp::EqlRe,
            "node.*",
        ))]);
        assert_eq!("{job=~\"node.*\"}", q.render());
        assert!(!q.is_empty());
        assert!(PromQuery::default().is_empty());
    }

    #[test]
    fn test_names_are_sanitized() {
        let q = query(vec![
            Clause::Measurement("disk io".into()),
            Clause::Field("read-bytes".into()),
            Clause::GroupBy("host-name".into()),
            Clause::Aggregate(Aggregation::Sum),
        ]);
        assert_eq!("sum by (host_name) (disk_io_read_bytes)", q.render());
    }
}
