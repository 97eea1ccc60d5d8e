//! Best-effort Flux and InfluxQL to PromQL translation.
//!
//! Queries are not parsed into a full syntax tree. An ordered list of rules
//! picks out the pieces that have a PromQL counterpart (measurement, field,
//! tag predicates, time range, windows, aggregations and grouping) and the
//! rest of the query is ignored.
mod detect;
mod flux;
mod influxql;
mod query;
mod rule;

use log::{info, warn};

pub use detect::{detect, QueryLanguage};
pub use query::{Aggregation, Clause, PromQuery};

use crate::error::{Error, Result};

pub fn translate(query: &str, forced: Option<QueryLanguage>) -> Result<String> {
    let language = match forced.or_else(|| detect(query)) {
        Some(language) => language,
        None => {
            return Err(Error::unsupported_query(
                "could not determine the query type, use --type flux or --type influxql",
            ))
        }
    };

    let promql = match language {
        QueryLanguage::Flux => rule::apply_rules(&flux::FLUX_RULES, query),
        QueryLanguage::InfluxQL => rule::apply_rules(&influxql::INFLUXQL_RULES, query),
    };
    if promql.is_empty() {
        warn!("no {} clauses with a PromQL equivalent were found", language);
    }

    let rendered = promql.render();
    info!("translated {} query to: {}", language, rendered);
    Ok(rendered)
}
