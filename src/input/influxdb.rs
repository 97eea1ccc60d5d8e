use log::{debug, info};
use serde::Serialize;

use crate::error::{Error, ErrorKind, Result};

/// Connection settings for a live InfluxDB v2 query.
#[derive(Debug, Clone, PartialEq)]
pub struct InfluxConfig {
    pub url: String,
    pub token: String,
    pub org: String,
}

#[derive(Serialize)]
struct QueryRequest<'a> {
    query: &'a str,
    #[serde(rename = "type")]
    kind: &'static str,
    dialect: Dialect,
}

#[derive(Serialize)]
struct Dialect {
    header: bool,
    delimiter: &'static str,
    annotations: &'static [&'static str],
}

pub struct InfluxClient {
    agent: ureq::Agent,
    config: InfluxConfig,
}

impl InfluxClient {
    pub fn new(config: InfluxConfig) -> Self {
        Self {
            agent: ureq::Agent::new(),
            config,
        }
    }

    /// Blocking I/O. Runs a Flux query and returns the raw annotated CSV response.
    pub fn query(&self, flux: &str) -> Result<String> {
        let url = format!("{}/api/v2/query", self.config.url.trim_end_matches('/'));
        let body = serde_json::to_string(&QueryRequest {
            query: flux,
            kind: "flux",
            dialect: Dialect {
                header: true,
                delimiter: ",",
                annotations: &["datatype", "group", "default"],
            },
        })
        .map_err(|e| (ErrorKind::ExternalQuery, "couldn't encode query request", e))?;

        info!("querying {} (org {})", url, self.config.org);
        debug!("flux query: {}", flux);

        let response = self
            .agent
            .post(&url)
            .query("org", &self.config.org)
            .set("Authorization", &format!("Token {}", self.config.token))
            .set("Accept", "application/csv")
            .set("Content-Type", "application/json")
            .send_string(&body);

        match response {
            Ok(response) => response.into_string().map_err(|e| {
                (
                    ErrorKind::ExternalQuery,
                    "couldn't read InfluxDB response",
                    e,
                )
                    .into()
            }),
            Err(ureq::Error::Status(code, response)) => {
                let text = response.into_string().unwrap_or_default();
                Err(Error::external_query(format!(
                    "query failed with status code {}: {}",
                    code,
                    text.trim()
                )))
            }
            Err(e) => Err((ErrorKind::ExternalQuery, "couldn't reach InfluxDB", e).into()),
        }
    }
}
