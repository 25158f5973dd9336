//! Source connector interface.
//!
//! The connector runs the query against the database and hands back rows
//! already decoded into [`Record`]s. Query execution, consistency and the RPC
//! priority are its business; the converter only sees records.

use crate::options::ExportOptions;
use crate::value::Record;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Priority hint forwarded to the database for the read RPCs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RpcPriority {
    Low,
    Medium,
    #[default]
    High,
}

impl fmt::Display for RpcPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Low => f.write_str("LOW"),
            Self::Medium => f.write_str("MEDIUM"),
            Self::High => f.write_str("HIGH"),
        }
    }
}

/// One read against the source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadRequest {
    pub project_id: String,
    pub instance_id: String,
    pub database_id: String,
    pub query: String,
    pub priority: RpcPriority,
}

impl From<&ExportOptions> for ReadRequest {
    fn from(opts: &ExportOptions) -> Self {
        Self {
            project_id: opts.project_id.clone(),
            instance_id: opts.instance_id.clone(),
            database_id: opts.database_id.clone(),
            query: opts.sql_query.clone(),
            priority: opts.priority,
        }
    }
}

/// Produces the typed rows of a query, in result order.
pub trait RecordSource: Send + Sync {
    fn read(&self, request: &ReadRequest) -> Result<Vec<Record>>;
}

/// In-memory source returning the same records for any request.
#[derive(Debug, Clone, Default)]
pub struct VecSource {
    records: Vec<Record>,
}

impl VecSource {
    pub fn new(records: Vec<Record>) -> Self {
        Self { records }
    }
}

impl RecordSource for VecSource {
    fn read(&self, _request: &ReadRequest) -> Result<Vec<Record>> {
        Ok(self.records.clone())
    }
}

impl<F> RecordSource for F
where
    F: Fn(&ReadRequest) -> Result<Vec<Record>> + Send + Sync,
{
    fn read(&self, request: &ReadRequest) -> Result<Vec<Record>> {
        self(request)
    }
}
