//! Flows and the flow catalog.

use crate::client::ApiClient;
use crate::error::ApiResult;
use chrono::{DateTime, Utc};
use command_router::{FlowDirectory, FlowSummary};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Organization a flow belongs to.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Organization {
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub parameterized_name: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub active: bool,
    #[serde(default)]
    pub user_count: i64,
    #[serde(default)]
    pub user_limit: i64,
    #[serde(default)]
    pub flow_admins: bool,
    #[serde(default)]
    pub billing_method: String,
}

/// A flow as returned by `GET /flows`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Flow {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub parameterized_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub web_url: String,
    #[serde(default)]
    pub access_mode: String,
    #[serde(default)]
    pub flow_admin: bool,
    #[serde(default)]
    pub open: bool,
    #[serde(default)]
    pub joined: bool,
    #[serde(default)]
    pub last_message_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub last_message_id: Option<i64>,
    #[serde(default)]
    pub team_notifications: bool,
    #[serde(default)]
    pub organization: Organization,
}

impl Flow {
    /// `organization/flow` path used by the streaming filter.
    pub fn stream_path(&self) -> String {
        format!(
            "{}/{}",
            self.organization.parameterized_name, self.parameterized_name
        )
    }
}

/// A snapshot of every flow visible to the token, indexed by ID.
#[derive(Debug, Clone, Default)]
pub struct FlowCatalog {
    flows: Vec<Flow>,
    by_id: HashMap<String, usize>,
}

impl FlowCatalog {
    pub fn new(flows: Vec<Flow>) -> Self {
        let by_id = flows
            .iter()
            .enumerate()
            .map(|(i, flow)| (flow.id.clone(), i))
            .collect();
        Self { flows, by_id }
    }

    pub fn flows(&self) -> &[Flow] {
        &self.flows
    }

    pub fn get(&self, id: &str) -> Option<&Flow> {
        self.by_id.get(id).map(|i| &self.flows[*i])
    }

    /// Human name of a flow ID, falling back to the ID itself.
    pub fn display_name<'a>(&'a self, id: &'a str) -> &'a str {
        self.get(id).map(|flow| flow.name.as_str()).unwrap_or(id)
    }

    pub fn len(&self) -> usize {
        self.flows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flows.is_empty()
    }
}

impl FlowDirectory for FlowCatalog {
    fn list_all(&self) -> Vec<FlowSummary> {
        self.flows
            .iter()
            .map(|flow| FlowSummary::new(&flow.id, &flow.name, &flow.parameterized_name))
            .collect()
    }
}

impl ApiClient {
    /// Every flow visible to the token.
    pub async fn list_flows(&self) -> ApiResult<Vec<Flow>> {
        let flows: Vec<Flow> = self.get_json("flows").await?;
        tracing::info!(count = flows.len(), "Fetched flows");
        Ok(flows)
    }

    /// Fetch the flows and index them.
    pub async fn flow_catalog(&self) -> ApiResult<FlowCatalog> {
        Ok(FlowCatalog::new(self.list_flows().await?))
    }
}
