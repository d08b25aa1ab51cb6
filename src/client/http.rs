//! [`CrmApi`] over HTTP with a bearer token.

use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;

use crate::client::{ClientError, ClientResult, CrmApi};
use crate::domain::stats::{AgentPerformance, DashboardStats, WorkStats};
use crate::domain::types::{LeadId, WorkId};
use crate::domain::user::User;
use crate::domain::work::Work;
use crate::dto::api::{LeadDetailResponse, LeadView, LeadsResponse};
use crate::dto::leads::LeadsQuery;
use crate::forms::leads::CreateLeadRequest;

#[derive(Clone)]
pub struct HttpClient {
    client: Client,
    base_url: String,
    token: String,
}

impl std::fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpClient")
            .field("base_url", &self.base_url)
            .field("token", &"[REDACTED]")
            .finish_non_exhaustive()
    }
}

impl HttpClient {
    /// `base_url` is the server root, e.g. `https://crm.example.com`.
    #[must_use]
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: token.into(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api/v1{path}", self.base_url)
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> ClientResult<T> {
        let response = request
            .bearer_auth(&self.token)
            .send()
            .await
            .map_err(|e| ClientError::Transport(e.to_string()))?;
        decode(response).await
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> ClientResult<T> {
    let status = response.status();
    if !status.is_success() {
        log::warn!("{} answered {status}", response.url());
        return Err(ClientError::Status(status.as_u16()));
    }
    response
        .json()
        .await
        .map_err(|e| ClientError::Decode(e.to_string()))
}

impl CrmApi for HttpClient {
    async fn work_stats(&self) -> ClientResult<WorkStats> {
        self.send(self.client.get(self.url("/works/stats"))).await
    }

    async fn complete_work(&self, work_id: WorkId) -> ClientResult<Work> {
        let url = self.url(&format!("/works/{work_id}/complete"));
        self.send(self.client.post(url)).await
    }

    async fn list_leads(&self, query: &LeadsQuery) -> ClientResult<LeadsResponse> {
        self.send(self.client.get(self.url("/leads")).query(query))
            .await
    }

    async fn get_lead(&self, lead_id: LeadId) -> ClientResult<LeadDetailResponse> {
        self.send(self.client.get(self.url(&format!("/leads/{lead_id}"))))
            .await
    }

    async fn create_lead(&self, request: &CreateLeadRequest) -> ClientResult<LeadView> {
        self.send(self.client.post(self.url("/leads")).json(request))
            .await
    }

    async fn list_users(&self) -> ClientResult<Vec<User>> {
        self.send(self.client.get(self.url("/users"))).await
    }

    async fn dashboard_stats(&self) -> ClientResult<DashboardStats> {
        self.send(self.client.get(self.url("/stats/dashboard")))
            .await
    }

    async fn agent_performance(&self) -> ClientResult<Vec<AgentPerformance>> {
        self.send(self.client.get(self.url("/stats/agents"))).await
    }
}
