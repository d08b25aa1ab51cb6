//! Typed access to the JSON API and the client-side work view state.

use std::future::Future;

use thiserror::Error;

use crate::domain::stats::{AgentPerformance, DashboardStats, WorkStats};
use crate::domain::types::{LeadId, WorkId};
use crate::domain::user::User;
use crate::domain::work::Work;
use crate::dto::api::{LeadDetailResponse, LeadView, LeadsResponse};
use crate::dto::leads::LeadsQuery;
use crate::forms::leads::CreateLeadRequest;

pub mod http;
pub mod notifications;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("request failed: {0}")]
    Transport(String),

    #[error("server answered {0}")]
    Status(u16),

    #[error("unexpected response body: {0}")]
    Decode(String),
}

pub type ClientResult<T> = Result<T, ClientError>;

/// Operations of the `/api/v1` endpoints.
pub trait CrmApi {
    fn work_stats(&self) -> impl Future<Output = ClientResult<WorkStats>>;

    fn complete_work(&self, work_id: WorkId) -> impl Future<Output = ClientResult<Work>>;

    fn list_leads(&self, query: &LeadsQuery) -> impl Future<Output = ClientResult<LeadsResponse>>;

    fn get_lead(&self, lead_id: LeadId) -> impl Future<Output = ClientResult<LeadDetailResponse>>;

    fn create_lead(&self, request: &CreateLeadRequest) -> impl Future<Output = ClientResult<LeadView>>;

    fn list_users(&self) -> impl Future<Output = ClientResult<Vec<User>>>;

    fn dashboard_stats(&self) -> impl Future<Output = ClientResult<DashboardStats>>;

    fn agent_performance(&self) -> impl Future<Output = ClientResult<Vec<AgentPerformance>>>;
}
