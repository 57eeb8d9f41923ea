use futures_util::future::BoxFuture;
use serde::Deserialize;

use crate::error::{AuthError, AuthResult};

/// An IAM policy, only the parts role mapping reads.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Policy {
    #[serde(default)]
    pub bindings: Vec<Binding>,
}

/// Members granted a policy role.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Binding {
    pub role: String,
    #[serde(default)]
    pub members: Vec<String>,
}

/// Where IAM policies are read from.
pub trait PolicySource: Send + Sync + 'static {
    fn get_iam_policy<'a>(&'a self, resource_id: &'a str, credential: &'a str) -> BoxFuture<'a, AuthResult<Policy>>;
}

/// The Cloud Resource Manager `projects.getIamPolicy` api, called with the caller's own access token.
#[derive(Debug, Clone)]
pub struct CloudResourceManager {
    http: reqwest::Client,
    api_base: String,
}

impl CloudResourceManager {
    pub fn new(http: reqwest::Client, api_base: impl Into<String>) -> Self {
        Self { http, api_base: api_base.into() }
    }

    pub fn policy_url(&self, resource_id: &str) -> String {
        format!("{}/v1/projects/{}:getIamPolicy", self.api_base.trim_end_matches('/'), resource_id)
    }

    async fn fetch(&self, resource_id: &str, credential: &str) -> AuthResult<Policy> {
        let response = self.http.post(self.policy_url(resource_id)).bearer_auth(credential).json(&serde_json::json!({})).send().await?;
        if !response.status().is_success() {
            return Err(AuthError::from_response(response).await);
        }
        Ok(response.json().await?)
    }
}

impl PolicySource for CloudResourceManager {
    fn get_iam_policy<'a>(&'a self, resource_id: &'a str, credential: &'a str) -> BoxFuture<'a, AuthResult<Policy>> {
        Box::pin(self.fetch(resource_id, credential))
    }
}
