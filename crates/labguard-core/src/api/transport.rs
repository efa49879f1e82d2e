//! Authenticated JSON transport shared by the REST clients.

use std::sync::Arc;

use labguard_types::ApiError;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::auth::Credentials;

/// Sends JSON requests with a bearer token and maps Google error documents
/// to [`ApiError`].
#[derive(Clone)]
pub struct GoogleHttp {
    http: Client,
    credentials: Arc<Credentials>,
}

impl GoogleHttp {
    pub fn new(http: Client, credentials: Arc<Credentials>) -> Self {
        Self { http, credentials }
    }

    pub async fn get<T>(&self, url: &str, query: &[(&str, &str)]) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
    {
        self.send(self.http.get(url).query(query)).await
    }

    pub async fn post<B, T>(&self, url: &str, query: &[(&str, &str)], body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        self.send(self.http.post(url).query(query).json(body)).await
    }

    pub async fn patch<B, T>(&self, url: &str, query: &[(&str, &str)], body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        self.send(self.http.patch(url).query(query).json(body)).await
    }

    async fn send<T>(&self, request: RequestBuilder) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
    {
        let token = self.credentials.access_token().await.map_err(|e| ApiError::Transport {
            message: format!("credential refresh failed: {e}"),
        })?;

        let mut request = request.bearer_auth(token);
        if let Some(project) = self.credentials.quota_project() {
            request = request.header("x-goog-user-project", project);
        }

        let response =
            request.send().await.map_err(|e| ApiError::Transport { message: e.to_string() })?;
        let status = response.status();
        let body =
            response.text().await.map_err(|e| ApiError::Transport { message: e.to_string() })?;

        if !status.is_success() {
            return Err(ApiError::from_response(status.as_u16(), &body));
        }

        let body = if body.trim().is_empty() { "{}" } else { body.as_str() };
        serde_json::from_str(body).map_err(|e| ApiError::InvalidResponse { message: e.to_string() })
    }
}
