pub mod dto;
pub mod memory;

use std::env;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode, Url};
use serde::de::DeserializeOwned;
use tracing::debug;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::{
    CompletionUpdate, Exercise, NewProgressRequest, NewUserRequest, Program, ProgramFilter,
    ProgressRecord, User, Workout, WorkoutLookup,
};

pub use memory::InMemoryFitnessApi;

const DEFAULT_API_URL: &str = "http://127.0.0.1:8000";

#[derive(Clone, Debug)]
pub struct ApiConfig {
    pub base_url: String,
    pub timeout: Option<Duration>,
}

impl ApiConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout: None,
        }
    }

    pub fn new_from_env() -> Result<Self, AppError> {
        let base_url = env::var("API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string());
        let timeout = match env::var("HTTP_TIMEOUT_SECS") {
            Ok(raw) => {
                let secs = raw.parse::<u64>().map_err(|_| {
                    AppError::Config(format!("HTTP_TIMEOUT_SECS is not a number: {}", raw))
                })?;
                Some(Duration::from_secs(secs))
            }
            Err(_) => None,
        };

        Ok(Self { base_url, timeout })
    }
}

/// Remote collaborator owning programs, workouts, exercises, users and progress.
#[async_trait]
pub trait FitnessApi: Send + Sync {
    async fn list_programs(&self, filter: &ProgramFilter) -> Result<Vec<Program>, AppError>;
    async fn list_program_workouts(&self, program_id: i64) -> Result<Vec<Workout>, AppError>;
    async fn get_workout(&self, workout_id: i64) -> Result<WorkoutLookup, AppError>;
    async fn list_exercises(&self, workout_id: i64) -> Result<Vec<Exercise>, AppError>;
    async fn list_progress(&self, user_id: i64) -> Result<Vec<ProgressRecord>, AppError>;
    async fn create_progress(&self, req: &NewProgressRequest) -> Result<ProgressRecord, AppError>;
    async fn update_progress_completion(
        &self,
        progress_id: i64,
        is_completed: bool,
    ) -> Result<ProgressRecord, AppError>;
    async fn find_user(&self, external_id: &str) -> Result<Option<User>, AppError>;
    async fn create_user(&self, external_id: &str) -> Result<User, AppError>;
}

pub struct HttpFitnessApi {
    client: Client,
    base_url: Url,
}

impl HttpFitnessApi {
    pub fn new(config: ApiConfig) -> Result<Self, AppError> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| AppError::Config(format!("Failed to build http client: {}", e)))?;

        let base_url = Url::parse(config.base_url.trim_end_matches('/'))
            .map_err(|e| AppError::Config(format!("Invalid API_URL {}: {}", config.base_url, e)))?;

        Ok(Self { client, base_url })
    }

    fn url(&self, path: &str) -> Result<Url, AppError> {
        let raw = format!("{}{}", self.base_url.as_str().trim_end_matches('/'), path);
        Url::parse(&raw).map_err(|e| AppError::Config(format!("Invalid request url {}: {}", raw, e)))
    }

    async fn send(&self, request: RequestBuilder, what: &str) -> Result<String, AppError> {
        let request_id = Uuid::new_v4().to_string();
        debug!(%request_id, "{}: sending request", what);

        let response = request
            .header("X-Request-Id", request_id.as_str())
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        debug!(%request_id, %status, "{}: response received", what);

        if status == StatusCode::NOT_FOUND {
            return Err(AppError::NotFound);
        }
        if !status.is_success() {
            return Err(AppError::Api {
                status: status.as_u16(),
                message: dto::ErrorBody::message(&body),
            });
        }
        Ok(body)
    }

    async fn get_list<T: DeserializeOwned>(&self, url: Url, what: &str) -> Result<Vec<T>, AppError> {
        let body = self.send(self.client.get(url), what).await?;
        dto::decode_list(&body, what)
    }
}

#[async_trait]
impl FitnessApi for HttpFitnessApi {
    async fn list_programs(&self, filter: &ProgramFilter) -> Result<Vec<Program>, AppError> {
        let mut url = self.url("/programs")?;
        {
            let mut query = url.query_pairs_mut();
            for (key, value) in filter.query_pairs() {
                query.append_pair(key, &value);
            }
        }
        if url.query() == Some("") {
            url.set_query(None);
        }
        self.get_list(url, "programs").await
    }

    async fn list_program_workouts(&self, program_id: i64) -> Result<Vec<Workout>, AppError> {
        let url = self.url(&format!("/workouts/{}", program_id))?;
        self.get_list(url, "workouts").await
    }

    async fn get_workout(&self, workout_id: i64) -> Result<WorkoutLookup, AppError> {
        let url = self.url(&format!("/workouts/single/{}", workout_id))?;
        let body = self.send(self.client.get(url), "workout").await?;
        dto::decode_one(&body, "workout")
    }

    async fn list_exercises(&self, workout_id: i64) -> Result<Vec<Exercise>, AppError> {
        let url = self.url(&format!("/workouts/{}/exercises", workout_id))?;
        self.get_list(url, "exercises").await
    }

    async fn list_progress(&self, user_id: i64) -> Result<Vec<ProgressRecord>, AppError> {
        let url = self.url(&format!("/users/{}/progress", user_id))?;
        self.get_list(url, "progress").await
    }

    async fn create_progress(&self, req: &NewProgressRequest) -> Result<ProgressRecord, AppError> {
        let url = self.url("/progress")?;
        let body = self
            .send(self.client.post(url).json(req), "create progress")
            .await?;
        dto::decode_one(&body, "created progress")
    }

    async fn update_progress_completion(
        &self,
        progress_id: i64,
        is_completed: bool,
    ) -> Result<ProgressRecord, AppError> {
        let url = self.url(&format!("/progress/{}/complete", progress_id))?;
        let update = CompletionUpdate { is_completed };
        let body = self
            .send(self.client.patch(url).json(&update), "update progress")
            .await?;
        dto::decode_one(&body, "updated progress")
    }

    async fn find_user(&self, external_id: &str) -> Result<Option<User>, AppError> {
        let mut url = self.url("/users")?;
        url.path_segments_mut()
            .map_err(|_| AppError::Config("API_URL cannot be a base".to_string()))?
            .push(external_id);

        match self.send(self.client.get(url), "user").await {
            Ok(body) => Ok(Some(dto::decode_one(&body, "user")?)),
            Err(AppError::NotFound) => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn create_user(&self, external_id: &str) -> Result<User, AppError> {
        let url = self.url("/users")?;
        let req = NewUserRequest {
            external_id: external_id.to_string(),
        };
        let body = self
            .send(self.client.post(url).json(&req), "create user")
            .await?;
        dto::decode_one(&body, "created user")
    }
}
