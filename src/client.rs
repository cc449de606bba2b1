use std::sync::Arc;

use http::{Method, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::debug;
use url::Url;

use crate::models::{
    Class, ClassPayload, Discount, DiscountsRequest, DiscountsResponse, Interest, Language,
    Location, NewSchedule, NewTerm, NotePayload, ReferenceData, ResourcesPayload,
    ScheduleRequest, StaffMember, TermRequest,
};
use crate::settings::Settings;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("{message}")]
    Status { status: StatusCode, message: String },
    #[error("Invalid endpoint URL: {0}")]
    Url(#[from] url::ParseError),
}

impl ApiError {
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            ApiError::Http(err) => err.status(),
            ApiError::Url(_) => None,
        }
    }
}

/// Every provider API call the class form makes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Locations,
    Interests,
    Staff,
    Languages,
    CreateClass,
    UpdateClass(i64),
    Schedules(i64),
    Terms(i64),
    Discounts(i64),
    Resources(i64),
    Notes(i64),
}

impl Endpoint {
    pub fn method(&self) -> Method {
        match self {
            Endpoint::Locations | Endpoint::Interests | Endpoint::Staff | Endpoint::Languages => {
                Method::GET
            }
            Endpoint::UpdateClass(_) | Endpoint::Resources(_) => Method::PUT,
            Endpoint::CreateClass
            | Endpoint::Schedules(_)
            | Endpoint::Terms(_)
            | Endpoint::Discounts(_)
            | Endpoint::Notes(_) => Method::POST,
        }
    }

    /// Path relative to the API base, always with a trailing slash.
    pub fn path(&self) -> String {
        match self {
            Endpoint::Locations => "provider/me/locations/".to_string(),
            Endpoint::Interests => "interests/".to_string(),
            Endpoint::Staff => "provider/me/staff/".to_string(),
            Endpoint::Languages => "languages/".to_string(),
            Endpoint::CreateClass => "provider/me/classes/".to_string(),
            Endpoint::UpdateClass(id) => format!("provider/me/classes/{id}/"),
            Endpoint::Schedules(id) => format!("provider/me/classes/{id}/schedules/"),
            Endpoint::Terms(id) => format!("provider/me/classes/{id}/terms/"),
            Endpoint::Discounts(id) => format!("provider/class/{id}/discounts/"),
            Endpoint::Resources(id) => format!("provider/me/classes/{id}/resources/"),
            Endpoint::Notes(id) => format!("provider/me/classes/{id}/notes/"),
        }
    }
}

/// Pulls a readable message out of an error body, if the server sent one.
fn error_message(status: StatusCode, body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|value| {
            ["message", "detail", "error"]
                .iter()
                .find_map(|key| value.get(key)?.as_str().map(str::to_string))
        })
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("Request failed")
                .to_string()
        })
}

#[derive(Clone)]
pub struct ProviderClient {
    client: reqwest::Client,
    base_url: Arc<Url>,
    auth_token: Option<Arc<str>>,
}

impl ProviderClient {
    pub fn new(base_url: Url) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: Arc::new(base_url),
            auth_token: None,
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        let client = Self::new(settings.api_base_url.clone());
        match &settings.auth_token {
            Some(token) => client.with_token(token),
            None => client,
        }
    }

    pub fn with_token(mut self, token: &str) -> Self {
        self.auth_token = Some(Arc::from(token));
        self
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn url(&self, endpoint: Endpoint) -> Result<Url, ApiError> {
        if self.base_url.path().ends_with('/') {
            Ok(self.base_url.join(&endpoint.path())?)
        } else {
            let mut base = (*self.base_url).clone();
            base.set_path(&format!("{}/", base.path()));
            Ok(base.join(&endpoint.path())?)
        }
    }

    async fn call<B, T>(&self, endpoint: Endpoint, body: Option<&B>) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.url(endpoint)?;
        let method = endpoint.method();
        debug!(%method, %url, "provider api request");

        let mut request = self.client.request(method, url.as_str());
        if let Some(token) = &self.auth_token {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::Status {
                status,
                message: error_message(status, &body),
            });
        }
        Ok(response.json::<T>().await?)
    }

    async fn get<T: DeserializeOwned>(&self, endpoint: Endpoint) -> Result<T, ApiError> {
        self.call::<(), T>(endpoint, None).await
    }

    /// Fetches all four selector lists at once. Any single failure fails the lot.
    pub async fn fetch_reference_data(&self) -> Result<ReferenceData, ApiError> {
        let (locations, interests, staff, languages) = futures::try_join!(
            self.get::<Vec<Location>>(Endpoint::Locations),
            self.get::<Vec<Interest>>(Endpoint::Interests),
            self.get::<Vec<StaffMember>>(Endpoint::Staff),
            self.get::<Vec<Language>>(Endpoint::Languages),
        )?;
        Ok(ReferenceData {
            locations,
            interests,
            staff,
            languages,
        })
    }

    pub async fn create_class(&self, payload: &ClassPayload) -> Result<Class, ApiError> {
        self.call(Endpoint::CreateClass, Some(payload)).await
    }

    pub async fn update_class(&self, class_id: i64, payload: &ClassPayload) -> Result<Class, ApiError> {
        self.call(Endpoint::UpdateClass(class_id), Some(payload)).await
    }

    pub async fn create_schedule(&self, class_id: i64, schedule: &NewSchedule) -> Result<Class, ApiError> {
        self.call(Endpoint::Schedules(class_id), Some(&ScheduleRequest { schedule }))
            .await
    }

    pub async fn create_term(&self, class_id: i64, term: &NewTerm) -> Result<Class, ApiError> {
        self.call(Endpoint::Terms(class_id), Some(&TermRequest { term }))
            .await
    }

    /// Replaces the whole discount list of a class.
    pub async fn replace_discounts(
        &self,
        class_id: i64,
        discounts: &[Discount],
    ) -> Result<DiscountsResponse, ApiError> {
        self.call(Endpoint::Discounts(class_id), Some(&DiscountsRequest { discounts }))
            .await
    }

    pub async fn update_resources(
        &self,
        class_id: i64,
        resources: &ResourcesPayload,
    ) -> Result<Class, ApiError> {
        self.call(Endpoint::Resources(class_id), Some(resources)).await
    }

    pub async fn add_note(&self, class_id: i64, note: &NotePayload) -> Result<Class, ApiError> {
        self.call(Endpoint::Notes(class_id), Some(note)).await
    }
}
