use crate::models::{EventContext, VendorCandidate};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Number of ranked vendors forwarded for summarisation
const SUMMARY_VENDOR_COUNT: usize = 5;

/// Errors that can occur when calling the text-generation API
#[derive(Debug, Error)]
pub enum AssistantError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("API returned error: {0}")]
    ApiError(String),

    #[error("Unauthorized: invalid API key")]
    Unauthorized,

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),

    #[error("Request timed out after {0:?}")]
    Timeout(Duration),
}

/// Service names suggested for an event description
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServiceSuggestions {
    #[serde(default)]
    pub services: Vec<String>,
    #[serde(default)]
    pub rationale: String,
}

#[derive(Debug, Serialize)]
struct SuggestionRequest<'a> {
    description: &'a str,
}

#[derive(Debug, Serialize)]
struct SummaryVendor<'a> {
    #[serde(rename = "businessName")]
    business_name: &'a str,
    rating: f64,
    #[serde(rename = "totalReviews")]
    total_reviews: i64,
    #[serde(rename = "offeredServices")]
    offered_services: &'a [String],
    score: f64,
}

#[derive(Debug, Serialize)]
struct SummaryRequest<'a> {
    #[serde(rename = "eventDate")]
    event_date: chrono::NaiveDate,
    #[serde(rename = "budgetMin")]
    budget_min: f64,
    #[serde(rename = "budgetMax")]
    budget_max: f64,
    vendors: Vec<SummaryVendor<'a>>,
}

#[derive(Debug, Deserialize)]
struct SummaryResponse {
    summary: String,
}

/// Client for the external text-generation API
///
/// Only structured data is exchanged: ranked vendors go out for a summary,
/// event descriptions go out for service suggestions. Every call is bounded
/// by the configured timeout.
pub struct AssistantClient {
    base_url: String,
    api_key: String,
    timeout: Duration,
    client: Client,
}

impl AssistantClient {
    /// Create a new assistant client
    pub fn new(base_url: String, api_key: String, timeout: Duration) -> Result<Self, AssistantError> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            base_url,
            api_key,
            timeout,
            client,
        })
    }

    /// Ask for catalog service names suited to a free-text event description
    pub async fn suggest_services(
        &self,
        description: &str,
    ) -> Result<ServiceSuggestions, AssistantError> {
        let suggestions: ServiceSuggestions = self
            .post_json("suggestions", &SuggestionRequest { description })
            .await?;

        tracing::debug!("Assistant suggested {} services", suggestions.services.len());

        Ok(suggestions)
    }

    /// Produce a natural-language summary of the best ranked vendors
    pub async fn summarize_vendors(
        &self,
        event: &EventContext,
        vendors: &[VendorCandidate],
    ) -> Result<String, AssistantError> {
        let payload = SummaryRequest {
            event_date: event.event_date,
            budget_min: event.budget_min,
            budget_max: event.budget_max,
            vendors: vendors
                .iter()
                .take(SUMMARY_VENDOR_COUNT)
                .map(|v| SummaryVendor {
                    business_name: &v.business_name,
                    rating: v.rating,
                    total_reviews: v.total_reviews,
                    offered_services: &v.offered_services,
                    score: v.score,
                })
                .collect(),
        };

        let response: SummaryResponse = self.post_json("summaries", &payload).await?;

        Ok(response.summary)
    }

    async fn post_json<B, R>(&self, path: &str, body: &B) -> Result<R, AssistantError>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let url = format!("{}/{}", self.base_url.trim_end_matches('/'), path);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(body)
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(AssistantError::Unauthorized);
        }
        if !status.is_success() {
            return Err(AssistantError::ApiError(format!("{} returned {}", path, status)));
        }

        let text = response.text().await.map_err(|e| self.classify(e))?;

        serde_json::from_str(&text)
            .map_err(|e| AssistantError::InvalidResponse(format!("Failed to parse {}: {}", path, e)))
    }

    fn classify(&self, error: reqwest::Error) -> AssistantError {
        if error.is_timeout() {
            AssistantError::Timeout(self.timeout)
        } else {
            AssistantError::RequestError(error)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::collections::BTreeSet;

    fn create_event() -> EventContext {
        EventContext {
            id: Some(3),
            event_date: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
            budget_min: 50000.0,
            budget_max: 100000.0,
            event_lat: None,
            event_lng: None,
            required_service_ids: BTreeSet::from([5]),
        }
    }

    fn create_vendor(name: &str) -> VendorCandidate {
        VendorCandidate {
            vendor_id: 1,
            business_name: name.to_string(),
            rating: 4.5,
            total_reviews: 10,
            business_lat: None,
            business_lng: None,
            service_radius: None,
            offered_services: vec!["Buffet Catering".to_string()],
            avg_min_price: None,
            avg_max_price: None,
            availability_score: 1,
            score: 2.8,
            breakdown: vec![],
        }
    }

    fn create_client(url: String) -> AssistantClient {
        AssistantClient::new(url, "test_key".to_string(), Duration::from_secs(2)).unwrap()
    }

    #[tokio::test]
    async fn test_summarize_vendors() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/summaries")
            .match_header("authorization", "Bearer test_key")
            .match_body(mockito::Matcher::PartialJsonString(
                r#"{"eventDate":"2024-06-01"}"#.to_string(),
            ))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"summary":"Grand Hall is your best option."}"#)
            .create_async()
            .await;

        let client = create_client(server.url());
        let summary = client
            .summarize_vendors(&create_event(), &[create_vendor("Grand Hall")])
            .await
            .unwrap();

        assert_eq!(summary, "Grand Hall is your best option.");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_suggest_services() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/suggestions")
            .with_status(200)
            .with_body(r#"{"services":["Buffet Catering"],"rationale":"guests need catering"}"#)
            .create_async()
            .await;

        let client = create_client(format!("{}/", server.url()));
        let suggestions = client.suggest_services("wedding for 200 guests").await.unwrap();

        assert_eq!(suggestions.services, vec!["Buffet Catering".to_string()]);
        assert_eq!(suggestions.rationale, "guests need catering");
    }

    #[tokio::test]
    async fn test_unauthorized() {
        let mut server = mockito::Server::new_async().await;
        server.mock("POST", "/summaries").with_status(401).create_async().await;

        let client = create_client(server.url());
        let result = client.summarize_vendors(&create_event(), &[]).await;

        assert!(matches!(result, Err(AssistantError::Unauthorized)));
    }

    #[tokio::test]
    async fn test_server_error_and_bad_body() {
        let mut server = mockito::Server::new_async().await;
        server.mock("POST", "/summaries").with_status(503).create_async().await;
        server
            .mock("POST", "/suggestions")
            .with_status(200)
            .with_body("not json")
            .create_async()
            .await;

        let client = create_client(server.url());

        let summary = client.summarize_vendors(&create_event(), &[]).await;
        assert!(matches!(summary, Err(AssistantError::ApiError(_))));

        let suggestions = client.suggest_services("birthday").await;
        assert!(matches!(suggestions, Err(AssistantError::InvalidResponse(_))));
    }
}
