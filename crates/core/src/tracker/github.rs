//! GitHub Issues backend.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::Deserialize;
use tracing::debug;

use crate::config::GithubConfig;

use super::{NewTicket, Ticket, TicketClient, TicketState, TicketUpdate, TrackerError};

const USER_AGENT: &str = concat!("issuesync/", env!("CARGO_PKG_VERSION"));
const API_VERSION: &str = "2022-11-28";

#[derive(Debug, Deserialize)]
struct GithubUser {
    login: String,
}

#[derive(Debug, Deserialize)]
struct GithubIssue {
    number: u64,
    title: String,
    #[serde(default)]
    body: Option<String>,
    state: TicketState,
    #[serde(default)]
    assignees: Vec<GithubUser>,
}

impl From<GithubIssue> for Ticket {
    fn from(issue: GithubIssue) -> Self {
        Self {
            number: issue.number,
            title: issue.title,
            body: issue.body.unwrap_or_default(),
            state: issue.state,
            assignees: issue.assignees.into_iter().map(|u| u.login).collect(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct CreatedIssue {
    number: u64,
}

/// GitHub REST client scoped to a single repository.
pub struct GithubClient {
    client: Client,
    api_url: String,
    owner: String,
    repo: String,
    token: String,
}

impl GithubClient {
    /// Create a new client from configuration.
    pub fn new(config: &GithubConfig) -> Result<Self, TrackerError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs as u64))
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            client,
            api_url: config.api_url.trim_end_matches('/').to_string(),
            owner: config.owner.clone(),
            repo: config.repo.clone(),
            token: config.token.clone(),
        })
    }

    fn issues_url(&self) -> String {
        format!(
            "{}/repos/{}/{}/issues",
            self.api_url,
            urlencoding::encode(&self.owner),
            urlencoding::encode(&self.repo)
        )
    }

    fn issue_url(&self, number: u64) -> String {
        format!("{}/{}", self.issues_url(), number)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .bearer_auth(&self.token)
            .header(reqwest::header::ACCEPT, "application/vnd.github+json")
            .header("X-GitHub-Api-Version", API_VERSION)
    }

    /// Map non-success statuses to tracker errors.
    async fn check_status(response: Response, what: &str) -> Result<Response, TrackerError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message: String = body.chars().take(200).collect();
        match status.as_u16() {
            401 | 403 if !is_rate_limit_message(&message) => Err(TrackerError::Unauthorized(
                format!("{}: {}", what, message),
            )),
            403 | 429 => Err(TrackerError::RateLimited),
            404 => Err(TrackerError::NotFound(what.to_string())),
            code => Err(TrackerError::Api {
                status: code,
                message,
            }),
        }
    }
}

/// GitHub reports secondary rate limits as 403 with an explanatory message.
fn is_rate_limit_message(message: &str) -> bool {
    message.to_lowercase().contains("rate limit")
}

#[async_trait]
impl TicketClient for GithubClient {
    async fn create(&self, ticket: NewTicket) -> Result<u64, TrackerError> {
        debug!(title = %ticket.title, "Creating GitHub issue");

        let response = self
            .authorize(self.client.post(self.issues_url()))
            .json(&ticket)
            .send()
            .await?;
        let response = Self::check_status(
            response,
            &format!("repository {}/{}", self.owner, self.repo),
        )
        .await?;

        let created: CreatedIssue = response
            .json()
            .await
            .map_err(|e| TrackerError::Parse(format!("Failed to parse created issue: {}", e)))?;

        Ok(created.number)
    }

    async fn get(&self, number: u64) -> Result<Ticket, TrackerError> {
        debug!(number, "Fetching GitHub issue");

        let response = self
            .authorize(self.client.get(self.issue_url(number)))
            .send()
            .await?;
        let response = Self::check_status(response, &format!("issue #{}", number)).await?;

        let issue: GithubIssue = response
            .json()
            .await
            .map_err(|e| TrackerError::Parse(format!("Failed to parse issue #{}: {}", number, e)))?;

        Ok(issue.into())
    }

    async fn update(&self, number: u64, update: TicketUpdate) -> Result<(), TrackerError> {
        debug!(number, ?update, "Updating GitHub issue");

        let response = self
            .authorize(self.client.patch(self.issue_url(number)))
            .json(&update)
            .send()
            .await?;
        Self::check_status(response, &format!("issue #{}", number)).await?;

        Ok(())
    }
}
