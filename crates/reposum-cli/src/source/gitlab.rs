//! [`DataSource`] backed by the GitLab GraphQL API.
//!
//! One fetch is one `POST` of the `last_projects` query. Transport failures,
//! non-success HTTP statuses, GraphQL `errors` and undecodable bodies all
//! surface as the fetch error; nothing is retried.

use reposum::{BoxError, DataSource, RepositoryRecord};
use serde::{Deserialize, Serialize};
use serde_json::json;

const LAST_PROJECTS_QUERY: &str =
    "query last_projects($repoCount: Int!) {projects(last:$repoCount) {nodes {name forksCount}}}";

#[derive(thiserror::Error, Debug)]
pub enum GitlabError {
    #[error("GitLab request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("GitLab returned HTTP {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("GitLab GraphQL error: {0}")]
    Graphql(String),

    #[error("GitLab response carried no data")]
    MissingData,
}

#[derive(Debug, Serialize)]
struct GraphqlRequest<'a> {
    query: &'a str,
    variables: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct GraphqlResponse {
    data: Option<ProjectsData>,
    #[serde(default)]
    errors: Vec<GraphqlError>,
}

#[derive(Debug, Deserialize)]
struct GraphqlError {
    message: String,
}

#[derive(Debug, Deserialize)]
struct ProjectsData {
    projects: Projects,
}

#[derive(Debug, Deserialize)]
struct Projects {
    nodes: Vec<RepositoryRecord>,
}

/// Queries the most recent projects of a GitLab instance.
#[derive(Debug, Clone)]
pub struct GitlabSource {
    client: reqwest::Client,
    api_url: reqwest::Url,
}

impl GitlabSource {
    /// Creates a source for the GraphQL endpoint at `api_url`.
    pub fn new(api_url: &str) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("reposum/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Self::with_client(client, api_url)
    }

    /// Creates a source reusing an existing HTTP client.
    pub fn with_client(client: reqwest::Client, api_url: &str) -> anyhow::Result<Self> {
        let api_url = reqwest::Url::parse(api_url)?;
        Ok(Self { client, api_url })
    }

    async fn query(&self, repo_count: usize) -> Result<Vec<RepositoryRecord>, GitlabError> {
        let request = GraphqlRequest {
            query: LAST_PROJECTS_QUERY,
            variables: json!({ "repoCount": repo_count }),
        };

        tracing::debug!("Requesting data for {repo_count} repos from GitLab API");

        let resp = self
            .client
            .post(self.api_url.clone())
            .json(&request)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(GitlabError::Status { status, body });
        }

        let resp: GraphqlResponse = resp.json().await?;

        tracing::debug!("Data for {repo_count} repos received from GitLab API");

        if let Some(err) = resp.errors.into_iter().next() {
            return Err(GitlabError::Graphql(err.message));
        }

        resp.data
            .map(|data| data.projects.nodes)
            .ok_or(GitlabError::MissingData)
    }
}

#[async_trait::async_trait]
impl DataSource for GitlabSource {
    async fn fetch(&self, repo_count: usize) -> Result<Vec<RepositoryRecord>, BoxError> {
        Ok(self.query(repo_count).await?)
    }
}
