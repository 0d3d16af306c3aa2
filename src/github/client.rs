use reqwest::{Client, RequestBuilder, Response};
use serde::{Deserialize, Serialize};

use super::RemoteMutationExecutor;
use crate::error::{ConfigError, MutationError};
use crate::session::{Credentials, RepositoryName};

pub const DEFAULT_GITHUB_API_URL: &str = "https://api.github.com";

const USER_AGENT: &str = concat!("gitguard-mcp/", env!("CARGO_PKG_VERSION"));

/// GitHub content metadata needed to delete a file
#[derive(Debug, Deserialize)]
struct GitHubContentItem {
    sha: String,
}

/// Body of `DELETE /repos/{owner}/{repo}/contents/{path}`
#[derive(Debug, Serialize)]
struct GitHubDeleteFileRequest<'a> {
    message: &'a str,
    sha: &'a str,
    branch: &'a str,
}

/// REST client for GitHub mutations
#[derive(Debug, Clone)]
pub struct GithubMutationClient {
    client: Client,
    api_base_url: String,
}

impl Default for GithubMutationClient {
    fn default() -> Self {
        Self {
            client: Client::new(),
            api_base_url: DEFAULT_GITHUB_API_URL.to_string(),
        }
    }
}

impl GithubMutationClient {
    /// Creates a client for the given API base URL
    ///
    /// The base URL is configurable for GitHub Enterprise and for tests.
    pub fn new(client: Client, api_base_url: &str) -> Result<Self, ConfigError> {
        let parsed = reqwest::Url::parse(api_base_url).map_err(|e| ConfigError::InvalidApiUrl {
            url: api_base_url.to_string(),
            reason: e.to_string(),
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidApiUrl {
                url: api_base_url.to_string(),
                reason: "scheme must be http or https".to_string(),
            });
        }

        Ok(Self {
            client,
            api_base_url: api_base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn api_base_url(&self) -> &str {
        &self.api_base_url
    }

    fn repo_url(&self, repo: &RepositoryName) -> String {
        format!(
            "{}/repos/{}/{}",
            self.api_base_url,
            urlencoding::encode(&repo.owner),
            urlencoding::encode(&repo.repo)
        )
    }

    fn authorized(&self, builder: RequestBuilder, credentials: &Credentials) -> RequestBuilder {
        builder
            .header("User-Agent", USER_AGENT)
            .header("Accept", "application/vnd.github.v3+json")
            .header(
                "Authorization",
                format!("token {}", credentials.access_token()),
            )
    }

    /// Sends a request and maps non-success statuses to [`MutationError`]
    async fn send(&self, builder: RequestBuilder, resource: &str) -> Result<Response, MutationError> {
        let response = builder
            .send()
            .await
            .map_err(|e| MutationError::Request(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        tracing::error!("GitHub API error {} for {}: {}", status, resource, body);
        Err(MutationError::from_status(status.as_u16(), resource, body))
    }

    async fn file_sha(
        &self,
        credentials: &Credentials,
        repo: &RepositoryName,
        branch: &str,
        path: &str,
    ) -> Result<String, MutationError> {
        let url = format!("{}/contents/{}", self.repo_url(repo), encode_path(path));
        tracing::info!("Retrieving file info for deletion in GitHub API with URL: {}", url);

        let request = self
            .authorized(self.client.get(&url), credentials)
            .query(&[("ref", branch)]);
        let response = self.send(request, &format!("file '{}'", path)).await?;

        // Directories come back as arrays and have no single blob SHA
        let item: GitHubContentItem = response
            .json()
            .await
            .map_err(|e| MutationError::InvalidResponse(e.to_string()))?;
        Ok(item.sha)
    }
}

impl RemoteMutationExecutor for GithubMutationClient {
    async fn delete_branch(
        &self,
        credentials: &Credentials,
        repo: &RepositoryName,
        branch: &str,
    ) -> Result<(), MutationError> {
        let url = format!("{}/git/refs/heads/{}", self.repo_url(repo), encode_path(branch));
        tracing::info!("Deleting branch in GitHub API with URL: {}", url);

        let request = self.authorized(self.client.delete(&url), credentials);
        self.send(request, &format!("branch '{}'", branch)).await?;
        Ok(())
    }

    async fn delete_file(
        &self,
        credentials: &Credentials,
        repo: &RepositoryName,
        branch: &str,
        path: &str,
        message: &str,
    ) -> Result<(), MutationError> {
        let sha = self.file_sha(credentials, repo, branch, path).await?;

        let url = format!("{}/contents/{}", self.repo_url(repo), encode_path(path));
        tracing::info!("Deleting file in GitHub API with URL: {}", url);

        let request = self
            .authorized(self.client.delete(&url), credentials)
            .json(&GitHubDeleteFileRequest {
                message,
                sha: &sha,
                branch,
            });
        self.send(request, &format!("file '{}'", path)).await?;
        Ok(())
    }

    async fn delete_repository(
        &self,
        credentials: &Credentials,
        repo: &RepositoryName,
    ) -> Result<(), MutationError> {
        let url = self.repo_url(repo);
        tracing::info!("Deleting repository in GitHub API with URL: {}", url);

        let request = self.authorized(self.client.delete(&url), credentials);
        self.send(request, &format!("repository '{}'", repo)).await?;
        Ok(())
    }

    async fn delete_issue_comment(
        &self,
        credentials: &Credentials,
        repo: &RepositoryName,
        comment_id: u64,
    ) -> Result<(), MutationError> {
        let url = format!("{}/issues/comments/{}", self.repo_url(repo), comment_id);
        tracing::info!("Deleting comment in GitHub API with URL: {}", url);

        let request = self.authorized(self.client.delete(&url), credentials);
        self.send(request, &format!("comment {}", comment_id)).await?;
        Ok(())
    }
}

/// Percent-encodes each segment of a slash-separated path
fn encode_path(path: &str) -> String {
    path.trim_start_matches('/')
        .split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_path_keeps_separators() {
        assert_eq!(encode_path("docs/read me.md"), "docs/read%20me.md");
        assert_eq!(encode_path("/feature/x#1"), "feature/x%231");
    }

    #[test]
    fn new_rejects_non_http_urls() {
        assert!(GithubMutationClient::new(Client::new(), "ftp://example.com").is_err());
        assert!(GithubMutationClient::new(Client::new(), "not a url").is_err());

        let client = GithubMutationClient::new(Client::new(), "http://localhost:1234/").unwrap();
        assert_eq!(client.api_base_url(), "http://localhost:1234");
    }
}
