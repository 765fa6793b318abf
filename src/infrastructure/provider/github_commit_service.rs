use chrono::{DateTime, Utc};
use reqwest::{Client, RequestBuilder, StatusCode};
use serde_derive::Deserialize;

use crate::domain::{FetchError, GitCommit, GitCommitService, Url};

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Lists commits of one repository through the GitHub REST API.
#[derive(Debug)]
pub struct GithubCommitService {
    client: Client,
    api_url: Url,
    owner: String,
    repo: String,
    token: Option<String>,
}

impl GithubCommitService {
    pub fn new(
        api_url: Url,
        owner: String,
        repo: String,
        token: Option<String>,
    ) -> Result<Self, reqwest::Error> {
        let client = Client::builder().user_agent(USER_AGENT).build()?;
        Ok(Self {
            client,
            api_url,
            owner,
            repo,
            token,
        })
    }

    fn get(&self, path: &str) -> RequestBuilder {
        let url = self
            .api_url
            .join(&format!("repos/{}/{}/{path}", self.owner, self.repo));
        let request = self
            .client
            .get(url)
            .header("Accept", "application/vnd.github+json");
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }
}

#[async_trait::async_trait]
impl GitCommitService for GithubCommitService {
    async fn recent_commits(&self, limit: usize) -> Result<Vec<GitCommit>, FetchError> {
        let commits: Vec<CommitResponse> = self
            .get("commits")
            .query(&[("per_page", limit)])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(commits.into_iter().take(limit).map(Into::into).collect())
    }

    async fn commit(&self, sha: &str) -> Result<Option<GitCommit>, FetchError> {
        let response = self.get(&format!("commits/{sha}")).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let commit: CommitResponse = response.error_for_status()?.json().await?;
        Ok(Some(commit.into()))
    }
}

#[derive(Deserialize, Debug)]
struct CommitResponse {
    sha: String,
    html_url: String,
    commit: CommitDetail,
}

#[derive(Deserialize, Debug)]
struct CommitDetail {
    message: String,
    author: Option<Signature>,
}

#[derive(Deserialize, Debug)]
struct Signature {
    name: String,
    date: DateTime<Utc>,
}

impl From<CommitResponse> for GitCommit {
    fn from(r: CommitResponse) -> Self {
        let CommitResponse {
            sha,
            html_url,
            commit,
        } = r;
        let CommitDetail { message, author } = commit;

        // Only the summary line; bodies can be arbitrarily long.
        let message = message.lines().next().unwrap_or_default().to_owned();

        GitCommit {
            sha,
            message,
            author: author.as_ref().map(|x| x.name.clone()),
            url: html_url,
            authored_at: author.map(|x| x.date.into()),
        }
    }
}
