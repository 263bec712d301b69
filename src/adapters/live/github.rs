//! Live adapter for the `IssueTracker` port using the GitHub REST API.

use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::header::{ACCEPT, AUTHORIZATION};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::GITHUB_TOKEN_VAR;
use crate::ports::{Issue, IssueTracker, Repository};

const GITHUB_API_URL: &str = "https://api.github.com";
const GITHUB_API_VERSION: &str = "2022-11-28";
const PER_PAGE: usize = 100;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Live issue tracker that calls the GitHub REST API.
pub struct LiveGitHub {
    client: Client,
    api_url: String,
    token: Option<String>,
}

impl LiveGitHub {
    /// Creates a new GitHub client. Without a token only reads are possible.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(token: Option<String>) -> Result<Self, String> {
        let client = Client::builder()
            .user_agent(concat!("bugmirror/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| format!("Failed to build GitHub client: {e}"))?;
        Ok(Self { client, api_url: GITHUB_API_URL.to_string(), token })
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        let request = request
            .header(ACCEPT, "application/vnd.github+json")
            .header("X-GitHub-Api-Version", GITHUB_API_VERSION);
        match &self.token {
            Some(token) => request.header(AUTHORIZATION, format!("Bearer {token}")),
            None => request,
        }
    }

    /// Login of the account behind the token, if there is one.
    fn token_login(&self) -> Result<Option<String>, BoxError> {
        if self.token.is_none() {
            return Ok(None);
        }
        let url = format!("{}/user", self.api_url);
        let response = send(self.authorized(self.client.get(url)), "user lookup")?;
        let user: UserEntry = parse(response, "user lookup")?;
        Ok(Some(user.login))
    }

    fn repo_url(&self, full_name: &str) -> String {
        format!("{}/repos/{full_name}", self.api_url)
    }
}

/// Request body for issue creation.
#[derive(Serialize)]
struct CreateIssueRequest<'a> {
    title: &'a str,
    body: &'a str,
}

#[derive(Deserialize)]
struct RepositoryEntry {
    full_name: String,
    html_url: String,
    #[serde(default = "default_true")]
    has_issues: bool,
}

fn default_true() -> bool {
    true
}

#[derive(Deserialize)]
struct IssueEntry {
    number: u64,
    title: String,
    #[serde(default)]
    body: Option<String>,
    html_url: String,
    state: String,
    /// Present when the entry is a pull request.
    #[serde(default)]
    pull_request: Option<serde_json::Value>,
}

impl From<IssueEntry> for Issue {
    fn from(entry: IssueEntry) -> Self {
        Self {
            number: entry.number,
            title: entry.title,
            body: entry.body.unwrap_or_default(),
            html_url: entry.html_url,
            state: entry.state,
        }
    }
}

#[derive(Deserialize)]
struct UserEntry {
    login: String,
}

/// Query for one page of the issue listing.
///
/// Issues are opened under the token's account, so `creator` narrows the
/// listing to what this tool could have written.
fn list_query(page: usize, creator: Option<&str>) -> Vec<(&'static str, String)> {
    let mut query = vec![
        ("state", "all".to_string()),
        ("per_page", PER_PAGE.to_string()),
        ("page", page.to_string()),
    ];
    if let Some(login) = creator {
        query.push(("creator", login.to_string()));
    }
    query
}

/// Error payload returned by GitHub.
#[derive(Deserialize)]
struct GitHubError {
    message: String,
}

fn send(request: RequestBuilder, what: &str) -> Result<Response, BoxError> {
    let response = request
        .send()
        .map_err(|e| -> BoxError { format!("GitHub {what} request failed: {e}").into() })?;
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let text = response.text().unwrap_or_default();
    let msg = serde_json::from_str::<GitHubError>(&text).map(|e| e.message).unwrap_or(text);
    Err(format!("GitHub {what} failed ({}): {msg}", status.as_u16()).into())
}

fn parse<T: serde::de::DeserializeOwned>(response: Response, what: &str) -> Result<T, BoxError> {
    response.json::<T>().map_err(|e| format!("Failed to parse GitHub {what} response: {e}").into())
}

impl IssueTracker for LiveGitHub {
    fn repository(&self, full_name: &str) -> Result<Repository, BoxError> {
        let response =
            send(self.authorized(self.client.get(self.repo_url(full_name))), "repository lookup")?;
        let entry: RepositoryEntry = parse(response, "repository lookup")?;
        if !entry.has_issues {
            return Err(format!("Issues are disabled for {}", entry.full_name).into());
        }
        Ok(Repository { full_name: entry.full_name, html_url: entry.html_url })
    }

    fn create_issue(&self, repo: &Repository, title: &str, body: &str) -> Result<Issue, BoxError> {
        if self.token.is_none() {
            return Err(format!("{GITHUB_TOKEN_VAR} is not set; cannot create issues").into());
        }
        let url = format!("{}/issues", self.repo_url(&repo.full_name));
        let request = self.client.post(url).json(&CreateIssueRequest { title, body });
        let response = send(self.authorized(request), "issue creation")?;
        let entry: IssueEntry = parse(response, "issue creation")?;
        Ok(entry.into())
    }

    fn list_issues(&self, repo: &Repository) -> Result<Vec<Issue>, BoxError> {
        let url = format!("{}/issues", self.repo_url(&repo.full_name));
        let creator = self.token_login()?;
        let mut issues = Vec::new();
        let mut pages = 0;
        loop {
            pages += 1;
            let query = list_query(pages, creator.as_deref());
            let response = send(self.authorized(self.client.get(&url).query(&query)), "issue listing")?;
            let entries: Vec<IssueEntry> = parse(response, "issue listing")?;
            let done = entries.len() < PER_PAGE;
            issues.extend(entries.into_iter().filter(|e| e.pull_request.is_none()).map(Issue::from));
            if done {
                break;
            }
        }
        info!(
            repo = %repo.full_name,
            creator = creator.as_deref().unwrap_or("anyone"),
            pages,
            issues = issues.len(),
            "listed existing issues"
        );
        Ok(issues)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_issue_without_token_is_rejected() {
        let gh = LiveGitHub::new(None).unwrap();
        let repo = Repository {
            full_name: "canonical/maas-ui".to_string(),
            html_url: "https://github.com/canonical/maas-ui".to_string(),
        };
        let err = gh.create_issue(&repo, "Title", "Body").unwrap_err();
        assert!(err.to_string().contains("GITHUB_TOKEN"));
    }

    #[test]
    fn listing_is_narrowed_to_token_account() {
        let query = list_query(3, Some("maas-bot"));
        assert!(query.contains(&("creator", "maas-bot".to_string())));
        assert!(query.contains(&("page", "3".to_string())));
        assert!(query.contains(&("state", "all".to_string())));

        let anonymous = list_query(1, None);
        assert!(anonymous.iter().all(|(key, _)| *key != "creator"));
    }

    #[test]
    fn issue_entry_with_null_body() {
        let json = r#"{
            "number": 42,
            "title": "Crash",
            "body": null,
            "html_url": "https://github.com/canonical/maas-ui/issues/42",
            "state": "open"
        }"#;
        let entry: IssueEntry = serde_json::from_str(json).unwrap();
        assert!(entry.pull_request.is_none());
        let issue = Issue::from(entry);
        assert_eq!(issue.number, 42);
        assert_eq!(issue.body, "");
    }

    #[test]
    fn pull_requests_are_recognised() {
        let json = r#"{
            "number": 7,
            "title": "Fix",
            "body": "x",
            "html_url": "https://github.com/canonical/maas-ui/pull/7",
            "state": "closed",
            "pull_request": {"url": "https://api.github.com/repos/canonical/maas-ui/pulls/7"}
        }"#;
        let entry: IssueEntry = serde_json::from_str(json).unwrap();
        assert!(entry.pull_request.is_some());
    }
}
