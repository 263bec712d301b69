//! Live adapter for the `BugSource` port using the Launchpad web service.

use std::env;

use chrono::Utc;
use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::header::{ACCEPT, AUTHORIZATION, LOCATION};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use uuid::Uuid;

use crate::ports::{Bug, BugSource, BugTask, BugTrackerRef, Project, TaskPage, TaskSearch};

/// Root of the versioned Launchpad API.
pub const LAUNCHPAD_API_ROOT: &str = "https://api.launchpad.net/1.0/";
const OAUTH_REALM: &str = "https://api.launchpad.net/";

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// A pre-authorized Launchpad OAuth token.
///
/// Obtaining the token is done once, outside this tool; it is then supplied
/// through `LP_CONSUMER_KEY`, `LP_ACCESS_TOKEN` and `LP_ACCESS_SECRET`.
#[derive(Clone)]
pub struct LaunchpadCredentials {
    consumer_key: String,
    token: String,
    token_secret: String,
}

impl LaunchpadCredentials {
    /// Creates credentials from their parts.
    pub fn new(
        consumer_key: impl Into<String>,
        token: impl Into<String>,
        token_secret: impl Into<String>,
    ) -> Self {
        Self {
            consumer_key: consumer_key.into(),
            token: token.into(),
            token_secret: token_secret.into(),
        }
    }

    /// Reads credentials from the environment; `None` unless all three are set.
    #[must_use]
    pub fn from_env() -> Option<Self> {
        let var = |name: &str| env::var(name).ok().filter(|v| !v.is_empty());
        Some(Self::new(
            var("LP_CONSUMER_KEY")?,
            var("LP_ACCESS_TOKEN")?,
            var("LP_ACCESS_SECRET")?,
        ))
    }

    /// Builds a PLAINTEXT-signed OAuth 1.0 `Authorization` header value.
    fn authorization(&self, timestamp: i64, nonce: &str) -> String {
        format!(
            "OAuth realm=\"{OAUTH_REALM}\", oauth_consumer_key=\"{}\", oauth_token=\"{}\", \
             oauth_signature_method=\"PLAINTEXT\", oauth_signature=\"%26{}\", \
             oauth_timestamp=\"{timestamp}\", oauth_nonce=\"{nonce}\", oauth_version=\"1.0\"",
            self.consumer_key, self.token, self.token_secret
        )
    }
}

/// Live bug source backed by `api.launchpad.net`.
pub struct LiveLaunchpad {
    client: Client,
    root: String,
    credentials: Option<LaunchpadCredentials>,
}

impl LiveLaunchpad {
    /// Creates a client for the production service.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(credentials: Option<LaunchpadCredentials>) -> Result<Self, String> {
        let client = Client::builder()
            .user_agent(concat!("bugmirror/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| format!("Failed to build Launchpad client: {e}"))?;
        Ok(Self { client, root: LAUNCHPAD_API_ROOT.to_string(), credentials })
    }

    fn sign(&self, request: RequestBuilder) -> RequestBuilder {
        let request = request.header(ACCEPT, "application/json");
        match &self.credentials {
            Some(creds) => {
                let header = creds.authorization(Utc::now().timestamp(), &Uuid::new_v4().simple().to_string());
                request.header(AUTHORIZATION, header)
            }
            None => request,
        }
    }

    fn require_credentials(&self, action: &str) -> Result<(), BoxError> {
        if self.credentials.is_none() {
            return Err(format!(
                "Cannot {action} anonymously; set LP_CONSUMER_KEY, LP_ACCESS_TOKEN and LP_ACCESS_SECRET"
            )
            .into());
        }
        Ok(())
    }

    fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, &str)],
        what: &str,
    ) -> Result<T, BoxError> {
        let response = self
            .sign(self.client.get(url).query(query))
            .send()
            .map_err(|e| -> BoxError { format!("Launchpad {what} request failed: {e}").into() })?;
        let response = check(response, what)?;
        response
            .json::<T>()
            .map_err(|e| format!("Failed to parse Launchpad {what} response: {e}").into())
    }

    /// Fetches every page of a task collection.
    fn task_collection(&self, first: &str, what: &str) -> Result<Vec<BugTask>, BoxError> {
        let mut tasks = Vec::new();
        let mut next = Some(first.to_string());
        while let Some(url) = next {
            let page: Collection<TaskEntry> = self.get_json(&url, &[], what)?;
            tasks.extend(page.entries.into_iter().map(BugTask::from));
            next = page.next_collection_link;
        }
        Ok(tasks)
    }

    fn post_named_op(
        &self,
        url: &str,
        form: &[(&str, &str)],
        what: &str,
    ) -> Result<String, BoxError> {
        let response = self
            .sign(self.client.post(url).form(form))
            .send()
            .map_err(|e| -> BoxError { format!("Launchpad {what} request failed: {e}").into() })?;
        let response = check(response, what)?;
        created_location(&response)
            .ok_or_else(|| format!("Launchpad {what} response has no Location header").into())
    }
}

/// Turns a non-success status into an error carrying the response text.
fn check(response: Response, what: &str) -> Result<Response, BoxError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let text = response.text().unwrap_or_default();
    Err(format!("Launchpad {what} failed ({}): {}", status.as_u16(), text.trim()).into())
}

fn created_location(response: &Response) -> Option<String> {
    response.headers().get(LOCATION)?.to_str().ok().map(str::to_string)
}

/// A Launchpad collection page.
#[derive(Deserialize)]
struct Collection<T> {
    entries: Vec<T>,
    #[serde(default)]
    next_collection_link: Option<String>,
}

#[derive(Deserialize)]
struct ProjectEntry {
    name: String,
    display_name: String,
    self_link: String,
}

impl From<ProjectEntry> for Project {
    fn from(entry: ProjectEntry) -> Self {
        Self { name: entry.name, display_name: entry.display_name, self_link: entry.self_link }
    }
}

#[derive(Deserialize)]
struct TaskEntry {
    self_link: String,
    bug_link: String,
    target_link: String,
    status: String,
    #[serde(default)]
    related_tasks_collection_link: Option<String>,
    #[serde(default)]
    bug_watch_link: Option<String>,
}

impl From<TaskEntry> for BugTask {
    fn from(entry: TaskEntry) -> Self {
        Self {
            self_link: entry.self_link,
            bug_link: entry.bug_link,
            target_link: entry.target_link,
            status: entry.status,
            related_tasks_link: entry.related_tasks_collection_link,
            bug_watch_link: entry.bug_watch_link,
        }
    }
}

#[derive(Deserialize)]
struct BugEntry {
    id: u64,
    title: String,
    #[serde(default)]
    description: Option<String>,
    owner_link: String,
    web_link: String,
    #[serde(default)]
    tags: Vec<String>,
    self_link: String,
}

impl From<BugEntry> for Bug {
    fn from(entry: BugEntry) -> Self {
        Self {
            id: entry.id,
            title: entry.title,
            description: entry.description.unwrap_or_default(),
            owner_link: entry.owner_link,
            web_link: entry.web_link,
            tags: entry.tags,
            self_link: entry.self_link,
        }
    }
}

#[derive(Deserialize)]
struct TrackerEntry {
    self_link: String,
    base_url: String,
}

/// Query pairs for a `searchTasks` call; repeated keys select several values.
fn search_query(search: &TaskSearch) -> Vec<(&str, &str)> {
    let mut query = vec![("ws.op", "searchTasks"), ("tags_combinator", "Any")];
    query.extend(search.statuses.iter().map(|s| ("status", s.as_str())));
    query.extend(search.tags.iter().map(|t| ("tags", t.as_str())));
    query
}

impl BugSource for LiveLaunchpad {
    fn project(&self, name: &str) -> Result<Project, BoxError> {
        let url = format!("{}{name}", self.root);
        let entry: ProjectEntry = self.get_json(&url, &[], "project lookup")?;
        Ok(entry.into())
    }

    fn bug_tracker(&self, base_url: &str) -> Result<BugTrackerRef, BoxError> {
        let url = format!("{}bugs/bugtrackers", self.root);
        let query = [("ws.op", "getByBaseurl"), ("baseurl", base_url)];
        let entry: Option<TrackerEntry> = self.get_json(&url, &query, "bug tracker lookup")?;
        let entry =
            entry.ok_or_else(|| format!("No bug tracker is registered for {base_url}"))?;
        Ok(BugTrackerRef { self_link: entry.self_link, base_url: entry.base_url })
    }

    fn search_tasks(&self, search: &TaskSearch, cursor: Option<&str>) -> Result<TaskPage, BoxError> {
        // The next-page link already carries the original query.
        let page: Collection<TaskEntry> = match cursor {
            Some(next) => self.get_json(next, &[], "task search")?,
            None => self.get_json(&search.project_link, &search_query(search), "task search")?,
        };
        Ok(TaskPage {
            tasks: page.entries.into_iter().map(BugTask::from).collect(),
            next: page.next_collection_link,
        })
    }

    fn related_tasks(&self, task: &BugTask) -> Result<Vec<BugTask>, BoxError> {
        match task.related_tasks_link.as_deref() {
            Some(link) => self.task_collection(link, "related tasks"),
            None => Ok(Vec::new()),
        }
    }

    fn bug_tasks(&self, bug: &Bug) -> Result<Vec<BugTask>, BoxError> {
        self.task_collection(&format!("{}/bug_tasks", bug.self_link), "bug tasks")
    }

    fn bug(&self, bug_link: &str) -> Result<Bug, BoxError> {
        let entry: BugEntry = self.get_json(bug_link, &[], "bug")?;
        Ok(entry.into())
    }

    fn add_watch(
        &self,
        bug: &Bug,
        tracker: &BugTrackerRef,
        remote_bug: &str,
    ) -> Result<String, BoxError> {
        self.require_credentials("add a bug watch")?;
        let form = [
            ("ws.op", "addWatch"),
            ("bug_tracker", tracker.self_link.as_str()),
            ("remote_bug", remote_bug),
        ];
        self.post_named_op(&bug.self_link, &form, "addWatch")
    }

    fn add_task(&self, bug: &Bug, target: &Project) -> Result<BugTask, BoxError> {
        self.require_credentials("add a bug task")?;
        let form = [("ws.op", "addTask"), ("target", target.self_link.as_str())];
        let task_link = self.post_named_op(&bug.self_link, &form, "addTask")?;
        let entry: TaskEntry = self.get_json(&task_link, &[], "new task")?;
        Ok(entry.into())
    }

    fn link_watch(&self, task: &BugTask, watch_link: &str) -> Result<(), BoxError> {
        self.require_credentials("save a bug task")?;
        let patch = serde_json::json!({ "bug_watch_link": watch_link });
        let response = self
            .sign(self.client.patch(&task.self_link).json(&patch))
            .send()
            .map_err(|e| -> BoxError { format!("Launchpad task save request failed: {e}").into() })?;
        check(response, "task save")?;
        Ok(())
    }
}
