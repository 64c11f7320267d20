//! Payload schemas for the supported webhook events.
//!
//! Only the commonly used fields are typed. Everything is optional or
//! defaulted so that payload additions on the forge side never break
//! decoding.

use serde::Deserialize;
use serde_json::Value;

// =============================================================================
// Shared objects
// =============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
pub struct User {
    #[serde(default)]
    pub id: u64,
    #[serde(default)]
    pub login: String,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub html_url: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Repository {
    #[serde(default)]
    pub id: u64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub private: bool,
    #[serde(default)]
    pub owner: Option<User>,
    #[serde(default)]
    pub html_url: Option<String>,
    #[serde(default)]
    pub default_branch: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Organization {
    #[serde(default)]
    pub id: u64,
    #[serde(default)]
    pub login: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Installation {
    #[serde(default)]
    pub id: u64,
    #[serde(default)]
    pub account: Option<User>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Team {
    #[serde(default)]
    pub id: u64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub slug: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Comment {
    #[serde(default)]
    pub id: u64,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub user: Option<User>,
    #[serde(default)]
    pub html_url: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Issue {
    #[serde(default)]
    pub number: u64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub user: Option<User>,
    #[serde(default)]
    pub html_url: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GitRef {
    #[serde(default, rename = "ref")]
    pub git_ref: String,
    #[serde(default)]
    pub sha: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PullRequest {
    #[serde(default)]
    pub number: u64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub merged: Option<bool>,
    #[serde(default)]
    pub user: Option<User>,
    #[serde(default)]
    pub head: Option<GitRef>,
    #[serde(default)]
    pub base: Option<GitRef>,
    #[serde(default)]
    pub html_url: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CommitAuthor {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PushCommit {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub author: Option<CommitAuthor>,
    #[serde(default)]
    pub added: Vec<String>,
    #[serde(default)]
    pub removed: Vec<String>,
    #[serde(default)]
    pub modified: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Deployment {
    #[serde(default)]
    pub id: u64,
    #[serde(default)]
    pub sha: Option<String>,
    #[serde(default, rename = "ref")]
    pub git_ref: Option<String>,
    #[serde(default)]
    pub environment: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Release {
    #[serde(default)]
    pub id: u64,
    #[serde(default)]
    pub tag_name: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub draft: bool,
    #[serde(default)]
    pub prerelease: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Milestone {
    #[serde(default)]
    pub number: u64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub state: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Label {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub color: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WikiPage {
    #[serde(default)]
    pub page_name: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub action: Option<String>,
    #[serde(default)]
    pub sha: Option<String>,
}

// =============================================================================
// Events
// =============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CommitCommentEvent {
    #[serde(default)]
    pub action: Option<String>,
    #[serde(default)]
    pub comment: Option<Comment>,
    #[serde(default)]
    pub repository: Option<Repository>,
    #[serde(default)]
    pub sender: Option<User>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateEvent {
    #[serde(default, rename = "ref")]
    pub git_ref: Option<String>,
    #[serde(default)]
    pub ref_type: Option<String>,
    #[serde(default)]
    pub master_branch: Option<String>,
    #[serde(default)]
    pub repository: Option<Repository>,
    #[serde(default)]
    pub sender: Option<User>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DeleteEvent {
    #[serde(default, rename = "ref")]
    pub git_ref: Option<String>,
    #[serde(default)]
    pub ref_type: Option<String>,
    #[serde(default)]
    pub repository: Option<Repository>,
    #[serde(default)]
    pub sender: Option<User>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DeploymentEvent {
    #[serde(default)]
    pub deployment: Option<Deployment>,
    #[serde(default)]
    pub repository: Option<Repository>,
    #[serde(default)]
    pub sender: Option<User>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DeploymentStatusEvent {
    #[serde(default)]
    pub deployment: Option<Deployment>,
    #[serde(default)]
    pub deployment_status: Option<Value>,
    #[serde(default)]
    pub repository: Option<Repository>,
    #[serde(default)]
    pub sender: Option<User>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ForkEvent {
    #[serde(default)]
    pub forkee: Option<Repository>,
    #[serde(default)]
    pub repository: Option<Repository>,
    #[serde(default)]
    pub sender: Option<User>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GollumEvent {
    #[serde(default)]
    pub pages: Vec<WikiPage>,
    #[serde(default)]
    pub repository: Option<Repository>,
    #[serde(default)]
    pub sender: Option<User>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct InstallationEvent {
    #[serde(default)]
    pub action: Option<String>,
    #[serde(default)]
    pub installation: Option<Installation>,
    #[serde(default)]
    pub repositories: Vec<Repository>,
    #[serde(default)]
    pub sender: Option<User>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct InstallationRepositoriesEvent {
    #[serde(default)]
    pub action: Option<String>,
    #[serde(default)]
    pub installation: Option<Installation>,
    #[serde(default)]
    pub repository_selection: Option<String>,
    #[serde(default)]
    pub repositories_added: Vec<Repository>,
    #[serde(default)]
    pub repositories_removed: Vec<Repository>,
    #[serde(default)]
    pub sender: Option<User>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct IssueCommentEvent {
    #[serde(default)]
    pub action: Option<String>,
    #[serde(default)]
    pub issue: Option<Issue>,
    #[serde(default)]
    pub comment: Option<Comment>,
    #[serde(default)]
    pub repository: Option<Repository>,
    #[serde(default)]
    pub sender: Option<User>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct IssuesEvent {
    #[serde(default)]
    pub action: Option<String>,
    #[serde(default)]
    pub issue: Option<Issue>,
    #[serde(default)]
    pub assignee: Option<User>,
    #[serde(default)]
    pub label: Option<Label>,
    #[serde(default)]
    pub changes: Option<Value>,
    #[serde(default)]
    pub repository: Option<Repository>,
    #[serde(default)]
    pub sender: Option<User>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LabelEvent {
    #[serde(default)]
    pub action: Option<String>,
    #[serde(default)]
    pub label: Option<Label>,
    #[serde(default)]
    pub changes: Option<Value>,
    #[serde(default)]
    pub repository: Option<Repository>,
    #[serde(default)]
    pub organization: Option<Organization>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MemberEvent {
    #[serde(default)]
    pub action: Option<String>,
    #[serde(default)]
    pub member: Option<User>,
    #[serde(default)]
    pub repository: Option<Repository>,
    #[serde(default)]
    pub sender: Option<User>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MembershipEvent {
    #[serde(default)]
    pub action: Option<String>,
    #[serde(default)]
    pub scope: Option<String>,
    #[serde(default)]
    pub member: Option<User>,
    #[serde(default)]
    pub team: Option<Team>,
    #[serde(default)]
    pub organization: Option<Organization>,
    #[serde(default)]
    pub sender: Option<User>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MilestoneEvent {
    #[serde(default)]
    pub action: Option<String>,
    #[serde(default)]
    pub milestone: Option<Milestone>,
    #[serde(default)]
    pub changes: Option<Value>,
    #[serde(default)]
    pub repository: Option<Repository>,
    #[serde(default)]
    pub sender: Option<User>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OrganizationEvent {
    #[serde(default)]
    pub action: Option<String>,
    #[serde(default)]
    pub invitation: Option<Value>,
    #[serde(default)]
    pub membership: Option<Value>,
    #[serde(default)]
    pub organization: Option<Organization>,
    #[serde(default)]
    pub sender: Option<User>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OrgBlockEvent {
    #[serde(default)]
    pub action: Option<String>,
    #[serde(default)]
    pub blocked_user: Option<User>,
    #[serde(default)]
    pub organization: Option<Organization>,
    #[serde(default)]
    pub sender: Option<User>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageBuildEvent {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub build: Option<Value>,
    #[serde(default)]
    pub repository: Option<Repository>,
    #[serde(default)]
    pub sender: Option<User>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PingEvent {
    #[serde(default)]
    pub zen: Option<String>,
    #[serde(default)]
    pub hook_id: Option<u64>,
    #[serde(default)]
    pub hook: Option<Value>,
    #[serde(default)]
    pub repository: Option<Repository>,
    #[serde(default)]
    pub sender: Option<User>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProjectEvent {
    #[serde(default)]
    pub action: Option<String>,
    #[serde(default)]
    pub project: Option<Value>,
    #[serde(default)]
    pub changes: Option<Value>,
    #[serde(default)]
    pub repository: Option<Repository>,
    #[serde(default)]
    pub organization: Option<Organization>,
    #[serde(default)]
    pub sender: Option<User>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProjectCardEvent {
    #[serde(default)]
    pub action: Option<String>,
    #[serde(default)]
    pub project_card: Option<Value>,
    #[serde(default)]
    pub after_id: Option<u64>,
    #[serde(default)]
    pub repository: Option<Repository>,
    #[serde(default)]
    pub sender: Option<User>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProjectColumnEvent {
    #[serde(default)]
    pub action: Option<String>,
    #[serde(default)]
    pub project_column: Option<Value>,
    #[serde(default)]
    pub after_id: Option<u64>,
    #[serde(default)]
    pub repository: Option<Repository>,
    #[serde(default)]
    pub sender: Option<User>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PublicEvent {
    #[serde(default)]
    pub repository: Option<Repository>,
    #[serde(default)]
    pub sender: Option<User>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PullRequestReviewEvent {
    #[serde(default)]
    pub action: Option<String>,
    #[serde(default)]
    pub review: Option<Value>,
    #[serde(default)]
    pub pull_request: Option<PullRequest>,
    #[serde(default)]
    pub repository: Option<Repository>,
    #[serde(default)]
    pub sender: Option<User>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PullRequestReviewCommentEvent {
    #[serde(default)]
    pub action: Option<String>,
    #[serde(default)]
    pub comment: Option<Comment>,
    #[serde(default)]
    pub pull_request: Option<PullRequest>,
    #[serde(default)]
    pub repository: Option<Repository>,
    #[serde(default)]
    pub sender: Option<User>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PullRequestEvent {
    #[serde(default)]
    pub action: Option<String>,
    #[serde(default)]
    pub number: Option<u64>,
    #[serde(default)]
    pub pull_request: Option<PullRequest>,
    #[serde(default)]
    pub changes: Option<Value>,
    #[serde(default)]
    pub repository: Option<Repository>,
    #[serde(default)]
    pub sender: Option<User>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PushEvent {
    #[serde(default, rename = "ref")]
    pub git_ref: String,
    #[serde(default)]
    pub before: String,
    #[serde(default)]
    pub after: String,
    #[serde(default)]
    pub created: bool,
    #[serde(default)]
    pub deleted: bool,
    #[serde(default)]
    pub forced: bool,
    #[serde(default)]
    pub commits: Vec<PushCommit>,
    #[serde(default)]
    pub head_commit: Option<PushCommit>,
    #[serde(default)]
    pub pusher: Option<CommitAuthor>,
    #[serde(default)]
    pub repository: Option<Repository>,
    #[serde(default)]
    pub sender: Option<User>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RepositoryEvent {
    #[serde(default)]
    pub action: Option<String>,
    #[serde(default)]
    pub repository: Option<Repository>,
    #[serde(default)]
    pub organization: Option<Organization>,
    #[serde(default)]
    pub sender: Option<User>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReleaseEvent {
    #[serde(default)]
    pub action: Option<String>,
    #[serde(default)]
    pub release: Option<Release>,
    #[serde(default)]
    pub repository: Option<Repository>,
    #[serde(default)]
    pub sender: Option<User>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StatusEvent {
    #[serde(default)]
    pub sha: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub target_url: Option<String>,
    #[serde(default)]
    pub context: Option<String>,
    #[serde(default)]
    pub branches: Vec<Value>,
    #[serde(default)]
    pub repository: Option<Repository>,
    #[serde(default)]
    pub sender: Option<User>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TeamEvent {
    #[serde(default)]
    pub action: Option<String>,
    #[serde(default)]
    pub team: Option<Team>,
    #[serde(default)]
    pub changes: Option<Value>,
    #[serde(default)]
    pub repository: Option<Repository>,
    #[serde(default)]
    pub organization: Option<Organization>,
    #[serde(default)]
    pub sender: Option<User>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TeamAddEvent {
    #[serde(default)]
    pub team: Option<Team>,
    #[serde(default)]
    pub repository: Option<Repository>,
    #[serde(default)]
    pub organization: Option<Organization>,
    #[serde(default)]
    pub sender: Option<User>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WatchEvent {
    #[serde(default)]
    pub action: Option<String>,
    #[serde(default)]
    pub repository: Option<Repository>,
    #[serde(default)]
    pub sender: Option<User>,
}
