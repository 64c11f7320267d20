//! Webhook event model.
//!
//! The set of supported events is closed: [`WebhookEvent`] has one variant
//! per kind and [`EventKind`] names them. Both are generated from a single
//! table so that adding a kind cannot leave the tag lookup, the decoder and
//! the dispatcher out of sync.

pub mod types;

use tracing::debug;

use crate::error::WebhookError;

pub use types::*;

/// A concrete event payload type tied to one [`EventKind`].
pub trait EventPayload: Sized + Send + 'static {
    const KIND: EventKind;

    /// Unwrap the payload if `event` is of this kind.
    fn from_event(event: WebhookEvent) -> Option<Self>;
}

macro_rules! webhook_events {
    ($($variant:ident($payload:ident) => $tag:literal,)+) => {
        /// Event-type tag as sent in the `X-GitHub-Event` header.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum EventKind {
            $($variant,)+
        }

        impl EventKind {
            /// Every supported kind, in declaration order.
            pub const ALL: &'static [EventKind] = &[$(EventKind::$variant,)+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $(EventKind::$variant => $tag,)+
                }
            }

            pub fn from_tag(tag: &str) -> Option<Self> {
                match tag {
                    $($tag => Some(EventKind::$variant),)+
                    _ => None,
                }
            }
        }

        /// A decoded webhook event.
        #[derive(Debug, Clone)]
        pub enum WebhookEvent {
            $($variant($payload),)+
        }

        impl WebhookEvent {
            pub fn kind(&self) -> EventKind {
                match self {
                    $(WebhookEvent::$variant(_) => EventKind::$variant,)+
                }
            }

            fn decode(kind: EventKind, body: &[u8]) -> Result<Self, serde_json::Error> {
                Ok(match kind {
                    $(EventKind::$variant => WebhookEvent::$variant(serde_json::from_slice(body)?),)+
                })
            }
        }

        $(
            impl EventPayload for $payload {
                const KIND: EventKind = EventKind::$variant;

                fn from_event(event: WebhookEvent) -> Option<Self> {
                    match event {
                        WebhookEvent::$variant(payload) => Some(payload),
                        _ => None,
                    }
                }
            }
        )+
    };
}

webhook_events! {
    CommitComment(CommitCommentEvent) => "commit_comment",
    Create(CreateEvent) => "create",
    Delete(DeleteEvent) => "delete",
    Deployment(DeploymentEvent) => "deployment",
    DeploymentStatus(DeploymentStatusEvent) => "deployment_status",
    Fork(ForkEvent) => "fork",
    Gollum(GollumEvent) => "gollum",
    Installation(InstallationEvent) => "installation",
    InstallationRepositories(InstallationRepositoriesEvent) => "installation_repositories",
    IssueComment(IssueCommentEvent) => "issue_comment",
    Issues(IssuesEvent) => "issues",
    Label(LabelEvent) => "label",
    Member(MemberEvent) => "member",
    Membership(MembershipEvent) => "membership",
    Milestone(MilestoneEvent) => "milestone",
    Organization(OrganizationEvent) => "organization",
    OrgBlock(OrgBlockEvent) => "org_block",
    PageBuild(PageBuildEvent) => "page_build",
    Ping(PingEvent) => "ping",
    Project(ProjectEvent) => "project",
    ProjectCard(ProjectCardEvent) => "project_card",
    ProjectColumn(ProjectColumnEvent) => "project_column",
    Public(PublicEvent) => "public",
    PullRequestReview(PullRequestReviewEvent) => "pull_request_review",
    PullRequestReviewComment(PullRequestReviewCommentEvent) => "pull_request_review_comment",
    PullRequest(PullRequestEvent) => "pull_request",
    Push(PushEvent) => "push",
    Repository(RepositoryEvent) => "repository",
    Release(ReleaseEvent) => "release",
    Status(StatusEvent) => "status",
    Team(TeamEvent) => "team",
    TeamAdd(TeamAddEvent) => "team_add",
    Watch(WatchEvent) => "watch",
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Decode `body` as the event named by `event_type`.
pub fn parse_event(event_type: &str, body: &[u8]) -> Result<WebhookEvent, WebhookError> {
    let kind = EventKind::from_tag(event_type)
        .ok_or_else(|| WebhookError::Decode(format!("unknown event type {event_type:?}")))?;

    let event = WebhookEvent::decode(kind, body)
        .map_err(|e| WebhookError::Decode(format!("invalid {kind} payload: {e}")))?;

    debug!(event_type = %kind, "event_decoded");
    Ok(event)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tags_round_trip() {
        assert_eq!(EventKind::ALL.len(), 33);
        for kind in EventKind::ALL {
            assert_eq!(EventKind::from_tag(kind.as_str()), Some(*kind));
        }
        assert_eq!(EventKind::from_tag("check_run"), None);
        assert_eq!(EventKind::from_tag("Ping"), None);
    }

    #[test]
    fn test_every_kind_decodes_empty_object() {
        for kind in EventKind::ALL {
            let event = parse_event(kind.as_str(), b"{}").unwrap();
            assert_eq!(event.kind(), *kind);
        }
    }

    #[test]
    fn test_parse_ping() {
        let event = parse_event("ping", br#"{"zen":"x","hook_id":42}"#).unwrap();
        let ping = PingEvent::from_event(event).unwrap();
        assert_eq!(ping.zen.as_deref(), Some("x"));
        assert_eq!(ping.hook_id, Some(42));
    }

    #[test]
    fn test_parse_push() {
        let body = br#"{
            "ref": "refs/heads/main",
            "before": "0000000000000000000000000000000000000000",
            "after": "6113728f27ae82c7b1a177c8d03f9e96e0adf246",
            "created": true,
            "commits": [
                {"id": "6113728f", "message": "Initial commit", "added": ["README.md"]}
            ],
            "repository": {"id": 1, "name": "hello", "full_name": "octo/hello"}
        }"#;

        let push = PushEvent::from_event(parse_event("push", body).unwrap()).unwrap();
        assert_eq!(push.git_ref, "refs/heads/main");
        assert!(push.created);
        assert_eq!(push.commits.len(), 1);
        assert_eq!(push.commits[0].added, vec!["README.md".to_string()]);
        assert_eq!(push.repository.unwrap().full_name, "octo/hello");
    }

    #[test]
    fn test_from_event_wrong_kind() {
        let event = parse_event("watch", br#"{"action":"started"}"#).unwrap();
        assert!(PingEvent::from_event(event).is_none());
    }

    #[test]
    fn test_unknown_tag_and_bad_body() {
        assert!(matches!(parse_event("", b"{}"), Err(WebhookError::Decode(_))));
        assert!(matches!(parse_event("nope", b"{}"), Err(WebhookError::Decode(_))));
        assert!(matches!(parse_event("ping", b""), Err(WebhookError::Decode(_))));
        assert!(matches!(parse_event("ping", b"[1,2]"), Err(WebhookError::Decode(_))));
        assert!(matches!(
            parse_event("push", br#"{"commits": "nope"}"#),
            Err(WebhookError::Decode(_))
        ));
    }
}
