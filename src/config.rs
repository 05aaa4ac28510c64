use std::env;
use std::fmt::Display;
use std::str::FromStr;

use tracing::{info, warn};

use crate::core::query_params::{get_bool_flag, parse_query_params};
use crate::models::models::FeedFilter;

pub const REQUESTED_WITH_HEADER: &str = "X-Requested-With";
pub const REQUESTED_WITH_VALUE: &str = "XMLHttpRequest";
pub const CSRF_HEADER: &str = "X-CSRFToken";

pub const INDEX_CONTAINER: &str = "index-container";
pub const PROFILE_CONTAINER: &str = "profile-container";
pub const POSTS_CONTAINER: &str = "page-posts";
pub const PROFILE_INFO: &str = "user-profile-information";
pub const HEADING: &str = "all-posts-title";
pub const COMPOSER: &str = "new-post";

pub const FOLLOWING_HEADING: &str = "Following";
pub const MAX_POST_LENGTH: usize = 5000;

pub fn post_region_id(post_id: u64) -> String {
    format!("post-{}", post_id)
}

/// Element ids of the host page.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Containers {
    pub index: String,
    pub profile: String,
    pub posts: String,
    pub profile_info: String,
    pub heading: String,
    pub composer: String,
}

impl Default for Containers {
    fn default() -> Self {
        Self {
            index: INDEX_CONTAINER.to_string(),
            profile: PROFILE_CONTAINER.to_string(),
            posts: POSTS_CONTAINER.to_string(),
            profile_info: PROFILE_INFO.to_string(),
            heading: HEADING.to_string(),
            composer: COMPOSER.to_string(),
        }
    }
}

/// Values the host page hands to the controller at construction.
#[derive(Clone, Debug, Default)]
pub struct PageContext {
    /// Profile owner on profile pages.
    pub user_id: Option<u64>,
    pub csrf_token: String,
    /// Username of the logged-in viewer, used to offer "Edit post".
    pub viewer: Option<String>,
    /// Query string of the page URL, e.g. `?following=true`.
    pub query: String,
    pub containers: Containers,
}

impl PageContext {
    pub fn new(csrf_token: impl Into<String>) -> Self {
        Self {
            csrf_token: csrf_token.into(),
            ..Self::default()
        }
    }

    pub fn with_user_id(mut self, user_id: u64) -> Self {
        self.user_id = Some(user_id);
        self
    }

    pub fn with_viewer(mut self, viewer: impl Into<String>) -> Self {
        self.viewer = Some(viewer.into());
        self
    }

    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.query = query.into();
        self
    }

    pub fn feed_filter(&self) -> FeedFilter {
        if get_bool_flag(&parse_query_params(&self.query), "following") {
            FeedFilter::Following
        } else {
            FeedFilter::All
        }
    }
}

/// How failed mutations show up on the page. The default keeps failures in
/// the log only and never reverts optimistic edits.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FailurePolicy {
    pub surface_errors: bool,
    pub revert_on_failure: bool,
}

/// Settings for native hosts (the preview server), read from `NETFEED_*`.
#[derive(Clone, Debug)]
pub struct ClientConfig {
    pub base_url: String,
    pub csrf_token: String,
    pub session: Option<String>,
    pub viewer: Option<String>,
    pub listen: String,
    pub policy: FailurePolicy,
}

impl ClientConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Self {
            base_url: try_load::<String>("NETFEED_BASE_URL", "http://127.0.0.1:8000")?
                .trim_end_matches('/')
                .to_string(),
            csrf_token: try_load("NETFEED_CSRF_TOKEN", "")?,
            session: optional("NETFEED_SESSION"),
            viewer: optional("NETFEED_VIEWER"),
            listen: try_load("NETFEED_LISTEN", "127.0.0.1:8080")?,
            policy: FailurePolicy {
                surface_errors: try_load("NETFEED_SURFACE_ERRORS", "false")?,
                revert_on_failure: try_load("NETFEED_REVERT_ON_FAILURE", "false")?,
            },
        })
    }

    pub fn page_context(&self) -> PageContext {
        PageContext {
            csrf_token: self.csrf_token.clone(),
            viewer: self.viewer.clone(),
            ..PageContext::default()
        }
    }
}

fn optional(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.is_empty())
}

fn try_load<T: FromStr>(key: &str, default: &str) -> anyhow::Result<T>
where
    T::Err: Display,
{
    let raw = env::var(key).unwrap_or_else(|_| {
        info!("{key} not set, using default: {default}");
        default.to_string()
    });
    raw.parse().map_err(|e| {
        warn!("Invalid {key} value: {e}");
        anyhow::anyhow!("invalid {}: {}", key, e)
    })
}
