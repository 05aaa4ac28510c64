use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Post {
    pub id: u64,
    pub poster: String,
    #[serde(rename = "posterID")]
    pub poster_id: u64,
    pub body: String,
    pub timestamp: String,
    #[serde(default)]
    pub edited: bool,
    #[serde(default)]
    pub edited_timestamp: Option<String>,
    #[serde(default)]
    pub likes_count: u64,
    #[serde(default)]
    pub user_liked: bool,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub user_name: String,
    pub num_followers: u64,
    pub num_follows: u64,
    #[serde(default)]
    pub active_user: String,
    #[serde(default)]
    pub active_user_follows: bool,
    #[serde(default)]
    pub user_posts: Vec<Post>,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct LikesResponse {
    pub likes_count: u64,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct FollowResponse {
    pub follower_count: u64,
}

/// Body of `/edit/{id}` and `/new-post`.
#[derive(Serialize, Debug)]
pub struct PostBodyRequest<'a> {
    #[serde(rename = "new-post-body")]
    pub new_post_body: &'a str,
}

#[derive(Serialize, Deserialize, Debug, Default)]
pub struct ErrorResponse {
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum FeedFilter {
    #[default]
    All,
    Following,
}

impl FeedFilter {
    pub fn path(self) -> &'static str {
        match self {
            FeedFilter::All => "/",
            FeedFilter::Following => "/?following=true",
        }
    }
}
