use std::sync::OnceLock;

use ammonia::Builder;
use chrono::NaiveDateTime;
use regex::{Captures, Regex};
use uuid::Uuid;

use crate::core::helpers::{edited_label, format_timestamp, parse_timestamp};
use crate::models::models::Post;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LikeState {
    Liked,
    Unliked,
}

impl LikeState {
    pub fn from_liked(user_liked: bool) -> Self {
        if user_liked {
            LikeState::Liked
        } else {
            LikeState::Unliked
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EditState {
    Idle,
    /// Inline form open, body not yet submitted.
    Editing,
    /// Optimistic body shown, request in flight.
    Pending {
        ticket: Uuid,
        previous_body: String,
        previous_label: String,
    },
    Failed {
        message: String,
    },
}

/// Client-side state of one rendered post.
#[derive(Clone, Debug, PartialEq)]
pub struct PostView {
    pub id: u64,
    pub poster: String,
    pub poster_id: u64,
    /// Raw body as authored; sanitized at render time.
    pub body: String,
    pub label: String,
    pub likes: u64,
    pub like: LikeState,
    pub own: bool,
    pub edit: EditState,
    pub sort_key: Option<NaiveDateTime>,
}

impl PostView {
    pub fn from_post(post: Post, viewer: Option<&str>) -> Self {
        let label = timestamp_label(&post);
        let own = viewer.map(|v| v == post.poster).unwrap_or(false);
        Self {
            id: post.id,
            sort_key: parse_timestamp(&post.timestamp),
            like: LikeState::from_liked(post.user_liked),
            likes: post.likes_count,
            poster: post.poster,
            poster_id: post.poster_id,
            body: post.body,
            label,
            own,
            edit: EditState::Idle,
        }
    }

    /// "Edit post" is offered on own posts unless a form or request is active.
    pub fn shows_edit_control(&self) -> bool {
        self.own && matches!(self.edit, EditState::Idle | EditState::Failed { .. })
    }

    pub fn is_editing(&self) -> bool {
        self.edit == EditState::Editing
    }
}

pub fn timestamp_label(post: &Post) -> String {
    if post.edited {
        let edited_at = post.edited_timestamp.as_deref().unwrap_or(&post.timestamp);
        edited_label(&format_timestamp(edited_at))
    } else {
        format_timestamp(&post.timestamp)
    }
}

/// Newest first. The sort is stable, so equal timestamps keep server order
/// and posts with unparseable timestamps go last.
pub fn sort_newest_first(views: &mut [PostView]) {
    views.sort_by(|a, b| b.sort_key.cmp(&a.sort_key));
}

/// Group 1 is a tag or a whole existing anchor, left as is; group 2 is a bare URL.
fn url_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| {
        Regex::new(r#"(?is)(<a\b[^>]*>.*?</a>|<[^>]*>)|(https?://[^\s<>"']+)"#)
            .expect("Regex should compile")
    })
}

/// Strips scripts and event handlers from user-authored markup, then turns
/// bare URLs in text into links.
pub fn filter_post_content(content: &str) -> String {
    let clean = Builder::default()
        .link_rel(Some("noopener noreferrer"))
        .clean(content)
        .to_string();

    url_regex()
        .replace_all(&clean, |caps: &Captures| match caps.get(2) {
            Some(url) => format!(
                r#"<a href="{url}" rel="noopener noreferrer">{url}</a>"#,
                url = url.as_str()
            ),
            None => caps[0].to_string(),
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn post(id: u64, timestamp: &str) -> Post {
        Post {
            id,
            poster: "ada".to_string(),
            poster_id: 1,
            body: "body".to_string(),
            timestamp: timestamp.to_string(),
            edited: false,
            edited_timestamp: None,
            likes_count: 0,
            user_liked: false,
        }
    }

    #[test]
    fn sorts_newest_first_with_unparseable_last() {
        let mut views: Vec<PostView> = vec![
            post(1, "Jan 05 2024, 03:47 PM"),
            post(2, "garbage"),
            post(3, "2024-03-01T09:00:00"),
            post(4, "Jan 05 2024, 03:47 PM"),
        ]
        .into_iter()
        .map(|p| PostView::from_post(p, None))
        .collect();

        sort_newest_first(&mut views);
        let ids: Vec<u64> = views.iter().map(|v| v.id).collect();
        assert_eq!(ids, vec![3, 1, 4, 2]);
    }

    #[test]
    fn edited_posts_use_edit_timestamp() {
        let mut p = post(1, "2024-01-05T15:47:00");
        p.edited = true;
        p.edited_timestamp = Some("2024-02-10T08:05:00".to_string());
        assert_eq!(timestamp_label(&p), "(Edited) Feb 10 2024 8:05 AM");

        p.edited = false;
        assert_eq!(timestamp_label(&p), "Jan 5 2024 3:47 PM");
    }

    #[test]
    fn only_the_author_gets_the_edit_control() {
        let mine = PostView::from_post(post(1, "x"), Some("ada"));
        let theirs = PostView::from_post(post(2, "x"), Some("bob"));
        let anonymous = PostView::from_post(post(3, "x"), None);
        assert!(mine.shows_edit_control());
        assert!(!theirs.shows_edit_control());
        assert!(!anonymous.shows_edit_control());
    }

    #[test]
    fn content_filter_strips_scripts_and_links_urls() {
        let out = filter_post_content("<script>alert(1)</script>see https://example.com now");
        assert!(!out.contains("<script"));
        assert!(out.contains(r#"href="https://example.com""#));
        assert!(out.contains("now"));
    }

    #[test]
    fn content_filter_keeps_existing_links_intact() {
        let out = filter_post_content(r#"<a href="https://example.com">site</a>"#);
        assert_eq!(out.matches("<a ").count(), 1);
        assert!(out.contains(">site</a>"));

        let named = filter_post_content(r#"<a href="https://example.com">https://example.com</a>"#);
        assert_eq!(named.matches("<a ").count(), 1);
    }

    #[test]
    fn content_filter_links_urls_inside_markup() {
        let out = filter_post_content("<p>https://example.com/a?b=1&c=2</p>");
        assert!(out.starts_with("<p><a href=\"https://example.com/a?b=1&amp;c=2\""));
        assert!(out.ends_with("</a></p>"));
    }

    #[test]
    fn content_filter_leaves_attribute_urls_alone() {
        let out = filter_post_content(r#"<img src="https://example.com/x.png">"#);
        assert!(!out.contains("<a "));
        assert!(out.contains(r#"src="https://example.com/x.png""#));
    }
}
