use html_escape::{encode_double_quoted_attribute, encode_text};
use rust_embed::RustEmbed;

use crate::config::{post_region_id, MAX_POST_LENGTH};
use crate::core::errors::ViewError;
use crate::follow::{FollowState, ProfileView};
use crate::handlers::{CANCEL_EDIT, FOLLOW, LIKE, OPEN_EDIT, SUBMIT_EDIT, UNFOLLOW, UNLIKE};
use crate::posts::{filter_post_content, LikeState, PostView};

#[derive(RustEmbed)]
#[folder = "templates"]
struct Templates;

fn template(name: &str) -> Result<String, ViewError> {
    let file = Templates::get(name)
        .ok_or_else(|| ViewError::Template(format!("{} not found", name)))?;
    String::from_utf8(file.data.into_owned())
        .map_err(|e| ViewError::Template(format!("{}: {}", name, e)))
}

/// Replaces `{{key}}` placeholders in one pass; substituted values are never
/// scanned again. Unknown placeholders are left as they are.
pub fn fill(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        match after.find("}}") {
            Some(end) => {
                let key = &after[..end];
                match values.iter().find(|(k, _)| *k == key) {
                    Some((_, value)) => out.push_str(value),
                    None => {
                        out.push_str("{{");
                        out.push_str(key);
                        out.push_str("}}");
                    }
                }
                rest = &after[end + 2..];
            }
            None => {
                out.push_str(&rest[start..]);
                rest = "";
            }
        }
    }
    out.push_str(rest);
    out
}

pub fn like_button(state: LikeState, post_id: u64) -> String {
    match state {
        LikeState::Liked => format!(
            r#"<button class="btn btn-outline-primary" data-action="{}" data-target="{}">Unlike</button>"#,
            UNLIKE, post_id
        ),
        LikeState::Unliked => format!(
            r#"<button class="btn btn-primary" data-action="{}" data-target="{}">Like</button>"#,
            LIKE, post_id
        ),
    }
}

pub fn follow_button(state: FollowState, user_id: u64, user_name: &str) -> String {
    let name = encode_text(user_name);
    let value = encode_double_quoted_attribute(user_name);
    match state {
        FollowState::Own => String::new(),
        FollowState::Following => format!(
            r#"<button class="btn btn-outline-primary" id="follow-user-{id}" data-action="{}" data-target="{id}" data-value="{}">Unfollow {}</button>"#,
            UNFOLLOW,
            value,
            name,
            id = user_id
        ),
        FollowState::NotFollowing => format!(
            r#"<button class="btn btn-primary" id="follow-user-{id}" data-action="{}" data-target="{id}" data-value="{}">Follow {}</button>"#,
            FOLLOW,
            value,
            name,
            id = user_id
        ),
    }
}

fn edit_control(post_id: u64) -> String {
    format!(
        r#"
    <button class="btn btn-link edit-post" data-action="{}" data-target="{}">Edit post</button>"#,
        OPEN_EDIT, post_id
    )
}

fn edit_form(post_id: u64, body: &str) -> String {
    format!(
        r#"<textarea class="form-control" id="edit-body-{id}">{}</textarea>
        <button class="btn btn-primary" data-action="{}" data-target="{id}">Save</button>
        <button class="btn btn-link" data-action="{}" data-target="{id}">Cancel</button>"#,
        encode_text(body),
        SUBMIT_EDIT,
        CANCEL_EDIT,
        id = post_id
    )
}

/// Inner content of the `post-{id}` region.
pub fn render_post(view: &PostView) -> Result<String, ViewError> {
    let body = if view.is_editing() {
        edit_form(view.id, &view.body)
    } else {
        filter_post_content(&view.body)
    };
    let edit = if view.shows_edit_control() {
        edit_control(view.id)
    } else {
        String::new()
    };

    let id = view.id.to_string();
    let poster_id = view.poster_id.to_string();
    let poster = encode_text(&view.poster);
    let label = encode_text(&view.label);
    let likes = view.likes.to_string();
    let button = like_button(view.like, view.id);

    Ok(fill(
        &template("post.html")?,
        &[
            ("id", id.as_str()),
            ("poster_id", poster_id.as_str()),
            ("poster", &*poster),
            ("body", body.as_str()),
            ("edit_control", edit.as_str()),
            ("timestamp", &*label),
            ("likes", likes.as_str()),
            ("like_button", button.as_str()),
        ],
    ))
}

/// Content of the posts container, one region per post in the given order.
pub fn render_feed<'a>(views: impl IntoIterator<Item = &'a PostView>) -> Result<String, ViewError> {
    let mut html = String::new();
    for view in views {
        html.push_str(&format!(
            r#"<div class="singlePostContainer" id="{}">{}</div>"#,
            post_region_id(view.id),
            render_post(view)?
        ));
        html.push('\n');
    }
    Ok(html)
}

pub fn render_profile(view: &ProfileView) -> Result<String, ViewError> {
    let user_name = encode_text(&view.user_name);
    let followers = view.followers.to_string();
    let follows = view.follows.to_string();
    let button = follow_button(view.follow, view.user_id, &view.user_name);

    Ok(fill(
        &template("profile.html")?,
        &[
            ("user_name", &*user_name),
            ("followers", followers.as_str()),
            ("follows", follows.as_str()),
            ("follow_button", button.as_str()),
        ],
    ))
}

/// Content of the heading region; the `<h1>` is part of it.
pub fn heading(text: &str) -> String {
    format!("<h1>{}</h1>", encode_text(text))
}

/// Regions of a standalone document, as written by the controller.
#[derive(Debug, Default)]
pub struct DocumentParts {
    pub container_id: String,
    pub csrf_token: String,
    pub heading: String,
    pub show_composer: bool,
    pub profile: String,
    pub posts: String,
}

pub fn render_document(parts: &DocumentParts) -> Result<String, ViewError> {
    let composer = if parts.show_composer {
        let max_length = MAX_POST_LENGTH.to_string();
        fill(&template("composer.html")?, &[("max_length", max_length.as_str())])
    } else {
        String::new()
    };
    let container_id = encode_double_quoted_attribute(&parts.container_id);
    let csrf_token = encode_double_quoted_attribute(&parts.csrf_token);

    Ok(fill(
        &template("page.html")?,
        &[
            ("container_id", &*container_id),
            ("csrf_token", &*csrf_token),
            ("heading", parts.heading.as_str()),
            ("composer", composer.as_str()),
            ("profile", parts.profile.as_str()),
            ("posts", parts.posts.as_str()),
        ],
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::posts::EditState;

    fn view() -> PostView {
        PostView {
            id: 5,
            poster: "<ada>".to_string(),
            poster_id: 2,
            body: "hello {{likes}}".to_string(),
            label: "Jan 5 2024 3:47 PM".to_string(),
            likes: 3,
            like: LikeState::Unliked,
            own: false,
            edit: EditState::Idle,
            sort_key: None,
        }
    }

    #[test]
    fn fill_is_single_pass() {
        let out = fill("{{a}}-{{b}}-{{c}}", &[("a", "{{b}}"), ("b", "x")]);
        assert_eq!(out, "{{b}}-x-{{c}}");
    }

    #[test]
    fn post_shows_poster_link_count_and_one_toggle() {
        let html = render_post(&view()).unwrap();
        assert!(html.contains(r#"<a href="/profile/2">&lt;ada&gt;</a>"#));
        assert!(html.contains("❤️ 3"));
        assert!(html.contains("hello {{likes}}"));
        assert!(html.contains("Jan 5 2024 3:47 PM"));
        assert_eq!(html.matches(">Like</button>").count(), 1);
        assert!(!html.contains(">Unlike</button>"));
        assert!(!html.contains("Edit post"));
    }

    #[test]
    fn liked_post_shows_unlike() {
        let mut v = view();
        v.like = LikeState::Liked;
        let html = render_post(&v).unwrap();
        assert!(html.contains(r#"data-action="unlike" data-target="5">Unlike</button>"#));
        assert!(!html.contains(">Like</button>"));
    }

    #[test]
    fn own_post_offers_edit_and_editing_shows_form() {
        let mut v = view();
        v.own = true;
        assert!(render_post(&v).unwrap().contains("Edit post"));

        v.edit = EditState::Editing;
        let html = render_post(&v).unwrap();
        assert!(html.contains(r#"<textarea class="form-control" id="edit-body-5">hello {{likes}}</textarea>"#));
        assert!(html.contains(r#"data-action="submit-edit""#));
        assert!(!html.contains("Edit post"));
    }

    #[test]
    fn profile_buttons_per_state() {
        let mut profile = ProfileView {
            user_id: 7,
            user_name: "ada".to_string(),
            followers: 2,
            follows: 1,
            follow: FollowState::NotFollowing,
        };
        let html = render_profile(&profile).unwrap();
        assert!(html.contains("<h3>ada</h3>"));
        assert!(html.contains("<strong>Followers: </strong>2"));
        assert!(html.contains(">Follow ada</button>"));

        profile.follow = FollowState::Following;
        assert!(render_profile(&profile).unwrap().contains(">Unfollow ada</button>"));

        profile.follow = FollowState::Own;
        let own = render_profile(&profile).unwrap();
        assert!(!own.contains("<button"));
    }

    #[test]
    fn document_hides_composer_on_request() {
        let parts = DocumentParts {
            container_id: "index-container".to_string(),
            heading: heading("Following"),
            ..DocumentParts::default()
        };
        let html = render_document(&parts).unwrap();
        assert!(html.contains("<h1>Following</h1>"));
        assert!(!html.contains(r#"id="new-post""#));
    }
}
