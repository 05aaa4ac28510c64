use std::collections::HashMap;
use std::sync::Mutex;

use serde::de::DeserializeOwned;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::auth::RequestAuth;
use crate::config::{post_region_id, FailurePolicy, PageContext, FOLLOWING_HEADING, MAX_POST_LENGTH};
use crate::core::errors::ViewError;
use crate::core::helpers::{lock, now_edited_label};
use crate::follow::ProfileView;
use crate::handlers::Action;
use crate::models::models::{
    ErrorResponse, FeedFilter, FollowResponse, LikesResponse, Post, PostBodyRequest, UserProfile,
};
use crate::page::Page;
use crate::posts::{sort_newest_first, EditState, LikeState, PostView};
use crate::templates;
use crate::transport::{ApiRequest, Transport};

#[derive(Default)]
struct ViewState {
    posts: HashMap<u64, PostView>,
    order: Vec<u64>,
    profile: Option<ProfileView>,
}

/// Handle for an edit whose optimistic body is already on the page.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EditTicket {
    pub post_id: u64,
    pub id: Uuid,
    body: String,
}

/// Feed View Controller: owns the view model for one page and keeps the
/// host page in sync with it.
///
/// All methods take `&self`; several interactions may be in flight at once
/// and each response is applied to the model when it resolves.
pub struct FeedController<T, P> {
    context: PageContext,
    auth: RequestAuth,
    transport: T,
    page: P,
    policy: FailurePolicy,
    state: Mutex<ViewState>,
}

impl<T: Transport, P: Page> FeedController<T, P> {
    pub fn new(context: PageContext, transport: T, page: P) -> Self {
        Self {
            auth: RequestAuth::new(context.csrf_token.clone()),
            context,
            transport,
            page,
            policy: FailurePolicy::default(),
            state: Mutex::new(ViewState::default()),
        }
    }

    pub fn with_policy(mut self, policy: FailurePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn context(&self) -> &PageContext {
        &self.context
    }

    pub fn page(&self) -> &P {
        &self.page
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    // === Bootstrap ===

    /// Detects the active page from its containers and loads it.
    pub async fn bootstrap(&self) -> Result<(), ViewError> {
        let containers = &self.context.containers;

        if self.page.has_element(&containers.index) {
            let filter = self.context.feed_filter();
            if filter == FeedFilter::Following {
                self.page.set_html(&containers.heading, &templates::heading(FOLLOWING_HEADING));
                self.page.set_visible(&containers.composer, false);
            }
            self.load_feed(filter).await?;
        }

        if self.page.has_element(&containers.profile) {
            let user_id = self
                .context
                .user_id
                .ok_or_else(|| ViewError::MissingContext("profile user id".to_string()))?;
            self.load_profile(user_id).await?;
        }

        Ok(())
    }

    pub async fn load_feed(&self, filter: FeedFilter) -> Result<(), ViewError> {
        let posts = self.fetch_feed(filter).await?;
        self.render_feed(posts)
    }

    pub async fn load_profile(&self, user_id: u64) -> Result<(), ViewError> {
        let profile = self.fetch_profile(user_id).await?;
        self.render_profile(user_id, profile)
    }

    // === Data fetch ===

    pub async fn fetch_feed(&self, filter: FeedFilter) -> Result<Vec<Post>, ViewError> {
        let request = self.auth.stamp(ApiRequest::get(filter.path()))?;
        match self.send_json::<Vec<Post>>(request).await {
            Ok(posts) => {
                debug!(count = posts.len(), "Fetched posts data");
                Ok(posts)
            }
            Err(err) => {
                error!("Error fetching posts: {}", err);
                Err(err)
            }
        }
    }

    pub async fn fetch_profile(&self, user_id: u64) -> Result<UserProfile, ViewError> {
        let request = self.auth.stamp(ApiRequest::get(format!("/profile/{}", user_id)))?;
        match self.send_json::<UserProfile>(request).await {
            Ok(profile) => {
                debug!(user = %profile.user_name, "Fetched profile data");
                Ok(profile)
            }
            Err(err) => {
                error!("Error fetching profile information: {}", err);
                Err(err)
            }
        }
    }

    // === Render ===

    /// Replaces the post view models and re-renders the posts container,
    /// newest first.
    pub fn render_feed(&self, posts: Vec<Post>) -> Result<(), ViewError> {
        self.render_posts(posts, self.context.viewer.as_deref())
    }

    /// Renders the profile header, then the user's posts. Ownership falls
    /// back to the profile's `activeUser` when the page named no viewer.
    pub fn render_profile(&self, user_id: u64, profile: UserProfile) -> Result<(), ViewError> {
        let view = ProfileView::from_profile(user_id, &profile);
        let html = templates::render_profile(&view)?;
        lock(&self.state).profile = Some(view);
        self.page.set_html(&self.context.containers.profile_info, &html);

        let viewer = match &self.context.viewer {
            Some(viewer) => Some(viewer.as_str()),
            None if !profile.active_user.is_empty() => Some(profile.active_user.as_str()),
            None => None,
        };
        self.render_posts(profile.user_posts, viewer)
    }

    fn render_posts(&self, posts: Vec<Post>, viewer: Option<&str>) -> Result<(), ViewError> {
        let mut views: Vec<PostView> = posts
            .into_iter()
            .map(|post| PostView::from_post(post, viewer))
            .collect();
        sort_newest_first(&mut views);
        let html = templates::render_feed(&views)?;
        let count = views.len();

        {
            let mut state = lock(&self.state);
            state.order = views.iter().map(|v| v.id).collect();
            state.posts = views.into_iter().map(|v| (v.id, v)).collect();
        }

        info!(posts = count, "Rendered posts");
        self.page.set_html(&self.context.containers.posts, &html);
        Ok(())
    }

    /// Post ids in rendered order.
    pub fn rendered_order(&self) -> Vec<u64> {
        lock(&self.state).order.clone()
    }

    pub fn post_view(&self, post_id: u64) -> Option<PostView> {
        lock(&self.state).posts.get(&post_id).cloned()
    }

    pub fn profile_view(&self) -> Option<ProfileView> {
        lock(&self.state).profile.clone()
    }

    // === Like / Unlike ===

    pub async fn like_post(&self, post_id: u64) -> Result<u64, ViewError> {
        self.require_post(post_id)?;
        let request = self.auth.stamp(ApiRequest::post(format!("/like/{}", post_id)))?;
        let resp: LikesResponse = self.mutate("like", request).await?;

        self.settle_post(post_id, |view| {
            view.likes = resp.likes_count;
            view.like = LikeState::Liked;
        })?;
        Ok(resp.likes_count)
    }

    pub async fn unlike_post(&self, post_id: u64) -> Result<u64, ViewError> {
        let displayed = self.require_post(post_id)?.likes;
        if displayed == 0 {
            warn!(post_id, "Cannot unlike a post with 0 likes");
            return Err(ViewError::Rejected("post has no likes to remove".to_string()));
        }

        let request = self.auth.stamp(ApiRequest::post(format!("/unlike/{}", post_id)))?;
        let resp: LikesResponse = self.mutate("unlike", request).await?;

        self.settle_post(post_id, |view| {
            view.likes = resp.likes_count;
            view.like = LikeState::Unliked;
        })?;
        Ok(resp.likes_count)
    }

    // === Follow / Unfollow ===

    pub async fn follow_user(&self, user_id: u64, username: &str) -> Result<u64, ViewError> {
        self.set_follow(user_id, username, true).await
    }

    pub async fn unfollow_user(&self, user_id: u64, username: &str) -> Result<u64, ViewError> {
        self.set_follow(user_id, username, false).await
    }

    async fn set_follow(&self, user_id: u64, username: &str, following: bool) -> Result<u64, ViewError> {
        let (verb, path) = if following {
            ("follow", format!("/follow/{}", user_id))
        } else {
            ("unfollow", format!("/unfollow/{}", user_id))
        };
        let request = self.auth.stamp(ApiRequest::post(path))?;
        let resp: FollowResponse = self.mutate(verb, request).await?;
        debug!(user_id, user = username, verb, followers = resp.follower_count, "Follow state resolved");

        let html = {
            let mut state = lock(&self.state);
            match state.profile.as_mut() {
                Some(view) if view.user_id == user_id => {
                    view.apply(following, resp.follower_count);
                    Some(templates::render_profile(view)?)
                }
                _ => None,
            }
        };
        match html {
            Some(html) => self.page.set_html(&self.context.containers.profile_info, &html),
            None => debug!(user_id, "Follow response for a profile no longer on screen"),
        }
        Ok(resp.follower_count)
    }

    // === Edit in place ===

    pub fn open_edit_form(&self, post_id: u64) -> Result<(), ViewError> {
        if !self.require_post(post_id)?.own {
            warn!(post_id, "Refusing to edit a post by another user");
            return Err(ViewError::Rejected("only the author can edit a post".to_string()));
        }
        self.update_post(post_id, |view| {
            if !matches!(view.edit, EditState::Pending { .. }) {
                view.edit = EditState::Editing;
            }
        })
    }

    pub fn cancel_edit(&self, post_id: u64) -> Result<(), ViewError> {
        self.update_post(post_id, |view| {
            if view.edit == EditState::Editing {
                view.edit = EditState::Idle;
            }
        })
    }

    /// Applies the optimistic body and `(Edited) <now>` label and patches
    /// the page. No request is issued yet.
    pub fn begin_edit(&self, post_id: u64, body: &str) -> Result<EditTicket, ViewError> {
        let ticket = EditTicket {
            post_id,
            id: Uuid::new_v4(),
            body: body.to_string(),
        };

        let html = {
            let mut state = lock(&self.state);
            let view = state.posts.get_mut(&post_id).ok_or(ViewError::UnknownPost(post_id))?;
            if !view.own {
                return Err(ViewError::Rejected("only the author can edit a post".to_string()));
            }
            let shown_body = std::mem::replace(&mut view.body, ticket.body.clone());
            let shown_label = std::mem::replace(&mut view.label, now_edited_label());
            // A pending edit is unconfirmed; keep reverting to what preceded it.
            let (previous_body, previous_label) = match std::mem::replace(&mut view.edit, EditState::Idle) {
                EditState::Pending { previous_body, previous_label, .. } => (previous_body, previous_label),
                _ => (shown_body, shown_label),
            };
            view.edit = EditState::Pending {
                ticket: ticket.id,
                previous_body,
                previous_label,
            };
            templates::render_post(view)?
        };

        self.page.set_html(&post_region_id(post_id), &html);
        Ok(ticket)
    }

    /// Sends the edit and reconciles the post with the response.
    pub async fn complete_edit(&self, ticket: EditTicket) -> Result<(), ViewError> {
        let post_id = ticket.post_id;
        let request = self.auth.stamp(
            ApiRequest::post(format!("/edit/{}", post_id))
                .json(serde_json::to_value(PostBodyRequest { new_post_body: &ticket.body })?),
        )?;

        let outcome = match self.send_json::<ErrorResponse>(request).await {
            Ok(ErrorResponse { error: None }) => Ok(()),
            Ok(ErrorResponse { error: Some(message) }) => {
                error!(post_id, "Error editing post: {}", message);
                self.page.alert(&message);
                Err(ViewError::Server(message))
            }
            Err(err) => {
                self.report("edit", &err);
                Err(err)
            }
        };

        let failure = outcome.as_ref().err().map(ViewError::user_message);
        let html = {
            let mut state = lock(&self.state);
            let Some(view) = state.posts.get_mut(&post_id) else {
                return outcome;
            };
            let previous = match &view.edit {
                EditState::Pending { ticket: current, previous_body, previous_label }
                    if *current == ticket.id =>
                {
                    Some((previous_body.clone(), previous_label.clone()))
                }
                _ => None,
            };
            match previous {
                Some((previous_body, previous_label)) => {
                    view.edit = match failure {
                        None => EditState::Idle,
                        Some(message) => {
                            if self.policy.revert_on_failure {
                                view.body = previous_body;
                                view.label = previous_label;
                            }
                            EditState::Failed { message }
                        }
                    };
                    Some(templates::render_post(view)?)
                }
                None => {
                    debug!(post_id, "Edit response superseded by a newer edit");
                    None
                }
            }
        };
        if let Some(html) = html {
            self.page.set_html(&post_region_id(post_id), &html);
        }

        outcome
    }

    pub async fn submit_edit(&self, post_id: u64, body: &str) -> Result<(), ViewError> {
        let ticket = self.begin_edit(post_id, body)?;
        self.complete_edit(ticket).await
    }

    // === Composer ===

    /// Creates a post and reloads the feed.
    pub async fn submit_new_post(&self, body: &str) -> Result<(), ViewError> {
        let trimmed = body.trim();
        if trimmed.is_empty() || trimmed.chars().count() > MAX_POST_LENGTH {
            let err = ViewError::Rejected(format!(
                "Posts must be between 1 and {} characters.",
                MAX_POST_LENGTH
            ));
            warn!("Refusing to submit post: {}", err);
            self.page.alert(&err.user_message());
            return Err(err);
        }

        let request = self.auth.stamp(
            ApiRequest::post("/new-post")
                .json(serde_json::to_value(PostBodyRequest { new_post_body: trimmed })?),
        )?;
        match self.mutate::<ErrorResponse>("new post", request).await? {
            ErrorResponse { error: Some(message) } => {
                error!("Error creating post: {}", message);
                self.page.alert(&message);
                Err(ViewError::Server(message))
            }
            ErrorResponse { error: None } => self.load_feed(self.context.feed_filter()).await,
        }
    }

    // === Dispatch ===

    pub async fn dispatch(&self, action: Action) -> Result<(), ViewError> {
        debug!(action = action.name(), "Dispatching");
        match action {
            Action::Like(id) => self.like_post(id).await.map(drop),
            Action::Unlike(id) => self.unlike_post(id).await.map(drop),
            Action::Follow { user_id, username } => self.follow_user(user_id, &username).await.map(drop),
            Action::Unfollow { user_id, username } => {
                self.unfollow_user(user_id, &username).await.map(drop)
            }
            Action::OpenEdit(id) => self.open_edit_form(id),
            Action::CancelEdit(id) => self.cancel_edit(id),
            Action::SubmitEdit { post_id, body } => self.submit_edit(post_id, &body).await,
            Action::SubmitPost { body } => self.submit_new_post(&body).await,
        }
    }

    // === Helpers ===

    fn require_post(&self, post_id: u64) -> Result<PostView, ViewError> {
        self.post_view(post_id).ok_or(ViewError::UnknownPost(post_id))
    }

    /// Applies `change` to a post and re-renders its region.
    fn update_post(&self, post_id: u64, change: impl FnOnce(&mut PostView)) -> Result<(), ViewError> {
        let html = {
            let mut state = lock(&self.state);
            let view = state.posts.get_mut(&post_id).ok_or(ViewError::UnknownPost(post_id))?;
            change(view);
            templates::render_post(view)?
        };
        self.page.set_html(&post_region_id(post_id), &html);
        Ok(())
    }

    /// Like `update_post`, for responses that may land after the post left
    /// the page.
    fn settle_post(&self, post_id: u64, change: impl FnOnce(&mut PostView)) -> Result<(), ViewError> {
        match self.update_post(post_id, change) {
            Err(ViewError::UnknownPost(_)) => {
                debug!(post_id, "Response for a post no longer on screen");
                Ok(())
            }
            other => other,
        }
    }

    async fn send_json<R: DeserializeOwned>(&self, request: ApiRequest) -> Result<R, ViewError> {
        debug!(method = %request.method, path = %request.path, "Sending request");
        let response = self.transport.send(request).await?;
        response.json()
    }

    /// Sends a mutating request; failures are reported and returned, and
    /// nothing on the page is rolled back.
    async fn mutate<R: DeserializeOwned>(&self, what: &str, request: ApiRequest) -> Result<R, ViewError> {
        self.send_json(request).await.map_err(|err| {
            self.report(what, &err);
            err
        })
    }

    fn report(&self, what: &str, err: &ViewError) {
        error!("Error on {}: {}", what, err);
        if self.policy.surface_errors {
            self.page.alert(&format!("Could not {}: {}", what, err.user_message()));
        }
    }
}
