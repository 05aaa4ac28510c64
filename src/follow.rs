use crate::models::models::UserProfile;

/// Relationship of the viewer to the profile on screen.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FollowState {
    /// Viewer is looking at their own profile: no control.
    Own,
    Following,
    NotFollowing,
}

impl FollowState {
    pub fn for_profile(profile: &UserProfile) -> Self {
        if !profile.active_user.is_empty() && profile.active_user == profile.user_name {
            FollowState::Own
        } else if profile.active_user_follows {
            FollowState::Following
        } else {
            FollowState::NotFollowing
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProfileView {
    pub user_id: u64,
    pub user_name: String,
    pub followers: u64,
    pub follows: u64,
    pub follow: FollowState,
}

impl ProfileView {
    pub fn from_profile(user_id: u64, profile: &UserProfile) -> Self {
        Self {
            user_id,
            user_name: profile.user_name.clone(),
            followers: profile.num_followers,
            follows: profile.num_follows,
            follow: FollowState::for_profile(profile),
        }
    }

    /// Apply a resolved follow or unfollow response.
    pub fn apply(&mut self, following: bool, follower_count: u64) {
        self.followers = follower_count;
        if self.follow != FollowState::Own {
            self.follow = if following {
                FollowState::Following
            } else {
                FollowState::NotFollowing
            };
        }
    }
}
