use crate::core::errors::ViewError;

pub const LIKE: &str = "like";
pub const UNLIKE: &str = "unlike";
pub const FOLLOW: &str = "follow";
pub const UNFOLLOW: &str = "unfollow";
pub const OPEN_EDIT: &str = "edit";
pub const CANCEL_EDIT: &str = "cancel-edit";
pub const SUBMIT_EDIT: &str = "submit-edit";
pub const SUBMIT_POST: &str = "submit-post";

/// A user interaction routed to the controller. Rendered controls carry it
/// as `data-action`, `data-target` and, where needed, `data-value`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Action {
    Like(u64),
    Unlike(u64),
    Follow { user_id: u64, username: String },
    Unfollow { user_id: u64, username: String },
    OpenEdit(u64),
    CancelEdit(u64),
    SubmitEdit { post_id: u64, body: String },
    SubmitPost { body: String },
}

impl Action {
    /// Rebuild an action from the data attributes of the clicked control.
    /// `value` is the username for follow controls and the textarea content
    /// for submit controls.
    pub fn from_data(action: &str, target: &str, value: Option<&str>) -> Result<Self, ViewError> {
        let id = || {
            target
                .parse::<u64>()
                .map_err(|_| ViewError::InvalidAction(format!("{} target {:?}", action, target)))
        };
        let value = || {
            value
                .map(str::to_string)
                .ok_or_else(|| ViewError::InvalidAction(format!("{} needs a value", action)))
        };

        Ok(match action {
            LIKE => Action::Like(id()?),
            UNLIKE => Action::Unlike(id()?),
            FOLLOW => Action::Follow { user_id: id()?, username: value()? },
            UNFOLLOW => Action::Unfollow { user_id: id()?, username: value()? },
            OPEN_EDIT => Action::OpenEdit(id()?),
            CANCEL_EDIT => Action::CancelEdit(id()?),
            SUBMIT_EDIT => Action::SubmitEdit { post_id: id()?, body: value()? },
            SUBMIT_POST => Action::SubmitPost { body: value()? },
            other => return Err(ViewError::InvalidAction(other.to_string())),
        })
    }

    pub fn name(&self) -> &'static str {
        match self {
            Action::Like(_) => LIKE,
            Action::Unlike(_) => UNLIKE,
            Action::Follow { .. } => FOLLOW,
            Action::Unfollow { .. } => UNFOLLOW,
            Action::OpenEdit(_) => OPEN_EDIT,
            Action::CancelEdit(_) => CANCEL_EDIT,
            Action::SubmitEdit { .. } => SUBMIT_EDIT,
            Action::SubmitPost { .. } => SUBMIT_POST,
        }
    }
}
