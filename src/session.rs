use crate::models::{NewUser, User, UserPatch};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SessionState {
    pub user: Option<User>,
    /// Set when the user record was created during this session rather than loaded.
    pub is_new: bool,
}

impl SessionState {
    pub fn needs_onboarding(&self) -> bool {
        self.user.as_ref().is_some_and(|user| !user.is_onboarded)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SessionCommand {
    Load(User),
    Update(UserPatch),
    Create(NewUser),
    Clear,
}

pub fn reduce(state: SessionState, command: SessionCommand) -> SessionState {
    use SessionCommand::*;

    match command {
        Load(user) => SessionState {
            user: Some(user),
            is_new: false,
        },

        Update(patch) => match state.user {
            Some(user) => SessionState {
                user: Some(apply_patch(user, patch)),
                is_new: state.is_new,
            },
            // Nothing to update before a user is known.
            None => state,
        },

        Create(new_user) => SessionState {
            user: Some(User {
                user_id: new_user.user_id,
                first_name: new_user.first_name,
                last_name: new_user.last_name,
                email: new_user.email,
                is_onboarded: false,
                is_member: false,
            }),
            is_new: true,
        },

        Clear => SessionState::default(),
    }
}

fn apply_patch(mut user: User, patch: UserPatch) -> User {
    if let Some(first_name) = patch.first_name {
        user.first_name = first_name;
    }
    if let Some(last_name) = patch.last_name {
        user.last_name = last_name;
    }
    if let Some(email) = patch.email {
        user.email = email;
    }
    if let Some(is_onboarded) = patch.is_onboarded {
        user.is_onboarded = is_onboarded;
    }
    if let Some(is_member) = patch.is_member {
        user.is_member = is_member;
    }
    user
}
