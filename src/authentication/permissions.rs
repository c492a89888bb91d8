use crate::{
    database::error::ApiError,
    schema::{User, UserRole},
};

const ACTION_TABLE: &[(UserRole, &[ActionType])] = &[
    (
        UserRole::User,
        &[
            ActionType::ManageOwnProfile,
            ActionType::ManageOwnRecipes,
            ActionType::ManageOwnTags,
        ],
    ),
    (
        UserRole::Staff,
        &[
            ActionType::ManageOwnProfile,
            ActionType::ManageOwnRecipes,
            ActionType::ManageOwnTags,
            ActionType::ViewAllUsers,
            ActionType::ViewAllRecipes,
            ActionType::ViewAllTags,
        ],
    ),
    (
        UserRole::Superuser,
        &[
            ActionType::ManageOwnProfile,
            ActionType::ManageOwnRecipes,
            ActionType::ManageOwnTags,
            ActionType::ViewAllUsers,
            ActionType::ViewAllRecipes,
            ActionType::ViewAllTags,
            ActionType::ManageUsers,
            ActionType::ManageAllRecipes,
            ActionType::ManageAllTags,
        ],
    ),
];

#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub enum ActionType {
    ManageOwnProfile,
    ManageOwnRecipes,
    ManageOwnTags,

    ViewAllUsers,
    ViewAllRecipes,
    ViewAllTags,

    ManageUsers,
    ManageAllRecipes,
    ManageAllTags,
}

impl ActionType {
    pub fn is_allowed(self, role: &UserRole) -> bool {
        ACTION_TABLE
            .iter()
            .find(|(uid, _)| uid == role)
            .is_some_and(|(_, actions)| actions.contains(&self))
    }
}

pub fn authorize(user: &User, action: ActionType) -> Result<(), ApiError> {
    if !user.is_active || !action.is_allowed(&user.role()) {
        log::debug!("> Denied {:?} for user {}", action, user.id);
        return Err(ApiError::PermissionDenied);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn users_manage_only_their_own() {
        assert!(ActionType::ManageOwnRecipes.is_allowed(&UserRole::User));
        assert!(ActionType::ManageOwnTags.is_allowed(&UserRole::User));
        assert!(!ActionType::ViewAllUsers.is_allowed(&UserRole::User));
        assert!(!ActionType::ManageUsers.is_allowed(&UserRole::User));
    }

    #[test]
    fn staff_can_view_but_not_manage_users() {
        assert!(ActionType::ViewAllUsers.is_allowed(&UserRole::Staff));
        assert!(ActionType::ViewAllRecipes.is_allowed(&UserRole::Staff));
        assert!(!ActionType::ManageUsers.is_allowed(&UserRole::Staff));
        assert!(!ActionType::ManageAllRecipes.is_allowed(&UserRole::Staff));
        assert!(!ActionType::ManageAllTags.is_allowed(&UserRole::Staff));
    }

    #[test]
    fn superuser_can_do_everything() {
        for action in [
            ActionType::ManageOwnProfile,
            ActionType::ManageOwnRecipes,
            ActionType::ManageOwnTags,
            ActionType::ViewAllUsers,
            ActionType::ViewAllRecipes,
            ActionType::ViewAllTags,
            ActionType::ManageUsers,
            ActionType::ManageAllRecipes,
            ActionType::ManageAllTags,
        ] {
            assert!(action.is_allowed(&UserRole::Superuser));
        }
    }
}
