use crate::{
    actions::{
        recipes::RecipeInput,
        tags,
        users::{duplicate_email, email_taken, hash, DUPLICATE_EMAIL, EMAIL, PASSWORD},
    },
    authentication::{
        cryptography::normalize_email,
        permissions::{authorize, ActionType},
    },
    constants::MAX_CHAR_LENGTH,
    error::ApiError,
    form::{CharRules, Form},
    repository::Repository,
    schema::{AdminRecipeView, AdminTagView, AdminUserView, NewUser, User, Uuid},
};

const NAME: CharRules = CharRules::optional(Some(MAX_CHAR_LENGTH));
const NEW_PASSWORD: CharRules = CharRules {
    required: false,
    ..PASSWORD
};

/// Reads the `user` key as the owner of a recipe or tag.
async fn read_owner(
    repo: &dyn Repository,
    form: &mut Form,
    required: bool,
) -> Result<Option<User>, ApiError> {
    let Some(id) = form.get_i32("user", required) else {
        return Ok(None);
    };

    let owner = repo.find_user(id).await?;
    if owner.is_none() {
        form.add_error("user", format!("Invalid pk \"{id}\" - object does not exist."));
    }

    Ok(owner)
}

fn validated<T>(value: Option<T>) -> Result<T, ApiError> {
    value.ok_or_else(|| ApiError::Internal(String::from("validated form missing fields")))
}

// Users

pub async fn list_users(repo: &dyn Repository, admin: &User) -> Result<Vec<AdminUserView>, ApiError> {
    authorize(admin, ActionType::ViewAllUsers)?;

    let rows = repo.list_users().await?;
    Ok(rows.iter().map(AdminUserView::from).collect())
}

pub async fn get_user(
    repo: &dyn Repository,
    admin: &User,
    id: Uuid,
) -> Result<AdminUserView, ApiError> {
    authorize(admin, ActionType::ViewAllUsers)?;

    let user = repo.find_user(id).await?.ok_or(ApiError::NotFound)?;
    Ok(AdminUserView::from(&user))
}

/// Adds a user with a password and permission flags. `is_active` defaults to
/// true, the other flags to false.
pub async fn create_user(
    repo: &dyn Repository,
    admin: &User,
    mut form: Form,
) -> Result<AdminUserView, ApiError> {
    authorize(admin, ActionType::ManageUsers)?;

    let email = form.get_email("email", EMAIL).map(|e| normalize_email(&e));
    let password = form.get_str("password", PASSWORD);
    let name = form.get_str("name", NAME);
    let is_active = form.get_bool("is_active", false);
    let is_staff = form.get_bool("is_staff", false);
    let is_superuser = form.get_bool("is_superuser", false);

    if let Some(email) = &email {
        if email_taken(repo, email, None).await? {
            form.add_error("email", DUPLICATE_EMAIL);
        }
    }
    form.finish()?;

    let user = NewUser {
        email: validated(email)?,
        name: name.unwrap_or_default(),
        password: hash(&validated(password)?)?,
        is_active: is_active.unwrap_or(true),
        is_staff: is_staff.unwrap_or(false),
        is_superuser: is_superuser.unwrap_or(false),
    };
    let user = repo.insert_user(user).await.map_err(duplicate_email)?;
    log::info!("> User {} created by {}", user.id, admin.id);

    Ok(AdminUserView::from(&user))
}

/// Edits email, name, password and permission flags of any user. A full
/// update requires the email; the password only changes when given.
pub async fn update_user(
    repo: &dyn Repository,
    admin: &User,
    id: Uuid,
    mut form: Form,
) -> Result<AdminUserView, ApiError> {
    authorize(admin, ActionType::ManageUsers)?;

    let mut user = repo.find_user(id).await?.ok_or(ApiError::NotFound)?;

    let email = form.get_email("email", EMAIL).map(|e| normalize_email(&e));
    let password = form.get_str("password", NEW_PASSWORD);
    let name = form.get_str("name", NAME);
    let is_active = form.get_bool("is_active", false);
    let is_staff = form.get_bool("is_staff", false);
    let is_superuser = form.get_bool("is_superuser", false);

    if let Some(email) = &email {
        if email_taken(repo, email, Some(user.id)).await? {
            form.add_error("email", DUPLICATE_EMAIL);
        }
    }
    form.finish()?;

    if let Some(email) = email {
        user.email = email;
    }
    if let Some(password) = password {
        user.password = hash(&password)?;
    }
    if let Some(name) = name {
        user.name = name;
    }
    if let Some(is_active) = is_active {
        user.is_active = is_active;
    }
    if let Some(is_staff) = is_staff {
        user.is_staff = is_staff;
    }
    if let Some(is_superuser) = is_superuser {
        user.is_superuser = is_superuser;
    }

    let user = repo.save_user(&user).await.map_err(duplicate_email)?;
    log::info!("> User {} updated by {}", user.id, admin.id);

    Ok(AdminUserView::from(&user))
}

/// Deletes a user along with everything they own.
pub async fn delete_user(repo: &dyn Repository, admin: &User, id: Uuid) -> Result<(), ApiError> {
    authorize(admin, ActionType::ManageUsers)?;

    if !repo.delete_user(id).await? {
        return Err(ApiError::NotFound);
    }
    log::info!("> User {} deleted by {}", id, admin.id);

    Ok(())
}

// Recipes

pub async fn list_recipes(
    repo: &dyn Repository,
    admin: &User,
) -> Result<Vec<AdminRecipeView>, ApiError> {
    authorize(admin, ActionType::ViewAllRecipes)?;

    let rows = repo.list_recipes(None).await?;
    Ok(rows.iter().map(AdminRecipeView::from).collect())
}

pub async fn get_recipe(
    repo: &dyn Repository,
    admin: &User,
    id: Uuid,
) -> Result<AdminRecipeView, ApiError> {
    authorize(admin, ActionType::ViewAllRecipes)?;

    let recipe = repo.find_recipe(None, id).await?.ok_or(ApiError::NotFound)?;
    Ok(AdminRecipeView::from(&recipe))
}

/// Creates a recipe for the user named by the `user` key.
pub async fn create_recipe(
    repo: &dyn Repository,
    admin: &User,
    mut form: Form,
) -> Result<AdminRecipeView, ApiError> {
    authorize(admin, ActionType::ManageAllRecipes)?;

    let input = RecipeInput::read_from(&mut form);
    let owner = read_owner(repo, &mut form, true).await?;
    form.finish()?;

    let owner = validated(owner)?;
    let recipe = repo.insert_recipe(owner.id, input.into_fields()?).await?;
    log::info!("> Recipe {} created for user {} by {}", recipe.id, owner.id, admin.id);

    Ok(AdminRecipeView::from(&recipe))
}

/// Same field rules as the owner's own update, plus `user` to move the recipe.
pub async fn update_recipe(
    repo: &dyn Repository,
    admin: &User,
    id: Uuid,
    mut form: Form,
) -> Result<AdminRecipeView, ApiError> {
    authorize(admin, ActionType::ManageAllRecipes)?;

    let mut recipe = repo.find_recipe(None, id).await?.ok_or(ApiError::NotFound)?;

    let input = RecipeInput::read_from(&mut form);
    let owner = read_owner(repo, &mut form, true).await?;
    form.finish()?;

    input.apply(&mut recipe);
    if let Some(owner) = owner {
        recipe.user_id = owner.id;
    }
    let recipe = repo.save_recipe(None, &recipe).await?;

    Ok(AdminRecipeView::from(&recipe))
}

pub async fn delete_recipe(repo: &dyn Repository, admin: &User, id: Uuid) -> Result<(), ApiError> {
    authorize(admin, ActionType::ManageAllRecipes)?;

    if !repo.delete_recipe(None, id).await? {
        return Err(ApiError::NotFound);
    }
    log::info!("> Recipe {} deleted by {}", id, admin.id);

    Ok(())
}

// Tags

pub async fn list_tags(repo: &dyn Repository, admin: &User) -> Result<Vec<AdminTagView>, ApiError> {
    authorize(admin, ActionType::ViewAllTags)?;

    let rows = repo.list_tags(None).await?;
    Ok(rows.iter().map(AdminTagView::from).collect())
}

pub async fn get_tag(repo: &dyn Repository, admin: &User, id: Uuid) -> Result<AdminTagView, ApiError> {
    authorize(admin, ActionType::ViewAllTags)?;

    let tag = repo.find_tag(None, id).await?.ok_or(ApiError::NotFound)?;
    Ok(AdminTagView::from(&tag))
}

pub async fn create_tag(
    repo: &dyn Repository,
    admin: &User,
    mut form: Form,
) -> Result<AdminTagView, ApiError> {
    authorize(admin, ActionType::ManageAllTags)?;

    let name = form.get_str("name", tags::NAME);
    let owner = read_owner(repo, &mut form, true).await?;
    form.finish()?;

    let owner = validated(owner)?;
    let tag = tags::create_tag(repo, &owner, &validated(name)?).await?;
    log::info!("> Tag {} created for user {} by {}", tag.id, owner.id, admin.id);

    Ok(AdminTagView::from(&tag))
}

pub async fn update_tag(
    repo: &dyn Repository,
    admin: &User,
    id: Uuid,
    mut form: Form,
) -> Result<AdminTagView, ApiError> {
    authorize(admin, ActionType::ManageAllTags)?;

    let mut tag = repo.find_tag(None, id).await?.ok_or(ApiError::NotFound)?;

    let name = form.get_str("name", tags::NAME);
    let owner = read_owner(repo, &mut form, true).await?;
    form.finish()?;

    if let Some(name) = name {
        tag.name = name;
    }
    if let Some(owner) = owner {
        tag.user_id = owner.id;
    }
    let tag = repo.save_tag(None, &tag).await?;

    Ok(AdminTagView::from(&tag))
}

pub async fn delete_tag(repo: &dyn Repository, admin: &User, id: Uuid) -> Result<(), ApiError> {
    authorize(admin, ActionType::ManageAllTags)?;

    if !repo.delete_tag(None, id).await? {
        return Err(ApiError::NotFound);
    }
    log::info!("> Tag {} deleted by {}", id, admin.id);

    Ok(())
}
