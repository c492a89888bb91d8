use chrono::Utc;

use crate::{
    authentication::{
        cryptography::{hash_password, normalize_email, verify_password},
        jwt::AuthKeys,
        permissions::{authorize, ActionType},
    },
    constants::{MAX_CHAR_LENGTH, MIN_PASSWORD_LENGTH},
    error::{ApiError, QueryError},
    form::{CharRules, Form},
    repository::Repository,
    schema::{NewUser, TokenResponse, User, UserProfile},
};

pub(crate) const DUPLICATE_EMAIL: &str = "user with this email already exists.";
const INVALID_CREDENTIALS: &str = "Unable to authenticate with provided credentials.";

pub(crate) const EMAIL: CharRules = CharRules::required(MAX_CHAR_LENGTH);
const NAME: CharRules = CharRules::required(MAX_CHAR_LENGTH);
pub(crate) const PASSWORD: CharRules = CharRules::required(MAX_CHAR_LENGTH).min_length(MIN_PASSWORD_LENGTH);

pub(crate) fn hash(password: &str) -> Result<String, ApiError> {
    hash_password(password).map_err(|e| ApiError::Internal(format!("password hashing failed: {e}")))
}

/// A unique violation on `users.email` is a field error, not a server error.
pub(crate) fn duplicate_email(e: QueryError) -> ApiError {
    if e.is_duplicate() {
        ApiError::field("email", DUPLICATE_EMAIL)
    } else {
        e.into()
    }
}

async fn insert(
    repo: &dyn Repository,
    email: &str,
    password: &str,
    name: &str,
    elevated: bool,
) -> Result<User, ApiError> {
    let email = normalize_email(email);
    if email.is_empty() {
        return Err(ApiError::field("email", "Users must have an email address."));
    }

    let user = NewUser {
        email,
        name: name.to_string(),
        password: hash(password)?,
        is_active: true,
        is_staff: elevated,
        is_superuser: elevated,
    };

    repo.insert_user(user).await.map_err(duplicate_email)
}

/// Creates a regular user with a normalized email and a hashed password.
pub async fn create_user(
    repo: &dyn Repository,
    email: &str,
    password: &str,
    name: &str,
) -> Result<User, ApiError> {
    insert(repo, email, password, name, false).await
}

/// Creates a user with the staff and superuser flags set.
pub async fn create_superuser(
    repo: &dyn Repository,
    email: &str,
    password: &str,
    name: &str,
) -> Result<User, ApiError> {
    let user = insert(repo, email, password, name, true).await?;
    log::info!("> Created superuser {}", user.email);

    Ok(user)
}

pub(crate) async fn email_taken(
    repo: &dyn Repository,
    email: &str,
    except: Option<i32>,
) -> Result<bool, ApiError> {
    let existing = repo.find_user_by_email(email).await?;
    Ok(existing.is_some_and(|user| Some(user.id) != except))
}

pub async fn register(repo: &dyn Repository, mut form: Form) -> Result<UserProfile, ApiError> {
    let email = form.get_email("email", EMAIL).map(|e| normalize_email(&e));
    let password = form.get_str("password", PASSWORD);
    let name = form.get_str("name", NAME);

    if let Some(email) = &email {
        if email_taken(repo, email, None).await? {
            form.add_error("email", DUPLICATE_EMAIL);
        }
    }
    form.finish()?;

    let (Some(email), Some(password), Some(name)) = (email, password, name) else {
        return Err(ApiError::Internal(String::from("validated form missing fields")));
    };

    let user = create_user(repo, &email, &password, &name).await?;
    log::info!("> Registered user {}", user.id);

    Ok(UserProfile::from(&user))
}

pub async fn obtain_token(
    repo: &dyn Repository,
    keys: &AuthKeys,
    mut form: Form,
) -> Result<TokenResponse, ApiError> {
    let email = form.get_str("email", CharRules::required(MAX_CHAR_LENGTH));
    let password = form.get_str("password", CharRules::required(MAX_CHAR_LENGTH).untrimmed());
    form.finish()?;

    let (Some(email), Some(password)) = (email, password) else {
        return Err(ApiError::non_field(INVALID_CREDENTIALS));
    };

    // Looked up as typed, so only the stored spelling of the address logs in.
    let user = repo.find_user_by_email(&email).await?;
    let Some(mut user) = user else {
        return Err(ApiError::non_field(INVALID_CREDENTIALS));
    };

    let authenticated = verify_password(&password, &user.password)
        .map_err(|e| ApiError::Internal(format!("stored password hash unreadable: {e}")))?;
    if !authenticated || !user.is_active {
        return Err(ApiError::non_field(INVALID_CREDENTIALS));
    }

    user.last_login = Some(Utc::now());
    let user = repo.save_user(&user).await?;

    Ok(TokenResponse {
        token: keys.generate_token(&user)?,
    })
}

pub fn me(user: &User) -> Result<UserProfile, ApiError> {
    authorize(user, ActionType::ManageOwnProfile)?;

    Ok(UserProfile::from(user))
}

/// PUT replaces email, name and password; PATCH changes only what is given.
pub async fn update_me(
    repo: &dyn Repository,
    user: User,
    mut form: Form,
) -> Result<UserProfile, ApiError> {
    authorize(&user, ActionType::ManageOwnProfile)?;

    let email = form.get_email("email", EMAIL).map(|e| normalize_email(&e));
    let password = form.get_str("password", PASSWORD);
    let name = form.get_str("name", NAME);

    if let Some(email) = &email {
        if email_taken(repo, email, Some(user.id)).await? {
            form.add_error("email", DUPLICATE_EMAIL);
        }
    }
    form.finish()?;

    let mut user = user;
    if let Some(email) = email {
        user.email = email;
    }
    if let Some(name) = name {
        user.name = name;
    }
    if let Some(password) = password {
        user.password = hash(&password)?;
    }

    let user = repo.save_user(&user).await.map_err(duplicate_email)?;

    Ok(UserProfile::from(&user))
}
