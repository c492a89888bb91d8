use warp::{reject::Rejection, Filter};

use crate::{
    constants::TOKEN_KEYWORD,
    database::error::ApiError,
    schema::User,
    state::{with_state, AppState},
};

/// Resolves the `Authorization: Token <key>` header to an active user or
/// rejects the request with a 401.
pub fn with_user(state: AppState) -> impl Filter<Extract = (User,), Error = Rejection> + Clone {
    warp::header::optional::<String>("authorization")
        .and(with_state(state))
        .and_then(|header: Option<String>, state: AppState| async move {
            authenticate(header.as_deref(), &state)
                .await
                .map_err(Rejection::from)
        })
}

pub async fn authenticate(header: Option<&str>, state: &AppState) -> Result<User, ApiError> {
    let header = header.ok_or(ApiError::NotAuthenticated)?;
    let mut parts = header.split_whitespace();

    // Any other scheme counts as no credentials at all.
    match parts.next() {
        Some(keyword) if keyword.eq_ignore_ascii_case(TOKEN_KEYWORD) => {}
        _ => return Err(ApiError::NotAuthenticated),
    }

    let token = match (parts.next(), parts.next()) {
        (Some(token), None) => token,
        (None, _) => {
            return Err(ApiError::AuthenticationFailed(
                "Invalid token header. No credentials provided.",
            ))
        }
        (Some(_), Some(_)) => {
            return Err(ApiError::AuthenticationFailed(
                "Invalid token header. Token string should not contain spaces.",
            ))
        }
    };

    let claims = state.keys.verify_token(token)?;

    match state.repo().find_user(claims.user_id).await? {
        Some(user) if user.is_active => Ok(user),
        _ => Err(ApiError::AuthenticationFailed("User inactive or deleted.")),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::Duration;

    use super::*;
    use crate::{
        authentication::jwt::AuthKeys, memory::MemoryRepository, repository::Repository,
        schema::NewUser,
    };

    async fn state_with_user(active: bool) -> (AppState, User) {
        let repo = Arc::new(MemoryRepository::new());
        let user = repo
            .insert_user(NewUser {
                email: String::from("test@example.com"),
                name: String::from("Test"),
                password: String::from("hash"),
                is_active: active,
                is_staff: false,
                is_superuser: false,
            })
            .await
            .unwrap();
        let keys = AuthKeys::new(b"secret", Duration::hours(1)).unwrap();
        (AppState::new(repo, keys), user)
    }

    #[tokio::test]
    async fn missing_header() {
        let (state, _) = state_with_user(true).await;
        assert!(matches!(
            authenticate(None, &state).await,
            Err(ApiError::NotAuthenticated)
        ));
    }

    #[tokio::test]
    async fn other_scheme_is_not_authenticated() {
        let (state, _) = state_with_user(true).await;
        assert!(matches!(
            authenticate(Some("Bearer abc"), &state).await,
            Err(ApiError::NotAuthenticated)
        ));
    }

    #[tokio::test]
    async fn valid_token_resolves_user() {
        let (state, user) = state_with_user(true).await;
        let token = state.keys.generate_token(&user).unwrap();
        let header = format!("token {token}");
        let found = authenticate(Some(&header), &state).await.unwrap();
        assert_eq!(found.id, user.id);
    }

    #[tokio::test]
    async fn inactive_user_is_rejected() {
        let (state, user) = state_with_user(false).await;
        let token = state.keys.generate_token(&user).unwrap();
        let header = format!("Token {token}");
        assert!(matches!(
            authenticate(Some(&header), &state).await,
            Err(ApiError::AuthenticationFailed("User inactive or deleted."))
        ));
    }

    #[tokio::test]
    async fn malformed_headers() {
        let (state, _) = state_with_user(true).await;
        assert!(matches!(
            authenticate(Some("Token"), &state).await,
            Err(ApiError::AuthenticationFailed(_))
        ));
        assert!(matches!(
            authenticate(Some("Token a b"), &state).await,
            Err(ApiError::AuthenticationFailed(_))
        ));
        assert!(matches!(
            authenticate(Some("Token nonsense"), &state).await,
            Err(ApiError::AuthenticationFailed("Invalid token."))
        ));
    }
}
