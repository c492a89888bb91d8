use crate::{
    authentication::permissions::{authorize, ActionType},
    constants::MAX_CHAR_LENGTH,
    error::ApiError,
    form::{CharRules, Form},
    repository::Repository,
    schema::{Tag, TagView, User, Uuid},
};

pub(crate) const NAME: CharRules = CharRules::required(MAX_CHAR_LENGTH);

/// Stores a tag for `owner`. Callers decide who may create it; the name is
/// trimmed and must fit the column.
pub async fn create_tag(repo: &dyn Repository, owner: &User, name: &str) -> Result<Tag, ApiError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ApiError::field("name", "This field may not be blank."));
    }
    if name.chars().count() > MAX_CHAR_LENGTH {
        return Err(ApiError::field(
            "name",
            &format!("Ensure this field has no more than {MAX_CHAR_LENGTH} characters."),
        ));
    }

    let tag = repo.insert_tag(owner.id, name).await?;
    log::debug!("> Created tag {} for user {}", tag.id, owner.id);

    Ok(tag)
}

pub async fn list_tags(repo: &dyn Repository, user: &User) -> Result<Vec<TagView>, ApiError> {
    authorize(user, ActionType::ManageOwnTags)?;

    let rows = repo.list_tags(Some(user.id)).await?;
    Ok(rows.iter().map(TagView::from).collect())
}

pub async fn update_tag(
    repo: &dyn Repository,
    user: &User,
    id: Uuid,
    mut form: Form,
) -> Result<TagView, ApiError> {
    authorize(user, ActionType::ManageOwnTags)?;

    let mut tag = repo
        .find_tag(Some(user.id), id)
        .await?
        .ok_or(ApiError::NotFound)?;

    let name = form.get_str("name", NAME);
    form.finish()?;

    if let Some(name) = name {
        tag.name = name;
    }
    let tag = repo.save_tag(Some(user.id), &tag).await?;

    Ok(TagView::from(&tag))
}

pub async fn delete_tag(repo: &dyn Repository, user: &User, id: Uuid) -> Result<(), ApiError> {
    authorize(user, ActionType::ManageOwnTags)?;

    if !repo.delete_tag(Some(user.id), id).await? {
        return Err(ApiError::NotFound);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{actions::users::create_user, memory::MemoryRepository};

    #[tokio::test]
    async fn create_tag_for_user() {
        let repo = MemoryRepository::new();
        let user = create_user(&repo, "user@example.com", "testpass!@#", "")
            .await
            .unwrap();

        let tag = create_tag(&repo, &user, "Tag1").await.unwrap();
        assert_eq!(tag.name, "Tag1");
        assert_eq!(tag.user_id, user.id);
        assert_eq!(list_tags(&repo, &user).await.unwrap()[0].name, "Tag1");
    }

    #[tokio::test]
    async fn create_tag_rejects_blank_and_long_names() {
        let repo = MemoryRepository::new();
        let user = create_user(&repo, "user@example.com", "testpass!@#", "")
            .await
            .unwrap();

        assert!(matches!(
            create_tag(&repo, &user, "   ").await,
            Err(ApiError::Validation(_))
        ));
        assert!(matches!(
            create_tag(&repo, &user, &"x".repeat(MAX_CHAR_LENGTH + 1)).await,
            Err(ApiError::Validation(_))
        ));
        assert!(repo.list_tags(None).await.unwrap().is_empty());
    }
}
