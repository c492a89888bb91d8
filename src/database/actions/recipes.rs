use crate::{
    authentication::permissions::{authorize, ActionType},
    constants::{MAX_CHAR_LENGTH, PRICE_DECIMAL_PLACES, PRICE_MAX_DIGITS},
    error::ApiError,
    form::{CharRules, Form},
    repository::Repository,
    schema::{Recipe, RecipeDetail, RecipeFields, RecipeSummary, User, Uuid},
};

const TITLE: CharRules = CharRules::required(MAX_CHAR_LENGTH);
const DESCRIPTION: CharRules = CharRules::optional(None);
const LINK: CharRules = CharRules::optional(Some(MAX_CHAR_LENGTH));

/// Values read from a recipe body. `id` and `user` are never read here.
pub(crate) struct RecipeInput {
    title: Option<String>,
    time_minutes: Option<i32>,
    price: Option<rust_decimal::Decimal>,
    description: Option<String>,
    link: Option<String>,
}

impl RecipeInput {
    /// Reads the recipe fields, leaving any errors in `form`.
    pub(crate) fn read_from(form: &mut Form) -> Self {
        Self {
            title: form.get_str("title", TITLE),
            time_minutes: form.get_i32("time_minutes", true),
            price: form.get_decimal("price", true, PRICE_MAX_DIGITS, PRICE_DECIMAL_PLACES),
            description: form.get_str("description", DESCRIPTION),
            link: form.get_str("link", LINK),
        }
    }

    fn read(mut form: Form) -> Result<Self, ApiError> {
        let input = Self::read_from(&mut form);
        form.finish()?;

        Ok(input)
    }

    pub(crate) fn into_fields(self) -> Result<RecipeFields, ApiError> {
        match (self.title, self.time_minutes, self.price) {
            (Some(title), Some(time_minutes), Some(price)) => Ok(RecipeFields {
                title,
                time_minutes,
                price,
                description: self.description.unwrap_or_default(),
                link: self.link.unwrap_or_default(),
            }),
            _ => Err(ApiError::Internal(String::from(
                "validated recipe missing fields",
            ))),
        }
    }

    pub(crate) fn apply(self, recipe: &mut Recipe) {
        if let Some(title) = self.title {
            recipe.title = title;
        }
        if let Some(time_minutes) = self.time_minutes {
            recipe.time_minutes = time_minutes;
        }
        if let Some(price) = self.price {
            recipe.price = price;
        }
        if let Some(description) = self.description {
            recipe.description = description;
        }
        if let Some(link) = self.link {
            recipe.link = link;
        }
    }
}

async fn get_owned(repo: &dyn Repository, user: &User, id: Uuid) -> Result<Recipe, ApiError> {
    repo.find_recipe(Some(user.id), id)
        .await?
        .ok_or(ApiError::NotFound)
}

pub async fn list_recipes(
    repo: &dyn Repository,
    user: &User,
) -> Result<Vec<RecipeSummary>, ApiError> {
    authorize(user, ActionType::ManageOwnRecipes)?;

    let rows = repo.list_recipes(Some(user.id)).await?;
    Ok(rows.iter().map(RecipeSummary::from).collect())
}

pub async fn create_recipe(
    repo: &dyn Repository,
    user: &User,
    form: Form,
) -> Result<RecipeDetail, ApiError> {
    authorize(user, ActionType::ManageOwnRecipes)?;

    let fields = RecipeInput::read(form)?.into_fields()?;
    let recipe = repo.insert_recipe(user.id, fields).await?;
    log::debug!("> Created recipe {} for user {}", recipe.id, user.id);

    Ok(RecipeDetail::from(&recipe))
}

pub async fn get_recipe(
    repo: &dyn Repository,
    user: &User,
    id: Uuid,
) -> Result<RecipeDetail, ApiError> {
    authorize(user, ActionType::ManageOwnRecipes)?;

    let recipe = get_owned(repo, user, id).await?;
    Ok(RecipeDetail::from(&recipe))
}

/// Full update when the form is not partial, otherwise only the given fields.
/// The owner never changes.
pub async fn update_recipe(
    repo: &dyn Repository,
    user: &User,
    id: Uuid,
    form: Form,
) -> Result<RecipeDetail, ApiError> {
    authorize(user, ActionType::ManageOwnRecipes)?;

    let mut recipe = get_owned(repo, user, id).await?;
    RecipeInput::read(form)?.apply(&mut recipe);
    let recipe = repo.save_recipe(Some(user.id), &recipe).await?;

    Ok(RecipeDetail::from(&recipe))
}

pub async fn delete_recipe(repo: &dyn Repository, user: &User, id: Uuid) -> Result<(), ApiError> {
    authorize(user, ActionType::ManageOwnRecipes)?;

    if !repo.delete_recipe(Some(user.id), id).await? {
        return Err(ApiError::NotFound);
    }
    log::debug!("> Deleted recipe {} for user {}", id, user.id);

    Ok(())
}
