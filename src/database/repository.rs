use async_trait::async_trait;

use super::{
    error::QueryError,
    schema::{NewUser, Recipe, RecipeFields, Tag, User, Uuid},
};

/// Storage for users, recipes and tags.
///
/// Recipe and tag lookups take an `owner` scope. `Some(owner)` only ever sees
/// rows owned by that user, and a row owned by someone else behaves exactly
/// like a missing one. `None` reaches every owner's rows.
#[async_trait]
pub trait Repository: Send + Sync {
    async fn ping(&self) -> Result<(), QueryError>;

    // Users
    async fn insert_user(&self, user: NewUser) -> Result<User, QueryError>;
    async fn find_user(&self, id: Uuid) -> Result<Option<User>, QueryError>;
    /// Exact match on the stored address.
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, QueryError>;
    /// Ordered by id.
    async fn list_users(&self) -> Result<Vec<User>, QueryError>;
    async fn save_user(&self, user: &User) -> Result<User, QueryError>;
    /// Removes the user together with their recipes and tags.
    async fn delete_user(&self, id: Uuid) -> Result<bool, QueryError>;

    // Recipes
    async fn insert_recipe(&self, owner: Uuid, fields: RecipeFields) -> Result<Recipe, QueryError>;
    /// Ordered by id, newest first.
    async fn list_recipes(&self, owner: Option<Uuid>) -> Result<Vec<Recipe>, QueryError>;
    async fn find_recipe(&self, owner: Option<Uuid>, id: Uuid) -> Result<Option<Recipe>, QueryError>;
    /// Writes every column, `user_id` included, of a row visible to `owner`.
    async fn save_recipe(&self, owner: Option<Uuid>, recipe: &Recipe) -> Result<Recipe, QueryError>;
    async fn delete_recipe(&self, owner: Option<Uuid>, id: Uuid) -> Result<bool, QueryError>;

    // Tags
    async fn insert_tag(&self, owner: Uuid, name: &str) -> Result<Tag, QueryError>;
    /// Ordered by name, compared byte-wise so `Banana` sorts before `apple`.
    async fn list_tags(&self, owner: Option<Uuid>) -> Result<Vec<Tag>, QueryError>;
    async fn find_tag(&self, owner: Option<Uuid>, id: Uuid) -> Result<Option<Tag>, QueryError>;
    async fn save_tag(&self, owner: Option<Uuid>, tag: &Tag) -> Result<Tag, QueryError>;
    async fn delete_tag(&self, owner: Option<Uuid>, id: Uuid) -> Result<bool, QueryError>;
}
