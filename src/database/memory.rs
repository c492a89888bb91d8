use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{
    error::QueryError,
    repository::Repository,
    schema::{NewUser, Recipe, RecipeFields, Tag, User, Uuid},
};

#[derive(Default)]
struct Tables {
    users: BTreeMap<Uuid, User>,
    recipes: BTreeMap<Uuid, Recipe>,
    tags: BTreeMap<Uuid, Tag>,
    next_user: Uuid,
    next_recipe: Uuid,
    next_tag: Uuid,
}

fn next_id(counter: &mut Uuid) -> Uuid {
    *counter += 1;
    *counter
}

fn visible(owner: Option<Uuid>, user_id: Uuid) -> bool {
    owner.map_or(true, |owner| owner == user_id)
}

/// In-memory storage for development and tests. Ids are handed out in insertion
/// order, starting at 1, the same way a serial column does.
#[derive(Default)]
pub struct MemoryRepository {
    tables: RwLock<Tables>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Repository for MemoryRepository {
    async fn ping(&self) -> Result<(), QueryError> {
        Ok(())
    }

    async fn insert_user(&self, user: NewUser) -> Result<User, QueryError> {
        let mut tables = self.tables.write().await;
        if tables.users.values().any(|u| u.email == user.email) {
            return Err(QueryError::Duplicate("email"));
        }

        let id = next_id(&mut tables.next_user);
        let row = User {
            id,
            email: user.email,
            name: user.name,
            password: user.password,
            is_active: user.is_active,
            is_staff: user.is_staff,
            is_superuser: user.is_superuser,
            last_login: None,
        };
        tables.users.insert(id, row.clone());
        log::debug!("Created user {} with id {}", row.email, id);

        Ok(row)
    }

    async fn find_user(&self, id: Uuid) -> Result<Option<User>, QueryError> {
        Ok(self.tables.read().await.users.get(&id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, QueryError> {
        let tables = self.tables.read().await;
        Ok(tables.users.values().find(|u| u.email == email).cloned())
    }

    async fn list_users(&self) -> Result<Vec<User>, QueryError> {
        Ok(self.tables.read().await.users.values().cloned().collect())
    }

    async fn save_user(&self, user: &User) -> Result<User, QueryError> {
        let mut tables = self.tables.write().await;
        if tables
            .users
            .values()
            .any(|u| u.id != user.id && u.email == user.email)
        {
            return Err(QueryError::Duplicate("email"));
        }

        match tables.users.get_mut(&user.id) {
            Some(row) => {
                *row = user.clone();
                Ok(row.clone())
            }
            None => Err(QueryError::Database(sqlx::Error::RowNotFound)),
        }
    }

    async fn delete_user(&self, id: Uuid) -> Result<bool, QueryError> {
        let mut tables = self.tables.write().await;
        if tables.users.remove(&id).is_none() {
            return Ok(false);
        }
        tables.recipes.retain(|_, r| r.user_id != id);
        tables.tags.retain(|_, t| t.user_id != id);

        Ok(true)
    }

    async fn insert_recipe(&self, owner: Uuid, fields: RecipeFields) -> Result<Recipe, QueryError> {
        let mut tables = self.tables.write().await;
        let id = next_id(&mut tables.next_recipe);
        let row = Recipe {
            id,
            user_id: owner,
            title: fields.title,
            time_minutes: fields.time_minutes,
            price: fields.price,
            description: fields.description,
            link: fields.link,
        };
        tables.recipes.insert(id, row.clone());

        Ok(row)
    }

    async fn list_recipes(&self, owner: Option<Uuid>) -> Result<Vec<Recipe>, QueryError> {
        let tables = self.tables.read().await;
        Ok(tables
            .recipes
            .values()
            .rev()
            .filter(|r| visible(owner, r.user_id))
            .cloned()
            .collect())
    }

    async fn find_recipe(&self, owner: Option<Uuid>, id: Uuid) -> Result<Option<Recipe>, QueryError> {
        let tables = self.tables.read().await;
        Ok(tables
            .recipes
            .get(&id)
            .filter(|r| visible(owner, r.user_id))
            .cloned())
    }

    async fn save_recipe(&self, owner: Option<Uuid>, recipe: &Recipe) -> Result<Recipe, QueryError> {
        let mut tables = self.tables.write().await;
        match tables
            .recipes
            .get_mut(&recipe.id)
            .filter(|r| visible(owner, r.user_id))
        {
            Some(row) => {
                *row = recipe.clone();
                Ok(row.clone())
            }
            None => Err(QueryError::Database(sqlx::Error::RowNotFound)),
        }
    }

    async fn delete_recipe(&self, owner: Option<Uuid>, id: Uuid) -> Result<bool, QueryError> {
        let mut tables = self.tables.write().await;
        if tables.recipes.get(&id).is_some_and(|r| visible(owner, r.user_id)) {
            tables.recipes.remove(&id);
            return Ok(true);
        }

        Ok(false)
    }

    async fn insert_tag(&self, owner: Uuid, name: &str) -> Result<Tag, QueryError> {
        let mut tables = self.tables.write().await;
        let id = next_id(&mut tables.next_tag);
        let row = Tag {
            id,
            user_id: owner,
            name: name.to_string(),
        };
        tables.tags.insert(id, row.clone());

        Ok(row)
    }

    async fn list_tags(&self, owner: Option<Uuid>) -> Result<Vec<Tag>, QueryError> {
        let tables = self.tables.read().await;
        let mut rows: Vec<Tag> = tables
            .tags
            .values()
            .filter(|t| visible(owner, t.user_id))
            .cloned()
            .collect();
        // Byte order, the same as `COLLATE "C"` on the Postgres side.
        rows.sort_by(|a, b| a.name.as_bytes().cmp(b.name.as_bytes()).then(a.id.cmp(&b.id)));

        Ok(rows)
    }

    async fn find_tag(&self, owner: Option<Uuid>, id: Uuid) -> Result<Option<Tag>, QueryError> {
        let tables = self.tables.read().await;
        Ok(tables.tags.get(&id).filter(|t| visible(owner, t.user_id)).cloned())
    }

    async fn save_tag(&self, owner: Option<Uuid>, tag: &Tag) -> Result<Tag, QueryError> {
        let mut tables = self.tables.write().await;
        match tables
            .tags
            .get_mut(&tag.id)
            .filter(|t| visible(owner, t.user_id))
        {
            Some(row) => {
                *row = tag.clone();
                Ok(row.clone())
            }
            None => Err(QueryError::Database(sqlx::Error::RowNotFound)),
        }
    }

    async fn delete_tag(&self, owner: Option<Uuid>, id: Uuid) -> Result<bool, QueryError> {
        let mut tables = self.tables.write().await;
        if tables.tags.get(&id).is_some_and(|t| visible(owner, t.user_id)) {
            tables.tags.remove(&id);
            return Ok(true);
        }

        Ok(false)
    }
}
