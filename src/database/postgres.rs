use async_trait::async_trait;
use sqlx::{postgres::PgPoolOptions, Pool, Postgres};

use super::{
    error::QueryError,
    repository::Repository,
    schema::{NewUser, Recipe, RecipeFields, Tag, User, Uuid},
};

pub async fn connect(url: &str, max_connections: u32) -> Result<Pool<Postgres>, QueryError> {
    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(url)
        .await?;

    Ok(pool)
}

pub async fn migrate(pool: &Pool<Postgres>) -> Result<(), QueryError> {
    sqlx::migrate!("./migrations").run(pool).await?;
    log::info!("> Migrations applied");

    Ok(())
}

fn map_unique(e: sqlx::Error, column: &'static str) -> QueryError {
    match &e {
        sqlx::Error::Database(db) if db.is_unique_violation() => QueryError::Duplicate(column),
        _ => QueryError::from(e),
    }
}

#[derive(Clone)]
pub struct PgRepository {
    pool: Pool<Postgres>,
}

impl PgRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &Pool<Postgres> {
        &self.pool
    }
}

#[async_trait]
impl Repository for PgRepository {
    async fn ping(&self) -> Result<(), QueryError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;

        Ok(())
    }

    async fn insert_user(&self, user: NewUser) -> Result<User, QueryError> {
        let row: User = sqlx::query_as(
            "
            INSERT INTO users (email, name, password, is_active, is_staff, is_superuser)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *;
        ",
        )
        .bind(&user.email)
        .bind(&user.name)
        .bind(&user.password)
        .bind(user.is_active)
        .bind(user.is_staff)
        .bind(user.is_superuser)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_unique(e, "email"))?;

        Ok(row)
    }

    async fn find_user(&self, id: Uuid) -> Result<Option<User>, QueryError> {
        let row: Option<User> = sqlx::query_as("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row)
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, QueryError> {
        let row: Option<User> = sqlx::query_as("SELECT * FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row)
    }

    async fn list_users(&self) -> Result<Vec<User>, QueryError> {
        let rows: Vec<User> = sqlx::query_as("SELECT * FROM users ORDER BY id")
            .fetch_all(&self.pool)
            .await?;

        Ok(rows)
    }

    async fn save_user(&self, user: &User) -> Result<User, QueryError> {
        let row: User = sqlx::query_as(
            "
            UPDATE users
            SET email = $2, name = $3, password = $4, is_active = $5,
                is_staff = $6, is_superuser = $7, last_login = $8
            WHERE id = $1
            RETURNING *;
        ",
        )
        .bind(user.id)
        .bind(&user.email)
        .bind(&user.name)
        .bind(&user.password)
        .bind(user.is_active)
        .bind(user.is_staff)
        .bind(user.is_superuser)
        .bind(user.last_login)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_unique(e, "email"))?;

        Ok(row)
    }

    async fn delete_user(&self, id: Uuid) -> Result<bool, QueryError> {
        let query = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(query.rows_affected() > 0)
    }

    async fn insert_recipe(&self, owner: Uuid, fields: RecipeFields) -> Result<Recipe, QueryError> {
        let row: Recipe = sqlx::query_as(
            "
            INSERT INTO recipes (user_id, title, time_minutes, price, description, link)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *;
        ",
        )
        .bind(owner)
        .bind(&fields.title)
        .bind(fields.time_minutes)
        .bind(fields.price)
        .bind(&fields.description)
        .bind(&fields.link)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    async fn list_recipes(&self, owner: Option<Uuid>) -> Result<Vec<Recipe>, QueryError> {
        let rows: Vec<Recipe> = sqlx::query_as(
            "SELECT * FROM recipes WHERE ($1::int4 IS NULL OR user_id = $1) ORDER BY id DESC",
        )
        .bind(owner)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn find_recipe(&self, owner: Option<Uuid>, id: Uuid) -> Result<Option<Recipe>, QueryError> {
        let row: Option<Recipe> = sqlx::query_as(
            "SELECT * FROM recipes WHERE id = $1 AND ($2::int4 IS NULL OR user_id = $2)",
        )
        .bind(id)
        .bind(owner)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    async fn save_recipe(&self, owner: Option<Uuid>, recipe: &Recipe) -> Result<Recipe, QueryError> {
        let row: Recipe = sqlx::query_as(
            "
            UPDATE recipes
            SET user_id = $3, title = $4, time_minutes = $5, price = $6,
                description = $7, link = $8
            WHERE id = $1 AND ($2::int4 IS NULL OR user_id = $2)
            RETURNING *;
        ",
        )
        .bind(recipe.id)
        .bind(owner)
        .bind(recipe.user_id)
        .bind(&recipe.title)
        .bind(recipe.time_minutes)
        .bind(recipe.price)
        .bind(&recipe.description)
        .bind(&recipe.link)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    async fn delete_recipe(&self, owner: Option<Uuid>, id: Uuid) -> Result<bool, QueryError> {
        let query = sqlx::query(
            "DELETE FROM recipes WHERE id = $1 AND ($2::int4 IS NULL OR user_id = $2)",
        )
        .bind(id)
        .bind(owner)
        .execute(&self.pool)
        .await?;

        Ok(query.rows_affected() > 0)
    }

    async fn insert_tag(&self, owner: Uuid, name: &str) -> Result<Tag, QueryError> {
        let row: Tag =
            sqlx::query_as("INSERT INTO tags (user_id, name) VALUES ($1, $2) RETURNING *")
                .bind(owner)
                .bind(name)
                .fetch_one(&self.pool)
                .await?;

        Ok(row)
    }

    async fn list_tags(&self, owner: Option<Uuid>) -> Result<Vec<Tag>, QueryError> {
        let rows: Vec<Tag> = sqlx::query_as(
            "
            SELECT * FROM tags
            WHERE ($1::int4 IS NULL OR user_id = $1)
            ORDER BY name COLLATE \"C\", id;
        ",
        )
        .bind(owner)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn find_tag(&self, owner: Option<Uuid>, id: Uuid) -> Result<Option<Tag>, QueryError> {
        let row: Option<Tag> = sqlx::query_as(
            "SELECT * FROM tags WHERE id = $1 AND ($2::int4 IS NULL OR user_id = $2)",
        )
        .bind(id)
        .bind(owner)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    async fn save_tag(&self, owner: Option<Uuid>, tag: &Tag) -> Result<Tag, QueryError> {
        let row: Tag = sqlx::query_as(
            "
            UPDATE tags SET user_id = $3, name = $4
            WHERE id = $1 AND ($2::int4 IS NULL OR user_id = $2)
            RETURNING *;
        ",
        )
        .bind(tag.id)
        .bind(owner)
        .bind(tag.user_id)
        .bind(&tag.name)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    async fn delete_tag(&self, owner: Option<Uuid>, id: Uuid) -> Result<bool, QueryError> {
        let query = sqlx::query(
            "DELETE FROM tags WHERE id = $1 AND ($2::int4 IS NULL OR user_id = $2)",
        )
        .bind(id)
        .bind(owner)
        .execute(&self.pool)
        .await?;

        Ok(query.rows_affected() > 0)
    }
}
