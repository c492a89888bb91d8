use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Serialize, Serializer};

use crate::constants::PRICE_DECIMAL_PLACES;

pub type Uuid = i32;

#[derive(Clone, Debug, PartialEq, PartialOrd, Serialize, Eq, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    User,
    Staff,
    Superuser,
}

#[derive(sqlx::FromRow, Debug, Clone, PartialEq)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub password: String,
    pub is_active: bool,
    pub is_staff: bool,
    pub is_superuser: bool,
    pub last_login: Option<DateTime<Utc>>,
}

impl User {
    pub fn role(&self) -> UserRole {
        if self.is_superuser {
            UserRole::Superuser
        } else if self.is_staff {
            UserRole::Staff
        } else {
            UserRole::User
        }
    }
}

/// Row to be inserted; `password` is already hashed.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub name: String,
    pub password: String,
    pub is_active: bool,
    pub is_staff: bool,
    pub is_superuser: bool,
}

#[derive(sqlx::FromRow, Debug, Clone, PartialEq)]
pub struct Recipe {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub time_minutes: i32,
    pub price: Decimal,
    pub description: String,
    pub link: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecipeFields {
    pub title: String,
    pub time_minutes: i32,
    pub price: Decimal,
    pub description: String,
    pub link: String,
}

#[derive(sqlx::FromRow, Debug, Clone, PartialEq)]
pub struct Tag {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
}

// Response bodies

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct UserProfile {
    pub email: String,
    pub name: String,
}

impl From<&User> for UserProfile {
    fn from(user: &User) -> Self {
        Self {
            email: user.email.to_owned(),
            name: user.name.to_owned(),
        }
    }
}

#[derive(Serialize, Debug, Clone)]
pub struct TokenResponse {
    pub token: String,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct RecipeSummary {
    pub id: Uuid,
    pub title: String,
    pub time_minutes: i32,
    #[serde(serialize_with = "serialize_price")]
    pub price: Decimal,
    pub link: String,
}

impl From<&Recipe> for RecipeSummary {
    fn from(recipe: &Recipe) -> Self {
        Self {
            id: recipe.id,
            title: recipe.title.to_owned(),
            time_minutes: recipe.time_minutes,
            price: recipe.price,
            link: recipe.link.to_owned(),
        }
    }
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct RecipeDetail {
    #[serde(flatten)]
    pub summary: RecipeSummary,
    pub description: String,
}

impl From<&Recipe> for RecipeDetail {
    fn from(recipe: &Recipe) -> Self {
        Self {
            summary: RecipeSummary::from(recipe),
            description: recipe.description.to_owned(),
        }
    }
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct TagView {
    pub id: Uuid,
    pub name: String,
}

impl From<&Tag> for TagView {
    fn from(tag: &Tag) -> Self {
        Self {
            id: tag.id,
            name: tag.name.to_owned(),
        }
    }
}

#[derive(Serialize, Debug, Clone)]
pub struct AdminUserView {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub is_active: bool,
    pub is_staff: bool,
    pub is_superuser: bool,
    pub last_login: Option<DateTime<Utc>>,
}

impl From<&User> for AdminUserView {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.to_owned(),
            name: user.name.to_owned(),
            is_active: user.is_active,
            is_staff: user.is_staff,
            is_superuser: user.is_superuser,
            last_login: user.last_login,
        }
    }
}

#[derive(Serialize, Debug, Clone)]
pub struct AdminRecipeView {
    pub user: Uuid,
    #[serde(flatten)]
    pub recipe: RecipeDetail,
}

impl From<&Recipe> for AdminRecipeView {
    fn from(recipe: &Recipe) -> Self {
        Self {
            user: recipe.user_id,
            recipe: RecipeDetail::from(recipe),
        }
    }
}

#[derive(Serialize, Debug, Clone)]
pub struct AdminTagView {
    pub user: Uuid,
    #[serde(flatten)]
    pub tag: TagView,
}

impl From<&Tag> for AdminTagView {
    fn from(tag: &Tag) -> Self {
        Self {
            user: tag.user_id,
            tag: TagView::from(tag),
        }
    }
}

/// Prices always go out as strings with a fixed two decimal places ("5.50").
pub fn format_price(price: &Decimal) -> String {
    let mut price = price.round_dp(PRICE_DECIMAL_PLACES);
    price.rescale(PRICE_DECIMAL_PLACES);
    price.to_string()
}

fn serialize_price<S>(price: &Decimal, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&format_price(price))
}
