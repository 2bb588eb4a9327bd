//! Member and athlete lookups used by the cascades and the key-value service.

use crate::{
    core::new_id,
    entities::{User, user},
    errors::{Error, Result},
};
use sea_orm::{ConnectionTrait, Set, prelude::*};

/// Creates a new active member.
///
/// # Errors
/// Returns an error if the name is empty or the insert fails.
pub async fn create_user(
    db: &DatabaseConnection,
    name: String,
    email: Option<String>,
    age_group: Option<String>,
) -> Result<user::Model> {
    if name.trim().is_empty() {
        return Err(Error::Config {
            message: "User name cannot be empty".to_string(),
        });
    }

    let user = user::ActiveModel {
        id: Set(new_id()),
        name: Set(name.trim().to_string()),
        email: Set(email),
        member_number: Set(None),
        age_group: Set(age_group),
        active: Set(true),
        created_at: Set(chrono::Utc::now().naive_utc()),
    };
    user.insert(db).await.map_err(Into::into)
}

/// Finds a user by id, returning None if absent.
pub async fn get_user_by_id<C>(db: &C, user_id: &str) -> Result<Option<user::Model>>
where
    C: ConnectionTrait,
{
    User::find_by_id(user_id.to_string())
        .one(db)
        .await
        .map_err(Into::into)
}

/// Finds a user by id, failing with [`Error::UserNotFound`] if absent.
pub async fn require_user<C>(db: &C, user_id: &str) -> Result<user::Model>
where
    C: ConnectionTrait,
{
    get_user_by_id(db, user_id)
        .await?
        .ok_or_else(|| Error::UserNotFound {
            id: user_id.to_string(),
        })
}
