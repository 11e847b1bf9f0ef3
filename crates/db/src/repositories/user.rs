//! User repository for database operations.

use async_trait::async_trait;
use chrono::Utc;
use investa_core::auth::{NewUser, UserRecord};
use investa_core::store::UserStore;
use investa_shared::types::UserId;
use investa_shared::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, Set, SqlErr,
};

use crate::entities::users;

fn database(err: DbErr) -> AppError {
    AppError::Database(err.to_string())
}

fn to_record(model: users::Model) -> UserRecord {
    UserRecord {
        id: UserId::from_uuid(model.id),
        username: model.username,
        email: model.email,
        first_name: model.first_name,
        last_name: model.last_name,
        password_hash: model.password_hash,
        is_staff: model.is_staff,
        is_active: model.is_active,
        date_joined: model.date_joined.with_timezone(&Utc),
    }
}

/// User repository for CRUD operations.
#[derive(Debug, Clone)]
pub struct UserRepository {
    db: DatabaseConnection,
}

impl UserRepository {
    /// Creates a new user repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Checks if a username is already registered.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn username_exists(&self, username: &str) -> Result<bool, DbErr> {
        let count = users::Entity::find()
            .filter(users::Column::Username.eq(username))
            .count(&self.db)
            .await?;

        Ok(count > 0)
    }
}

#[async_trait]
impl UserStore for UserRepository {
    async fn create_user(&self, user: NewUser) -> AppResult<UserRecord> {
        if self.username_exists(&user.username).await.map_err(database)? {
            return Err(AppError::Validation(
                "A user with that username already exists.".to_string(),
            ));
        }

        let record = user.into_record(Utc::now());
        let model = users::ActiveModel {
            id: Set(record.id.into_inner()),
            username: Set(record.username),
            email: Set(record.email),
            first_name: Set(record.first_name),
            last_name: Set(record.last_name),
            password_hash: Set(record.password_hash),
            is_staff: Set(record.is_staff),
            is_active: Set(record.is_active),
            date_joined: Set(record.date_joined.into()),
        };

        match model.insert(&self.db).await {
            Ok(model) => Ok(to_record(model)),
            Err(err) if matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => Err(
                AppError::Validation("A user with that username already exists.".to_string()),
            ),
            Err(err) => Err(database(err)),
        }
    }

    async fn find_user(&self, id: UserId) -> AppResult<Option<UserRecord>> {
        users::Entity::find_by_id(id.into_inner())
            .one(&self.db)
            .await
            .map(|found| found.map(to_record))
            .map_err(database)
    }

    async fn find_user_by_username(&self, username: &str) -> AppResult<Option<UserRecord>> {
        users::Entity::find()
            .filter(users::Column::Username.eq(username))
            .one(&self.db)
            .await
            .map(|found| found.map(to_record))
            .map_err(database)
    }
}
