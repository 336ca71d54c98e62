//! User repository
//!
//! Accounts, login tracking and user-management listings. Password hashes
//! never leave this module in listings; only [`UserRecord`] carries one.

use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use qaeval_core::{Page, Pagination, Role};
use serde::Serialize;
use sqlx::{FromRow, MySqlPool, Row};
use tracing::debug;

use crate::db::error::is_unique_violation;
use crate::db::paginate::paginate;
use crate::db::rows::JsonRow;
use crate::db::value::SqlValue;
use crate::db::DbError;

pub const DUPLICATE_ACCOUNT: &str = "username or email already exists";

/// Full account row
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct UserRecord {
    pub user_id: i64,
    pub username: String,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: String,
    pub is_active: bool,
    pub created_at: NaiveDateTime,
    pub last_login: Option<NaiveDateTime>,
}

#[derive(Debug, Clone)]
pub struct NewUser<'a> {
    pub username: &'a str,
    pub name: &'a str,
    pub email: &'a str,
    pub password_hash: &'a str,
    pub role: Role,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct UserStats {
    pub total_users: i64,
    pub active_users: i64,
    pub by_role: BTreeMap<String, i64>,
    pub logins_today: i64,
    pub logins_this_week: i64,
    pub logins_this_month: i64,
}

const USER_COLUMNS: &str =
    "user_id, username, name, email, password_hash, CAST(role AS CHAR) AS role, is_active, created_at, last_login";

pub struct UserRepo<'a> {
    pool: &'a MySqlPool,
}

impl<'a> UserRepo<'a> {
    pub fn new(pool: &'a MySqlPool) -> Self {
        Self { pool }
    }

    /// Insert an account. Duplicate username or email is a conflict.
    pub async fn create(&self, user: NewUser<'_>) -> Result<i64, DbError> {
        let taken = sqlx::query("SELECT user_id FROM User WHERE username = ? OR email = ?")
            .bind(user.username)
            .bind(user.email)
            .fetch_optional(self.pool)
            .await?;
        if taken.is_some() {
            return Err(DbError::conflict(DUPLICATE_ACCOUNT));
        }

        let result = sqlx::query(
            "INSERT INTO User (username, name, email, password_hash, role) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(user.username)
        .bind(user.name)
        .bind(user.email)
        .bind(user.password_hash)
        .bind(user.role.as_str())
        .execute(self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                DbError::conflict(DUPLICATE_ACCOUNT)
            } else {
                DbError::from(e)
            }
        })?;

        Ok(result.last_insert_id() as i64)
    }

    /// Active account whose username or email equals `login`.
    pub async fn find_active_by_login(&self, login: &str) -> Result<Option<UserRecord>, DbError> {
        let sql = format!(
            "SELECT {USER_COLUMNS} FROM User WHERE (username = ? OR email = ?) AND is_active = TRUE"
        );
        let user = sqlx::query_as::<_, UserRecord>(&sql)
            .bind(login)
            .bind(login)
            .fetch_optional(self.pool)
            .await?;
        Ok(user)
    }

    pub async fn get(&self, user_id: i64) -> Result<UserRecord, DbError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM User WHERE user_id = ?");
        sqlx::query_as::<_, UserRecord>(&sql)
            .bind(user_id)
            .fetch_optional(self.pool)
            .await?
            .ok_or_else(|| DbError::not_found("user", user_id))
    }

    /// Stamp `last_login` and append a login history row.
    pub async fn record_login(&self, user_id: i64, success: bool) -> Result<(), DbError> {
        let mut tx = self.pool.begin().await?;
        if success {
            sqlx::query("UPDATE User SET last_login = NOW() WHERE user_id = ?")
                .bind(user_id)
                .execute(&mut *tx)
                .await?;
        }
        sqlx::query("INSERT INTO user_login_history (user_id, success) VALUES (?, ?)")
            .bind(user_id)
            .bind(success)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        debug!(user_id, success, "login recorded");
        Ok(())
    }

    pub async fn login_history(
        &self,
        user_id: i64,
        pagination: Pagination,
    ) -> Result<Page<JsonRow>, DbError> {
        paginate(
            self.pool,
            "SELECT login_id, login_at, success FROM user_login_history WHERE user_id = ? ORDER BY login_at DESC, login_id DESC",
            &[SqlValue::Int(user_id)],
            pagination,
        )
        .await
    }

    /// Accounts without password hashes, optionally restricted to one role.
    pub async fn list(&self, role: Option<Role>, pagination: Pagination) -> Result<Page<JsonRow>, DbError> {
        let base = "SELECT user_id, username, name, email, CAST(role AS CHAR) AS role, is_active, created_at, last_login FROM User";
        match role {
            Some(role) => {
                let sql = format!("{base} WHERE role = ? ORDER BY user_id");
                paginate(self.pool, &sql, &[SqlValue::from(role.as_str())], pagination).await
            }
            None => {
                let sql = format!("{base} ORDER BY user_id");
                paginate(self.pool, &sql, &[], pagination).await
            }
        }
    }

    pub async fn stats(&self) -> Result<UserStats, DbError> {
        let row = sqlx::query(
            r#"
            SELECT
                (SELECT COUNT(*) FROM User) AS total_users,
                (SELECT COUNT(*) FROM User WHERE is_active = TRUE) AS active_users,
                (SELECT COUNT(*) FROM user_login_history
                    WHERE success = TRUE AND login_at >= CURDATE()) AS logins_today,
                (SELECT COUNT(*) FROM user_login_history
                    WHERE success = TRUE AND YEARWEEK(login_at, 1) = YEARWEEK(CURDATE(), 1)) AS logins_this_week,
                (SELECT COUNT(*) FROM user_login_history
                    WHERE success = TRUE AND login_at >= DATE_FORMAT(CURDATE(), '%Y-%m-01')) AS logins_this_month
            "#,
        )
        .fetch_one(self.pool)
        .await?;

        let mut stats = UserStats {
            total_users: row.try_get("total_users")?,
            active_users: row.try_get("active_users")?,
            logins_today: row.try_get("logins_today")?,
            logins_this_week: row.try_get("logins_this_week")?,
            logins_this_month: row.try_get("logins_this_month")?,
            ..Default::default()
        };

        let rows = sqlx::query("SELECT CAST(role AS CHAR) AS role, COUNT(*) AS count FROM User GROUP BY role")
            .fetch_all(self.pool)
            .await?;
        for row in rows {
            stats
                .by_role
                .insert(row.try_get::<String, _>("role")?, row.try_get::<i64, _>("count")?);
        }
        Ok(stats)
    }

    pub async fn set_active(&self, user_id: i64, active: bool) -> Result<(), DbError> {
        self.get(user_id).await?;
        sqlx::query("UPDATE User SET is_active = ? WHERE user_id = ?")
            .bind(active)
            .bind(user_id)
            .execute(self.pool)
            .await?;
        Ok(())
    }

    pub async fn update_password(&self, user_id: i64, password_hash: &str) -> Result<(), DbError> {
        let result = sqlx::query("UPDATE User SET password_hash = ? WHERE user_id = ?")
            .bind(password_hash)
            .bind(user_id)
            .execute(self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(DbError::not_found("user", user_id));
        }
        Ok(())
    }

    pub async fn admin_exists(&self) -> Result<bool, DbError> {
        let row = sqlx::query("SELECT COUNT(*) AS admins FROM User WHERE role = 'admin'")
            .fetch_one(self.pool)
            .await?;
        Ok(row.try_get::<i64, _>("admins")? > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_serialization_hides_hash() {
        let user = UserRecord {
            user_id: 1,
            username: "admin".into(),
            name: "System Administrator".into(),
            email: "admin@example.com".into(),
            password_hash: "$2b$12$secret".into(),
            role: "admin".into(),
            is_active: true,
            created_at: NaiveDateTime::default(),
            last_login: None,
        };
        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("password_hash").is_none());
        assert_eq!(json["username"], "admin");
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn duplicate_username_conflicts() {
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL required");
        let pool = crate::db::create_pool(&url).await.unwrap();
        crate::db::schema::create_tables(&pool).await;

        let repo = UserRepo::new(&pool);
        let name = format!("dup{}", uuid::Uuid::new_v4().simple());
        let email = format!("{name}@example.com");
        let user = NewUser {
            username: &name,
            name: "Dup",
            email: &email,
            password_hash: "x",
            role: Role::Guest,
        };
        repo.create(user.clone()).await.unwrap();
        let err = repo.create(user).await.unwrap_err();
        assert!(matches!(err, DbError::Conflict { .. }));
    }
}
