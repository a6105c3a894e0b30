use sqlx::PgExecutor;
use uuid::Uuid;

use crate::models::User;

pub async fn insert<'e, E>(executor: E, user: &User) -> Result<(), sqlx::Error>
where
    E: PgExecutor<'e>,
{
    sqlx::query(
        "INSERT INTO users (id, username, email, password_hash, pc_name, date_joined)
         VALUES ($1, $2, $3, $4, $5, $6)",
    )
    .bind(user.id)
    .bind(&user.username)
    .bind(&user.email)
    .bind(&user.password_hash)
    .bind(&user.pc_name)
    .bind(user.date_joined)
    .execute(executor)
    .await?;
    Ok(())
}

/// Removes the user owning `account_id`; the account and its ledger cascade.
pub async fn delete_by_account<'e, E>(executor: E, account_id: Uuid) -> Result<u64, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    let result = sqlx::query(
        "DELETE FROM users
         WHERE id = (SELECT user_id FROM accounts WHERE id = $1)",
    )
    .bind(account_id)
    .execute(executor)
    .await?;
    Ok(result.rows_affected())
}
