//! Persistência das credenciais

use chrono::{DateTime, Utc};
use sqlx::SqliteConnection;
use uuid::Uuid;

use super::contains_pattern;
use crate::error::DbResult;
use crate::models::{AccountStatus, Credential, Role};

/// Filtros da listagem de credenciais
#[derive(Debug, Clone, Default)]
pub struct CredentialFilter {
    /// Trecho procurado no nome de usuário ou e-mail (sem diferenciar caixa)
    pub search: Option<String>,
    /// Papel exato
    pub role: Option<Role>,
}

impl CredentialFilter {
    fn pattern(&self) -> Option<String> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|term| !term.is_empty())
            .map(contains_pattern)
    }

    fn role(&self) -> Option<&'static str> {
        self.role.map(|role| role.as_str())
    }
}

pub async fn insert(conn: &mut SqliteConnection, credential: &Credential) -> DbResult<()> {
    sqlx::query(
        "INSERT INTO credentials
            (id, created_at, updated_at, handle, email, phone, password_hash, role, status,
             profile_id)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(credential.id.to_string())
    .bind(credential.created_at)
    .bind(credential.updated_at)
    .bind(&credential.handle)
    .bind(&credential.email)
    .bind(&credential.phone)
    .bind(&credential.password_hash)
    .bind(credential.role().as_str())
    .bind(credential.status.as_str())
    .bind(credential.profile.id().to_string())
    .execute(&mut *conn)
    .await?;
    Ok(())
}

pub async fn find_by_id(conn: &mut SqliteConnection, id: Uuid) -> DbResult<Option<Credential>> {
    let credential = sqlx::query_as::<_, Credential>("SELECT * FROM credentials WHERE id = ?")
        .bind(id.to_string())
        .fetch_optional(&mut *conn)
        .await?;
    Ok(credential)
}

/// Localiza a credencial pelo nome de usuário, telefone ou e-mail, nessa ordem
pub async fn find_by_identifier(
    conn: &mut SqliteConnection,
    identifier: &str,
) -> DbResult<Option<Credential>> {
    let credential = sqlx::query_as::<_, Credential>(
        "SELECT * FROM credentials
         WHERE handle = ?1 OR phone = ?1 OR email = ?1
         ORDER BY CASE WHEN handle = ?1 THEN 0 WHEN phone = ?1 THEN 1 ELSE 2 END
         LIMIT 1",
    )
    .bind(identifier)
    .fetch_optional(&mut *conn)
    .await?;
    Ok(credential)
}

pub async fn handle_exists(conn: &mut SqliteConnection, handle: &str) -> DbResult<bool> {
    let exists: i64 =
        sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM credentials WHERE handle = ?)")
            .bind(handle)
            .fetch_one(&mut *conn)
            .await?;
    Ok(exists != 0)
}

/// Regrava os campos mutáveis da credencial
pub async fn update(conn: &mut SqliteConnection, credential: &Credential) -> DbResult<bool> {
    let result = sqlx::query(
        "UPDATE credentials
         SET email = ?, phone = ?, password_hash = ?, status = ?, updated_at = ?
         WHERE id = ?",
    )
    .bind(&credential.email)
    .bind(&credential.phone)
    .bind(&credential.password_hash)
    .bind(credential.status.as_str())
    .bind(credential.updated_at)
    .bind(credential.id.to_string())
    .execute(&mut *conn)
    .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn set_status(
    conn: &mut SqliteConnection,
    id: Uuid,
    status: AccountStatus,
    at: DateTime<Utc>,
) -> DbResult<bool> {
    let result = sqlx::query("UPDATE credentials SET status = ?, updated_at = ? WHERE id = ?")
        .bind(status.as_str())
        .bind(at)
        .bind(id.to_string())
        .execute(&mut *conn)
        .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn list(
    conn: &mut SqliteConnection,
    filter: &CredentialFilter,
    offset: i64,
    limit: i64,
) -> DbResult<Vec<Credential>> {
    let credentials = sqlx::query_as::<_, Credential>(
        r"SELECT * FROM credentials
          WHERE (?1 IS NULL OR handle LIKE ?1 ESCAPE '\' OR email LIKE ?1 ESCAPE '\')
            AND (?2 IS NULL OR role = ?2)
          ORDER BY created_at, id
          LIMIT ?3 OFFSET ?4",
    )
    .bind(filter.pattern())
    .bind(filter.role())
    .bind(limit)
    .bind(offset)
    .fetch_all(&mut *conn)
    .await?;
    Ok(credentials)
}

pub async fn count(conn: &mut SqliteConnection, filter: &CredentialFilter) -> DbResult<i64> {
    let total: i64 = sqlx::query_scalar(
        r"SELECT COUNT(*) FROM credentials
          WHERE (?1 IS NULL OR handle LIKE ?1 ESCAPE '\' OR email LIKE ?1 ESCAPE '\')
            AND (?2 IS NULL OR role = ?2)",
    )
    .bind(filter.pattern())
    .bind(filter.role())
    .fetch_one(&mut *conn)
    .await?;
    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DbError;
    use crate::models::ProfileRef;
    use crate::testing::temp_database;
    use anyhow::Result;

    fn credential(handle: &str, phone: &str, email: Option<&str>, role: Role) -> Credential {
        let now = Utc::now();
        Credential {
            id: Uuid::new_v4(),
            handle: handle.to_string(),
            email: email.map(str::to_string),
            phone: phone.to_string(),
            password_hash: "hash".to_string(),
            status: AccountStatus::Active,
            profile: ProfileRef::new(role, Uuid::new_v4()),
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_identifier_lookup_matches_handle_phone_or_email() -> Result<()> {
        let (_dir, pool) = temp_database().await?;
        let mut conn = pool.acquire().await?;

        let stored = credential("johnsmith", "+100", Some("john@example.com"), Role::Patient);
        insert(&mut conn, &stored).await?;

        for identifier in ["johnsmith", "+100", "john@example.com"] {
            let found = find_by_identifier(&mut conn, identifier).await?;
            assert_eq!(found.map(|c| c.id), Some(stored.id));
        }
        assert!(find_by_identifier(&mut conn, "someone").await?.is_none());

        Ok(())
    }

    #[tokio::test]
    async fn test_duplicate_handle_is_a_constraint_violation() -> Result<()> {
        let (_dir, pool) = temp_database().await?;
        let mut conn = pool.acquire().await?;

        insert(&mut conn, &credential("ana", "+1", None, Role::Admin)).await?;
        let error = insert(&mut conn, &credential("ana", "+2", None, Role::Admin))
            .await
            .unwrap_err();

        assert!(matches!(error, DbError::ConstraintViolation(_)));
        assert_eq!(error.violated_column(), Some("credentials.handle"));
        Ok(())
    }

    #[tokio::test]
    async fn test_list_filters_by_role_and_search() -> Result<()> {
        let (_dir, pool) = temp_database().await?;
        let mut conn = pool.acquire().await?;

        insert(&mut conn, &credential("drhouse", "+1", Some("house@pp.org"), Role::Doctor)).await?;
        insert(&mut conn, &credential("drwilson", "+2", None, Role::Doctor)).await?;
        let patient = credential("patient_x", "+3", Some("x@HOUSE.org"), Role::Patient);
        insert(&mut conn, &patient).await?;

        let doctors = CredentialFilter {
            role: Some(Role::Doctor),
            ..Default::default()
        };
        assert_eq!(count(&mut conn, &doctors).await?, 2);
        assert_eq!(list(&mut conn, &doctors, 0, 1).await?.len(), 1);

        let house = CredentialFilter {
            search: Some("house".to_string()),
            role: None,
        };
        assert_eq!(count(&mut conn, &house).await?, 2);

        // "_" é literal, não curinga
        let underscore = CredentialFilter {
            search: Some("t_x".to_string()),
            role: None,
        };
        let found = list(&mut conn, &underscore, 0, 10).await?;
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].handle, "patient_x");

        Ok(())
    }
}
