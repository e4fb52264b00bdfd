//! Transações de escrita com lock reservado desde o início
//!
//! `pool.begin()` abre transações `DEFERRED`: a primeira leitura fixa um
//! snapshot e a escrita seguinte pode falhar com `SQLITE_BUSY` sem passar pelo
//! `busy_timeout`. `BEGIN IMMEDIATE` obtém o lock de escrita na abertura, de
//! modo que escritores concorrentes esperam em fila.

use sqlx::pool::PoolConnection;
use sqlx::sqlite::{Sqlite, SqliteConnection, SqlitePool};
use std::ops::{Deref, DerefMut};
use tracing::debug;

use crate::error::DbError;

const FINISHED: &str = "transação já encerrada";

/// Conexão do pool com uma transação `IMMEDIATE` aberta.
///
/// Se for descartada sem `commit`/`rollback`, a conexão é desligada do pool e
/// fechada, o que desfaz a transação.
pub struct WriteTransaction {
    conn: Option<PoolConnection<Sqlite>>,
}

impl WriteTransaction {
    pub async fn begin(pool: &SqlitePool) -> Result<Self, DbError> {
        let mut conn = pool.acquire().await?;
        sqlx::query("BEGIN IMMEDIATE").execute(&mut *conn).await?;
        Ok(Self { conn: Some(conn) })
    }

    pub async fn commit(mut self) -> Result<(), DbError> {
        self.finish("COMMIT").await
    }

    pub async fn rollback(mut self) -> Result<(), DbError> {
        self.finish("ROLLBACK").await
    }

    async fn finish(&mut self, statement: &'static str) -> Result<(), DbError> {
        let conn = self.conn.as_mut().expect(FINISHED);
        sqlx::query(statement).execute(&mut **conn).await?;
        // Volta ao pool só depois de encerrada
        self.conn.take();
        Ok(())
    }
}

impl Deref for WriteTransaction {
    type Target = SqliteConnection;

    fn deref(&self) -> &Self::Target {
        self.conn.as_deref().expect(FINISHED)
    }
}

impl DerefMut for WriteTransaction {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.conn.as_deref_mut().expect(FINISHED)
    }
}

impl Drop for WriteTransaction {
    fn drop(&mut self) {
        if let Some(conn) = self.conn.take() {
            debug!("Transação descartada sem commit; fechando a conexão");
            drop(conn.detach());
        }
    }
}
