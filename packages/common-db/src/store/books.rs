//! Persistência do catálogo de livros

use sqlx::SqliteConnection;
use uuid::Uuid;

use crate::error::DbResult;
use crate::models::Book;

pub async fn insert(conn: &mut SqliteConnection, book: &Book) -> DbResult<()> {
    sqlx::query(
        "INSERT INTO books
            (id, created_at, updated_at, title, author, genre, custom_genre, published_year)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(book.id.to_string())
    .bind(book.created_at)
    .bind(book.updated_at)
    .bind(&book.title)
    .bind(&book.author)
    .bind(book.genre.map(|genre| genre.as_str()))
    .bind(&book.custom_genre)
    .bind(book.published_year)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

pub async fn find(conn: &mut SqliteConnection, id: Uuid) -> DbResult<Option<Book>> {
    let book = sqlx::query_as::<_, Book>("SELECT * FROM books WHERE id = ?")
        .bind(id.to_string())
        .fetch_optional(&mut *conn)
        .await?;
    Ok(book)
}

pub async fn list(conn: &mut SqliteConnection) -> DbResult<Vec<Book>> {
    let books = sqlx::query_as::<_, Book>("SELECT * FROM books ORDER BY title, created_at")
        .fetch_all(&mut *conn)
        .await?;
    Ok(books)
}

pub async fn update(conn: &mut SqliteConnection, book: &Book) -> DbResult<bool> {
    let result = sqlx::query(
        "UPDATE books
         SET title = ?, author = ?, genre = ?, custom_genre = ?, published_year = ?, updated_at = ?
         WHERE id = ?",
    )
    .bind(&book.title)
    .bind(&book.author)
    .bind(book.genre.map(|genre| genre.as_str()))
    .bind(&book.custom_genre)
    .bind(book.published_year)
    .bind(book.updated_at)
    .bind(book.id.to_string())
    .execute(&mut *conn)
    .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn delete(conn: &mut SqliteConnection, id: Uuid) -> DbResult<bool> {
    let result = sqlx::query("DELETE FROM books WHERE id = ?")
        .bind(id.to_string())
        .execute(&mut *conn)
        .await?;
    Ok(result.rows_affected() > 0)
}
