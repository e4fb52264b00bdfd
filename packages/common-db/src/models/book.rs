//! Catálogo de livros

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row};
use uuid::Uuid;

use super::{decode_optional_text, decode_uuid};

text_enum! {
    /// Gêneros literários aceitos
    Genre {
        Fiction => "Fiction",
        NonFiction => "Non-Fiction",
        ScienceFiction => "Science Fiction",
        Fantasy => "Fantasy",
        Mystery => "Mystery",
        Biography => "Biography",
        SelfHelp => "Self-Help",
        History => "History",
        Romance => "Romance",
        Horror => "Horror",
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    pub id: Uuid,
    pub title: String,
    pub author: String,
    pub genre: Option<Genre>,
    /// Gênero livre quando nenhum da lista se aplica
    pub custom_genre: Option<String>,
    pub published_year: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl FromRow<'_, SqliteRow> for Book {
    fn from_row(row: &SqliteRow) -> sqlx::Result<Self> {
        Ok(Self {
            id: decode_uuid(row, "id")?,
            title: row.try_get("title")?,
            author: row.try_get("author")?,
            genre: decode_optional_text(row, "genre")?,
            custom_genre: row.try_get("custom_genre")?,
            published_year: row.try_get("published_year")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}
