//! Modelos de dados compartilhados entre aplicações
//!
//! Este módulo define as estruturas de dados principais usadas pelo ecossistema
//! da clínica. Enumerações persistidas como texto usam [`text_enum!`] para
//! manter um único mapeamento entre variante, JSON e coluna.

use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

/// Declara uma enumeração persistida como texto.
///
/// Gera `as_str`, `Display`, `FromStr` e a (de)serialização serde com o mesmo
/// texto usado no banco.
macro_rules! text_enum {
    (
        $(#[$meta:meta])*
        $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident => $text:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
        pub enum $name {
            $( $(#[$vmeta])* #[serde(rename = $text)] $variant ),+
        }

        impl $name {
            /// Texto persistido para a variante
            pub fn as_str(&self) -> &'static str {
                match self {
                    $( $name::$variant => $text ),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = $crate::models::UnknownVariant;

            fn from_str(value: &str) -> Result<Self, Self::Err> {
                match value {
                    $( $text => Ok($name::$variant), )+
                    other => Err($crate::models::UnknownVariant {
                        kind: stringify!($name),
                        value: other.to_string(),
                    }),
                }
            }
        }
    };
}

pub mod account;
pub mod appointment;
pub mod book;
pub mod ledger;
pub mod profile;

pub use account::{AccountStatus, Credential, ProfileRef, Role};
pub use appointment::{
    Appointment, AppointmentResponse, AppointmentStatus, PaymentMethod, PaymentStatus,
};
pub use book::{Book, Genre};
pub use ledger::{Transaction, TransactionStatus, Wallet, DEFAULT_CURRENCY};
pub use profile::{Admin, Doctor, Gender, Patient, ProfileStatus, RoleProfile};

/// Valor de texto que não corresponde a nenhuma variante conhecida
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Valor inválido para {kind}: {value}")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

fn column_decode(
    column: &str,
    source: impl std::error::Error + Send + Sync + 'static,
) -> sqlx::Error {
    sqlx::Error::ColumnDecode {
        index: column.to_string(),
        source: Box::new(source),
    }
}

/// Lê uma coluna de texto e a converte para uma enumeração
pub(crate) fn decode_text<T>(row: &SqliteRow, column: &str) -> sqlx::Result<T>
where
    T: FromStr<Err = UnknownVariant>,
{
    let raw: String = row.try_get(column)?;
    raw.parse().map_err(|e| column_decode(column, e))
}

pub(crate) fn decode_optional_text<T>(row: &SqliteRow, column: &str) -> sqlx::Result<Option<T>>
where
    T: FromStr<Err = UnknownVariant>,
{
    let raw: Option<String> = row.try_get(column)?;
    raw.map(|value| value.parse().map_err(|e| column_decode(column, e)))
        .transpose()
}

/// Identificadores são gravados como UUID hifenizado em colunas TEXT
pub(crate) fn decode_uuid(row: &SqliteRow, column: &str) -> sqlx::Result<Uuid> {
    let raw: String = row.try_get(column)?;
    Uuid::parse_str(&raw).map_err(|e| column_decode(column, e))
}

pub(crate) fn decode_optional_uuid(row: &SqliteRow, column: &str) -> sqlx::Result<Option<Uuid>> {
    let raw: Option<String> = row.try_get(column)?;
    raw.map(|value| Uuid::parse_str(&value).map_err(|e| column_decode(column, e)))
        .transpose()
}
