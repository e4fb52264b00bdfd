//! Perfis por papel (médico, paciente, administrador)

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row};
use uuid::Uuid;

use super::{decode_optional_uuid, decode_text, decode_uuid, Role};

text_enum! {
    /// Gênero declarado
    Gender {
        Male => "Male",
        Female => "Female",
        Other => "Other",
    }
}

text_enum! {
    /// Situação do perfil (apenas médicos e pacientes)
    ProfileStatus {
        Active => "Active",
        Suspended => "Suspended",
    }
}

/// Perfil de médico
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Doctor {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub address: Option<String>,
    pub date_of_birth: NaiveDate,
    pub gender: Gender,
    pub specialization: String,
    /// Número do registro profissional (único)
    pub license_number: String,
    /// Anos de experiência
    pub experience: i64,
    /// Descrição livre da disponibilidade
    pub availability: String,
    pub verified: bool,
    pub status: ProfileStatus,
    /// Carteira criada no primeiro crédito
    pub wallet_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl FromRow<'_, SqliteRow> for Doctor {
    fn from_row(row: &SqliteRow) -> sqlx::Result<Self> {
        Ok(Self {
            id: decode_uuid(row, "id")?,
            first_name: row.try_get("first_name")?,
            last_name: row.try_get("last_name")?,
            address: row.try_get("address")?,
            date_of_birth: row.try_get("date_of_birth")?,
            gender: decode_text(row, "gender")?,
            specialization: row.try_get("specialization")?,
            license_number: row.try_get("license_number")?,
            experience: row.try_get("experience")?,
            availability: row.try_get("availability")?,
            verified: row.try_get("verified")?,
            status: decode_text(row, "status")?,
            wallet_id: decode_optional_uuid(row, "wallet_id")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

/// Perfil de paciente.
///
/// O histórico médico é persistido criptografado; a leitura passa por
/// `store::profiles`, que conhece a chave de dados.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Patient {
    pub id: Uuid,
    pub name: String,
    pub date_of_birth: NaiveDate,
    pub gender: Gender,
    pub address: String,
    /// Entradas em ordem de inclusão
    pub medical_history: Vec<String>,
    pub status: ProfileStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Perfil de administrador
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Admin {
    pub id: Uuid,
    pub name: String,
    pub date_of_birth: NaiveDate,
    pub gender: Gender,
    pub address: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl FromRow<'_, SqliteRow> for Admin {
    fn from_row(row: &SqliteRow) -> sqlx::Result<Self> {
        Ok(Self {
            id: decode_uuid(row, "id")?,
            name: row.try_get("name")?,
            date_of_birth: row.try_get("date_of_birth")?,
            gender: decode_text(row, "gender")?,
            address: row.try_get("address")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

/// Perfil vinculado a uma credencial, um por papel
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum RoleProfile {
    Doctor(Doctor),
    Patient(Patient),
    Admin(Admin),
}

impl RoleProfile {
    pub fn role(&self) -> Role {
        match self {
            RoleProfile::Doctor(_) => Role::Doctor,
            RoleProfile::Patient(_) => Role::Patient,
            RoleProfile::Admin(_) => Role::Admin,
        }
    }

    pub fn id(&self) -> Uuid {
        match self {
            RoleProfile::Doctor(doctor) => doctor.id,
            RoleProfile::Patient(patient) => patient.id,
            RoleProfile::Admin(admin) => admin.id,
        }
    }

    /// Situação do perfil, quando o papel a possui
    pub fn status(&self) -> Option<ProfileStatus> {
        match self {
            RoleProfile::Doctor(doctor) => Some(doctor.status),
            RoleProfile::Patient(patient) => Some(patient.status),
            RoleProfile::Admin(_) => None,
        }
    }
}
