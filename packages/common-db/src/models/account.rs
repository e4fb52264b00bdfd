//! Credenciais de acesso e referência ao perfil do papel

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row};
use uuid::Uuid;

use super::{decode_text, decode_uuid};

text_enum! {
    /// Papel do usuário no sistema
    Role {
        Doctor => "Doctor",
        Patient => "Patient",
        Admin => "Admin",
    }
}

text_enum! {
    /// Situação da conta
    AccountStatus {
        Active => "Active",
        Inactive => "Inactive",
        Suspended => "Suspended",
        Deleted => "Deleted",
    }
}

/// Referência única ao perfil do papel.
///
/// A variante determina o papel, portanto não existe credencial de médico
/// apontando para um paciente.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "role", content = "profileId")]
pub enum ProfileRef {
    Doctor(Uuid),
    Patient(Uuid),
    Admin(Uuid),
}

impl ProfileRef {
    pub fn new(role: Role, profile_id: Uuid) -> Self {
        match role {
            Role::Doctor => ProfileRef::Doctor(profile_id),
            Role::Patient => ProfileRef::Patient(profile_id),
            Role::Admin => ProfileRef::Admin(profile_id),
        }
    }

    pub fn role(&self) -> Role {
        match self {
            ProfileRef::Doctor(_) => Role::Doctor,
            ProfileRef::Patient(_) => Role::Patient,
            ProfileRef::Admin(_) => Role::Admin,
        }
    }

    pub fn id(&self) -> Uuid {
        match self {
            ProfileRef::Doctor(id) | ProfileRef::Patient(id) | ProfileRef::Admin(id) => *id,
        }
    }
}

/// Credencial de acesso (usuário)
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Credential {
    /// Identificador único
    pub id: Uuid,
    /// Nome de usuário derivado do nome
    pub handle: String,
    /// E-mail (opcional, único)
    pub email: Option<String>,
    /// Telefone (único)
    pub phone: String,
    /// Hash Argon2 da senha; nunca serializado
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// Situação da conta
    pub status: AccountStatus,
    /// Perfil vinculado
    #[serde(flatten)]
    pub profile: ProfileRef,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Credential {
    pub fn role(&self) -> Role {
        self.profile.role()
    }

    pub fn is_active(&self) -> bool {
        self.status == AccountStatus::Active
    }
}

impl FromRow<'_, SqliteRow> for Credential {
    fn from_row(row: &SqliteRow) -> sqlx::Result<Self> {
        let role: Role = decode_text(row, "role")?;
        Ok(Self {
            id: decode_uuid(row, "id")?,
            handle: row.try_get("handle")?,
            email: row.try_get("email")?,
            phone: row.try_get("phone")?,
            password_hash: row.try_get("password_hash")?,
            status: decode_text(row, "status")?,
            profile: ProfileRef::new(role, decode_uuid(row, "profile_id")?),
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credential_serialization_hides_hash_and_exposes_role() {
        let profile_id = Uuid::new_v4();
        let credential = Credential {
            id: Uuid::new_v4(),
            handle: "johnsmith".to_string(),
            email: None,
            phone: "+5511999990000".to_string(),
            password_hash: "$argon2id$v=19$segredo".to_string(),
            status: AccountStatus::Active,
            profile: ProfileRef::Doctor(profile_id),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let json = serde_json::to_value(&credential).unwrap();
        assert_eq!(json["role"], "Doctor");
        assert_eq!(json["profileId"], profile_id.to_string());
        assert_eq!(json["status"], "Active");
        assert!(json.get("passwordHash").is_none());
        assert!(json.get("password_hash").is_none());
    }

    #[test]
    fn test_profile_ref_role_matches_variant() {
        let id = Uuid::new_v4();
        for role in [Role::Doctor, Role::Patient, Role::Admin] {
            let reference = ProfileRef::new(role, id);
            assert_eq!(reference.role(), role);
            assert_eq!(reference.id(), id);
        }
    }
}
