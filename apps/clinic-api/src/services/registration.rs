//! Cadastro de credencial e perfil do papel
//!
//! Perfil e credencial são gravados na mesma transação. As verificações de
//! unicidade feitas antes da escrita servem apenas para dar mensagens
//! melhores; a restrição do banco continua sendo a palavra final.

use chrono::{NaiveDate, Utc};
use common_db::models::{
    AccountStatus, Admin, Credential, Doctor, Gender, Patient, ProfileRef, ProfileStatus, Role,
    RoleProfile,
};
use common_db::store::{credentials, profiles};
use common_db::WriteTransaction;
use serde::{Deserialize, Serialize};
use sqlx::SqliteConnection;
use tracing::{info, warn};
use uuid::Uuid;
use validator::Validate;

use crate::auth::password::hash_secret;
use crate::error::{ApiError, ApiResult};
use crate::AppState;

/// Corpo de `POST /auth/register`
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub handle: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    pub phone: Option<String>,
    #[serde(alias = "password")]
    pub secret: Option<String>,
    pub role: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub gender: Option<Gender>,
    pub address: Option<String>,
    pub specialization: Option<String>,
    pub license_number: Option<String>,
    #[validate(range(min = 0))]
    pub experience: Option<i64>,
    pub availability: Option<String>,
}

/// Resultado do cadastro
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Registration {
    pub credential: Credential,
    pub role_profile: RoleProfile,
    pub token: String,
}

/// Campos comuns a todos os papéis, já conferidos
struct Identity {
    phone: String,
    secret: String,
    role: Role,
    first_name: String,
    last_name: String,
    date_of_birth: NaiveDate,
    gender: Gender,
}

/// Texto aparado, tratando vazio como ausente
fn present(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .map(str::to_string)
}

fn missing_fields(fields: &[&str]) -> ApiError {
    ApiError::validation(format!("Campos obrigatórios ausentes: {}", fields.join(", ")))
}

impl RegisterRequest {
    fn identity(&self) -> ApiResult<Identity> {
        let phone = present(&self.phone);
        let secret = self.secret.clone().filter(|secret| !secret.is_empty());
        let role = present(&self.role);
        let first_name = present(&self.first_name);
        let last_name = present(&self.last_name);

        let mut missing = Vec::new();
        if phone.is_none() {
            missing.push("phone");
        }
        if secret.is_none() {
            missing.push("secret");
        }
        if role.is_none() {
            missing.push("role");
        }
        if first_name.is_none() {
            missing.push("firstName");
        }
        if last_name.is_none() {
            missing.push("lastName");
        }
        if self.date_of_birth.is_none() {
            missing.push("dateOfBirth");
        }
        if self.gender.is_none() {
            missing.push("gender");
        }

        match (phone, secret, role, first_name, last_name, self.date_of_birth, self.gender) {
            (
                Some(phone),
                Some(secret),
                Some(role),
                Some(first_name),
                Some(last_name),
                Some(date_of_birth),
                Some(gender),
            ) => {
                let role = role
                    .parse::<Role>()
                    .map_err(|_| ApiError::validation(format!("Papel desconhecido: {}", role)))?;
                Ok(Identity {
                    phone,
                    secret,
                    role,
                    first_name,
                    last_name,
                    date_of_birth,
                    gender,
                })
            }
            _ => Err(missing_fields(&missing)),
        }
    }

    /// Monta o perfil do papel, exigindo os campos específicos
    fn role_profile(&self, identity: &Identity) -> ApiResult<RoleProfile> {
        let now = Utc::now();
        let id = Uuid::new_v4();
        let full_name = format!("{} {}", identity.first_name, identity.last_name);

        let profile = match identity.role {
            Role::Doctor => {
                let specialization = present(&self.specialization);
                let license_number = present(&self.license_number);
                let availability = present(&self.availability);

                match (specialization, license_number, self.experience, availability) {
                    (
                        Some(specialization),
                        Some(license_number),
                        Some(experience),
                        Some(availability),
                    ) => {
                        RoleProfile::Doctor(Doctor {
                            id,
                            first_name: identity.first_name.clone(),
                            last_name: identity.last_name.clone(),
                            address: present(&self.address),
                            date_of_birth: identity.date_of_birth,
                            gender: identity.gender,
                            specialization,
                            license_number,
                            experience,
                            availability,
                            verified: false,
                            status: ProfileStatus::Active,
                            wallet_id: None,
                            created_at: now,
                            updated_at: now,
                        })
                    }
                    (specialization, license_number, experience, availability) => {
                        let mut missing = Vec::new();
                        if specialization.is_none() {
                            missing.push("specialization");
                        }
                        if license_number.is_none() {
                            missing.push("licenseNumber");
                        }
                        if experience.is_none() {
                            missing.push("experience");
                        }
                        if availability.is_none() {
                            missing.push("availability");
                        }
                        return Err(missing_fields(&missing));
                    }
                }
            }
            Role::Patient => {
                let address = present(&self.address).ok_or_else(|| missing_fields(&["address"]))?;
                RoleProfile::Patient(Patient {
                    id,
                    name: full_name,
                    date_of_birth: identity.date_of_birth,
                    gender: identity.gender,
                    address,
                    medical_history: Vec::new(),
                    status: ProfileStatus::Active,
                    created_at: now,
                    updated_at: now,
                })
            }
            Role::Admin => RoleProfile::Admin(Admin {
                id,
                name: full_name,
                date_of_birth: identity.date_of_birth,
                gender: identity.gender,
                address: present(&self.address),
                created_at: now,
                updated_at: now,
            }),
        };

        Ok(profile)
    }

    /// Base do nome de usuário antes da resolução de colisões
    fn base_handle(&self, identity: &Identity) -> String {
        match present(&self.handle) {
            Some(handle) => normalize_handle(&handle),
            None => normalize_handle(&format!("{}{}", identity.first_name, identity.last_name)),
        }
    }
}

/// Minúsculas e sem espaços
pub fn normalize_handle(raw: &str) -> String {
    raw.chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

/// Primeiro nome de usuário livre: `base`, `base1`, `base2`, ...
pub async fn available_handle(conn: &mut SqliteConnection, base: &str) -> ApiResult<String> {
    if !credentials::handle_exists(conn, base).await? {
        return Ok(base.to_string());
    }

    let mut suffix: u64 = 1;
    loop {
        let candidate = format!("{}{}", base, suffix);
        if !credentials::handle_exists(conn, &candidate).await? {
            return Ok(candidate);
        }
        suffix += 1;
    }
}

/// Cadastra credencial e perfil e emite o token de sessão
pub async fn register(state: &AppState, request: RegisterRequest) -> ApiResult<Registration> {
    let identity = request.identity()?;
    let role_profile = request.role_profile(&identity)?;
    let email = present(&request.email).map(|email| email.to_lowercase());
    let base_handle = request.base_handle(&identity);

    // Fora da transação para não segurar o lock de escrita durante o hash
    let password_hash = hash_secret(identity.secret.clone()).await?;

    let mut tx = WriteTransaction::begin(&state.pool).await?;

    if let RoleProfile::Doctor(doctor) = &role_profile {
        if profiles::license_number_exists(&mut tx, &doctor.license_number).await? {
            warn!("Cadastro recusado: licença {} já registrada", doctor.license_number);
            tx.rollback().await?;
            return Err(ApiError::Conflict(
                "Já existe um médico com este número de licença".to_string(),
            ));
        }
    }

    let handle = available_handle(&mut tx, &base_handle).await?;

    let now = Utc::now();
    let credential = Credential {
        id: Uuid::new_v4(),
        handle,
        email,
        phone: identity.phone,
        password_hash,
        status: AccountStatus::Active,
        profile: ProfileRef::new(identity.role, role_profile.id()),
        created_at: now,
        updated_at: now,
    };

    profiles::insert(&mut tx, &state.data_key, &role_profile).await?;
    credentials::insert(&mut tx, &credential).await?;
    tx.commit().await?;

    info!(
        "Usuário {} cadastrado com papel {} (perfil {})",
        credential.handle,
        credential.role(),
        role_profile.id()
    );

    let token = state.tokens.issue(&credential)?;
    Ok(Registration {
        credential,
        role_profile,
        token,
    })
}
