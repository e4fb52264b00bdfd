//! Agregado {credencial, perfil}: leitura, atualização, suspensão e listagem

use chrono::{NaiveDate, Utc};
use common_db::models::{
    AccountStatus, Credential, Gender, ProfileStatus, Role, RoleProfile,
};
use common_db::store::credentials::{self, CredentialFilter};
use common_db::store::profiles;
use common_db::WriteTransaction;
use serde::{Deserialize, Serialize};
use sqlx::SqliteConnection;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::auth::password::hash_secret;
use crate::error::{ApiError, ApiResult};
use crate::AppState;

pub const DEFAULT_PAGE_SIZE: i64 = 10;
pub const MAX_PAGE_SIZE: i64 = 100;

/// Credencial com o perfil vinculado. O perfil pode faltar se o cadastro
/// tiver sido interrompido.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Aggregate {
    pub credential: Credential,
    pub role_profile: Option<RoleProfile>,
}

/// Corpo de `PUT /users/{id}`; campos ausentes ficam como estão
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    #[validate(email)]
    pub email: Option<String>,
    #[validate(length(min = 1))]
    pub phone: Option<String>,
    #[serde(alias = "password")]
    #[validate(length(min = 1))]
    pub secret: Option<String>,
    #[validate(length(min = 1))]
    pub first_name: Option<String>,
    #[validate(length(min = 1))]
    pub last_name: Option<String>,
    #[validate(length(min = 1))]
    pub name: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub gender: Option<Gender>,
    pub address: Option<String>,
    #[validate(length(min = 1))]
    pub specialization: Option<String>,
    #[validate(length(min = 1))]
    pub license_number: Option<String>,
    #[validate(range(min = 0))]
    pub experience: Option<i64>,
    #[validate(length(min = 1))]
    pub availability: Option<String>,
    pub verified: Option<bool>,
    pub medical_history: Option<Vec<String>>,
}

impl UpdateUserRequest {
    /// Nome completo para pacientes e administradores. Só `firstName` ou só
    /// `lastName` substitui a parte correspondente do nome atual, separado no
    /// primeiro espaço.
    fn display_name(&self, current: &str) -> String {
        if let Some(name) = &self.name {
            return name.trim().to_string();
        }
        let (current_first, current_last) = current.split_once(' ').unwrap_or((current, ""));
        let first = self.first_name.as_deref().map_or(current_first, str::trim);
        let last = self.last_name.as_deref().map_or(current_last, str::trim);
        if last.is_empty() {
            first.to_string()
        } else {
            format!("{} {}", first, last)
        }
    }

    fn apply_to_credential(&self, credential: &mut Credential, password_hash: Option<String>) {
        if let Some(email) = &self.email {
            credential.email = Some(email.trim().to_lowercase());
        }
        if let Some(phone) = &self.phone {
            credential.phone = phone.trim().to_string();
        }
        if let Some(hash) = password_hash {
            credential.password_hash = hash;
        }
    }

    fn apply_to_profile(&self, profile: &mut RoleProfile) {
        match profile {
            RoleProfile::Doctor(doctor) => {
                if let Some(first_name) = &self.first_name {
                    doctor.first_name = first_name.trim().to_string();
                }
                if let Some(last_name) = &self.last_name {
                    doctor.last_name = last_name.trim().to_string();
                }
                if let Some(address) = &self.address {
                    doctor.address = Some(address.trim().to_string()).filter(|a| !a.is_empty());
                }
                if let Some(date_of_birth) = self.date_of_birth {
                    doctor.date_of_birth = date_of_birth;
                }
                if let Some(gender) = self.gender {
                    doctor.gender = gender;
                }
                if let Some(specialization) = &self.specialization {
                    doctor.specialization = specialization.trim().to_string();
                }
                if let Some(license_number) = &self.license_number {
                    doctor.license_number = license_number.trim().to_string();
                }
                if let Some(experience) = self.experience {
                    doctor.experience = experience;
                }
                if let Some(availability) = &self.availability {
                    doctor.availability = availability.trim().to_string();
                }
                if let Some(verified) = self.verified {
                    doctor.verified = verified;
                }
            }
            RoleProfile::Patient(patient) => {
                patient.name = self.display_name(&patient.name);
                if let Some(address) = self.address.as_deref().map(str::trim) {
                    if !address.is_empty() {
                        patient.address = address.to_string();
                    }
                }
                if let Some(date_of_birth) = self.date_of_birth {
                    patient.date_of_birth = date_of_birth;
                }
                if let Some(gender) = self.gender {
                    patient.gender = gender;
                }
                if let Some(history) = &self.medical_history {
                    patient.medical_history = history.clone();
                }
            }
            RoleProfile::Admin(admin) => {
                admin.name = self.display_name(&admin.name);
                if let Some(address) = &self.address {
                    admin.address = Some(address.trim().to_string()).filter(|a| !a.is_empty());
                }
                if let Some(date_of_birth) = self.date_of_birth {
                    admin.date_of_birth = date_of_birth;
                }
                if let Some(gender) = self.gender {
                    admin.gender = gender;
                }
            }
        }
    }
}

fn touch(profile: &mut RoleProfile) {
    let now = Utc::now();
    match profile {
        RoleProfile::Doctor(doctor) => doctor.updated_at = now,
        RoleProfile::Patient(patient) => patient.updated_at = now,
        RoleProfile::Admin(admin) => admin.updated_at = now,
    }
}

/// Parâmetros de `GET /users`
#[derive(Debug, Default, Deserialize)]
pub struct ListUsersQuery {
    pub search: Option<String>,
    pub role: Option<String>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

/// Uma página da listagem
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPage {
    pub items: Vec<Aggregate>,
    pub page: i64,
    pub total_pages: i64,
    pub total_count: i64,
}

fn user_not_found(id: Uuid) -> ApiError {
    ApiError::not_found(format!("Usuário {} não encontrado", id))
}

async fn load(
    conn: &mut SqliteConnection,
    state: &AppState,
    id: Uuid,
) -> ApiResult<Aggregate> {
    let credential = credentials::find_by_id(conn, id)
        .await?
        .ok_or_else(|| user_not_found(id))?;
    let role_profile = profiles::find(conn, &state.data_key, credential.profile).await?;

    Ok(Aggregate {
        credential,
        role_profile,
    })
}

pub async fn get_user(state: &AppState, id: Uuid) -> ApiResult<Aggregate> {
    let mut conn = state.pool.acquire().await?;
    load(&mut conn, state, id).await
}

/// Aplica a atualização parcial à credencial e ao perfil na mesma transação
pub async fn update_user(
    state: &AppState,
    id: Uuid,
    request: UpdateUserRequest,
) -> ApiResult<Aggregate> {
    let password_hash = match &request.secret {
        Some(secret) => Some(hash_secret(secret.clone()).await?),
        None => None,
    };

    let mut tx = WriteTransaction::begin(&state.pool).await?;
    let Aggregate {
        mut credential,
        role_profile,
    } = load(&mut tx, state, id).await?;

    request.apply_to_credential(&mut credential, password_hash);
    credential.updated_at = Utc::now();
    credentials::update(&mut tx, &credential).await?;

    if let Some(mut profile) = role_profile {
        request.apply_to_profile(&mut profile);
        touch(&mut profile);
        profiles::update(&mut tx, &state.data_key, &profile).await?;
    }

    tx.commit().await?;
    info!("Usuário {} atualizado", credential.handle);

    get_user(state, id).await
}

/// Suspende credencial e perfil. Repetir a operação não altera o resultado.
pub async fn suspend_user(state: &AppState, id: Uuid) -> ApiResult<Aggregate> {
    let mut tx = WriteTransaction::begin(&state.pool).await?;
    let credential = credentials::find_by_id(&mut tx, id)
        .await?
        .ok_or_else(|| user_not_found(id))?;

    let now = Utc::now();
    credentials::set_status(&mut tx, id, AccountStatus::Suspended, now).await?;
    profiles::set_status(&mut tx, credential.profile, ProfileStatus::Suspended, now).await?;
    tx.commit().await?;

    info!("Usuário {} suspenso", credential.handle);
    get_user(state, id).await
}

pub async fn list_users(state: &AppState, query: ListUsersQuery) -> ApiResult<UserPage> {
    let role = match query.role.as_deref().map(str::trim).filter(|r| !r.is_empty()) {
        Some(role) => Some(
            role.parse::<Role>()
                .map_err(|_| ApiError::validation(format!("Papel desconhecido: {}", role)))?,
        ),
        None => None,
    };
    let filter = CredentialFilter {
        search: query.search,
        role,
    };

    let page = query.page.unwrap_or(1).max(1);
    let limit = query
        .limit
        .unwrap_or(DEFAULT_PAGE_SIZE)
        .clamp(1, MAX_PAGE_SIZE);
    let offset = (page - 1).saturating_mul(limit);

    let mut conn = state.pool.acquire().await?;
    let total_count = credentials::count(&mut conn, &filter).await?;
    let found = credentials::list(&mut conn, &filter, offset, limit).await?;

    let mut items = Vec::with_capacity(found.len());
    for credential in found {
        let role_profile = profiles::find(&mut conn, &state.data_key, credential.profile).await?;
        items.push(Aggregate {
            credential,
            role_profile,
        });
    }

    Ok(UserPage {
        items,
        page,
        total_pages: (total_count + limit - 1) / limit,
        total_count,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use common_db::testing::{sample_doctor, sample_patient};

    #[test]
    fn test_patient_update_composes_name_and_keeps_address() {
        let mut profile = RoleProfile::Patient(sample_patient());
        let request = UpdateUserRequest {
            first_name: Some("Joana".to_string()),
            last_name: Some("Prado".to_string()),
            address: Some("   ".to_string()),
            medical_history: Some(vec!["Asma".to_string()]),
            ..Default::default()
        };

        request.apply_to_profile(&mut profile);

        match profile {
            RoleProfile::Patient(patient) => {
                assert_eq!(patient.name, "Joana Prado");
                assert_eq!(patient.address, "Rua das Flores, 10");
                assert_eq!(patient.medical_history, vec!["Asma".to_string()]);
            }
            other => panic!("perfil inesperado: {:?}", other),
        }
    }

    #[test]
    fn test_doctor_update_ignores_patient_fields() {
        let mut profile = RoleProfile::Doctor(sample_doctor("CRM-1"));
        let request = UpdateUserRequest {
            specialization: Some("Cardiologia".to_string()),
            verified: Some(true),
            medical_history: Some(vec!["ignorado".to_string()]),
            ..Default::default()
        };

        request.apply_to_profile(&mut profile);

        match profile {
            RoleProfile::Doctor(doctor) => {
                assert_eq!(doctor.specialization, "Cardiologia");
                assert!(doctor.verified);
                assert_eq!(doctor.license_number, "CRM-1");
                assert_eq!(doctor.status, ProfileStatus::Active);
            }
            other => panic!("perfil inesperado: {:?}", other),
        }
    }

    #[test]
    fn test_single_name_part_merges_into_current_name() {
        let last_only = UpdateUserRequest {
            last_name: Some("Prado".to_string()),
            ..Default::default()
        };
        assert_eq!(last_only.display_name("Maria Souza"), "Maria Prado");

        let first_only = UpdateUserRequest {
            first_name: Some(" Ana ".to_string()),
            ..Default::default()
        };
        assert_eq!(first_only.display_name("Maria Souza"), "Ana Souza");
        assert_eq!(first_only.display_name("Maria da Silva Souza"), "Ana da Silva Souza");
        assert_eq!(first_only.display_name("Maria"), "Ana");

        assert_eq!(UpdateUserRequest::default().display_name("Maria Souza"), "Maria Souza");

        let mut profile = RoleProfile::Patient(sample_patient());
        last_only.apply_to_profile(&mut profile);
        match profile {
            RoleProfile::Patient(patient) => assert_eq!(patient.name, "Maria Prado"),
            other => panic!("perfil inesperado: {:?}", other),
        }
    }
}
