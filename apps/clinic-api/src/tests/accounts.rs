use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use serde_json::json;
use std::collections::HashSet;
use std::time::Duration;
use tower::ServiceExt;
use uuid::Uuid;

use super::*;
use crate::auth::TokenService;

#[tokio::test]
async fn test_doctor_registration_links_persisted_profile() {
    let app = TestApp::new().await;

    let body = app
        .register(doctor_payload("John", "Smith", "CRM-1001", "+5511900000001"))
        .await;

    assert_eq!(body["credential"]["role"], "Doctor");
    assert_eq!(body["credential"]["handle"], "johnsmith");
    assert_eq!(body["credential"]["status"], "Active");
    assert_eq!(body["credential"]["profileId"], body["roleProfile"]["id"]);
    assert_eq!(body["roleProfile"]["licenseNumber"], "CRM-1001");
    assert!(body["credential"].get("passwordHash").is_none());

    let (status, aggregate) = app
        .send(
            Method::GET,
            &format!("/users/{}", credential_id_of(&body)),
            Some(&token_of(&body)),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(aggregate["roleProfile"]["licenseNumber"], "CRM-1001");
    assert_eq!(aggregate["roleProfile"]["id"], body["roleProfile"]["id"]);
}

#[tokio::test]
async fn test_same_name_gets_distinct_handles() {
    let app = TestApp::new().await;

    let first = app
        .register(patient_payload("John", "Smith", "+5511900000010"))
        .await;
    let second = app
        .register(patient_payload("John", "Smith", "+5511900000011"))
        .await;

    assert_eq!(first["credential"]["handle"], "johnsmith");
    assert_eq!(second["credential"]["handle"], "johnsmith1");
}

#[tokio::test]
async fn test_duplicate_license_is_conflict_without_writes() {
    let app = TestApp::new().await;
    app.register(doctor_payload("Ana", "Lima", "CRM-2002", "+5511900000020"))
        .await;

    let (status, body) = app
        .send(
            Method::POST,
            "/auth/register",
            None,
            Some(doctor_payload("Bruno", "Costa", "CRM-2002", "+5511900000021")),
        )
        .await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["error"].as_str().unwrap().contains("licença"));
    assert_eq!(app.count("doctors").await, 1);
    assert_eq!(app.count("credentials").await, 1);
}

#[tokio::test]
async fn test_duplicate_phone_is_conflict_and_rolls_back_profile() {
    let app = TestApp::new().await;
    app.register(patient_payload("Carla", "Dias", "+5511900000030"))
        .await;

    let (status, body) = app
        .send(
            Method::POST,
            "/auth/register",
            None,
            Some(patient_payload("Diego", "Reis", "+5511900000030")),
        )
        .await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "Telefone já cadastrado");
    assert_eq!(app.count("patients").await, 1);
}

#[tokio::test]
async fn test_registration_missing_fields_is_validation_error() {
    let app = TestApp::new().await;

    let (status, body) = app
        .send(
            Method::POST,
            "/auth/register",
            None,
            Some(json!({ "role": "Doctor", "firstName": "Eva", "lastName": "Melo" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("phone"));

    let mut doctor = doctor_payload("Eva", "Melo", "CRM-3003", "+5511900000040");
    doctor.as_object_mut().unwrap().remove("licenseNumber");
    let (status, body) = app
        .send(Method::POST, "/auth/register", None, Some(doctor))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("licenseNumber"));

    let mut unknown = patient_payload("Eva", "Melo", "+5511900000041");
    unknown["role"] = json!("Nurse");
    let (status, _) = app
        .send(Method::POST, "/auth/register", None, Some(unknown))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .send(
            Method::POST,
            "/auth/register",
            None,
            Some(json!({ "role": "Patient", "email": "nao-e-email" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    assert_eq!(app.count("credentials").await, 0);
}

#[tokio::test]
async fn test_patient_round_trip_has_empty_history() {
    let app = TestApp::new().await;
    let body = app
        .register(patient_payload("Fabia", "Nunes", "+5511900000050"))
        .await;

    assert_eq!(body["roleProfile"]["name"], "Fabia Nunes");

    let (status, aggregate) = app
        .send(
            Method::GET,
            &format!("/users/{}", credential_id_of(&body)),
            Some(&token_of(&body)),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(aggregate["roleProfile"]["medicalHistory"], json!([]));
}

#[tokio::test]
async fn test_login_token_reveals_credential_and_suspension_forbids() {
    let app = TestApp::new().await;
    let registration = app
        .register(doctor_payload("Gil", "Souza", "CRM-4004", "+5511900000060"))
        .await;

    let (status, session) = app
        .send(
            Method::POST,
            "/auth/login",
            None,
            Some(json!({ "identifier": "gilsouza", "secret": "senha-forte" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(session["role"], "Doctor");
    assert_eq!(session["roleProfile"]["licenseNumber"], "CRM-4004");

    let claims = TokenService::new(TEST_JWT_SECRET, Duration::from_secs(3600))
        .verify(session["token"].as_str().unwrap())
        .unwrap();
    assert_eq!(claims.sub.to_string(), credential_id_of(&registration));
    assert_eq!(claims.handle, "gilsouza");

    let (status, _) = app
        .send(
            Method::DELETE,
            &format!("/users/{}", credential_id_of(&registration)),
            Some(&token_of(&registration)),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app
        .send(
            Method::POST,
            "/auth/login",
            None,
            Some(json!({ "identifier": "gilsouza", "secret": "senha-forte" })),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_login_accepts_phone_and_email_in_any_case() {
    let app = TestApp::new().await;
    let mut payload = patient_payload("Hugo", "Alves", "+5511900000070");
    payload["email"] = json!("Hugo@Example.com");
    app.register(payload).await;

    // E-mail exatamente como cadastrado, e nome de usuário com maiúsculas
    let identifiers = ["+5511900000070", "Hugo@Example.com", " hugo@example.com ", "HugoAlves"];
    for identifier in identifiers {
        let (status, session) = app
            .send(
                Method::POST,
                "/auth/login",
                None,
                Some(json!({ "username": identifier, "password": "senha-paciente" })),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "{}", identifier);
        assert_eq!(session["credential"]["handle"], "hugoalves");
    }
}

#[tokio::test]
async fn test_wrong_secret_and_unknown_identifier_look_the_same() {
    let app = TestApp::new().await;
    app.register(patient_payload("Iris", "Mota", "+5511900000080"))
        .await;

    let wrong_secret = app
        .send(
            Method::POST,
            "/auth/login",
            None,
            Some(json!({ "identifier": "irismota", "secret": "errada" })),
        )
        .await;
    let wrong_identifier = app
        .send(
            Method::POST,
            "/auth/login",
            None,
            Some(json!({ "identifier": "ninguem", "secret": "senha-paciente" })),
        )
        .await;

    assert_eq!(wrong_secret.0, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong_secret, wrong_identifier);

    let (status, _) = app
        .send(Method::POST, "/auth/login", None, Some(json!({ "identifier": "irismota" })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_suspend_is_idempotent_and_reaches_profile() {
    let app = TestApp::new().await;
    let admin = app
        .register(admin_payload("Root", "Admin", "+5511900000090"))
        .await;
    let patient = app
        .register(patient_payload("Joao", "Pedro", "+5511900000091"))
        .await;
    let token = token_of(&admin);
    let uri = format!("/users/{}", credential_id_of(&patient));

    for _ in 0..2 {
        let (status, body) = app.send(Method::DELETE, &uri, Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["credential"]["status"], "Suspended");
        assert_eq!(body["roleProfile"]["status"], "Suspended");
    }

    let (status, body) = app
        .send(Method::DELETE, &format!("/users/{}", credential_id_of(&admin)), Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["credential"]["status"], "Suspended");

    let (status, _) = app
        .send(Method::DELETE, &format!("/users/{}", Uuid::new_v4()), Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_list_filters_by_role_and_paginates() {
    let app = TestApp::new().await;
    let mut token = String::new();
    for i in 0..6 {
        let body = app
            .register(doctor_payload(
                "Doc",
                &format!("Numero{}", i),
                &format!("CRM-50{}", i),
                &format!("+55119000001{}", i),
            ))
            .await;
        token = token_of(&body);
    }
    for i in 0..2 {
        app.register(patient_payload(
            "Pac",
            &format!("Numero{}", i),
            &format!("+55119000002{}", i),
        ))
        .await;
    }

    let (status, page) = app
        .send(Method::GET, "/users?role=Doctor&page=1&limit=5", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    let items = page["items"].as_array().unwrap();
    assert_eq!(items.len(), 5);
    assert!(items.iter().all(|item| item["credential"]["role"] == "Doctor"));
    assert_eq!(page["totalCount"], 6);
    assert_eq!(page["totalPages"], 2);

    let (_, page) = app
        .send(Method::GET, "/users?role=Doctor&page=2&limit=5", Some(&token), None)
        .await;
    assert_eq!(page["items"].as_array().unwrap().len(), 1);

    let (_, page) = app
        .send(Method::GET, "/users?search=PACNUMERO1", Some(&token), None)
        .await;
    assert_eq!(page["totalCount"], 1);
    assert_eq!(page["items"][0]["credential"]["handle"], "pacnumero1");

    let (status, _) = app
        .send(Method::GET, "/users?role=Nurse", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .send(Method::GET, "/users?page=abc", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_update_changes_credential_and_profile() {
    let app = TestApp::new().await;
    let body = app
        .register(patient_payload("Lia", "Ramos", "+5511900000100"))
        .await;
    let token = token_of(&body);
    let uri = format!("/users/{}", credential_id_of(&body));

    let (status, updated) = app
        .send(
            Method::PUT,
            &uri,
            Some(&token),
            Some(json!({
                "email": "lia@example.com",
                "secret": "nova-senha",
                "address": "Rua Nova, 5",
                "medicalHistory": ["Alergia a penicilina", "Asma"],
            })),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{}", updated);
    assert_eq!(updated["credential"]["email"], "lia@example.com");
    assert_eq!(updated["roleProfile"]["address"], "Rua Nova, 5");
    assert_eq!(
        updated["roleProfile"]["medicalHistory"],
        json!(["Alergia a penicilina", "Asma"])
    );

    let (status, _) = app
        .send(
            Method::POST,
            "/auth/login",
            None,
            Some(json!({ "identifier": "lia@example.com", "secret": "nova-senha" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app
        .send(
            Method::PUT,
            &format!("/users/{}", Uuid::new_v4()),
            Some(&token),
            Some(json!({ "address": "X" })),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_protected_routes_require_valid_bearer() {
    let app = TestApp::new().await;

    let (status, body) = app.send(Method::GET, "/users", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body["error"].is_string());

    let (status, _) = app
        .send(Method::GET, "/books", Some("nao.e.token"), None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let registration = app
        .register(admin_payload("Tina", "Paz", "+5511900000110"))
        .await;
    let (status, _) = app
        .send(
            Method::GET,
            "/appointments",
            Some(&token_of(&registration).replace('.', "_")),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app
        .send(Method::GET, "/users/nao-e-uuid", Some(&token_of(&registration)), None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_public_routes_and_fallback() {
    let app = TestApp::new().await;

    let (status, body) = app.send(Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "clinic-api");

    let (status, body) = app.send(Method::GET, "/nao-existe", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].is_string());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_registrations_never_fail_with_server_error() {
    let app = TestApp::new().await;

    // Mesmo nome para todos; os dois últimos repetem telefones já usados
    let mut phones: Vec<String> = (0..6).map(|i| format!("+55119888800{:02}", i)).collect();
    phones.push(phones[0].clone());
    phones.push(phones[3].clone());

    let mut requests = Vec::new();
    for phone in phones {
        let router = app.router.clone();
        requests.push(tokio::spawn(async move {
            call(
                router,
                Method::POST,
                "/auth/register",
                None,
                Some(patient_payload("Nina", "Rocha", &phone)),
            )
            .await
        }));
    }

    let mut created = Vec::new();
    let mut conflicts = 0;
    for request in requests {
        let (status, body) = request.await.unwrap();
        match status {
            StatusCode::CREATED => created.push(body),
            StatusCode::CONFLICT => conflicts += 1,
            other => panic!("status inesperado {}: {}", other, body),
        }
    }

    assert_eq!(created.len(), 6);
    assert_eq!(conflicts, 2);
    let handles: HashSet<&str> = created
        .iter()
        .map(|body| body["credential"]["handle"].as_str().unwrap())
        .collect();
    assert_eq!(handles.len(), 6);
    assert!(handles.contains("ninarocha"));
    assert_eq!(app.count("credentials").await, 6);
    assert_eq!(app.count("patients").await, 6);
}

#[tokio::test]
async fn test_preflight_on_protected_route_skips_bearer() {
    let app = TestApp::new().await;

    let request = Request::builder()
        .method(Method::OPTIONS)
        .uri("/users")
        .header(header::ORIGIN, "https://painel.clinica.example")
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "GET")
        .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "authorization,content-type")
        .body(Body::empty())
        .unwrap();
    let response = app.router.clone().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let headers = response.headers();
    let value = |name: header::HeaderName| {
        headers
            .get(name)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default()
            .to_ascii_lowercase()
    };

    assert_eq!(value(header::ACCESS_CONTROL_ALLOW_ORIGIN), "*");
    let methods = value(header::ACCESS_CONTROL_ALLOW_METHODS);
    for method in ["get", "post", "put", "delete", "options"] {
        assert!(methods.contains(method), "{} ausente em {}", method, methods);
    }
    let allowed = value(header::ACCESS_CONTROL_ALLOW_HEADERS);
    assert!(allowed.contains("authorization"), "{}", allowed);
    assert!(allowed.contains("content-type"), "{}", allowed);
    assert_eq!(value(header::ACCESS_CONTROL_MAX_AGE), "86400");
}
