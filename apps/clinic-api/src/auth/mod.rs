//! Autenticação: hash de senhas, tokens de sessão e guarda de acesso

pub mod guard;
pub mod password;
pub mod token;

pub use guard::require_bearer;
pub use token::{Claims, TokenService};
