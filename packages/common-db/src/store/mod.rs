//! Funções de acesso ao banco por agregado
//!
//! Todas recebem `&mut SqliteConnection`, de modo que o chamador decide se a
//! operação roda numa conexão do pool ou dentro de uma transação
//! (`&mut *tx`). Nenhuma função abre transação própria.

pub mod appointments;
pub mod books;
pub mod credentials;
pub mod ledger;
pub mod profiles;

/// Monta um padrão LIKE de "contém", escapando curingas digitados pelo usuário
pub(crate) fn contains_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for ch in term.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contains_pattern_escapes_wildcards() {
        assert_eq!(contains_pattern("john"), "%john%");
        assert_eq!(contains_pattern("50%_off"), "%50\\%\\_off%");
        assert_eq!(contains_pattern("a\\b"), "%a\\\\b%");
    }
}
