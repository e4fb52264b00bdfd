fn main() {
    built::write_built_file().expect("Falha ao coletar informações de build");
}
