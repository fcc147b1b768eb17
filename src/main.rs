fn main() {
    if let Err(err) = schoolmate::cli::main() {
        eprintln!("❌ {err}");
        std::process::exit(1);
    }
}
