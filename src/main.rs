fn main() {
    if let Err(e) = flame_fx::core::Engine::run() {
        eprintln!("Effects engine failed: {}", e);
        std::process::exit(1);
    }
}
