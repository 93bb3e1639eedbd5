fn main() {
    if let Err(e) = carepilot_lib::run() {
        eprintln!("carepilot: {e}");
        std::process::exit(1);
    }
}
