fn main() {
    if let Err(err) = tillroll::run() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}
