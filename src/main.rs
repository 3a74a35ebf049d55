fn main() {
    env_logger::init();

    if let Err(err) = labelstage::run() {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}
