fn main() {
    if let Err(e) = app_lib::run() {
        eprintln!("img2pdf: {:#}", e);
        std::process::exit(1);
    }
}
