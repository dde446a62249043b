fn main() {
    if let Err(err) = jsonform_schema::run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
