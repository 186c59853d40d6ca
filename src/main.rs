fn main() {
    if let Err(err) = smart_store_etl::run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
