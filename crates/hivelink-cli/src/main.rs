fn main() -> Result<(), Box<dyn std::error::Error>> {
    hivelink_cli::runner::main(std::env::args().collect())
}
