fn main() {
    std::process::exit(vulnguard::app::startup::startup());
}
