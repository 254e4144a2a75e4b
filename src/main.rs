fn main() {
    strata_timeline::cli::run_cli();
}
