fn main() {
    perf_charts::cli::deployment::run()
}
