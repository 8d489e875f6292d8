fn main() {
    perf_charts::cli::ab::run()
}
