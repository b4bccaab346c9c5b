fn main() {
    if let Err(e) = exam_engine::run() {
        eprintln!("exam-engine fatal: {e:#}");
        std::process::exit(1);
    }
}
