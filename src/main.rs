use std::process::ExitCode;

fn main() -> ExitCode {
    match coco2csv::run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
