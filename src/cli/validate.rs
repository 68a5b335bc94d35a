use anyhow::Result;
use log::info;
use std::path::PathBuf;

/// Validate a cell directory or split directory
pub fn run(dir: PathBuf) -> Result<()> {
    use cyclife::validator::validate_dir;

    info!("cyclife Validator");
    info!("=================");
    info!("Directory: {}", dir.display());

    match validate_dir(&dir) {
        Ok(report) => {
            #[cfg(feature = "colorized_output")]
            {
                println!("{}", report.format_colored());
            }

            #[cfg(not(feature = "colorized_output"))]
            {
                println!("{}", report);
            }

            if report.has_failures() {
                std::process::exit(1);
            }

            Ok(())
        }
        Err(e) => {
            eprintln!("Validation error: {}", e);
            std::process::exit(1);
        }
    }
}
