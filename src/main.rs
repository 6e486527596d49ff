//! fdms entrypoint.

use fdms::run;
use fdms::ui::messages::error;

fn main() {
    if let Err(e) = run() {
        error(format!("Error: {e}"));
        std::process::exit(1);
    }
}
