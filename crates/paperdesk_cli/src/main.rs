//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `paperdesk_core` linkage.
//! - Keep output deterministic for quick local sanity checks.

use std::process::ExitCode;

fn main() -> ExitCode {
    println!("paperdesk_core ping={}", paperdesk_core::ping());
    println!("paperdesk_core version={}", paperdesk_core::core_version());

    // Exercises the migration path without touching any on-disk database.
    match paperdesk_core::open_db_in_memory() {
        Ok(_) => {
            println!("paperdesk_core schema=ok");
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("paperdesk_core schema=error detail={err}");
            ExitCode::FAILURE
        }
    }
}
