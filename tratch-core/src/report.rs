//! Output formatting - plaintext and JSON.

use crate::analyzer::AnalysisResult;

/// Prints an analysis result in plain text format.
pub fn print_plain(result: &AnalysisResult) {
    if result.catches.is_empty() {
        println!("No catch blocks found.");
        return;
    }

    println!("CATCH BLOCKS ({}):", result.catches.len());
    for record in &result.catches {
        println!(
            "- {}:{} catch ({}) in {}.{}",
            record.file_path,
            record.start_line,
            record.exception_type,
            record.parent_type,
            record.parent_method
        );
        for (name, value) in &record.features {
            println!("    {} = {}", name, value);
        }
    }

    println!(
        "POSSIBLE EXCEPTIONS ({}):",
        result.possible_exceptions.len()
    );
    for record in &result.possible_exceptions {
        println!(
            "- {} vs caught {} [code {}] via {} at {}:{} (level {})",
            record.exception_type,
            record.caught_type,
            record.handler_type_code,
            record.invoked_method,
            record.file_path,
            record.invoked_method_line,
            record.level_found
        );
    }

    println!("STATS:");
    for (name, value) in &result.stats {
        println!("    {} = {}", name, value);
    }
}

/// Prints an analysis result in JSON format.
///
/// Falls back to the stats-only plain format if serialization fails, which
/// would take a non-string map key or similar to provoke.
pub fn print_json(result: &AnalysisResult) {
    match serde_json::to_string_pretty(result) {
        Ok(json) => println!("{}", json),
        Err(e) => {
            eprintln!("[WARN] JSON serialization failed: {}", e);
            for (name, value) in &result.stats {
                println!("{} = {}", name, value);
            }
        }
    }
}
