// Colored terminal output for `trustcheck analyze`.

use colored::Colorize;

use crate::inference::classifier::{InferenceResult, Prediction};
use crate::output::truncate_chars;
use crate::pipeline::analyze::{BatchOrigin, ResultBatch};

/// Display a classified batch in the terminal.
pub fn display_batch(batch: &ResultBatch) {
    let title = match batch.origin {
        BatchOrigin::Live => format!("=== Analysis ({} posts) ===", batch.results.len()),
        BatchOrigin::Sample => "=== Analysis (sample data: no posts retrieved) ===".to_string(),
    };
    println!("\n{}", title.bold());
    println!();

    println!(
        "  {:>3}  {:<52} {:<16} {:>10}",
        "#".dimmed(),
        "Post".dimmed(),
        "Prediction".dimmed(),
        "Time (ms)".dimmed(),
    );
    println!("  {}", "-".repeat(86).dimmed());

    for (i, result) in batch.results.iter().enumerate() {
        println!(
            "  {:>3}. {:<52} {:<16} {:>10.2}",
            i + 1,
            truncate_chars(&single_line(&result.post), 48),
            colorize_prediction(&result.prediction),
            result.detection_time,
        );
    }

    println!();
    display_tally(&batch.results);
}

fn display_tally(results: &[InferenceResult]) {
    let misinformation = results
        .iter()
        .filter(|r| matches!(&r.prediction, Prediction::Label(l) if l.eq_ignore_ascii_case("misinformation")))
        .count();
    let errors = results.iter().filter(|r| r.prediction.is_error()).count();

    if misinformation > 0 {
        println!("  {} {} flagged as misinformation", "!!".red().bold(), misinformation);
    }
    if errors > 0 {
        println!("  {} {} could not be classified", "~".yellow(), errors);
    }
    if misinformation == 0 && errors == 0 {
        println!("  {}", "Nothing flagged.".green());
    }
}

/// Color a prediction label for terminal display.
pub fn colorize_prediction(prediction: &Prediction) -> colored::ColoredString {
    match prediction {
        Prediction::Label(label) if label.eq_ignore_ascii_case("trustworthy") => label.green(),
        Prediction::Label(label) if label.eq_ignore_ascii_case("misinformation") => {
            label.red().bold()
        }
        Prediction::Label(label) => label.normal(),
        Prediction::Error(_) => "error".yellow(),
    }
}

fn single_line(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
