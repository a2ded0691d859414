//! Terminal rendering for API responses.

use console::style;

use crate::api::{DatasetRecord, Summary, UploadResult};

pub fn print_upload_result(result: &UploadResult) {
    println!(
        "{} {} (dataset #{}, {})",
        style("Uploaded").green().bold(),
        result.name,
        result.id,
        result.uploaded_at
    );
    println!();
    print_summary(&result.summary);
}

pub fn print_summary(summary: &Summary) {
    println!("{}", style("Summary Statistics").bold());
    println!("  Total Equipment      {}", summary.total_count);
    println!("  Average Flowrate     {}", fmt_mean(summary.avg_flowrate));
    println!("  Average Pressure     {}", fmt_mean(summary.avg_pressure));
    println!(
        "  Average Temperature  {}",
        fmt_mean(summary.avg_temperature)
    );

    if !summary.equipment_types.is_empty() {
        println!();
        println!("{}", style("Equipment Types").bold());
        for (equipment_type, count) in &summary.equipment_types {
            println!("  {equipment_type:<20} {count}");
        }
    }
}

pub fn print_dataset_list(datasets: &[DatasetRecord]) {
    if datasets.is_empty() {
        println!("No datasets uploaded yet.");
        return;
    }

    println!(
        "{}",
        style(format!(
            "{:>4}  {:<28} {:>8} {:>6}  {}",
            "ID", "NAME", "SIZE", "ROWS", "UPLOADED"
        ))
        .bold()
    );
    for dataset in datasets {
        println!(
            "{:>4}  {:<28} {:>8} {:>6}  {}",
            dataset.id,
            truncated(&dataset.name, 28),
            format!("{}B", dataset.file_size),
            dataset.total_count,
            dataset.uploaded_at
        );
    }
}

pub fn print_dataset(dataset: &DatasetRecord) {
    println!("{}", style(format!("Dataset #{}", dataset.id)).bold());
    println!("  Name                 {}", dataset.name);
    println!("  Uploaded             {}", dataset.uploaded_at);
    println!("  File size            {} bytes", dataset.file_size);
    println!("  Total Equipment      {}", dataset.total_count);
    println!("  Average Flowrate     {}", fmt_mean(dataset.avg_flowrate));
    println!("  Average Pressure     {}", fmt_mean(dataset.avg_pressure));
    println!(
        "  Average Temperature  {}",
        fmt_mean(dataset.avg_temperature)
    );
}

fn fmt_mean(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{v:.2}"),
        None => "N/A".to_string(),
    }
}

fn truncated(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let kept: String = s.chars().take(max.saturating_sub(1)).collect();
    format!("{kept}\u{2026}")
}
