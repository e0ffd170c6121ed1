use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use std::time::Duration;

use crate::food::analysis::charts::{AnalysisView, Dashboard, Tab, Tag};
use crate::food::analysis::{Analysis, FoodAnalyzer};
use crate::food::capture::{pick_file, ImagePayload};
use crate::food::error::{CaptureError, LookupError, PipelineError, RecognitionError};
use crate::session::{Route, SessionContext};

const BAR_WIDTH: usize = 40;

pub async fn upload(analyzer: &FoodAnalyzer, path: &str) {
    let path = (!path.is_empty()).then(|| Path::new(path));
    match pick_file(path).await {
        Ok(image) => run_analysis(analyzer, &image).await,
        Err(e) => println!("{}", describe_error(&e.into()).red()),
    }
}

/// Runs the pipeline behind a spinner and shows the dashboard or the failure.
pub async fn run_analysis(analyzer: &FoodAnalyzer, image: &ImagePayload) {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::with_template("{spinner:.green} {msg}").unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message(format!("Analyzing {}...", image.file_name));
    spinner.enable_steady_tick(Duration::from_millis(100));

    let result = analyzer.analyze_nutrition(image).await;
    spinner.finish_and_clear();
    let route = next_route(&result);

    match result {
        Ok(analysis) => {
            if analysis.low_confidence {
                println!(
                    "{}",
                    "⚠️  The food could not be identified with confidence; results may be generic.".yellow()
                );
            }
            println!("➡️  {}", route.path().dimmed());
            print_view(&AnalysisView::render(Some(&analysis.record)));
        }
        Err(e) => {
            println!("{}", describe_error(&e).red());
            println!("➡️  {}", route.path().dimmed());
        }
    }
}

/// A failed analysis leaves the user on the capture screen to try again.
pub fn next_route(result: &Result<Analysis, PipelineError>) -> Route {
    match result {
        Ok(analysis) => analysis.route,
        Err(_) => Route::Capture,
    }
}

pub fn show_analysis(session: &SessionContext) {
    print_view(&AnalysisView::render(session.current().as_ref()));
}

/// One message per failure kind, each telling the user what to do next.
pub fn describe_error(error: &PipelineError) -> String {
    match error {
        PipelineError::Capture(CaptureError::CameraUnavailable(_)) => {
            "📷 Could not access camera. Please check permissions.".to_string()
        }
        PipelineError::Capture(CaptureError::CaptureFailed(reason)) => {
            format!("📷 Could not capture image ({}). Please try again.", reason)
        }
        PipelineError::Capture(CaptureError::SwitchUnavailable(_)) => {
            "🔄 Could not switch camera. Device may only have one camera.".to_string()
        }
        PipelineError::Capture(CaptureError::NoFileSelected(reason)) => {
            format!("📂 No image to analyze: {}. Usage: upload <path>", reason)
        }
        PipelineError::Recognition(RecognitionError::RecognitionFailed { status, .. }) => match status {
            Some(code) => format!("🔍 Food detection failed (status {}). Please try again.", code),
            None => "🔍 Food detection failed. Please try again.".to_string(),
        },
        PipelineError::Lookup(LookupError::LookupFailed(_)) => {
            "🥗 Couldn't get food information. Please try again.".to_string()
        }
        PipelineError::Lookup(LookupError::ParseFailed(_)) => {
            "🥗 The nutrition service returned an unreadable answer. Please try again.".to_string()
        }
    }
}

fn print_view(view: &AnalysisView) {
    match view {
        AnalysisView::NoData => {
            println!("\n{}", "No Food Data Available".bold());
            println!("You haven't analyzed any food yet. Try: upload <path> or camera open\n");
        }
        AnalysisView::Dashboard(dashboard) => print_dashboard(dashboard),
    }
}

fn print_dashboard(dashboard: &Dashboard) {
    println!();
    if dashboard.origin.is_empty() {
        println!("🍽️  {}", dashboard.name.bold());
    } else {
        println!("🍽️  {}  ({})", dashboard.name.bold(), dashboard.origin.italic());
    }
    if !dashboard.description.is_empty() {
        println!("{}", dashboard.description.truecolor(255, 236, 179));
    }

    print_tags("👨‍🍳 Cooking Methods", &dashboard.cooking_methods);
    print_tags("🍴 Common Dishes", &dashboard.common_dishes);

    if !dashboard.health_benefits.is_empty() {
        println!("\n{}", "💚 Health Benefits".bold());
        for benefit in &dashboard.health_benefits {
            println!("  🌿 {}", benefit);
        }
    }

    for tab in &dashboard.tabs {
        match tab {
            Tab::Macros => {
                println!("\n{}", "📊 Macronutrients".bold());
                let max = dashboard.macros.iter().map(|p| p.value).fold(0.0, f64::max);
                for point in &dashboard.macros {
                    print_bar(point.name, point.value, max, point.fill, "");
                }
            }
            Tab::Vitamins => {
                if let Some(vitamins) = &dashboard.vitamins {
                    println!("\n{}", "🍊 Vitamins (% daily value)".bold());
                    for point in vitamins {
                        print_bar(&point.name, point.value, 100.0, "#4BC0C0", "%");
                    }
                }
            }
            Tab::Minerals => {
                if let Some(minerals) = &dashboard.minerals {
                    println!("\n{}", "🪨 Minerals (share of total)".bold());
                    for slice in minerals {
                        print_bar(&slice.name, slice.percent, 100.0, slice.fill, "%");
                    }
                }
            }
        }
    }
    println!();
}

fn print_tags(title: &str, tags: &[Tag]) {
    if tags.is_empty() {
        return;
    }
    let labels: Vec<String> = tags.iter().map(|t| format!("[{}]", t.label)).collect();
    println!("\n{}  {}", title.bold(), labels.join(" "));
}

fn print_bar(label: &str, value: f64, max: f64, fill: &str, unit: &str) {
    let width = if max > 0.0 {
        ((value / max).min(1.0) * BAR_WIDTH as f64).round() as usize
    } else {
        0
    };
    let (r, g, b) = hex_to_rgb(fill);
    println!(
        "  {:<18} {} {:.1}{}",
        label,
        "█".repeat(width).truecolor(r, g, b),
        value,
        unit
    );
}

fn hex_to_rgb(hex: &str) -> (u8, u8, u8) {
    let hex = hex.trim_start_matches('#');
    let channel = |i: usize| {
        hex.get(i..i + 2)
            .and_then(|c| u8::from_str_radix(c, 16).ok())
            .unwrap_or(200)
    };
    (channel(0), channel(2), channel(4))
}
