use colored::Colorize;

use super::food_cmd;
use crate::food::analysis::FoodAnalyzer;
use crate::food::capture::{FacingMode, ImageAcquisition};
use crate::food::error::PipelineError;

pub async fn handle_command(
    input: &str,
    acquisition: &mut ImageAcquisition,
    analyzer: &FoodAnalyzer,
) -> Result<(), String> {
    let mut parts = input.split_whitespace();
    let command = parts.next().unwrap_or_default();

    let action = if command == "capture" {
        "capture"
    } else {
        parts.next().unwrap_or("status")
    };

    match action {
        "open" => {
            let facing = match parts.next() {
                Some(mode) => mode.parse::<FacingMode>()?,
                None => FacingMode::User,
            };
            match acquisition.open_camera(facing).await {
                Ok(session) => println!(
                    "📷 {} camera open. Type {} to take a photo.",
                    session.facing_mode().to_string().cyan(),
                    "capture".bold()
                ),
                Err(e) => println!("{}", food_cmd::describe_error(&PipelineError::from(e)).red()),
            }
        }
        "switch" => match acquisition.switch_camera().await {
            Ok(facing) => println!("🔄 Switched to {} camera", facing.to_string().cyan()),
            Err(e) => {
                println!("{}", food_cmd::describe_error(&PipelineError::from(e)).red());
                if let Some(session) = acquisition.session() {
                    println!("📷 Still using the {} camera", session.facing_mode());
                }
            }
        },
        "close" => {
            acquisition.close_camera();
            println!("📷 Camera closed");
        }
        "capture" => match acquisition.capture_frame().await {
            Ok(image) => food_cmd::run_analysis(analyzer, &image).await,
            Err(e) => println!("{}", food_cmd::describe_error(&PipelineError::from(e)).red()),
        },
        "status" => match acquisition.session() {
            Some(session) => println!("📷 {} camera is open", session.facing_mode()),
            None => println!("📷 Camera is closed. Use: camera open [front|back]"),
        },
        other => {
            return Err(format!(
                "Unknown camera command '{}'. Available: camera open [front|back], camera switch, camera close, capture",
                other
            ))
        }
    }

    Ok(())
}
