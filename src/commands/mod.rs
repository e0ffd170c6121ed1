use colored::Colorize;
use std::sync::Arc;

use crate::food::analysis::FoodAnalyzer;
use crate::food::capture::{CameraBackend, ImageAcquisition};

mod camera;
mod system;

pub mod food_cmd;

/// Whether the REPL keeps reading input after a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

pub struct CommandHandler {
    analyzer: FoodAnalyzer,
    acquisition: ImageAcquisition,
    model: String,
}

impl CommandHandler {
    pub fn new(analyzer: FoodAnalyzer, camera: Arc<dyn CameraBackend>, model: String) -> Self {
        Self {
            analyzer,
            acquisition: ImageAcquisition::new(camera),
            model,
        }
    }

    pub async fn handle_command(&mut self, input: &str) -> Result<Flow, String> {
        let input = input.trim();
        if input.is_empty() {
            return Ok(Flow::Continue);
        }

        // Handle single-word commands first
        match input.to_lowercase().as_str() {
            "help" | "exit" | "quit" => return system::handle_command(input),
            "analysis" | "history" => {
                food_cmd::show_analysis(self.analyzer.session());
                return Ok(Flow::Continue);
            }
            "clear" => {
                self.analyzer.session().clear().await;
                println!("🧹 Stored analysis cleared");
                return Ok(Flow::Continue);
            }
            "model" => {
                println!("🤖 Nutrition data from: {}", self.model.cyan());
                return Ok(Flow::Continue);
            }
            _ => {}
        }

        if input == "upload" || input.starts_with("upload ") {
            food_cmd::upload(&self.analyzer, input["upload".len()..].trim()).await;
            return Ok(Flow::Continue);
        }

        if input == "camera" || input.starts_with("camera ") || input == "capture" {
            camera::handle_command(input, &mut self.acquisition, &self.analyzer).await?;
            return Ok(Flow::Continue);
        }

        Err(format!("Unknown command '{}'. Type 'help' for available commands.", input))
    }

    /// Releases the camera before the REPL exits.
    pub fn shutdown(&mut self) {
        self.acquisition.close_camera();
    }
}
