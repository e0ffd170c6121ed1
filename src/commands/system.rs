use super::Flow;

pub fn handle_command(input: &str) -> Result<Flow, String> {
    match input.to_lowercase().as_str() {
        "help" => {
            println!("\n🥗 NutriScan Commands:");
            println!("  Snap or upload a photo of your food to see what's in it");
            println!();

            println!("📂 Upload:");
            println!("  upload <path>          - Analyze an image file (jpeg, png, webp, gif)");
            println!();

            println!("📷 Camera Commands:");
            println!("  camera open [front|back] - Start the camera (front by default)");
            println!("  camera switch            - Switch between front and back camera");
            println!("  capture                  - Take a photo and analyze it");
            println!("  camera close             - Stop the camera");
            println!();

            println!("📊 Analysis Commands:");
            println!("  analysis  - Show the latest analysis");
            println!("  clear     - Forget the stored analysis");
            println!("  model     - Show which model provides nutrition data");
            println!();

            println!("⚙️ System Commands:");
            println!("  help  - Show this help menu");
            println!("  exit  - Exit the program");
            Ok(Flow::Continue)
        },
        "exit" | "quit" => {
            println!("👋 Goodbye!");
            Ok(Flow::Exit)
        },
        _ => Err("Unknown system command. Type 'help' for available commands.".to_string())
    }
}
