// Prevents additional console window on Windows in release, DO NOT REMOVE!!
#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

use clap::Parser;
use mentor_feedback_lib::FeedbackConfig;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "mentor-feedback")]
#[command(about = "MentiBY cohort feedback form")]
struct Cli {
    /// Settings file to read instead of the default feedback.toml
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let config = match FeedbackConfig::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Invalid configuration: {}", e);
            std::process::exit(1);
        }
    };

    println!("\n=== Starting Mentor Feedback ===");
    if let Err(e) = mentor_feedback_lib::run(config) {
        eprintln!("Error running application: {:#}", e);
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_flag_is_optional() {
        let cli = Cli::try_parse_from(["mentor-feedback"]).unwrap();
        assert_eq!(cli.config, None);

        let cli = Cli::try_parse_from(["mentor-feedback", "--config", "prod.toml"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("prod.toml")));
    }

    #[test]
    fn test_bad_arguments_are_refused() {
        assert!(Cli::try_parse_from(["mentor-feedback", "--config"]).is_err());
        assert!(Cli::try_parse_from(["mentor-feedback", "--conifg", "prod.toml"]).is_err());
    }
}
