//! Interactive dispatcher for weather-alert notifications.
//!
//! Prompts for a township code, a title and a body, then publishes one
//! notification to the township's topic. Empty input at any prompt aborts.
//! There are no flags and no retry; errors are printed and the process exits
//! non-zero.

use std::io::{self, Write};
use std::sync::Arc;

use skywarn_common::models::{is_valid_township_code, weather_topic};
use skywarn_common::services::TopicMessagingService;
use skywarn_config::load_config;
use skywarn_fcm::{FcmClient, FcmMessagingService};

fn ask(prompt: &str) -> String {
    print!("{}", prompt);
    io::stdout().flush().expect("Failed to flush stdout");
    let mut line = String::new();
    io::stdin()
        .read_line(&mut line)
        .expect("Failed to read stdin");
    line.trim().to_string()
}

#[tokio::main]
async fn main() {
    println!("--- Send FCM topic notification ---");

    let township_code = ask("Target township code (e.g. TPE-100): ");
    if township_code.is_empty() {
        println!("Township code must not be empty.");
        return;
    }
    if !is_valid_township_code(&township_code) {
        println!("Township code must be three letters, a hyphen and three digits (e.g. TPE-100).");
        return;
    }

    let title = ask("Notification title: ");
    if title.is_empty() {
        println!("Notification title must not be empty.");
        return;
    }

    let body = ask("Notification body: ");
    if body.is_empty() {
        println!("Notification body must not be empty.");
        return;
    }

    let config = match load_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load config: {}", e);
            std::process::exit(1);
        }
    };
    let firebase = match config.firebase {
        Some(firebase) => firebase,
        None => {
            eprintln!("Missing [firebase] configuration.");
            std::process::exit(1);
        }
    };
    let messaging = FcmMessagingService::new(Arc::new(FcmClient::new(firebase)));

    let topic = weather_topic(&township_code);
    println!("\nSending notification to topic '{}'...", topic);

    match messaging.send_to_topic(&topic, &title, &body).await {
        Ok(message_id) => println!("Successfully sent message: {}", message_id),
        Err(e) => {
            eprintln!("Error sending message: {}", e);
            std::process::exit(1);
        }
    }
}
