//! Print the transcribot queue using the async `BlossomApi`.
//!
//! Run:
//! `BLOSSOM_EMAIL=.. BLOSSOM_PASSWORD=.. BLOSSOM_API_KEY=.. cargo run --example async_ocr_queue`
//!
//! Optional env vars:
//! - `BLOSSOM_API_URL` (defaults to the local development server)
//! - `BLOSSOM_SOURCE` (defaults to `reddit`)

use blossom_client::{BlossomApi, DEFAULT_BASE_URL};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let email = std::env::var("BLOSSOM_EMAIL").unwrap_or_default();
    let password = std::env::var("BLOSSOM_PASSWORD").unwrap_or_default();
    let api_key = std::env::var("BLOSSOM_API_KEY").unwrap_or_default();
    let base_url = std::env::var("BLOSSOM_API_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_owned());
    let source = std::env::var("BLOSSOM_SOURCE").ok();

    let mut api = BlossomApi::new(email, password, api_key, base_url)?;
    let queue = api.get_ocr_transcriptions(source.as_deref()).await?;

    println!("status: {}", queue.status);
    if let Some(data) = queue.data {
        println!("{}", serde_json::to_string_pretty(&data)?);
    }
    Ok(())
}
