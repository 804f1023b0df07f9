//! Claim a submission and mark it done with the blocking client.
//!
//! Run:
//! `BLOSSOM_EMAIL=.. BLOSSOM_PASSWORD=.. BLOSSOM_API_KEY=.. cargo run --example blocking_claim_and_done -- <submission_id> <username>`
//!
//! Optional env vars:
//! - `BLOSSOM_API_URL` (defaults to the local development server)

use blossom_client::{BlockingBlossomApi, BlossomStatus, DEFAULT_BASE_URL};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut args = std::env::args().skip(1);
    let (Some(submission_id), Some(username)) = (args.next(), args.next()) else {
        eprintln!("Usage: blocking_claim_and_done <submission_id> <username>");
        std::process::exit(2);
    };

    let email = std::env::var("BLOSSOM_EMAIL").unwrap_or_default();
    let password = std::env::var("BLOSSOM_PASSWORD").unwrap_or_default();
    let api_key = std::env::var("BLOSSOM_API_KEY").unwrap_or_default();
    let base_url = std::env::var("BLOSSOM_API_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_owned());

    let mut api = BlockingBlossomApi::new(email, password, api_key, base_url)?;

    let claimed = api.claim(&submission_id, &username)?;
    if claimed.status != BlossomStatus::Ok {
        println!("claim refused: {}", claimed.status);
        return Ok(());
    }

    let done = api.done(&submission_id, &username, false)?;
    println!("done: {}", done.status);
    if let Some(data) = done.data {
        println!("{}", serde_json::to_string_pretty(&data)?);
    }
    Ok(())
}
