use std::io;

use payamgah::{ClassicClient, Credentials, LineNumber, SmsGateway};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let username = std::env::var("PAYAMGAH_USERNAME")
        .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "PAYAMGAH_USERNAME is required"))?;
    let password = std::env::var("PAYAMGAH_PASSWORD")
        .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "PAYAMGAH_PASSWORD is required"))?;
    let line = std::env::var("PAYAMGAH_LINE")
        .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "PAYAMGAH_LINE is required"))?;

    let client = ClassicClient::new(Credentials::new(username, password)?, LineNumber::new(line)?)?;

    let info = client.account_info().await?;
    println!("credit: {}", info.credit);
    if let Some(expires_at) = info.expires_at {
        println!("expires at: {expires_at}");
    }

    let pending = client.received_messages_count().await?;
    println!("pending inbound messages: {pending}");

    Ok(())
}
