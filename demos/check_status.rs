use std::io;

use payamgah::{
    Credentials, Language, LineNumber, MessageId, RestClient, SmsGateway, StatusQuery, catalog,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let username = std::env::var("PAYAMGAH_USERNAME")
        .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "PAYAMGAH_USERNAME is required"))?;
    let domain = std::env::var("PAYAMGAH_DOMAIN")
        .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "PAYAMGAH_DOMAIN is required"))?;
    let password = std::env::var("PAYAMGAH_PASSWORD")
        .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "PAYAMGAH_PASSWORD is required"))?;
    let id: u64 = std::env::var("PAYAMGAH_MESSAGE_ID")
        .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "PAYAMGAH_MESSAGE_ID is required"))?
        .parse()?;

    let credentials = Credentials::with_domain(username, domain, password)?;
    let client = RestClient::new(credentials, LineNumber::new("98300077")?)?;

    let report = client
        .message_statuses(StatusQuery::one(MessageId::new(id)))
        .await?;
    for status in &report.statuses {
        let text = catalog::rest::delivery_text(status.code, Language::English);
        println!(
            "{}: code {} ({})",
            status.id.value(),
            status.code,
            text.unwrap_or("unknown"),
        );
    }

    Ok(())
}
