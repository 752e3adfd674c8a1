use std::io;

use payamgah::{
    Credentials, LineNumber, MessageText, OneOrMany, Recipient, RestClient, SendOptions,
    SendRequest, SmsGateway,
};

fn required_var(name: &str) -> Result<String, io::Error> {
    std::env::var(name).map_err(|_| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("{name} environment variable is required"),
        )
    })
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let username = required_var("PAYAMGAH_USERNAME")?;
    let domain = required_var("PAYAMGAH_DOMAIN")?;
    let password = required_var("PAYAMGAH_PASSWORD")?;
    let line = required_var("PAYAMGAH_LINE")?;
    let recipient = required_var("PAYAMGAH_RECIPIENT")?;
    let message = std::env::var("PAYAMGAH_MESSAGE")
        .unwrap_or_else(|_| "Hello from the payamgah example.".to_owned());

    let credentials = Credentials::with_domain(username, domain, password)?;
    let client = RestClient::new(credentials, LineNumber::new(line)?)?;

    let request = SendRequest::new(
        vec![Recipient::new(recipient)?],
        OneOrMany::One(MessageText::new(message)?),
        SendOptions::default(),
    )?;

    let report = client.send(request).await?;
    for outcome in report.outcomes() {
        println!(
            "{}: {:?} ({})",
            outcome.recipient.as_str(),
            outcome.disposition,
            outcome.status_text.as_deref().unwrap_or("-"),
        );
    }
    println!("accepted: {}, rejected: {}", report.accepted(), report.rejected());

    Ok(())
}
