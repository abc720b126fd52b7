use std::{
    env,
    io::{self, BufRead, Write},
};

use futures::stream::{self, StreamExt};
use ipleak_geo::{AppError, GeoRecord, GeoResolver, ProviderConfig};
use tracing::{Instrument, info, span};
use tracing_subscriber::EnvFilter;

// Lookups in flight at once when several addresses are given on the command line
const MAX_IN_FLIGHT: usize = 3;

/// Looks up every address given as an argument and prints the records as JSON,
/// in argument order. Without arguments, reads addresses from stdin one per
/// line until the user inputs "exit" or the input ends.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let config = ProviderConfig::from_env()?;
    let resolver = GeoResolver::default_providers(config)?;

    let ips: Vec<String> = env::args().skip(1).collect();
    if ips.is_empty() {
        interactive(&resolver, io::stdin().lock(), io::stdout(), io::stderr()).await?;
    } else {
        batch(&resolver, ips).await?;
    }

    Ok(())
}

/// Resolve all addresses with bounded concurrency, keeping input order.
async fn batch(resolver: &GeoResolver, ips: Vec<String>) -> anyhow::Result<()> {
    let records: Vec<GeoRecord> = stream::iter(ips)
        .map(|ip| async move {
            resolver
                .lookup(&ip)
                .instrument(span!(tracing::Level::INFO, "lookup", ip = %ip))
                .await
        })
        .buffered(MAX_IN_FLIGHT)
        .collect()
        .await;

    for record in &records {
        println!("{}", render(record)?);
    }
    Ok(())
}

/// Reads addresses from `input` until "exit" or end of input. Records go to
/// `output`, prompts to `prompts`, so the output stays a stream of JSON values.
async fn interactive(
    resolver: &GeoResolver,
    mut input: impl BufRead,
    mut output: impl Write,
    mut prompts: impl Write,
) -> anyhow::Result<()> {
    info!("Enter one IP address per line, `exit` to stop");

    let mut buffer = String::new();
    while prompt(&mut input, &mut prompts, &mut buffer)? {
        let ip = buffer.trim();
        if ip == "exit" {
            info!("User wants to exit");
            break;
        }
        if ip.is_empty() {
            continue;
        }

        let record = resolver
            .lookup(ip)
            .instrument(span!(tracing::Level::INFO, "lookup", ip = %ip))
            .await;
        writeln!(output, "{}", render(&record)?)?;
        output.flush()?;
    }

    Ok(())
}

/// Prints the prompt and reads the next line. Returns false at end of input.
fn prompt(
    input: &mut impl BufRead,
    prompts: &mut impl Write,
    buffer: &mut String,
) -> Result<bool, AppError> {
    write!(prompts, "> ")?;
    prompts.flush()?;
    buffer.clear();
    Ok(input.read_line(buffer)? > 0)
}

fn render(record: &GeoRecord) -> Result<String, AppError> {
    Ok(serde_json::to_string_pretty(record)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn interactive_output_is_only_json() {
        let resolver = GeoResolver::default();
        let input = "1.2.3.4\n\n2001:db8::1\nexit\n8.8.8.8\n".as_bytes();
        let mut output = Vec::new();
        let mut prompts = Vec::new();

        interactive(&resolver, input, &mut output, &mut prompts)
            .await
            .unwrap();

        let records: Vec<serde_json::Value> = serde_json::Deserializer::from_slice(&output)
            .into_iter::<serde_json::Value>()
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(
            records[0],
            serde_json::to_value(GeoRecord::default()).unwrap()
        );
        assert_eq!(String::from_utf8(prompts).unwrap(), "> > > > ");
    }

    #[tokio::test]
    async fn interactive_stops_at_end_of_input() {
        let resolver = GeoResolver::default();
        let mut output = Vec::new();
        let mut prompts = Vec::new();

        interactive(&resolver, "".as_bytes(), &mut output, &mut prompts)
            .await
            .unwrap();

        assert!(output.is_empty());
        assert_eq!(prompts, b"> ");
    }
}
