use utilix_client::ParcelLookup;
use utilix_core::{AppConfig, LookupRequest};

/// Runs one lookup and prints the service response as pretty JSON.
///
/// # Errors
///
/// Returns an error if credentials are missing or the lookup fails. Unlike a
/// batch, a single failed lookup is reported to the caller.
pub(crate) async fn run_lookup(
    config: &AppConfig,
    apn: String,
    county: String,
    address: Option<&str>,
    state: Option<&str>,
) -> anyhow::Result<()> {
    let client = crate::build_client(config)?;
    let request = single_request(apn, county, address, state).prepared(&config.default_state);

    let info = client.lookup(&request).await?;
    println!("{}", serde_json::to_string_pretty(&info)?);
    Ok(())
}

fn single_request(
    apn: String,
    county: String,
    address: Option<&str>,
    state: Option<&str>,
) -> LookupRequest {
    LookupRequest {
        row_index: 1,
        apn,
        street_address: address
            .map(str::trim)
            .filter(|a| !a.is_empty())
            .map(str::to_string),
        county,
        state: state.unwrap_or_default().to_string(),
    }
}
