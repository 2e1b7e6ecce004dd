//! Conversion from reqwest responses to response snapshots

use lro_core::ResponseSnapshot;

/// Reads a response fully into a snapshot
pub(crate) async fn capture(response: reqwest::Response) -> reqwest::Result<ResponseSnapshot> {
    let status = response.status().as_u16();
    let headers = response
        .headers()
        .iter()
        .filter_map(|(name, value)| {
            value
                .to_str()
                .ok()
                .map(|value| (name.as_str().to_string(), value.to_string()))
        })
        .collect();
    let body = response.text().await?;

    Ok(ResponseSnapshot {
        status,
        headers,
        body,
    })
}
