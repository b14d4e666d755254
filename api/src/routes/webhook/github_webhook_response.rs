use serde::Serialize;

/// Acknowledgement returned for every accepted webhook delivery.
#[derive(Debug, Serialize)]
pub struct WebhookAck {
    /// `scheduled` when a scan was started, `ignored` otherwise.
    pub status: &'static str,
    /// Value of `X-GitHub-Delivery`, when the sender provided one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delivery: Option<String>,
    pub message: String,
}
