use std::time::Duration;

use anyhow::Result;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use backend_domain::{SyntheticTransaction, TransactionCore};

#[derive(Debug, Serialize)]
pub struct PredictPayload<'a> {
    #[serde(flatten)]
    pub core: &'a TransactionCore,
    pub processed_at: String,
}

impl<'a> PredictPayload<'a> {
    pub fn from_synthetic(transaction: &'a SyntheticTransaction) -> Self {
        Self {
            core: &transaction.core,
            processed_at: transaction.processed_at_text(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct PredictReply {
    prediction: u8,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StreamSummary {
    pub sent: usize,
    pub failed: usize,
    pub predicted_fraud: usize,
}

/// Posts generated transactions to the prediction endpoint.
pub struct TransactionSender {
    client: Client,
    url: String,
}

impl TransactionSender {
    pub fn new(url: &str, timeout_seconds: u64) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_seconds.max(1)))
            .build()?;
        Ok(Self {
            client,
            url: url.to_string(),
        })
    }

    pub async fn send(&self, transaction: &SyntheticTransaction) -> Result<u8> {
        let reply = self
            .client
            .post(&self.url)
            .json(&PredictPayload::from_synthetic(transaction))
            .send()
            .await?
            .error_for_status()?
            .json::<PredictReply>()
            .await?;
        Ok(reply.prediction)
    }

    /// Sends every transaction once, pausing `delay` between requests.
    /// Failures are logged and skipped; nothing is retried.
    pub async fn stream<I>(&self, transactions: I, delay: Duration) -> StreamSummary
    where
        I: IntoIterator<Item = SyntheticTransaction>,
    {
        let mut summary = StreamSummary::default();
        for (index, transaction) in transactions.into_iter().enumerate() {
            if index > 0 && !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            match self.send(&transaction).await {
                Ok(prediction) => {
                    summary.sent += 1;
                    if prediction == 1 {
                        summary.predicted_fraud += 1;
                    }
                    info!(
                        index,
                        merchant = %transaction.core.merchant,
                        amt = transaction.core.amt,
                        labelled_fraud = transaction.is_fraud,
                        prediction,
                        "transaction sent"
                    );
                }
                Err(err) => {
                    summary.failed += 1;
                    warn!(index, "failed to send transaction: {}", err);
                }
            }
        }
        summary
    }
}
