use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{error, warn};

use crate::commission_engine::{CommissionEngine, CommissionError};
use crate::domain::{ClientId, CsvRow, TransactionRecord};

pub type SharedMap<K, V> = Arc<RwLock<HashMap<K, V>>>;

/// Fee-column marker for rows that failed enum validation or could not be
/// priced; the batch always continues past them.
pub const INVALID_DATA_SENTINEL: &str = "Invalid Data";

const MAX_WORKERS: usize = 4;

/// An input row with its computed fee column: either the formatted fee or the
/// invalid-data sentinel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessedRow {
    pub row: CsvRow,
    pub commission: String,
}

/// Feeds validated records to the commission engine. Records are grouped by
/// client and each client's records run on one worker in input order, because
/// the weekly allowance gating is order sensitive. Clients have no shared
/// state, so up to `MAX_WORKERS` clients are priced concurrently.
pub struct BatchProcessor {
    engine: Arc<CommissionEngine>,
}

impl BatchProcessor {
    pub fn new(engine: CommissionEngine) -> Self {
        BatchProcessor {
            engine: Arc::new(engine),
        }
    }

    /// Processes a whole statement and returns one output row per input row,
    /// in input order.
    pub async fn process(&self, rows: Vec<CsvRow>) -> Vec<ProcessedRow> {
        let outcomes: SharedMap<usize, String> = Arc::new(RwLock::new(HashMap::new()));

        // Validate rows upfront; invalid ones never reach the engine.
        let mut client_records: HashMap<ClientId, Vec<(usize, TransactionRecord)>> = HashMap::new();
        for (index, row) in rows.iter().enumerate() {
            match TransactionRecord::try_from(row) {
                Ok(record) => {
                    client_records
                        .entry(record.client_id)
                        .or_default()
                        .push((index, record));
                }
                Err(err) => {
                    let err = CommissionError::from(err);
                    error!(row = index, %err, "rejecting row");
                    outcomes
                        .write()
                        .await
                        .insert(index, INVALID_DATA_SENTINEL.to_string());
                }
            }
        }

        // Spawn per-client workers in bounded waves.
        let groups: Vec<(ClientId, Vec<(usize, TransactionRecord)>)> =
            client_records.into_iter().collect();
        for wave in groups.chunks(MAX_WORKERS) {
            let mut handles = Vec::with_capacity(wave.len());
            for (client_id, records) in wave {
                let client_id = *client_id;
                let records = records.clone();
                let engine = Arc::clone(&self.engine);
                let outcomes = Arc::clone(&outcomes);

                handles.push(tokio::spawn(async move {
                    Self::process_client_records(client_id, records, engine, outcomes).await;
                }));
            }
            for handle in handles {
                if let Err(err) = handle.await {
                    error!(%err, "client worker panicked");
                }
            }
        }

        // Reassemble in input order.
        let outcomes = outcomes.read().await;
        rows.into_iter()
            .enumerate()
            .map(|(index, row)| ProcessedRow {
                row,
                commission: outcomes
                    .get(&index)
                    .cloned()
                    .unwrap_or_else(|| INVALID_DATA_SENTINEL.to_string()),
            })
            .collect()
    }

    /// Prices one client's records strictly in input order.
    async fn process_client_records(
        client_id: ClientId,
        records: Vec<(usize, TransactionRecord)>,
        engine: Arc<CommissionEngine>,
        outcomes: SharedMap<usize, String>,
    ) {
        for (index, record) in records {
            let outcome = match engine.compute_commission(&record).await {
                Ok(fee) => format!("{fee:.2}"),
                Err(err) => {
                    warn!(row = index, client = client_id, %err, "could not price row");
                    INVALID_DATA_SENTINEL.to_string()
                }
            };
            outcomes.write().await.insert(index, outcome);
        }
    }
}
