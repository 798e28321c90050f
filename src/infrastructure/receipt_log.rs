use crate::domain::ports::ReceiptSink;
use crate::error::Result;
use chrono::Utc;
use rust_decimal::Decimal;
use std::fs;
use std::io::Write;
use std::path::PathBuf;
use tracing::{error, info};

/// Writes one receipt line per forwarding invocation to a timestamped file
/// under the log directory, mirroring it to the console.
pub struct FsReceiptLog {
    dir: PathBuf,
}

impl FsReceiptLog {
    pub fn new(dir: PathBuf) -> Result<Self> {
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }
}

impl ReceiptSink for FsReceiptLog {
    fn record(
        &self,
        destination: &str,
        amount: Decimal,
        success: bool,
        message: &str,
    ) -> Result<()> {
        let now = Utc::now();
        let line = if success {
            format!("{now} - Transaction to {destination} for {amount} XLM: Success\n")
        } else {
            format!("{now} - Transaction to {destination} for {amount} XLM: Failed - {message}\n")
        };

        if success {
            info!(%destination, %amount, "forward succeeded");
        } else {
            error!(%destination, %amount, %message, "forward failed");
        }

        let path = self
            .dir
            .join(format!("log_{}.txt", now.format("%Y-%m-%d_%H-%M-%S")));
        let mut file = fs::OpenOptions::new().create(true).append(true).open(path)?;
        file.write_all(line.as_bytes())?;
        Ok(())
    }
}
