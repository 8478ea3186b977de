//! # Service Core - Steganography Worker Dispatch
//!
//! Runs encode/decode requests on tokio's blocking thread pool so the
//! CPU-bound pixel and cipher work never stalls the async runtime.
//!
//! A semaphore bounds how many jobs run at once. Every job works on its own
//! copy of the carrier, so a cancelled or abandoned job leaves nothing
//! half-written behind.

use std::sync::Arc;

use image::RgbaImage;
use log::{info, warn};
use tokio::sync::Semaphore;

use crate::error::{Result, StegoError};
use crate::processing::steganography::{self, DecodedContent, Payload};

/// Dispatches steganography jobs onto worker threads.
///
/// Holds no per-request state; concurrent calls are independent.
pub struct ServiceCore {
    semaphore: Arc<Semaphore>,
}

impl ServiceCore {
    /// Create a new service core.
    ///
    /// # Arguments
    /// - `max_concurrent_tasks`: Number of jobs allowed to run at once
    ///
    /// # Example
    /// ```ignore
    /// let core = ServiceCore::new(4);
    /// ```
    pub fn new(max_concurrent_tasks: usize) -> Self {
        Self {
            semaphore: Arc::new(Semaphore::new(max_concurrent_tasks.max(1))),
        }
    }

    /// Embed `payload` into `carrier` on a worker thread.
    ///
    /// # Arguments
    /// - `request_id`: Identifier used for logging only
    /// - `carrier`: Shared cover image; the worker clones it before writing
    /// - `payload`: Text or file to hide
    /// - `password`: Optional encryption password
    /// - `bit_depth`: Payload bits per channel (1 or 2)
    ///
    /// # Returns
    /// - `Ok(RgbaImage)`: The stego image
    /// - `Err`: Any [`StegoError`] from the codec, or [`StegoError::Worker`] if
    ///   the job panicked or was cancelled
    pub async fn encode(
        &self,
        request_id: u64,
        carrier: Arc<RgbaImage>,
        payload: Payload,
        password: Option<String>,
        bit_depth: u8,
    ) -> Result<RgbaImage> {
        let _permit = self.acquire().await?;

        info!(
            "📷 Processing encode request #{} ({}x{}, depth {})",
            request_id,
            carrier.width(),
            carrier.height(),
            bit_depth
        );

        // Pixel and cipher work is CPU-bound; keep it off the async workers.
        let result = tokio::task::spawn_blocking(move || {
            steganography::encode(&carrier, &payload, password.as_deref(), bit_depth)
        })
        .await
        .map_err(|e| StegoError::Worker(format!("encode task failed: {}", e)))?;

        match &result {
            Ok(_) => info!("✅ Completed encode request #{}", request_id),
            Err(e) => warn!("⚠️  Encode request #{} failed: {}", request_id, e),
        }
        result
    }

    /// Recover the payload of `carrier` on a worker thread.
    ///
    /// # Returns
    /// - `Ok(DecodedContent)`: Text or file recovered from the carrier
    /// - `Err`: Any [`StegoError`] from the codec, or [`StegoError::Worker`]
    pub async fn decode(
        &self,
        request_id: u64,
        carrier: Arc<RgbaImage>,
        password: Option<String>,
    ) -> Result<DecodedContent> {
        let _permit = self.acquire().await?;

        info!("🔍 Processing decode request #{}", request_id);

        let result = tokio::task::spawn_blocking(move || {
            steganography::decode(&carrier, password.as_deref())
        })
        .await
        .map_err(|e| StegoError::Worker(format!("decode task failed: {}", e)))?;

        match &result {
            Ok(_) => info!("✅ Completed decode request #{}", request_id),
            Err(e) => warn!("⚠️  Decode request #{} failed: {}", request_id, e),
        }
        result
    }

    /// Number of jobs that could start right now.
    pub fn available_permits(&self) -> usize {
        self.semaphore.available_permits()
    }

    async fn acquire(&self) -> Result<tokio::sync::SemaphorePermit<'_>> {
        self.semaphore
            .acquire()
            .await
            .map_err(|e| StegoError::Worker(e.to_string()))
    }
}
