//! Cancellation for work owned by a view.
//!
//! A view creates a [`ViewScope`] and hands [`ScopeHandle`]s to the services
//! it drives. Cancelling or dropping the scope aborts pending reads and stops
//! any later result from being committed.

use std::future::Future;

use tokio::sync::watch;
use tracing::debug;

use crate::error::AppError;

#[derive(Debug)]
pub struct ViewScope {
    tx: watch::Sender<bool>,
}

impl ViewScope {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx }
    }

    pub fn handle(&self) -> ScopeHandle {
        ScopeHandle {
            rx: Some(self.tx.subscribe()),
        }
    }

    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.tx.borrow()
    }
}

impl Default for ViewScope {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for ViewScope {
    fn drop(&mut self) {
        self.tx.send_replace(true);
    }
}

#[derive(Debug, Clone)]
pub struct ScopeHandle {
    rx: Option<watch::Receiver<bool>>,
}

impl ScopeHandle {
    /// Handle that is never cancelled, for work without an owning view.
    pub fn detached() -> Self {
        Self { rx: None }
    }

    pub fn is_cancelled(&self) -> bool {
        match &self.rx {
            Some(rx) => *rx.borrow() || rx.has_changed().is_err(),
            None => false,
        }
    }

    pub async fn cancelled(&self) {
        match &self.rx {
            Some(rx) => {
                let mut rx = rx.clone();
                let _ = rx.wait_for(|cancelled| *cancelled).await;
            }
            None => std::future::pending::<()>().await,
        }
    }

    /// Runs `fut` unless the scope is cancelled first.
    pub async fn run<F, T>(&self, fut: F) -> Result<T, AppError>
    where
        F: Future<Output = Result<T, AppError>>,
    {
        if self.is_cancelled() {
            return Err(AppError::Cancelled);
        }
        tokio::select! {
            biased;
            _ = self.cancelled() => {
                debug!("view scope cancelled, dropping in-flight request");
                Err(AppError::Cancelled)
            }
            res = fut => res,
        }
    }

    /// Fails with `Cancelled` if the owning view is gone.
    pub fn ensure_active(&self) -> Result<(), AppError> {
        if self.is_cancelled() {
            Err(AppError::Cancelled)
        } else {
            Ok(())
        }
    }
}
