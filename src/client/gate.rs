use crate::client::{SubscriptionHandle, SubscriptionStatus};
use futures::future::try_join_all;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum GateError {
    #[error("still loading after {waited:?}, waiting on {pending:?}")]
    TimedOut {
        waited: Duration,
        pending: Vec<String>,
    },

    #[error("subscription {channel} failed: {reason}")]
    Failed { channel: String, reason: String },
}

#[derive(Clone, Debug, PartialEq)]
pub enum GateState {
    Loading,
    Ready,
    Failed { channel: String, reason: String },
}

/**
 * All-or-nothing readiness over a page's subscriptions.
 * Ready only once every handle is ready; a single failure fails the gate.
 */
pub struct SubscriptionGate {
    handles: Vec<SubscriptionHandle>,
}

impl SubscriptionGate {
    pub fn new(handles: Vec<SubscriptionHandle>) -> Self {
        SubscriptionGate { handles }
    }

    pub fn handles(&self) -> &[SubscriptionHandle] {
        &self.handles
    }

    pub fn state(&self) -> GateState {
        let mut all_ready = true;
        for handle in &self.handles {
            match handle.status() {
                SubscriptionStatus::Failed(reason) => {
                    return GateState::Failed {
                        channel: handle.name().to_string(),
                        reason,
                    }
                }
                SubscriptionStatus::Pending => all_ready = false,
                SubscriptionStatus::Ready => {}
            }
        }
        if all_ready {
            GateState::Ready
        } else {
            GateState::Loading
        }
    }

    pub fn is_ready(&self) -> bool {
        self.state() == GateState::Ready
    }

    /// Wait for every subscription, giving up after `timeout`.
    pub async fn wait(&self, timeout: Duration) -> Result<(), GateError> {
        let settled = self.handles.iter().map(|handle| async move {
            match handle.settled().await {
                SubscriptionStatus::Failed(reason) => Err(GateError::Failed {
                    channel: handle.name().to_string(),
                    reason,
                }),
                _ => Ok(()),
            }
        });

        match tokio::time::timeout(timeout, try_join_all(settled)).await {
            Ok(outcome) => outcome.map(|_| ()),
            Err(_) => Err(GateError::TimedOut {
                waited: timeout,
                pending: self
                    .handles
                    .iter()
                    .filter(|handle| handle.status() == SubscriptionStatus::Pending)
                    .map(|handle| handle.name().to_string())
                    .collect(),
            }),
        }
    }
}
