use crate::client::LocalCache;
use crate::services::{
    auth::Identity,
    socket::{MethodFailure, ServerMessage, Session},
};
use crate::AppState;
use dashmap::DashMap;
use serde_json::Value;
use std::{
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
    time::Duration,
};
use tokio::{
    sync::{
        mpsc::{self, UnboundedReceiver},
        oneshot, watch,
    },
    task::JoinHandle,
};
use tracing::{debug, warn};

#[derive(Clone, Debug, PartialEq)]
pub enum SubscriptionStatus {
    Pending,
    Ready,
    Failed(String),
}

/// A client's view of one subscription. `Ready` is terminal.
#[derive(Clone)]
pub struct SubscriptionHandle {
    id: String,
    name: String,
    status: watch::Receiver<SubscriptionStatus>,
}

impl SubscriptionHandle {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn status(&self) -> SubscriptionStatus {
        self.status.borrow().clone()
    }

    pub fn ready(&self) -> bool {
        self.status() == SubscriptionStatus::Ready
    }

    /// Wait until the subscription is ready or has failed.
    pub async fn settled(&self) -> SubscriptionStatus {
        let mut status = self.status.clone();
        let settled = match status
            .wait_for(|s| *s != SubscriptionStatus::Pending)
            .await
        {
            Ok(settled) => settled.clone(),
            Err(_) => SubscriptionStatus::Failed("connection closed".to_string()),
        };
        settled
    }
}

type Subscriptions = DashMap<String, watch::Sender<SubscriptionStatus>>;
type PendingCalls = DashMap<String, oneshot::Sender<Result<Value, MethodFailure>>>;

struct Inner {
    session: Arc<Session>,
    cache: Arc<LocalCache>,
    subscriptions: Arc<Subscriptions>,
    calls: Arc<PendingCalls>,
    next_id: AtomicU64,
    ready_timeout: Duration,
    pump: JoinHandle<()>,
}

impl Drop for Inner {
    fn drop(&mut self) {
        self.pump.abort();
        self.session.close();
    }
}

/**
 * A client connected in-process to the publication engine.
 * Cloning shares the connection; the last clone closes it.
 */
#[derive(Clone)]
pub struct LocalConnection {
    inner: Arc<Inner>,
}

impl LocalConnection {
    pub async fn connect(state: AppState, identity: Option<Identity>) -> Self {
        let ready_timeout = state.config.subscription_timeout;
        let (tx, rx) = mpsc::unbounded_channel();
        let cache = Arc::new(LocalCache::new());
        let subscriptions = Arc::new(Subscriptions::new());
        let calls = Arc::new(PendingCalls::new());

        let pump = tokio::spawn(pump(rx, cache.clone(), subscriptions.clone(), calls.clone()));
        let session = Session::new(state, identity, tx);
        session.start().await;

        LocalConnection {
            inner: Arc::new(Inner {
                session,
                cache,
                subscriptions,
                calls,
                next_id: AtomicU64::new(1),
                ready_timeout,
                pump,
            }),
        }
    }

    pub fn cache(&self) -> Arc<LocalCache> {
        self.inner.cache.clone()
    }

    pub fn ready_timeout(&self) -> Duration {
        self.inner.ready_timeout
    }

    fn next_id(&self) -> String {
        self.inner.next_id.fetch_add(1, Ordering::SeqCst).to_string()
    }

    /// Returns at once with a pending handle; the publication runs in the background.
    pub fn subscribe(&self, name: &str) -> SubscriptionHandle {
        let id = self.next_id();
        let (sender, status) = watch::channel(SubscriptionStatus::Pending);
        self.inner.subscriptions.insert(id.clone(), sender);

        let session = self.inner.session.clone();
        let (sub_id, channel) = (id.clone(), name.to_string());
        tokio::spawn(async move { session.subscribe(sub_id, &channel).await });

        SubscriptionHandle {
            id,
            name: name.to_string(),
            status,
        }
    }

    pub fn unsubscribe(&self, handle: &SubscriptionHandle) {
        self.inner.session.unsubscribe(handle.id());
    }

    /// Invoke a remote method and wait for its result.
    pub async fn call(&self, method: &str, params: Value) -> Result<Value, MethodFailure> {
        let id = self.next_id();
        let (sender, receiver) = oneshot::channel();
        self.inner.calls.insert(id.clone(), sender);
        self.inner.session.call(id, method, params).await;

        receiver.await.unwrap_or_else(|_| {
            Err(MethodFailure {
                error: 503,
                reason: "connection closed".to_string(),
            })
        })
    }
}

fn settle(subscriptions: &Subscriptions, id: &str, status: SubscriptionStatus) {
    if let Some(sender) = subscriptions.get(id) {
        sender.send_if_modified(|current| {
            if *current == SubscriptionStatus::Pending {
                *current = status;
                true
            } else {
                false
            }
        });
    }
}

async fn pump(
    mut rx: UnboundedReceiver<ServerMessage>,
    cache: Arc<LocalCache>,
    subscriptions: Arc<Subscriptions>,
    calls: Arc<PendingCalls>,
) {
    while let Some(message) = rx.recv().await {
        match message {
            ServerMessage::Added {
                collection,
                id,
                fields,
            } => cache.insert(&collection, &id, fields),
            ServerMessage::Ready { subs } => {
                for id in subs {
                    settle(&subscriptions, &id, SubscriptionStatus::Ready);
                }
            }
            ServerMessage::NoSub { id, error } => match error {
                Some(reason) => settle(&subscriptions, &id, SubscriptionStatus::Failed(reason)),
                None => debug!("subscription {} stopped", id),
            },
            ServerMessage::Result { id, result, error } => {
                if let Some((_, sender)) = calls.remove(&id) {
                    let outcome = match error {
                        Some(failure) => Err(failure),
                        None => Ok(result.unwrap_or(Value::Null)),
                    };
                    let _ = sender.send(outcome);
                }
            }
            ServerMessage::Error { reason } => warn!("server rejected a message: {}", reason),
        }
    }
}
