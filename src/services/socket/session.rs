use crate::error::AppError;
use crate::services::{
    auth::Identity,
    db::{Database, Document, DocumentAdded},
    methods,
    publications::{Publication, PublicationError, Query},
    socket::{ClientMessage, MethodFailure, ServerMessage},
};
use crate::AppState;
use dashmap::DashMap;
use serde_json::Value;
use std::{collections::HashSet, sync::Arc};
use tokio::{
    sync::{broadcast::error::RecvError, mpsc::UnboundedSender},
    task::JoinHandle,
};
use tracing::{debug, info, warn};

/**
 * One client connection: its identity, its live subscriptions and the
 * channel its outbound messages go through.
 * Dropping the session stops every subscription it started.
 */
pub struct Session {
    state: AppState,
    identity: Option<Identity>,
    outbound: UnboundedSender<ServerMessage>,
    subscriptions: DashMap<String, JoinHandle<()>>,
    universal: DashMap<usize, JoinHandle<()>>,
}

/// Where a running publication's task is kept. Client ids only ever reach `Named`.
enum Slot {
    Named(String),
    Universal(usize),
}

impl Session {
    pub fn new(
        state: AppState,
        identity: Option<Identity>,
        outbound: UnboundedSender<ServerMessage>,
    ) -> Arc<Self> {
        Arc::new(Session {
            state,
            identity,
            outbound,
            subscriptions: DashMap::new(),
            universal: DashMap::new(),
        })
    }

    pub fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }

    /// Start the unnamed publications every connection receives.
    pub async fn start(&self) {
        let universal: Vec<Arc<dyn Publication>> = self.state.publications.universal().to_vec();
        for (index, publication) in universal.into_iter().enumerate() {
            if let Err(err) = self.run(Slot::Universal(index), publication).await {
                warn!("universal publication {} failed: {}", index, err);
            }
        }
    }

    pub async fn handle(&self, message: ClientMessage) {
        match message {
            ClientMessage::Sub { id, name } => self.subscribe(id, &name).await,
            ClientMessage::Unsub { id } => self.unsubscribe(&id),
            ClientMessage::Method { id, method, params } => self.call(id, &method, params).await,
        }
    }

    pub async fn subscribe(&self, id: String, name: &str) {
        debug!("sub {} -> {}", id, name);
        let outcome = match self.state.publications.get(name) {
            Ok(publication) => self.run(Slot::Named(id.clone()), publication).await,
            Err(err) => Err(err),
        };

        if let Err(err) = outcome {
            info!("subscription {} to {} refused: {}", id, name, err);
            self.send(ServerMessage::NoSub {
                id,
                error: Some(err.to_string()),
            });
        }
    }

    pub fn unsubscribe(&self, id: &str) {
        if let Some((_, task)) = self.subscriptions.remove(id) {
            task.abort();
        }
        self.send(ServerMessage::NoSub {
            id: id.to_string(),
            error: None,
        });
    }

    pub async fn call(&self, id: String, method: &str, params: Value) {
        let outcome = methods::call(&self.state.catalog, self.identity(), method, params).await;
        let message = match outcome {
            Ok(result) => ServerMessage::Result {
                id,
                result: Some(result),
                error: None,
            },
            Err(err) => {
                let err = AppError::from(err);
                ServerMessage::Result {
                    id,
                    result: None,
                    error: Some(MethodFailure {
                        error: err.status().as_u16(),
                        reason: err.to_string(),
                    }),
                }
            }
        };
        self.send(message);
    }

    pub fn reject(&self, reason: impl Into<String>) {
        self.send(ServerMessage::Error {
            reason: reason.into(),
        });
    }

    pub fn close(&self) {
        for entry in self.subscriptions.iter() {
            entry.value().abort();
        }
        for entry in self.universal.iter() {
            entry.value().abort();
        }
        self.subscriptions.clear();
        self.universal.clear();
    }

    fn send(&self, message: ServerMessage) {
        // the receiver only goes away when the connection is closing
        let _ = self.outbound.send(message);
    }

    /**
     * Evaluate a publication for this session: send the initial documents,
     * then `ready` (named subscriptions only), then keep forwarding matching
     * inserts until the subscription is stopped.
     */
    async fn run(
        &self,
        slot: Slot,
        publication: Arc<dyn Publication>,
    ) -> Result<(), PublicationError> {
        let db = self.state.catalog.db().clone();
        let Some(query) = publication.query(&db, self.identity()).await? else {
            self.mark_ready(&slot);
            return Ok(());
        };

        // watch before the initial read so nothing inserted in between is missed
        let feed = db.watch();
        let mut sent = HashSet::new();
        for document in db.find(&query.collection, &query.filter).await? {
            forward(&self.outbound, &query.collection, document, &mut sent);
        }
        self.mark_ready(&slot);

        let task = tokio::spawn(follow(db, query, feed, self.outbound.clone(), sent));
        let previous = match slot {
            Slot::Named(id) => self.subscriptions.insert(id, task),
            Slot::Universal(index) => self.universal.insert(index, task),
        };
        if let Some(previous) = previous {
            previous.abort();
        }
        Ok(())
    }

    fn mark_ready(&self, slot: &Slot) {
        if let Slot::Named(id) = slot {
            self.send(ServerMessage::Ready {
                subs: vec![id.clone()],
            });
        }
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.close();
    }
}

fn forward(
    outbound: &UnboundedSender<ServerMessage>,
    collection: &str,
    document: Document,
    sent: &mut HashSet<String>,
) -> bool {
    let Some(id) = document.get("_id").and_then(Value::as_str).map(str::to_string) else {
        return true;
    };
    if !sent.insert(id.clone()) {
        return true;
    }
    outbound
        .send(ServerMessage::Added {
            collection: collection.to_string(),
            id,
            fields: document,
        })
        .is_ok()
}

async fn follow(
    db: Database,
    query: Query,
    mut feed: tokio::sync::broadcast::Receiver<DocumentAdded>,
    outbound: UnboundedSender<ServerMessage>,
    mut sent: HashSet<String>,
) {
    loop {
        match feed.recv().await {
            Ok(event) => {
                if event.collection != query.collection || !query.filter.matches(&event.fields) {
                    continue;
                }
                if !forward(&outbound, &query.collection, event.fields, &mut sent) {
                    break;
                }
            }
            Err(RecvError::Lagged(skipped)) => {
                warn!(
                    "subscription to {} lagged by {} events, resyncing",
                    query.collection, skipped
                );
                match db.find(&query.collection, &query.filter).await {
                    Ok(documents) => {
                        for document in documents {
                            if !forward(&outbound, &query.collection, document, &mut sent) {
                                return;
                            }
                        }
                    }
                    Err(err) => {
                        warn!("resync of {} failed: {}", query.collection, err);
                        break;
                    }
                }
            }
            Err(RecvError::Closed) => break,
        }
    }
}
