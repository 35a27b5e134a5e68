use crate::services::db::Document;
use tokio::sync::broadcast;

const FEED_CAPACITY: usize = 1024;

#[derive(Clone, Debug)]
pub struct DocumentAdded {
    pub collection: String,
    pub id: String,
    pub fields: Document,
}

/// Fan-out of inserts to every live subscription.
#[derive(Clone)]
pub struct ChangeFeed {
    sender: broadcast::Sender<DocumentAdded>,
}

impl ChangeFeed {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(FEED_CAPACITY);
        ChangeFeed { sender }
    }

    pub fn announce(&self, event: DocumentAdded) {
        // no receivers just means nobody is subscribed right now
        let _ = self.sender.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<DocumentAdded> {
        self.sender.subscribe()
    }
}

impl Default for ChangeFeed {
    fn default() -> Self {
        Self::new()
    }
}
