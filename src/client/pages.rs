use crate::client::{GateState, LocalConnection, SubscriptionGate};
use crate::services::collection::user_publication_name;

pub mod edit_project;
pub mod single_project;

pub use edit_project::{EditProjectPage, Notification, NotificationLevel, SubmitOutcome};
pub use single_project::{project_data, ProjectCard, SingleProjectPage};

/// What a gated page shows. Nothing is read from the cache while loading.
#[derive(Clone, Debug, PartialEq)]
pub enum PageView<T> {
    Loading,
    Ready(T),
    Failed(String),
}

impl<T> PageView<T> {
    pub fn is_loading(&self) -> bool {
        matches!(self, PageView::Loading)
    }
}

/// Subscribe to the user channel of each entity's collection.
pub(crate) fn subscribe_all(conn: &LocalConnection, collections: &[&str]) -> SubscriptionGate {
    SubscriptionGate::new(
        collections
            .iter()
            .map(|collection| conn.subscribe(&user_publication_name(collection)))
            .collect(),
    )
}

/// Render through the gate: `build` only runs once every subscription is ready.
pub(crate) fn gated<T>(gate: &SubscriptionGate, build: impl FnOnce() -> T) -> PageView<T> {
    match gate.state() {
        GateState::Loading => PageView::Loading,
        GateState::Ready => PageView::Ready(build()),
        GateState::Failed { channel, reason } => PageView::Failed(format!("{channel}: {reason}")),
    }
}
