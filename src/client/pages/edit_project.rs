use crate::client::{
    pages::{gated, subscribe_all, PageView},
    GateError, LocalCache, LocalConnection, SubscriptionGate,
};
use crate::models::{
    interest::Interest,
    joins::{ProfileInterest, ProfileProject},
    profile::Profile,
    project::Project,
    status::Status,
    Entity,
};
use crate::services::{
    db::Filter,
    form::{make_schema, FormError, ProjectFormSchema},
    methods::add_project::ADD_PROJECT_METHOD,
    schema::{SchemaError, Violations},
};
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::warn;

pub const ADDED_MESSAGE: &str = "Project added successfully";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NotificationLevel {
    Success,
    Error,
}

/// A transient message shown to the user after a submit.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notification {
    pub level: NotificationLevel,
    pub message: String,
}

impl Notification {
    pub fn success(message: impl Into<String>) -> Self {
        Notification {
            level: NotificationLevel::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Notification {
            level: NotificationLevel::Error,
            message: message.into(),
        }
    }
}

#[derive(Debug)]
pub enum SubmitOutcome {
    /// Rejected locally; shown next to the offending fields and nothing was sent.
    InlineErrors(Violations),
    Notified(Notification),
}

/// The add-project form. Allowed values come from whatever the cache holds.
pub struct EditProjectPage {
    conn: LocalConnection,
    gate: SubscriptionGate,
    cache: Arc<LocalCache>,
    values: Map<String, Value>,
}

impl EditProjectPage {
    pub fn mount(conn: &LocalConnection) -> Self {
        let gate = subscribe_all(
            conn,
            &[
                Interest::COLLECTION,
                Profile::COLLECTION,
                ProfileInterest::COLLECTION,
                ProfileProject::COLLECTION,
                Project::COLLECTION,
                Status::COLLECTION,
            ],
        );
        EditProjectPage {
            conn: conn.clone(),
            gate,
            cache: conn.cache(),
            values: Map::new(),
        }
    }

    pub fn gate(&self) -> &SubscriptionGate {
        &self.gate
    }

    pub async fn wait_ready(&self) -> Result<(), GateError> {
        self.gate.wait(self.conn.ready_timeout()).await
    }

    pub fn form_schema(&self) -> Result<ProjectFormSchema, SchemaError> {
        let all = Filter::all();
        make_schema(
            &self.cache.pluck(Interest::COLLECTION, &all, "name"),
            &self.cache.pluck(Profile::COLLECTION, &all, "email"),
            &self.cache.pluck(Status::COLLECTION, &all, "name"),
        )
    }

    /// The form description, once every subscription is ready.
    pub fn render(&self) -> PageView<Value> {
        match gated(&self.gate, || self.form_schema()) {
            PageView::Ready(Ok(schema)) => PageView::Ready(schema.describe().clone()),
            PageView::Ready(Err(err)) => PageView::Failed(err.to_string()),
            PageView::Loading => PageView::Loading,
            PageView::Failed(reason) => PageView::Failed(reason),
        }
    }

    pub fn values(&self) -> &Map<String, Value> {
        &self.values
    }

    pub fn set(&mut self, field: impl Into<String>, value: impl Into<Value>) {
        self.values.insert(field.into(), value.into());
    }

    pub fn reset(&mut self) {
        self.values.clear();
    }

    /// Submit the current form values.
    pub async fn submit_current(&mut self) -> SubmitOutcome {
        let values = Value::Object(self.values.clone());
        self.submit(values).await
    }

    /**
     * Validate against the schema derived from the cache, then call
     * `Projects.add`. The form keeps the submitted values unless the call
     * succeeds.
     */
    pub async fn submit(&mut self, values: Value) -> SubmitOutcome {
        if let Value::Object(fields) = &values {
            self.values = fields.clone();
        }
        if !self.gate.is_ready() {
            return SubmitOutcome::Notified(Notification::error("The form is still loading"));
        }

        let schema = match self.form_schema() {
            Ok(schema) => schema,
            Err(err) => return SubmitOutcome::Notified(Notification::error(err.to_string())),
        };
        match schema.clean(values.clone()) {
            Ok(_) => {}
            Err(FormError::Invalid(violations)) => return SubmitOutcome::InlineErrors(violations),
            Err(err) => return SubmitOutcome::Notified(Notification::error(err.to_string())),
        }

        match self.conn.call(ADD_PROJECT_METHOD, values).await {
            Ok(_) => {
                self.reset();
                SubmitOutcome::Notified(Notification::success(ADDED_MESSAGE))
            }
            Err(failure) => {
                warn!("{} failed: {}", ADD_PROJECT_METHOD, failure.reason);
                SubmitOutcome::Notified(Notification::error(failure.reason))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::test_state;
    use crate::AppState;
    use serde_json::json;

    async fn seed(state: &AppState) {
        let catalog = &state.catalog;
        catalog.interests.insert(&Interest::new("HPC")).await.unwrap();
        catalog.statuses.insert(&Status::new("Proposed")).await.unwrap();
        catalog
            .profiles
            .insert(&Profile::new("johnson@hawaii.edu", "https://example.com/johnson.jpg"))
            .await
            .unwrap();
    }

    async fn ready_page(state: AppState) -> EditProjectPage {
        let conn = LocalConnection::connect(state, None).await;
        let page = EditProjectPage::mount(&conn);
        page.wait_ready().await.unwrap();
        page
    }

    fn bowfolios() -> Value {
        json!({
            "name": "Bowfolios",
            "description": "Profiles, projects and interests",
            "homepage": "https://bowfolios.github.io",
            "picture": "https://bowfolios.github.io/logo.png",
            "interests": ["HPC"],
            "participants": ["johnson@hawaii.edu"]
        })
    }

    #[tokio::test]
    async fn renders_loading_then_the_derived_form() {
        let (state, _) = test_state();
        seed(&state).await;
        let conn = LocalConnection::connect(state, None).await;
        let page = EditProjectPage::mount(&conn);
        assert_eq!(page.gate().handles().len(), 6);
        assert_eq!(page.render(), PageView::Loading);

        page.wait_ready().await.unwrap();
        let PageView::Ready(form) = page.render() else {
            panic!("form should be ready");
        };
        assert_eq!(form["properties"]["interests"]["items"]["enum"], json!(["HPC"]));
        assert_eq!(
            form["properties"]["participants"]["items"]["enum"],
            json!(["johnson@hawaii.edu"])
        );
        assert_eq!(form["properties"]["status"]["enum"], json!(["Proposed"]));
    }

    #[tokio::test]
    async fn submit_adds_the_project_and_resets() {
        let (state, _) = test_state();
        seed(&state).await;
        let catalog = state.catalog.clone();
        let mut page = ready_page(state).await;

        match page.submit(bowfolios()).await {
            SubmitOutcome::Notified(note) => {
                assert_eq!(note, Notification::success(ADDED_MESSAGE))
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
        assert!(page.values().is_empty());

        let stored = catalog.projects.all().await.unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].status.as_deref(), Some("Proposed"));
        assert_eq!(stored[0].instructor.as_deref(), Some("Dan Port"));
    }

    #[tokio::test]
    async fn unknown_status_is_rejected_inline() {
        let (state, _) = test_state();
        seed(&state).await;
        let catalog = state.catalog.clone();
        let mut page = ready_page(state).await;

        let mut values = bowfolios();
        values["status"] = json!("Unknown");
        match page.submit(values).await {
            SubmitOutcome::InlineErrors(violations) => assert!(violations.touches("/status")),
            other => panic!("unexpected outcome: {other:?}"),
        }
        assert_eq!(page.values()["status"], json!("Unknown"));
        assert!(catalog.projects.is_empty().await.unwrap());
    }

    #[tokio::test]
    async fn interests_outside_the_cache_are_rejected() {
        let (state, _) = test_state();
        seed(&state).await;
        let mut page = ready_page(state).await;

        page.set("name", "Bowfolios");
        page.set("description", "Profiles");
        page.set("homepage", "https://bowfolios.github.io");
        page.set("picture", "https://bowfolios.github.io/logo.png");
        page.set("interests", json!(["Underwater Basket Weaving"]));
        match page.submit_current().await {
            SubmitOutcome::InlineErrors(violations) => assert!(violations.touches("/interests")),
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[tokio::test]
    async fn server_rejection_becomes_an_error_notification() {
        let (state, _) = test_state();
        seed(&state).await;
        let catalog = state.catalog.clone();
        let conn = LocalConnection::connect(state, None).await;
        let mut page = EditProjectPage::mount(&conn);
        page.wait_ready().await.unwrap();

        // known locally, never stored on the server
        let mut ghost = Map::new();
        ghost.insert("name".to_string(), json!("Ghost"));
        conn.cache().insert(Interest::COLLECTION, "ghost-id", ghost);

        let mut values = bowfolios();
        values["interests"] = json!(["Ghost"]);
        match page.submit(values).await {
            SubmitOutcome::Notified(note) => assert_eq!(note.level, NotificationLevel::Error),
            other => panic!("unexpected outcome: {other:?}"),
        }
        assert!(!page.values().is_empty());
        assert!(catalog.projects.is_empty().await.unwrap());
    }
}
