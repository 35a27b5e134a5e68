use crate::models::joins::{ProfileProject, ProjectInterest, ProjectStatus};
use crate::services::{
    auth::Identity,
    collection::Catalog,
    form::{make_schema, ProjectFormSchema},
    methods::MethodError,
};
use serde_json::{json, Value};
use tracing::{info, warn};

pub const ADD_PROJECT_METHOD: &str = "Projects.add";

/**
 * Form schema from what the reference collections hold right now:
 * interest names, profile emails, status names.
 */
pub async fn current_form_schema(catalog: &Catalog) -> Result<ProjectFormSchema, MethodError> {
    let interests: Vec<String> = catalog
        .interests
        .all()
        .await?
        .into_iter()
        .map(|interest| interest.name)
        .collect();
    let participants: Vec<String> = catalog
        .profiles
        .all()
        .await?
        .into_iter()
        .map(|profile| profile.email)
        .collect();
    let statuses: Vec<String> = catalog
        .statuses
        .all()
        .await?
        .into_iter()
        .map(|status| status.name)
        .collect();

    Ok(make_schema(&interests, &participants, &statuses)?)
}

/**
 * Insert a project and its interest, participant and status joins.
 * Nothing is written unless the whole submission validates.
 * Not idempotent: submitting twice stores two projects.
 */
pub async fn add_project(
    catalog: &Catalog,
    requester: Option<&Identity>,
    params: Value,
) -> Result<Value, MethodError> {
    let schema = current_form_schema(catalog).await?;
    let submission = schema.clean(params).inspect_err(|err| {
        warn!("rejected project submission: {}", err);
    })?;

    let project_id = catalog.projects.insert(&submission.to_project()).await?;

    for interest in &submission.interests {
        catalog
            .projects_interests
            .insert(&ProjectInterest {
                id: None,
                project: submission.name.clone(),
                interest: interest.clone(),
            })
            .await?;
    }
    for participant in &submission.participants {
        catalog
            .profiles_projects
            .insert(&ProfileProject {
                id: None,
                profile: participant.clone(),
                project: submission.name.clone(),
            })
            .await?;
    }
    catalog
        .projects_statuses
        .insert(&ProjectStatus {
            id: None,
            project: submission.name.clone(),
            status: submission.status.clone(),
        })
        .await?;

    info!(
        "project {} added by {}",
        submission.name,
        requester.map_or("anonymous", |identity| identity.user_id.as_str())
    );
    Ok(json!({ "projectId": project_id }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{interest::Interest, profile::Profile, status::Status};
    use crate::services::{db::Filter, form::FormError, methods::call};
    use crate::test_support::test_catalog;

    async fn seeded() -> Catalog {
        let catalog = test_catalog();
        catalog.statuses.insert(&Status::new("Proposed")).await.unwrap();
        catalog.interests.insert(&Interest::new("HPC")).await.unwrap();
        catalog
            .profiles
            .insert(&Profile::new("johnson@hawaii.edu", "https://example.com/p.png"))
            .await
            .unwrap();
        catalog
    }

    fn submission() -> Value {
        json!({
            "name": "Radgrad",
            "description": "Degree planning",
            "homepage": "https://radgrad.org",
            "picture": "https://radgrad.org/logo.png",
            "interests": ["HPC"],
            "participants": ["johnson@hawaii.edu"]
        })
    }

    #[tokio::test]
    async fn valid_submission_writes_project_and_joins() {
        let catalog = seeded().await;
        let result = call(&catalog, None, ADD_PROJECT_METHOD, submission())
            .await
            .unwrap();
        assert!(result["projectId"].is_string());

        let projects = catalog.projects.all().await.unwrap();
        assert_eq!(projects.len(), 1);
        assert_eq!(projects[0].status.as_deref(), Some("Proposed"));
        assert_eq!(projects[0].instructor.as_deref(), Some("Dan Port"));

        let interests = catalog
            .projects_interests
            .find(&Filter::eq("project", "Radgrad"))
            .await
            .unwrap();
        assert_eq!(interests.len(), 1);
        assert_eq!(interests[0].interest, "HPC");

        let members = catalog.profiles_projects.all().await.unwrap();
        assert_eq!(members[0].profile, "johnson@hawaii.edu");

        let statuses = catalog.projects_statuses.all().await.unwrap();
        assert_eq!(statuses[0].status, "Proposed");
    }

    #[tokio::test]
    async fn unknown_status_writes_nothing() {
        let catalog = seeded().await;
        let mut params = submission();
        params["status"] = json!("Unknown");

        let err = call(&catalog, None, ADD_PROJECT_METHOD, params).await.unwrap_err();
        assert!(matches!(err, MethodError::Form(FormError::Invalid(_))));
        assert!(catalog.projects.is_empty().await.unwrap());
        assert!(catalog.projects_interests.is_empty().await.unwrap());
        assert!(catalog.projects_statuses.is_empty().await.unwrap());
    }

    #[tokio::test]
    async fn allowed_values_track_the_reference_collections() {
        let catalog = seeded().await;
        let mut params = submission();
        params["interests"] = json!(["Databases"]);
        assert!(call(&catalog, None, ADD_PROJECT_METHOD, params.clone()).await.is_err());

        catalog.interests.insert(&Interest::new("Databases")).await.unwrap();
        assert!(call(&catalog, None, ADD_PROJECT_METHOD, params).await.is_ok());
    }

    #[tokio::test]
    async fn double_submit_creates_duplicates() {
        let catalog = seeded().await;
        call(&catalog, None, ADD_PROJECT_METHOD, submission()).await.unwrap();
        call(&catalog, None, ADD_PROJECT_METHOD, submission()).await.unwrap();
        assert_eq!(catalog.projects.all().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn unknown_method_is_reported() {
        let catalog = test_catalog();
        let err = call(&catalog, None, "Projects.remove", json!({})).await.unwrap_err();
        assert!(matches!(err, MethodError::NotFound(name) if name == "Projects.remove"));
    }
}
