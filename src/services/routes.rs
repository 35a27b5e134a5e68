use crate::error::AppError;
use crate::services::{auth::Requester, methods, methods::add_project::current_form_schema};
use crate::AppState;
use axum::{
    extract::{Json, Path, State},
    response::IntoResponse,
};
use serde_json::{json, Value};

/**
 * names of every subscribable publication
 */
pub async fn list_publications(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.publications.names())
}

/**
 * one-shot read of a publication as the requester would first see it
 */
pub async fn publication_snapshot(
    Path(name): Path<String>,
    Requester(identity): Requester,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let documents = state
        .publications
        .snapshot(state.catalog.db(), &name, identity.as_ref())
        .await?;
    Ok(Json(json!({ "publication": name, "documents": documents })))
}

/**
 * add-project form schema derived from the current reference data
 */
pub async fn add_project_form(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let schema = current_form_schema(&state.catalog).await?;
    Ok(Json(schema.describe().clone()))
}

/**
 * api endpoint for remote methods
 */
#[axum::debug_handler(state = AppState)]
pub async fn call_method(
    Path(name): Path<String>,
    Requester(identity): Requester,
    State(state): State<AppState>,
    Json(params): Json<Value>,
) -> Result<impl IntoResponse, AppError> {
    let result = methods::call(&state.catalog, identity.as_ref(), &name, params).await?;
    Ok(Json(json!({ "result": result })))
}

#[cfg(test)]
mod tests {
    use crate::build_router;
    use crate::models::{comment::Comment, interest::Interest, status::Status};
    use crate::test_support::{add_user, test_state};
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use http_body_util::BodyExt;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    async fn body_json(resp: axum::response::Response) -> Value {
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn root_lists_publications() {
        let (state, _) = test_state();
        let resp = build_router(state)
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        let names = body_json(resp).await;
        let names = names.as_array().unwrap();
        assert!(names.contains(&json!("ProjectsCollection.publication.user")));
        assert!(names.contains(&json!("ProjectsCollection.publication.admin")));
    }

    #[tokio::test]
    async fn snapshot_respects_the_bearer_token() {
        let (state, sessions) = test_state();
        let john = add_user(state.catalog.db(), "john").await;
        sessions.insert("tok-john", john.user_id.clone());
        state.catalog.comments.insert(&Comment::new("john", "mine")).await.unwrap();
        state.catalog.comments.insert(&Comment::new("ann", "hers")).await.unwrap();
        let app = build_router(state);

        let uri = "/api/publications/CommentsCollection.publication.user";
        let anonymous = app
            .clone()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(body_json(anonymous).await["documents"], json!([]));

        let signed_in = app
            .oneshot(
                Request::builder()
                    .uri(uri)
                    .header("Authorization", "Bearer tok-john")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let body = body_json(signed_in).await;
        assert_eq!(body["documents"].as_array().unwrap().len(), 1);
        assert_eq!(body["documents"][0]["note"], json!("mine"));
    }

    #[tokio::test]
    async fn unknown_publication_is_404() {
        let (state, _) = test_state();
        let resp = build_router(state)
            .oneshot(
                Request::builder()
                    .uri("/api/publications/Nope.publication.user")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_json(resp).await["error"], json!("not-found"));
    }

    #[tokio::test]
    async fn form_schema_reflects_reference_data() {
        let (state, _) = test_state();
        state.catalog.statuses.insert(&Status::new("Proposed")).await.unwrap();
        state.catalog.interests.insert(&Interest::new("HPC")).await.unwrap();

        let resp = build_router(state)
            .oneshot(
                Request::builder()
                    .uri("/api/forms/add-project")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let schema = body_json(resp).await;
        assert_eq!(schema["properties"]["status"]["enum"], json!(["Proposed"]));
        assert_eq!(schema["properties"]["interests"]["items"]["enum"], json!(["HPC"]));
        assert_eq!(schema["properties"]["participants"]["items"]["enum"], json!([]));
    }

    #[tokio::test]
    async fn add_project_over_http() {
        let (state, _) = test_state();
        state.catalog.statuses.insert(&Status::new("Proposed")).await.unwrap();
        let catalog = state.catalog.clone();
        let app = build_router(state);

        let post = |body: Value| {
            Request::builder()
                .method("POST")
                .uri("/api/methods/Projects.add")
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap()
        };
        let project = json!({
            "name": "Bowfolios",
            "description": "Portfolios",
            "homepage": "https://bowfolios.github.io",
            "picture": "https://bowfolios.github.io/logo.png"
        });

        let resp = app.clone().oneshot(post(project.clone())).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert!(body_json(resp).await["result"]["projectId"].is_string());

        let mut rejected = project;
        rejected["status"] = json!("Unknown");
        let resp = app.oneshot(post(rejected)).await.unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body = body_json(resp).await;
        assert_eq!(body["error"], json!("validation-error"));
        assert!(!body["violations"].as_array().unwrap().is_empty());

        assert_eq!(catalog.projects.all().await.unwrap().len(), 1);
    }
}
