use crate::models::{
    user::{ROLE_ASSIGNMENT_COLLECTION, USERS_COLLECTION},
    Entity,
};
use crate::services::{
    collection::{Catalog, RecordCollection},
    db::{Database, Filter},
};
use anyhow::{Context, Result};
use serde_json::{Map, Value};
use std::path::PathBuf;
use tokio::task;
use tracing::info;

/**
 * read the seed file off the async runtime
 * the file is one JSON object keyed by collection
 */
pub async fn read_seed_from_disk(path: PathBuf) -> Result<Map<String, Value>> {
    task::spawn_blocking(move || {
        let bytes = std::fs::read(&path)
            .with_context(|| format!("reading seed file {}", path.display()))?;
        let value: Value = serde_json::from_slice(&bytes)
            .with_context(|| format!("parsing seed file {}", path.display()))?;
        match value {
            Value::Object(map) => Ok(map),
            _ => anyhow::bail!("seed file {} must hold a JSON object", path.display()),
        }
    })
    .await?
}

fn entries<'a>(seed: &'a Map<String, Value>, key: &str) -> &'a [Value] {
    seed.get(key)
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

async fn seed_collection<T: Entity>(
    collection: &RecordCollection<T>,
    seed: &Map<String, Value>,
    key: &str,
) -> Result<usize> {
    let documents = entries(seed, key);
    if documents.is_empty() || !collection.is_empty().await? {
        return Ok(0);
    }
    for document in documents {
        collection
            .insert_value(document.clone())
            .await
            .with_context(|| format!("seeding {}", T::COLLECTION))?;
    }
    info!("Seeded {} documents into {}", documents.len(), T::COLLECTION);
    Ok(documents.len())
}

async fn seed_raw(db: &Database, collection: &str, documents: &[Value]) -> Result<usize> {
    if documents.is_empty() || db.find_one(collection, &Filter::all()).await?.is_some() {
        return Ok(0);
    }
    for document in documents {
        let Value::Object(map) = document else {
            anyhow::bail!("{} seed entries must be objects", collection);
        };
        db.insert(collection, map.clone()).await?;
    }
    info!("Seeded {} documents into {}", documents.len(), collection);
    Ok(documents.len())
}

/**
 * Load default data into every collection that is still empty.
 * Catalog documents go through their schemas like any other write.
 */
pub async fn seed_empty_collections(catalog: &Catalog, seed: &Map<String, Value>) -> Result<usize> {
    let mut total = 0;
    total += seed_collection(&catalog.interests, seed, "interests").await?;
    total += seed_collection(&catalog.statuses, seed, "statuses").await?;
    total += seed_collection(&catalog.profiles, seed, "profiles").await?;
    total += seed_collection(&catalog.projects, seed, "projects").await?;
    total += seed_collection(&catalog.profiles_interests, seed, "profilesInterests").await?;
    total += seed_collection(&catalog.profiles_projects, seed, "profilesProjects").await?;
    total += seed_collection(&catalog.projects_interests, seed, "projectsInterests").await?;
    total += seed_collection(&catalog.projects_statuses, seed, "projectsStatuses").await?;
    total += seed_collection(&catalog.comments, seed, "comments").await?;
    total += seed_raw(catalog.db(), USERS_COLLECTION, entries(seed, "users")).await?;
    total += seed_raw(
        catalog.db(),
        ROLE_ASSIGNMENT_COLLECTION,
        entries(seed, "roleAssignments"),
    )
    .await?;
    Ok(total)
}
