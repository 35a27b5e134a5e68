use crate::client::{
    pages::{gated, subscribe_all, PageView},
    GateError, LocalCache, LocalConnection, SubscriptionGate,
};
use crate::models::{
    joins::{ProfileProject, ProjectInterest},
    profile::Profile,
    project::Project,
    Entity,
};
use crate::services::db::Filter;
use rand::{seq::SliceRandom, Rng};
use serde::Serialize;
use std::sync::Arc;

/// A project with the names of its interests and its participants' pictures.
#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct ProjectCard {
    #[serde(flatten)]
    pub project: Project,
    pub interests: Vec<String>,
    pub participants: Vec<String>,
}

/**
 * Assemble the card for a project from the local cache.
 * Participants without a profile record contribute no picture.
 */
pub fn project_data(cache: &LocalCache, name: &str) -> Option<ProjectCard> {
    let project = cache
        .records::<Project>(&Filter::eq("name", name))
        .into_iter()
        .next()?;
    let interests = cache
        .records::<ProjectInterest>(&Filter::eq("project", name))
        .into_iter()
        .map(|join| join.interest)
        .collect();
    let participants = cache
        .records::<ProfileProject>(&Filter::eq("project", name))
        .into_iter()
        .filter_map(|join| {
            cache
                .records::<Profile>(&Filter::eq("email", join.profile))
                .into_iter()
                .next()
                .map(|profile| profile.picture)
        })
        .collect();

    Some(ProjectCard {
        project,
        interests,
        participants,
    })
}

/// Shows one project, picked at random, as a card.
pub struct SingleProjectPage {
    gate: SubscriptionGate,
    cache: Arc<LocalCache>,
}

impl SingleProjectPage {
    pub fn mount(conn: &LocalConnection) -> Self {
        let gate = subscribe_all(
            conn,
            &[
                ProfileProject::COLLECTION,
                Project::COLLECTION,
                ProjectInterest::COLLECTION,
                Profile::COLLECTION,
            ],
        );
        SingleProjectPage {
            gate,
            cache: conn.cache(),
        }
    }

    pub fn gate(&self) -> &SubscriptionGate {
        &self.gate
    }

    pub async fn wait_ready(&self, conn: &LocalConnection) -> Result<(), GateError> {
        self.gate.wait(conn.ready_timeout()).await
    }

    pub fn render(&self) -> PageView<Option<ProjectCard>> {
        self.render_with(&mut rand::thread_rng())
    }

    pub fn render_with<R: Rng + ?Sized>(&self, rng: &mut R) -> PageView<Option<ProjectCard>> {
        gated(&self.gate, || {
            let cards: Vec<ProjectCard> = self
                .cache
                .records::<Project>(&Filter::all())
                .iter()
                .filter_map(|project| project_data(&self.cache, &project.name))
                .collect();
            cards.choose(rng).cloned()
        })
    }
}
