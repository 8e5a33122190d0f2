//! # System Lifecycle & Orchestration
//!
//! [`ApiSystem`] starts the store actors, registers every demo resource with an
//! [`Api`], and tears it all down again.
//!
//! ## Startup
//!
//! 1. **Spawn stores**: one [`StoreActor`](jsonapi_framework::store::StoreActor)
//!    task per stored resource, each with its own id generator. Numeric ids of
//!    created documents start at 100, above the seeded ones.
//! 2. **Register resources**: capabilities first, then relation tables, which
//!    hold clones of the target resources' clients.
//! 3. **Seed** (optional): [`ApiSystem::seed`] fills the stores with demo data.
//!
//! Registration errors are fatal: [`ApiSystem::start`] returns them and nothing
//! is served.
//!
//! ## Graceful Shutdown
//!
//! 1. **Drop the `Api`**: releases the client clones held by registrations and
//!    relation tables.
//! 2. **Drop the clients**: closes the sender side of every store channel.
//! 3. **Await the stores**: each actor drains its queue, logs its final size and exits.
//!
//! The relation graph between stores is acyclic and held only by the `Api`, so
//! dropping it is enough for every channel to close.

use crate::model::{
    Article, ArticleDraft, Author, AuthorDirectory, Tag, TagDraft, User, UserDraft, Widget,
    WidgetDraft,
};
use jsonapi_framework::store::{spawn_store, StoreClient};
use jsonapi_framework::{
    Api, ApiConfig, ConfigError, RelationTable, ResourceError, ResourceRegistration,
};
use tokio::task::JoinHandle;
use tracing::{error, info};

#[derive(Debug, thiserror::Error)]
pub enum SystemError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("seeding failed: {0}")]
    Seed(#[from] ResourceError),
    #[error("store task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Returns an id generator counting up from `first`.
fn sequence<T>(first: u64) -> impl FnMut(&T) -> u64 + Send + 'static {
    let mut next = first;
    move |_: &T| {
        let id = next;
        next += 1;
        id
    }
}

/// The running demo API.
pub struct ApiSystem {
    pub api: Api,
    pub users: StoreClient<User>,
    pub widgets: StoreClient<Widget>,
    pub tags: StoreClient<Tag>,
    pub articles: StoreClient<Article>,
    pub authors: AuthorDirectory,
    handles: Vec<JoinHandle<()>>,
}

impl ApiSystem {
    /// Spawns the stores and registers every resource.
    ///
    /// Must be called inside a Tokio runtime.
    pub fn start(config: ApiConfig) -> Result<Self, SystemError> {
        info!(?config, "Starting API system");
        let buffer = config.store_buffer;

        let (users_handle, users) = spawn_store::<User>(buffer, sequence::<UserDraft>(100));
        let (widgets_handle, widgets) = spawn_store::<Widget>(buffer, sequence::<WidgetDraft>(100));
        let (tags_handle, tags) = spawn_store::<Tag>(buffer, TagDraft::slug);
        let (articles_handle, articles) = spawn_store::<Article>(buffer, ArticleDraft::slug);
        let authors = AuthorDirectory::new([
            Author::new("ada", "Ada Lovelace"),
            Author::new("grace", "Grace Hopper"),
            Author::new("edsger", "Edsger Dijkstra"),
        ]);

        let mut api = Api::new(config);
        api.register(users.registration())?;
        api.register(tags.registration())?;
        api.register(
            ResourceRegistration::new()
                .getter(authors.clone())
                .queryer(authors.clone()),
        )?;
        api.register(
            widgets.registration().relations(
                RelationTable::new()
                    .to_one("owner", |w: &Widget| w.owner, users.clone())
                    .to_many("tags", |w: &Widget| w.tags.clone(), tags.clone()),
            ),
        )?;
        api.register(
            articles.registration().relations(
                RelationTable::new()
                    .to_one("author", |a: &Article| a.author.clone(), authors.clone())
                    .to_many("featured", |a: &Article| a.featured.clone(), widgets.clone()),
            ),
        )?;

        info!(collections = ?api.collections(), "API system ready");
        Ok(Self {
            api,
            users,
            widgets,
            tags,
            articles,
            authors,
            handles: vec![users_handle, widgets_handle, tags_handle, articles_handle],
        })
    }

    /// Fills the stores with a small, fixed data set.
    pub async fn seed(&self) -> Result<(), SystemError> {
        self.users
            .insert(User::new(10, "Ada", "ada@example.com"))
            .await?;
        self.users
            .insert(User::new(11, "Grace", "grace@example.com"))
            .await?;

        for (id, label, color) in [("red", "Red", "#f00"), ("blue", "Blue", "#00f")] {
            self.tags
                .insert(Tag {
                    id: id.to_string(),
                    label: label.to_string(),
                    color: color.to_string(),
                })
                .await?;
        }

        self.widgets
            .insert(Widget::new(1, "Sprocket").owned_by(10).tagged(&["red"]))
            .await?;
        self.widgets
            .insert(Widget::new(2, "Gear").owned_by(10).tagged(&["red", "blue"]))
            .await?;
        self.widgets.insert(Widget::new(3, "Spring")).await?;

        self.articles
            .insert(Article {
                id: "gears-explained".to_string(),
                title: "Gears Explained".to_string(),
                author: Some("ada".to_string()),
                featured: vec![1, 2],
            })
            .await?;

        info!("Demo data seeded");
        Ok(())
    }

    /// Gracefully shuts down every store.
    pub async fn shutdown(self) -> Result<(), SystemError> {
        info!("Shutting down system...");

        drop(self.api);
        drop(self.users);
        drop(self.widgets);
        drop(self.tags);
        drop(self.articles);

        for handle in self.handles {
            if let Err(e) = handle.await {
                error!(error = %e, "Store task failed");
                return Err(e.into());
            }
        }

        info!("System shutdown complete.");
        Ok(())
    }
}
