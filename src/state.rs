use std::sync::Arc;

use actix_web::web;
use log::{info, warn};

use crate::config::AppConfig;
use crate::connection::repository::{ConnectionRepository, MongoConnectionRepository};
use crate::connection::service::ConnectionService;
use crate::database::Database;
use crate::engage::repository::{
    CommentRepository, LikeRepository, MongoCommentRepository, MongoLikeRepository,
};
use crate::engage::service::EngagementService;
use crate::feed::service::{FeedDeps, FeedService};
use crate::post::post_repository::{MongoPostRepository, PostRepository};
use crate::uploader::media::{CloudinaryMediaStore, DisabledMediaStore, MediaStore};
use crate::user::repository::{MongoUserDirectory, UserDirectory};
use crate::user::service::UserService;

/// Store handles shared by every service.
#[derive(Clone)]
pub struct Stores {
    pub users: Arc<dyn UserDirectory>,
    pub posts: Arc<dyn PostRepository>,
    pub likes: Arc<dyn LikeRepository>,
    pub comments: Arc<dyn CommentRepository>,
    pub requests: Arc<dyn ConnectionRepository>,
    pub media: Arc<dyn MediaStore>,
}

impl Stores {
    pub fn mongo(database: &Database, config: &AppConfig) -> Self {
        let media: Arc<dyn MediaStore> = match &config.cloudinary {
            Some(cloudinary) => {
                info!("Image uploads go to Cloudinary folder {:?}", cloudinary.folder);
                Arc::new(CloudinaryMediaStore::new(cloudinary.clone()))
            }
            None => {
                warn!("Cloudinary is not configured; image uploads are disabled");
                Arc::new(DisabledMediaStore)
            }
        };

        Stores {
            users: Arc::new(MongoUserDirectory::new(&database.db)),
            posts: Arc::new(MongoPostRepository::new(&database.db)),
            likes: Arc::new(MongoLikeRepository::new(&database.db)),
            comments: Arc::new(MongoCommentRepository::new(&database.db)),
            requests: Arc::new(MongoConnectionRepository::new(&database.db)),
            media,
        }
    }
}

/// Services handed to actix as app data, cloned into every worker.
#[derive(Clone)]
pub struct AppState {
    pub connections: web::Data<ConnectionService>,
    pub engagement: web::Data<EngagementService>,
    pub feed: web::Data<FeedService>,
    pub users: web::Data<UserService>,
    pub media: web::Data<dyn MediaStore>,
}

impl AppState {
    pub fn new(stores: Stores) -> Self {
        let connections = Arc::new(ConnectionService::new(
            stores.requests.clone(),
            stores.users.clone(),
        ));
        let engagement = Arc::new(EngagementService::new(
            stores.likes.clone(),
            stores.comments.clone(),
            stores.posts.clone(),
            stores.users.clone(),
        ));
        let feed = FeedService::new(FeedDeps {
            posts: stores.posts.clone(),
            users: stores.users.clone(),
            media: stores.media.clone(),
            engagement: engagement.clone(),
            connections: connections.clone(),
        });

        AppState {
            connections: web::Data::from(connections),
            engagement: web::Data::from(engagement),
            feed: web::Data::new(feed),
            users: web::Data::new(UserService::new(stores.users)),
            media: web::Data::from(stores.media),
        }
    }

    pub fn configure(&self, cfg: &mut web::ServiceConfig) {
        cfg.app_data(self.connections.clone())
            .app_data(self.engagement.clone())
            .app_data(self.feed.clone())
            .app_data(self.users.clone())
            .app_data(self.media.clone());
    }
}

#[cfg(test)]
impl Stores {
    pub fn memory(
        store: Arc<crate::database::memory::MemoryStore>,
        media: Arc<dyn MediaStore>,
    ) -> Self {
        Stores {
            users: store.clone(),
            posts: store.clone(),
            likes: store.clone(),
            comments: store.clone(),
            requests: store,
            media,
        }
    }
}
