use log::info;
use mongodb::bson::{Document, doc};
use mongodb::options::{ClientOptions, IndexOptions};
use mongodb::{Client, IndexModel};

use crate::config::AppConfig;

pub const USERS: &str = "users";
pub const POSTS: &str = "posts";
pub const LIKES: &str = "likes";
pub const COMMENTS: &str = "comments";
pub const CONNECTION_REQUESTS: &str = "connectionrequests";

pub struct Database {
    pub db: mongodb::Database,
}

impl Database {
    pub async fn init(config: &AppConfig) -> Result<Self, mongodb::error::Error> {
        let mut client_options = ClientOptions::parse(&config.mongodb_uri).await?;
        client_options.app_name = Some("social_connect".to_string());

        let client = Client::with_options(client_options)?;

        // Ping the server to see if you can connect to the cluster
        client
            .database("admin")
            .run_command(doc! { "ping": 1 })
            .await?;

        info!("Connected successfully to MongoDB");

        let db = client.database(&config.database_name);
        Ok(Self { db })
    }

    /// Create the indexes the services rely on, including the uniqueness
    /// constraints for likes and connection pairs.
    pub async fn ensure_indexes(&self) -> Result<(), mongodb::error::Error> {
        let unique = || IndexOptions::builder().unique(true).build();
        let plan: Vec<(&str, Document, bool)> = vec![
            (LIKES, doc! { "user_id": 1, "post_id": 1 }, true),
            (LIKES, doc! { "post_id": 1 }, false),
            (COMMENTS, doc! { "post_id": 1, "created_at": -1 }, false),
            (CONNECTION_REQUESTS, doc! { "pair_key": 1 }, true),
            (CONNECTION_REQUESTS, doc! { "receiver_id": 1, "status": 1 }, false),
            (CONNECTION_REQUESTS, doc! { "sender_id": 1, "status": 1 }, false),
            (POSTS, doc! { "author_id": 1, "created_at": -1 }, false),
            (POSTS, doc! { "updated_at": -1, "_id": -1 }, false),
        ];

        for (collection, keys, is_unique) in plan {
            let model = if is_unique {
                IndexModel::builder().keys(keys).options(unique()).build()
            } else {
                IndexModel::builder().keys(keys).build()
            };
            self.db
                .collection::<Document>(collection)
                .create_index(model)
                .await?;
        }

        info!("MongoDB indexes ensured");
        Ok(())
    }
}
