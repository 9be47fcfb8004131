use std::env;

/// Cloudinary credentials; absent when image uploads are disabled.
#[derive(Debug, Clone)]
pub struct CloudinaryConfig {
    pub cloud_name: String,
    pub api_key: String,
    pub api_secret: String,
    pub folder: String,
}

impl CloudinaryConfig {
    /// Returns `None` unless all three credentials are set.
    pub fn from_env() -> Option<Self> {
        Some(Self {
            cloud_name: env::var("CLOUDINARY_CLOUD_NAME").ok()?,
            api_key: env::var("CLOUDINARY_API_KEY").ok()?,
            api_secret: env::var("CLOUDINARY_API_SECRET").ok()?,
            folder: env::var("CLOUDINARY_FOLDER").unwrap_or_else(|_| "posts".to_string()),
        })
    }
}

/// Server configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub mongodb_uri: String,
    pub database_name: String,
    pub jwt_secret: String,
    pub cloudinary: Option<CloudinaryConfig>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, String> {
        let port = match env::var("PORT") {
            Ok(raw) => raw
                .parse::<u16>()
                .map_err(|_| format!("PORT must be a valid port number, got {:?}", raw))?,
            Err(_) => 8000,
        };

        Ok(Self {
            host: env::var("HOST").unwrap_or_else(|_| "localhost".to_string()),
            port,
            mongodb_uri: env::var("MONGODB_URI")
                .unwrap_or_else(|_| "mongodb://localhost:27017".to_string()),
            database_name: env::var("DATABASE_NAME")
                .unwrap_or_else(|_| "social_connect".to_string()),
            jwt_secret: env::var("JWT_SECRET").map_err(|_| "JWT_SECRET is required")?,
            cloudinary: CloudinaryConfig::from_env(),
        })
    }
}
