use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::shared::constants::DEFAULT_MAX_UPLOAD_MB;

#[derive(Debug, Clone)]
pub struct Config {
    pub app: AppConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub swagger: SwaggerConfig,
    pub media: MediaConfig,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub cors_allowed_origins: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout_secs: u64,
    pub idle_timeout_secs: u64,
    pub max_lifetime_secs: u64,
}

#[derive(Clone, Debug)]
pub struct AuthConfig {
    /// HMAC secret used to verify HS256 access tokens
    pub secret_key: String,
    pub jwt_leeway: Duration,
}

#[derive(Debug, Clone)]
pub struct SwaggerConfig {
    pub username: Option<String>,
    pub password: Option<String>,
    pub title: String,
    pub version: String,
    pub description: String,
}

/// Which backend stores uploaded media
#[derive(Debug, Clone)]
pub enum StorageBackend {
    Cloudinary(CloudinaryConfig),
    S3(MinIOConfig),
    Local { upload_dir: PathBuf },
}

/// Media upload configuration
#[derive(Debug, Clone)]
pub struct MediaConfig {
    /// Upload size ceiling in megabytes
    pub max_upload_mb: u64,
    /// Folder (prefix) uploads are grouped under
    pub folder: String,
    pub backend: StorageBackend,
}

/// Cloudinary credentials, only used when all three are present
#[derive(Debug, Clone)]
pub struct CloudinaryConfig {
    pub cloud_name: String,
    pub api_key: String,
    pub api_secret: String,
    pub api_base_url: String,
}

/// MinIO/S3 storage configuration for media uploads
#[derive(Debug, Clone)]
pub struct MinIOConfig {
    /// MinIO/S3 endpoint URL
    pub endpoint: String,
    /// Public endpoint URL for publicly accessible files (optional, defaults to endpoint)
    pub public_endpoint: String,
    pub access_key: String,
    pub secret_key: String,
    pub bucket: String,
    /// AWS region (for S3 compatibility)
    pub region: String,
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        // Load .env file if exists, ignore if not found (optional for production)
        if let Err(e) = dotenvy::dotenv() {
            if !e.to_string().contains("not found") {
                eprintln!("Warning: Error loading .env file: {}", e);
            }
        }

        Ok(Config {
            app: AppConfig::from_env()?,
            database: DatabaseConfig::from_env()?,
            auth: AuthConfig::from_env()?,
            swagger: SwaggerConfig::from_env()?,
            media: MediaConfig::from_env()?,
        })
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, String> {
        let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("PORT")
            .unwrap_or_else(|_| "8000".to_string())
            .parse::<u16>()
            .map_err(|e| format!("Invalid PORT: {}", e))?;

        // Parse CORS allowed origins from comma-separated string
        let cors_allowed_origins = env::var("CORS_ALLOWED_ORIGINS")
            .unwrap_or_else(|_| "*".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        Ok(Self {
            host,
            port,
            cors_allowed_origins,
        })
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl DatabaseConfig {
    const DEFAULT_MAX_CONNECTIONS: u32 = 10;
    const DEFAULT_MIN_CONNECTIONS: u32 = 1;
    const DEFAULT_ACQUIRE_TIMEOUT_SECS: u64 = 5;
    const DEFAULT_IDLE_TIMEOUT_SECS: u64 = 600; // 10 minutes
    const DEFAULT_MAX_LIFETIME_SECS: u64 = 1800; // 30 minutes

    pub fn from_env() -> Result<Self, String> {
        let url = env::var("DATABASE_URL").map_err(|_| "DATABASE_URL must be set".to_string())?;

        let max_connections = env::var("DB_MAX_CONNECTIONS")
            .unwrap_or_else(|_| Self::DEFAULT_MAX_CONNECTIONS.to_string())
            .parse::<u32>()
            .map_err(|_| "DB_MAX_CONNECTIONS must be a valid number".to_string())?;

        let min_connections = env::var("DB_MIN_CONNECTIONS")
            .unwrap_or_else(|_| Self::DEFAULT_MIN_CONNECTIONS.to_string())
            .parse::<u32>()
            .map_err(|_| "DB_MIN_CONNECTIONS must be a valid number".to_string())?;

        let acquire_timeout_secs = env::var("DB_ACQUIRE_TIMEOUT_SECS")
            .unwrap_or_else(|_| Self::DEFAULT_ACQUIRE_TIMEOUT_SECS.to_string())
            .parse::<u64>()
            .map_err(|_| "DB_ACQUIRE_TIMEOUT_SECS must be a valid number".to_string())?;

        let idle_timeout_secs = env::var("DB_IDLE_TIMEOUT_SECS")
            .unwrap_or_else(|_| Self::DEFAULT_IDLE_TIMEOUT_SECS.to_string())
            .parse::<u64>()
            .map_err(|_| "DB_IDLE_TIMEOUT_SECS must be a valid number".to_string())?;

        let max_lifetime_secs = env::var("DB_MAX_LIFETIME_SECS")
            .unwrap_or_else(|_| Self::DEFAULT_MAX_LIFETIME_SECS.to_string())
            .parse::<u64>()
            .map_err(|_| "DB_MAX_LIFETIME_SECS must be a valid number".to_string())?;

        Ok(Self {
            url,
            max_connections,
            min_connections,
            acquire_timeout_secs,
            idle_timeout_secs,
            max_lifetime_secs,
        })
    }
}

impl AuthConfig {
    const DEFAULT_JWT_LEEWAY_SECS: u64 = 60; // 1 minute

    pub fn from_env() -> Result<Self, String> {
        let secret_key = env::var("SECRET_KEY")
            .map_err(|_| "SECRET_KEY environment variable is required".to_string())?;

        let jwt_leeway_secs = env::var("JWT_LEEWAY")
            .unwrap_or_else(|_| Self::DEFAULT_JWT_LEEWAY_SECS.to_string())
            .parse::<u64>()
            .map_err(|_| "JWT_LEEWAY must be a valid number".to_string())?;

        Ok(Self {
            secret_key,
            jwt_leeway: Duration::from_secs(jwt_leeway_secs),
        })
    }
}

impl SwaggerConfig {
    pub fn from_env() -> Result<Self, String> {
        // Only use credentials if they are non-empty
        let username = env::var("SWAGGER_USERNAME").ok().filter(|s| !s.is_empty());
        let password = env::var("SWAGGER_PASSWORD").ok().filter(|s| !s.is_empty());
        let title = env::var("SWAGGER_TITLE").unwrap_or_else(|_| "Item Media API".to_string());
        let version = env::var("SWAGGER_VERSION").unwrap_or_else(|_| "0.1.0".to_string());
        let description = env::var("SWAGGER_DESCRIPTION")
            .unwrap_or_else(|_| "Items with image and video attachments".to_string());

        Ok(Self {
            username,
            password,
            title,
            version,
            description,
        })
    }

    /// Returns credentials in "username:password" format if auth is enabled
    pub fn credentials(&self) -> Option<String> {
        match (&self.username, &self.password) {
            (Some(user), Some(pass)) => Some(format!("{}:{}", user, pass)),
            _ => None,
        }
    }
}

impl MediaConfig {
    const DEFAULT_FOLDER: &'static str = "items";
    const DEFAULT_UPLOAD_DIR: &'static str = "uploads";

    pub fn from_env() -> Result<Self, String> {
        let max_upload_mb = env::var("MEDIA_MAX_UPLOAD_MB")
            .unwrap_or_else(|_| DEFAULT_MAX_UPLOAD_MB.to_string())
            .parse::<u64>()
            .map_err(|_| "MEDIA_MAX_UPLOAD_MB must be a valid number".to_string())?;

        let folder = env::var("MEDIA_FOLDER").unwrap_or_else(|_| Self::DEFAULT_FOLDER.to_string());

        let cloudinary = CloudinaryConfig::from_parts(
            env::var("CLOUDINARY_CLOUD_NAME").ok(),
            env::var("CLOUDINARY_API_KEY").ok(),
            env::var("CLOUDINARY_API_SECRET").ok(),
        );

        let backend = match cloudinary {
            Some(config) => StorageBackend::Cloudinary(config),
            None if env::var("MEDIA_STORAGE").is_ok_and(|v| v.eq_ignore_ascii_case("s3")) => {
                StorageBackend::S3(MinIOConfig::from_env()?)
            }
            None => StorageBackend::Local {
                upload_dir: PathBuf::from(
                    env::var("MEDIA_UPLOAD_DIR")
                        .unwrap_or_else(|_| Self::DEFAULT_UPLOAD_DIR.to_string()),
                ),
            },
        };

        Ok(Self {
            max_upload_mb,
            folder,
            backend,
        })
    }

    pub fn max_upload_bytes(&self) -> usize {
        (self.max_upload_mb * 1024 * 1024) as usize
    }
}

impl CloudinaryConfig {
    const DEFAULT_API_BASE_URL: &'static str = "https://api.cloudinary.com";

    /// Builds the config only when every credential is set and non-empty
    pub fn from_parts(
        cloud_name: Option<String>,
        api_key: Option<String>,
        api_secret: Option<String>,
    ) -> Option<Self> {
        let non_empty = |v: Option<String>| v.filter(|s| !s.trim().is_empty());

        Some(Self {
            cloud_name: non_empty(cloud_name)?,
            api_key: non_empty(api_key)?,
            api_secret: non_empty(api_secret)?,
            api_base_url: env::var("CLOUDINARY_API_BASE_URL")
                .unwrap_or_else(|_| Self::DEFAULT_API_BASE_URL.to_string()),
        })
    }
}

impl MinIOConfig {
    pub fn from_env() -> Result<Self, String> {
        let endpoint =
            env::var("MINIO_ENDPOINT").unwrap_or_else(|_| "http://localhost:9000".to_string());

        // Public endpoint defaults to the main endpoint if not specified
        let public_endpoint =
            env::var("MINIO_PUBLIC_ENDPOINT").unwrap_or_else(|_| endpoint.clone());

        let access_key = env::var("MINIO_ACCESS_KEY").unwrap_or_else(|_| "minioadmin".to_string());

        let secret_key = env::var("MINIO_SECRET_KEY").unwrap_or_else(|_| "minioadmin".to_string());

        let bucket = env::var("MINIO_BUCKET").unwrap_or_else(|_| "item-media".to_string());

        let region = env::var("MINIO_REGION").unwrap_or_else(|_| "us-east-1".to_string());

        Ok(Self {
            endpoint,
            public_endpoint,
            access_key,
            secret_key,
            bucket,
            region,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cloudinary_requires_all_credentials() {
        assert!(CloudinaryConfig::from_parts(
            Some("demo".into()),
            Some("key".into()),
            Some("secret".into())
        )
        .is_some());

        assert!(CloudinaryConfig::from_parts(Some("demo".into()), Some("key".into()), None)
            .is_none());

        assert!(CloudinaryConfig::from_parts(
            Some("demo".into()),
            Some("  ".into()),
            Some("secret".into())
        )
        .is_none());
    }

    #[test]
    fn test_max_upload_bytes() {
        let config = MediaConfig {
            max_upload_mb: 10,
            folder: "items".into(),
            backend: StorageBackend::Local {
                upload_dir: PathBuf::from("uploads"),
            },
        };
        assert_eq!(config.max_upload_bytes(), 10 * 1024 * 1024);
    }
}
