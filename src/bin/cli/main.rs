mod shell;

use anyhow::{Context, Result};
use bucket_list::{
    ImageUpload, ItemId, ItemWorkflow, ItemWorkflowController, ViewItem,
    app::{AppBuilder, AppConfig, DEFAULT_PUBLIC_BASE_URL, RepositoryBackend, StorageBackend},
    domain::value_objects::DEFAULT_IMAGE_NAMESPACE,
};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "bucket-list")]
#[command(about = "Keep a bucket list of goals, optionally with a picture each", long_about = None)]
struct Cli {
    /// Signed-in user
    #[arg(short, long, env = "BUCKET_LIST_USER", default_value = "guest")]
    user: String,

    /// Image storage backend type (memory or s3)
    #[arg(long, env = "STORAGE_BACKEND", default_value = "memory")]
    storage_backend: String,

    /// Base URL for images served by the in-memory backend
    #[arg(long, env = "PUBLIC_BASE_URL", default_value = DEFAULT_PUBLIC_BASE_URL)]
    public_base_url: String,

    /// S3 endpoint URL (for S3-compatible services)
    #[arg(long, env = "S3_ENDPOINT")]
    s3_endpoint: Option<String>,

    /// S3 bucket name
    #[arg(long, env = "S3_BUCKET")]
    s3_bucket: Option<String>,

    /// S3 region
    #[arg(long, env = "S3_REGION", default_value = "us-east-1")]
    s3_region: String,

    /// S3 access key
    #[arg(long, env = "S3_ACCESS_KEY")]
    s3_access_key: Option<String>,

    /// S3 secret key
    #[arg(long, env = "S3_SECRET_KEY")]
    s3_secret_key: Option<String>,

    /// Record store backend type (memory or database)
    #[arg(long, env = "REPOSITORY_BACKEND", default_value = "memory")]
    repository_backend: String,

    /// Database URL for the record store (PostgreSQL)
    #[arg(long, env = "DATABASE_URL")]
    database_url: Option<String>,

    /// First path segment of uploaded image keys
    #[arg(long, env = "IMAGE_NAMESPACE", default_value = DEFAULT_IMAGE_NAMESPACE)]
    image_namespace: String,

    /// Lifetime of image URLs in seconds
    #[arg(long, env = "IMAGE_URL_EXPIRY_SECS", default_value_t = 900)]
    url_expiry_secs: u64,

    /// Run actions one at a time
    #[arg(long, env = "SERIALIZE_ACTIONS", default_value = "false")]
    serialize_actions: bool,

    /// Print items as JSON
    #[arg(long)]
    json: bool,

    /// Log level
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List all items
    List,

    /// Add an item
    Add {
        /// What you want to do
        title: String,
        /// Image file to attach
        #[arg(short, long)]
        image: Option<PathBuf>,
    },

    /// Change an item's title and optionally its image
    Edit {
        /// Item id
        id: ItemId,
        /// New title
        title: String,
        /// Replacement image file
        #[arg(short, long)]
        image: Option<PathBuf>,
    },

    /// Delete an item
    Delete {
        /// Item id
        id: ItemId,
    },

    /// Show who is signed in
    Whoami,

    /// Interactive session reading commands from stdin
    Shell,
}

impl Cli {
    fn to_app_config(&self) -> Result<AppConfig> {
        let storage_backend = match self.storage_backend.as_str() {
            "memory" => StorageBackend::InMemory {
                public_base_url: self.public_base_url.clone(),
            },
            "s3" => {
                let bucket = self
                    .s3_bucket
                    .clone()
                    .context("S3_BUCKET is required for S3 backend")?;

                StorageBackend::S3 {
                    bucket,
                    region: self.s3_region.clone(),
                    access_key: self.s3_access_key.clone(),
                    secret_key: self.s3_secret_key.clone(),
                    endpoint: self.s3_endpoint.clone(),
                }
            }
            _ => anyhow::bail!("Unknown storage backend: {}", self.storage_backend),
        };

        let repository_backend = match self.repository_backend.as_str() {
            "memory" => RepositoryBackend::InMemory,
            "database" | "db" => {
                let connection_string = self
                    .database_url
                    .clone()
                    .context("DATABASE_URL is required for database backend")?;
                RepositoryBackend::Database { connection_string }
            }
            _ => anyhow::bail!("Unknown repository backend: {}", self.repository_backend),
        };

        Ok(AppConfig {
            storage_backend,
            repository_backend,
            username: self.user.clone(),
            image_namespace: self.image_namespace.clone(),
            url_expiry_secs: self.url_expiry_secs,
            serialize_actions: self.serialize_actions,
        })
    }

    fn init_logging(&self) {
        let level = self
            .log_level
            .parse::<tracing::Level>()
            .unwrap_or(tracing::Level::INFO);

        tracing_subscriber::fmt()
            .with_max_level(level)
            .with_writer(std::io::stderr)
            .init();
    }
}

/// Read an image file from disk
pub(crate) async fn load_image(path: &Path) -> Result<ImageUpload> {
    let data = tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read image {}", path.display()))?;
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .with_context(|| format!("{} has no file name", path.display()))?;

    Ok(ImageUpload::from_file_name(file_name, data))
}

async fn load_optional_image(path: Option<&Path>) -> Result<Option<ImageUpload>> {
    match path {
        Some(path) => Ok(Some(load_image(path).await?)),
        None => Ok(None),
    }
}

pub(crate) fn format_item(item: &ViewItem) -> String {
    let mut line = format!(
        "{}  {}  {}",
        item.id,
        item.created_at.format("%Y-%m-%d %H:%M"),
        item.title
    );
    if let Some(url) = item.image_url_str() {
        line.push_str("  ");
        line.push_str(url);
    }
    line
}

fn print_items(items: &[ViewItem], json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(items)?);
        return Ok(());
    }
    if items.is_empty() {
        println!("Your bucket list is empty.");
    }
    for item in items {
        println!("{}", format_item(item));
    }
    Ok(())
}

async fn run(cli: &Cli, workflow: &ItemWorkflowController) -> Result<()> {
    match &cli.command {
        Command::List => {
            let items = workflow.refresh().await?;
            print_items(&items, cli.json)?;
        }
        Command::Add { title, image } => {
            let image = load_optional_image(image.as_deref()).await?;
            workflow.refresh().await?;
            workflow.set_draft_title(title.clone()).await;
            workflow.select_draft_image(image).await;

            match workflow.submit_draft().await? {
                Some(item) => print_items(std::slice::from_ref(&item), cli.json)?,
                None => println!("Nothing to add: the title is blank."),
            }
        }
        Command::Edit { id, title, image } => {
            let image = load_optional_image(image.as_deref()).await?;
            workflow.refresh().await?;
            workflow.begin_edit(id).await?;
            workflow.set_edit_title(title.clone()).await;
            workflow.select_edit_image(image).await;

            match workflow.save_edit().await? {
                Some(item) => print_items(std::slice::from_ref(&item), cli.json)?,
                None => println!("Nothing to save: the title is blank."),
            }
        }
        Command::Delete { id } => {
            workflow.refresh().await?;
            if !workflow.delete_item(id).await? {
                info!(item_id = %id, "Item was not in the list");
            }
        }
        Command::Whoami => {
            println!("Welcome, {}", workflow.display_name()?);
        }
        Command::Shell => shell::run(workflow).await?,
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if it exists
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    cli.init_logging();

    let config = cli.to_app_config()?;
    info!(
        storage_backend = %cli.storage_backend,
        repository_backend = %cli.repository_backend,
        "Starting bucket list"
    );

    let services = AppBuilder::new()
        .with_config(config)
        .build()
        .await
        .context("Failed to build application")?;

    run(&cli, &services.workflow).await
}
