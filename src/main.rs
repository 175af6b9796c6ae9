//! CLI entry point for hugo-publisher

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use hugo_publisher::commands::new::PostOptions;
use hugo_publisher::Publisher;

#[derive(Parser)]
#[command(name = "hugo-publisher")]
#[command(author = "Yukang Chen")]
#[command(version = "0.1.0")]
#[command(about = "Manage posts of a Hugo blog stored as dated markdown folders", long_about = None)]
struct Cli {
    /// Set the base directory (defaults to current directory)
    #[arg(short, long, global = true)]
    cwd: Option<PathBuf>,

    /// Enable debug output
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List posts, newest first
    #[command(alias = "ls")]
    List {
        /// Page number (1-based)
        #[arg(short, long, default_value = "1")]
        page: i64,

        /// Posts per page (defaults to page_size from publisher.yml)
        #[arg(long)]
        page_size: Option<i64>,

        /// Filter by title, slug or keyword
        #[arg(short, long, default_value = "")]
        search: String,
    },

    /// List the file name of every post
    Titles,

    /// Print a post's markdown
    Show {
        title: String,
    },

    /// Create a new post under today's date
    New {
        /// Title of the new post
        title: String,

        #[command(flatten)]
        post: PostArgs,
    },

    /// Replace an existing post
    Update {
        /// Title of the post to replace
        old_title: String,

        /// New title
        title: String,

        #[command(flatten)]
        post: PostArgs,
    },

    /// Delete a post and the images it references
    #[command(alias = "rm")]
    Delete {
        title: String,
    },

    /// Check whether a title is already taken
    Check {
        title: String,
    },

    /// Shrink an image to fit 1920px and store it as JPEG
    Compress {
        src: PathBuf,
        dst: PathBuf,
    },

    /// Start the JSON API server
    #[command(alias = "s")]
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "4000")]
        port: u16,

        /// IP address to bind to
        #[arg(short, long, default_value = "localhost")]
        ip: String,
    },

    /// Display version information
    Version,
}

#[derive(Args)]
struct PostArgs {
    /// Markdown body
    #[arg(short, long)]
    body: Option<String>,

    /// Read the markdown body from a file
    #[arg(long, conflicts_with = "body")]
    body_file: Option<PathBuf>,

    #[arg(long)]
    description: Option<String>,

    #[arg(short, long)]
    author: Option<String>,

    /// Cover image path, relative to the site root (e.g. /images/uploads/a.jpg)
    #[arg(long)]
    cover: Option<String>,

    /// Tag (repeatable)
    #[arg(short, long = "tag")]
    tags: Vec<String>,

    #[arg(short, long)]
    weight: Option<i64>,

    /// Custom slug for the file name
    #[arg(long)]
    slug: Option<String>,

    /// Comma separated SEO keywords
    #[arg(short, long)]
    keywords: Option<String>,

    /// Show the cover image in list views
    #[arg(long)]
    show_in_list: bool,
}

impl From<PostArgs> for PostOptions {
    fn from(args: PostArgs) -> Self {
        Self {
            body: args.body,
            body_file: args.body_file,
            description: args.description,
            author: args.author,
            cover: args.cover,
            tags: args.tags,
            weight: args.weight,
            slug: args.slug,
            keywords: args.keywords,
            show_in_list: args.show_in_list,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.debug {
        "hugo_publisher=debug,info"
    } else {
        "hugo_publisher=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Determine base directory
    let base_dir = match cli.cwd {
        Some(dir) => dir,
        None => std::env::current_dir()?,
    };

    match cli.command {
        Commands::List {
            page,
            page_size,
            search,
        } => {
            let publisher = Publisher::new(&base_dir)?;
            let page_size = page_size.unwrap_or(publisher.repository.config().page_size);
            hugo_publisher::commands::list::run(&publisher, page, page_size, &search)?;
        }

        Commands::Titles => {
            let publisher = Publisher::new(&base_dir)?;
            hugo_publisher::commands::list::titles(&publisher)?;
        }

        Commands::Show { title } => {
            let publisher = Publisher::new(&base_dir)?;
            hugo_publisher::commands::show::run(&publisher, &title)?;
        }

        Commands::New { title, post } => {
            let publisher = Publisher::new(&base_dir)?.enable_notifications()?;
            tracing::info!("Creating new post with title: {}", title);
            let result = hugo_publisher::commands::new::create_post(&publisher, &title, post.into());
            publisher.shutdown().await;
            result?;
        }

        Commands::Update {
            old_title,
            title,
            post,
        } => {
            let publisher = Publisher::new(&base_dir)?.enable_notifications()?;
            tracing::info!("Replacing {:?} with {:?}", old_title, title);
            let result = hugo_publisher::commands::new::update_post(
                &publisher,
                &old_title,
                &title,
                post.into(),
            );
            publisher.shutdown().await;
            result?;
        }

        Commands::Delete { title } => {
            let publisher = Publisher::new(&base_dir)?;
            hugo_publisher::commands::delete::run(&publisher, &title)?;
        }

        Commands::Check { title } => {
            let publisher = Publisher::new(&base_dir)?;
            if hugo_publisher::commands::check::run(&publisher, &title)? {
                std::process::exit(1);
            }
        }

        Commands::Compress { src, dst } => {
            let src = base_dir.join(src);
            let dst = base_dir.join(dst);
            hugo_publisher::commands::compress::run(&src, &dst)?;
        }

        Commands::Serve { port, ip } => {
            let publisher = Arc::new(Publisher::new(&base_dir)?.enable_notifications()?);

            tracing::info!("Starting server at http://{}:{}", ip, port);
            let result = hugo_publisher::server::start(publisher.clone(), &ip, port).await;

            match Arc::try_unwrap(publisher) {
                Ok(publisher) => publisher.shutdown().await,
                Err(_) => tracing::warn!("Server still running, pending notifications dropped"),
            }
            result?;
        }

        Commands::Version => {
            println!("hugo-publisher version {}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}
