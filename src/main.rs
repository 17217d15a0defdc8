//! CLI entry point for ryeo-site

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ryeo_site::content::ContentType;
use ryeo_site::subscribe::Services;
use ryeo_site::Site;

#[derive(Parser)]
#[command(name = "ryeo-site")]
#[command(version)]
#[command(about = "Content and newsletter backend for the Ryeo Labs site", long_about = None)]
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
    /// Serve the site, the content API and the subscribe endpoint
    #[command(alias = "s")]
    Server {
        /// Port to listen on
        #[arg(short, long, default_value = "4000")]
        port: u16,

        /// IP address to bind to
        #[arg(short, long, default_value = "localhost")]
        ip: String,
    },

    /// List site content
    List {
        /// What to list (blog, project, featured, tags, timeline)
        #[arg(default_value = "blog")]
        what: String,

        /// Collection used by `featured` and `tags`
        #[arg(short = 't', long = "type", default_value = "blog")]
        content_type: ContentType,
    },

    /// Email a blog post announcement to every subscriber
    Announce {
        /// Slug of the blog post
        slug: String,
    },

    /// Display version information
    Version,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.debug {
        "ryeo_site=debug,info"
    } else {
        "ryeo_site=info"
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
        Commands::Server { port, ip } => {
            let mut site = Site::new(&base_dir)?;
            site.config.apply_env();
            let services = Services::from_config(&site.config)?;

            tracing::info!("Serving content from {:?}", site.content_dir);
            ryeo_site::server::start(&site, services, &ip, port).await?;
        }

        Commands::List { what, content_type } => {
            let site = Site::new(&base_dir)?;
            ryeo_site::commands::list::run(&site, &what, content_type)?;
        }

        Commands::Announce { slug } => {
            let mut site = Site::new(&base_dir)?;
            site.config.apply_env();
            let services = Services::from_config(&site.config)?;
            ryeo_site::commands::announce::run(&site, &services, &slug).await?;
        }

        Commands::Version => {
            println!("ryeo-site version {}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}
