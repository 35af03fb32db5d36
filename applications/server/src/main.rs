/// Centrum Heights Lead Server
use clap::{Parser, Subcommand};
use heights_core::{LeadStore, RegisterRequest, UserStore};
use heights_server::{
    config::ServerConfig,
    create_router,
    services::{notifier, AuthService, LeadService},
    state::AppState,
};
use heights_storage::LocalStorageContext;
use std::{net::SocketAddr, path::PathBuf, sync::Arc};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "heights-server")]
#[command(about = "Centrum Heights lead intake server", long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, global = true, env = "HEIGHTS_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server
    Serve,
    /// Create a brochure account
    AddUser {
        /// Display name
        #[arg(short, long)]
        name: String,
        /// Login email
        #[arg(short, long)]
        email: String,
        /// Password
        #[arg(short, long)]
        password: String,
    },
    /// Print the most recent leads
    ListLeads {
        /// Maximum number of leads to show
        #[arg(short, long, default_value_t = 50)]
        limit: u32,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "heights_server=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let config = ServerConfig::load_from(cli.config.as_deref())?;

    match cli.command {
        Commands::Serve => {
            serve(config).await?;
        }
        Commands::AddUser {
            name,
            email,
            password,
        } => {
            add_user(&config, RegisterRequest { name, email, password }).await?;
        }
        Commands::ListLeads { limit } => {
            list_leads(&config, limit).await?;
        }
    }

    Ok(())
}

async fn serve(config: ServerConfig) -> anyhow::Result<()> {
    config.validate()?;

    tracing::info!("Starting Centrum Heights lead server");
    tracing::info!("Host: {}", config.server.host);
    tracing::info!("Port: {}", config.server.port);

    // Initialize database
    let storage = Arc::new(open_storage(&config).await?);
    tracing::info!("Database connected");

    // Initialize notifier
    let notifier = notifier::from_settings(&config.mail)?;
    if config.mail.notify_email.is_none() {
        tracing::warn!("mail.notify_email is not set, new leads will not be emailed");
    }

    let lead_service = LeadService::new(
        Arc::clone(&storage) as Arc<dyn LeadStore>,
        Arc::clone(&notifier),
    )
    .with_recipient(config.mail.notify_email.clone())
    .with_notify_timeout(config.mail.timeout());

    // Initialize auth service
    let auth_service = Arc::new(AuthService::new(
        config.auth.jwt_secret.clone(),
        config.auth.token_expiration_hours,
    ));
    tracing::info!("Auth service initialized");

    // Build application state
    let app_state = AppState::new(
        Arc::new(lead_service),
        storage as Arc<dyn UserStore>,
        auth_service,
        notifier,
    )
    .with_mail_timeout(config.mail.timeout())
    .with_brochure(config.storage.brochure_path.clone());

    let app = create_router(app_state);

    // Create server address
    let addr = SocketAddr::from((
        config.server.host.parse::<std::net::IpAddr>()?,
        config.server.port,
    ));

    tracing::info!("Server listening on {}", addr);

    // Start server
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn open_storage(config: &ServerConfig) -> anyhow::Result<LocalStorageContext> {
    let url = &config.storage.database_url;

    // SQLite creates the file but not its directory
    if let Some(parent) = url
        .strip_prefix("sqlite://")
        .map(PathBuf::from)
        .as_deref()
        .and_then(std::path::Path::parent)
    {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent).await?;
        }
    }

    Ok(LocalStorageContext::connect(url).await?)
}

async fn add_user(config: &ServerConfig, req: RegisterRequest) -> anyhow::Result<()> {
    let storage = open_storage(config).await?;

    let auth_service = AuthService::new(
        config.auth.jwt_secret.clone(),
        config.auth.token_expiration_hours,
    );
    let user = auth_service.register(&storage, req).await?;

    println!("Created user {} <{}> ({})", user.name, user.email, user.id);

    Ok(())
}

async fn list_leads(config: &ServerConfig, limit: u32) -> anyhow::Result<()> {
    let storage = open_storage(config).await?;

    let total = storage.count_leads().await?;
    let leads = storage.list_leads(limit).await?;

    println!("Leads ({} of {}):", leads.len(), total);
    for lead in leads {
        println!(
            "  {}  {} - {}{}",
            lead.created_at.format("%Y-%m-%d %H:%M"),
            lead.name,
            lead.phone,
            lead.email
                .as_deref()
                .map(|e| format!(" <{e}>"))
                .unwrap_or_default()
        );
    }

    Ok(())
}
