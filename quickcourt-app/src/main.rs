use std::sync::Arc;
use anyhow::Context;
use clap::Parser;
use quickcourt_app::{wizard, AppState, Exit};
use quickcourt_core::session::MemorySessionStore;
use quickcourt_core::{Role, SessionContext, SessionStore, SessionUser};
use quickcourt_store::app_config::Config;
use quickcourt_store::{FileSessionStore, HttpGateway};
use tokio::io::BufReader;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "quickcourt")]
#[command(about = "Book a sports court from the terminal")]
struct Cli {
    /// Venue to book at; falls back to QUICKCOURT__VENUE_ID
    #[arg(short, long)]
    venue: Option<String>,

    #[arg(short, long, default_value = "config")]
    config_dir: String,

    /// Sign in with a verified email before booking
    #[arg(long)]
    login: Option<String>,

    #[arg(long, default_value = "player")]
    role: String,

    /// Forget the stored user and exit
    #[arg(long)]
    logout: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "quickcourt=debug,quickcourt_app=debug,quickcourt_booking=debug,quickcourt_store=debug".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = Config::load_from(&cli.config_dir).context("Failed to load config")?;
    tracing::info!("Starting QuickCourt against {}", config.api.base_url);

    let store: Arc<dyn SessionStore> = match &config.session.file {
        Some(path) => Arc::new(FileSessionStore::new(path)),
        None => Arc::new(MemorySessionStore::default()),
    };
    let mut session = SessionContext::restore(store).context("Failed to restore session")?;

    if cli.logout {
        session.sign_out().context("Failed to sign out")?;
        println!("Signed out");
        return Ok(());
    }
    if let Some(email) = &cli.login {
        let role: Role = cli.role.parse()?;
        session
            .sign_in(SessionUser::verified(email, role))
            .context("Failed to sign in")?;
    }
    if let Some(user) = session.user() {
        tracing::info!("Booking as {} ({:?})", user.email, user.role);
    }

    let gateway = Arc::new(HttpGateway::new(&config.api)?);
    let state = AppState::new(gateway.clone(), gateway, session, &config.booking);

    let venue_id = cli.venue.or(config.venue_id).unwrap_or_default();
    let (mut flow, mut redirects) = match wizard::open(&state, &venue_id).await {
        Ok(opened) => opened,
        Err(e) => {
            // Error page: nothing to book
            println!("! {}", e);
            std::process::exit(1);
        }
    };

    let input = BufReader::new(tokio::io::stdin());
    let mut output = tokio::io::stdout();
    match wizard::run(&mut flow, &mut redirects, &state, input, &mut output).await? {
        Exit::Redirected(path) => tracing::info!("Left booking page for {}", path),
        Exit::Quit | Exit::EndOfInput => tracing::info!("Booking page closed"),
    }

    Ok(())
}
