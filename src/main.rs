use std::path::PathBuf;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use tokenauth::{
    AuthClient, AuthConfig, AuthStore, ConfigError, Credentials, FileCookieJar, MemoryRouter, Navigator,
    SessionConfig, SessionPhase, TokenSession,
};

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("{action} failed: {message}")]
    Rejected { action: &'static str, message: String },
    #[error("not signed in")]
    NotSignedIn,
}

#[derive(Parser, Debug)]
#[command(name = "tokenauth", about = "Sign in and out against the auth API, keeping the token in a cookie file")]
struct Cli {
    #[arg(long, env = "TOKENAUTH_BASE_URL")]
    base_url: Option<String>,

    #[arg(long, env = "TOKENAUTH_COOKIE_FILE", default_value = ".tokenauth-cookies")]
    cookie_file: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Exchange credentials for a token and persist it.
    SignIn(CredentialArgs),
    /// Create an account.
    SignUp(CredentialArgs),
    /// Validate the persisted token as if mounting the view at `--path`.
    Whoami {
        #[arg(long, default_value = "/")]
        path: String,
    },
    /// Forget the persisted token.
    SignOut,
}

#[derive(Args, Debug)]
struct CredentialArgs {
    #[arg(long)]
    email: String,

    #[arg(long, env = "TOKENAUTH_PASSWORD", hide_env_values = true)]
    password: String,
}

impl From<CredentialArgs> for Credentials {
    fn from(args: CredentialArgs) -> Self {
        Credentials::new(args.email, args.password)
    }
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let mut config = AuthConfig::from_env()?;
    if let Some(base_url) = &cli.base_url {
        config = config.with_base_url(base_url);
    }
    tracing::debug!(base_url = %config.base_url, cookie_file = %cli.cookie_file.display(), "starting");

    let path = match &cli.command {
        Command::Whoami { path } => path.clone(),
        Command::SignUp(_) => config.routes.sign_up.clone(),
        Command::SignIn(_) | Command::SignOut => config.routes.log_in.clone(),
    };
    let router = Arc::new(MemoryRouter::at(&path));
    let store = AuthStore::new();
    let mut session = TokenSession::new(
        Arc::new(AuthClient::from_config(&config)?),
        Arc::new(FileCookieJar::new(&cli.cookie_file)),
        Arc::new(store.clone()),
        router.clone(),
        SessionConfig::from(&config),
    );

    match cli.command {
        Command::SignIn(args) => {
            let result = session.login(&args.into()).await;
            if !result.success {
                return Err(rejected("sign-in", result.error));
            }
            print_phase(session.phase());
        }
        Command::SignUp(args) => {
            let result = session.register(&args.into()).await;
            if !result.success {
                return Err(rejected("sign-up", result.error));
            }
            println!("account created; sign in to continue");
        }
        Command::Whoami { .. } => {
            session.mount().await;
            for hop in router.history() {
                println!("-> {hop}");
            }
            if !store.snapshot().is_authorized() {
                return Err(CliError::NotSignedIn);
            }
            print_phase(session.phase());
        }
        Command::SignOut => {
            session.logout();
            println!("signed out");
        }
    }

    tracing::debug!(path = %router.pathname(), "done");
    Ok(())
}

fn rejected(action: &'static str, error: Option<String>) -> CliError {
    CliError::Rejected { action, message: error.unwrap_or_default() }
}

fn print_phase(phase: &SessionPhase) {
    match phase {
        SessionPhase::Authorized(identity) => println!("{} <{}>", identity.id, identity.email),
        SessionPhase::Unauthenticated => println!("token rejected; signed out"),
        SessionPhase::Unknown | SessionPhase::Checking => println!("session not confirmed"),
    }
}
