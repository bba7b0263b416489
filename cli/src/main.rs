use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use hoss_api::config::{DEFAULT_CLIENT_ID, DEFAULT_PAGE_URL, DEFAULT_TOKEN_STORE, TransportTimeouts};
use hoss_api::{
    ApiError, ApiResponse, EnvConfig, Environment, FileStore, Parts, StorageError, Target, TokenKeyScheme,
};
use serde_json::Value;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error("invalid JSON payload: {0}")]
    InvalidJson(#[from] serde_json::Error),
    #[error("server returned HTTP {status}: {body}")]
    Status { status: u16, body: String },
}

#[derive(Parser, Debug)]
#[command(name = "hoss-cli", about = "Hoss console API client")]
struct Cli {
    /// Location the console is served from; service bases derive from it.
    #[arg(long, env = "HOSS_PAGE_URL", default_value = DEFAULT_PAGE_URL)]
    page_url: String,

    #[arg(long, env = "HOSS_CLIENT_ID", default_value = DEFAULT_CLIENT_ID)]
    client_id: String,

    #[arg(long, env = "HOSS_TOKEN_STORE", default_value = DEFAULT_TOKEN_STORE)]
    token_store: PathBuf,

    #[arg(long, env = "HOSS_TOKEN_KEY_SCHEME", default_value = "auth", value_parser = parse_key_scheme)]
    key_scheme: TokenKeyScheme,

    #[arg(long, env = "HOSS_REQUEST_TIMEOUT_SECS")]
    request_timeout_secs: Option<u64>,

    #[arg(long, env = "HOSS_CONNECT_TIMEOUT_SECS")]
    connect_timeout_secs: Option<u64>,

    /// Dispatch without waiting for discovery, as the browser console does.
    #[arg(long, default_value_t = false)]
    no_wait: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the resource service's discovery document.
    Discover,
    Get(RouteArgs),
    Post(BodyArgs),
    Put(BodyArgs),
    Delete(BodyArgs),
    /// Unauthenticated fetch from the freshly discovered auth service.
    WellKnown { route: String },
    /// Fetch and print the identity provider's OpenID configuration.
    OpenidConfig,
    Session(SessionCommand),
}

#[derive(Args, Debug)]
struct RouteArgs {
    route: String,

    /// Resolve the route against the auth service instead of the core service.
    #[arg(long, default_value_t = false)]
    auth: bool,
}

#[derive(Args, Debug)]
struct BodyArgs {
    route: String,

    /// JSON body; `{}` when omitted.
    #[arg(long)]
    data: Option<String>,

    #[arg(long, default_value_t = false)]
    auth: bool,
}

#[derive(Args, Debug)]
struct SessionCommand {
    #[command(subcommand)]
    command: SessionSubcommand,
}

#[derive(Subcommand, Debug)]
enum SessionSubcommand {
    /// Print the storage key the token is read from.
    Key,
    /// Store an id_token under the current key.
    Store { id_token: String },
    /// Remove the stored session under the current key.
    Clear,
}

fn parse_key_scheme(raw: &str) -> Result<TokenKeyScheme, String> {
    raw.parse()
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();

    let cli = Cli::parse();
    let config = EnvConfig {
        page_url: cli.page_url,
        client_id: cli.client_id,
        token_store: cli.token_store,
        key_scheme: cli.key_scheme,
        timeouts: TransportTimeouts { request_secs: cli.request_timeout_secs, connect_secs: cli.connect_timeout_secs },
    };
    let parts = Parts::from_config(&config)?;

    let env = if cli.no_wait {
        let (env, _discovery) = Environment::start(parts);
        env
    } else {
        let (env, info) = Environment::connect(parts).await?;
        tracing::info!(auth_service = %info.auth_service, version = ?info.version, "connected");
        if matches!(cli.command, Command::Discover) {
            print_json(&serde_json::to_value(&info)?)?;
            return Ok(());
        }
        env
    };

    match cli.command {
        Command::Discover => {
            let snapshot = env.endpoints().snapshot().await;
            println!("resource_base: {}", snapshot.resource_base);
            println!("auth_base: {}", snapshot.auth_base);
            Ok(())
        }
        Command::Get(args) => {
            let response = env.dispatcher().get(&args.route, Target::from_auth_flag(args.auth)).await?;
            print_response(&response)
        }
        Command::Post(args) => {
            let (route, body, target) = body_args(args)?;
            print_response(&env.dispatcher().post(&route, body, target).await?)
        }
        Command::Put(args) => {
            let (route, body, target) = body_args(args)?;
            print_response(&env.dispatcher().put(&route, body, target).await?)
        }
        Command::Delete(args) => {
            let (route, body, target) = body_args(args)?;
            print_response(&env.dispatcher().del(&route, body, target).await?)
        }
        Command::WellKnown { route } => print_response(&env.well_known().get_well_known(&route).await?),
        Command::OpenidConfig => {
            let document = env.well_known().fetch_openid_configuration().await?;
            print_json(&serde_json::to_value(&document)?)
        }
        Command::Session(session) => run_session(&env, &config, session).await,
    }
}

async fn run_session(env: &Environment, config: &EnvConfig, session: SessionCommand) -> Result<(), CliError> {
    let auth_base = env.endpoints().snapshot().await.auth_base;
    let key = env.dispatcher().tokens().storage_key(&auth_base);
    let store = FileStore::new(config.token_store.clone());

    match session.command {
        SessionSubcommand::Key => println!("{key}"),
        SessionSubcommand::Store { id_token } => {
            let user = serde_json::json!({ "id_token": id_token });
            store.set_item(&key, &user.to_string())?;
            eprintln!("stored session under {key} in {}", store.path().display());
        }
        SessionSubcommand::Clear => {
            store.remove_item(&key)?;
            eprintln!("cleared {key}");
        }
    }
    Ok(())
}

fn body_args(args: BodyArgs) -> Result<(String, Option<Value>, Target), CliError> {
    let body = args.data.as_deref().map(|raw| serde_json::from_str::<Value>(raw)).transpose()?;
    Ok((args.route, body, Target::from_auth_flag(args.auth)))
}

fn print_response(response: &ApiResponse) -> Result<(), CliError> {
    if !response.is_success() {
        return Err(CliError::Status { status: response.status.as_u16(), body: response.text() });
    }
    match response.json::<Value>() {
        Ok(value) => print_json(&value),
        Err(_) => {
            println!("{}", response.text());
            Ok(())
        }
    }
}

fn print_json(value: &Value) -> Result<(), CliError> {
    let rendered = serde_json::to_string_pretty(value)?;
    println!("{rendered}");
    Ok(())
}
