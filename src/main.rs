use std::sync::Arc;

use reelsearch::{
    cli::{self, Command},
    config::Config,
    models::ViewState,
    services::{
        providers::{FirebaseAuthClient, GeminiClient, IdentityProvider, TmdbClient},
        AuthForm, AuthMode, SearchOrchestrator, SessionStore,
    },
    telemetry,
};
use tokio::io::{AsyncBufReadExt, BufReader};

/// Wires the collaborators together from configuration
struct App {
    orchestrator: SearchOrchestrator,
    identity: Option<Arc<dyn IdentityProvider>>,
    session: SessionStore,
    auth_form: AuthForm,
    /// Visible catalog rows already printed for the current query
    printed: usize,
}

impl App {
    fn new(config: &Config) -> anyhow::Result<Self> {
        let catalog = Arc::new(TmdbClient::new(
            config.http_client()?,
            config.tmdb_api_token.clone(),
            config.tmdb_api_url.clone(),
            config.tmdb_language.clone(),
        ));
        let generator = Arc::new(GeminiClient::new(
            config.http_client()?,
            config.gemini_api_key.clone(),
            config.gemini_api_url.clone(),
            config.gemini_model.clone(),
        ));

        let identity = match &config.firebase_api_key {
            Some(api_key) => Some(Arc::new(FirebaseAuthClient::new(
                config.http_client()?,
                api_key.clone(),
                config.firebase_api_url.clone(),
            )) as Arc<dyn IdentityProvider>),
            None => None,
        };

        Ok(Self {
            orchestrator: SearchOrchestrator::new(catalog, generator),
            identity,
            session: SessionStore::new(config.session_file.clone()),
            auth_form: AuthForm::new(),
            printed: 0,
        })
    }

    /// Waits until both first responses for the active query have settled
    async fn settled_view(&self) -> ViewState {
        let mut rx = self.orchestrator.subscribe();
        let view = match rx.wait_for(|view| !view.is_loading()).await {
            Ok(view) => view.clone(),
            Err(_) => self.orchestrator.view(),
        };
        view
    }

    async fn search(&mut self, query: String) {
        if self.orchestrator.set_query(query).await.is_none() {
            return;
        }
        println!("Loading…");
        let view = self.settled_view().await;
        print!("{}", cli::render_view(&view));
        self.printed = view.visible_results().count();
    }

    async fn more(&mut self) {
        let Some(handle) = self.orchestrator.load_more().await else {
            println!("{}", cli::render_footer(&self.orchestrator.view()));
            return;
        };
        if let Err(e) = handle.await {
            tracing::error!(error = %e, "Page task join error");
        }

        let view = self.orchestrator.view();
        print!("{}", cli::render_results_from(&view, self.printed));
        println!("{}", cli::render_footer(&view));
        self.printed = view.visible_results().count();
    }

    async fn authenticate(&mut self, command: &Command, mode: AuthMode) {
        let Some(identity) = self.identity.clone() else {
            println!("Sign-in is disabled: set FIREBASE_API_KEY to enable it.");
            return;
        };
        let Some(credentials) = command.credentials() else {
            return;
        };

        self.auth_form.set_mode(mode);
        println!("{}", self.auth_form.heading());
        match self
            .auth_form
            .submit(&credentials, identity.as_ref(), &self.session)
            .await
        {
            Ok(user) => println!(
                "Signed in as {}",
                user.display_name.as_deref().unwrap_or(&user.email)
            ),
            Err(_) => println!("{}", self.auth_form.error_message().unwrap_or_default()),
        }
    }

    async fn who_am_i(&self) {
        match self.session.load().await {
            Ok(Some(user)) => println!(
                "{} <{}> since {}",
                user.display_name.as_deref().unwrap_or("(no name)"),
                user.email,
                user.signed_in_at.format("%Y-%m-%d %H:%M UTC")
            ),
            Ok(None) => println!("Not signed in"),
            Err(e) => println!("{}", e),
        }
    }

    /// Returns false when the user asked to quit
    async fn handle(&mut self, line: &str) -> bool {
        let command = match cli::parse_command(line) {
            Ok(command) => command,
            Err(message) => {
                println!("{}", message);
                return true;
            }
        };

        match command {
            Command::Search(query) => self.search(query).await,
            Command::More => self.more().await,
            Command::SignIn { .. } => self.authenticate(&command, AuthMode::SignIn).await,
            Command::Register { .. } => self.authenticate(&command, AuthMode::Register).await,
            Command::SignOut => match self.session.clear().await {
                Ok(()) => println!("Signed out"),
                Err(e) => println!("{}", e),
            },
            Command::WhoAmI => self.who_am_i().await,
            Command::Help => println!("{}", cli::HELP),
            Command::Quit => return false,
        }
        true
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    telemetry::init_tracing();

    let config = Config::from_env()?;
    let mut app = App::new(&config)?;

    tracing::info!(
        model = %config.gemini_model,
        auth_enabled = app.identity.is_some(),
        "reelsearch started"
    );

    let initial_query = std::env::args().skip(1).collect::<Vec<_>>().join(" ");
    if !initial_query.trim().is_empty() {
        app.search(initial_query).await;
    } else {
        println!("{}", cli::HELP);
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        if !app.handle(&line).await {
            break;
        }
    }

    Ok(())
}
