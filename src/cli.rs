//! Command-line front-end: each subcommand plays one screen.

use anyhow::{bail, Context, Result};
use clap::Parser;
use std::fmt::Debug;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info};

use accident_notify::config::{AppConfig, ConfigOverrides};
use accident_notify::flows::{
    Banner, FlowContext, FlowError, ForgotPasswordFlow, FormState, LandingScreen, LoginFlow, LogoutFlow, Navigator,
    OAuthCallbackFlow, OAuthCallbackParams, RegisterField, RegisterFlow, ResetPasswordFlow, Route, Submission,
};
use accident_notify::services::AppState;

#[derive(Parser)]
#[command(name = "accident-notify")]
#[command(version)]
#[command(about = "Accident Notification client: sign in, register and reset passwords")]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Extra configuration file, applied after config/*.yaml
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Backend base URL
    #[arg(long, global = true, env = "ACCIDENT_API_URL")]
    api_url: Option<String>,

    /// Keep session state in this file between runs
    #[arg(long, global = true, env = "ACCIDENT_STATE_FILE", value_name = "FILE")]
    state_file: Option<PathBuf>,

    /// Override the configured log level
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Print gateway metrics in Prometheus text format when done
    #[arg(long, global = true)]
    metrics: bool,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Sign in with email and password
    Login {
        #[arg(long)]
        email: String,
        #[arg(long, env = "ACCIDENT_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Create an account
    Register {
        #[arg(long)]
        first_name: String,
        #[arg(long)]
        last_name: String,
        #[arg(long)]
        email: String,
        /// admin, citizen, police or hospital
        #[arg(long)]
        role: String,
        #[arg(long)]
        phone_number: String,
        #[arg(long)]
        address: String,
        #[arg(long, env = "ACCIDENT_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Request a password-reset ticket
    ForgotPassword {
        #[arg(long)]
        email: String,
    },

    /// Set a new password with the held reset ticket
    ResetPassword {
        #[arg(long)]
        new_password: String,
        #[arg(long)]
        confirm_password: String,
    },

    /// Complete a Google sign-in redirect
    OauthCallback {
        /// Raw query string of the redirect, e.g. "code=abc"
        #[arg(long, conflicts_with_all = ["code", "error"])]
        query: Option<String>,
        #[arg(long)]
        code: Option<String>,
        #[arg(long)]
        error: Option<String>,
    },

    /// Sign out and clear the stored session
    Logout,

    /// Show the signed-in landing screen
    Landing,

    /// Inspect configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(clap::Subcommand)]
enum ConfigCommands {
    /// Print the configuration template
    Template,
    /// Write the configuration template to a file
    Init {
        #[arg(value_name = "PATH", default_value = "config/default.yaml")]
        path: PathBuf,
    },
    /// Print the effective configuration
    Show {
        #[arg(long, conflicts_with = "summary")]
        json: bool,
        /// Short overview without secrets
        #[arg(long)]
        summary: bool,
    },
}

impl Cli {
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            config_file: self.config.clone(),
            api_url: self.api_url.clone(),
            state_file: self.state_file.clone(),
            log_level: self.log_level.clone(),
        }
    }

    /// Subcommands that work without loading (or validating) configuration
    pub fn needs_config(&self) -> bool {
        !matches!(
            self.command,
            Commands::Config {
                command: ConfigCommands::Template | ConfigCommands::Init { .. }
            }
        )
    }

    /// Template commands, run before any configuration is loaded
    pub fn run_offline(&self) -> Result<()> {
        match &self.command {
            Commands::Config {
                command: ConfigCommands::Template,
            } => {
                print!("{}", AppConfig::generate_template());
                Ok(())
            }
            Commands::Config {
                command: ConfigCommands::Init { path },
            } => {
                if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                    std::fs::create_dir_all(parent)?;
                }
                AppConfig::write_template(path)
                    .with_context(|| format!("Failed to write {}", path.display()))?;
                println!("Configuration template written to {}", path.display());
                Ok(())
            }
            _ => bail!("command needs configuration"),
        }
    }

    pub async fn run(self, config: AppConfig) -> Result<()> {
        let state = AppState::new(config).context("Failed to initialize services")?;
        let ctx = state.flow_context(Arc::new(TerminalNavigator));
        debug!("Services initialized");

        let result = self.dispatch(&state, ctx).await;

        if self.metrics {
            print!("{}", state.services.metrics().gather());
        }
        result
    }

    async fn dispatch(&self, state: &AppState, ctx: FlowContext) -> Result<()> {
        match &self.command {
            Commands::Login { email, password } => {
                let mut flow = LoginFlow::new(ctx);
                flow.mount(None);
                flow.set_email(email.clone());
                flow.set_password(password.clone());
                let outcome = flow.submit().await;
                finish(outcome, flow.form())
            }
            Commands::Register {
                first_name,
                last_name,
                email,
                role,
                phone_number,
                address,
                password,
            } => {
                let mut flow = RegisterFlow::new(ctx);
                flow.set(RegisterField::FirstName, first_name.clone());
                flow.set(RegisterField::LastName, last_name.clone());
                flow.set(RegisterField::Email, email.clone());
                flow.set(RegisterField::Role, role.clone());
                flow.set(RegisterField::PhoneNumber, phone_number.clone());
                flow.set(RegisterField::Address, address.clone());
                flow.set(RegisterField::Password, password.clone());
                let outcome = flow.submit().await;
                finish(outcome, flow.form())
            }
            Commands::ForgotPassword { email } => {
                let mut flow = ForgotPasswordFlow::new(ctx);
                flow.set_email(email.clone());
                let outcome = flow.submit().await;
                finish(outcome, flow.form())?;
                flow.go_to_confirm();
                Ok(())
            }
            Commands::ResetPassword {
                new_password,
                confirm_password,
            } => {
                let mut flow = ResetPasswordFlow::new(ctx);
                if let Err(e) = flow.mount() {
                    flow.request_new_reset();
                    return Err(e.into());
                }
                flow.set_new_password(new_password.clone());
                flow.set_confirm_password(confirm_password.clone());
                let outcome = flow.submit().await;
                finish(outcome, flow.form())?;
                flow.back_to_login();
                Ok(())
            }
            Commands::OauthCallback { query, code, error } => {
                let params = match query {
                    Some(query) => OAuthCallbackParams::from_query(query),
                    None => OAuthCallbackParams {
                        code: code.clone(),
                        error: error.clone(),
                    },
                };
                OAuthCallbackFlow::new(ctx).mount(&params).await?;
                Ok(())
            }
            Commands::Logout => {
                LogoutFlow::new(ctx).run().await?;
                Ok(())
            }
            Commands::Landing => {
                let screen = LandingScreen::new(ctx, &state.config.map);
                let view = screen.mount()?;
                println!("{}", serde_json::to_string_pretty(&view)?);
                Ok(())
            }
            Commands::Config { command } => match command {
                ConfigCommands::Show { json, summary } => {
                    if *summary {
                        println!("{}", state.config.summary());
                    } else if *json {
                        println!("{}", state.config.to_json()?);
                    } else {
                        print!("{}", state.config.to_yaml()?);
                    }
                    Ok(())
                }
                ConfigCommands::Template | ConfigCommands::Init { .. } => self.run_offline(),
            },
        }
    }
}

/// Prints each route the browser would load
struct TerminalNavigator;

impl Navigator for TerminalNavigator {
    fn navigate(&self, route: Route) {
        info!(route = %route, "Navigating");
        println!("-> {}", route);
    }
}

fn print_banner(banner: Option<&Banner>) {
    if let Some(banner) = banner {
        println!("[{:?}] {}", banner.kind, banner.message);
    }
}

/// Report a submission; invalid fields and failures become an error exit
fn finish<F: Copy + Ord + Debug>(outcome: Result<Submission, FlowError>, form: &FormState<F>) -> Result<()> {
    match outcome {
        Ok(Submission::Completed) => {
            print_banner(form.banner());
            Ok(())
        }
        Ok(Submission::Ignored) => Ok(()),
        Ok(Submission::Invalid) => {
            for (field, message) in form.errors() {
                eprintln!("{:?}: {}", field, message);
            }
            bail!("Please correct the highlighted fields")
        }
        Err(e) => Err(e.into()),
    }
}
