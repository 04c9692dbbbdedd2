//! CLI argument parsing.

use clap::{Parser, Subcommand, ValueEnum};
use kc_admin_client::{AuditEventType, UnknownRolePolicy};

use crate::config::OutputFormat;

/// Keycloak admin CLI: users, role assignments and audit events.
#[derive(Debug, Parser)]
#[command(name = "kc")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Options shared by every command.
    #[command(flatten)]
    pub globals: GlobalArgs,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Command,
}

/// Connection, login and output options.
#[derive(Debug, clap::Args)]
pub struct GlobalArgs {
    /// Server URL (overrides config).
    #[arg(short, long, env = "KC_SERVER_URL")]
    pub server: Option<String>,

    /// Realm to administer (overrides config).
    #[arg(short, long, env = "KC_REALM")]
    pub realm: Option<String>,

    /// Output format (overrides config).
    #[arg(short, long, value_enum)]
    pub output: Option<OutputFormat>,

    /// Enable debug logging of admin requests.
    #[arg(short, long)]
    pub verbose: bool,

    /// Administrator username (overrides config).
    #[arg(short, long, env = "KC_USERNAME")]
    pub username: Option<String>,

    /// Administrator password (prompted if absent).
    #[arg(long, env = "KC_PASSWORD", hide_env_values = true)]
    pub login_password: Option<String>,
}

/// CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// User management commands.
    #[command(subcommand)]
    User(UserCommand),

    /// Realm role commands.
    #[command(subcommand)]
    Role(RoleCommand),

    /// Audit event commands.
    #[command(subcommand)]
    Events(EventsCommand),

    /// Configuration management.
    #[command(subcommand)]
    Config(ConfigCommand),
}

/// User commands.
#[derive(Debug, Subcommand)]
pub enum UserCommand {
    /// List users with their realm roles.
    List {
        /// Offset of the first user.
        #[arg(long, default_value = "0")]
        first: u32,

        /// Maximum results.
        #[arg(long, default_value = "20")]
        max: u32,
    },

    /// Create a new user.
    Create {
        /// Username.
        username: String,

        /// Email address.
        #[arg(long)]
        email: Option<String>,

        /// Enable the user.
        #[arg(long, default_value = "true", action = clap::ArgAction::Set)]
        enabled: bool,

        /// Mark the email as verified.
        #[arg(long)]
        email_verified: bool,

        /// Initial password.
        #[arg(long)]
        password: Option<String>,

        /// Require password change on first login.
        #[arg(long, requires = "password")]
        temporary_password: bool,
    },

    /// Set user password.
    SetPassword {
        /// User ID.
        id: String,

        /// New password (will prompt if not provided).
        #[arg(long)]
        password: Option<String>,

        /// Temporary password (require change on login).
        #[arg(long)]
        temporary: bool,
    },

    /// Replace a user's realm roles with exactly the given set.
    SetRoles {
        /// User ID.
        id: String,

        /// Desired role names; none clears every assignable role.
        roles: Vec<String>,

        /// What to do with role names missing from the realm catalog.
        #[arg(long, value_enum, default_value = "skip")]
        on_unknown: UnknownRoleArg,
    },
}

/// Command-line form of [`UnknownRolePolicy`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum UnknownRoleArg {
    /// Leave unknown names out and report them.
    Skip,
    /// Refuse to change anything.
    Fail,
    /// Look each unknown name up on the server.
    Lookup,
}

impl From<UnknownRoleArg> for UnknownRolePolicy {
    fn from(arg: UnknownRoleArg) -> Self {
        match arg {
            UnknownRoleArg::Skip => Self::Skip,
            UnknownRoleArg::Fail => Self::Fail,
            UnknownRoleArg::Lookup => Self::Lookup,
        }
    }
}

/// Role commands.
#[derive(Debug, Subcommand)]
pub enum RoleCommand {
    /// List the realm role catalog.
    List,
}

/// Event commands.
#[derive(Debug, Subcommand)]
pub enum EventsCommand {
    /// List user events, newest first.
    List {
        /// Offset of the first event.
        #[arg(long, default_value = "0")]
        first: u32,

        /// Maximum results.
        #[arg(long, default_value = "20")]
        max: u32,

        /// Only these event types (repeatable, e.g. LOGIN or login-error).
        #[arg(long = "type", value_name = "TYPE")]
        types: Vec<AuditEventType>,
    },
}

/// Config commands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration.
    Show,

    /// Set a configuration value.
    Set {
        /// Configuration key.
        key: String,
        /// Configuration value.
        value: String,
    },

    /// Initialize configuration interactively.
    Init,
}
