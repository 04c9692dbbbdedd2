//! Configuration management commands.

use crate::cli::ConfigCommand;
use crate::config::{AuthConfig, OutputFormat};
use crate::output::{info, prompt_line, success};
use crate::{CliConfig, CliError, CliResult};

/// Runs a config command.
pub fn run_config(cmd: ConfigCommand, config: &mut CliConfig) -> CliResult<()> {
    match cmd {
        ConfigCommand::Show => show_config(config),
        ConfigCommand::Set { key, value } => {
            apply_setting(config, &key, &value)?;
            config.save()?;
            success(&format!("Set {key} = {value}"));
            Ok(())
        }
        ConfigCommand::Init => init_config(config),
    }
}

fn show_config(config: &CliConfig) -> CliResult<()> {
    info(&format!("Configuration file: {}", CliConfig::config_path()?.display()));
    println!();
    println!("server_url: {}", config.server_url);
    if let Some(realm) = &config.default_realm {
        println!("default_realm: {realm}");
    }
    println!("output_format: {:?}", config.output_format);
    if let Some(concurrency) = config.enrichment_concurrency {
        println!("enrichment_concurrency: {concurrency}");
    }
    if let Some(auth) = &config.auth {
        println!("auth.realm: {}", auth.realm);
        println!("auth.client_id: {}", auth.client_id);
        if let Some(username) = &auth.username {
            println!("auth.username: {username}");
        }
        if auth.client_secret.is_some() {
            println!("auth.client_secret: ****");
        }
    }
    Ok(())
}

fn auth(config: &mut CliConfig) -> &mut AuthConfig {
    config.auth.get_or_insert_with(AuthConfig::default)
}

/// Applies one `key = value` setting in memory.
pub fn apply_setting(config: &mut CliConfig, key: &str, value: &str) -> CliResult<()> {
    let optional = |v: &str| (!v.is_empty() && v != "none").then(|| v.to_string());
    match key {
        "server_url" | "server" => config.server_url = value.to_string(),
        "default_realm" | "realm" => config.default_realm = optional(value),
        "output_format" | "output" => config.output_format = value.parse::<OutputFormat>()?,
        "enrichment_concurrency" => {
            let parsed = value
                .parse::<usize>()
                .ok()
                .filter(|n| *n > 0)
                .ok_or_else(|| {
                    CliError::InvalidArgument(format!("not a positive number: {value}"))
                })?;
            config.enrichment_concurrency = Some(parsed);
        }
        "auth.realm" => auth(config).realm = value.to_string(),
        "auth.client_id" => auth(config).client_id = value.to_string(),
        "auth.client_secret" => auth(config).client_secret = optional(value),
        "auth.username" => auth(config).username = optional(value),
        _ => {
            return Err(CliError::InvalidArgument(format!(
                "unknown configuration key: {key}. Known keys: server_url, default_realm, \
                 output_format, enrichment_concurrency, auth.realm, auth.client_id, \
                 auth.client_secret, auth.username"
            )));
        }
    }
    Ok(())
}

fn init_config(config: &mut CliConfig) -> CliResult<()> {
    info("Initializing Keycloak CLI configuration...");
    println!();

    config.server_url = prompt_line("Server URL", &config.server_url)?;
    let realm = prompt_line("Default realm", config.default_realm.as_deref().unwrap_or("none"))?;
    apply_setting(config, "default_realm", &realm)?;

    let mut auth = config.auth_or_default();
    auth.realm = prompt_line("Login realm", &auth.realm)?;
    auth.client_id = prompt_line("Login client", &auth.client_id)?;
    let username = prompt_line("Username", auth.username.as_deref().unwrap_or("none"))?;
    auth.username = (username != "none").then_some(username);
    config.auth = Some(auth);

    let current_format = format!("{:?}", config.output_format);
    let format = prompt_line("Output format (table/json/quiet)", &current_format)?;
    if let Ok(parsed) = format.parse() {
        config.output_format = parsed;
    }

    config.save()?;
    println!();
    success(&format!("Configuration saved to: {}", CliConfig::config_path()?.display()));
    Ok(())
}
