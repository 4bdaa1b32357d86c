//! Utilities
use log::*;
use std::{env, fs, collections::HashMap, io::Write, path::Path};
use anyhow::{Result, Context};

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: &str = "9030";
pub const DEFAULT_USER: &str = "root";
pub const DEFAULT_PASSWORD: &str = "";

/// Resolve a setting: the command line option wins, then the environment (which includes `.env`
/// via `dotenv().ok()`), then the default.
///
/// A setting that is provided by option or environment is added to `changed_options`, so it can be
/// written to `.env`.
fn resolve_setting(
    option: &Option<String>,
    variable: &'static str,
    default: &str,
    changed_options: &mut HashMap<&'static str, String>,
    show_value: bool,
) -> String
{
    let shown = |value: &str| if show_value { value.to_string() } else { "********".to_string() };
    if let Some(value) = option {
        info!("{} argument set: using: {}", variable, shown(value));
        changed_options.insert(variable, value.to_string());
        value.to_string()
    } else {
        match env::var(variable) {
            Ok(set_var) => {
                info!("{} not set: set via .env: {}", variable, shown(&set_var));
                changed_options.insert(variable, set_var.to_owned());
                set_var
            }
            Err(_e) => {
                info!("{} not set: and not set via .env: using default: {}", variable, shown(default));
                default.to_string()
            }
        }
    }
}

pub fn set_host(
    option: &Option<String>,
    changed_options: &mut HashMap<&'static str, String>,
) -> String
{
    resolve_setting(option, "SRSTATS_HOST", DEFAULT_HOST, changed_options, true)
}

pub fn set_port(
    option: &Option<String>,
    changed_options: &mut HashMap<&'static str, String>,
) -> Result<u16>
{
    let port = resolve_setting(option, "SRSTATS_PORT", DEFAULT_PORT, changed_options, true);
    port.trim().parse::<u16>()
        .with_context(|| format!("Invalid port: {}", port))
}

pub fn set_user(
    option: &Option<String>,
    changed_options: &mut HashMap<&'static str, String>,
) -> String
{
    resolve_setting(option, "SRSTATS_USER", DEFAULT_USER, changed_options, true)
}

/// The password is never added to `changed_options`, so it is never written to `.env`.
pub fn set_password(
    option: &Option<String>,
) -> String
{
    let mut not_persisted = HashMap::new();
    resolve_setting(option, "SRSTATS_PASSWORD", DEFAULT_PASSWORD, &mut not_persisted, false)
}

/// The comma separated database allow list; empty means all databases.
pub fn set_databases(
    option: &Option<String>,
    changed_options: &mut HashMap<&'static str, String>,
) -> Vec<String>
{
    split_list(&resolve_setting(option, "SRSTATS_DATABASES", "", changed_options, true))
}

pub fn split_list(list: &str) -> Vec<String>
{
    list.split(',')
        .map(|entry| entry.trim())
        .filter(|entry| !entry.is_empty())
        .map(|entry| entry.to_string())
        .collect()
}

pub fn dotenv_writer(
    write_dotenv: bool,
    changed_options: HashMap<&str, String>,
    dotenv_file: &Path,
) -> Result<()>
{
    if !changed_options.is_empty() && write_dotenv {
        info!("Writing .env file");
        let mut file = fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(dotenv_file)
            .with_context(|| format!("Error writing .env file: {}", dotenv_file.display()))?;

        let mut settings: Vec<_> = changed_options.into_iter().collect();
        settings.sort();
        for (key, value) in settings {
            file.write_all(format!("{}={}\n", key, value).as_bytes())?;
            info!("{} written", key);
        }
    }
    Ok(())
}

/// Quote a database, table or column name.
pub fn quote_identifier(name: &str) -> String
{
    format!("`{}`", name.replace('`', "``"))
}

/// The back-quoted `database`.`table` name.
pub fn qualified_table(database: &str, table: &str) -> String
{
    format!("{}.{}", quote_identifier(database), quote_identifier(table))
}

/// Quote a string literal.
pub fn quote_literal(value: &str) -> String
{
    format!("'{}'", value.replace('\\', "\\\\").replace('\'', "''"))
}
