use clap::Subcommand;
use visionbreak_core::{ConfigError, FileSettingsStore, SettingsStore};

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Get a config value
    Get {
        /// Config key (e.g. "workInterval", "activeHours.start")
        key: String,
    },
    /// Set a config value
    Set {
        /// Config key
        key: String,
        /// New value
        value: String,
    },
    /// List all config values
    List,
    /// Reset config to defaults
    Reset,
    /// Print the config file location
    Path,
}

pub fn run(action: ConfigAction) -> Result<(), Box<dyn std::error::Error>> {
    let mut store = FileSettingsStore::open_default()?;
    match action {
        ConfigAction::Get { key } => match store.get().get_key(&key) {
            Some(value) => println!("{value}"),
            None => return Err(ConfigError::UnknownKey(key).into()),
        },
        ConfigAction::Set { key, value } => {
            let settings = store.set_key(&key, &value)?;
            // Echo the stored value: intervals may have been coerced.
            let stored = settings.get_key(&key).unwrap_or(value);
            println!("{key} = {stored}");
        }
        ConfigAction::List => {
            let json = serde_json::to_string_pretty(&store.get())?;
            println!("{json}");
        }
        ConfigAction::Reset => {
            store.reset()?;
            println!("config reset to defaults");
        }
        ConfigAction::Path => println!("{}", store.path().display()),
    }
    Ok(())
}
