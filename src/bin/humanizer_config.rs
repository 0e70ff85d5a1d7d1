use anyhow::{anyhow, bail, Context};
use humanizer_lib::services::providers::API_KEY_NAME;
use humanizer_lib::services::ConfigStore;
use std::path::PathBuf;

fn parse_arg_value(args: &[String], key: &str) -> Option<String> {
    args.iter()
        .position(|a| a == key)
        .and_then(|i| args.get(i + 1))
        .cloned()
}

fn usage() {
    eprintln!(
        "Usage:\n  cargo run --bin humanizer_config -- show [--dir <config dir>]\n  cargo run --bin humanizer_config -- init [--dir <config dir>]\n  cargo run --bin humanizer_config -- set-key <key> [--provider <name>] [--dir <config dir>]\n  cargo run --bin humanizer_config -- delete-key [--provider <name>] [--dir <config dir>]\n\nEvery write keeps a timestamped backup of the previous config (last 10 kept)."
    );
}

fn main() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().collect();
    let Some(command) = args.get(1) else {
        usage();
        return Ok(());
    };

    let dir = match parse_arg_value(&args, "--dir") {
        Some(d) => PathBuf::from(d),
        None => ConfigStore::default_config_dir().context("no config directory on this platform")?,
    };
    let provider = parse_arg_value(&args, "--provider").unwrap_or_else(|| API_KEY_NAME.to_string());
    let store = ConfigStore::new(dir);

    match command.as_str() {
        "show" => {
            let config = store.load().map_err(|e| anyhow!(e))?;
            println!("Config: {}", store.config_file().display());
            println!("{}", serde_json::to_string_pretty(&config.redacted())?);
        }
        "init" => {
            let config = store.load().map_err(|e| anyhow!(e))?;
            store.save(&config).map_err(|e| anyhow!(e))?;
            println!("Written: {}", store.config_file().display());
        }
        "set-key" => {
            let key = match args.get(2) {
                Some(k) if !k.starts_with("--") => k,
                _ => bail!("set-key needs the key as its first argument"),
            };
            store.set_api_key(&provider, key).map_err(|e| anyhow!(e))?;
            println!("Stored API key for '{}' in {}", provider, store.config_file().display());
        }
        "delete-key" => {
            store.delete_api_key(&provider).map_err(|e| anyhow!(e))?;
            println!("Removed API key for '{}'", provider);
        }
        other => {
            usage();
            bail!("unknown command '{}'", other);
        }
    }

    Ok(())
}
