/// Configuration management command handlers
use std::fmt::Write;

use anyhow::{Context, Result};
use reptrack_core::Config;
use reptrack_storage::Database;

use super::helpers::rule;

pub fn handle_config_get(key: &str) -> Result<()> {
    let config = Config::load()?;
    let value = config.get(key)?;
    if value.is_empty() {
        println!("{key} is not set");
    } else {
        println!("{key} = {value}");
    }
    Ok(())
}

/// Writes the file as stored, without `REPTRACK_*` overrides
pub fn handle_config_set(key: &str, value: &str) -> Result<()> {
    let path = Config::path()?;
    let mut config = Config::load_from(&path)?;
    config.set(key, value)?;
    config.save_to(&path)?;
    println!("Set {key} = {value}");
    Ok(())
}

pub fn handle_config_list() -> Result<()> {
    let config = Config::load()?;

    println!("Configuration:");
    println!("{}", rule(14));

    let mut section = "";
    for (key, value) in config.entries() {
        let (key_section, field) = key.split_once('.').unwrap_or(("", key));
        if key_section != section {
            println!("\n[{key_section}]");
            section = key_section;
        }
        if value.is_empty() {
            println!("  {field} = (default)");
        } else {
            println!("  {field} = {value}");
        }
    }

    let db = Database::new(config.storage.db_path.clone()).context("Failed to open database")?;
    println!("\nStored data:");
    print!("{}", stored_keys(&db)?);
    Ok(())
}

/// One line per stored key with its last update time
pub fn stored_keys(db: &Database) -> Result<String> {
    let keys = db.list_keys()?;
    if keys.is_empty() {
        return Ok("  (empty)\n".to_string());
    }

    let mut out = String::new();
    for (key, updated_at) in keys {
        let _ = writeln!(out, "  {key} (updated {updated_at})");
    }
    Ok(out)
}

pub fn handle_config_path() -> Result<()> {
    println!("{}", Config::path()?.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use reptrack_storage::{KeyValueStore, GOALS_KEY, SESSIONS_KEY};

    #[test]
    fn test_stored_keys_empty_database() {
        let db = Database::open_in_memory().unwrap();
        assert_eq!(stored_keys(&db).unwrap(), "  (empty)\n");
    }

    #[test]
    fn test_stored_keys_lists_each_key() {
        let db = Database::open_in_memory().unwrap();
        db.set(SESSIONS_KEY, "[]").unwrap();
        db.set(GOALS_KEY, "[]").unwrap();

        let listing = stored_keys(&db).unwrap();
        let lines: Vec<&str> = listing.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines.iter().any(|l| l.contains(SESSIONS_KEY)));
        assert!(lines.iter().all(|l| l.contains("(updated ")));
    }
}
