pub mod types;
pub mod book_aliases;
pub mod rich_text;
pub mod reference;
pub mod tag_index;
pub mod extract;
pub mod cache;
pub mod corpus;
pub mod dir_list;
pub mod app_settings;
pub mod app_data;
pub mod logger;

pub mod db;

use std::fs::create_dir_all;
use std::path::PathBuf;
use std::error::Error;
use app_dirs::{get_app_root, AppDataType, AppInfo};

pub const APP_INFO: AppInfo = AppInfo{name: "versefinder", author: "versefinder"};

/// Application directory for `log.txt` and `settings.json`. `VERSEFINDER_DIR`
/// (also from `.env`) overrides the platform user-data directory.
pub fn get_create_versefinder_dir() -> Result<PathBuf, Box<dyn Error>> {
    dotenvy::dotenv().ok();

    let p = match std::env::var("VERSEFINDER_DIR") {
        Ok(s) if !s.trim().is_empty() => PathBuf::from(s.trim()),
        // AppDataType::UserData
        // - Linux: ~/.local/share/versefinder
        _ => get_app_root(AppDataType::UserData, &APP_INFO)?,
    };
    if !p.exists() {
        create_dir_all(&p)?;
    }
    Ok(p)
}

pub fn get_settings_path() -> Result<PathBuf, Box<dyn Error>> {
    Ok(get_create_versefinder_dir()?.join("settings.json"))
}
