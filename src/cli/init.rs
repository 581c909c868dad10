use std::path::PathBuf;

use crate::db::{get_connection, init_db};
use crate::error::Result;
use crate::settings::{expand_path, save_settings, Settings};

pub fn run(data_dir: Option<String>) -> Result<()> {
    let settings = match data_dir {
        Some(dir) => Settings {
            data_dir: expand_path(&dir),
        },
        None => Settings::default(),
    };

    let dir = PathBuf::from(&settings.data_dir);
    std::fs::create_dir_all(&dir)?;
    save_settings(&settings)?;

    let conn = get_connection(&dir.join("tally.db"))?;
    init_db(&conn)?;

    println!("Initialized tally database in {}", settings.data_dir);
    Ok(())
}
