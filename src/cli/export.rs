use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::candidates::{resolve_id, Registry};
use crate::client::ApiClient;
use crate::db::get_connection;
use crate::error::Result;
use crate::reports::{export_filename, write_combined_csv};
use crate::settings::{load_settings, Settings};

fn output_path(settings: &Settings, slug: &str, output: Option<String>) -> Result<PathBuf> {
    let path = output
        .map(PathBuf::from)
        .unwrap_or_else(|| Path::new(&settings.data_dir).join("exports").join(export_filename(slug)));
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(path)
}

pub fn run(candidate: &str, output: Option<String>, remote: bool) -> Result<()> {
    let settings = load_settings();

    if remote {
        let client = ApiClient::new(&settings.api_base_url);
        let entry = Registry::new(client.candidates()?).require(candidate)?.clone();
        let bytes = client.download_csv(&entry.slug)?;
        let path = output_path(&settings, &entry.slug, output)?;
        let mut file = File::create(&path)?;
        file.write_all(&bytes)?;
        println!("Wrote {} to {}", export_filename(&entry.slug), path.display());
        return Ok(());
    }

    let conn = get_connection(&settings.db_path())?;
    let (id, c) = resolve_id(&conn, candidate)?;
    let path = output_path(&settings, &c.slug, output)?;
    let rows = write_combined_csv(&conn, id, BufWriter::new(File::create(&path)?))?;
    println!("Wrote {rows} contributions to {}", path.display());
    Ok(())
}
