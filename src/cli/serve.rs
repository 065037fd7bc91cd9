use crate::api;
use crate::error::{AppError, Result};
use crate::settings::load_settings;

pub fn run(bind: Option<String>) -> Result<()> {
    let settings = load_settings();
    let bind_addr = bind.unwrap_or_else(|| settings.bind_addr.clone());
    let db_path = settings.db_path();
    if !db_path.exists() {
        return Err(AppError::Settings(format!(
            "No database found at {}\nRun `donortrail init` first.",
            db_path.display()
        )));
    }

    let runtime = tokio::runtime::Builder::new_multi_thread().enable_all().build()?;
    runtime.block_on(api::serve(db_path, &bind_addr, settings.allowed_origin.as_deref()))
}
