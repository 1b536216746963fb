mod bootstrap;
mod summary;

use anyhow::Result;
use pubstats_core::settings::{LastUsedParams, Settings};
use pubstats_data::series::SeriesTable;
use pubstats_data::store::CacheStore;
use pubstats_runtime::client::{ClientConfig, RepositoryClient};
use pubstats_runtime::data_manager::DataManager;
use pubstats_runtime::fetcher::StatsFetcher;
use pubstats_ui::app::{App, View};
use pubstats_ui::dashboard::DashboardData;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    let settings = Settings::load_with_last_used();

    bootstrap::ensure_directories()?;
    bootstrap::setup_logging(&settings.log_level, settings.log_file.as_ref())?;

    if settings.clear {
        info!("Saved configuration cleared");
        println!("Saved configuration cleared.");
        return Ok(());
    }

    settings.validate()?;
    let (from, to) = settings.month_bounds()?;

    info!("pubstats v{} starting", env!("CARGO_PKG_VERSION"));
    info!(
        group = %settings.group_id,
        view = %settings.view,
        data_dir = %settings.data_dir.display(),
        sample = ?settings.sample,
        "Configuration loaded"
    );

    let store = CacheStore::new(settings.data_dir.clone(), settings.file_suffix());
    let fetcher = StatsFetcher::new(settings.request_delay());
    let mut manager = DataManager::new(
        store,
        settings.cache_max_age(),
        fetcher,
        settings.max_items,
    )
    .with_sample(settings.sample);

    let dataset = if settings.offline {
        manager.load_offline()?
    } else {
        match ClientConfig::from_settings(&settings) {
            Ok(config) => {
                let client = RepositoryClient::new(config)?;
                manager.get_data(&client, settings.refresh).await?
            }
            // Without credentials an existing cache is still worth showing.
            Err(e) if manager.store().exists() => {
                warn!(error = %e, "No usable API configuration; reading cache only");
                manager.load_offline()?
            }
            Err(e) => return Err(e.into()),
        }
    };
    info!(
        origin = dataset.origin.describe(),
        publications = dataset.tables.publications.len(),
        "Dataset ready"
    );

    let series = SeriesTable::build(&dataset.tables, from, to)?;
    if let Err(e) = manager.store().write_estimates(&series.estimated_rows()) {
        warn!(error = %e, "Could not write download estimates");
    }

    if settings.fetch_only {
        print!("{}", summary::render_summary(&settings.group_id, &dataset, &series));
        return Ok(());
    }

    let data = DashboardData::new(
        settings.group_id.clone(),
        dataset.origin.describe(),
        dataset.tables,
        series,
    );
    let app = App::new(
        &settings.theme,
        View::from_name(&settings.view),
        usize::from(settings.top_n),
    );
    let app = app.run(&data)?;

    // Reopen on the view and ranking size the session ended with.
    let mut last = LastUsedParams::from(&settings);
    last.view = Some(app.view.name().to_string());
    last.top_n = u16::try_from(app.top_n).ok();
    if let Err(e) = last.save_to(&LastUsedParams::config_path()) {
        warn!(error = %e, "Could not persist last-used parameters");
    }

    Ok(())
}
