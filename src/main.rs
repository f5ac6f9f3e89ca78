use actix_web::{web, App, HttpServer};
use clap::{Arg, Command};
use log::{error, info};
use std::fs::OpenOptions;
use std::io;
use std::path::{Path, PathBuf};

use delved::handlers;
use delved::models::AppState;
use delved::services::catalog::Catalog;
use delved::services::catalog_loader::{fetch_catalog, load_catalog, FETCH_TIMEOUT};

fn init_logging(log_file: Option<&String>) -> io::Result<()> {
    if let Some(file) = log_file {
        let log_output = OpenOptions::new().create(true).append(true).open(file)?;

        env_logger::Builder::from_default_env()
            .target(env_logger::Target::Pipe(Box::new(log_output)))
            .init();
    } else {
        env_logger::init();
    }
    Ok(())
}

fn catalog_path(share_dir: &str, catalog: &str) -> PathBuf {
    let catalog = Path::new(catalog);
    if catalog.is_absolute() {
        catalog.to_path_buf()
    } else {
        Path::new(share_dir).join(catalog)
    }
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    let matches = Command::new("delved")
        .version("0.1")
        .about("Inventory lookup and equipment set counting service")
        .arg(
            Arg::new("listen-host")
                .long("listen-host")
                .num_args(1)
                .default_value("0.0.0.0:2345")
                .help("Specify the listen address (e.g., 0.0.0.0:2345)"),
        )
        .arg(
            Arg::new("log-file")
                .long("log-file")
                .num_args(1)
                .help("Specify a log file path (if omitted, logs to stderr)"),
        )
        .arg(
            Arg::new("share-dir")
                .long("share-dir")
                .num_args(1)
                .default_value("./share")
                .help("Directory containing the item catalog"),
        )
        .arg(
            Arg::new("catalog")
                .long("catalog")
                .num_args(1)
                .default_value("items.csv")
                .help("Catalog file (.csv export or .json), relative to the share dir"),
        )
        .arg(
            Arg::new("catalog-url")
                .long("catalog-url")
                .num_args(1)
                .help("Download the catalog as CSV from this URL instead of reading --catalog"),
        )
        .get_matches();

    let listen_host = matches
        .get_one::<String>("listen-host")
        .expect("listen-host argument must always have a default value")
        .clone();
    let log_file = matches.get_one::<String>("log-file");
    let share_dir = matches
        .get_one::<String>("share-dir")
        .expect("share-dir argument must always have a default value");
    let catalog_file = matches
        .get_one::<String>("catalog")
        .expect("catalog argument must always have a default value");
    let catalog_url = matches.get_one::<String>("catalog-url");

    init_logging(log_file)?;

    let loaded = match catalog_url {
        Some(url) => {
            info!("Downloading item catalog from {}", url);
            fetch_catalog(url, FETCH_TIMEOUT).await
        }
        None => {
            let path = catalog_path(share_dir, catalog_file);
            info!("Loading item catalog from {}", path.display());
            load_catalog(&path)
        }
    };
    let catalog = loaded.unwrap_or_else(|e| {
        error!("{}. Serving with an empty catalog.", e);
        Catalog::default()
    });

    let shared_state = web::Data::new(AppState::new(catalog));

    info!("Listening on {}", listen_host);
    HttpServer::new(move || {
        App::new()
            .app_data(shared_state.clone())
            .app_data(handlers::json_config())
            .service(handlers::items::lookup_items)
            .service(handlers::items::list_spells)
            .service(handlers::sets::current_sets)
            .service(handlers::sets::filter_sets)
            .service(handlers::sets::sample)
            .service(handlers::health::healthz)
    })
    .bind(&listen_host)?
    .run()
    .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_path() {
        assert_eq!(
            catalog_path("./share", "items.csv"),
            PathBuf::from("./share/items.csv")
        );
        assert_eq!(
            catalog_path("./share", "/srv/delved/items.json"),
            PathBuf::from("/srv/delved/items.json")
        );
    }
}
