mod app;
use docard::*;

use app::MyApp;
use config::Config;
use database::{KeyValueStore, MemoryKv, SqliteKv};
use tracing::{info, warn};

fn main() -> eframe::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let config = Config::from_env();
    info!("Using database at {}", config.db_path.display());

    let backend: Box<dyn KeyValueStore> = match SqliteKv::open(&config.db_path) {
        Ok(kv) => Box::new(kv),
        Err(e) => {
            warn!("Could not open database, changes will not be kept: {}", e);
            Box::new(MemoryKv::new())
        }
    };
    let mut store = DeckStore::open(backend);

    if store.is_first_run() && config.seed_sample_deck {
        if let Some(deck) = store.add_deck("Spanish") {
            store.add_card(&deck, NewCard::new("hola", "hello"));
            store.add_card(&deck, NewCard::new("gato", "cat"));
            store.add_card(&deck, NewCard::new("gracias", "thank you"));
            info!("Sample data created");
        }
    }

    for deck in store.decks() {
        info!("  - {} ({} cards)", deck.title, deck.cards.len());
    }

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default().with_inner_size([500.0, 700.0]),
        ..Default::default()
    };
    eframe::run_native(
        "DoCard",
        options,
        Box::new(|_cc| Ok(Box::new(MyApp::new(store)))),
    )
}
