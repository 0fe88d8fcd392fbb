//! Competition Day Demo
//!
//! Walks one event through a competition day against the in-memory
//! collaborators:
//! - Building and reordering the running order
//! - Configuring the stage for a cell
//! - Previewing and confirming heats
//! - Following progress and finishing the cell
//!
//! # Usage
//!
//! ```bash
//! RUST_LOG=competition_day=debug cargo run --bin demo
//! ```

use competition_day::{CompetitionDay, Config, HeatGeneration, metrics};
use std::sync::Arc;
use tanda_core::environment::SystemClock;
use tanda_core::schedule::{DanceConfiguration, LevelSelection};
use tanda_core::stage::LevelConfig;
use tanda_core::types::{Category, Cell, EventId, Gender, Phase};
use tanda_testing::fixtures::participants;
use tanda_testing::{InMemoryDocumentStore, InMemoryRegistrantDirectory};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::from_env();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("{},competition_day=info", config.log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if config.metrics_enabled {
        metrics::register_metrics();
    }

    println!("\n💃 ============================================");
    println!("   Competition Day - Live Demo");
    println!("============================================\n");

    let store = InMemoryDocumentStore::new();
    let directory = InMemoryRegistrantDirectory::new();
    directory.register_all(participants("Seriado", "Adulto", Phase::Final, 10));
    directory.register_all(participants("Seriado", "Baby", Phase::Final, 4));

    let app = CompetitionDay::new(
        config,
        Arc::new(store.clone()),
        Arc::new(directory),
        Arc::new(SystemClock),
    );
    let event_id = EventId::new();

    // ========== Running order ==========

    println!("1️⃣  Building the running order...");
    let configuration = DanceConfiguration::new().with_level(
        "Seriado",
        LevelSelection::new(
            vec![Category::new("Baby"), Category::new("Adulto")],
            vec![Phase::Final],
            false,
        ),
    );
    for item in app.rebuild_schedule(&event_id, &configuration).await? {
        println!(
            "   {:>2}. {} {} {} ({} min)",
            item.order, item.level_id, item.category, item.phase, item.estimated_time
        );
    }

    println!("\n2️⃣  Dancing Adulto first...");
    app.move_item(&event_id, 1, 0).await?;
    let saved = app.save_schedule(&event_id).await?;
    for item in &saved {
        println!("   {:>2}. {} {}", item.order, item.level_id, item.category);
    }

    // ========== Heats ==========

    let cell = Cell::new("Seriado", "Adulto", Gender::Mixto);

    println!("\n3️⃣  Configuring the stage for {cell}: 2 blocks × 3 tracks, 2 judges...");
    app.configure(&event_id, &cell, LevelConfig::new(2, 3, 2, "Main floor")?)
        .await?;
    println!("   Status: {}", app.status(&event_id, &cell.id()).await?);

    println!("\n4️⃣  Previewing heats...");
    match app.generate(&event_id, &cell, Phase::Final).await? {
        HeatGeneration::Preview(tandas) => {
            for tanda in &tandas {
                println!("   Tanda {}: {} participants", tanda.number, tanda.participant_count());
            }
        }
        HeatGeneration::Existing(tandas) => {
            println!("   Already confirmed: {} tandas", tandas.len());
        }
    }

    println!("\n5️⃣  Confirming the preview...");
    let live = app.confirm_preview(&event_id, &cell, Phase::Final).await?;
    println!(
        "   {} tandas confirmed, status: {}",
        live.total_tandas,
        live.status()
    );

    println!("\n6️⃣  Asking again returns the confirmed heats...");
    let again = app.generate(&event_id, &cell, Phase::Final).await?;
    println!("   Preview: {}, tandas: {}", again.is_preview(), again.tandas().len());

    println!("\n7️⃣  Finishing the cell...");
    app.finish(&event_id, &cell.id()).await?;

    println!("\n📋 Overview:");
    for overview in app.overview(&event_id).await? {
        println!(
            "   {:<24} {:<12} {}/{}",
            overview.id.as_str(),
            overview.status.as_str(),
            overview.completed_tandas,
            overview.total_tandas
        );
    }

    println!("\n✓ {} documents stored", store.len());
    Ok(())
}
