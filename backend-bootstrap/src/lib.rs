pub mod context;
pub mod datagen;
pub mod lifecycle;
pub mod logging;
pub mod training;

pub use lifecycle::run_standalone;

pub async fn run() -> anyhow::Result<()> {
    run_standalone().await
}
