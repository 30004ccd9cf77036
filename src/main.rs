mod app;
mod audio;
mod config;
mod library;
mod player;
mod runtime;
mod search;
mod storage;
mod ui;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    runtime::run()
}
