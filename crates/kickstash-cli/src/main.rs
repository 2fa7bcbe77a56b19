//! Kickstash terminal front-end
//!
//! Stand-in for the rendering layer: observes the published sneaker list
//! and triggers the demo add action. `add` waits for the refreshed
//! snapshot before reprinting so the round trip is visible.

use std::io::Write as _;
use std::path::PathBuf;

use tokio::io::AsyncBufReadExt;

use kickstash_core::{App, Config, CoreError, Sneaker};

#[tokio::main]
async fn main() -> kickstash_core::Result<()> {
    kickstash_core::init_logging();

    let config = match std::env::args().nth(1) {
        Some(path) => Config {
            database_path: PathBuf::from(path),
        },
        None => Config::default(),
    };

    let app = App::new(config)?;
    let model = app.model().clone();
    let mut observer = model.subscribe();

    println!("kickstash ({})", app.config().database_path.display());
    println!("commands: list, add, quit");
    render(&observer.current());

    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    let mut lines = stdin.lines();

    loop {
        print!("> ");
        std::io::stdout()
            .flush()
            .map_err(|e| CoreError::Config(e.to_string()))?;

        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => return Err(CoreError::Config(e.to_string())),
        };

        match line.trim() {
            "list" => render(&observer.current()),
            "add" => {
                let before = observer.current();
                model.add_demo_sneaker();

                // Wait for the snapshot that reflects the write
                loop {
                    match observer.next().await {
                        Some(rows) if rows != before => {
                            render(&rows);
                            break;
                        }
                        Some(_) => continue,
                        None => break,
                    }
                }
            }
            "quit" | "exit" => break,
            "" => {}
            other => println!("unknown command: {other}"),
        }
    }

    Ok(())
}

fn render(sneakers: &[Sneaker]) {
    if sneakers.is_empty() {
        println!("(no sneakers yet)");
        return;
    }

    for sneaker in sneakers {
        println!(
            "#{:<4} {} | {} | {} \u{20bd}",
            sneaker.id, sneaker.name, sneaker.brand, sneaker.price
        );
        println!("      {}", sneaker.image_url);
    }
}
