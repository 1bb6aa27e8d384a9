//! Jeeves entry point: load memory, start the reminder scheduler, then drive
//! the engine from a line-oriented stdin command loop. Speech and NLU run as
//! external collaborators, so resolved intents are injected as JSON lines.

use anyhow::{Context, Result};
use chrono::Local;
use clap::Parser;
use jeeves::calendar;
use jeeves::config::AppConfig;
use jeeves::initiator;
use jeeves::memory::persist;
use jeeves::scheduler::ReminderScheduler;
use jeeves::session::{deliver, Engine};
use jeeves::speech::{Notification, Notifier, Speaker};
use jeeves::{init_tracing, Intent};
use std::io::{self, BufRead};
use std::sync::Arc;
use tracing::{info, warn};

struct ConsoleSpeaker;

impl Speaker for ConsoleSpeaker {
    fn speak(&self, text: &str) {
        println!("Jeeves: {text}");
    }
}

struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, notification: &Notification) {
        println!(
            "\n[NOTIFICATION] {}: {}",
            notification.title, notification.message
        );
    }
}

fn main() -> Result<()> {
    let config = AppConfig::parse();
    init_tracing(&config);

    let memory_path = config.memory_path();
    let now = Local::now().naive_local();
    let store = persist::load_or_default(&memory_path, now);
    let engine = Arc::new(Engine::new(memory_path.clone(), store));
    info!(path = %memory_path.display(), "memory loaded");

    let speaker: Arc<ConsoleSpeaker> = Arc::new(ConsoleSpeaker);
    let notifier: Arc<ConsoleNotifier> = Arc::new(ConsoleNotifier);
    let _scheduler = ReminderScheduler::spawn(
        engine.clone(),
        speaker.clone(),
        notifier.clone(),
        config.tick_interval(),
    );

    println!("Personal assistant started.");
    println!("Paste a resolved intent as a JSON line, or use:");
    println!("  intents   - show the intent display");
    println!("  calendar  - show the weekly calendar");
    println!("  memories  - show relevant memories");
    println!("  initiate  - let the assistant open a turn if it is time");
    println!("  quit      - exit");

    engine.with_store(|store| {
        print!("{}", calendar::intent_display(store, now));
        print!("{}", calendar::weekly_calendar(store, now));
        print!("{}", calendar::relevant_memories(store));
    });

    speaker.speak("Hello, I'm your personal assistant. How can I help you today?");
    engine.touch(now);

    run_command_loop(&engine, speaker.as_ref(), notifier.as_ref())?;
    info!("shutting down");
    Ok(())
}

fn run_command_loop(
    engine: &Engine,
    speaker: &dyn Speaker,
    notifier: &dyn Notifier,
) -> Result<()> {
    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = line.context("reading stdin")?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        let now = Local::now().naive_local();
        match trimmed {
            "quit" | "exit" => break,
            "intents" => {
                engine.with_store(|store| print!("{}", calendar::intent_display(store, now)));
            }
            "calendar" => {
                engine.with_store(|store| print!("{}", calendar::weekly_calendar(store, now)));
            }
            "memories" => {
                engine.with_store(|store| print!("{}", calendar::relevant_memories(store)));
            }
            "initiate" => {
                if let Some(opening) = initiator::maybe_initiate(engine, now) {
                    speaker.speak(&opening);
                    engine.touch(now);
                }
            }
            raw if raw.starts_with('{') => match Intent::parse(raw) {
                Ok(intent) => {
                    let utterance = intent.message.clone();
                    match engine.handle_intent(intent, &utterance, now) {
                        Ok(effect) => deliver(&effect, speaker, notifier),
                        Err(err) => {
                            warn!(error = %err, "intent rejected");
                            println!("Error processing intent: {err}");
                        }
                    }
                }
                Err(err) => {
                    warn!(error = %err, "malformed intent line");
                    println!("Error processing intent: {err}");
                }
            },
            other => println!("Unrecognized command: {other}"),
        }
    }
    Ok(())
}
