// SPDX-License-Identifier: MIT OR Apache-2.0
//! `animora` - headless timeline runner.
//!
//! Loads a timeline document, attaches a logging behavior to every clip and
//! either plays it at a fixed frame rate or scrubs it in preview mode.

mod args;

use animora_timeline::{FrameTime, PlayerEvent, TimelineDocument, TimelinePlayer, TracingClip};
use args::CliArgs;
use clap::Parser;
use std::cell::Cell;
use std::rc::Rc;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

fn main() {
    let args = CliArgs::parse();

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("animora=info,animora_timeline=debug"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting animora v{}", env!("CARGO_PKG_VERSION"));

    let path = args.document.as_path();
    let document = match TimelineDocument::load(path) {
        Ok(document) => document,
        Err(e) => {
            tracing::error!("Failed to load {:?}: {e}", path);
            std::process::exit(1);
        }
    };

    let mut player = TimelinePlayer::from_document(document, |settings| {
        Box::new(TracingClip::new(settings.name.clone()))
    });
    for (id, reason) in player.clip_errors() {
        tracing::warn!("Clip {:?} will be skipped: {}", id, reason);
    }

    if args.preview {
        scrub(&mut player, &args);
    } else {
        play(&mut player, &args);
    }
}

fn play(player: &mut TimelinePlayer, args: &CliArgs) {
    let loops = Rc::new(Cell::new(0u32));
    let counter = Rc::clone(&loops);
    player.subscribe(move |event| {
        if let PlayerEvent::CompleteLoop { .. } = event {
            counter.set(counter.get() + 1);
        }
        Ok(())
    });

    let delta = 1.0 / args.fps;
    let max_frames = (args.max_seconds * args.fps).ceil() as u64;
    let mut frames = 0u64;

    player.play();
    while frames < max_frames {
        player.update(FrameTime::new(delta));
        frames += 1;
        if !player.is_playing() {
            break;
        }
    }

    if player.is_playing() {
        tracing::info!("Time limit of {}s reached, stopping", args.max_seconds);
        player.stop();
    }
    tracing::info!(
        "Ran '{}' for {} frames ({:.2}s simulated), {} loop(s) completed",
        player.name,
        frames,
        frames as f32 * delta,
        loops.get()
    );
}

fn scrub(player: &mut TimelinePlayer, args: &CliArgs) {
    let duration = player.timeline_duration();
    let step = 1.0 / args.fps;
    let steps = (duration / step).ceil() as u32;

    player.start_preview();
    for i in 0..=steps {
        player.evaluate_preview(i as f32 * step);
    }
    for i in (0..=steps).rev() {
        player.evaluate_preview(i as f32 * step);
    }
    player.stop_preview();
    tracing::info!("Scrubbed '{}' over {:.2}s and back", player.name, duration);
}
