use clap::Parser;
use rally_core::{
    Beat, MatchSnapshot, PacingConfig, PlayerId, PlayerStats, PointEnding, PresentationSink,
    SpeedMultiplier,
};
use rally_host::{RunResult, SessionConfig, SessionHost};
use rally_tennis::{TennisConfig, TennisSimulator};
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Instant;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "headless_runner")]
#[command(about = "Plays a tennis rotation session on the console")]
struct Args {
    /// Number of matches to play
    #[arg(short, long, default_value = "20")]
    matches: u64,

    /// Session seed, overrides the config file
    #[arg(long)]
    seed: Option<u64>,

    /// Sleep through the paced beats and print every point
    #[arg(short, long)]
    realtime: bool,

    /// Playback speed in real-time mode, clamped to [0.25, 4]
    #[arg(long, default_value = "1.0")]
    speed: f32,

    /// JSON file with `session`, `tennis` and `pacing` sections
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RunnerConfig {
    session: SessionConfig,
    tennis: TennisConfig,
    pacing: PacingConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    let mut config = load_config(args.config.as_ref())?;
    if let Some(seed) = args.seed {
        config.session.seed = seed;
    }
    let speed = SpeedMultiplier::new(args.speed)
        .ok_or_else(|| format!("invalid speed multiplier {}", args.speed))?;

    let seed = config.session.seed;
    let mut host = SessionHost::<TennisSimulator>::new(config.session, config.tennis)?;
    let mut sink = ConsoleSink {
        verbose: args.realtime,
        pacing: args.realtime.then(|| (config.pacing, speed)),
    };

    if args.realtime {
        println!("=== Running in Real-Time Mode (speed x{}) ===", speed.get());
        println!("Press Ctrl+C to stop\n");
    }

    let started = Instant::now();
    host.announce(&mut sink);
    let result = host.run_for_matches(args.matches, &mut sink)?;

    println!("\n=== Rotation Session Complete ===");
    println!("Seed: {}", seed);
    println!("Matches: {}", result.snapshots.len());
    println!("Points: {}", result.points_played);
    println!("Elapsed: {:.2?}", started.elapsed());

    print_summary(&result, &host.stats());
    Ok(())
}

fn load_config(path: Option<&PathBuf>) -> Result<RunnerConfig, Box<dyn std::error::Error>> {
    match path {
        Some(path) => Ok(serde_json::from_str(&std::fs::read_to_string(path)?)?),
        None => Ok(RunnerConfig::default()),
    }
}

/// Prints session updates. With pacing set, sleeps through every beat.
struct ConsoleSink {
    verbose: bool,
    pacing: Option<(PacingConfig, SpeedMultiplier)>,
}

impl PresentationSink for ConsoleSink {
    fn players_initialized(&mut self, active: (&PlayerId, &PlayerId), bench: &PlayerId, reason: &str) {
        println!("On court: {} vs {}, bench: {} ({})", active.0, active.1, bench, reason);
    }

    fn score_updated(&mut self, score: (u32, u32), active: (&PlayerId, &PlayerId)) {
        if self.verbose {
            println!("    {} {} - {} {}", active.0, score.0, score.1, active.1);
        }
    }

    fn match_completed(&mut self, snapshot: &MatchSnapshot) {
        print_match(snapshot);
    }

    fn beat(&mut self, beat: Beat) {
        if let Some((pacing, speed)) = &self.pacing {
            std::thread::sleep(speed.scale(pacing.delay_for(beat)));
        }
    }
}

fn print_match(snapshot: &MatchSnapshot) {
    let forced = if snapshot.forced_bench { " [forced rest]" } else { "" };
    println!(
        "[{:>4}] {} beat {} {}-{} | next: {} vs {}, bench {}{}",
        snapshot.match_number,
        snapshot.winner,
        snapshot.loser,
        snapshot.final_score.0,
        snapshot.final_score.1,
        snapshot.active_after.0,
        snapshot.active_after.1,
        snapshot.bench_after,
        forced
    );
}

/// Times each player was sent to the bench.
fn bench_counts(snapshots: &[MatchSnapshot]) -> Vec<(PlayerId, usize)> {
    let mut counts: Vec<(PlayerId, usize)> = Vec::new();
    for snapshot in snapshots {
        match counts.iter_mut().find(|(id, _)| *id == snapshot.bench_after) {
            Some((_, count)) => *count += 1,
            None => counts.push((snapshot.bench_after.clone(), 1)),
        }
    }
    counts
}

fn print_summary(result: &RunResult, stats: &[(PlayerId, PlayerStats)]) {
    const ENDINGS: [(PointEnding, &str); 5] = [
        (PointEnding::Ace, "Aces"),
        (PointEnding::CleanWinner, "Clean winners"),
        (PointEnding::UnforcedError, "Unforced errors"),
        (PointEnding::PassedOpponent, "Passed opponent"),
        (PointEnding::RallyCap, "Rally cap reached"),
    ];

    println!("\n=== Point Endings ===");
    for (ending, label) in ENDINGS {
        let count = result.endings.get(&ending).copied().unwrap_or(0);
        println!("{}: {}", label, count);
    }

    println!("\n=== Players ===");
    for (id, stat) in stats {
        println!(
            "{}: {} wins, {} losses, streak {}",
            id, stat.wins, stat.losses, stat.current_streak
        );
    }

    println!("\n=== Rotation ===");
    let forced = result.snapshots.iter().filter(|s| s.forced_bench).count();
    println!("Forced rests: {}", forced);
    for (id, count) in bench_counts(&result.snapshots) {
        println!("{} benched {} times", id, count);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rally_core::NullSink;

    #[test]
    fn test_config_sections_default_independently() {
        let path = std::env::temp_dir().join(format!("headless-runner-{}.json", std::process::id()));
        std::fs::write(&path, r#"{"session": {"seed": 9}, "pacing": {"ready": 0}}"#).unwrap();
        let config = load_config(Some(&path)).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(config.session.seed, 9);
        assert_eq!(config.session.max_streak, 3);
        assert_eq!(config.pacing.ready, std::time::Duration::ZERO);
        assert_eq!(config.tennis.sim.rally_cap, 50);
    }

    #[test]
    fn test_bench_counts_cover_every_match() {
        let mut host =
            SessionHost::<TennisSimulator>::new(SessionConfig::default(), TennisConfig::default())
                .unwrap();
        let result = host.run_for_matches(30, &mut NullSink).unwrap();

        let counts = bench_counts(&result.snapshots);
        assert_eq!(counts.iter().map(|(_, n)| n).sum::<usize>(), 30);
        assert!(counts.len() <= 3);
    }
}
