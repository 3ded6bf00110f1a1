//! Hand Cricket
//!
//! Terminal front end for the match engine.
//! `hand-cricket` plays interactively from stdin; `hand-cricket demo`
//! autoplays a seeded match twice and checks both runs agree.

use anyhow::{bail, Context, Result};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use hand_cricket::{
    VERSION,
    core::rng::{DeterministicRng, RandomSource},
    enrich::session::{MatchSession, SessionConfig},
    game::{input::HandMove, state::MatchPhase},
};

/// Seed used by the demo replay.
const DEMO_SEED: u64 = 20_240_607;

/// Hard stop for the demo, far beyond any real match length.
const DEMO_MAX_BALLS: usize = 10_000;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    info!("Hand Cricket v{}", VERSION);

    let config = SessionConfig::from_env()?;

    match std::env::args().nth(1).as_deref() {
        Some("demo") => demo(config),
        Some(other) => bail!("unknown command {other:?} (expected `demo` or no argument)"),
        None => interactive(config).await,
    }
}

// =============================================================================
// DEMO
// =============================================================================

/// Play the same seeded match twice and compare the final snapshots.
fn demo(mut config: SessionConfig) -> Result<()> {
    config.seed = Some(DEMO_SEED);
    info!("=== Demo match (seed {}) ===", DEMO_SEED);

    let first = autoplay(config.clone())?;
    let second = autoplay(config)?;

    if first != second {
        bail!("replay diverged for seed {DEMO_SEED}");
    }
    info!("Replay verified: both runs produced identical snapshots");
    Ok(())
}

/// Autoplay one match, returning its final JSON snapshot.
fn autoplay(config: SessionConfig) -> Result<String> {
    let seed = config.seed.unwrap_or(DEMO_SEED);
    let mut hands = DeterministicRng::new(seed ^ 0xA5A5_A5A5_A5A5_A5A5);
    let mut session = MatchSession::new(config);
    session.start_match();

    let mut balls = 0;
    while !session.state().is_over() {
        if balls >= DEMO_MAX_BALLS {
            bail!("match did not finish within {DEMO_MAX_BALLS} balls");
        }

        if session.state().phase() == MatchPhase::InningsBreak {
            session.start_second_innings();
            continue;
        }

        let human = HandMove::new(hands.roll_die())?;
        if let Some(ball) = session.play_ball(human) {
            debug!("{}: {}", ball.id, ball.commentary);
        }
        balls += 1;
    }

    let state = session.state();
    info!(
        "India {} / Pakistan {} after {} balls",
        state.india_score(),
        state.pakistan_score(),
        state.history().len()
    );
    if let Some(result) = state.result() {
        info!("{}", result);
    }

    Ok(session.snapshot_json()?)
}

// =============================================================================
// INTERACTIVE
// =============================================================================

/// One line of terminal input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Start,
    Play(HandMove),
    SecondInnings,
    Restart,
    Menu,
    Quit,
}

fn parse_command(line: &str) -> Result<Command> {
    let command = match line.trim() {
        "s" => Command::Start,
        "n" => Command::SecondInnings,
        "r" => Command::Restart,
        "m" => Command::Menu,
        "q" => Command::Quit,
        other => Command::Play(other.parse()?),
    };
    Ok(command)
}

async fn interactive(config: SessionConfig) -> Result<()> {
    let json = std::env::var("HAND_CRICKET_JSON").is_ok_and(|v| v == "1");
    let mut session = MatchSession::new(config);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    info!("Session {}", hex::encode(&session.id()[..4]));
    println!("s: start  1-6: play  n: second innings  r: restart  m: menu  q: quit");
    render(&session, json)?;

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                if line.trim().is_empty() {
                    continue;
                }

                let command = match parse_command(&line) {
                    Ok(command) => command,
                    Err(e) => {
                        warn!("Rejected input: {}", e);
                        continue;
                    }
                };

                match command {
                    Command::Start => session.start_match(),
                    Command::Play(human) => {
                        if session.play_ball(human).is_none() {
                            println!("No ball to play in {}", session.state().phase());
                        }
                    }
                    Command::SecondInnings => {
                        session.start_second_innings();
                    }
                    Command::Restart => session.restart_match(),
                    Command::Menu => session.return_to_menu(),
                    Command::Quit => break,
                }
                session.apply_pending();
                render(&session, json)?;
            }
            applied = session.next_enrichment() => {
                if applied {
                    render(&session, json)?;
                }
            }
        }
    }

    info!("Bye");
    Ok(())
}

fn render<R: RandomSource>(session: &MatchSession<R>, json: bool) -> Result<()> {
    if json {
        println!("{}", session.snapshot_json()?);
        return Ok(());
    }

    let state = session.state();
    let (overs, balls) = state.overs();
    println!("--------------------------------------------");
    println!(
        "[{}] India {}  Pakistan {}  Overs {}.{}",
        state.phase(),
        state.india_score(),
        state.pakistan_score(),
        overs,
        balls
    );
    if let Some(venue) = state.venue() {
        println!("Venue: {}", venue.name);
    }
    if let Some(needed) = state.runs_needed().filter(|_| state.phase() == MatchPhase::SecondInnings) {
        println!("Pakistan need {} to win", needed);
    }
    if let Some(ball) = state.last_ball() {
        println!(
            "{} {} v {} {}: {}",
            ball.batting, ball.batting_move, ball.bowling, ball.bowling_move, ball.commentary
        );
    }
    if let Some(tip) = session.coach_tip() {
        println!("Coach: {}", tip);
    }
    if let Some(result) = state.result() {
        println!("Result: {}", result);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_command() {
        assert_eq!(parse_command("s").unwrap(), Command::Start);
        assert_eq!(parse_command(" q ").unwrap(), Command::Quit);
        assert_eq!(parse_command("4").unwrap(), Command::Play(HandMove::new(4).unwrap()));
        assert!(parse_command("7").is_err());
        assert!(parse_command("x").is_err());
    }

    #[test]
    fn test_demo_replays() {
        let config = SessionConfig {
            seed: Some(DEMO_SEED),
            commentary_chance_percent: 0,
            ..Default::default()
        };
        let first = autoplay(config.clone()).unwrap();
        let second = autoplay(config).unwrap();
        assert_eq!(first, second);
        assert!(first.contains("\"phase\":\"MatchOver\""));
    }
}
