//! Self-play games between two copies of one evaluator.
//!
//! A game is played until both sides pass in a row. Dead stones are then
//! settled by a resolution playout: starting from the finished position, each
//! side only plays moves no worse than its pass score at the end of the game.
//! Groups wiped out by that playout are dead, groups that survive intact are
//! alive, and groups that lose only some stones are a contradiction that sends
//! the game back into normal play with passing disallowed for one move.

use std::collections::HashMap;
use std::io::{self, Write};
use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::board::{Game, Group, Intersection, Move, Player, Position, DEFAULT_KOMI};
use crate::error::{Error, Result};
use crate::nn::{Evaluator, EvaluatorConfig};
use crate::recommend::{
    BestRawScoreRecommender, FuzzyBestLocalInvariantRecommender, Recommender, RecommenderKind,
};
use crate::score::Score;

/// Configuration for self-play game generation.
///
/// Loaded from JSON; every field has a default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelfPlayConfig {
    pub evaluator: EvaluatorConfig,
    pub recommender: RecommenderKind,
    /// Number of games to play.
    pub games: usize,
    /// Cap on moves in the main game and in each resolution playout.
    pub max_moves: usize,
    /// Cap on dead-stone resolution attempts before the game is cut short.
    pub max_resolutions: usize,
    /// Run each layer's units concurrently.
    pub parallel: bool,
    pub komi: f64,
}

impl Default for SelfPlayConfig {
    fn default() -> Self {
        SelfPlayConfig {
            evaluator: EvaluatorConfig::default(),
            recommender: RecommenderKind::default(),
            games: 1,
            max_moves: 1000,
            max_resolutions: 10,
            parallel: true,
            komi: DEFAULT_KOMI,
        }
    }
}

/// A complete self-play game.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameRecord {
    pub game_id: usize,
    /// Weight seed of the evaluator that played the game.
    pub seed: u64,
    pub board_size: usize,
    pub recommender: RecommenderKind,
    /// Moves of the real game, resumed play included.
    pub moves: Vec<String>,
    /// Moves spent across all resolution playouts.
    pub resolution_moves: usize,
    pub resolution_attempts: usize,
    pub dead_stones: Vec<String>,
    pub komi: f64,
    pub black_score: f64,
    pub white_score: f64,
    /// `"black"`, `"white"`, or `None` on a tie.
    pub winner: Option<String>,
    /// True if a move or resolution cap ended the game early.
    pub truncated: bool,
}

/// How a resolution playout judged the groups of a finished game.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// The groups captured during the playout.
    Settled(Vec<Group>),
    /// Some group lost part, but not all, of its stones.
    Contradiction,
}

/// Compares each group of `finished` against the end of its playout.
pub fn classify_groups(finished: &Game, playout: &Game) -> Resolution {
    let mut dead = Vec::new();
    for group in finished.groups() {
        let expected = Intersection::Stone(group.owner);
        let removed = group
            .members
            .iter()
            .filter(|&&member| playout.get(member) != expected)
            .count();
        if removed == group.members.len() {
            dead.push(group);
        } else if removed > 0 {
            return Resolution::Contradiction;
        }
    }
    Resolution::Settled(dead)
}

fn player_name(player: Player) -> String {
    player.to_string().to_lowercase()
}

fn no_move(position: &Game) -> Error {
    Error::Internal {
        reason: "the recommender found no move".to_string(),
        position: position.to_string(),
    }
}

/// Plays one game to the end with `recommender`.
pub fn play_game<R: Recommender<Game>>(
    evaluator: &Evaluator,
    recommender: &R,
    config: &SelfPlayConfig,
    game_id: usize,
) -> Result<GameRecord> {
    let dimension = evaluator.dimension();
    let mut game = Game::builder(dimension).komi(config.komi).build()?;
    let mut moves: Vec<Move> = Vec::new();
    let mut avoid_passing = false;
    let mut resolution_moves = 0;
    let mut resolution_attempts = 0;
    let mut truncated = false;
    let mut dead: Vec<Group> = Vec::new();

    'game: loop {
        // The last pass score seen and who it belongs to.
        let mut last_pass: Option<(Player, Score)> = None;
        while !game.is_finished() {
            if moves.len() >= config.max_moves {
                truncated = true;
                break 'game;
            }
            let evaluation = evaluator.evaluate(&game, config.parallel)?;
            let choice = if avoid_passing {
                recommender.recommend_game_play_avoiding_pass(&evaluation)?
            } else {
                recommender.recommend_game_play(&evaluation)?
            }
            .ok_or_else(|| no_move(&game))?;

            if let Some(player) = game.current_player() {
                last_pass = Some((player, evaluation.score_for(Move::Pass)?));
                log::info!("game {} move {}: {} plays {}", game_id, moves.len() + 1, player, choice);
            }
            game = game.play(choice.mv())?;
            moves.push(choice.mv());
            if avoid_passing && !choice.mv().is_pass() {
                avoid_passing = false;
            }
        }

        let (passer, pass_score) = last_pass.ok_or_else(|| Error::Internal {
            reason: "the game ended without a recorded pass".to_string(),
            position: game.to_string(),
        })?;
        resolution_attempts += 1;
        log::debug!("game {} resolving dead stones, attempt {}", game_id, resolution_attempts);

        let Some(playout) =
            resolution_playout(evaluator, recommender, config, &game, passer, pass_score)?
        else {
            truncated = true;
            break 'game;
        };
        resolution_moves += playout.moves.len();

        match classify_groups(&game, &playout.end) {
            Resolution::Settled(groups) => {
                dead = groups;
                break 'game;
            }
            Resolution::Contradiction => {
                log::info!("game {}: resolution contradicted itself, resuming play", game_id);
                if resolution_attempts >= config.max_resolutions {
                    truncated = true;
                    break 'game;
                }
                game = game.resume();
                avoid_passing = true;
            }
        }
    }

    let score = game.area_score(&dead);

    Ok(GameRecord {
        game_id,
        seed: evaluator.seed(),
        board_size: dimension,
        recommender: config.recommender,
        moves: moves.iter().map(Move::to_string).collect(),
        resolution_moves,
        resolution_attempts,
        dead_stones: dead_stone_names(&dead),
        komi: game.komi(),
        black_score: score.black,
        white_score: score.white,
        winner: score.winner().map(player_name),
        truncated,
    })
}

/// Sorted names of every stone in `dead`.
pub fn dead_stone_names(dead: &[Group]) -> Vec<String> {
    let mut names: Vec<String> = dead
        .iter()
        .flat_map(|group| group.members.iter().map(|c| c.to_string()))
        .collect();
    names.sort();
    names
}

/// One dead-stone playout: the moves played and where they led.
#[derive(Debug, Clone)]
pub struct Playout {
    pub moves: Vec<Move>,
    pub end: Game,
}

/// Plays on from `finished` until both sides pass again.
///
/// Each side only plays moves no worse than its floor: `pass_score` for
/// `passer`, and its inverse for the other side. Returns `None` when the move
/// cap stops the playout first.
pub fn resolution_playout<R: Recommender<Game>>(
    evaluator: &Evaluator,
    recommender: &R,
    config: &SelfPlayConfig,
    finished: &Game,
    passer: Player,
    pass_score: Score,
) -> Result<Option<Playout>> {
    let floors: HashMap<Player, Score> =
        HashMap::from([(passer, pass_score), (passer.opposite(), pass_score.invert())]);
    let mut position = finished.resume();
    let mut moves = Vec::new();
    while let Some(player) = position.current_player() {
        if moves.len() >= config.max_moves {
            return Ok(None);
        }
        let evaluation = evaluator.evaluate(&position, config.parallel)?;
        let choice = recommender
            .recommend_resolution_play(&evaluation, &floors[&player])?
            .ok_or_else(|| no_move(&position))?;
        log::trace!("resolution: {} plays {}", player, choice.mv());
        position = position.play(choice.mv())?;
        moves.push(choice.mv());
    }
    Ok(Some(Playout { moves, end: position }))
}

/// Builds the evaluator for game `game_id`: a configured seed is offset by
/// the game number so every game gets its own network.
pub fn evaluator_for_game(config: &SelfPlayConfig, game_id: usize) -> Result<Evaluator> {
    let evaluator_config = EvaluatorConfig {
        seed: config
            .evaluator
            .seed
            .map(|seed| seed.wrapping_add(game_id as u64)),
        ..config.evaluator.clone()
    };
    Evaluator::new(evaluator_config)
}

/// Plays `config.games` games, calling `on_game` with each finished record.
pub fn run_self_play_with_callback<F>(config: &SelfPlayConfig, mut on_game: F) -> Result<()>
where
    F: FnMut(GameRecord) -> Result<()>,
{
    for game_id in 0..config.games {
        let started = Instant::now();
        let evaluator = evaluator_for_game(config, game_id)?;
        let record = match config.recommender {
            RecommenderKind::BestRaw => {
                play_game(&evaluator, &BestRawScoreRecommender, config, game_id)?
            }
            RecommenderKind::FuzzyLocal => play_game(
                &evaluator,
                &FuzzyBestLocalInvariantRecommender,
                config,
                game_id,
            )?,
        };
        log::info!(
            "game {}/{}: {} moves, black {} white {} ({:.1}s)",
            game_id + 1,
            config.games,
            record.moves.len(),
            record.black_score,
            record.white_score,
            started.elapsed().as_secs_f64()
        );
        on_game(record)?;
    }
    Ok(())
}

/// Plays every configured game and collects the records.
pub fn run_self_play(config: &SelfPlayConfig) -> Result<Vec<GameRecord>> {
    let mut games = Vec::with_capacity(config.games);
    run_self_play_with_callback(config, |game| {
        games.push(game);
        Ok(())
    })?;
    Ok(games)
}

/// Writes one record as a single JSON line.
pub fn write_game_json<W: Write>(game: &GameRecord, out: &mut W) -> io::Result<()> {
    serde_json::to_writer(&mut *out, game)?;
    writeln!(out)
}

/// Writes game records as JSONL.
pub fn write_jsonl<W: Write>(games: &[GameRecord], out: &mut W) -> io::Result<()> {
    for game in games {
        write_game_json(game, out)?;
    }
    out.flush()
}

/// Prints a summary of self-play results to stderr.
pub fn print_summary(games: &[GameRecord]) {
    let total = games.len();
    let black = games.iter().filter(|g| g.winner.as_deref() == Some("black")).count();
    let white = games.iter().filter(|g| g.winner.as_deref() == Some("white")).count();
    let truncated = games.iter().filter(|g| g.truncated).count();
    let moves: usize = games.iter().map(|g| g.moves.len()).sum();
    let pct = |n: usize| 100.0 * n as f64 / total.max(1) as f64;

    eprintln!("=== Self-Play Summary ===");
    eprintln!("Games: {}", total);
    eprintln!("Avg moves/game: {:.1}", moves as f64 / total.max(1) as f64);
    eprintln!("Black wins: {} ({:.1}%)", black, pct(black));
    eprintln!("White wins: {} ({:.1}%)", white, pct(white));
    eprintln!("Ties: {}", total - black - white);
    eprintln!("Truncated: {}", truncated);
}
