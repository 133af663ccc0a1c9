use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use encore_chart::{samples_from_millis, LevelChart};
use encore_engine::{
    JudgmentEvent, JudgmentSink, Scoreboard, Session, SessionConfig,
};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Replay a recorded input tape against a level chart"
)]
struct Args {
    /// Path to the level chart JSON
    chart: PathBuf,
    /// Path to the input tape JSON
    tape: PathBuf,
    /// Calibration offset in milliseconds
    #[arg(long, default_value_t = 0)]
    offset_ms: i64,
}

/// One recorded frame: the song clock plus the input edges seen on it.
#[derive(Debug, Deserialize)]
struct TapeFrame {
    sample: i64,
    #[serde(default)]
    press: Vec<usize>,
    #[serde(default)]
    lift: Vec<usize>,
    #[serde(default)]
    switch_to: Option<usize>,
}

struct Recorder {
    board: Scoreboard,
    events: u64,
}

impl JudgmentSink for Recorder {
    fn on_judgment(&mut self, event: &JudgmentEvent) {
        debug!(
            lane = event.lane,
            outcome = ?event.outcome,
            delta = event.delta,
            target = event.target_sample,
            "judgment"
        );
        self.events += 1;
        self.board.on_judgment(event);
    }
}

#[derive(Debug, Serialize)]
struct Report {
    level: String,
    frames: usize,
    judgments: u64,
    score: u64,
    grade: char,
    on_beat: u64,
    off_beat: u64,
    penalty: u64,
    miss: u64,
    complete: bool,
    failed: bool,
    competency: Vec<f32>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    let chart_file = File::open(&args.chart)
        .with_context(|| format!("opening chart {}", args.chart.display()))?;
    let chart = LevelChart::from_reader(BufReader::new(chart_file))?;

    let tape_file = File::open(&args.tape)
        .with_context(|| format!("opening tape {}", args.tape.display()))?;
    let tape: Vec<TapeFrame> = serde_json::from_reader(BufReader::new(tape_file))?;
    info!(level = %chart.name, frames = tape.len(), "replaying tape");

    let mut config = SessionConfig::standard(chart.sample_rate);
    config.offset_samples = samples_from_millis(args.offset_ms, chart.sample_rate);

    let mut session = Session::new(chart, config);
    let mut recorder = Recorder {
        board: Scoreboard::new(session.chart().grade_thresholds),
        events: 0,
    };

    for frame in &tape {
        let mut input = session.idle_input();
        for line in &frame.press {
            input = input.with_press(*line);
        }
        for line in &frame.lift {
            input = input.with_lift(*line);
        }
        if let Some(lane) = frame.switch_to {
            input = input.with_switch(lane);
        }
        session.step(frame.sample, &input, &mut recorder);
    }

    let counts = recorder.board.counts();
    let report = Report {
        level: session.chart().name.clone(),
        frames: tape.len(),
        judgments: recorder.events,
        score: recorder.board.score(),
        grade: recorder.board.grade().letter(),
        on_beat: counts.on_beat,
        off_beat: counts.off_beat,
        penalty: counts.penalty,
        miss: counts.miss,
        complete: session.is_complete(),
        failed: session.is_failed(),
        competency: session
            .lanes()
            .iter()
            .map(|lane| lane.competency().current())
            .collect(),
    };
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
