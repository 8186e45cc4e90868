use std::fs;
use std::path::Path;
use std::process;

use clap::{Parser, Subcommand};
use log::warn;

use keybed::keymap::pitch_for_key;
use keybed::{
    BeatRange, DeviceAction, Engine, EngineConfig, Lesson, PracticeOptions, Recording, ReplayStatus,
    SimulatedDevice,
};

/// keybed - note-event engine for a virtual keyboard
#[derive(Parser)]
#[command(name = "keybed")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Engine configuration YAML
    #[arg(long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Name the chord formed by the given pitches
    Chord {
        /// Pitch names, e.g. C4 E4 G4
        #[arg(required = true)]
        pitches: Vec<String>,
    },

    /// List the bundled lessons
    Lessons,

    /// Hold down computer keys together and show what sounds
    Keys {
        /// Keys to press, e.g. "zcb"
        text: String,
    },

    /// Replay a recording on the simulated device and print every action
    Replay {
        /// Recording file (.yaml or .json)
        file: String,
    },

    /// Grade a recorded take against a lesson
    Grade {
        /// Bundled lesson name or path to a lesson YAML
        lesson: String,

        /// Recording of the take (.yaml or .json)
        take: String,

        /// Tempo multiplier
        #[arg(long, default_value_t = 1.0)]
        speed: f64,

        /// First beat to practise
        #[arg(long)]
        from: Option<f64>,

        /// Beat to stop before
        #[arg(long)]
        to: Option<f64>,
    },

    /// Convert a recording between YAML and JSON (by extension)
    Convert {
        input: String,
        output: String,
    },
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    if let Err(message) = run(cli) {
        eprintln!("Error: {}", message);
        process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), String> {
    let config = match &cli.config {
        Some(path) => EngineConfig::from_yaml(&read_file(path)?).map_err(|e| e.to_string())?,
        None => EngineConfig::default(),
    };

    match cli.command {
        Commands::Chord { pitches } => {
            let names: Vec<&str> = pitches.iter().map(String::as_str).collect();
            let chord = keybed::chord_of(&names).map_err(|e| e.to_string())?;
            println!("{}", chord.as_deref().unwrap_or("-"));
        }
        Commands::Lessons => {
            for source in keybed_lessons::get_all_lessons() {
                match Lesson::from_yaml(&source.content) {
                    Ok(lesson) => println!(
                        "{:<12} {} ({} steps, {} bpm)",
                        source.name,
                        lesson.title,
                        lesson.steps.len(),
                        lesson.tempo
                    ),
                    Err(e) => warn!("bundled lesson '{}' is invalid: {}", source.name, e),
                }
            }
        }
        Commands::Keys { text } => {
            let mut engine = engine_with(config)?;
            for key in text.chars() {
                match pitch_for_key(key) {
                    Some(name) => engine
                        .note_on(name, None, Some(&key.to_string()))
                        .map_err(|e| e.to_string())?,
                    None => warn!("key '{}' is not bound", key),
                }
            }
            let status = engine.status();
            println!("Voices: {}", status.voices.join(" "));
            println!("Chord:  {}", status.chord.as_deref().unwrap_or("-"));
        }
        Commands::Replay { file } => {
            let recording = load_recording(&file)?;
            let mut engine = engine_with(config)?;
            engine.import_recording(recording).map_err(|e| e.to_string())?;
            match engine.replay_recording() {
                ReplayStatus::Empty => println!("(empty recording)"),
                ReplayStatus::Scheduled { finishes_at } => {
                    engine.run_until(finishes_at);
                    for action in engine.device().actions() {
                        print_action(action);
                    }
                }
            }
        }
        Commands::Grade { lesson, take, speed, from, to } => {
            let lesson = load_lesson(&lesson)?;
            let recording = load_recording(&take)?;
            let range = match (from, to) {
                (None, None) => None,
                (start, end) => Some(BeatRange::new(
                    start.unwrap_or(0.0),
                    end.unwrap_or_else(|| lesson.total_beats(config.default_step_beats)),
                )),
            };
            let options = PracticeOptions { speed, looped: false, range };
            let title = lesson.title.clone();

            let mut engine = engine_with(config)?;
            let lead_in = engine.config().lead_in;
            engine.start_lesson(lesson, options).map_err(|e| e.to_string())?;
            play_take(&mut engine, &recording, lead_in)?;
            while let Some(at) = engine.device().next_cue_time() {
                engine.run_until(at);
            }

            let status = engine.status().trainer;
            println!("Lesson:   {}", title);
            println!(
                "Accuracy: {}% ({}/{} on time)",
                status.accuracy, status.hit_count, status.total_count
            );
            println!("Streak:   {}", status.streak);
            println!("Last:     {}", classification_name(status.classification));
        }
        Commands::Convert { input, output } => {
            let recording = load_recording(&input)?;
            let text = if is_json(&output) {
                recording.to_json()
            } else {
                recording.to_yaml()
            }
            .map_err(|e| e.to_string())?;
            fs::write(&output, text).map_err(|e| format!("writing '{}': {}", output, e))?;
            eprintln!("Wrote {} events to {}", recording.len(), output);
        }
    }
    Ok(())
}

fn engine_with(config: EngineConfig) -> Result<Engine<SimulatedDevice>, String> {
    Engine::with_config(SimulatedDevice::new(), config).map_err(|e| e.to_string())
}

/// Feed a take to the engine as live input, with take time 0 on beat 0
fn play_take(engine: &mut Engine<SimulatedDevice>, take: &Recording, lead_in: f64) -> Result<(), String> {
    let mut inputs: Vec<(f64, bool, usize)> = Vec::new();
    for (index, event) in take.events.iter().enumerate() {
        inputs.push((event.on_time_seconds, true, index));
        if let Some(duration) = event.duration_seconds {
            inputs.push((event.on_time_seconds + duration, false, index));
        }
    }
    // Releases before presses at the same instant
    inputs.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));

    for (time, press, index) in inputs {
        let event = &take.events[index];
        let name = event.pitch.name();
        let source = format!("take:{}", index);
        engine.run_until(lead_in + time);
        let result = if press {
            engine.note_on(&name, Some(event.velocity), Some(&source))
        } else {
            engine.note_off(&name, Some(&source))
        };
        result.map_err(|e| e.to_string())?;
    }
    Ok(())
}

fn print_action(action: &DeviceAction) {
    match action {
        DeviceAction::Trigger { at, pitch, velocity, instrument } => {
            println!("{:>8.3}s  on   {:<4} vel {:.2}  {}", at, pitch.to_string(), velocity, instrument)
        }
        DeviceAction::Release { at, pitch, instrument } => {
            println!("{:>8.3}s  off  {:<4}           {}", at, pitch.to_string(), instrument)
        }
    }
}

fn classification_name(classification: keybed::Classification) -> &'static str {
    match classification {
        keybed::Classification::None => "-",
        keybed::Classification::Early => "early",
        keybed::Classification::Late => "late",
        keybed::Classification::On => "on",
    }
}

fn read_file(path: &str) -> Result<String, String> {
    fs::read_to_string(path).map_err(|e| format!("reading '{}': {}", path, e))
}

fn is_json(path: &str) -> bool {
    Path::new(path)
        .extension()
        .map_or(false, |ext| ext.eq_ignore_ascii_case("json"))
}

fn load_recording(path: &str) -> Result<Recording, String> {
    let source = read_file(path)?;
    let recording = if is_json(path) {
        Recording::from_json(&source)
    } else {
        Recording::from_yaml(&source)
    };
    recording.map_err(|e| format!("{}: {}", path, e))
}

/// A bundled lesson by name, otherwise a lesson YAML file
fn load_lesson(name_or_path: &str) -> Result<Lesson, String> {
    let source = match keybed_lessons::get_lesson(name_or_path) {
        Some(bundled) => bundled.content,
        None => read_file(name_or_path)?,
    };
    Lesson::from_yaml(&source).map_err(|e| format!("{}: {}", name_or_path, e))
}
