use log::{error, info, trace, warn};
use ringbuf::traits::{Consumer, Producer};
use std::io::BufRead;
use std::path::PathBuf;
use std::thread;
use std::time::{Duration, Instant};
use tempo_ramp::audio::timing::{AudioClock, ManualClock};
use tempo_ramp::logging::init_logger;
use tempo_ramp::messaging::command::Command;
use tempo_ramp::{AudioEngine, SessionConfig, Session, create_command_channel};

// Keyboard commands arrive a few per second at most
const COMMAND_RINGBUFFER_CAPACITY: usize = 16;

// Loop granularity; the scheduler itself re-arms every 25ms
const LOOP_SLEEP: Duration = Duration::from_millis(5);

// ~60 fps frame callback
const FRAME_INTERVAL_SECS: f64 = 1.0 / 60.0;

fn main() {
    init_logger();

    let config = match std::env::args().nth(1).map(PathBuf::from) {
        Some(path) => SessionConfig::load(&path),
        None => SessionConfig::load_or_default(),
    };
    let config = match config {
        Ok(config) => config,
        Err(e) => {
            error!("{}", e);
            std::process::exit(1);
        }
    };

    info!(
        "Session: {} BPM start, +{} BPM, {}, {:?}, {:?}",
        config.start_bpm,
        config.increment.bpm(),
        config.time_signature,
        config.subdivision,
        config.progression
    );

    // Without an output device the session still runs, silently
    let (engine, sink) = match AudioEngine::new(config.click_volume) {
        Ok((engine, queue)) => (Some(engine), Some(queue)),
        Err(e) => {
            warn!("Audio output unavailable ({}); clicks disabled", e);
            (None, None)
        }
    };
    let clock: Box<dyn AudioClock> = match &engine {
        Some(engine) => Box::new(engine.timing()),
        None => Box::new(ManualClock::new(0.0)),
    };

    let (mut command_tx, mut command_rx) = create_command_channel(COMMAND_RINGBUFFER_CAPACITY);
    thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else { break };
            match Command::from_key(&line) {
                Some(command) => {
                    if command_tx.try_push(command).is_err() {
                        warn!("Command queue full, dropped {:?}", command);
                    }
                    if command == Command::Quit {
                        break;
                    }
                }
                None => warn!("Unknown command {:?} (g/p/r/s/q)", line.trim()),
            }
        }
    });

    info!("Commands: g = start, p = pause, r = resume, s = stop, q = quit");

    let mut session = Session::new(config, sink);
    let started = Instant::now();
    let mut last_frame = 0.0;

    session.start(0.0, clock.now());

    'event_loop: loop {
        let coarse_now = started.elapsed().as_secs_f64();
        let audio_now = clock.now();

        while let Some(command) = command_rx.try_pop() {
            let applied = match command {
                Command::Start => session.start(coarse_now, audio_now),
                Command::Pause => session.pause(audio_now),
                Command::Resume => session.resume(coarse_now, audio_now),
                Command::Stop => session.stop(),
                Command::Quit => break 'event_loop,
            };
            if !applied {
                info!("{:?} ignored while {:?}", command, session.state());
            }
        }

        for change in session.poll(coarse_now, audio_now) {
            info!(
                "beat {} | {} BPM | {} bars",
                change.beat + 1,
                change.bpm,
                change.bars_elapsed
            );
        }

        if coarse_now - last_frame >= FRAME_INTERVAL_SECS {
            let frame = session.frame((coarse_now - last_frame) * 1000.0);
            trace!(
                "phase {:.1} alpha {:.2} ({} BPM)",
                frame.phase, frame.fade_alpha, frame.bpm
            );
            last_frame = coarse_now;
        }

        thread::sleep(LOOP_SLEEP);
    }

    session.stop();
    info!("Bye");
}
