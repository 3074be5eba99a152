use std::io::BufRead;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use chrono::Local;
use crawler_core::{update, AppState, Msg};
use crawler_engine::ApiSettings;
use crawler_logging::{crawler_debug, crawler_info};

use crate::commands::{self, Command};
use crate::effects::EffectRunner;
use crate::render;

const POLL_INTERVAL: Duration = Duration::from_millis(25);

pub fn run(settings: ApiSettings) -> anyhow::Result<()> {
    crawler_info!("using scraping service at {}", settings.base_url);
    let runner = EffectRunner::new(settings)?;
    runner.ping();

    let lines = spawn_stdin_reader();
    let mut app = App {
        state: AppState::new(),
        runner,
    };

    println!("crawler console; type `help` for commands");
    app.dispatch(Msg::AppStarted);

    loop {
        match lines.recv_timeout(POLL_INTERVAL) {
            Ok(line) => {
                if !app.handle_line(&line) {
                    break;
                }
            }
            Err(mpsc::RecvTimeoutError::Timeout) => {}
            Err(mpsc::RecvTimeoutError::Disconnected) => {
                crawler_debug!("stdin closed");
                break;
            }
        }
        while let Some(msg) = app.runner.poll() {
            app.dispatch(msg);
        }
    }

    crawler_info!("crawler console exiting");
    Ok(())
}

struct App {
    state: AppState,
    runner: EffectRunner,
}

impl App {
    /// Returns false once the operator asked to quit.
    fn handle_line(&mut self, line: &str) -> bool {
        match commands::parse(line, self.state.tab()) {
            Ok(None) => {}
            Ok(Some(Command::Quit)) => return false,
            Ok(Some(Command::Help)) => println!("{}", commands::HELP),
            Ok(Some(Command::Status)) => print!("{}", render::render(&self.state.view())),
            Ok(Some(Command::Dispatch(msgs))) => {
                for msg in msgs {
                    self.dispatch(msg);
                }
            }
            Err(problem) => println!("{problem}"),
        }
        true
    }

    fn dispatch(&mut self, msg: Msg) {
        let is_tick = matches!(msg, Msg::CountdownTick { .. });
        let state = std::mem::take(&mut self.state);
        let (mut state, effects) = update(state, msg);
        self.runner.enqueue(effects);

        let now = Local::now();
        for notice in state.take_notices() {
            println!("{}", render::notice_line(&notice, now));
        }
        if state.consume_dirty() {
            let view = state.view();
            if !is_tick {
                print!("{}", render::render(&view));
            } else if view.schedule.seconds_to_next_run % 60 == 0
                || view.schedule.seconds_to_next_run <= 5
            {
                if let Some(line) = render::countdown_line(&view) {
                    println!("{line}");
                }
            }
        }
        self.state = state;
    }
}

fn spawn_stdin_reader() -> mpsc::Receiver<String> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else { break };
            if tx.send(line).is_err() {
                break;
            }
        }
    });
    rx
}
