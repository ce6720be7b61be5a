use std::io::{stdin, stdout, Read, Write};
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use anyhow::Context;
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use tracing_subscriber::EnvFilter;
use vtconsole::{ChannelSource, Console, ConsoleConfig, KeyEvent, LineHandler, MonotonicClock};

/// Keeps the most recent completed line until the loop picks it up.
#[derive(Default)]
struct LastLine(Option<String>);

impl LineHandler for LastLine {
    fn line(&mut self, line: &[u8]) {
        self.0 = Some(String::from_utf8_lossy(line).into_owned());
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    let config = match std::env::args().nth(1) {
        Some(path) => ConsoleConfig::load(&path).with_context(|| format!("loading {path}"))?,
        None => ConsoleConfig::default(),
    };

    // Console wants a non-blocking source, so stdin is read on its own
    // thread and handed over byte by byte.
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let mut r = stdin();
        let mut buf = [0_u8; 64];
        loop {
            let read_len = match r.read(&mut buf[..]) {
                Ok(0) | Err(_) => return,
                Ok(n) => n,
            };
            for &b in &buf[..read_len] {
                if tx.send(b).is_err() {
                    return;
                }
            }
        }
    });

    enable_raw_mode().context("enabling raw mode")?;
    let result = run(&config, ChannelSource::new(rx));
    disable_raw_mode().context("disabling raw mode")?;
    println!();
    result
}

fn run(config: &ConsoleConfig, source: ChannelSource) -> anyhow::Result<()> {
    let mut console = Console::from_config(
        config,
        source,
        stdout(),
        LastLine::default(),
        MonotonicClock::new(),
    );

    loop {
        match console.read_key() {
            KeyEvent::Idle => {
                if console.source_mut().is_closed() {
                    break;
                }
                thread::sleep(Duration::from_millis(5));
            }
            KeyEvent::Ctrl(b'C') | KeyEvent::Ctrl(b'D') => break,
            KeyEvent::Enter => {
                let Some(line) = console.handler_mut().0.take() else {
                    continue;
                };
                let out = console.writer_mut();
                write!(out, "\r\nread: {line:?}\r\n")?;
                if line == "exit" {
                    break;
                }
                console
                    .editor_mut()
                    .redraw()
                    .context("redrawing prompt")?;
            }
            _ => {}
        }
    }
    Ok(())
}
