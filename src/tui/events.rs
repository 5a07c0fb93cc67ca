use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossterm::event::{self, Event, KeyEvent, KeyEventKind};

/// Events handed from the input thread to the main loop.
#[derive(Debug)]
pub enum InputEvent {
    Key(KeyEvent),
    Resize,
}

/// Reads terminal input on a background thread.
///
/// The thread only forwards events over a channel; all task state stays on the
/// main thread, which drains the queue with [`EventPump::next`].
pub struct EventPump {
    rx: mpsc::Receiver<InputEvent>,
    stop: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl EventPump {
    pub fn start() -> Self {
        let (tx, rx) = mpsc::channel();
        let stop = Arc::new(AtomicBool::new(false));
        let stop_flag = Arc::clone(&stop);

        let handle = thread::spawn(move || {
            while !stop_flag.load(Ordering::Relaxed) {
                match event::poll(Duration::from_millis(100)) {
                    Ok(true) => {}
                    Ok(false) => continue,
                    Err(e) => {
                        tracing::warn!(error = %e, "input polling failed");
                        break;
                    }
                }
                let evt = match event::read() {
                    Ok(Event::Key(key)) if key.kind == KeyEventKind::Press => InputEvent::Key(key),
                    Ok(Event::Resize(..)) => InputEvent::Resize,
                    Ok(_) => continue,
                    Err(e) => {
                        tracing::warn!(error = %e, "reading input failed");
                        break;
                    }
                };
                if tx.send(evt).is_err() {
                    break;
                }
            }
        });

        EventPump {
            rx,
            stop,
            handle: Some(handle),
        }
    }

    /// Waits up to `timeout` for the next event. `None` on timeout.
    pub fn next(&self, timeout: Duration) -> Option<InputEvent> {
        self.rx.recv_timeout(timeout).ok()
    }
}

impl Drop for EventPump {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}
