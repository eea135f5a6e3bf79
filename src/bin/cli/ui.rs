use std::io::IsTerminal;
use std::time::Duration;

use indicatif::ProgressBar;

pub struct Ui {
    quiet: bool,
    interactive: bool,
}

impl Ui {
    pub fn new(quiet: bool) -> Self {
        Self {
            quiet,
            interactive: std::io::stdout().is_terminal(),
        }
    }

    pub fn spinner(&self, message: &str) -> Option<ProgressBar> {
        if self.quiet || !self.interactive {
            return None;
        }
        let bar = ProgressBar::new_spinner();
        bar.enable_steady_tick(Duration::from_millis(80));
        bar.set_message(message.to_string());
        Some(bar)
    }

    pub fn finish(&self, bar: Option<ProgressBar>, message: String) {
        match bar {
            Some(bar) => bar.finish_with_message(message),
            None if !self.quiet => println!("{message}"),
            None => {}
        }
    }

    pub fn note(&self, message: &str) {
        if !self.quiet {
            println!("{message}");
        }
    }
}
