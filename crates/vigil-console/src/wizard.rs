//! Registration wizard: the four-step capture flow against the backend's
//! session endpoints.
//!
//! Photos are taken manually on command or by the automatic-capture loop.
//! The loop is cooperative: the gate flag is consulted between awaited
//! steps, so pausing lets any in-flight request finish and then stops the
//! loop before its next attempt. Rejected attempts (no face, several
//! faces) retry indefinitely; the operator owns termination.

use std::io::Write as _;
use std::time::Duration;

use anyhow::Result;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use vigil_client::Backend;
use vigil_core::{Notice, RegistrationSession, Slot, WizardStep};

use crate::config::Config;
use crate::toast;

/// Brief linger on the capture view once the target is reached, before the
/// save step takes over.
const ADVANCE_DELAY: Duration = Duration::from_millis(500);

type InputLines = Lines<BufReader<Stdin>>;

enum Flow {
    Continue,
    Quit,
}

pub async fn run(
    backend: Backend,
    config: &Config,
    name: Option<String>,
    auto: bool,
) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut wizard = Wizard {
        backend,
        session: RegistrationSession::new(config.capture_target),
        pace: config.auto_capture_pace,
        retry: config.auto_capture_retry,
        saved_message: None,
    };
    wizard.run(&mut lines, name, auto).await
}

struct Wizard {
    backend: Backend,
    session: RegistrationSession,
    pace: Duration,
    retry: Duration,
    /// Server message from a successful save, shown verbatim on the
    /// success step.
    saved_message: Option<String>,
}

impl Wizard {
    async fn run(
        &mut self,
        lines: &mut InputLines,
        mut preset_name: Option<String>,
        auto: bool,
    ) -> Result<()> {
        let mut start_auto = auto;
        loop {
            let flow = match self.session.step() {
                WizardStep::NameEntry => self.name_step(lines, preset_name.take()).await?,
                WizardStep::Capturing => {
                    if std::mem::take(&mut start_auto) {
                        self.session.set_auto(true);
                    }
                    self.capture_step(lines).await?
                }
                WizardStep::ReadyToSave => self.save_step(lines).await?,
                WizardStep::Success => self.success_step(lines).await?,
            };
            if let Flow::Quit = flow {
                return Ok(());
            }
        }
    }

    async fn name_step(&mut self, lines: &mut InputLines, preset: Option<String>) -> Result<Flow> {
        let name = match preset {
            Some(name) => name,
            None => {
                prompt("name: ")?;
                let Some(line) = lines.next_line().await? else {
                    return Ok(Flow::Quit);
                };
                line
            }
        };
        let name = name.trim().to_string();
        if name.is_empty() {
            toast::show(&Notice::error("a name is required"));
            return Ok(Flow::Continue);
        }

        match self.backend.start_registration(&name).await {
            Ok(started) if started.success => {
                self.session.start(&name)?;
                toast::show(&Notice::success(started.message));
                match self.backend.registration_feed_url() {
                    Ok(url) => println!("live preview: {url}"),
                    Err(error) => tracing::debug!(%error, "could not build preview URL"),
                }
                Ok(Flow::Continue)
            }
            Ok(started) => {
                toast::show(&Notice::error(started.message));
                Ok(Flow::Continue)
            }
            Err(error) => {
                toast::show(&Notice::error(format!("connection failed: {error}")));
                Ok(Flow::Continue)
            }
        }
    }

    async fn capture_step(&mut self, lines: &mut InputLines) -> Result<Flow> {
        println!("capturing photos for {}", self.session.name());
        print_capture_help();
        println!("{}", render_slots(&self.session));

        let mut delay = Duration::ZERO;
        while self.session.step() == WizardStep::Capturing {
            if self.session.auto_capturing() {
                tokio::select! {
                    line = lines.next_line() => {
                        let Some(line) = line? else { return Ok(Flow::Quit) };
                        if let Flow::Quit = self.capture_command(lines, &line).await? {
                            return Ok(Flow::Quit);
                        }
                    }
                    _ = tokio::time::sleep(delay) => {
                        // Settle after an accepted photo, retry sooner after
                        // a rejected attempt.
                        delay = if self.attempt_capture().await {
                            self.pace
                        } else {
                            self.retry
                        };
                    }
                }
            } else {
                delay = Duration::ZERO;
                let Some(line) = lines.next_line().await? else {
                    return Ok(Flow::Quit);
                };
                if let Flow::Quit = self.capture_command(lines, &line).await? {
                    return Ok(Flow::Quit);
                }
            }
        }
        Ok(Flow::Continue)
    }

    async fn capture_command(&mut self, lines: &mut InputLines, line: &str) -> Result<Flow> {
        match line.trim() {
            "" | "c" => {
                self.attempt_capture().await;
            }
            "a" => {
                if self.session.auto_capturing() {
                    toast::show(&Notice::info("automatic capture already running"));
                } else {
                    self.session.set_auto(true);
                    toast::show(&Notice::info("automatic capture enabled, p to pause"));
                }
            }
            "p" => {
                self.session.set_auto(false);
                toast::show(&Notice::info("automatic capture paused"));
            }
            "x" => return self.cancel(lines).await,
            "q" | "quit" => return Ok(Flow::Quit),
            "?" | "help" => print_capture_help(),
            _ => toast::show(&Notice::info("unknown command, ? for help")),
        }
        Ok(Flow::Continue)
    }

    /// One capture request. Returns true when the server accepted a photo.
    async fn attempt_capture(&mut self) -> bool {
        if self.session.step() != WizardStep::Capturing {
            return false;
        }
        match self.backend.capture().await {
            Ok(response) if response.success => {
                let advanced = self
                    .session
                    .record_capture(response.count as usize, response.complete);
                toast::show(&Notice::success(format!(
                    "photo {}/{} captured",
                    self.session.captured(),
                    self.session.target()
                )));
                println!("{}", render_slots(&self.session));
                if advanced {
                    tokio::time::sleep(ADVANCE_DELAY).await;
                }
                true
            }
            Ok(response) => {
                let message = response
                    .message
                    .unwrap_or_else(|| "capture rejected".to_string());
                toast::show(&Notice::error(message));
                false
            }
            Err(error) => {
                toast::show(&Notice::error(format!("capture failed: {error}")));
                false
            }
        }
    }

    /// Confirmation prompt, then abort the server-side session and reset
    /// local progress. A failed cancel request leaves the session as-is.
    async fn cancel(&mut self, lines: &mut InputLines) -> Result<Flow> {
        prompt("cancel this registration? [y/N] ")?;
        let Some(answer) = lines.next_line().await? else {
            return Ok(Flow::Quit);
        };
        if !matches!(answer.trim(), "y" | "Y" | "yes") {
            return Ok(Flow::Continue);
        }
        match self.backend.cancel_registration().await {
            Ok(_) => {
                self.session.cancel();
                self.saved_message = None;
                toast::show(&Notice::info("registration cancelled"));
            }
            Err(error) => toast::show(&Notice::error(format!("cancel failed: {error}"))),
        }
        Ok(Flow::Continue)
    }

    async fn save_step(&mut self, lines: &mut InputLines) -> Result<Flow> {
        println!(
            "all {} photos captured for {}",
            self.session.target(),
            self.session.name()
        );
        prompt("s to save, x to cancel, q to quit: ")?;
        let Some(line) = lines.next_line().await? else {
            return Ok(Flow::Quit);
        };
        match line.trim() {
            "s" | "" => match self.backend.save_registration().await {
                Ok(saved) if saved.success => {
                    self.session.mark_saved();
                    toast::show(&Notice::success(saved.message.clone()));
                    self.saved_message = Some(saved.message);
                }
                Ok(saved) => toast::show(&Notice::error(saved.message)),
                Err(error) => toast::show(&Notice::error(format!("save failed: {error}"))),
            },
            "x" => return self.cancel(lines).await,
            "q" | "quit" => return Ok(Flow::Quit),
            _ => toast::show(&Notice::info("s to save, x to cancel, q to quit")),
        }
        Ok(Flow::Continue)
    }

    async fn success_step(&mut self, lines: &mut InputLines) -> Result<Flow> {
        if let Some(message) = &self.saved_message {
            println!("{message}");
        }
        prompt("n for a new registration, q to quit: ")?;
        let Some(line) = lines.next_line().await? else {
            return Ok(Flow::Quit);
        };
        match line.trim() {
            "n" => {
                self.session.reset();
                self.saved_message = None;
            }
            "q" | "quit" | "" => return Ok(Flow::Quit),
            _ => {}
        }
        Ok(Flow::Continue)
    }
}

fn render_slots(session: &RegistrationSession) -> String {
    let mut out = String::from("photos: ");
    for (i, slot) in session.slots().iter().enumerate() {
        match slot {
            Slot::Captured => out.push_str("[✓]"),
            Slot::Pending => out.push_str(&format!("[{}]", i + 1)),
        }
    }
    out.push_str(&format!(" {}/{}", session.captured(), session.target()));
    out
}

fn print_capture_help() {
    println!("commands: enter/c capture | a auto-capture | p pause | x cancel | q quit");
}

fn prompt(text: &str) -> Result<()> {
    print!("{text}");
    std::io::stdout().flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_slots_initial_labels() {
        let session = RegistrationSession::new(5);
        assert_eq!(render_slots(&session), "photos: [1][2][3][4][5] 0/5");
    }

    #[test]
    fn test_render_slots_marks_captures() {
        let mut session = RegistrationSession::new(5);
        session.start("Alice").unwrap();
        session.record_capture(2, false);
        assert_eq!(render_slots(&session), "photos: [✓][✓][3][4][5] 2/5");
    }

    #[test]
    fn test_render_slots_reset_after_cancel() {
        let mut session = RegistrationSession::new(5);
        session.start("Alice").unwrap();
        session.record_capture(4, false);
        session.cancel();
        assert_eq!(render_slots(&session), "photos: [1][2][3][4][5] 0/5");
    }
}
