//! Interactive menu for Reelsmith
//! An explicit state machine driven by stdin lines, decoupled from the
//! pipeline; transitions are pure so they can be tested without a terminal

use anyhow::Result;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use crate::pipeline::Pipeline;
use crate::types::{NoVideoReason, RunOutcome};

const PLATFORM_URL: &str = "https://www.tiktok.com/";

/// Current screen of the interactive menu
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuState {
    MainMenu,
    /// Collecting video text; entry ends on an empty line
    AwaitingText { lines: Vec<String> },
    /// A video was just created and is awaiting a decision
    VideoOptions(PathBuf),
}

/// Side effect requested by a state transition
#[derive(Debug, PartialEq, Eq)]
pub enum Effect {
    CreateVideo(String),
    OpenVideo(PathBuf),
    OpenPlatform,
    DeleteVideo(PathBuf),
    Invalid,
    Quit,
}

/// Advance the state machine by one input line.
///
/// Pure: all I/O (prompts, pipeline runs, browser opens) happens in the
/// caller based on the returned effect.
pub fn transition(state: MenuState, input: &str) -> (MenuState, Option<Effect>) {
    match state {
        MenuState::MainMenu => match input.trim() {
            "1" => (MenuState::AwaitingText { lines: Vec::new() }, None),
            "2" => (MenuState::MainMenu, Some(Effect::OpenPlatform)),
            "3" => (MenuState::MainMenu, Some(Effect::Quit)),
            _ => (MenuState::MainMenu, Some(Effect::Invalid)),
        },
        MenuState::AwaitingText { mut lines } => {
            if input.trim().is_empty() {
                if lines.is_empty() {
                    // Ignore blank lines before any text arrives
                    (MenuState::AwaitingText { lines }, None)
                } else {
                    let text = lines.join(" ");
                    (MenuState::MainMenu, Some(Effect::CreateVideo(text)))
                }
            } else {
                lines.push(input.to_string());
                (MenuState::AwaitingText { lines }, None)
            }
        }
        MenuState::VideoOptions(path) => match input.trim() {
            "1" => (
                MenuState::VideoOptions(path.clone()),
                Some(Effect::OpenVideo(path)),
            ),
            "2" => (
                MenuState::VideoOptions(path),
                Some(Effect::OpenPlatform),
            ),
            "3" => (MenuState::MainMenu, Some(Effect::DeleteVideo(path))),
            "4" => (MenuState::MainMenu, None),
            _ => (MenuState::VideoOptions(path), Some(Effect::Invalid)),
        },
    }
}

fn print_prompt(state: &MenuState) {
    match state {
        MenuState::MainMenu => {
            println!("\n=== Reelsmith ===");
            println!("1. Create new video");
            println!("2. Open TikTok");
            println!("3. Exit");
            print!("\nEnter your choice (1-3): ");
        }
        MenuState::AwaitingText { lines } if lines.is_empty() => {
            println!("\nEnter your text for the video (finish with an empty line):");
        }
        MenuState::AwaitingText { .. } => {}
        MenuState::VideoOptions(_) => {
            println!("\n=== Video Options ===");
            println!("1. View video");
            println!("2. Post (open TikTok)");
            println!("3. Delete video");
            println!("4. Keep video and return to main menu");
            print!("\nEnter your choice (1-4): ");
        }
    }
    let _ = io::stdout().flush();
}

fn read_line() -> io::Result<Option<String>> {
    let mut buf = String::new();
    let n = io::stdin().lock().read_line(&mut buf)?;
    if n == 0 {
        return Ok(None);
    }
    while buf.ends_with('\n') || buf.ends_with('\r') {
        buf.pop();
    }
    Ok(Some(buf))
}

fn describe(reason: NoVideoReason) -> &'static str {
    match reason {
        NoVideoReason::EmptyInput => "the input text was empty",
        NoVideoReason::AllUnitsFailed => "every segment failed to generate",
    }
}

/// Drive the menu loop over stdin, executing effects against the pipeline
pub async fn run(pipeline: &Pipeline) -> Result<()> {
    let mut state = MenuState::MainMenu;

    loop {
        print_prompt(&state);
        let Some(line) = read_line()? else {
            return Ok(());
        };

        let (next, effect) = transition(state, &line);
        state = next;

        let Some(effect) = effect else { continue };
        match effect {
            Effect::Quit => {
                println!("\nGoodbye!");
                return Ok(());
            }
            Effect::Invalid => {
                println!("\nInvalid choice. Please try again.");
            }
            Effect::OpenPlatform => {
                if let Err(e) = open::that(PLATFORM_URL) {
                    println!("Failed to open browser: {}", e);
                }
            }
            Effect::OpenVideo(path) => {
                println!("\nOpening video...");
                match open::that(&path) {
                    Ok(()) => println!("Video opened in default player"),
                    Err(e) => println!("Failed to open video: {}", e),
                }
            }
            Effect::DeleteVideo(path) => {
                print!("\nAre you sure you want to delete the video? (y/n): ");
                let _ = io::stdout().flush();
                let confirm = read_line()?.unwrap_or_default();
                if confirm.trim().eq_ignore_ascii_case("y") {
                    match std::fs::remove_file(&path) {
                        Ok(()) => println!("Video deleted successfully"),
                        Err(e) => println!("Error deleting video: {}", e),
                    }
                } else {
                    state = MenuState::VideoOptions(path);
                }
            }
            Effect::CreateVideo(text) => {
                println!("\nCreating video...");
                match pipeline.run(&text).await {
                    Ok(RunOutcome::Rendered(path)) => {
                        println!("\nVideo created successfully: {}", path.display());
                        state = MenuState::VideoOptions(path);
                    }
                    Ok(RunOutcome::NothingProduced(reason)) => {
                        println!("\nNo video produced: {}", describe(reason));
                    }
                    Err(e) => {
                        println!("\nVideo creation failed: {}", e);
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_main_menu_choices() {
        let (state, effect) = transition(MenuState::MainMenu, "1");
        assert_eq!(state, MenuState::AwaitingText { lines: Vec::new() });
        assert_eq!(effect, None);

        let (_, effect) = transition(MenuState::MainMenu, "2");
        assert_eq!(effect, Some(Effect::OpenPlatform));

        let (_, effect) = transition(MenuState::MainMenu, "3");
        assert_eq!(effect, Some(Effect::Quit));

        let (state, effect) = transition(MenuState::MainMenu, "banana");
        assert_eq!(state, MenuState::MainMenu);
        assert_eq!(effect, Some(Effect::Invalid));
    }

    #[test]
    fn test_text_entry_ends_on_empty_line() {
        let state = MenuState::AwaitingText { lines: Vec::new() };

        let (state, effect) = transition(state, "Hello world.");
        assert_eq!(effect, None);
        let (state, effect) = transition(state, "Goodbye.");
        assert_eq!(effect, None);
        let (state, effect) = transition(state, "");

        assert_eq!(state, MenuState::MainMenu);
        assert_eq!(
            effect,
            Some(Effect::CreateVideo("Hello world. Goodbye.".to_string()))
        );
    }

    #[test]
    fn test_leading_blank_lines_are_ignored() {
        let state = MenuState::AwaitingText { lines: Vec::new() };
        let (state, effect) = transition(state, "");
        assert_eq!(state, MenuState::AwaitingText { lines: Vec::new() });
        assert_eq!(effect, None);
    }

    #[test]
    fn test_video_options_transitions() {
        let path = PathBuf::from("output/reel.mp4");

        let (state, effect) = transition(MenuState::VideoOptions(path.clone()), "1");
        assert_eq!(state, MenuState::VideoOptions(path.clone()));
        assert_eq!(effect, Some(Effect::OpenVideo(path.clone())));

        let (state, effect) = transition(MenuState::VideoOptions(path.clone()), "3");
        assert_eq!(state, MenuState::MainMenu);
        assert_eq!(effect, Some(Effect::DeleteVideo(path.clone())));

        let (state, effect) = transition(MenuState::VideoOptions(path.clone()), "4");
        assert_eq!(state, MenuState::MainMenu);
        assert_eq!(effect, None);

        let (state, effect) = transition(MenuState::VideoOptions(path.clone()), "9");
        assert_eq!(state, MenuState::VideoOptions(path));
        assert_eq!(effect, Some(Effect::Invalid));
    }
}
