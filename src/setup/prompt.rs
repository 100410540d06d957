//! Terminal interaction for the setup wizard.

use std::io::{self, BufRead, Write};

use thiserror::Error;

/// Errors while reading an answer.
#[derive(Debug, Error)]
pub enum PromptError {
    /// Standard input was closed before an answer was given.
    #[error("Input closed before setup finished")]
    Closed,

    /// Reading or writing the terminal failed.
    #[error("Terminal I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Asks questions and shows messages.
///
/// Implemented by [`ConsolePrompter`] for real terminals and by a scripted
/// prompter in tests.
pub trait Prompter {
    /// Shows an informational line.
    fn say(&mut self, message: &str);

    /// Asks a question and returns the answer without its line ending.
    ///
    /// # Errors
    ///
    /// Returns [`PromptError::Closed`] when no more input is available.
    fn ask(&mut self, question: &str) -> Result<String, PromptError>;

    /// Asks for a secret without echoing it.
    ///
    /// # Errors
    ///
    /// Returns [`PromptError`] when the terminal cannot be read.
    fn ask_secret(&mut self, question: &str) -> Result<String, PromptError>;
}

/// [`Prompter`] on stdin/stdout; secrets are read with echo disabled.
#[derive(Debug, Default)]
pub struct ConsolePrompter;

impl Prompter for ConsolePrompter {
    fn say(&mut self, message: &str) {
        println!("{message}");
    }

    fn ask(&mut self, question: &str) -> Result<String, PromptError> {
        let mut stdout = io::stdout();
        write!(stdout, "{question}")?;
        stdout.flush()?;

        let mut line = String::new();
        if io::stdin().lock().read_line(&mut line)? == 0 {
            return Err(PromptError::Closed);
        }
        Ok(line.trim_end_matches(['\r', '\n']).to_string())
    }

    fn ask_secret(&mut self, question: &str) -> Result<String, PromptError> {
        Ok(rpassword::prompt_password(question)?)
    }
}

/// Asks `question` until `parse` accepts the trimmed answer.
///
/// `retry` is shown after every rejected answer.
///
/// # Errors
///
/// Propagates [`PromptError`] from the prompter.
pub fn ask_until<P, T, F>(
    prompter: &mut P,
    question: &str,
    retry: &str,
    mut parse: F,
) -> Result<T, PromptError>
where
    P: Prompter + ?Sized,
    F: FnMut(&str) -> Option<T>,
{
    loop {
        let answer = prompter.ask(question)?;
        if let Some(value) = parse(answer.trim()) {
            return Ok(value);
        }
        prompter.say(retry);
    }
}

/// Asks until the answer is one of `options` (case-insensitive) and
/// returns it lowercased.
///
/// # Errors
///
/// Propagates [`PromptError`] from the prompter.
pub fn choose<P: Prompter + ?Sized>(
    prompter: &mut P,
    question: &str,
    options: &[&str],
) -> Result<String, PromptError> {
    let retry = format!(
        "You need to input one of the following: {}. Try again!",
        options
            .iter()
            .map(|o| format!("'{o}'"))
            .collect::<Vec<_>>()
            .join(", ")
    );

    ask_until(prompter, question, &retry, |answer| {
        let answer = answer.to_lowercase();
        options.contains(&answer.as_str()).then_some(answer)
    })
}

/// Asks a y/n question.
///
/// # Errors
///
/// Propagates [`PromptError`] from the prompter.
pub fn confirm<P: Prompter + ?Sized>(prompter: &mut P, question: &str) -> Result<bool, PromptError> {
    Ok(choose(prompter, &format!("{question} (y/n) "), &["y", "n"])? == "y")
}

/// Asks until a non-empty answer is given.
///
/// # Errors
///
/// Propagates [`PromptError`] from the prompter.
pub fn ask_non_empty<P: Prompter + ?Sized>(
    prompter: &mut P,
    question: &str,
) -> Result<String, PromptError> {
    ask_until(prompter, question, "A value is required.", |answer| {
        (!answer.is_empty()).then(|| answer.to_string())
    })
}


#[cfg(test)]
mod tests {
    use super::mock::ScriptedPrompter;
    use super::*;

    #[test]
    fn choose_reprompts_until_valid() {
        let mut prompter = ScriptedPrompter::new(&["maybe", "PushBullet"]);

        let answer = choose(&mut prompter, "Channel? ", &["", "pushbullet", "ifttt"]).unwrap();

        assert_eq!(answer, "pushbullet");
        assert_eq!(prompter.questions.len(), 2);
        assert!(prompter.said[0].contains("'pushbullet'"));
    }

    #[test]
    fn confirm_accepts_y_and_n() {
        let mut prompter = ScriptedPrompter::new(&["y", "N"]);

        assert!(confirm(&mut prompter, "Sure?").unwrap());
        assert!(!confirm(&mut prompter, "Sure?").unwrap());
        assert_eq!(prompter.questions[0], "Sure? (y/n) ");
    }

    #[test]
    fn ask_until_parses_numbers() {
        let mut prompter = ScriptedPrompter::new(&["abc", " 587 "]);

        let port: u16 = ask_until(&mut prompter, "Port: ", "Not a number.", |a| a.parse().ok())
            .unwrap();

        assert_eq!(port, 587);
        assert_eq!(prompter.said, ["Not a number."]);
    }

    #[test]
    fn ask_non_empty_skips_blank_answers() {
        let mut prompter = ScriptedPrompter::new(&["", "   ", "Home"]);

        assert_eq!(ask_non_empty(&mut prompter, "Location: ").unwrap(), "Home");
    }

    #[test]
    fn exhausted_script_is_closed_input() {
        let mut prompter = ScriptedPrompter::new(&["nope"]);

        let err = confirm(&mut prompter, "Sure?").unwrap_err();

        assert!(matches!(err, PromptError::Closed));
    }
}
