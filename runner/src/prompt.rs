use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use thiserror::Error;

const TRANSFORMER_COUNT_PROMPT: &str = "How many transformers do you want? ";

/// Reasons an operator answer is not a usable transformer count.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TransformerCountError {
    #[error("`{0}` is not a whole number")]
    NotANumber(String),

    #[error("at least one transformer is needed")]
    Zero,
}

/// Asks the operator for the number of transformers until a valid answer is given.
pub fn ask_transformer_count() -> anyhow::Result<u16> {
    let mut editor = DefaultEditor::new()?;

    loop {
        match editor.readline(TRANSFORMER_COUNT_PROMPT) {
            Ok(line) => match parse_transformer_count(&line) {
                Ok(count) => return Ok(count),
                Err(err) => eprintln!("{err}, please try again"),
            },
            Err(ReadlineError::Interrupted | ReadlineError::Eof) => {
                anyhow::bail!("no transformer count was given");
            }
            Err(err) => return Err(err.into()),
        }
    }
}

pub fn parse_transformer_count(input: &str) -> Result<u16, TransformerCountError> {
    let input = input.trim();
    let count: u16 = input
        .parse()
        .map_err(|_| TransformerCountError::NotANumber(input.to_owned()))?;

    if count == 0 {
        return Err(TransformerCountError::Zero);
    }

    Ok(count)
}
