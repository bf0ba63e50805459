use std::io::{BufRead, Write};

use tracing::info;

use crate::assistant::Assistant;
use crate::error::Result;
use crate::query::requires_confirmation;

const EXIT_WORDS: [&str; 3] = ["quit", "exit", "q"];
const SEPARATOR: &str = "--------------------------------------------------";

/// Interactive question loop over any line source and sink.
pub struct Repl<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Repl<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Repl { input, output }
    }

    /// Reads questions until an exit word or end of input.
    pub async fn run(&mut self, assistant: &Assistant) -> Result<()> {
        writeln!(self.output, "\nAsk your questions (type 'quit' to exit)\n")?;

        while let Some(line) = self.prompt("Question: ")? {
            let question = line.trim();

            if is_exit(question) {
                break;
            }
            if question.is_empty() {
                continue;
            }

            self.turn(assistant, question).await?;
        }

        writeln!(self.output, "\nGoodbye!")?;
        Ok(())
    }

    async fn turn(&mut self, assistant: &Assistant, question: &str) -> Result<()> {
        writeln!(self.output, "\nGenerating SQL...")?;
        let sql = assistant.to_sql(question).await?;
        writeln!(self.output, "SQL: {}", sql)?;

        if requires_confirmation(&sql) && !self.confirm()? {
            info!(%sql, "statement declined");
            writeln!(self.output, "Cancelled.\n")?;
            return Ok(());
        }

        writeln!(self.output, "Executing...")?;
        let outcome = assistant.execute(&sql).await;

        let answer = assistant.narrate(question, &sql, &outcome).await?;
        writeln!(self.output, "\n{}\n", answer)?;
        writeln!(self.output, "{}\n", SEPARATOR)?;

        Ok(())
    }

    /// Asks before a statement that may modify data. End of input declines.
    fn confirm(&mut self) -> Result<bool> {
        let reply = self.prompt("This statement will modify the database. Continue? (y/n): ")?;

        Ok(reply.is_some_and(|answer| {
            let answer = answer.trim();
            answer.eq_ignore_ascii_case("y") || answer.eq_ignore_ascii_case("yes")
        }))
    }

    /// Prints `prompt` and reads one line, `None` at end of input.
    fn prompt(&mut self, prompt: &str) -> Result<Option<String>> {
        write!(self.output, "{}", prompt)?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }

        Ok(Some(line))
    }

    pub fn into_output(self) -> W {
        self.output
    }
}

fn is_exit(input: &str) -> bool {
    EXIT_WORDS.iter().any(|word| input.eq_ignore_ascii_case(word))
}
