//! Interactive console for the requirements dialogue

use async_trait::async_trait;
use scriptforge_agent::Interlocutor;
use scriptforge_core::{ForgeError, Result};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader, Stdin, Stdout};

pub struct Console<R, W> {
    reader: R,
    writer: W,
}

impl Console<BufReader<Stdin>, Stdout> {
    pub fn stdio() -> Self {
        Self::new(BufReader::new(tokio::io::stdin()), tokio::io::stdout())
    }
}

impl<R, W> Console<R, W>
where
    R: AsyncBufRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
{
    pub fn new(reader: R, writer: W) -> Self {
        Self { reader, writer }
    }

    pub async fn say(&mut self, text: &str) -> Result<()> {
        self.writer.write_all(text.as_bytes()).await?;
        self.writer.write_all(b"\n").await?;
        self.writer.flush().await?;
        Ok(())
    }
}

#[async_trait]
impl<R, W> Interlocutor for Console<R, W>
where
    R: AsyncBufRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
{
    async fn read_line(&mut self, prompt: &str) -> Result<String> {
        self.writer.write_all(prompt.as_bytes()).await?;
        self.writer.flush().await?;

        let mut line = String::new();
        let read = self.reader.read_line(&mut line).await?;
        if read == 0 {
            return Err(ForgeError::Input(
                "input closed before 'done' was entered".to_string(),
            ));
        }
        Ok(line.trim_end_matches(&['\r', '\n'][..]).to_string())
    }

    async fn relay(&mut self, question: &str) -> Result<()> {
        self.say(&format!("LLM: {}", question)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_reads_lines_and_relays() {
        let input: &[u8] = b"add two numbers\r\ndone\n";
        let mut output = Vec::new();
        {
            let mut console = Console::new(input, &mut output);
            assert_eq!(console.read_line("> ").await.unwrap(), "add two numbers");
            console.relay("Which types?").await.unwrap();
            assert_eq!(console.read_line("> ").await.unwrap(), "done");
        }
        assert_eq!(String::from_utf8(output).unwrap(), "> LLM: Which types?\n> ");
    }

    #[tokio::test]
    async fn test_eof_is_an_input_error() {
        let input: &[u8] = b"";
        let mut console = Console::new(input, Vec::new());
        assert!(matches!(
            console.read_line("> ").await,
            Err(ForgeError::Input(_))
        ));
    }
}
