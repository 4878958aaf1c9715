use crate::app::render::{render_rows, render_search, OutputFormat};
use crate::core::engine::LedgerEngine;
use crate::core::session::Session;
use crate::core::Pipeline;
use crate::utils::error::Result;
use std::io::Write;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

const PROMPT: &str = "keyword> ";

/// Reads keywords line by line and prints search results until EOF or `:quit`.
///
/// `:reload` resubmits the session's uploads. Errors are printed inline and
/// the loop continues.
pub async fn run_interactive<P, R, W>(
    engine: &LedgerEngine<P>,
    session: &mut Session,
    input: R,
    mut output: W,
    format: OutputFormat,
) -> Result<()>
where
    P: Pipeline,
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let mut lines = input.lines();

    loop {
        write!(output, "{}", PROMPT)?;
        output.flush()?;

        let Some(line) = lines.next_line().await? else {
            writeln!(output)?;
            break;
        };

        match line.as_str() {
            ":quit" | ":q" => break,
            ":reload" => match engine.submit(session).await {
                Ok(rows) => {
                    writeln!(output, "✅ Reloaded {} rows", rows)?;
                    render_rows(&mut output, &session.merged()?.rows, format)?;
                }
                Err(e) => {
                    tracing::error!("❌ Reload failed: {}", e);
                    writeln!(output, "❌ {}", e.user_friendly_message())?;
                }
            },
            "" => continue,
            keyword => match engine.search(session, keyword) {
                Ok(result) => render_search(&mut output, result, format)?,
                Err(e) => writeln!(output, "❌ {}", e.user_friendly_message())?,
            },
        }
    }

    Ok(())
}
