use anyhow::Result;
use futures::stream::StreamExt;
use radar_sdk::{Client, Phase, SessionView};
use radar_types::JobId;

use crate::presentation::views::WatchLine;
use crate::presentation::{Palette, print_json_line};
use crate::types::OutputFormat;

fn emit(view: &SessionView, format: OutputFormat, palette: Palette) -> Result<()> {
    match format {
        OutputFormat::Json => print_json_line(view),
        OutputFormat::Plain => {
            print!("{}", WatchLine::new(view, palette));
            Ok(())
        }
    }
}

/// Print every view of `id` until the job settles or the user interrupts.
pub async fn handle(client: &Client, id: JobId, format: OutputFormat) -> Result<()> {
    let palette = Palette::detect();
    let mut stream = client.observe(id);
    let mut last = None;

    loop {
        tokio::select! {
            view = stream.next() => match view {
                Some(view) => {
                    emit(&view, format, palette)?;
                    last = Some(view);
                }
                None => break,
            },
            _ = tokio::signal::ctrl_c() => {
                tracing::debug!(job = %id, "interrupted");
                stream.cancel();
                break;
            }
        }
    }

    if let Some(view) = last
        && view.phase == Phase::NotFound
    {
        anyhow::bail!("job {} not found", id);
    }
    Ok(())
}
