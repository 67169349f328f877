use anyhow::Result;
use radar_sdk::Client;
use radar_types::JobId;

use crate::presentation::views::SnapshotDisplay;
use crate::presentation::{Palette, print_json};
use crate::types::OutputFormat;

pub async fn handle(client: &Client, id: JobId, format: OutputFormat) -> Result<()> {
    let view = client.snapshot(id).await?;

    match format {
        OutputFormat::Json => print_json(&view),
        OutputFormat::Plain => {
            print!("{}", SnapshotDisplay::new(&view, Palette::detect()));
            Ok(())
        }
    }
}
