use anyhow::Result;
use radar_sdk::Client;
use radar_types::JobFilter;

use crate::presentation::views::JobsView;
use crate::presentation::{Palette, print_json};
use crate::types::OutputFormat;

pub async fn handle(client: &Client, filter: JobFilter, format: OutputFormat) -> Result<()> {
    let jobs = client.jobs(&filter).await?;

    match format {
        OutputFormat::Json => print_json(&jobs),
        OutputFormat::Plain => {
            print!("{}", JobsView::new(&jobs, Palette::detect()));
            Ok(())
        }
    }
}
