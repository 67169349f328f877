use anyhow::Result;
use radar_sdk::Client;
use radar_types::JobId;

use crate::presentation::views::CompareView;
use crate::presentation::{Palette, print_json};
use crate::types::OutputFormat;

pub async fn handle(client: &Client, a: JobId, b: JobId, format: OutputFormat) -> Result<()> {
    let result = client.compare(a, b).await?;

    match format {
        OutputFormat::Json => print_json(&result),
        OutputFormat::Plain => {
            print!("{}", CompareView::new(&result, Palette::detect()));
            Ok(())
        }
    }
}
