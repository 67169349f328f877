use anyhow::Result;
use radar_sdk::Client;
use radar_types::JobId;

use crate::presentation::views::SessionReportView;
use crate::presentation::{Palette, print_json};
use crate::types::OutputFormat;

pub async fn handle(client: &Client, id: JobId, format: OutputFormat) -> Result<()> {
    let report = client.session(id).await?;

    match format {
        OutputFormat::Json => print_json(&report),
        OutputFormat::Plain => {
            print!("{}", SessionReportView::new(&report, Palette::detect()));
            Ok(())
        }
    }
}
