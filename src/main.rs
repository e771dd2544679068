use anyhow::Result;

use homewatch::camera::CameraClient;
use homewatch::config::Config;
use homewatch::fetch::{FetchController, HttpSource, LoadState};
use homewatch::index::{TimeIndex, HOURS, QUARTER_BINS};
use homewatch::media::video_url;
use homewatch::select::DetailSelection;

/// Terminal rendition of the per-day activity grid: one row per quarter-hour
/// bin, one column per hour, cell value is the datapoint count.
fn print_grid(index: &TimeIndex) {
    for date in index.date_set() {
        println!("{}", date);
        if let Some(grid) = index.day(date) {
            for (quarter, row) in grid.rows().enumerate() {
                let counts: Vec<String> = row.iter().map(|cell| cell.len().to_string()).collect();
                println!("  :{:02} {}", quarter * 15, counts.join(" "));
            }
        }
    }
}

/// The most active cell across the whole window, as the default detail
/// selection.
fn busiest_cell(index: &TimeIndex) -> Option<(&str, usize, usize)> {
    let mut best: Option<(&str, usize, usize, usize)> = None;
    for date in index.date_set() {
        let grid = index.day(date)?;
        for quarter in 0..QUARTER_BINS {
            for hour in 0..HOURS {
                let count = grid.cell(quarter, hour).len();
                if count > best.map(|b| b.3).unwrap_or(0) {
                    best = Some((date, quarter, hour, count));
                }
            }
        }
    }
    best.map(|(date, quarter, hour, _)| (date, quarter, hour))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cfg = Config::from_env();
    let camera_client = CameraClient::new(&cfg)?;

    for camera in &cfg.cameras {
        println!("== {} ==", camera);
        match camera_client.get_state(camera).await {
            Ok(state) => println!("state: {}", state.state),
            Err(err) => println!("state unavailable: {}", err),
        }
        let source = HttpSource::new(&cfg)?;
        let mut controller = FetchController::new(Box::new(source));
        controller.load_page(camera).await;

        match controller.state() {
            LoadState::Loading => println!("(still loading, likely auth redirect)"),
            LoadState::LoadingError { message } => println!("error: {}", message),
            LoadState::Loaded => {
                print_grid(controller.index());
                if let Some((date, quarter, hour)) = busiest_cell(controller.index()) {
                    let mut selection = DetailSelection::new();
                    if let Some(grid) = controller.index().day(date) {
                        selection.select(grid.cell(quarter, hour));
                    }
                    println!("busiest cell {} :{:02} {:02}h", date, quarter * 15, hour);
                    for dp in selection.items() {
                        if let Some(url) = video_url(&cfg.media_base, &dp.dav_key) {
                            println!("  {}", url);
                        }
                    }
                }
            }
        }
    }
    Ok(())
}
