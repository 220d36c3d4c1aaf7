//! bytediff: visually compare two binary files byte by byte
//!
//! The files are shown as synchronized hex/character panes that page
//! together, stop at differences, search for byte patterns, and allow
//! editing bytes in place.

mod app;
mod editor;
mod settings;
mod ui;

use std::path::PathBuf;

use anyhow::Context;
use app::session::{Session, SessionOptions};
use app::DiffApp;
use clap::Parser;
use eframe::NativeOptions;
use editor::window::LINE_WIDTH;
use settings::AppSettings;

/// Lines per pane until the window reports its real size
const INITIAL_LINES: usize = 9;

const LICENSE_NOTICE: &str = "\
bytediff is free software; you can redistribute it and/or
modify it under the terms of the GNU General Public License as
published by the Free Software Foundation; either version 2 of
the License, or (at your option) any later version.

This program is distributed in the hope that it will be useful,
but WITHOUT ANY WARRANTY; without even the implied warranty of
MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
GNU General Public License for more details.

You should have received a copy of the GNU General Public License
along with this program; if not, see <http://www.gnu.org/licenses/>.";

/// Compare binary files byte by byte
#[derive(Parser, Debug)]
#[command(name = "bytediff", version, about)]
struct Args {
    /// File shown in the top pane
    #[arg(required_unless_present = "license")]
    file1: Option<PathBuf>,

    /// File shown in the bottom pane; omit to view FILE1 alone
    file2: Option<PathBuf>,

    /// Print license information and exit
    #[arg(long)]
    license: bool,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let args = Args::parse();
    if args.license {
        println!("bytediff {}\n\n{}", env!("CARGO_PKG_VERSION"), LICENSE_NOTICE);
        return Ok(());
    }

    let settings = AppSettings::load();

    let file1 = args.file1.context("no file given")?;
    let options = SessionOptions {
        capacity: INITIAL_LINES * LINE_WIDTH,
        search_block_size: settings.search_block_size,
        history_limit: settings.history_limit,
    };
    let session = Session::open(&file1, args.file2.as_deref(), options)?;

    let viewport = egui::ViewportBuilder::default()
        .with_inner_size([settings.window_width, settings.window_height])
        .with_min_inner_size([640.0, 360.0]);

    let native_options = NativeOptions {
        viewport,
        ..Default::default()
    };

    let title = match &args.file2 {
        Some(file2) => format!("bytediff - {} / {}", file1.display(), file2.display()),
        None => format!("bytediff - {}", file1.display()),
    };

    eframe::run_native(
        &title,
        native_options,
        Box::new(move |cc| Ok(Box::new(DiffApp::new(cc, session, &settings)))),
    )
    .map_err(|e| anyhow::anyhow!("failed to start the window: {}", e))
}
