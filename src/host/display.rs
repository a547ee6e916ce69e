use ansi_term::Colour;

use crate::{
    session::clock::IntensityBand,
    timer::TimerView,
    utils::time::split_hms,
};

const BAR_WIDTH: usize = 20;

fn band_colour(band: IntensityBand) -> Colour {
    match band {
        IntensityBand::Low => Colour::RGB(0x34, 0xc7, 0x59),
        IntensityBand::Medium => Colour::RGB(0xff, 0x95, 0x00),
        IntensityBand::High => Colour::RGB(0xff, 0x3b, 0x30),
    }
}

/// Plain text progress bar, e.g. `[#####...............]`.
pub fn progress_bar(fraction: f64) -> String {
    let filled = ((fraction.clamp(0., 1.) * BAR_WIDTH as f64).round() as usize).min(BAR_WIDTH);
    format!("[{}{}]", "#".repeat(filled), ".".repeat(BAR_WIDTH - filled))
}

/// One status line describing the timer.
pub fn render(view: &TimerView, colours: bool) -> String {
    let (hours, minutes, seconds) = split_hms(view.observation.elapsed_ms);
    let bar = progress_bar(view.observation.progress.fraction());
    let bar = if colours {
        band_colour(view.observation.band).paint(bar).to_string()
    } else {
        bar
    };

    let mut line = format!(
        "{hours:02}:{minutes:02}:{seconds:02} {bar} {}",
        view.observation.progress
    );
    if let Some(status) = view.status {
        line += &format!(" | {status}");
    }
    line += &format!(
        " | today {} | all time {}",
        view.aggregates.today_display(),
        view.aggregates.all_time_display()
    );
    if let Some(saved_at) = &view.saved_at {
        line += &format!(" | saved {saved_at}");
    }
    line
}
