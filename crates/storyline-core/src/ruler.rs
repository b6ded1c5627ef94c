//! Time ruler tick selection and labels

use crate::coords::CoordinateMapper;

/// Candidate minor tick intervals in seconds, finest first
pub const TICK_LADDER: [f64; 13] = [
    0.1, 0.2, 0.5, 1.0, 2.0, 5.0, 10.0, 15.0, 30.0, 60.0, 120.0, 300.0, 600.0,
];

/// Minimum distance between two minor ticks
pub const MIN_TICK_GAP_PX: f64 = 8.0;

/// Every n-th minor tick is a labelled major tick
pub const MAJOR_EVERY: i64 = 5;

#[derive(Debug, Clone, PartialEq)]
pub struct RulerTick {
    pub x: f64,
    pub time: f64,
    pub major: bool,
    pub label: Option<String>,
}

/// Finest ladder step that keeps at least `MIN_TICK_GAP_PX` between ticks
pub fn tick_interval(pixels_per_second: f64) -> f64 {
    TICK_LADDER
        .iter()
        .copied()
        .find(|interval| interval * pixels_per_second >= MIN_TICK_GAP_PX)
        .unwrap_or(TICK_LADDER[TICK_LADDER.len() - 1])
}

/// `m:ss`, or `m:ss.s` when `tenths` is set
pub fn format_timecode(seconds: f64, tenths: bool) -> String {
    let seconds = seconds.max(0.0);
    if tenths {
        let total_tenths = (seconds * 10.0).round() as u64;
        let mins = total_tenths / 600;
        let secs = (total_tenths % 600) / 10;
        let frac = total_tenths % 10;
        return format!("{}:{:02}.{}", mins, secs, frac);
    }
    let total = seconds.round() as u64;
    format!("{}:{:02}", total / 60, total % 60)
}

/// Ticks inside `[0, width]` for the given mapping
pub fn ruler_ticks(mapper: &CoordinateMapper, width: f64) -> Vec<RulerTick> {
    let interval = tick_interval(mapper.pixels_per_second);
    let tenths = interval * (MAJOR_EVERY as f64) < 1.0;
    let (t0, t1) = mapper.visible_range(width);

    let first = (t0 / interval).floor().max(0.0) as i64;
    let last = (t1 / interval).ceil() as i64;

    (first..=last)
        .filter_map(|i| {
            let time = i as f64 * interval;
            let x = mapper.time_to_pixel(time);
            if !mapper.is_visible(x, width) {
                return None;
            }
            let major = i % MAJOR_EVERY == 0;
            Some(RulerTick {
                x,
                time,
                major,
                label: major.then(|| format_timecode(time, tenths)),
            })
        })
        .collect()
}
