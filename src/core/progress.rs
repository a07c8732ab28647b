use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

/// Overall progress of a run as a percentage.
///
/// `major_index` and `minor_index` are 1-based. The result never decreases
/// along a sequential run and is exactly 100 once the last minor test of the
/// last major test reports 100.
pub fn compute_progress(
    major_index: usize,
    major_total: usize,
    minor_index: usize,
    minor_total: usize,
    percent_within_minor: u32,
) -> f64 {
    if major_total == 0 {
        return 100.0;
    }
    let minor_total = minor_total.max(1) as u64;
    let major_done = major_index.clamp(1, major_total) as u64 - 1;
    let minor_done = (minor_index.max(1) as u64 - 1).min(minor_total);
    let percent = u64::from(percent_within_minor.min(100));

    // Work in integer units of 1/(major_total * minor_total * 100) so the
    // final step lands on 100 without rounding error.
    let units = (major_done * minor_total + minor_done) * 100 + percent;
    let total_units = major_total as u64 * minor_total * 100;

    (100.0 * units as f64 / total_units as f64).min(100.0)
}

/// Truncate `text` to `max` characters, ending in `..` when shortened.
pub fn truncate_label(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    if max <= 3 {
        return text.chars().take(max).collect();
    }
    let mut out: String = text.chars().take(max - 2).collect();
    out.push_str("..");
    out
}

/// Terminal progress bar on stderr; hidden when progress is disabled.
pub struct ProgressMeter {
    bar: ProgressBar,
}

impl ProgressMeter {
    pub fn new(enabled: bool) -> Self {
        if !enabled {
            return Self { bar: ProgressBar::hidden() };
        }

        let bar = ProgressBar::with_draw_target(Some(100), ProgressDrawTarget::stderr());
        let style = ProgressStyle::with_template("  {msg:55} {pos:>3}%")
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        bar.set_style(style);
        Self { bar }
    }

    pub fn set(&self, percent: f64, label: &str) {
        self.bar.set_position(percent.floor() as u64);
        self.bar.set_message(truncate_label(label, 55));
    }

    /// Print a line above the bar.
    pub fn println(&self, line: &str) {
        if self.bar.is_hidden() {
            return;
        }
        self.bar.println(line);
    }

    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }
}
