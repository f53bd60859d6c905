//! Progress line for the island builds.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use owo_colors::OwoColorize;

const TITLE: &str = "Building islands scripts";

/// Spinner shown while island bundles build.
///
/// Island builds run concurrently, so the line names the most recently
/// started route and how many are in flight. Drawn on stderr; hidden when
/// stderr is not a terminal.
///
/// ```no_run
/// use servite_build::ui::IslandSpinner;
///
/// let spinner = IslandSpinner::start();
/// spinner.building("/about");
/// spinner.built();
/// spinner.finish(1);
/// ```
pub struct IslandSpinner {
    pb: ProgressBar,
    in_flight: AtomicUsize,
}

impl IslandSpinner {
    pub fn start() -> Self {
        Self::with_bar(ProgressBar::new_spinner())
    }

    fn with_bar(pb: ProgressBar) -> Self {
        // constant template
        let style = ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg}")
            .expect("valid template")
            .tick_strings(&["◐", "◓", "◑", "◒"]);
        pb.set_style(style);
        pb.set_message(TITLE);
        pb.enable_steady_tick(Duration::from_millis(100));

        Self {
            pb,
            in_flight: AtomicUsize::new(0),
        }
    }

    /// An island build for `route` started.
    pub fn building(&self, route: &str) {
        let in_flight = self.in_flight.fetch_add(1, Ordering::Relaxed) + 1;
        self.pb.set_message(Self::status(route, in_flight));
    }

    /// An island build finished.
    pub fn built(&self) {
        // saturating: a stray call must not wrap
        let _ = self
            .in_flight
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |n| n.checked_sub(1));
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::Relaxed)
    }

    pub fn finish(&self, built: usize) {
        self.pb
            .finish_with_message(format!("{} {built} islands scripts built.", "✓".green()));
    }

    pub fn fail(&self) {
        self.pb
            .finish_with_message(format!("{} Islands scripts build failed.", "✗".red()));
    }

    fn status(route: &str, in_flight: usize) -> String {
        if in_flight > 1 {
            format!("{TITLE} {} (+{} more)", route.dimmed(), in_flight - 1)
        } else {
            format!("{TITLE} {}", route.dimmed())
        }
    }

    #[cfg(test)]
    fn message(&self) -> String {
        self.pb.message()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hidden() -> IslandSpinner {
        IslandSpinner::with_bar(ProgressBar::hidden())
    }

    #[test]
    fn names_the_route_being_built() {
        let spinner = hidden();
        spinner.building("/about");
        assert!(spinner.message().contains("/about"));
        assert!(!spinner.message().contains("more"));

        spinner.building("/blog");
        assert!(spinner.message().contains("/blog"));
        assert!(spinner.message().contains("(+1 more)"));
    }

    #[test]
    fn in_flight_count_never_wraps() {
        let spinner = hidden();
        spinner.building("/");
        spinner.built();
        spinner.built();
        assert_eq!(spinner.in_flight(), 0);
    }

    #[test]
    fn finish_and_fail_do_not_panic() {
        hidden().finish(3);
        hidden().fail();
    }
}
