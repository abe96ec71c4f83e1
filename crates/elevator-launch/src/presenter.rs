//! Presentation seam used by the dispatcher and the bootstrap path.

/// User-facing output of the interactive application.
///
/// Only the owner thread may hold or call a presenter.
pub trait Presenter {
    /// Shows a one-line status message.
    fn show_status(&mut self, message: &str, is_error: bool);

    /// Shows a blocking notification and returns once it is acknowledged.
    fn alert(&mut self, title: &str, message: &str);

    /// Asks a yes/no question and returns the answer.
    fn confirm(&mut self, question: &str) -> bool;
}

/// Reports a terminal failure: error status followed by an alert.
pub fn report_failure<P: Presenter + ?Sized>(presenter: &mut P, message: &str) {
    presenter.show_status(message, true);
    presenter.alert("Error", message);
}
