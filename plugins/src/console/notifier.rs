use async_trait::async_trait;

use tlcrun_core::api::Notifier;

use super::{write_lines, SharedWriter};

/// Prefixed one-line messages. Action offers are answered from configuration
/// since a console host has no button to click.
pub struct ConsoleNotifier {
    out: SharedWriter,
    accept_offers: bool,
}

impl ConsoleNotifier {
    pub fn new(out: SharedWriter, accept_offers: bool) -> Self {
        Self { out, accept_offers }
    }
}

#[async_trait]
impl Notifier for ConsoleNotifier {
    fn info(&self, message: &str) {
        write_lines(&self.out, &[format!("info: {message}")]);
    }

    fn warn(&self, message: &str) {
        write_lines(&self.out, &[format!("warning: {message}")]);
    }

    fn error(&self, message: &str) {
        write_lines(&self.out, &[format!("error: {message}")]);
    }

    async fn warn_with_action(&self, message: &str, action: &str) -> bool {
        let mut lines = vec![format!("warning: {message} [{action}]")];
        if self.accept_offers {
            lines.push(format!("  -> {action}"));
        }
        write_lines(&self.out, &lines);
        self.accept_offers
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::console::testing::capture;

    #[tokio::test]
    async fn offers_follow_configuration() {
        let (out, captured) = capture();
        let yes = ConsoleNotifier::new(out.clone(), true);
        let no = ConsoleNotifier::new(out, false);

        assert!(yes.warn_with_action("busy", "Show").await);
        assert!(!no.warn_with_action("busy", "Show").await);
        no.info("nothing to do");

        let text = captured.text();
        assert_eq!(text.matches("warning: busy [Show]").count(), 2);
        assert_eq!(text.matches("-> Show").count(), 1);
        assert!(text.contains("info: nothing to do"));
    }
}
