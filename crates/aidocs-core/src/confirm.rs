//! Confirmation seam for destructive workflows

/// Asks the user a yes/no question.
pub trait Confirm {
    /// `true` means proceed. An error reading the answer counts as "no".
    fn confirm(&self, prompt: &str) -> bool;
}

/// Answers every prompt the same way.
#[derive(Debug, Clone, Copy)]
pub struct AutoConfirm(pub bool);

impl Confirm for AutoConfirm {
    fn confirm(&self, _prompt: &str) -> bool {
        self.0
    }
}
