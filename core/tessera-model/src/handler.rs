use crate::{ContentType, Item};

/// Validation hook run by the item-save workflow before anything is written.
///
/// Relation synchronization only starts after the edited item passed
/// validation and was persisted, so a rejecting validator also prevents any
/// reverse-field updates.
pub trait ItemValidator: Send + Sync {
    /// Return `Err(message)` to reject the save.
    fn validate(&self, content_type: &ContentType, item: &Item) -> Result<(), String> {
        let _ = (content_type, item);
        Ok(())
    }
}

/// Validator that accepts every item.
#[derive(Debug, Clone, Copy, Default)]
pub struct AcceptAll;

impl ItemValidator for AcceptAll {}
