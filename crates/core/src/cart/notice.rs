use std::sync::Mutex;

use tracing::warn;

use crate::domain::product::ProductId;

/// Transient user-visible message raised by the cart manager.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Notice {
    OutOfStock { product_id: ProductId },
    AddFailed { product_id: ProductId },
    RemoveFailed { product_id: ProductId },
    UpdateFailed { product_id: ProductId },
    StoredCartDiscarded,
}

impl Notice {
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::OutOfStock { .. } => "Requested quantity is out of stock",
            Self::AddFailed { .. } => "Could not add the product to the cart",
            Self::RemoveFailed { .. } => "Could not remove the product from the cart",
            Self::UpdateFailed { .. } => "Could not change the product quantity",
            Self::StoredCartDiscarded => "Your saved cart could not be restored and was reset",
        }
    }

    pub fn product_id(&self) -> Option<ProductId> {
        match self {
            Self::OutOfStock { product_id }
            | Self::AddFailed { product_id }
            | Self::RemoveFailed { product_id }
            | Self::UpdateFailed { product_id } => Some(*product_id),
            Self::StoredCartDiscarded => None,
        }
    }
}

pub trait Notifier: Send + Sync {
    fn notify(&self, notice: Notice);
}

/// Emits every notice as a `warn` event.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, notice: Notice) {
        warn!(
            event_name = "cart.notice",
            product_id = notice.product_id().map(|id| id.0),
            notice = ?notice,
            "{}",
            notice.user_message()
        );
    }
}

/// Keeps every notice in memory; used by front ends that render notices
/// after the operation returns.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    notices: Mutex<Vec<Notice>>,
}

impl RecordingNotifier {
    pub fn take(&self) -> Vec<Notice> {
        match self.notices.lock() {
            Ok(mut notices) => std::mem::take(&mut *notices),
            Err(poisoned) => std::mem::take(&mut *poisoned.into_inner()),
        }
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notice: Notice) {
        match self.notices.lock() {
            Ok(mut notices) => notices.push(notice),
            Err(poisoned) => poisoned.into_inner().push(notice),
        }
    }
}
