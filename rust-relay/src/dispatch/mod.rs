//! Outbound trigger dispatch to the Refersion API.

pub mod refersion;

pub use refersion::{DispatchOutcome, TriggerDispatcher, TriggerRequest, TRIGGER_TYPE_SKU};
