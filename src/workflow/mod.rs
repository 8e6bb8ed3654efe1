pub mod card_flow;
pub mod record_ctx;

pub use card_flow::prepare_card;
pub use record_ctx::RecordCtx;
