//! Services - orchestration over the ports.

mod blocks;
mod feed;
mod interactions;

pub use blocks::BlockService;
pub use feed::FeedAssembler;
pub use interactions::InteractionService;
